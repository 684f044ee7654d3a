//! URL Resolver
//!
//! Endpoint templates are parsed once into literal and placeholder segments.
//! Resolution picks the template whose placeholder set equals the caller's
//! non-empty keys and substitutes the values into it.

use super::registry::{EndpointTable, ResourceKind};
use super::scope::{ScopeKey, ScopeKeys, Signature};
use crate::grid::{GridAddress, GridError, Result};

/// Placeholder every template starts with
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Key(ScopeKey),
}

/// Immutable URL template such as `{address}/ttp/connect/participants/{participant_id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    raw: String,
    segments: Vec<Segment>,
    signature: Signature,
}

impl EndpointTemplate {
    /// Parse a template; the signature is derived from its placeholders
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| GridError::InvalidTable(format!("template '{}': {}", raw, reason));

        let Some(mut rest) = raw.strip_prefix(ADDRESS_PLACEHOLDER) else {
            return Err(invalid("must start with {address}"));
        };

        let mut segments = Vec::new();
        let mut keys: Vec<ScopeKey> = Vec::new();

        while !rest.is_empty() {
            match rest.find('{') {
                Some(0) => {
                    let Some(end) = rest.find('}') else {
                        return Err(invalid("unterminated placeholder"));
                    };
                    let name = &rest[1..end];
                    let key: ScopeKey = name.parse().map_err(|e: String| invalid(&e))?;
                    if keys.contains(&key) {
                        return Err(invalid(&format!("placeholder '{}' appears twice", name)));
                    }
                    keys.push(key);
                    segments.push(Segment::Key(key));
                    rest = &rest[end + 1..];
                },
                Some(start) => {
                    segments.push(Segment::Literal(rest[..start].to_string()));
                    rest = &rest[start..];
                },
                None => {
                    segments.push(Segment::Literal(rest.to_string()));
                    rest = "";
                },
            }
        }

        if segments.iter().any(|s| matches!(s, Segment::Literal(l) if l.contains('}'))) {
            return Err(invalid("unbalanced '}'"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            signature: keys.into_iter().collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Scope keys this template requires (the address is implicit)
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Substitute the address and every placeholder
    ///
    /// Identifier values are percent-encoded as path segments. Keys must
    /// match the signature exactly; use [`resolve`] to select a template.
    pub fn render(&self, address: &GridAddress, keys: &ScopeKeys) -> Option<String> {
        let mut url = address.as_str().to_string();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => url.push_str(literal),
                Segment::Key(key) => url.push_str(&urlencoding::encode(keys.get(*key)?)),
            }
        }
        Some(url)
    }
}

/// Resolve the concrete URL for `kind` given the caller's identifiers
///
/// Selection is a set-equality match on the non-empty keys: an extra or a
/// missing key versus every registered signature is a [`GridError::Scope`].
pub fn resolve(
    table: &EndpointTable,
    kind: ResourceKind,
    address: &GridAddress,
    keys: &ScopeKeys,
) -> Result<String> {
    let signature = keys.signature();
    let scope_error = || GridError::Scope {
        kind,
        supplied: signature.clone(),
    };

    let template = table.lookup(kind, &signature)?.ok_or_else(scope_error)?;
    template.render(address, keys).ok_or_else(scope_error)
}
