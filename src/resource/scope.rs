//! Scope keys
//!
//! Identifiers narrowing which remote resource an operation targets, and the
//! normalized key-set ("signature") used to pick an endpoint template.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A scope identifier name. Ordering follows the nesting of grid paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeKey {
    Participant,
    Collaboration,
    Project,
    Experiment,
    Run,
}

impl ScopeKey {
    pub const ALL: [ScopeKey; 5] = [
        ScopeKey::Participant,
        ScopeKey::Collaboration,
        ScopeKey::Project,
        ScopeKey::Experiment,
        ScopeKey::Run,
    ];

    /// Placeholder name as written in templates
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "participant_id",
            Self::Collaboration => "collab_id",
            Self::Project => "project_id",
            Self::Experiment => "expt_id",
            Self::Run => "run_id",
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown scope key '{}'", s))
    }
}

/// Sorted set of scope key names, identifying one template per resource kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature(BTreeSet<ScopeKey>);

impl Signature {
    pub fn contains(&self, key: ScopeKey) -> bool {
        self.0.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ScopeKey> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ScopeKey> for Signature {
    fn from_iter<I: IntoIterator<Item = ScopeKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|k| k.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

/// Identifier set supplied by the caller for one operation
///
/// Empty values are treated as absent, so they never take part in template
/// selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeKeys {
    values: BTreeMap<ScopeKey, String>,
}

impl ScopeKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key; an empty value clears it
    pub fn with(mut self, key: ScopeKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a key only when a value is given
    pub fn with_opt(self, key: ScopeKey, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn set(&mut self, key: ScopeKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    pub fn collab(self, collab_id: impl Into<String>) -> Self {
        self.with(ScopeKey::Collaboration, collab_id)
    }

    pub fn project(self, project_id: impl Into<String>) -> Self {
        self.with(ScopeKey::Project, project_id)
    }

    pub fn expt(self, expt_id: impl Into<String>) -> Self {
        self.with(ScopeKey::Experiment, expt_id)
    }

    pub fn run(self, run_id: impl Into<String>) -> Self {
        self.with(ScopeKey::Run, run_id)
    }

    pub fn participant(self, participant_id: impl Into<String>) -> Self {
        self.with(ScopeKey::Participant, participant_id)
    }

    pub fn get(&self, key: ScopeKey) -> Option<&str> {
        self.values.get(&key).map(|s| s.as_str())
    }

    /// Keys carrying a non-empty value
    pub fn signature(&self) -> Signature {
        self.values.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_pruned() {
        let keys = ScopeKeys::new().collab("c1").project("").run("r1");
        assert_eq!(keys.get(ScopeKey::Project), None);
        assert_eq!(keys.signature().len(), 2);

        let cleared = keys.with(ScopeKey::Run, "");
        assert_eq!(cleared.signature().to_string(), "collab_id");
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = ScopeKeys::new().project("p").collab("c").signature();
        let b = ScopeKeys::new().collab("c").project("p").signature();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "collab_id, project_id");
    }

    #[test]
    fn test_scope_key_round_trips_names() {
        for key in ScopeKey::ALL {
            assert_eq!(key.as_str().parse::<ScopeKey>().unwrap(), key);
        }
        assert!("address".parse::<ScopeKey>().is_err());
    }
}
