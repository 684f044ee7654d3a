//! Endpoint Registry - Load endpoint templates from JSON
//!
//! This module loads the grid's endpoint templates from embedded JSON files
//! (one per phase) and indexes them by resource kind and signature.

use super::resolver::EndpointTemplate;
use super::scope::Signature;
use crate::grid::{GridError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Embedded endpoint JSON files (compiled into the binary)
const ENDPOINT_FILES: &[&str] = &[
    include_str!("../resources/connect.json"),
    include_str!("../resources/train.json"),
    include_str!("../resources/evaluate.json"),
];

/// Every resource kind the grid exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Collaboration,
    Project,
    Experiment,
    Run,
    Participant,
    Registration,
    Tag,
    Alignment,
    Model,
    Optimization,
    Validation,
    Prediction,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        ResourceKind::Collaboration,
        ResourceKind::Project,
        ResourceKind::Experiment,
        ResourceKind::Run,
        ResourceKind::Participant,
        ResourceKind::Registration,
        ResourceKind::Tag,
        ResourceKind::Alignment,
        ResourceKind::Model,
        ResourceKind::Optimization,
        ResourceKind::Validation,
        ResourceKind::Prediction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collaboration => "collaboration",
            Self::Project => "project",
            Self::Experiment => "experiment",
            Self::Run => "run",
            Self::Participant => "participant",
            Self::Registration => "registration",
            Self::Tag => "tag",
            Self::Alignment => "alignment",
            Self::Model => "model",
            Self::Optimization => "optimization",
            Self::Validation => "validation",
            Self::Prediction => "prediction",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let singular = normalized.strip_suffix('s').unwrap_or(&normalized);
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized || kind.as_str() == singular)
            .ok_or_else(|| format!("unknown resource kind '{}'", s))
    }
}

/// Operations a resource task may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    ReadAll,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::ReadAll => "read_all",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "create" => Ok(Self::Create),
            "read_all" | "list" => Ok(Self::ReadAll),
            "read" | "get" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("unknown operation '{}'", s)),
        }
    }
}

/// Grid phase a resource belongs to; selects the URL prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Connect,
    Train,
    Evaluate,
}

impl Phase {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Connect => "{address}/ttp/connect/",
            Self::Train => "{address}/ttp/train/",
            Self::Evaluate => "{address}/ttp/evaluate/",
        }
    }
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
struct ResourceDef {
    display_name: String,
    phase: Phase,
    operations: Vec<Operation>,
    /// Templates, most specific first
    templates: Vec<String>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
struct EndpointConfig {
    #[serde(default)]
    resources: HashMap<ResourceKind, ResourceDef>,
}

/// Validated endpoints of one resource kind
#[derive(Debug, Clone)]
pub struct ResourceEndpoints {
    pub kind: ResourceKind,
    pub display_name: String,
    pub phase: Phase,
    pub operations: Vec<Operation>,
    templates: Vec<EndpointTemplate>,
    by_signature: HashMap<Signature, usize>,
}

impl ResourceEndpoints {
    fn build(kind: ResourceKind, def: ResourceDef) -> Result<Self> {
        if def.templates.is_empty() {
            return Err(GridError::InvalidTable(format!("{} has no templates", kind)));
        }

        let mut templates = Vec::with_capacity(def.templates.len());
        let mut by_signature = HashMap::new();

        for raw in &def.templates {
            if !raw.starts_with(def.phase.prefix()) {
                return Err(GridError::InvalidTable(format!(
                    "{} template '{}' does not start with '{}'",
                    kind,
                    raw,
                    def.phase.prefix()
                )));
            }

            let template = EndpointTemplate::parse(raw)?;
            if let Some(&existing) = by_signature.get(template.signature()) {
                let existing: &EndpointTemplate = &templates[existing];
                return Err(GridError::InvalidTable(format!(
                    "{} templates '{}' and '{}' share signature [{}]",
                    kind,
                    existing.as_str(),
                    raw,
                    template.signature()
                )));
            }

            by_signature.insert(template.signature().clone(), templates.len());
            templates.push(template);
        }

        Ok(Self {
            kind,
            display_name: def.display_name,
            phase: def.phase,
            operations: def.operations,
            templates,
            by_signature,
        })
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    /// Template whose signature equals `signature` exactly
    pub fn lookup(&self, signature: &Signature) -> Option<&EndpointTemplate> {
        self.by_signature.get(signature).map(|&idx| &self.templates[idx])
    }

    /// Templates in declaration order (most specific first)
    pub fn templates(&self) -> &[EndpointTemplate] {
        &self.templates
    }
}

/// Every registered endpoint, keyed by resource kind
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    resources: HashMap<ResourceKind, ResourceEndpoints>,
}

impl EndpointTable {
    /// Build and validate a table from one or more JSON documents
    ///
    /// Fails on malformed templates, duplicate signatures within a kind and
    /// kinds declared by more than one document.
    pub fn from_json(documents: &[&str]) -> Result<Self> {
        let mut table = Self::default();

        for content in documents {
            let partial: EndpointConfig = serde_json::from_str(content)
                .map_err(|e| GridError::InvalidTable(format!("failed to parse endpoint JSON: {}", e)))?;

            for (kind, def) in partial.resources {
                if table.resources.contains_key(&kind) {
                    return Err(GridError::InvalidTable(format!("{} is declared twice", kind)));
                }
                table.resources.insert(kind, ResourceEndpoints::build(kind, def)?);
            }
        }

        Ok(table)
    }

    pub fn get(&self, kind: ResourceKind) -> Result<&ResourceEndpoints> {
        self.resources
            .get(&kind)
            .ok_or_else(|| GridError::InvalidTable(format!("no endpoints registered for {}", kind)))
    }

    /// Template for `kind` matching `signature`, `None` if no signature matches
    pub fn lookup(&self, kind: ResourceKind, signature: &Signature) -> Result<Option<&EndpointTemplate>> {
        Ok(self.get(kind)?.lookup(signature))
    }

    /// Registered kinds in declaration order of [`ResourceKind::ALL`]
    pub fn kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| self.resources.contains_key(kind))
            .collect()
    }
}

/// Global table loaded from the embedded JSON
static TABLE: OnceLock<EndpointTable> = OnceLock::new();

/// Get the endpoint table (loads and validates embedded JSON on first access)
pub fn endpoint_table() -> &'static EndpointTable {
    TABLE.get_or_init(|| {
        EndpointTable::from_json(ENDPOINT_FILES)
            .unwrap_or_else(|e| panic!("Embedded endpoint table is invalid: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::scope::{ScopeKey, ScopeKeys};

    #[test]
    fn test_table_loads_every_kind() {
        let table = endpoint_table();
        assert_eq!(table.kinds(), ResourceKind::ALL.to_vec());
    }

    #[test]
    fn test_scoped_kinds_have_multiple_templates() {
        let table = endpoint_table();
        assert_eq!(table.get(ResourceKind::Model).unwrap().templates().len(), 3);
        assert_eq!(table.get(ResourceKind::Validation).unwrap().templates().len(), 4);
        assert_eq!(table.get(ResourceKind::Prediction).unwrap().templates().len(), 4);
        assert_eq!(table.get(ResourceKind::Registration).unwrap().templates().len(), 5);
    }

    #[test]
    fn test_templates_are_most_specific_first() {
        let table = endpoint_table();
        for kind in [ResourceKind::Model, ResourceKind::Validation, ResourceKind::Prediction] {
            let sizes: Vec<usize> = table
                .get(kind)
                .unwrap()
                .templates()
                .iter()
                .map(|t| t.signature().len())
                .collect();
            let mut sorted = sizes.clone();
            sorted.sort_by(|a, b| b.cmp(a));
            assert_eq!(sizes, sorted, "{} templates out of order", kind);
        }
    }

    #[test]
    fn test_trigger_kinds_only_create_and_read() {
        let table = endpoint_table();
        for kind in [
            ResourceKind::Alignment,
            ResourceKind::Model,
            ResourceKind::Optimization,
            ResourceKind::Validation,
            ResourceKind::Prediction,
        ] {
            let endpoints = table.get(kind).unwrap();
            assert_eq!(endpoints.operations, vec![Operation::Create, Operation::Read]);
        }
    }

    #[test]
    fn test_lookup_by_signature() {
        let table = endpoint_table();
        let signature = ScopeKeys::new().collab("c").project("p").expt("e").signature();
        let template = table.lookup(ResourceKind::Model, &signature).unwrap().unwrap();
        assert!(template.signature().contains(ScopeKey::Experiment));
        assert!(template.as_str().ends_with("/models/{expt_id}"));
    }

    #[test]
    fn test_duplicate_signature_rejected() {
        let json = r#"{
            "resources": {
                "model": {
                    "display_name": "Models",
                    "phase": "train",
                    "operations": ["create", "read"],
                    "templates": [
                        "{address}/ttp/train/a/{project_id}",
                        "{address}/ttp/train/b/{project_id}"
                    ]
                }
            }
        }"#;
        let err = EndpointTable::from_json(&[json]).unwrap_err();
        assert!(err.to_string().contains("share signature"));
    }

    #[test]
    fn test_kind_declared_twice_rejected() {
        let json = r#"{
            "resources": {
                "tag": {
                    "display_name": "Tags",
                    "phase": "connect",
                    "operations": ["read"],
                    "templates": ["{address}/ttp/connect/tags"]
                }
            }
        }"#;
        assert!(EndpointTable::from_json(&[json, json]).is_err());
    }

    #[test]
    fn test_phase_prefix_enforced() {
        let json = r#"{
            "resources": {
                "alignment": {
                    "display_name": "Alignments",
                    "phase": "train",
                    "operations": ["create"],
                    "templates": ["{address}/ttp/connect/alignments"]
                }
            }
        }"#;
        assert!(EndpointTable::from_json(&[json]).is_err());
    }

    #[test]
    fn test_resource_kind_from_str_accepts_plurals() {
        assert_eq!("runs".parse::<ResourceKind>().unwrap(), ResourceKind::Run);
        assert_eq!("Project".parse::<ResourceKind>().unwrap(), ResourceKind::Project);
        assert!("widgets".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_operation_from_str() {
        assert_eq!("read-all".parse::<Operation>().unwrap(), Operation::ReadAll);
        assert_eq!("list".parse::<Operation>().unwrap(), Operation::ReadAll);
        assert_eq!("DELETE".parse::<Operation>().unwrap(), Operation::Delete);
        assert!("patch".parse::<Operation>().is_err());
    }
}
