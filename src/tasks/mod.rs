//! Resource tasks
//!
//! One typed task per resource kind. Each builds its payload from an explicit
//! configuration structure, then drives the generic [`ResourceTask`].
//!
//! # Module Structure
//!
//! Phase 1, connection (full CRUD unless noted):
//! - [`collaborations`], [`projects`], [`experiments`], [`runs`]
//! - [`participants`], [`registrations`] (plus the caller-owned node
//!   registry), [`tags`] (no bulk read)
//!
//! Phase 2 and 3 triggers (create and read only):
//! - [`alignments`], [`models`], [`optimizations`]
//! - [`validations`], [`predictions`]
//!
//! [`ResourceTask`]: crate::resource::ResourceTask

pub mod alignments;
pub mod collaborations;
pub mod experiments;
pub mod models;
pub mod optimizations;
pub mod participants;
pub mod predictions;
pub mod projects;
pub mod registrations;
pub mod runs;
pub mod tags;
pub mod validations;

pub use alignments::AlignmentTask;
pub use collaborations::{CollaborationConfig, CollaborationTask, Component, ComponentPorts};
pub use experiments::{ExperimentConfig, ExperimentTask, ExperimentUpdate, LayerSpec};
pub use models::ModelTask;
pub use optimizations::{OptimizationConfig, OptimizationTask};
pub use participants::{ParticipantConfig, ParticipantTask, ParticipantUpdate};
pub use predictions::{PredictionConfig, PredictionTask};
pub use projects::{Incentives, ProjectConfig, ProjectTask, ProjectUpdate};
pub use registrations::{NodeDescriptor, NodeRegistry, RegistrationTask, RegistrationUpdate, Role};
pub use runs::{RunConfig, RunTask, RunUpdate};
pub use tags::{TagConfig, TagTask, TagUpdate};
pub use validations::ValidationTask;

use crate::grid::{GridError, Result};
use crate::resource::{ResourceKind, ScopeKey, ScopeKeys};
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields the grid accepts beyond those a payload type names explicitly
///
/// Entries are merged into the request body. An entry named like the id a
/// task's `create` takes (e.g. `run_id`) is ignored in favour of that argument.
pub type ExtraFields = Map<String, Value>;

/// Fail with a scope error unless every `required` key carries a value
pub(crate) fn require(kind: ResourceKind, keys: &ScopeKeys, required: &[ScopeKey]) -> Result<()> {
    if required.iter().all(|key| keys.get(*key).is_some()) {
        Ok(())
    } else {
        Err(GridError::Scope {
            kind,
            supplied: keys.signature(),
        })
    }
}

/// Options shared by the model and validation triggers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerOptions {
    /// Use multiple feature alignment before running
    pub auto_align: bool,
    /// Orchestrations run in containers
    pub dockerised: bool,
    pub verbose: bool,
    pub log_msgs: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            auto_align: true,
            dockerised: true,
            verbose: true,
            log_msgs: true,
            extra: ExtraFields::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_reports_supplied_keys() {
        let keys = ScopeKeys::new().collab("c");
        assert!(require(ResourceKind::Project, &keys, &[ScopeKey::Collaboration]).is_ok());

        let err = require(
            ResourceKind::Project,
            &keys,
            &[ScopeKey::Collaboration, ScopeKey::Project],
        )
        .unwrap_err();
        assert!(err.to_string().contains("[collab_id]"));
    }

    #[test]
    fn test_trigger_options_default_to_true() {
        let body = serde_json::to_value(TriggerOptions::default()).unwrap();
        assert_eq!(
            body,
            json!({"auto_align": true, "dockerised": true, "verbose": true, "log_msgs": true})
        );
    }
}
