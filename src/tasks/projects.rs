//! Projects
//!
//! Projects live under a collaboration. The project id travels both in the
//! single-item URL and in the creation body.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use serde::Serialize;
use std::collections::BTreeMap;

/// Tier name to participant ids, used to assign contributions
pub type Incentives = BTreeMap<String, Vec<String>>;

/// Fields of a new project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectConfig {
    pub incentives: Incentives,
    /// Machine learning action, e.g. "classify" or "regress"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ProjectConfig {
    /// Project with the given incentive tiers, each starting empty
    pub fn with_tiers<I, S>(tiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            incentives: tiers.into_iter().map(|t| (t.into(), Vec::new())).collect(),
            ..Default::default()
        }
    }
}

/// Overrides applied by `update`; absent fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incentives: Option<Incentives>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    config: &'a ProjectConfig,
    /// Serialized last so it takes precedence over an `extra` entry of the same name
    project_id: &'a str,
}

/// Project CRUD against the grid
#[derive(Clone, Debug)]
pub struct ProjectTask {
    task: ResourceTask,
}

impl ProjectTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Project, client),
        }
    }

    fn collection(&self, collab_id: &str) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new().collab(collab_id);
        require(self.task.kind(), &keys, &[ScopeKey::Collaboration])?;
        Ok(keys)
    }

    fn single(&self, collab_id: &str, project_id: &str) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new().collab(collab_id).project(project_id);
        require(
            self.task.kind(),
            &keys,
            &[ScopeKey::Collaboration, ScopeKey::Project],
        )?;
        Ok(keys)
    }

    /// Register a project under a collaboration
    pub async fn create(&self, collab_id: &str, project_id: &str, config: &ProjectConfig) -> Result<Envelope> {
        self.single(collab_id, project_id)?;
        let payload = to_payload(&CreateBody { project_id, config })?;
        self.task
            .create(&self.collection(collab_id)?, Some(&payload))
            .await
    }

    pub async fn read_all(&self, collab_id: &str) -> Result<Envelope> {
        self.task.read_all(&self.collection(collab_id)?).await
    }

    pub async fn read(&self, collab_id: &str, project_id: &str) -> Result<Envelope> {
        self.task.read(&self.single(collab_id, project_id)?).await
    }

    pub async fn update(&self, collab_id: &str, project_id: &str, updates: &ProjectUpdate) -> Result<Envelope> {
        let keys = self.single(collab_id, project_id)?;
        self.task.update(&keys, &to_payload(updates)?).await
    }

    pub async fn delete(&self, collab_id: &str, project_id: &str) -> Result<Envelope> {
        self.task.delete(&self.single(collab_id, project_id)?).await
    }
}
