//! Tags
//!
//! File-path tokens telling a registered participant where its train,
//! evaluate and predict datasets live. One tag set per registration, so
//! there is no bulk read.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use serde::Serialize;

/// Tokens of one or more dataset paths, e.g. `[["train"], ["extra", "train"]]`
pub type PathTokens = Vec<Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagConfig {
    pub train: PathTokens,
    pub evaluate: PathTokens,
    pub predict: PathTokens,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl TagConfig {
    pub fn new(train: PathTokens) -> Self {
        Self {
            train,
            ..Default::default()
        }
    }
}

/// Overrides applied by `update`; absent fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train: Option<PathTokens>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluate: Option<PathTokens>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predict: Option<PathTokens>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Clone, Debug)]
pub struct TagTask {
    task: ResourceTask,
}

impl TagTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Tag, client),
        }
    }

    fn keys(&self, collab_id: &str, project_id: &str, participant_id: &str) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new()
            .collab(collab_id)
            .project(project_id)
            .participant(participant_id);
        require(
            self.task.kind(),
            &keys,
            &[ScopeKey::Collaboration, ScopeKey::Project, ScopeKey::Participant],
        )?;
        Ok(keys)
    }

    pub async fn create(
        &self,
        collab_id: &str,
        project_id: &str,
        participant_id: &str,
        config: &TagConfig,
    ) -> Result<Envelope> {
        let keys = self.keys(collab_id, project_id, participant_id)?;
        self.task.create(&keys, Some(&to_payload(config)?)).await
    }

    pub async fn read(&self, collab_id: &str, project_id: &str, participant_id: &str) -> Result<Envelope> {
        self.task
            .read(&self.keys(collab_id, project_id, participant_id)?)
            .await
    }

    pub async fn update(
        &self,
        collab_id: &str,
        project_id: &str,
        participant_id: &str,
        updates: &TagUpdate,
    ) -> Result<Envelope> {
        let keys = self.keys(collab_id, project_id, participant_id)?;
        self.task.update(&keys, &to_payload(updates)?).await
    }

    pub async fn delete(&self, collab_id: &str, project_id: &str, participant_id: &str) -> Result<Envelope> {
        self.task
            .delete(&self.keys(collab_id, project_id, participant_id)?)
            .await
    }
}
