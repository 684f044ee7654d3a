//! Predictions
//!
//! Triggers inference on a participant's own data using models trained in a
//! collaboration. Predictions are addressed from the participant's side.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use crate::tasks::tags::PathTokens;
use serde::Serialize;
use std::collections::BTreeMap;

/// Inference options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionConfig {
    /// Project id to the tokens of the datasets to predict on
    pub tags: BTreeMap<String, PathTokens>,
    pub auto_align: bool,
    pub dockerised: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            tags: BTreeMap::new(),
            auto_align: true,
            dockerised: true,
            extra: ExtraFields::new(),
        }
    }
}

impl PredictionConfig {
    pub fn with_tags(mut self, project_id: impl Into<String>, tokens: PathTokens) -> Self {
        self.tags.insert(project_id.into(), tokens);
        self
    }
}

#[derive(Clone, Debug)]
pub struct PredictionTask {
    task: ResourceTask,
}

impl PredictionTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Prediction, client),
        }
    }

    fn keys(
        &self,
        participant_id: &str,
        collab_id: &str,
        project_id: Option<&str>,
        expt_id: Option<&str>,
        run_id: Option<&str>,
    ) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new()
            .participant(participant_id)
            .collab(collab_id)
            .with_opt(ScopeKey::Project, project_id)
            .with_opt(ScopeKey::Experiment, expt_id)
            .with_opt(ScopeKey::Run, run_id);
        require(
            self.task.kind(),
            &keys,
            &[ScopeKey::Participant, ScopeKey::Collaboration],
        )?;
        Ok(keys)
    }

    pub async fn create(
        &self,
        participant_id: &str,
        collab_id: &str,
        project_id: Option<&str>,
        expt_id: Option<&str>,
        run_id: Option<&str>,
        config: &PredictionConfig,
    ) -> Result<Envelope> {
        let keys = self.keys(participant_id, collab_id, project_id, expt_id, run_id)?;
        self.task.create(&keys, Some(&to_payload(config)?)).await
    }

    pub async fn read(
        &self,
        participant_id: &str,
        collab_id: &str,
        project_id: Option<&str>,
        expt_id: Option<&str>,
        run_id: Option<&str>,
    ) -> Result<Envelope> {
        let keys = self.keys(participant_id, collab_id, project_id, expt_id, run_id)?;
        self.task.read(&keys).await
    }
}
