//! Validations
//!
//! Triggers evaluation of trained models. Like training, the scope narrows
//! from a project to one run, and further to the data of one participant.

use super::{require, TriggerOptions};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};

#[derive(Clone, Debug)]
pub struct ValidationTask {
    task: ResourceTask,
}

impl ValidationTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Validation, client),
        }
    }

    fn keys(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: Option<&str>,
        run_id: Option<&str>,
        participant_id: Option<&str>,
    ) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new()
            .collab(collab_id)
            .project(project_id)
            .with_opt(ScopeKey::Experiment, expt_id)
            .with_opt(ScopeKey::Run, run_id)
            .with_opt(ScopeKey::Participant, participant_id);
        require(
            self.task.kind(),
            &keys,
            &[ScopeKey::Collaboration, ScopeKey::Project],
        )?;
        Ok(keys)
    }

    pub async fn create(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: Option<&str>,
        run_id: Option<&str>,
        participant_id: Option<&str>,
        options: &TriggerOptions,
    ) -> Result<Envelope> {
        let keys = self.keys(collab_id, project_id, expt_id, run_id, participant_id)?;
        self.task.create(&keys, Some(&to_payload(options)?)).await
    }

    /// Validation statistics within the scope
    pub async fn read(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: Option<&str>,
        run_id: Option<&str>,
        participant_id: Option<&str>,
    ) -> Result<Envelope> {
        let keys = self.keys(collab_id, project_id, expt_id, run_id, participant_id)?;
        self.task.read(&keys).await
    }
}
