//! Models
//!
//! Triggers federated training. The scope narrows from a whole project down to
//! a single run: omit the run to train every run of an experiment, omit both
//! to train every run of the project.

use super::{require, TriggerOptions};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};

#[derive(Clone, Debug)]
pub struct ModelTask {
    task: ResourceTask,
}

impl ModelTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Model, client),
        }
    }

    fn keys(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: Option<&str>,
        run_id: Option<&str>,
    ) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new()
            .collab(collab_id)
            .project(project_id)
            .with_opt(ScopeKey::Experiment, expt_id)
            .with_opt(ScopeKey::Run, run_id);
        require(
            self.task.kind(),
            &keys,
            &[ScopeKey::Collaboration, ScopeKey::Project],
        )?;
        Ok(keys)
    }

    /// Start training; a run without its experiment is a scope error
    pub async fn create(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: Option<&str>,
        run_id: Option<&str>,
        options: &TriggerOptions,
    ) -> Result<Envelope> {
        let keys = self.keys(collab_id, project_id, expt_id, run_id)?;
        self.task.create(&keys, Some(&to_payload(options)?)).await
    }

    /// Trained models within the scope
    pub async fn read(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: Option<&str>,
        run_id: Option<&str>,
    ) -> Result<Envelope> {
        self.task
            .read(&self.keys(collab_id, project_id, expt_id, run_id)?)
            .await
    }
}
