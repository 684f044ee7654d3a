//! Alignments
//!
//! Triggers multiple feature alignment across every participant registered
//! under a project. The trigger carries no body.

use super::require;
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{ResourceKind, ResourceTask, ScopeKey, ScopeKeys};

#[derive(Clone, Debug)]
pub struct AlignmentTask {
    task: ResourceTask,
}

impl AlignmentTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Alignment, client),
        }
    }

    fn keys(&self, collab_id: &str, project_id: &str) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new().collab(collab_id).project(project_id);
        require(
            self.task.kind(),
            &keys,
            &[ScopeKey::Collaboration, ScopeKey::Project],
        )?;
        Ok(keys)
    }

    /// Start alignment for a project
    pub async fn create(&self, collab_id: &str, project_id: &str) -> Result<Envelope> {
        self.task
            .create(&self.keys(collab_id, project_id)?, None)
            .await
    }

    /// Alignment results of a project
    pub async fn read(&self, collab_id: &str, project_id: &str) -> Result<Envelope> {
        self.task.read(&self.keys(collab_id, project_id)?).await
    }
}
