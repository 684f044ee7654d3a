//! Experiments
//!
//! An experiment fixes the model architecture trained by its runs.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use serde::Serialize;
use serde_json::{Map, Value};

/// One layer of an experiment model. The structure is passed through opaquely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    /// Activation applied after the layer; `None` is sent as `null`
    pub activation: Option<String>,
    pub is_input: bool,
    /// Layer type, e.g. "Linear", "Conv2d", "Flatten"
    pub l_type: String,
    pub structure: Map<String, Value>,
}

impl LayerSpec {
    pub fn new(l_type: impl Into<String>, is_input: bool) -> Self {
        Self {
            activation: None,
            is_input,
            l_type: l_type.into(),
            structure: Map::new(),
        }
    }

    pub fn activation(mut self, activation: impl Into<String>) -> Self {
        self.activation = Some(activation.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.structure.insert(name.into(), value.into());
        self
    }
}

/// Fields of a new experiment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExperimentConfig {
    pub model: Vec<LayerSpec>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ExperimentConfig {
    pub fn new(model: Vec<LayerSpec>) -> Self {
        Self {
            model,
            extra: ExtraFields::new(),
        }
    }
}

/// Overrides applied by `update`; absent fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExperimentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Vec<LayerSpec>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    config: &'a ExperimentConfig,
    /// Serialized last so it takes precedence over an `extra` entry of the same name
    expt_id: &'a str,
}

/// Experiment CRUD against the grid
#[derive(Clone, Debug)]
pub struct ExperimentTask {
    task: ResourceTask,
}

impl ExperimentTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Experiment, client),
        }
    }

    fn collection(&self, collab_id: &str, project_id: &str) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new().collab(collab_id).project(project_id);
        require(
            self.task.kind(),
            &keys,
            &[ScopeKey::Collaboration, ScopeKey::Project],
        )?;
        Ok(keys)
    }

    fn single(&self, collab_id: &str, project_id: &str, expt_id: &str) -> Result<ScopeKeys> {
        let keys = self.collection(collab_id, project_id)?.expt(expt_id);
        require(self.task.kind(), &keys, &[ScopeKey::Experiment])?;
        Ok(keys)
    }

    /// Register an experiment under a project
    pub async fn create(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: &str,
        config: &ExperimentConfig,
    ) -> Result<Envelope> {
        self.single(collab_id, project_id, expt_id)?;
        let payload = to_payload(&CreateBody { expt_id, config })?;
        self.task
            .create(&self.collection(collab_id, project_id)?, Some(&payload))
            .await
    }

    pub async fn read_all(&self, collab_id: &str, project_id: &str) -> Result<Envelope> {
        self.task
            .read_all(&self.collection(collab_id, project_id)?)
            .await
    }

    pub async fn read(&self, collab_id: &str, project_id: &str, expt_id: &str) -> Result<Envelope> {
        self.task
            .read(&self.single(collab_id, project_id, expt_id)?)
            .await
    }

    pub async fn update(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: &str,
        updates: &ExperimentUpdate,
    ) -> Result<Envelope> {
        let keys = self.single(collab_id, project_id, expt_id)?;
        self.task.update(&keys, &to_payload(updates)?).await
    }

    pub async fn delete(&self, collab_id: &str, project_id: &str, expt_id: &str) -> Result<Envelope> {
        self.task
            .delete(&self.single(collab_id, project_id, expt_id)?)
            .await
    }
}
