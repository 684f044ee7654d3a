//! Runs
//!
//! A run is one hyperparameter set trained for an experiment. Hyperparameters
//! are opaque to this client; defaults mirror the grid's own.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use serde::Serialize;

/// Hyperparameters of a new run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    /// Federated algorithm, e.g. "FedProx" or "FedAvg"
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    /// Global rounds of federated training
    pub rounds: u32,
    /// Local epochs per round
    pub epochs: u32,
    pub lr: f64,
    /// Deprecated L2 regularization of the optimizers; prefer `l2_lambda`
    pub weight_decay: f64,
    pub lr_decay: f64,
    /// FedProx regularization coefficient
    pub mu: f64,
    pub l1_lambda: f64,
    pub l2_lambda: f64,
    pub optimizer: String,
    pub criterion: String,
    pub lr_scheduler: String,
    /// Minimum loss improvement for a round to count as progress
    pub delta: f64,
    /// Stagnant rounds tolerated before early stopping
    pub patience: u32,
    pub seed: u64,
    /// Use split neural networks instead of federated aggregation
    pub is_snn: bool,
    /// Decimal precision kept under SMPC/HE
    pub precision_fractional: u32,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            algorithm: "FedProx".to_string(),
            batch_size: None,
            rounds: 10,
            epochs: 100,
            lr: 0.001,
            weight_decay: 0.0,
            lr_decay: 0.1,
            mu: 0.1,
            l1_lambda: 0.0,
            l2_lambda: 0.0,
            optimizer: "SGD".to_string(),
            criterion: "BCELoss".to_string(),
            lr_scheduler: "CyclicLR".to_string(),
            delta: 0.0,
            patience: 10,
            seed: 42,
            is_snn: false,
            precision_fractional: 5,
            extra: ExtraFields::new(),
        }
    }
}

/// Overrides applied by `update`; absent fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epochs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_decay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lr_decay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mu: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l1_lambda: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l2_lambda: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lr_scheduler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_snn: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision_fractional: Option<u32>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    config: &'a RunConfig,
    /// Serialized last so it takes precedence over an `extra` entry of the same name
    run_id: &'a str,
}

/// Run CRUD against the grid
#[derive(Clone, Debug)]
pub struct RunTask {
    task: ResourceTask,
}

impl RunTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Run, client),
        }
    }

    fn collection(&self, collab_id: &str, project_id: &str, expt_id: &str) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new()
            .collab(collab_id)
            .project(project_id)
            .expt(expt_id);
        require(
            self.task.kind(),
            &keys,
            &[ScopeKey::Collaboration, ScopeKey::Project, ScopeKey::Experiment],
        )?;
        Ok(keys)
    }

    fn single(&self, collab_id: &str, project_id: &str, expt_id: &str, run_id: &str) -> Result<ScopeKeys> {
        let keys = self.collection(collab_id, project_id, expt_id)?.run(run_id);
        require(self.task.kind(), &keys, &[ScopeKey::Run])?;
        Ok(keys)
    }

    /// Register a run for an experiment
    pub async fn create(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: &str,
        run_id: &str,
        config: &RunConfig,
    ) -> Result<Envelope> {
        self.single(collab_id, project_id, expt_id, run_id)?;
        let payload = to_payload(&CreateBody { run_id, config })?;
        self.task
            .create(&self.collection(collab_id, project_id, expt_id)?, Some(&payload))
            .await
    }

    pub async fn read_all(&self, collab_id: &str, project_id: &str, expt_id: &str) -> Result<Envelope> {
        self.task
            .read_all(&self.collection(collab_id, project_id, expt_id)?)
            .await
    }

    pub async fn read(&self, collab_id: &str, project_id: &str, expt_id: &str, run_id: &str) -> Result<Envelope> {
        self.task
            .read(&self.single(collab_id, project_id, expt_id, run_id)?)
            .await
    }

    pub async fn update(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: &str,
        run_id: &str,
        updates: &RunUpdate,
    ) -> Result<Envelope> {
        let keys = self.single(collab_id, project_id, expt_id, run_id)?;
        self.task.update(&keys, &to_payload(updates)?).await
    }

    pub async fn delete(&self, collab_id: &str, project_id: &str, expt_id: &str, run_id: &str) -> Result<Envelope> {
        self.task
            .delete(&self.single(collab_id, project_id, expt_id, run_id)?)
            .await
    }
}
