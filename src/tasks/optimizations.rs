//! Optimizations
//!
//! Triggers hyperparameter tuning of an experiment. Each trial becomes a run
//! whose hyperparameters are sampled from the search space.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use serde::Serialize;
use serde_json::{Map, Value};

/// Tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationConfig {
    /// Hyperparameter name to its sampling spec, e.g.
    /// `{"rounds": {"_type": "choice", "_value": [1, 2]}}`
    pub search_space: Map<String, Value>,
    /// Tuning algorithm, e.g. "TPE" or "RandomSearch"
    pub tuner: String,
    /// Metric to optimize, e.g. "accuracy"
    pub metric: String,
    /// "maximize" or "minimize"
    pub optimize_mode: String,
    pub trial_concurrency: u32,
    /// Maximum wall time, e.g. "1h"
    pub max_exec_duration: String,
    pub max_trial_num: u32,
    pub is_remote: bool,
    pub use_annotation: bool,
    pub dockerised: bool,
    pub verbose: bool,
    pub log_msgs: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl OptimizationConfig {
    pub fn new(
        search_space: Map<String, Value>,
        tuner: impl Into<String>,
        metric: impl Into<String>,
        optimize_mode: impl Into<String>,
    ) -> Self {
        Self {
            search_space,
            tuner: tuner.into(),
            metric: metric.into(),
            optimize_mode: optimize_mode.into(),
            trial_concurrency: 1,
            max_exec_duration: "1h".to_string(),
            max_trial_num: 10,
            is_remote: true,
            use_annotation: true,
            dockerised: true,
            verbose: true,
            log_msgs: true,
            extra: ExtraFields::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OptimizationTask {
    task: ResourceTask,
}

impl OptimizationTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Optimization, client),
        }
    }

    fn keys(&self, collab_id: &str, project_id: &str, expt_id: &str) -> Result<ScopeKeys> {
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

    /// Start tuning an experiment
    pub async fn create(
        &self,
        collab_id: &str,
        project_id: &str,
        expt_id: &str,
        config: &OptimizationConfig,
    ) -> Result<Envelope> {
        let keys = self.keys(collab_id, project_id, expt_id)?;
        self.task.create(&keys, Some(&to_payload(config)?)).await
    }

    pub async fn read(&self, collab_id: &str, project_id: &str, expt_id: &str) -> Result<Envelope> {
        self.task
            .read(&self.keys(collab_id, project_id, expt_id)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let mut space = Map::new();
        space.insert("rounds".to_string(), json!({"_type": "choice", "_value": [1, 2]}));
        let body = to_payload(&OptimizationConfig::new(space, "TPE", "accuracy", "maximize")).unwrap();

        assert_eq!(body["tuner"], "TPE");
        assert_eq!(body["trial_concurrency"], 1);
        assert_eq!(body["max_exec_duration"], "1h");
        assert_eq!(body["max_trial_num"], 10);
        assert_eq!(body["is_remote"], true);
        assert_eq!(body["search_space"]["rounds"]["_value"], json!([1, 2]));
    }
}
