//! End-to-end tests against a stateful fake grid
//!
//! The fake grid stores what it is sent, so these tests check that records
//! created through the tasks read back intact, that updates only carry the
//! caller's overrides, and that deleted records are gone.

mod common;

use common::FakeGrid;
use serde_json::{json, Value};
use synergos::tasks::{
    CollaborationConfig, Component, ExperimentConfig, LayerSpec, ParticipantConfig, ProjectConfig, RunConfig,
    RunUpdate, TagConfig, TagUpdate,
};
use synergos::{GridError, NodeDescriptor, NodeRegistry, Role};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Every field of `sent` is present with the same value in `stored`
fn assert_contains(stored: &Value, sent: &Value) {
    for (field, value) in sent.as_object().unwrap() {
        assert_eq!(stored.get(field), Some(value), "field {} differs", field);
    }
}

fn layers() -> Vec<LayerSpec> {
    vec![
        LayerSpec::new("Linear", true)
            .activation("sigmoid")
            .param("bias", true)
            .param("in_features", 15)
            .param("out_features", 1),
    ]
}

/// Test module for create-then-read over every CRUD kind
mod create_read_tests {
    use super::*;

    /// Test a collaboration reads back with its declared components
    #[tokio::test]
    async fn test_collaboration_roundtrip() {
        let (server, _grid) = FakeGrid::start().await;
        let collaborations = common::driver_for(&server).collaborations();

        let config = CollaborationConfig::default().with_catalogue(Component::new("172.18.0.2", 4000, 4001, false));
        let created = collaborations.create("c1", &config).await.unwrap();
        let read = collaborations.read("c1").await.unwrap();

        assert_eq!(read.status(), Some(200));
        assert_contains(read.data(), created.data());
        assert_eq!(read.data()["collab_id"], "c1");
        assert!(read.data().get("mq").is_none());
    }

    /// Test nested project, experiment and run records read back intact
    #[tokio::test]
    async fn test_nested_roundtrip() {
        let (server, _grid) = FakeGrid::start().await;
        let driver = common::driver_for(&server);

        let mut project = ProjectConfig::with_tiers(["tier_1"]);
        project.incentives.insert("tier_1".to_string(), vec!["u1".to_string()]);
        let created = driver.projects().create("c1", "p1", &project).await.unwrap();
        let read = driver.projects().read("c1", "p1").await.unwrap();
        assert_contains(read.data(), created.data());

        let experiment = ExperimentConfig::new(layers());
        let created = driver.experiments().create("c1", "p1", "e1", &experiment).await.unwrap();
        let read = driver.experiments().read("c1", "p1", "e1").await.unwrap();
        assert_contains(read.data(), created.data());

        let run = RunConfig::default();
        let created = driver.runs().create("c1", "p1", "e1", "r1", &run).await.unwrap();
        let read = driver.runs().read("c1", "p1", "e1", "r1").await.unwrap();
        assert_contains(read.data(), created.data());
        assert_eq!(read.data()["lr_scheduler"], "CyclicLR");
    }

    /// Test participants and tags read back intact
    #[tokio::test]
    async fn test_participant_and_tag_roundtrip() {
        let (server, _grid) = FakeGrid::start().await;
        let driver = common::driver_for(&server);

        let participant = ParticipantConfig {
            summary: "hospital".to_string(),
            email: Some("ops@example.org".to_string()),
            ..Default::default()
        };
        let created = driver.participants().create("u1", &participant).await.unwrap();
        let read = driver.participants().read("u1").await.unwrap();
        assert_contains(read.data(), created.data());
        assert!(read.data().get("phone").is_none());

        let tags = TagConfig::new(vec![vec!["train".to_string()]]);
        let created = driver.tags().create("c1", "p1", "u1", &tags).await.unwrap();
        let read = driver.tags().read("c1", "p1", "u1").await.unwrap();
        assert_contains(read.data(), created.data());
    }

    /// Test read_all lists every record created under a scope
    #[tokio::test]
    async fn test_read_all_lists_children() {
        let (server, _grid) = FakeGrid::start().await;
        let runs = common::driver_for(&server).runs();

        for run_id in ["r1", "r2"] {
            runs.create("c1", "p1", "e1", run_id, &RunConfig::default())
                .await
                .unwrap();
        }

        let listed = runs.read_all("c1", "p1", "e1").await.unwrap();
        let ids: Vec<&str> = listed
            .data()
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|run| run["run_id"].as_str())
            .collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }
}

/// Test module for update and delete semantics
mod update_delete_tests {
    use super::*;

    /// Test update merges overrides and leaves other fields untouched
    #[tokio::test]
    async fn test_update_merges_overrides() {
        let (server, grid) = FakeGrid::start().await;
        let runs = common::driver_for(&server).runs();

        runs.create("c1", "p1", "e1", "r1", &RunConfig::default())
            .await
            .unwrap();
        let updates = RunUpdate {
            rounds: Some(20),
            ..Default::default()
        };
        runs.update("c1", "p1", "e1", "r1", &updates).await.unwrap();

        let stored = grid
            .record("/ttp/connect/collaborations/c1/projects/p1/experiments/e1/runs/r1")
            .unwrap();
        assert_eq!(stored["rounds"], 20);
        assert_eq!(stored["epochs"], 100);
    }

    /// Test the PUT body carries only caller-supplied overrides
    #[tokio::test]
    async fn test_update_sends_no_defaults() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/ttp/connect/collaborations/c1/projects/p1/participants/u1/registration/tags"))
            .and(body_json(json!({"predict": [["predict"]]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200, "data": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let updates = TagUpdate {
            predict: Some(vec![vec!["predict".to_string()]]),
            ..Default::default()
        };
        common::driver_for(&server)
            .tags()
            .update("c1", "p1", "u1", &updates)
            .await
            .unwrap();
    }

    /// Test a deleted record is no longer readable
    #[tokio::test]
    async fn test_delete_then_read_is_not_found() {
        let (server, grid) = FakeGrid::start().await;
        let experiments = common::driver_for(&server).experiments();

        experiments
            .create("c1", "p1", "e1", &ExperimentConfig::new(layers()))
            .await
            .unwrap();
        experiments.delete("c1", "p1", "e1").await.unwrap();

        let err = experiments.read("c1", "p1", "e1").await.unwrap_err();
        assert!(matches!(err, GridError::UnexpectedStatus { status: 404, .. }));
        assert_eq!(grid.len(), 0);
    }

    /// Test deleting one run leaves its siblings listed and other experiments untouched
    #[tokio::test]
    async fn test_delete_removes_only_that_run() {
        let (server, _grid) = FakeGrid::start().await;
        let runs = common::driver_for(&server).runs();

        for run_id in ["r1", "r2", "r3"] {
            runs.create("c1", "p1", "e1", run_id, &RunConfig::default())
                .await
                .unwrap();
        }
        runs.create("c1", "p1", "e2", "r9", &RunConfig::default())
            .await
            .unwrap();
        runs.delete("c1", "p1", "e1", "r2").await.unwrap();

        let listed = runs.read_all("c1", "p1", "e1").await.unwrap();
        let ids: Vec<&str> = listed
            .data()
            .as_array()
            .unwrap()
            .iter()
            .map(|run| run["run_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["r1", "r3"]);
    }
}

/// Test module for a full federated cycle setup
mod scenario_tests {
    use super::*;

    /// Test the whole connection phase, then read the run back
    #[tokio::test]
    async fn test_connection_phase_scenario() {
        let (server, grid) = FakeGrid::start().await;
        let driver = common::driver_for(&server);

        driver
            .collaborations()
            .create("test_collab", &CollaborationConfig::default())
            .await
            .unwrap();

        let project = ProjectConfig::with_tiers(["tier_1", "tier_2", "tier_3"]);
        driver
            .projects()
            .create("test_collab", "test_project", &project)
            .await
            .unwrap();

        driver
            .experiments()
            .create("test_collab", "test_project", "test_experiment", &ExperimentConfig::new(layers()))
            .await
            .unwrap();

        let run = RunConfig {
            rounds: 2,
            epochs: 1,
            ..Default::default()
        };
        driver
            .runs()
            .create("test_collab", "test_project", "test_experiment", "test_run", &run)
            .await
            .unwrap();

        driver
            .participants()
            .create("test_participant", &ParticipantConfig::default())
            .await
            .unwrap();

        let mut registry = NodeRegistry::new();
        registry.add_node(NodeDescriptor::new("172.17.0.2", 8020, 5000));
        registry.add_node(NodeDescriptor::new("172.17.0.3", 8020, 5000));
        driver
            .registrations()
            .create("test_collab", "test_project", "test_participant", Role::Host, &mut registry)
            .await
            .unwrap();
        assert!(registry.is_empty());

        let registration = grid
            .record("/ttp/connect/collaborations/test_collab/projects/test_project/participants/test_participant/registration")
            .unwrap();
        assert_eq!(registration["n_count"], 2);
        assert_eq!(registration["node_1"]["host"], "172.17.0.3");

        let read = driver
            .runs()
            .read("test_collab", "test_project", "test_experiment", "test_run")
            .await
            .unwrap();
        assert_eq!(read.data()["rounds"], 2);
        assert_eq!(read.data()["epochs"], 1);
    }

    /// Test re-registering replaces the prior registration
    #[tokio::test]
    async fn test_reregistration_replaces_nodes() {
        let (server, grid) = FakeGrid::start().await;
        let registrations = common::driver_for(&server).registrations();
        let record = "/ttp/connect/collaborations/c1/projects/p1/participants/u1/registration";

        let mut registry = NodeRegistry::new();
        registry.add_node(NodeDescriptor::new("172.17.0.2", 8020, 5000));
        registry.add_node(NodeDescriptor::new("172.17.0.3", 8020, 5000));
        registrations
            .create("c1", "p1", "u1", Role::Guest, &mut registry)
            .await
            .unwrap();

        registry.add_node(NodeDescriptor::new("172.17.0.9", 8020, 5000));
        registrations
            .create("c1", "p1", "u1", Role::Host, &mut registry)
            .await
            .unwrap();

        let stored = grid.record(record).unwrap();
        assert_eq!(stored["role"], "host");
        assert_eq!(stored["n_count"], 1);
        assert!(stored.get("node_1").is_none());
    }
}
