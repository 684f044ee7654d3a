//! Registrations
//!
//! A registration binds a participant, with the server nodes it contributes,
//! to a project in a given role. Nodes are queued in a caller-owned
//! [`NodeRegistry`] and consumed by [`RegistrationTask::create`].
//!
//! A registry is single-owner: share it across callers only behind your own
//! synchronization.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, GridError, Result};
use crate::resource::{to_payload, Operation, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const NODE_ID_PREFIX: &str = "node_";

/// Role of a participant within a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Participates to obtain an enhanced model
    Guest,
    /// Primarily contributes data
    Host,
    /// Trusted third party overseeing orchestration
    Arbiter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Guest => "guest",
            Self::Host => "host",
            Self::Arbiter => "arbiter",
        })
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "guest" => Ok(Self::Guest),
            "host" => Ok(Self::Host),
            "arbiter" => Ok(Self::Arbiter),
            other => Err(format!("unknown role '{}' (expected guest, host or arbiter)", other)),
        }
    }
}

/// A participant server node contributed to the federated cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeDescriptor {
    pub host: String,
    /// Websocket port used for federated training
    pub port: u16,
    /// REST port used for orchestration
    #[serde(rename = "f_port")]
    pub control_port: u16,
    /// Log computation operations
    pub log_msgs: bool,
    pub verbose: bool,
}

impl NodeDescriptor {
    pub fn new(host: impl Into<String>, port: u16, control_port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            control_port,
            log_msgs: false,
            verbose: false,
        }
    }

    pub fn log_msgs(mut self, enabled: bool) -> Self {
        self.log_msgs = enabled;
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }
}

/// Parses `HOST:PORT:CONTROL_PORT`
impl FromStr for NodeDescriptor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(control_port), Some(port), Some(host)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected HOST:PORT:CONTROL_PORT, got '{}'", s));
        };
        if host.is_empty() {
            return Err(format!("missing host in '{}'", s));
        }

        let port = port.parse().map_err(|_| format!("invalid port '{}'", port))?;
        let control_port = control_port
            .parse()
            .map_err(|_| format!("invalid control port '{}'", control_port))?;

        Ok(Self::new(host, port, control_port))
    }
}

/// Ordered, deduplicated queue of nodes awaiting registration
///
/// Nodes are addressed as `node_<index>`; indices are re-derived from order
/// after every removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: Vec<NodeDescriptor>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_id(idx: usize) -> String {
        format!("{}{}", NODE_ID_PREFIX, idx)
    }

    /// Queue a node; a node equal to one already queued is not duplicated
    pub fn add_node(&mut self, node: NodeDescriptor) -> String {
        let idx = match self.nodes.iter().position(|n| *n == node) {
            Some(idx) => idx,
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            },
        };
        Self::node_id(idx)
    }

    /// Remove a queued node by id
    pub fn remove_node(&mut self, node_id: &str) -> Result<NodeDescriptor> {
        let idx = node_id
            .strip_prefix(NODE_ID_PREFIX)
            .and_then(|idx| idx.parse::<usize>().ok())
            .filter(|idx| *idx < self.nodes.len())
            .ok_or_else(|| GridError::UnknownNode(node_id.to_string()))?;
        Ok(self.nodes.remove(idx))
    }

    /// Queued nodes with their ids, in insertion order
    pub fn list_nodes(&self) -> impl Iterator<Item = (String, &NodeDescriptor)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (Self::node_id(idx), node))
    }

    pub fn count_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Take every queued node, leaving the registry empty
    pub fn take(&mut self) -> Vec<NodeDescriptor> {
        std::mem::take(&mut self.nodes)
    }
}

#[derive(Serialize)]
struct CreateBody<'a> {
    role: Role,
    n_count: usize,
    #[serde(flatten)]
    nodes: BTreeMap<String, &'a NodeDescriptor>,
}

impl<'a> CreateBody<'a> {
    fn new(role: Role, nodes: &'a [NodeDescriptor]) -> Self {
        Self {
            role,
            n_count: nodes.len(),
            nodes: nodes
                .iter()
                .enumerate()
                .map(|(idx, node)| (NodeRegistry::node_id(idx), node))
                .collect(),
        }
    }
}

/// Overrides applied by `update`
///
/// Only changes attributes of nodes already registered; to add or drop nodes,
/// create the registration again.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Clone, Debug)]
pub struct RegistrationTask {
    task: ResourceTask,
}

impl RegistrationTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Registration, client),
        }
    }

    fn single(&self, collab_id: &str, project_id: &str, participant_id: &str) -> Result<ScopeKeys> {
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

    /// Whether a registration already exists for `keys`
    ///
    /// A read rejected with an unexpected status (e.g. 404) means none
    /// exists; transport and decode failures are propagated.
    async fn prior_exists(&self, keys: &ScopeKeys) -> Result<bool> {
        match self.task.read(keys).await {
            Ok(envelope) => Ok(matches!(envelope.status(), None | Some(200))),
            Err(GridError::UnexpectedStatus { status, .. }) => {
                tracing::debug!("No prior registration (lookup answered {})", status);
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    /// Register a participant's queued nodes under a project
    ///
    /// The registry is drained before any network call, so it is empty
    /// afterwards whatever the outcome. An existing registration for the same
    /// scope is deleted first. The two calls are not transactional: if the
    /// create fails after the delete succeeded, the prior registration is gone.
    pub async fn create(
        &self,
        collab_id: &str,
        project_id: &str,
        participant_id: &str,
        role: Role,
        nodes: &mut NodeRegistry,
    ) -> Result<Envelope> {
        let keys = self.single(collab_id, project_id, participant_id)?;
        self.task.ensure_supported(Operation::Create)?;

        if nodes.is_empty() {
            return Err(GridError::EmptyCache);
        }

        let queued = nodes.take();
        tracing::info!(
            "Registering {} node(s) for participant {} in {}/{}",
            queued.len(),
            participant_id,
            collab_id,
            project_id
        );
        let payload = to_payload(&CreateBody::new(role, &queued))?;

        let replaced = self.prior_exists(&keys).await?;
        if replaced {
            tracing::info!("Deleting prior registration of {} before re-registering", participant_id);
            self.task.delete(&keys).await?;
        }

        match self.task.create(&keys, Some(&payload)).await {
            Err(e) if replaced => {
                tracing::warn!(
                    "Registration of {} failed after its prior registration was deleted: {}",
                    participant_id,
                    e
                );
                Err(e)
            },
            result => result,
        }
    }

    /// Registrations matching whichever of the ids are given
    ///
    /// At least one id is required; the accepted combinations are those of
    /// the registered endpoints, e.g. a participant alone, a collaboration
    /// alone, or a collaboration and project.
    pub async fn read_all(
        &self,
        collab_id: Option<&str>,
        project_id: Option<&str>,
        participant_id: Option<&str>,
    ) -> Result<Envelope> {
        let keys = ScopeKeys::new()
            .with_opt(ScopeKey::Collaboration, collab_id)
            .with_opt(ScopeKey::Project, project_id)
            .with_opt(ScopeKey::Participant, participant_id);
        self.task.read_all(&keys).await
    }

    pub async fn read(&self, collab_id: &str, project_id: &str, participant_id: &str) -> Result<Envelope> {
        self.task
            .read(&self.single(collab_id, project_id, participant_id)?)
            .await
    }

    pub async fn update(
        &self,
        collab_id: &str,
        project_id: &str,
        participant_id: &str,
        updates: &RegistrationUpdate,
    ) -> Result<Envelope> {
        let keys = self.single(collab_id, project_id, participant_id)?;
        self.task.update(&keys, &to_payload(updates)?).await
    }

    pub async fn delete(&self, collab_id: &str, project_id: &str, participant_id: &str) -> Result<Envelope> {
        self.task
            .delete(&self.single(collab_id, project_id, participant_id)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(host: &str) -> NodeDescriptor {
        NodeDescriptor::new(host, 8020, 5000)
    }

    #[test]
    fn test_add_node_deduplicates() {
        let mut registry = NodeRegistry::new();
        assert_eq!(registry.add_node(node("172.17.0.2")), "node_0");
        assert_eq!(registry.add_node(node("172.17.0.3")), "node_1");
        assert_eq!(registry.add_node(node("172.17.0.2")), "node_0");
        assert_eq!(registry.count_nodes(), 2);
    }

    #[test]
    fn test_flags_distinguish_nodes() {
        let mut registry = NodeRegistry::new();
        registry.add_node(node("172.17.0.2"));
        assert_eq!(registry.add_node(node("172.17.0.2").verbose(true)), "node_1");
    }

    #[test]
    fn test_remove_node_reindexes() {
        let mut registry = NodeRegistry::new();
        registry.add_node(node("a"));
        registry.add_node(node("b"));
        registry.add_node(node("c"));

        let removed = registry.remove_node("node_1").unwrap();
        assert_eq!(removed.host, "b");

        let ids: Vec<(String, String)> = registry
            .list_nodes()
            .map(|(id, n)| (id, n.host.clone()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("node_0".to_string(), "a".to_string()),
                ("node_1".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn test_remove_node_rejects_invalid_ids() {
        let mut registry = NodeRegistry::new();
        registry.add_node(node("a"));
        for bad in ["node_1", "node_x", "1", "nodes_0", ""] {
            assert!(matches!(registry.remove_node(bad), Err(GridError::UnknownNode(_))));
        }
        assert_eq!(registry.count_nodes(), 1);
    }

    #[test]
    fn test_create_body_layout() {
        let nodes = vec![node("172.17.0.2").log_msgs(true).verbose(true)];
        let body = to_payload(&CreateBody::new(Role::Guest, &nodes)).unwrap();
        assert_eq!(
            body,
            json!({
                "role": "guest",
                "n_count": 1,
                "node_0": {
                    "host": "172.17.0.2",
                    "port": 8020,
                    "f_port": 5000,
                    "log_msgs": true,
                    "verbose": true
                }
            })
        );
    }

    #[test]
    fn test_node_descriptor_from_str() {
        let parsed: NodeDescriptor = "172.17.0.2:8020:5000".parse().unwrap();
        assert_eq!(parsed, node("172.17.0.2"));
        assert!("172.17.0.2:8020".parse::<NodeDescriptor>().is_err());
        assert!(":8020:5000".parse::<NodeDescriptor>().is_err());
        assert!("host:x:5000".parse::<NodeDescriptor>().is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Guest".parse::<Role>().unwrap(), Role::Guest);
        assert!("observer".parse::<Role>().is_err());
    }
}
