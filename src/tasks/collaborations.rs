//! Collaborations
//!
//! The grid's top-level scope. A collaboration optionally carries connection
//! metadata for the ecosystem components deployed alongside it.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use serde::Serialize;

/// Ports exposed by a deployed component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentPorts {
    /// Main interfacing port used for backend interactions
    pub main: u16,
    pub ui: u16,
    /// Ports partitioning incoming logs by source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysmetrics: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttp: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<u16>,
}

/// Connection metadata of one deployed component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub host: String,
    pub ports: ComponentPorts,
    /// Component is served over TLS
    pub secure: bool,
}

impl Component {
    /// Component reachable on a main port and an optional UI port (0 when absent)
    pub fn new(host: impl Into<String>, port: u16, ui_port: u16, secure: bool) -> Self {
        Self {
            host: host.into(),
            ports: ComponentPorts {
                main: port,
                ui: ui_port,
                ..Default::default()
            },
            secure,
        }
    }

    /// Logger component, which also listens on per-source ports
    pub fn logger(host: impl Into<String>, ports: ComponentPorts, secure: bool) -> Self {
        Self {
            host: host.into(),
            ports,
            secure,
        }
    }
}

/// Components declared for a collaboration. Undeclared sections are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollaborationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalogue: Option<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter: Option<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mlops: Option<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mq: Option<Component>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl CollaborationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalogue(mut self, catalogue: Component) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    pub fn with_logger(mut self, logs: Component) -> Self {
        self.logs = Some(logs);
        self
    }

    pub fn with_meter(mut self, meter: Component) -> Self {
        self.meter = Some(meter);
        self
    }

    pub fn with_mlops(mut self, mlops: Component) -> Self {
        self.mlops = Some(mlops);
        self
    }

    pub fn with_mq(mut self, mq: Component) -> Self {
        self.mq = Some(mq);
        self
    }
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    config: &'a CollaborationConfig,
    /// Serialized last so it takes precedence over an `extra` entry of the same name
    collab_id: &'a str,
}

/// Collaboration CRUD against the grid
#[derive(Clone, Debug)]
pub struct CollaborationTask {
    task: ResourceTask,
}

impl CollaborationTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Collaboration, client),
        }
    }

    fn single(&self, collab_id: &str) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new().collab(collab_id);
        require(self.task.kind(), &keys, &[ScopeKey::Collaboration])?;
        Ok(keys)
    }

    /// Register a collaboration with its declared components
    pub async fn create(&self, collab_id: &str, config: &CollaborationConfig) -> Result<Envelope> {
        self.single(collab_id)?;
        let payload = to_payload(&CreateBody { collab_id, config })?;
        self.task.create(&ScopeKeys::new(), Some(&payload)).await
    }

    pub async fn read_all(&self) -> Result<Envelope> {
        self.task.read_all(&ScopeKeys::new()).await
    }

    pub async fn read(&self, collab_id: &str) -> Result<Envelope> {
        self.task.read(&self.single(collab_id)?).await
    }

    /// Send only the component sections declared in `updates`
    pub async fn update(&self, collab_id: &str, updates: &CollaborationConfig) -> Result<Envelope> {
        let keys = self.single(collab_id)?;
        self.task.update(&keys, &to_payload(updates)?).await
    }

    pub async fn delete(&self, collab_id: &str) -> Result<Envelope> {
        self.task.delete(&self.single(collab_id)?).await
    }
}
