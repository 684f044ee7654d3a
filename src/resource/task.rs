//! Generic resource task
//!
//! The shape every typed task shares: check the capability, resolve the URL
//! for the caller's scope, dispatch one request and hand back the envelope.

use super::registry::{endpoint_table, EndpointTable, Operation, ResourceKind};
use super::resolver::resolve;
use super::scope::ScopeKeys;
use crate::grid::{Envelope, GridClient, GridError, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Serialize a typed payload into the JSON body sent to the grid
pub fn to_payload<T: Serialize>(payload: &T) -> Result<Value> {
    Ok(serde_json::to_value(payload)?)
}

/// Task bound to one resource kind
#[derive(Clone, Debug)]
pub struct ResourceTask {
    kind: ResourceKind,
    client: GridClient,
    table: &'static EndpointTable,
}

impl ResourceTask {
    /// Create a task backed by the embedded endpoint table
    pub fn new(kind: ResourceKind, client: GridClient) -> Self {
        Self::with_table(kind, client, endpoint_table())
    }

    pub fn with_table(kind: ResourceKind, client: GridClient, table: &'static EndpointTable) -> Self {
        Self { kind, client, table }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn client(&self) -> &GridClient {
        &self.client
    }

    /// Check the operation is supported, before anything touches the network
    pub fn ensure_supported(&self, operation: Operation) -> Result<()> {
        if self.table.get(self.kind)?.supports(operation) {
            Ok(())
        } else {
            Err(GridError::Capability {
                kind: self.kind,
                operation,
            })
        }
    }

    /// Resolve the URL addressed by `keys`
    pub fn url(&self, keys: &ScopeKeys) -> Result<String> {
        resolve(self.table, self.kind, &self.client.address, keys)
    }

    async fn run(&self, operation: Operation, keys: &ScopeKeys, payload: Option<&Value>) -> Result<Envelope> {
        self.ensure_supported(operation)?;
        let url = self.url(keys)?;

        let method = match operation {
            Operation::Create => Method::POST,
            Operation::ReadAll | Operation::Read => Method::GET,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        };

        self.client.execute(method, &url, payload).await
    }

    /// POST `payload` to the collection addressed by `keys`
    pub async fn create(&self, keys: &ScopeKeys, payload: Option<&Value>) -> Result<Envelope> {
        self.run(Operation::Create, keys, payload).await
    }

    /// GET every record under the scope addressed by `keys`
    pub async fn read_all(&self, keys: &ScopeKeys) -> Result<Envelope> {
        self.run(Operation::ReadAll, keys, None).await
    }

    /// GET the single record addressed by `keys`
    pub async fn read(&self, keys: &ScopeKeys) -> Result<Envelope> {
        self.run(Operation::Read, keys, None).await
    }

    /// PUT caller-supplied overrides to the record addressed by `keys`
    pub async fn update(&self, keys: &ScopeKeys, payload: &Value) -> Result<Envelope> {
        self.run(Operation::Update, keys, Some(payload)).await
    }

    /// DELETE the record addressed by `keys`
    pub async fn delete(&self, keys: &ScopeKeys) -> Result<Envelope> {
        self.run(Operation::Delete, keys, None).await
    }

    /// Run `operation` with an optional raw payload (used by the CLI)
    pub async fn perform(&self, operation: Operation, keys: &ScopeKeys, payload: Option<&Value>) -> Result<Envelope> {
        self.run(operation, keys, payload).await
    }
}
