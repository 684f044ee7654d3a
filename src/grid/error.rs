//! Grid Errors
//!
//! Every failure surfaced by the client is a [`GridError`]. Nothing is
//! recovered locally: scope, capability and empty-cache errors are raised
//! before any network call, the rest describe the single round trip.

use crate::resource::{Operation, ResourceKind, Signature};
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, GridError>;

/// Error returned by grid tasks, the resolver and the dispatcher
#[derive(Debug, Error)]
pub enum GridError {
    /// No registered template matches the supplied identifier keys
    #[error("no key combination matches any registered {kind} template (got [{supplied}])")]
    Scope {
        kind: ResourceKind,
        supplied: Signature,
    },

    /// The service could not be reached
    #[error("failed to reach grid at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered outside the accepted status set
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// The response body is not valid JSON
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The resource kind does not support the requested operation
    #[error("{kind} task does not support '{operation}' operation")]
    Capability {
        kind: ResourceKind,
        operation: Operation,
    },

    /// Registration create was invoked without any queued node
    #[error("no nodes queued; add at least 1 node before registering")]
    EmptyCache,

    /// Node id is malformed or not present in the registry
    #[error("invalid node id '{0}'")]
    UnknownNode(String),

    /// Payload could not be serialized to JSON
    #[error("failed to serialize payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Base address is not a usable http(s) URL
    #[error("invalid grid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Endpoint table is malformed
    #[error("invalid endpoint table: {0}")]
    InvalidTable(String),

    /// The underlying HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl GridError {
    /// HTTP status carried by the error, if the service answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error was raised before any network call was made
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Scope { .. }
                | Self::Capability { .. }
                | Self::EmptyCache
                | Self::UnknownNode(_)
                | Self::Payload(_)
                | Self::InvalidAddress { .. }
                | Self::InvalidTable(_)
        )
    }
}
