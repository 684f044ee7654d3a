//! Resource abstraction layer
//!
//! This module provides a data-driven approach to addressing grid resources.
//! Endpoint templates are loaded from JSON files at compile time, so routing
//! is a table lookup rather than per-resource conditionals.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and validates endpoint templates from embedded JSON
//! - [`resolver`] - Parses templates and selects one by exact key-set match
//! - [`scope`] - Scope keys, identifier sets and signatures
//! - [`task`] - Generic create/read/update/delete over a resource kind
//!
//! # Endpoint Definitions
//!
//! Templates are defined in JSON files under `src/resources/`, one per phase:
//! - `connect.json` - collaborations, projects, experiments, runs,
//!   participants, registrations, tags
//! - `train.json` - alignments, models, optimizations
//! - `evaluate.json` - validations, predictions
//!
//! # Example
//!
//! ```ignore
//! use synergos::resource::{ResourceKind, ResourceTask, ScopeKeys};
//!
//! async fn list_runs(client: GridClient) -> synergos::Result<Envelope> {
//!     let runs = ResourceTask::new(ResourceKind::Run, client);
//!     runs.read_all(&ScopeKeys::new().collab("c").project("p").expt("e")).await
//! }
//! ```

pub mod registry;
pub mod resolver;
pub mod scope;
pub mod task;

pub use registry::{endpoint_table, EndpointTable, Operation, Phase, ResourceEndpoints, ResourceKind};
pub use resolver::{resolve, EndpointTemplate};
pub use scope::{ScopeKey, ScopeKeys, Signature};
pub use task::{to_payload, ResourceTask};
