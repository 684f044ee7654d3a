//! Client SDK for the Synergos federated learning grid
//!
//! The grid exposes its resources over a REST interface whose URLs nest ids
//! of enclosing resources. This crate maps each resource kind to its endpoint
//! templates, picks the template matching exactly the ids a caller supplies,
//! and dispatches one request per operation.
//!
//! # Module Structure
//!
//! - [`grid`] - Base address, HTTP dispatcher, response envelope and errors
//! - [`resource`] - Endpoint table, URL resolution and the generic task
//! - [`tasks`] - Typed tasks and payloads, one per resource kind
//! - [`driver`] - [`Driver`], bundling every task behind one address

pub mod driver;
pub mod grid;
pub mod resource;
pub mod tasks;

pub use driver::Driver;
pub use grid::{Envelope, GridAddress, GridClient, GridError, Result};
pub use resource::{Operation, ResourceKind, ScopeKey, ScopeKeys};
pub use tasks::{NodeDescriptor, NodeRegistry, Role, TriggerOptions};
