//! Grid interaction module
//!
//! This module provides the transport layer shared by every task: the base
//! address, the HTTP dispatcher and the error taxonomy.
//!
//! # Module Structure
//!
//! - [`client`] - Grid client bundling the base address and HTTP client
//! - [`error`] - [`GridError`] and the crate-wide `Result` alias
//! - [`http`] - Request dispatcher and response envelope
//!
//! # Example
//!
//! ```ignore
//! use synergos::grid::{GridAddress, GridClient};
//!
//! async fn example() -> synergos::Result<()> {
//!     let client = GridClient::new(GridAddress::new("localhost", 5000, false)?)?;
//!     let url = format!("{}/ttp/connect/participants", client.address);
//!     let participants = client.http.get(&url).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;

pub use client::{GridAddress, GridClient};
pub use error::{GridError, Result};
pub use http::{format_grid_error, Envelope, GridHttpClient, ACCEPTED_STATUSES};
