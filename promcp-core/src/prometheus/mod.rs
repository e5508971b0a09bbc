//! Prometheus query adapter
//!
//! Accepts a [`QueryDescriptor`], issues one call to the Prometheus HTTP API
//! (`/api/v1/query` or `/api/v1/query_range`) and collapses every outcome
//! into a [`QueryEnvelope`].
//!
//! # Example
//!
//! ```rust,no_run
//! use promcp_core::config::PrometheusConfig;
//! use promcp_core::prometheus::{PrometheusClient, QueryDescriptor};
//!
//! # async fn run() -> promcp_core::error::Result<()> {
//! let client = PrometheusClient::new(&PrometheusConfig::new("http://localhost:9090"))?;
//! let envelope = client.query(&QueryDescriptor::instant("up")).await;
//! println!("{}", serde_json::to_string_pretty(&envelope)?);
//! # Ok(())
//! # }
//! ```

mod client;
mod transport;
mod types;

pub use client::PrometheusClient;
pub use transport::{HttpReply, QueryTransport, ReqwestTransport, TransportError};
pub use types::{
    BackendRequest, Endpoint, ErrorType, QueryDescriptor, QueryEnvelope, QueryFailure, QueryType,
    QueryValidationError, ResponseStatus,
};
