//! # sfx-client
//!
//! HTTP transport shared by the sfx crates.
//!
//! This crate owns everything that touches the wire below the API surface:
//! - Request building with bearer authentication and SOAP envelopes
//! - Optional gzip/deflate compression
//! - Request and connect timeouts
//! - An explicit proxy configuration applied per client (never process-wide)
//! - Mapping of Salesforce error bodies onto a typed error
//!
//! Calls are made once; a failed call surfaces to the caller unchanged.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              sfx-extract (session, fetch, writes)           │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                            │
//!                 ▼                            ▼
//! ┌───────────────────────────┐  ┌──────────────────────────────┐
//! │ sfx-rest                  │  │ sfx-auth                     │
//! │ (query, describe, sync,   │  │ (SOAP login / logout)        │
//! │  collections)             │  │                              │
//! └───────────────────────────┘  └──────────────────────────────┘
//!                 │                            │
//!                 ▼                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ SalesforceClient / SfHttpClient                             │
//! │  - instance URL + session token                             │
//! │  - compression, timeout, proxy                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sfx_client::{ClientConfig, ProxyConfig, SalesforceClient};
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .with_timeout(Duration::from_secs(60))
//!     .with_proxy(ProxyConfig::new("proxy.internal", 3128))
//!     .build();
//!
//! let client = SalesforceClient::with_config(instance_url, session_id, config)?;
//! let limits: serde_json::Value = client.rest_get("limits").await?;
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod salesforce_client;
pub mod security;
pub mod soap;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, CompressionConfig, ProxyConfig};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBuilder, RequestMethod};
pub use response::{Response, ResponseExt};
pub use salesforce_client::{QueryResult, SalesforceClient};

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("sfx/", env!("CARGO_PKG_VERSION"));
