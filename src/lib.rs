//! # sfx
//!
//! Incremental Salesforce record extraction for Rust.
//!
//! Records are fetched by query, by "updated since" window or by "deleted
//! since" window, across as many pages and id batches as the result needs.
//!
//! ## Security
//!
//! - Passwords, session ids and proxy passwords are redacted in Debug output
//! - Tracing spans skip credential parameters
//! - Error messages built from server responses are sanitized
//!
//! ## Crates
//!
//! - **sfx-client** - HTTP transport: compression, timeouts, explicit proxy, error mapping
//! - **sfx-auth** - Partner SOAP login and logout, login fault codes, credentials
//! - **sfx-rest** - REST API: query, describe, replication, SObject collections
//! - **sfx-extract** - Sessions, fetch modes, id batching, deletion reconciliation, field metadata
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sfx::{FetchMode, FetchRequest, Session, SessionConfig, TimeWindow};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::rest(SessionConfig::from_env()?)?;
//!     session.connect().await?;
//!
//!     let request = FetchRequest::object("Contact", ["Id", "LastName", "Account.Name"])
//!         .with_mode(FetchMode::UpdatedSince(TimeWindow::last_hours(24)?));
//!     let mut fetch = session.fetch(&request).await?;
//!     fetch
//!         .for_each(|record, _| println!("{}", record.to_json()))
//!         .await?;
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
#[cfg(feature = "auth")]
pub use sfx_auth as auth;
#[cfg(feature = "client")]
pub use sfx_client as client;
#[cfg(feature = "extract")]
pub use sfx_extract as extract;
#[cfg(feature = "rest")]
pub use sfx_rest as rest;

// Re-export commonly used types at the top level
#[cfg(feature = "auth")]
pub use sfx_auth::{Credentials, SalesforceCredentials};
#[cfg(feature = "client")]
pub use sfx_client::{ClientConfig, ProxyConfig};
#[cfg(feature = "extract")]
pub use sfx_extract::{
    value_at, Fetch, FetchMode, FetchRequest, FieldRef, Payload, Record, RestBackend, Session,
    SessionConfig, TimeWindow,
};
#[cfg(feature = "rest")]
pub use sfx_rest::SalesforceRestClient;
