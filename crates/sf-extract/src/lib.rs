//! # sfx-extract
//!
//! Incremental extraction of Salesforce records.
//!
//! A [`Session`] logs in and runs fetches in one of three [`FetchMode`]s:
//!
//! - **All** - a SOQL query (optionally including deleted and archived
//!   rows), paged through with the server cursor
//! - **UpdatedSince** - ids changed within a [`TimeWindow`], materialized
//!   by id in batches of at most 2000
//! - **DeletedSince** - deletion markers within a window, matched by id
//!   against a `queryAll` of the object
//!
//! Records are trees; [`value_at`] reads a field by dotted path
//! (`Account.Owner.Name`). Field metadata lists writable fields and the
//! external-key lookups (`Account:Ext_Id__c/Account`) that
//! [`Payload`]s use for upserts.
//!
//! All remote work goes through the [`Backend`] traits. [`RestBackend`]
//! implements them over the partner SOAP login and the REST API. Calls are
//! made one at a time and never retried.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sfx_extract::{value_at, FetchMode, FetchRequest, Session, SessionConfig, TimeWindow};
//!
//! let mut session = Session::rest(SessionConfig::from_env()?)?;
//! session.connect().await?;
//!
//! let request = FetchRequest::object("Account", ["Id", "Name", "Owner.Alias"])
//!     .with_mode(FetchMode::DeletedSince(TimeWindow::last_hours(24)?));
//! let mut fetch = session.fetch(&request).await?;
//! fetch
//!     .for_each(|record, deleted_at| {
//!         println!("{:?} {:?} {:?}", value_at(record, "Id"), value_at(record, "Owner.Alias"), deleted_at);
//!     })
//!     .await?;
//!
//! session.close().await?;
//! ```

pub mod accessor;
mod batch;
mod config;
mod cursor;
mod error;
pub mod metadata;
mod payload;
pub mod reconcile;
mod record;
mod rest;
mod session;
pub mod transport;
mod window;

#[cfg(test)]
mod mock;

pub use accessor::{raw_children, value_at};
pub use batch::fetch_by_ids;
pub use config::{SessionConfig, DEFAULT_BATCH_LIMIT, MAX_WRITE_BATCH};
pub use cursor::{Fetch, FetchRequest};
pub use error::{Error, ErrorKind, Result};
pub use metadata::{ExternalKeyRef, FieldDescriptor, FieldKind, FieldRef, ObjectDescriptor};
pub use payload::Payload;
pub use reconcile::{DeletionIndex, Visit};
pub use record::{is_reserved, Field, FieldValue, Record, ResultSet, RESERVED_FIELDS};
pub use rest::RestBackend;
pub use session::Session;
pub use transport::{
    Backend, DeletedMarker, Fault, LoginInfo, LoginRequest, ObjectSummary, QueryService,
    SchemaService, SessionTransport, WriteOperation, WriteResult,
};
pub use window::{FetchMode, TimeWindow, MAX_WINDOW_DAYS};
