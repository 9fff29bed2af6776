//! Collaborator traits the extraction core drives.
//!
//! The core never talks HTTP itself. A [`Backend`] logs in, answers schema
//! questions, runs queries and applies writes; [`crate::RestBackend`] is the
//! implementation over the REST and SOAP APIs.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::metadata::ObjectDescriptor;
use crate::record::{Record, ResultSet};
use crate::window::TimeWindow;

/// Per-record outcome of a write, as the service reports it.
pub use sfx_rest::CollectionResult as WriteResult;

/// A failure reported by a collaborator: an optional service fault code
/// plus a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub code: Option<String>,
    pub message: String,
}

impl Fault {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for Fault {}

/// Login parameters.
#[derive(Clone)]
pub struct LoginRequest {
    pub url: String,
    pub username: String,
    pub password: String,
    pub api_version: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// What a successful login tells the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginInfo {
    /// Endpoint the session is bound to.
    pub server_url: String,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_full_name: Option<String>,
    pub user_email: Option<String>,
    pub user_language: Option<String>,
    pub organization_name: Option<String>,
}

/// A batch of records handed to the service unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOperation {
    Insert {
        records: Vec<Value>,
        all_or_none: bool,
    },
    Update {
        records: Vec<Value>,
        all_or_none: bool,
    },
    /// Upsert on `key_field`, which must be an external id of `object`.
    Upsert {
        object: String,
        key_field: String,
        records: Vec<Value>,
        all_or_none: bool,
    },
    Delete {
        ids: Vec<String>,
        all_or_none: bool,
    },
}

impl WriteOperation {
    pub fn name(&self) -> &'static str {
        match self {
            WriteOperation::Insert { .. } => "insert",
            WriteOperation::Update { .. } => "update",
            WriteOperation::Upsert { .. } => "upsert",
            WriteOperation::Delete { .. } => "delete",
        }
    }

    /// Number of records or ids in the batch.
    pub fn len(&self) -> usize {
        match self {
            WriteOperation::Insert { records, .. }
            | WriteOperation::Update { records, .. }
            | WriteOperation::Upsert { records, .. } => records.len(),
            WriteOperation::Delete { ids, .. } => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An id deleted within a window, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedMarker {
    pub id: String,
    pub deleted_at: DateTime<Utc>,
}

/// An entry of the global object list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub name: String,
    pub queryable: bool,
}

/// Session lifecycle and writes.
pub trait SessionTransport {
    /// Authenticate; later calls run under this session.
    fn login(
        &mut self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<LoginInfo, Fault>> + Send;

    /// Apply a write batch and return the per-record results.
    fn call(
        &self,
        operation: WriteOperation,
    ) -> impl Future<Output = Result<Vec<WriteResult>, Fault>> + Send;

    /// Invalidate the session.
    fn close(&mut self) -> impl Future<Output = Result<(), Fault>> + Send;
}

/// Object metadata.
pub trait SchemaService {
    fn describe_object(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<ObjectDescriptor, Fault>> + Send;

    fn describe_global(&self) -> impl Future<Output = Result<Vec<ObjectSummary>, Fault>> + Send;
}

/// Queries and the replication calls.
pub trait QueryService {
    fn query(&self, soql: &str) -> impl Future<Output = Result<ResultSet, Fault>> + Send;

    /// Like `query`, including deleted and archived records.
    fn query_all(&self, soql: &str) -> impl Future<Output = Result<ResultSet, Fault>> + Send;

    fn query_more(&self, cursor: &str) -> impl Future<Output = Result<ResultSet, Fault>> + Send;

    fn get_updated(
        &self,
        object: &str,
        window: &TimeWindow,
    ) -> impl Future<Output = Result<Vec<String>, Fault>> + Send;

    fn get_deleted(
        &self,
        object: &str,
        window: &TimeWindow,
    ) -> impl Future<Output = Result<Vec<DeletedMarker>, Fault>> + Send;

    /// Fetch records by id. One entry per id, in order; `None` where no
    /// record came back.
    fn retrieve(
        &self,
        object: &str,
        fields: &[String],
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<Option<Record>>, Fault>> + Send;
}

/// Everything a [`crate::Session`] needs from its collaborator.
pub trait Backend: SessionTransport + SchemaService + QueryService + Send + Sync {}

impl<T> Backend for T where T: SessionTransport + SchemaService + QueryService + Send + Sync {}
