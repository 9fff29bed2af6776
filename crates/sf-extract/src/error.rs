//! Error types for sfx-extract.

use crate::transport::Fault;

/// Result type alias for sfx-extract operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sfx-extract operations.
///
/// Every error is terminal for the operation that raised it; nothing in this
/// crate retries.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    /// Wrap a query-side fault with what was being attempted.
    pub(crate) fn query(context: impl std::fmt::Display, fault: Fault) -> Self {
        Self::with_source(ErrorKind::Query(format!("{context}: {fault}")), fault)
    }

    /// Returns true if the error was raised before any remote call.
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration(_))
    }

    /// Returns true for schema errors (object not queryable or not replicable).
    pub fn is_schema(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ObjectNotQueryable(_) | ErrorKind::ObjectNotReplicable(_)
        )
    }

    /// The remote fault code behind this error, if there was one.
    pub fn fault_code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::AccessRestricted { code, .. } => Some(code),
            _ => self
                .source
                .as_ref()
                .and_then(|s| s.downcast_ref::<Fault>())
                .and_then(|f| f.code.as_deref()),
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid settings or arguments; raised before any remote call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Login refused: invalid credentials or access restricted.
    #[error("Invalid credentials or access restricted ({code}): {message}")]
    AccessRestricted { code: String, message: String },

    /// Any other login or transport failure.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Object {0} is not queryable")]
    ObjectNotQueryable(String),

    /// The object does not support getUpdated/getDeleted.
    #[error("Object {0} is not replicable")]
    ObjectNotReplicable(String),

    /// The describe result is unusable (e.g. a reference without a target).
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// query, queryMore, getUpdated, getDeleted or retrieve failed.
    #[error("Query error: {0}")]
    Query(String),

    /// `advance` was called on a page that is already done.
    #[error("Query is done; no further pages")]
    NotDone,

    /// A write call was rejected as a whole.
    #[error("{operation} failed: {message}")]
    Write {
        operation: &'static str,
        message: String,
    },

    /// Releasing the remote session failed.
    #[error("Close error: {0}")]
    Close(String),

    /// The session has not been connected.
    #[error("Session is not connected")]
    NotConnected,

    /// The session was closed and cannot be used again.
    #[error("Session is closed")]
    SessionClosed,
}
