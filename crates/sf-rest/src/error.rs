//! Error types for sfx-rest.

/// Result type alias for sfx-rest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sfx-rest operations.
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

    pub(crate) fn invalid(error_code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Salesforce {
            error_code: error_code.to_string(),
            message: message.into(),
        })
    }

    /// The Salesforce error code, if the server (or input validation) supplied one.
    pub fn error_code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Salesforce { error_code, .. } => Some(error_code),
            _ => None,
        }
    }

    /// Returns true if the session was rejected.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Auth(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Salesforce rejected the request, or the request failed validation
    /// before being sent.
    #[error("Salesforce error: {error_code} - {message}")]
    Salesforce { error_code: String, message: String },

    /// Session missing, expired or invalid.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Transport failure from the HTTP layer.
    #[error("Client error: {0}")]
    Client(String),

    /// Response body did not have the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<sfx_client::Error> for Error {
    fn from(err: sfx_client::Error) -> Self {
        let kind = match &err.kind {
            sfx_client::ErrorKind::SalesforceApi {
                error_code,
                message,
                ..
            } => ErrorKind::Salesforce {
                error_code: error_code.clone(),
                message: message.clone(),
            },
            sfx_client::ErrorKind::SoapFault {
                fault_code,
                message,
            } => ErrorKind::Salesforce {
                error_code: fault_code.clone(),
                message: message.clone(),
            },
            sfx_client::ErrorKind::Authentication(message) => ErrorKind::Auth(message.clone()),
            sfx_client::ErrorKind::Json(message) => ErrorKind::Serialization(message.clone()),
            _ => ErrorKind::Client(err.to_string()),
        };
        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Serialization(err.to_string()), err)
    }
}
