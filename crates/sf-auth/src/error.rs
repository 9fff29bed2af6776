//! Error types for sfx-auth.
//!
//! Messages never carry passwords or session ids.

/// Result type alias for sfx-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sfx-auth operations.
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

    /// The login fault code (e.g. `INVALID_LOGIN`) if the server rejected the login.
    pub fn login_fault_code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::LoginFault { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The server answered the login call with a fault.
    #[error("Login fault: {code} - {message}")]
    LoginFault { code: String, message: String },

    /// The login response could not be understood.
    #[error("Invalid login response: {0}")]
    InvalidResponse(String),

    /// Invalid credentials configuration.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Transport or non-login API failure.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<sfx_client::Error> for Error {
    fn from(err: sfx_client::Error) -> Self {
        let kind = match &err.kind {
            sfx_client::ErrorKind::SoapFault {
                fault_code,
                message,
            } => ErrorKind::LoginFault {
                code: fault_code.clone(),
                message: message.clone(),
            },
            _ => {
                let message = err.to_string();
                if message.contains("Bearer") || message.contains("sessionId") {
                    ErrorKind::Http("Client error (details redacted)".to_string())
                } else {
                    ErrorKind::Http(message)
                }
            }
        };
        Error::with_source(kind, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidResponse(format!("bad URL: {}", err)), err)
    }
}
