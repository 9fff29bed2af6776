//! HTTP response handling with Salesforce-specific extensions.

use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};
use crate::soap;

/// Wrapper around HTTP response with additional functionality.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        let status = self.status();
        (200..300).contains(&status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.inner.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}

/// Extension trait for processing Salesforce API responses.
pub trait ResponseExt {
    /// Check for Salesforce API errors and convert to appropriate error type.
    fn check_salesforce_error(self) -> impl std::future::Future<Output = Result<Response>> + Send;
}

/// Parse an error body (REST JSON or SOAP fault) into an error.
fn parse_error_response(status: u16, body: &str) -> Error {
    if let Some(fault) = soap::parse_fault(body) {
        return Error::new(ErrorKind::SoapFault {
            fault_code: fault.code,
            message: sanitize_error_message(&fault.message),
        });
    }

    // Array format: [{"errorCode": ..., "message": ...}]
    if let Ok(errors) = serde_json::from_str::<Vec<SalesforceErrorResponse>>(body) {
        if let Some(err) = errors.into_iter().next() {
            return Error::new(ErrorKind::SalesforceApi {
                error_code: err.error_code,
                message: sanitize_error_message(&err.message),
                fields: err.fields.unwrap_or_default(),
            });
        }
    }

    if let Ok(err) = serde_json::from_str::<SalesforceErrorResponse>(body) {
        return Error::new(ErrorKind::SalesforceApi {
            error_code: err.error_code,
            message: sanitize_error_message(&err.message),
            fields: err.fields.unwrap_or_default(),
        });
    }

    let sanitized = sanitize_error_message(body);
    let kind = match status {
        401 => ErrorKind::Authentication(sanitized),
        403 => ErrorKind::Authorization(sanitized),
        404 => ErrorKind::NotFound(sanitized),
        _ => ErrorKind::Http {
            status,
            message: sanitized,
        },
    };

    Error::new(kind)
}

impl ResponseExt for Response {
    async fn check_salesforce_error(self) -> Result<Response> {
        let status = self.status();

        if self.is_success() {
            return Ok(self);
        }

        let body = self.text().await.unwrap_or_default();
        Err(parse_error_response(status, &body))
    }
}

/// Sanitize an error message to prevent exposing sensitive data.
///
/// Truncates messages longer than 500 characters and redacts anything that
/// looks like an access token or a session id.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = message.to_string();

    // Session ids are "<org id>!<opaque>"
    if let Ok(token_pattern) = regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+") {
        sanitized = token_pattern
            .replace_all(&sanitized, "[REDACTED_TOKEN]")
            .to_string();
    }

    if let Ok(session_pattern) = regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}") {
        sanitized = session_pattern
            .replace_all(&sanitized, "sid=[REDACTED]")
            .to_string();
    }

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}

/// Salesforce API error response format.
#[derive(Debug, serde::Deserialize)]
struct SalesforceErrorResponse {
    #[serde(alias = "errorCode")]
    error_code: String,
    message: String,
    fields: Option<Vec<String>>,
}
