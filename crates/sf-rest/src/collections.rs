//! SObject Collections for batch operations.

use serde::{Deserialize, Serialize};

/// Most records a collection write accepts per request.
pub const MAX_COLLECTION_WRITE: usize = 200;

/// Most ids a collection retrieve accepts per request.
pub const MAX_COLLECTION_RETRIEVE: usize = 2000;

/// Request for SObject Collections writes.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionRequest {
    #[serde(rename = "allOrNone")]
    pub all_or_none: bool,
    pub records: Vec<serde_json::Value>,
}

/// Request body for a collection retrieve.
#[derive(Debug, Clone, Serialize)]
pub struct RetrieveRequest<'a> {
    pub ids: &'a [String],
    pub fields: &'a [String],
}

/// Result of one record in a collection operation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CollectionResult {
    pub id: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<SalesforceError>,
    pub created: Option<bool>,
}

/// Error entry in operation results.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SalesforceError {
    #[serde(rename = "statusCode")]
    pub status_code: String,
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}
