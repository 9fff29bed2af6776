//! Replication API types (getUpdated / getDeleted).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Result of a getDeleted request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetDeletedResult {
    #[serde(rename = "deletedRecords", default)]
    pub deleted_records: Vec<DeletedRecord>,
    #[serde(rename = "earliestDateAvailable", default)]
    pub earliest_date_available: Option<String>,
    #[serde(rename = "latestDateCovered", default)]
    pub latest_date_covered: Option<String>,
}

/// A deleted record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeletedRecord {
    pub id: String,
    #[serde(rename = "deletedDate")]
    pub deleted_date: String,
}

impl DeletedRecord {
    /// The deletion timestamp, if it parses.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        parse_datetime(&self.deleted_date)
    }
}

/// Result of a getUpdated request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetUpdatedResult {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(rename = "latestDateCovered", default)]
    pub latest_date_covered: Option<String>,
}

/// Format a timestamp the way the replication endpoints expect it
/// (`2024-01-01T00:00:00Z`).
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a Salesforce datetime. Accepts RFC 3339 as well as the
/// `+0000` offset form the API returns.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
