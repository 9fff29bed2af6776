use serde_json::Value;
use tracing::instrument;

use sfx_client::security::soql;

use crate::collections::{CollectionRequest, CollectionResult, RetrieveRequest};
use crate::error::{Error, Result};

/// Tag each record with its object type, keeping a type already present.
fn with_type(sobject: &str, records: &[Value]) -> Vec<Value> {
    records
        .iter()
        .map(|record| {
            let mut value = record.clone();
            if let Value::Object(ref mut map) = value {
                map.entry("attributes")
                    .or_insert_with(|| serde_json::json!({ "type": sobject }));
            }
            value
        })
        .collect()
}

impl super::SalesforceRestClient {
    /// Retrieve records by id (up to 2000 per call).
    ///
    /// The result has one entry per id, in request order; `None` marks an id
    /// that could not be retrieved (deleted, or not visible to the user).
    #[instrument(skip(self, ids, fields), fields(ids = ids.len()))]
    pub async fn retrieve_multiple(
        &self,
        sobject: &str,
        ids: &[String],
        fields: &[String],
    ) -> Result<Vec<Option<Value>>> {
        super::check_sobject(sobject)?;
        super::check_ids(ids)?;
        if soql::build_select(fields).is_none() {
            return Err(Error::invalid("INVALID_FIELDS", "No valid field names provided"));
        }
        let path = format!("composite/sobjects/{}", sobject);
        self.client
            .rest_post(&path, &RetrieveRequest { ids, fields })
            .await
            .map_err(Into::into)
    }

    /// Create records in a single request (up to 200).
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn create_multiple(
        &self,
        sobject: &str,
        records: &[Value],
        all_or_none: bool,
    ) -> Result<Vec<CollectionResult>> {
        super::check_sobject(sobject)?;
        let request = CollectionRequest {
            all_or_none,
            records: with_type(sobject, records),
        };
        self.client
            .rest_post("composite/sobjects", &request)
            .await
            .map_err(Into::into)
    }

    /// Update records in a single request (up to 200). Each record carries its `Id`.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn update_multiple(
        &self,
        sobject: &str,
        records: &[Value],
        all_or_none: bool,
    ) -> Result<Vec<CollectionResult>> {
        super::check_sobject(sobject)?;
        let ids: Vec<&str> = records
            .iter()
            .map(|r| r.get("Id").and_then(Value::as_str).unwrap_or_default())
            .collect();
        super::check_ids(&ids)?;
        let request = CollectionRequest {
            all_or_none,
            records: with_type(sobject, records),
        };
        self.client
            .rest_patch("composite/sobjects", &request)
            .await
            .map_err(Into::into)
    }

    /// Upsert records matched on `external_id_field` (up to 200).
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn upsert_multiple(
        &self,
        sobject: &str,
        external_id_field: &str,
        records: &[Value],
        all_or_none: bool,
    ) -> Result<Vec<CollectionResult>> {
        super::check_sobject(sobject)?;
        if !soql::is_safe_field_name(external_id_field) {
            return Err(Error::invalid("INVALID_FIELD", "Invalid external id field name"));
        }
        let request = CollectionRequest {
            all_or_none,
            records: with_type(sobject, records),
        };
        let path = format!("composite/sobjects/{}/{}", sobject, external_id_field);
        self.client
            .rest_patch(&path, &request)
            .await
            .map_err(Into::into)
    }

    /// Delete records in a single request (up to 200).
    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    pub async fn delete_multiple(
        &self,
        ids: &[String],
        all_or_none: bool,
    ) -> Result<Vec<CollectionResult>> {
        super::check_ids(ids)?;
        let url = self.client.rest_url("composite/sobjects");
        self.client
            .delete_json(
                &url,
                &[("ids", ids.join(",")), ("allOrNone", all_or_none.to_string())],
            )
            .await
            .map_err(Into::into)
    }
}
