use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::error::Result;
use crate::sync::{format_datetime, GetDeletedResult, GetUpdatedResult};

impl super::SalesforceRestClient {
    /// Get deleted records of an SObject type within `[start, end]`.
    #[instrument(skip(self))]
    pub async fn get_deleted(
        &self,
        sobject: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<GetDeletedResult> {
        super::check_sobject(sobject)?;
        let path = format!(
            "sobjects/{}/deleted/?start={}&end={}",
            sobject,
            urlencoding::encode(&format_datetime(&start)),
            urlencoding::encode(&format_datetime(&end))
        );
        self.client.rest_get(&path).await.map_err(Into::into)
    }

    /// Get ids of records of an SObject type updated within `[start, end]`.
    #[instrument(skip(self))]
    pub async fn get_updated(
        &self,
        sobject: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<GetUpdatedResult> {
        super::check_sobject(sobject)?;
        let path = format!(
            "sobjects/{}/updated/?start={}&end={}",
            sobject,
            urlencoding::encode(&format_datetime(&start)),
            urlencoding::encode(&format_datetime(&end))
        );
        self.client.rest_get(&path).await.map_err(Into::into)
    }
}
