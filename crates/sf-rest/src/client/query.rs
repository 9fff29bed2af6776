use serde::de::DeserializeOwned;
use tracing::instrument;

use sfx_client::QueryResult;

use crate::error::Result;

impl super::SalesforceRestClient {
    /// Execute a SOQL query and return the first page.
    ///
    /// Values spliced into the WHERE clause must already be escaped.
    #[instrument(skip(self))]
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        self.client.query(soql).await.map_err(Into::into)
    }

    /// Execute a SOQL query including deleted and archived records.
    #[instrument(skip(self))]
    pub async fn query_all_including_deleted<T: DeserializeOwned>(
        &self,
        soql: &str,
    ) -> Result<QueryResult<T>> {
        self.client.query_all_rows(soql).await.map_err(Into::into)
    }

    /// Fetch the next page of query results.
    #[instrument(skip(self))]
    pub async fn query_more<T: DeserializeOwned>(
        &self,
        next_records_url: &str,
    ) -> Result<QueryResult<T>> {
        self.client
            .query_more(next_records_url)
            .await
            .map_err(Into::into)
    }
}
