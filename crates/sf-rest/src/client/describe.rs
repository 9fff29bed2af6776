use tracing::instrument;

use crate::describe::{DescribeGlobalResult, DescribeSObjectResult};
use crate::error::Result;

impl super::SalesforceRestClient {
    /// List every object visible to the session user.
    #[instrument(skip(self))]
    pub async fn describe_global(&self) -> Result<DescribeGlobalResult> {
        self.client.rest_get("sobjects").await.map_err(Into::into)
    }

    /// Describe one object, including its fields.
    #[instrument(skip(self))]
    pub async fn describe_sobject(&self, sobject: &str) -> Result<DescribeSObjectResult> {
        super::check_sobject(sobject)?;
        let path = format!("sobjects/{}/describe", sobject);
        self.client.rest_get(&path).await.map_err(Into::into)
    }
}
