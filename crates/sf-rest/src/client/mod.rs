//! Salesforce REST API client.
//!
//! This client wraps `SalesforceClient` from `sfx-client` and provides
//! typed methods for query, describe, replication and collection calls.

use sfx_auth::Credentials;
use sfx_client::{ClientConfig, SalesforceClient};

use crate::error::{Error, Result};

mod collections;
mod describe;
mod query;
mod sync;

/// Salesforce REST API client.
///
/// # Example
///
/// ```rust,ignore
/// use sfx_rest::SalesforceRestClient;
///
/// let client = SalesforceRestClient::new("https://myorg.my.salesforce.com", session_id)?;
/// let page = client.query::<serde_json::Value>("SELECT Id, Name FROM Account").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SalesforceRestClient {
    client: SalesforceClient,
}

impl SalesforceRestClient {
    /// Create a new REST client with the given instance URL and session id.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = SalesforceClient::new(instance_url, access_token)?;
        Ok(Self { client })
    }

    /// Create a new REST client with custom HTTP configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let client = SalesforceClient::with_config(instance_url, access_token, config)?;
        Ok(Self { client })
    }

    /// Create a REST client for an authenticated session.
    pub fn from_credentials(credentials: &impl Credentials, config: ClientConfig) -> Result<Self> {
        let client = SalesforceClient::with_config(
            credentials.instance_url(),
            credentials.access_token(),
            config,
        )?
        .with_api_version(credentials.api_version());
        Ok(Self { client })
    }

    /// Get the underlying SalesforceClient.
    pub fn inner(&self) -> &SalesforceClient {
        &self.client
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        self.client.instance_url()
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        self.client.api_version()
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.client = self.client.with_api_version(version);
        self
    }
}

fn check_sobject(sobject: &str) -> Result<()> {
    if sfx_client::security::soql::is_safe_sobject_name(sobject) {
        Ok(())
    } else {
        Err(Error::invalid("INVALID_SOBJECT", "Invalid SObject name"))
    }
}

fn check_ids<S: AsRef<str>>(ids: &[S]) -> Result<()> {
    if ids
        .iter()
        .all(|id| sfx_client::security::url::is_valid_salesforce_id(id.as_ref()))
    {
        Ok(())
    } else {
        Err(Error::invalid("INVALID_ID", "Invalid Salesforce ID format"))
    }
}
