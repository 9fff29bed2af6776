//! Authenticated Salesforce client with typed HTTP methods.
//!
//! `SalesforceClient` pairs an instance URL and session token with an
//! [`SfHttpClient`] and exposes JSON and SOAP helpers used by the API crates.
//!
//! The session token is redacted in Debug output and skipped in tracing spans.

use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use crate::client::SfHttpClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::RequestBuilder;
use crate::soap;
use crate::DEFAULT_API_VERSION;

/// Salesforce API client bound to one session.
///
/// # Example
///
/// ```rust,ignore
/// use sfx_client::SalesforceClient;
///
/// let client = SalesforceClient::new("https://na1.salesforce.com", session_id)?;
/// let describe: serde_json::Value = client.rest_get("sobjects/Account/describe").await?;
/// ```
#[derive(Clone)]
pub struct SalesforceClient {
    http: SfHttpClient,
    instance_url: String,
    access_token: String,
    api_version: String,
}

impl std::fmt::Debug for SalesforceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceClient")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl SalesforceClient {
    /// Create a client with the default configuration.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(instance_url, access_token, ClientConfig::default())
    }

    /// Create a client with a custom configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = SfHttpClient::new(config)?;
        Ok(Self::from_http(http, instance_url, access_token))
    }

    /// Create a client that shares an existing HTTP client.
    pub fn from_http(
        http: SfHttpClient,
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Set the API version (e.g., "62.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the session token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get the underlying HTTP client.
    pub fn http(&self) -> &SfHttpClient {
        &self.http
    }

    /// Build the full URL for a path.
    ///
    /// Absolute URLs pass through, anything else is joined to the instance URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.instance_url, path)
        } else {
            format!("{}/{}", self.instance_url, path)
        }
    }

    /// Build the REST API URL for a path.
    ///
    /// `rest_url("sobjects/Account")` gives `{instance}/services/data/v62.0/sobjects/Account`.
    pub fn rest_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!(
            "{}/services/data/v{}/{}",
            self.instance_url, self.api_version, path
        )
    }

    /// Build the partner SOAP endpoint URL.
    pub fn soap_url(&self) -> String {
        format!("{}/services/Soap/u/{}", self.instance_url, self.api_version)
    }

    /// Create a GET request builder with authentication.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(&self.access_token)
    }

    /// Create a POST request builder with authentication.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).bearer_auth(&self.access_token)
    }

    /// Create a PATCH request builder with authentication.
    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.http.patch(url).bearer_auth(&self.access_token)
    }

    /// Create a DELETE request builder with authentication.
    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.http.delete(url).bearer_auth(&self.access_token)
    }

    /// Execute a request and return the raw response.
    pub async fn execute(&self, request: RequestBuilder) -> Result<crate::Response> {
        self.http.execute(request).await
    }

    /// GET request with JSON response deserialization.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let full_url = self.url(url);
        let response = self.http.execute(self.get(&full_url)).await?;
        response.json().await
    }

    /// GET request to the REST API with JSON response.
    pub async fn rest_get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json(&self.rest_url(path)).await
    }

    /// POST request with JSON body and response.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let full_url = self.url(url);
        let request = self.post(&full_url).json(body)?;
        let response = self.http.execute(request).await?;
        response.json().await
    }

    /// POST request to the REST API with JSON body and response.
    pub async fn rest_post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.post_json(&self.rest_url(path), body).await
    }

    /// PATCH request with JSON body and response.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn patch_json<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let full_url = self.url(url);
        let request = self.patch(&full_url).json(body)?;
        let response = self.http.execute(request).await?;
        response.json().await
    }

    /// PATCH request to the REST API with JSON body and response.
    pub async fn rest_patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.patch_json(&self.rest_url(path), body).await
    }

    /// DELETE request with query parameters and JSON response.
    #[instrument(skip(self, params), fields(url = %url))]
    pub async fn delete_json<T: DeserializeOwned>(&self, url: &str, params: &[(&str, String)]) -> Result<T> {
        let full_url = self.url(url);
        let mut request = self.delete(&full_url);
        for (name, value) in params {
            request = request.query(*name, value.as_str());
        }
        let response = self.http.execute(request).await?;
        response.json().await
    }

    /// Call a partner SOAP operation with this session and return the body text.
    #[instrument(skip(self, body))]
    pub async fn soap_call(&self, action: &str, body: &str) -> Result<String> {
        let envelope = soap::envelope(Some(&self.access_token), body);
        let request = self.http.post(&self.soap_url()).soap(action, envelope);
        self.http.send_text(request).await
    }

    /// Execute a SOQL query via the REST API.
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        let url = format!("{}?q={}", self.rest_url("query"), urlencoding::encode(soql));
        self.get_json(&url).await
    }

    /// Execute a SOQL query that includes deleted and archived rows.
    pub async fn query_all_rows<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        let url = format!("{}?q={}", self.rest_url("queryAll"), urlencoding::encode(soql));
        self.get_json(&url).await
    }

    /// Fetch the page behind a `nextRecordsUrl`.
    pub async fn query_more<T: DeserializeOwned>(&self, next_records_url: &str) -> Result<QueryResult<T>> {
        self.get_json(next_records_url).await
    }
}

/// Result of a SOQL query.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct QueryResult<T> {
    /// Total number of records matching the query.
    #[serde(rename = "totalSize")]
    pub total_size: u64,

    /// Whether all records are returned (no more pages).
    pub done: bool,

    /// URL to fetch next batch of results.
    #[serde(rename = "nextRecordsUrl", default)]
    pub next_records_url: Option<String>,

    /// The records.
    pub records: Vec<T>,
}
