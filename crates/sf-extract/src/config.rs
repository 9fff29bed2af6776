//! Session configuration.

use std::time::Duration;

use sfx_client::{ClientConfig, ProxyConfig};

use crate::error::{Error, Result};

/// Ids per retrieve call unless configured otherwise.
pub const DEFAULT_BATCH_LIMIT: usize = sfx_rest::MAX_COLLECTION_RETRIEVE;

/// Most records or ids one write call accepts.
pub const MAX_WRITE_BATCH: usize = sfx_rest::MAX_COLLECTION_WRITE;

/// Everything a session needs to log in and talk to the org.
#[derive(Clone)]
pub struct SessionConfig {
    /// Login endpoint, e.g. `https://login.salesforce.com`.
    pub login_url: String,
    pub username: String,
    /// Password with the security token appended, if the org requires one.
    pub password: String,
    pub api_version: String,
    /// Request timeout handed to the transport. `None` keeps its default.
    pub timeout: Option<Duration>,
    /// Accept gzip/deflate responses.
    pub compression: bool,
    /// Sent as `allOrNone` on writes.
    pub rollback_all_changes_on_error: bool,
    /// Plain fetches include deleted and archived records.
    pub query_all: bool,
    pub proxy: Option<ProxyConfig>,
    /// Ids per retrieve call in updated-since fetches.
    pub batch_limit: usize,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("login_url", &self.login_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("compression", &self.compression)
            .field(
                "rollback_all_changes_on_error",
                &self.rollback_all_changes_on_error,
            )
            .field("query_all", &self.query_all)
            .field("proxy", &self.proxy)
            .field("batch_limit", &self.batch_limit)
            .finish()
    }
}

impl SessionConfig {
    /// Create a config with defaults for everything but the login triple.
    pub fn new(
        login_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            login_url: login_url.into(),
            username: username.into(),
            password: password.into(),
            api_version: sfx_client::DEFAULT_API_VERSION.to_string(),
            timeout: None,
            compression: true,
            rollback_all_changes_on_error: false,
            query_all: false,
            proxy: None,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `SF_LOGIN_URL` (default: production login)
    /// - `SF_USERNAME`, `SF_PASSWORD` (required)
    /// - `SF_API_VERSION`, `SF_TIMEOUT_SECS`, `SF_BATCH_LIMIT`
    /// - `SF_COMPRESSION`, `SF_ROLLBACK_ON_ERROR`, `SF_QUERY_ALL` (`true`/`false`)
    /// - proxy variables, see [`ProxyConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        let login_url = std::env::var("SF_LOGIN_URL")
            .unwrap_or_else(|_| sfx_auth::PRODUCTION_LOGIN_URL.to_string());
        let username = required_var("SF_USERNAME")?;
        let password = required_var("SF_PASSWORD")?;

        let mut config = Self::new(login_url, username, password);
        if let Ok(version) = std::env::var("SF_API_VERSION") {
            config.api_version = version;
        }
        if let Ok(secs) = std::env::var("SF_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("SF_TIMEOUT_SECS is not a number: {secs}")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Ok(limit) = std::env::var("SF_BATCH_LIMIT") {
            config.batch_limit = limit
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("SF_BATCH_LIMIT is not a number: {limit}")))?;
        }
        if let Some(flag) = bool_var("SF_COMPRESSION") {
            config.compression = flag;
        }
        if let Some(flag) = bool_var("SF_ROLLBACK_ON_ERROR") {
            config.rollback_all_changes_on_error = flag;
        }
        if let Some(flag) = bool_var("SF_QUERY_ALL") {
            config.query_all = flag;
        }
        config.proxy = ProxyConfig::from_env();

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    pub fn with_rollback_on_error(mut self, enabled: bool) -> Self {
        self.rollback_all_changes_on_error = enabled;
        self
    }

    pub fn with_query_all(mut self, enabled: bool) -> Self {
        self.query_all = enabled;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    /// Check the settings that must hold before anything goes on the wire.
    pub fn validate(&self) -> Result<()> {
        if self.login_url.trim().is_empty() {
            return Err(Error::config("login URL is missing"));
        }
        if !self.login_url.starts_with("http://") && !self.login_url.starts_with("https://") {
            return Err(Error::config(format!(
                "login URL must be http(s): {}",
                self.login_url
            )));
        }
        if self.username.trim().is_empty() {
            return Err(Error::config("username is missing"));
        }
        if self.batch_limit == 0 {
            return Err(Error::config("batch limit must be at least 1"));
        }
        Ok(())
    }

    /// The HTTP settings handed to the transport.
    pub fn client_config(&self) -> ClientConfig {
        let mut builder = ClientConfig::builder()
            .with_compression(self.compression)
            .with_optional_proxy(self.proxy.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.with_timeout(timeout);
        }
        builder.build()
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::config(format!("{name} is not set")))
}

fn bool_var(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}
