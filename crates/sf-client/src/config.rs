//! Client configuration.

use std::time::Duration;

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Compression configuration.
    pub compression: CompressionConfig,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to enable request/response tracing.
    pub enable_tracing: bool,
    /// Proxy to route every request of this client through.
    pub proxy: Option<ProxyConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            compression: CompressionConfig::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
            proxy: None,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Enable or disable gzip/deflate compression.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.config.compression = if enabled {
            CompressionConfig::default()
        } else {
            CompressionConfig::disabled()
        };
        self
    }

    /// Set the request timeout and the connection timeout to the same value.
    ///
    /// A zero duration keeps the defaults.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.config.timeout = timeout;
            self.config.connect_timeout = timeout;
        }
        self
    }

    /// Set connection timeout only.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Route requests through the given proxy.
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set or clear the proxy.
    pub fn with_optional_proxy(mut self, proxy: Option<ProxyConfig>) -> Self {
        self.config.proxy = proxy;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration for response compression.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Whether compression is enabled.
    pub enabled: bool,
    /// Accept compressed responses.
    pub accept_compressed: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            accept_compressed: true,
        }
    }
}

impl CompressionConfig {
    /// Disable all compression.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            accept_compressed: false,
        }
    }
}

/// HTTP proxy settings for one client.
///
/// The proxy is handed to the HTTP client when it is built. Process-wide
/// proxy state is never read during a call or written at all, so sessions
/// with different proxies can coexist in one process.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy host name.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Optional proxy user.
    pub username: Option<String>,
    /// Optional proxy password.
    pub password: Option<String>,
    /// Comma-separated hosts that bypass the proxy.
    pub non_proxy_hosts: Option<String>,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("non_proxy_hosts", &self.non_proxy_hosts)
            .finish()
    }
}

/// Port used when `SF_PROXY_PORT` is unset or unparsable.
const DEFAULT_PROXY_PORT: u16 = 80;

impl ProxyConfig {
    /// Create a proxy config without authentication.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            non_proxy_hosts: None,
        }
    }

    /// Add basic authentication.
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set hosts that bypass the proxy.
    pub fn with_non_proxy_hosts(mut self, hosts: impl Into<String>) -> Self {
        self.non_proxy_hosts = Some(hosts.into());
        self
    }

    /// Read the ambient proxy from environment variables.
    ///
    /// - `SF_PROXY_HOST` (required, otherwise `None`)
    /// - `SF_PROXY_PORT` (default: 80)
    /// - `SF_PROXY_USER`, `SF_PROXY_PASSWORD`
    /// - `SF_NON_PROXY_HOSTS`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SF_PROXY_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())?;
        let port = std::env::var("SF_PROXY_PORT")
            .ok()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PROXY_PORT);

        Some(Self {
            host,
            port,
            username: std::env::var("SF_PROXY_USER").ok().filter(|u| !u.is_empty()),
            password: std::env::var("SF_PROXY_PASSWORD").ok(),
            non_proxy_hosts: std::env::var("SF_NON_PROXY_HOSTS").ok(),
        })
    }

    /// The proxy URL handed to the HTTP client.
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            format!("{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}
