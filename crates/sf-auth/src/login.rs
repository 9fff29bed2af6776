//! Username/password login against the partner SOAP endpoint.

use sfx_client::security::xml;
use sfx_client::{soap, ClientConfig, SfHttpClient};
use tracing::{debug, instrument};

use crate::credentials::Credentials;
use crate::error::{Error, ErrorKind, Result};

/// Fault codes that mean the credentials were refused or the org is not
/// reachable for this user, as opposed to a transport or server failure.
pub const ACCESS_RESTRICTED_FAULTS: &[&str] = &[
    "FUNCTIONALITY_NOT_ENABLED",
    "INVALID_CLIENT",
    "INVALID_LOGIN",
    "LOGIN_DURING_RESTRICTED_DOMAIN",
    "LOGIN_DURING_RESTRICTED_TIME",
    "ORG_LOCKED",
    "PASSWORD_LOCKOUT",
    "SERVER_UNAVAILABLE",
    "TRIAL_EXPIRED",
    "UNSUPPORTED_CLIENT",
];

/// Returns true if `code` is one of [`ACCESS_RESTRICTED_FAULTS`].
pub fn is_access_restricted(code: &str) -> bool {
    ACCESS_RESTRICTED_FAULTS.contains(&code)
}

/// User details returned with a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub user_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub organization_name: Option<String>,
}

/// Outcome of a successful login.
#[derive(Clone)]
pub struct LoginResult {
    session_id: String,
    /// SOAP endpoint the session is bound to.
    pub server_url: String,
    /// Scheme and host of `server_url`; the base for REST calls.
    pub instance_url: String,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub password_expired: bool,
    pub user_info: UserInfo,
}

impl std::fmt::Debug for LoginResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResult")
            .field("session_id", &"[REDACTED]")
            .field("server_url", &self.server_url)
            .field("instance_url", &self.instance_url)
            .field("user_id", &self.user_id)
            .field("organization_id", &self.organization_id)
            .field("password_expired", &self.password_expired)
            .field("user_info", &self.user_info)
            .finish()
    }
}

impl LoginResult {
    /// The session id to send as bearer token or SOAP session header.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn parse(body: &str) -> Result<Self> {
        let session_id = soap::extract_element(body, "sessionId")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::new(ErrorKind::InvalidResponse("missing sessionId".to_string())))?;
        let server_url = soap::extract_element(body, "serverUrl")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::new(ErrorKind::InvalidResponse("missing serverUrl".to_string())))?;

        let parsed = url::Url::parse(&server_url)?;
        let instance_url = parsed.origin().ascii_serialization();

        Ok(Self {
            session_id,
            server_url,
            instance_url,
            user_id: soap::extract_element(body, "userId"),
            organization_id: soap::extract_element(body, "organizationId"),
            password_expired: soap::extract_element(body, "passwordExpired").as_deref() == Some("true"),
            user_info: UserInfo {
                user_name: soap::extract_element(body, "userName"),
                full_name: soap::extract_element(body, "userFullName"),
                email: soap::extract_element(body, "userEmail"),
                language: soap::extract_element(body, "userLanguage"),
                organization_name: soap::extract_element(body, "organizationName"),
            },
        })
    }
}

/// Partner SOAP login client.
#[derive(Debug, Clone)]
pub struct SoapLogin {
    http: SfHttpClient,
    login_url: String,
    api_version: String,
}

impl SoapLogin {
    /// Create a login client for `login_url` (e.g. `https://login.salesforce.com`).
    pub fn new(login_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        Ok(Self::with_http(SfHttpClient::new(config)?, login_url))
    }

    /// Create a login client sharing an existing HTTP client.
    pub fn with_http(http: SfHttpClient, login_url: impl Into<String>) -> Self {
        Self {
            http,
            login_url: login_url.into().trim_end_matches('/').to_string(),
            api_version: sfx_client::DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Set the API version used when the login URL has no SOAP path.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// The SOAP endpoint the login call is posted to.
    ///
    /// A login URL that already names a SOAP endpoint is used as-is.
    pub fn endpoint(&self) -> String {
        if self.login_url.contains("/services/Soap/") {
            self.login_url.clone()
        } else {
            format!("{}/services/Soap/u/{}", self.login_url, self.api_version)
        }
    }

    /// Log in with a username and password (with security token appended if
    /// the org requires one).
    #[instrument(skip(self, password), fields(endpoint = %self.endpoint()))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult> {
        if username.is_empty() {
            return Err(Error::new(ErrorKind::InvalidCredentials(
                "username must not be empty".to_string(),
            )));
        }

        let body = format!(
            "<urn:login><urn:username>{}</urn:username><urn:password>{}</urn:password></urn:login>",
            xml::escape(username),
            xml::escape(password)
        );
        let request = self
            .http
            .post(self.endpoint())
            .soap("login", soap::envelope(None, &body));

        let response = self.http.send_text(request).await?;

        // Some proxies answer faults with 200
        if let Some(fault) = soap::parse_fault(&response) {
            return Err(Error::new(ErrorKind::LoginFault {
                code: fault.code,
                message: fault.message,
            }));
        }

        let result = LoginResult::parse(&response)?;
        debug!(
            server_url = %result.server_url,
            user = ?result.user_info.full_name,
            email = ?result.user_info.email,
            language = ?result.user_info.language,
            organization = ?result.user_info.organization_name,
            "Login succeeded"
        );
        Ok(result)
    }

    /// Invalidate the session behind `credentials`.
    #[instrument(skip(self, credentials), fields(instance_url = %credentials.instance_url()))]
    pub async fn logout(&self, credentials: &impl Credentials) -> Result<()> {
        let url = format!(
            "{}/services/Soap/u/{}",
            credentials.instance_url().trim_end_matches('/'),
            credentials.api_version()
        );
        let envelope = soap::envelope(Some(credentials.access_token()), "<urn:logout/>");
        let response = self
            .http
            .send_text(self.http.post(url).soap("logout", envelope))
            .await?;

        if let Some(fault) = soap::parse_fault(&response) {
            return Err(Error::new(ErrorKind::Http(fault.to_string())));
        }
        debug!("Logged out");
        Ok(())
    }
}
