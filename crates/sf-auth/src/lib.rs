//! # sfx-auth
//!
//! Username/password authentication against the Salesforce partner SOAP
//! endpoint.
//!
//! - Passwords and session ids are redacted in Debug output
//! - Tracing spans skip the password parameter
//! - Login faults keep their Salesforce code so callers can classify them
//!
//! ## Example
//!
//! ```rust,ignore
//! use sfx_auth::{SalesforceCredentials, SoapLogin, PRODUCTION_LOGIN_URL};
//! use sfx_client::ClientConfig;
//!
//! let login = SoapLogin::new(PRODUCTION_LOGIN_URL, ClientConfig::default())?;
//! let result = login.login("user@example.com", "password+token").await?;
//! let creds = SalesforceCredentials::from_login(&result, "62.0");
//! // ... use the session ...
//! login.logout(&creds).await?;
//! ```

mod credentials;
mod error;
mod login;

pub use credentials::{Credentials, SalesforceCredentials};
pub use error::{Error, ErrorKind, Result};
pub use login::{is_access_restricted, LoginResult, SoapLogin, UserInfo, ACCESS_RESTRICTED_FAULTS};

/// Default Salesforce login URL for production.
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Default Salesforce login URL for sandbox.
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";
