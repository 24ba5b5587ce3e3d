//! Authlink configuration.

use crate::AuthError;
use std::time::Duration;

/// Sample API key shipped in the client templates.
const PLACEHOLDER_KEY: &str = "your-api-key-here";

/// Host fragment of the sample API URL.
const PLACEHOLDER_URL_MARKER: &str = "your-replit-url";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Static identity of the calling application.
///
/// SECURITY: these should be hard-coded in your application, not read from
/// the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Application name as registered with the licensing service.
    pub name: &'static str,

    /// Owner id (form dialect) or application API key (JSON dialect).
    pub owner_key: &'static str,

    /// Version string the server compares against its required version.
    pub version: &'static str,
}

/// Wire dialect spoken to the licensing API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// KeyAuth-style: one endpoint, `application/x-www-form-urlencoded`
    /// bodies with a `type=` discriminator. `setup()` performs a remote
    /// `init` and the returned session id is required by later calls.
    Form,

    /// REST-style: one path per call, `application/json` bodies, and an
    /// `X-API-Key` header. `setup()` only checks local configuration.
    Json,
}

impl Encoding {
    /// Content type sent with every request in this dialect.
    pub fn content_type(self) -> &'static str {
        match self {
            Encoding::Form => "application/x-www-form-urlencoded",
            Encoding::Json => "application/json",
        }
    }

    /// Whether `login`/`register` require a session token from `setup()`.
    pub fn requires_session(self) -> bool {
        matches!(self, Encoding::Form)
    }
}

/// Configuration for an [`AuthManager`](crate::AuthManager).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// API base URL. Form dialect posts here directly; JSON dialect appends
    /// a path per call (`/login`, `/verify`, ...).
    pub api_url: String,

    /// Application identity sent with every call.
    pub identity: ClientIdentity,

    /// Wire dialect.
    pub encoding: Encoding,

    /// Request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,

    /// User-Agent product identifier (e.g. "myapp-desktop").
    pub user_agent_product: &'static str,
}

impl AuthConfig {
    /// Configuration for a KeyAuth-style form-encoded API.
    pub fn form(api_url: impl Into<String>, identity: ClientIdentity) -> Self {
        Self::new(api_url, identity, Encoding::Form)
    }

    /// Configuration for a REST-style JSON API keyed by `identity.owner_key`.
    pub fn json(api_url: impl Into<String>, identity: ClientIdentity) -> Self {
        Self::new(api_url, identity, Encoding::Json)
    }

    fn new(api_url: impl Into<String>, identity: ClientIdentity, encoding: Encoding) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            identity,
            encoding,
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent_product: identity.name,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the User-Agent product identifier.
    pub fn with_user_agent_product(mut self, product: &'static str) -> Self {
        self.user_agent_product = product;
        self
    }

    /// Check the API key / owner id is set and not a sample placeholder.
    pub fn validate_key(&self) -> Result<(), AuthError> {
        let key = self.identity.owner_key.trim();
        if key.is_empty() || key == PLACEHOLDER_KEY {
            return Err(AuthError::ConfigError(match self.encoding {
                Encoding::Json => "API key not configured. Set your application API key".to_string(),
                Encoding::Form => "Owner id not configured. Set your application owner id".to_string(),
            }));
        }
        Ok(())
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), AuthError> {
        self.validate_key()?;
        let url = self.api_url.trim();
        if url.is_empty() || url.contains(PLACEHOLDER_URL_MARKER) {
            return Err(AuthError::ConfigError(
                "API URL not configured. Set your API base URL".to_string(),
            ));
        }
        if self.encoding == Encoding::Form && self.identity.name.is_empty() {
            return Err(AuthError::ConfigError(
                "Application name cannot be empty".to_string(),
            ));
        }
        if self.identity.version.is_empty() {
            return Err(AuthError::ConfigError(
                "Application version cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
