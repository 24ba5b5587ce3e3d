//! Auth Manager - the main public API for Authlink.
//!
//! The `AuthManager` performs one request/response round trip per call:
//! - `setup` opens a session (form dialect) or checks configuration (JSON)
//! - `login` / `register` authenticate a user and bind the hardware id
//! - `verify_session` re-checks a user id from an earlier login
//! - `validate_license` checks a bare license key
//!
//! Every call returns an [`AuthResponse`]; errors never escape.

use crate::client::http::{HttpTransport, Transport};
use crate::config::{AuthConfig, Encoding};
use crate::hwid::{HardwareIdProvider, SystemHardwareId};
use crate::protocol::interpret::{interpret, CallContext, Interpreted};
use crate::protocol::models::AuthResponse;
use crate::protocol::request::{CallArgs, RequestBuilder};
use crate::AuthError;
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Where the manager is in the setup → login sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// `setup` has not succeeded yet.
    #[default]
    Uninitialized,
    /// `setup` succeeded; no user is logged in.
    Initialized,
    /// A `login` or `register` succeeded.
    Authenticated,
}

#[derive(Debug, Default)]
struct Session {
    id: String,
    state: SessionState,
}

/// Main authentication client.
///
/// Create one per application and pass it to the code that needs it. All
/// methods take `&self`, so it can be shared with a worker thread through
/// an `Arc`; each call still blocks for one network round trip.
pub struct AuthManager {
    config: AuthConfig,
    transport: Arc<dyn Transport>,
    hwid_provider: Arc<dyn HardwareIdProvider>,
    hwid: OnceCell<String>,
    session: Mutex<Session>,
}

impl AuthManager {
    /// Create a manager using the system hardware id.
    ///
    /// Configuration is not validated here: a placeholder key is reported by
    /// [`setup`](Self::setup) as a failure result.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        Self::with_hwid_provider(config, Arc::new(SystemHardwareId))
    }

    /// Create a manager with a custom hardware id provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_hwid_provider(
        config: AuthConfig,
        hwid_provider: Arc<dyn HardwareIdProvider>,
    ) -> Result<Self, AuthError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_parts(config, Arc::new(transport), hwid_provider))
    }

    /// Create a manager from explicit parts.
    pub fn with_parts(
        config: AuthConfig,
        transport: Arc<dyn Transport>,
        hwid_provider: Arc<dyn HardwareIdProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            hwid_provider,
            hwid: OnceCell::new(),
            session: Mutex::new(Session::default()),
        }
    }

    /// Prepare the client for `login` / `register`.
    ///
    /// Form dialect: sends `init` and stores the returned session id,
    /// replacing any previous one and any login made under it. JSON dialect: checks that the API key and
    /// URL are not placeholders; no request is made. Safe to call repeatedly.
    pub fn setup(&self) -> AuthResponse {
        let result = self.config.validate().and_then(|()| match self.config.encoding {
            Encoding::Form => self.open_session(),
            Encoding::Json => Ok(AuthResponse {
                success: true,
                message: "Authentication client initialized successfully".to_string(),
                ..AuthResponse::default()
            }),
        });

        let response = fold(result);
        if response.success {
            let mut session = self.session();
            // A fresh form session drops any login made under the old token.
            if self.config.encoding.requires_session()
                || session.state == SessionState::Uninitialized
            {
                session.state = SessionState::Initialized;
            }
            info!(encoding = ?self.config.encoding, "Authentication client ready");
        }
        response
    }

    /// Log in with username and password.
    pub fn login(&self, username: &str, password: &str) -> AuthResponse {
        let ctx = CallContext {
            hwid: self.hwid(),
            username,
            license_key: "",
        };
        self.authenticate(CallArgs::Login { username, password }, ctx)
    }

    /// Create an account from a license key.
    pub fn register(&self, username: &str, password: &str, license_key: &str) -> AuthResponse {
        let ctx = CallContext {
            hwid: self.hwid(),
            username,
            license_key,
        };
        self.authenticate(
            CallArgs::Register {
                username,
                password,
                license_key,
            },
            ctx,
        )
    }

    /// Check that a user id from an earlier login is still valid.
    ///
    /// Has no setup precondition.
    pub fn verify_session(&self, user_id: i64) -> AuthResponse {
        let ctx = CallContext {
            hwid: self.hwid(),
            ..CallContext::default()
        };
        fold(
            self.round_trip(CallArgs::Verify { user_id }, &ctx)
                .map(|out| out.response),
        )
    }

    /// Validate a bare license key against this machine's hardware id.
    pub fn validate_license(&self, license_key: &str) -> AuthResponse {
        if license_key.trim().is_empty() {
            return fold(Err(AuthError::MissingLicense));
        }
        let ctx = CallContext {
            hwid: self.hwid(),
            username: "",
            license_key,
        };
        let result = self
            .check_ready()
            .and_then(|()| self.round_trip(CallArgs::License { license_key }, &ctx));
        fold(result.map(|out| out.response))
    }

    /// Locally computed hardware id. Computed on first use, then fixed.
    pub fn hwid(&self) -> &str {
        self.hwid.get_or_init(|| self.hwid_provider.hardware_id())
    }

    /// Configured API base URL.
    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    /// Configured application version.
    pub fn version(&self) -> &str {
        self.config.identity.version
    }

    /// Current session token; empty until a form-dialect `setup` succeeds.
    pub fn session_id(&self) -> String {
        self.session().id.clone()
    }

    /// Current position in the setup → login sequence.
    pub fn state(&self) -> SessionState {
        self.session().state
    }

    /// Get the current configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn open_session(&self) -> Result<AuthResponse, AuthError> {
        let ctx = CallContext {
            hwid: self.hwid(),
            ..CallContext::default()
        };
        let out = self.round_trip(CallArgs::Init, &ctx)?;
        if let Some(session_id) = out.session_id {
            self.session().id = session_id;
        }
        Ok(out.response)
    }

    fn authenticate(&self, args: CallArgs<'_>, ctx: CallContext<'_>) -> AuthResponse {
        let result = self
            .check_ready()
            .and_then(|()| self.round_trip(args, &ctx));
        let response = fold(result.map(|out| out.response));

        if response.success {
            self.session().state = SessionState::Authenticated;
            info!(kind = ?args.kind(), user_id = response.user_id, "Authenticated");
        }
        response
    }

    /// Local preconditions checked before a credential call goes out.
    fn check_ready(&self) -> Result<(), AuthError> {
        match self.config.encoding {
            Encoding::Form => {
                if self.session().id.is_empty() {
                    return Err(AuthError::SessionNotInitialized);
                }
                Ok(())
            }
            Encoding::Json => self.config.validate_key(),
        }
    }

    fn round_trip(
        &self,
        args: CallArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> Result<Interpreted, AuthError> {
        let session_id = self.session_id();
        let request = RequestBuilder::new(&self.config, ctx.hwid, &session_id).build(args)?;
        debug!(kind = ?request.kind, url = %request.url, "Sending request");

        let response = self.transport.post(&request).map_err(|e| {
            warn!(kind = ?request.kind, error = %e, "Request failed");
            e
        })?;

        let body = response.body_text()?;
        interpret(request.kind, body, ctx).map_err(|e| {
            warn!(kind = ?request.kind, status = response.status, error = %e, "Unusable response");
            e
        })
    }

    // The lock is never held across a request.
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn fold(result: Result<AuthResponse, AuthError>) -> AuthResponse {
    result.unwrap_or_else(|e| AuthResponse::from_error(&e))
}
