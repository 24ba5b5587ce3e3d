//! Wire structs and the caller-facing result type.

use crate::expiry::{days_until, parse_expiry, Clock};
use crate::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw JSON reply from either dialect.
///
/// Every field is optional; absent and `null` both deserialize to `None`.
/// A field of the wrong JSON type is a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub sessionid: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub expires_at: Option<String>,
    pub hwid_locked: Option<bool>,
    pub required_version: Option<String>,
    pub current_version: Option<String>,
    pub subscriptions: Option<Vec<WireSubscription>>,
    pub info: Option<WireInfo>,
    pub license: Option<WireLicense>,
}

/// KeyAuth nests account data under `info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireInfo {
    pub username: Option<String>,
    pub subscriptions: Option<Vec<WireSubscription>>,
}

/// One subscription entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireSubscription {
    pub subscription: Option<String>,
    pub expiry: Option<String>,
}

/// License object from `/license/validate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLicense {
    pub license_key: Option<String>,
    pub application_id: Option<i64>,
    pub max_users: Option<i64>,
    pub current_users: Option<i64>,
    pub validity_days: Option<i64>,
    pub expires_at: Option<String>,
    pub is_active: Option<bool>,
    pub is_banned: Option<bool>,
    pub hwid: Option<String>,
    pub hwid_lock_enabled: Option<bool>,
    pub description: Option<String>,
}

impl WireResponse {
    /// Subscriptions from the top level, falling back to `info.subscriptions`.
    pub fn subscriptions(&self) -> Option<&[WireSubscription]> {
        self.subscriptions
            .as_deref()
            .or_else(|| self.info.as_ref().and_then(|i| i.subscriptions.as_deref()))
    }
}

/// Parse raw body text into a [`WireResponse`].
pub fn parse_wire_response(body: &str) -> Result<WireResponse, AuthError> {
    serde_json::from_str(body).map_err(|e| AuthError::MalformedResponse(e.to_string()))
}

/// Subscription summary taken from the first `subscriptions` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Subscription {
    /// Set when the server listed at least one subscription.
    pub active: bool,
    /// Expiry of the first subscription, verbatim.
    pub expiry: String,
    /// Subscription level name, if the server sent one.
    pub name: String,
}

/// License details from a license-key validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseInfo {
    pub license_key: String,
    pub application_id: i64,
    pub max_users: i64,
    pub current_users: i64,
    pub validity_days: i64,
    pub expires_at: String,
    pub is_active: bool,
    pub is_banned: bool,
    pub hwid: Option<String>,
    pub hwid_lock_enabled: bool,
    pub description: String,
}

impl LicenseInfo {
    /// Normalize the wire object, filling the server's documented defaults.
    pub fn from_wire(wire: &WireLicense, requested_key: &str) -> Self {
        Self {
            license_key: wire
                .license_key
                .clone()
                .unwrap_or_else(|| requested_key.to_string()),
            application_id: wire.application_id.unwrap_or(0),
            max_users: wire.max_users.unwrap_or(1),
            current_users: wire.current_users.unwrap_or(0),
            validity_days: wire.validity_days.unwrap_or(30),
            expires_at: wire.expires_at.clone().unwrap_or_default(),
            is_active: wire.is_active.unwrap_or(true),
            is_banned: wire.is_banned.unwrap_or(false),
            hwid: wire.hwid.clone(),
            hwid_lock_enabled: wire.hwid_lock_enabled.unwrap_or(false),
            description: wire.description.clone().unwrap_or_default(),
        }
    }
}

/// Why the server turned a request down, guessed from its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    /// Subscription or license expired.
    Expired,
    /// Account or license banned.
    Banned,
    /// Hardware id does not match the bound one.
    HwidMismatch,
    /// Wrong username or password.
    InvalidCredentials,
    /// Unknown or malformed license key.
    InvalidLicense,
    /// Seat limit reached.
    UserLimitReached,
    /// Caller's version is not the required one.
    VersionMismatch,
    /// Anything else.
    Other,
}

impl Rejection {
    /// Classify a rejection. Version fields win over message text.
    pub fn classify(message: &str, version_mismatch: bool) -> Self {
        if version_mismatch {
            return Rejection::VersionMismatch;
        }
        let lower = message.to_lowercase();
        if lower.contains("expired") {
            Rejection::Expired
        } else if lower.contains("ban") {
            Rejection::Banned
        } else if lower.contains("hwid") || lower.contains("hardware") {
            Rejection::HwidMismatch
        } else if lower.contains("invalid") || lower.contains("incorrect") {
            if ["username", "password", "credential", "user"]
                .iter()
                .any(|word| lower.contains(word))
            {
                Rejection::InvalidCredentials
            } else {
                Rejection::InvalidLicense
            }
        } else if lower.contains("limit") || lower.contains("maximum") {
            Rejection::UserLimitReached
        } else if lower.contains("version") {
            Rejection::VersionMismatch
        } else {
            Rejection::Other
        }
    }
}

/// Category of a failed [`AuthResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Local configuration is missing or a placeholder; nothing was sent.
    Configuration,
    /// A session-bound call was made before `setup()`; nothing was sent.
    NotInitialized,
    /// A required argument was empty; nothing was sent.
    InvalidInput,
    /// The request never produced a usable reply.
    Transport,
    /// The reply was not the JSON we expected.
    MalformedResponse,
    /// The server answered `success: false`.
    Rejected(Rejection),
}

/// Result of one authentication call.
///
/// Always returned, success or not. Fields the server did not send keep
/// their zero value (empty string, `0`, `false`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Server message, or a local diagnostic on failure.
    pub message: String,
    /// Account id (login/verify).
    pub user_id: i64,
    /// Account name.
    pub username: String,
    /// Account email, if the server has one.
    pub email: String,
    /// Account expiry, verbatim.
    pub expires_at: String,
    /// Whether the account is locked to a hardware id.
    pub hwid_locked: bool,
    /// Local hardware id sent with a successful login/register.
    pub hwid: String,
    /// Version the server requires, on a version mismatch.
    pub required_version: String,
    /// Version the server saw, on a version mismatch.
    pub current_version: String,
    /// First subscription, when the server listed any.
    pub subscription: Subscription,
    /// License details from [`validate_license`](crate::AuthManager::validate_license).
    pub license: Option<LicenseInfo>,
    /// Why the call failed; `None` on success.
    pub failure: Option<FailureKind>,
}

impl AuthResponse {
    /// A failure result with the given category and message.
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            failure: Some(kind),
            ..Self::default()
        }
    }

    /// Fold an internal error into a failure result.
    pub fn from_error(error: &AuthError) -> Self {
        let kind = match error {
            AuthError::ConfigError(_) | AuthError::HttpClient(_) => FailureKind::Configuration,
            AuthError::SessionNotInitialized => FailureKind::NotInitialized,
            AuthError::MissingLicense => FailureKind::InvalidInput,
            AuthError::Transport(_) => FailureKind::Transport,
            AuthError::MalformedResponse(_) => FailureKind::MalformedResponse,
        };
        Self::failure(kind, error.to_string())
    }

    /// Whether the server reported a version mismatch.
    pub fn is_version_mismatch(&self) -> bool {
        !self.required_version.is_empty()
    }

    /// Server rejection reason, if this is a rejection.
    pub fn rejection(&self) -> Option<Rejection> {
        match self.failure {
            Some(FailureKind::Rejected(reason)) => Some(reason),
            _ => None,
        }
    }

    /// The most specific expiry the server gave: account, then
    /// subscription, then license.
    pub fn expiry_raw(&self) -> Option<&str> {
        [
            self.expires_at.as_str(),
            self.subscription.expiry.as_str(),
            self.license.as_ref().map_or("", |l| l.expires_at.as_str()),
        ]
        .into_iter()
        .find(|s| !s.is_empty())
    }

    /// Parsed expiry, if one was sent and is recognizable.
    pub fn expiry_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_raw().and_then(parse_expiry)
    }

    /// Whether the expiry has passed. Unknown expiry counts as not expired.
    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        self.expiry_at()
            .map(|expiry| expiry < clock.now_utc())
            .unwrap_or(false)
    }

    /// Whole days left, `None` when expired or unknown.
    pub fn days_remaining(&self, clock: &dyn Clock) -> Option<i64> {
        self.expiry_at()
            .and_then(|expiry| days_until(expiry, clock.now_utc()))
    }

    /// Expiry for display, e.g. `Dec 31, 2025`. Unparseable values are
    /// returned verbatim and a missing one as `Unknown`.
    pub fn formatted_expiry(&self) -> String {
        match (self.expiry_raw(), self.expiry_at()) {
            (None, _) => "Unknown".to_string(),
            (Some(_), Some(dt)) => dt.format("%b %d, %Y").to_string(),
            (Some(raw), None) => raw.to_string(),
        }
    }

    /// Successful, not banned, license active, and not expired.
    pub fn is_valid(&self, clock: &dyn Clock) -> bool {
        let license_ok = self
            .license
            .as_ref()
            .map_or(true, |l| l.is_active && !l.is_banned);
        self.success && license_ok && !self.is_expired(clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::MockClock;

    #[test]
    fn test_parse_minimal_response() {
        let wire = parse_wire_response(r#"{"success":true}"#).unwrap();
        assert_eq!(wire.success, Some(true));
        assert!(wire.message.is_none());
        assert!(wire.subscriptions().is_none());
    }

    #[test]
    fn test_parse_nulls_are_absent() {
        let wire =
            parse_wire_response(r#"{"success":true,"email":null,"expires_at":null}"#).unwrap();
        assert!(wire.email.is_none());
        assert!(wire.expires_at.is_none());
    }

    #[test]
    fn test_parse_wrong_type_is_malformed() {
        let result = parse_wire_response(r#"{"success":"yes"}"#);
        assert!(matches!(result, Err(AuthError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = parse_wire_response("<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(AuthError::MalformedResponse(_))));
    }

    #[test]
    fn test_nested_subscriptions() {
        let wire = parse_wire_response(
            r#"{"success":true,"info":{"username":"a","subscriptions":[{"subscription":"default","expiry":"1735689600"}]}}"#,
        )
        .unwrap();
        let subs = wire.subscriptions().unwrap();
        assert_eq!(subs[0].expiry.as_deref(), Some("1735689600"));
    }

    #[test]
    fn test_license_defaults() {
        let info = LicenseInfo::from_wire(&WireLicense::default(), "KEY-1");
        assert_eq!(info.license_key, "KEY-1");
        assert_eq!(info.max_users, 1);
        assert_eq!(info.validity_days, 30);
        assert!(info.is_active);
        assert!(!info.is_banned);
    }

    #[test]
    fn test_classify_rejections() {
        assert_eq!(Rejection::classify("License has expired", false), Rejection::Expired);
        assert_eq!(Rejection::classify("User is banned", false), Rejection::Banned);
        assert_eq!(Rejection::classify("HWID doesn't match", false), Rejection::HwidMismatch);
        assert_eq!(Rejection::classify("Invalid username", false), Rejection::InvalidCredentials);
        assert_eq!(Rejection::classify("Invalid password", false), Rejection::InvalidCredentials);
        assert_eq!(Rejection::classify("Invalid license key", false), Rejection::InvalidLicense);
        assert_eq!(Rejection::classify("Maximum users reached", false), Rejection::UserLimitReached);
        assert_eq!(Rejection::classify("bad key", true), Rejection::VersionMismatch);
        assert_eq!(Rejection::classify("bad key", false), Rejection::Other);
    }

    #[test]
    fn test_from_error_categories() {
        let resp = AuthResponse::from_error(&AuthError::SessionNotInitialized);
        assert!(!resp.success);
        assert_eq!(resp.failure, Some(FailureKind::NotInitialized));
        assert_eq!(resp.message, "Session not initialized. Call setup() first.");

        let resp = AuthResponse::from_error(&AuthError::Transport("timed out".into()));
        assert_eq!(resp.failure, Some(FailureKind::Transport));
        assert_eq!(resp.message, "Network error: timed out");
    }

    #[test]
    fn test_expiry_prefers_account_then_subscription() {
        let mut resp = AuthResponse {
            success: true,
            subscription: Subscription {
                active: true,
                expiry: "1735689600".into(),
                name: String::new(),
            },
            ..AuthResponse::default()
        };
        assert_eq!(resp.expiry_raw(), Some("1735689600"));
        resp.expires_at = "2030-01-01".into();
        assert_eq!(resp.expiry_raw(), Some("2030-01-01"));
    }

    #[test]
    fn test_expiry_checks() {
        let clock = MockClock::at("2025-01-01T00:00:00Z");
        let resp = AuthResponse {
            success: true,
            expires_at: "2025-01-31T00:00:00Z".into(),
            ..AuthResponse::default()
        };
        assert!(!resp.is_expired(&clock));
        assert_eq!(resp.days_remaining(&clock), Some(30));
        assert_eq!(resp.formatted_expiry(), "Jan 31, 2025");
        assert!(resp.is_valid(&clock));

        let later = MockClock::at("2025-02-01T00:00:00Z");
        assert!(resp.is_expired(&later));
        assert_eq!(resp.days_remaining(&later), None);
        assert!(!resp.is_valid(&later));
    }

    #[test]
    fn test_unknown_expiry() {
        let clock = MockClock::at("2025-01-01T00:00:00Z");
        let mut resp = AuthResponse::default();
        assert_eq!(resp.formatted_expiry(), "Unknown");
        assert!(!resp.is_expired(&clock));

        resp.expires_at = "lifetime".into();
        assert_eq!(resp.formatted_expiry(), "lifetime");
        assert_eq!(resp.days_remaining(&clock), None);
    }

    #[test]
    fn test_banned_license_is_not_valid() {
        let clock = MockClock::at("2025-01-01T00:00:00Z");
        let mut license = LicenseInfo::from_wire(&WireLicense::default(), "KEY");
        license.is_banned = true;
        let resp = AuthResponse {
            success: true,
            license: Some(license),
            ..AuthResponse::default()
        };
        assert!(!resp.is_valid(&clock));
    }
}
