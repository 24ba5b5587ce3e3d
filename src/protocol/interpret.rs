//! Maps a raw reply to an [`AuthResponse`] for the call that produced it.

use super::models::{
    parse_wire_response, AuthResponse, FailureKind, LicenseInfo, Rejection, Subscription,
    WireResponse,
};
use super::request::CallKind;
use crate::AuthError;
use tracing::warn;

/// Local context the interpreter needs alongside the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallContext<'a> {
    /// Locally computed hardware id; copied into successful logins.
    pub hwid: &'a str,
    /// Username supplied by the caller (register echoes it back).
    pub username: &'a str,
    /// License key supplied by the caller.
    pub license_key: &'a str,
}

/// Outcome of interpreting a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreted {
    /// Result handed to the caller.
    pub response: AuthResponse,
    /// Session token issued by a successful `init`.
    pub session_id: Option<String>,
}

/// Parse `body` and map it for `kind`.
///
/// Returns `Err` only when the body is not the JSON we expect; a server
/// rejection is a normal `Ok` with `success == false`.
pub fn interpret(
    kind: CallKind,
    body: &str,
    ctx: &CallContext<'_>,
) -> Result<Interpreted, AuthError> {
    let wire = parse_wire_response(body)?;

    if !wire.success.unwrap_or(false) {
        return Ok(Interpreted {
            response: rejected(&wire),
            session_id: None,
        });
    }

    let mut response = AuthResponse {
        success: true,
        message: wire.message.clone().unwrap_or_else(|| "success".to_string()),
        ..AuthResponse::default()
    };
    let mut session_id = None;

    match kind {
        CallKind::Init => match wire.sessionid.as_deref() {
            Some(sid) if !sid.is_empty() => session_id = Some(sid.to_string()),
            _ => {
                warn!("init succeeded without a session id");
                return Err(AuthError::MalformedResponse(
                    "missing sessionid in init response".to_string(),
                ));
            }
        },
        CallKind::Login | CallKind::Register => {
            copy_account(&wire, &mut response);
            if response.username.is_empty() && kind == CallKind::Register {
                response.username = ctx.username.to_string();
            }
            response.hwid = ctx.hwid.to_string();
            response.subscription = first_subscription(&wire);
        }
        CallKind::Verify => {
            response.user_id = wire.user_id.unwrap_or(0);
            response.username = account_username(&wire);
            response.expires_at = wire.expires_at.clone().unwrap_or_default();
        }
        CallKind::License => {
            let Some(license) = wire.license.as_ref() else {
                // A success without the license object is not a validation.
                return Ok(Interpreted {
                    response: AuthResponse::failure(
                        FailureKind::Rejected(Rejection::InvalidLicense),
                        wire.message
                            .clone()
                            .unwrap_or_else(|| "License validation failed".to_string()),
                    ),
                    session_id: None,
                });
            };
            let info = LicenseInfo::from_wire(license, ctx.license_key);
            response.expires_at = info.expires_at.clone();
            response.hwid_locked = info.hwid_lock_enabled;
            response.license = Some(info);
        }
    }

    Ok(Interpreted {
        response,
        session_id,
    })
}

fn rejected(wire: &WireResponse) -> AuthResponse {
    let message = wire
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());
    let required_version = wire.required_version.clone().unwrap_or_default();
    let current_version = wire.current_version.clone().unwrap_or_default();
    let reason = Rejection::classify(&message, !required_version.is_empty());

    AuthResponse {
        required_version,
        current_version,
        ..AuthResponse::failure(FailureKind::Rejected(reason), message)
    }
}

fn account_username(wire: &WireResponse) -> String {
    wire.username
        .clone()
        .or_else(|| wire.info.as_ref().and_then(|i| i.username.clone()))
        .unwrap_or_default()
}

fn copy_account(wire: &WireResponse, response: &mut AuthResponse) {
    response.user_id = wire.user_id.unwrap_or(0);
    response.username = account_username(wire);
    response.email = wire.email.clone().unwrap_or_default();
    response.expires_at = wire.expires_at.clone().unwrap_or_default();
    response.hwid_locked = wire.hwid_locked.unwrap_or(false);
}

fn first_subscription(wire: &WireResponse) -> Subscription {
    match wire.subscriptions().and_then(|subs| subs.first()) {
        Some(first) => Subscription {
            active: true,
            expiry: first.expiry.clone().unwrap_or_default(),
            name: first.subscription.clone().unwrap_or_default(),
        },
        None => Subscription::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: CallContext<'static> = CallContext {
        hwid: "S-1-5-21-local",
        username: "typed-name",
        license_key: "KEY-1",
    };

    fn run(kind: CallKind, body: &str) -> AuthResponse {
        interpret(kind, body, &CTX).unwrap().response
    }

    #[test]
    fn test_init_stores_session() {
        let out = interpret(CallKind::Init, r#"{"success":true,"sessionid":"abc123"}"#, &CTX).unwrap();
        assert!(out.response.success);
        assert_eq!(out.session_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_init_without_session_is_malformed() {
        let result = interpret(CallKind::Init, r#"{"success":true}"#, &CTX);
        assert!(matches!(result, Err(AuthError::MalformedResponse(_))));
    }

    #[test]
    fn test_init_failure_keeps_message() {
        let out = interpret(
            CallKind::Init,
            r#"{"success":false,"message":"This program hash does not match"}"#,
            &CTX,
        )
        .unwrap();
        assert!(!out.response.success);
        assert_eq!(out.response.message, "This program hash does not match");
        assert!(out.session_id.is_none());
    }

    #[test]
    fn test_flat_login_success() {
        let resp = run(
            CallKind::Login,
            r#"{"success":true,"user_id":7,"username":"alice","expires_at":"2025-01-01"}"#,
        );
        assert!(resp.success);
        assert_eq!(resp.user_id, 7);
        assert_eq!(resp.username, "alice");
        assert_eq!(resp.expires_at, "2025-01-01");
        assert_eq!(resp.email, "");
        assert!(!resp.hwid_locked);
        assert_eq!(resp.hwid, "S-1-5-21-local");
        assert!(!resp.subscription.active);
        assert!(resp.failure.is_none());
    }

    #[test]
    fn test_keyauth_login_success() {
        let resp = run(
            CallKind::Login,
            r#"{"success":true,"message":"Logged in!","info":{"username":"bob","hwid":"server-echo","subscriptions":[{"subscription":"default","expiry":"1767225600"},{"expiry":"1"}]}}"#,
        );
        assert!(resp.success);
        assert_eq!(resp.message, "Logged in!");
        assert_eq!(resp.username, "bob");
        assert_eq!(resp.hwid, "S-1-5-21-local");
        assert!(resp.subscription.active);
        assert_eq!(resp.subscription.expiry, "1767225600");
        assert_eq!(resp.subscription.name, "default");
    }

    #[test]
    fn test_empty_subscriptions_is_inactive() {
        let resp = run(CallKind::Login, r#"{"success":true,"subscriptions":[]}"#);
        assert!(resp.success);
        assert!(!resp.subscription.active);
    }

    #[test]
    fn test_register_falls_back_to_typed_username() {
        let resp = run(CallKind::Register, r#"{"success":true}"#);
        assert_eq!(resp.username, "typed-name");
        assert_eq!(resp.hwid, "S-1-5-21-local");
    }

    #[test]
    fn test_version_mismatch() {
        let resp = run(
            CallKind::Login,
            r#"{"success":false,"message":"bad key","required_version":"2.0","current_version":"1.0"}"#,
        );
        assert!(!resp.success);
        assert_eq!(resp.message, "bad key");
        assert_eq!(resp.required_version, "2.0");
        assert_eq!(resp.current_version, "1.0");
        assert!(resp.is_version_mismatch());
        assert_eq!(resp.rejection(), Some(Rejection::VersionMismatch));
    }

    #[test]
    fn test_rejection_does_not_copy_account_fields() {
        let resp = run(
            CallKind::Login,
            r#"{"success":false,"message":"Invalid password","user_id":3,"username":"x"}"#,
        );
        assert_eq!(resp.user_id, 0);
        assert_eq!(resp.username, "");
        assert_eq!(resp.hwid, "");
        assert_eq!(resp.rejection(), Some(Rejection::InvalidCredentials));
    }

    #[test]
    fn test_missing_success_is_failure() {
        let resp = run(CallKind::Login, r#"{"message":"???"}"#);
        assert!(!resp.success);
        assert_eq!(resp.message, "???");
    }

    #[test]
    fn test_missing_message_defaults() {
        let resp = run(CallKind::Verify, r#"{"success":false}"#);
        assert_eq!(resp.message, "Unknown error");
    }

    #[test]
    fn test_verify_success() {
        let resp = run(
            CallKind::Verify,
            r#"{"success":true,"user_id":7,"username":"alice","expires_at":null,"email":"a@b.c"}"#,
        );
        assert!(resp.success);
        assert_eq!(resp.user_id, 7);
        assert_eq!(resp.username, "alice");
        assert_eq!(resp.expires_at, "");
        // Verify only reports identity and expiry.
        assert_eq!(resp.email, "");
    }

    #[test]
    fn test_license_success() {
        let resp = run(
            CallKind::License,
            r#"{"success":true,"message":"License validated successfully","license":{"licenseKey":"KEY-1","applicationId":4,"maxUsers":3,"currentUsers":1,"expiresAt":"2025-12-31T23:59:59.999Z","isActive":true,"hwidLockEnabled":true}}"#,
        );
        assert!(resp.success);
        let license = resp.license.as_ref().unwrap();
        assert_eq!(license.application_id, 4);
        assert_eq!(license.max_users, 3);
        assert_eq!(license.validity_days, 30);
        assert!(resp.hwid_locked);
        assert_eq!(resp.expires_at, "2025-12-31T23:59:59.999Z");
    }

    #[test]
    fn test_license_success_without_object() {
        let resp = run(CallKind::License, r#"{"success":true}"#);
        assert!(!resp.success);
        assert_eq!(resp.message, "License validation failed");
        assert_eq!(resp.rejection(), Some(Rejection::InvalidLicense));
    }

    #[test]
    fn test_non_json_bodies_are_errors() {
        for body in ["", "not json", "{", "[1,2", "failed to make request"] {
            let result = interpret(CallKind::Login, body, &CTX);
            assert!(matches!(result, Err(AuthError::MalformedResponse(_))), "{body:?}");
        }
    }
}
