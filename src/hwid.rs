//! Hardware identifier providers.
//!
//! The licensing server binds accounts to the string returned here, so a
//! provider must return the same value for the same machine on every run.

use sha2::{Digest, Sha256};
use tracing::warn;

/// Returned when the platform lookup fails.
pub const UNKNOWN_HWID: &str = "none";

/// Source of the local hardware identifier.
pub trait HardwareIdProvider: Send + Sync {
    /// Return the identifier, or [`UNKNOWN_HWID`] when unavailable.
    fn hardware_id(&self) -> String;
}

/// Platform identifier from the operating system.
///
/// Windows reads the machine GUID, macOS the IOPlatformUUID, and Linux the
/// systemd/dbus machine id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHardwareId;

impl HardwareIdProvider for SystemHardwareId {
    fn hardware_id(&self) -> String {
        match hardware_id::get_id() {
            Ok(id) if !id.trim().is_empty() => id.trim().to_string(),
            Ok(_) => {
                warn!("Platform returned an empty hardware id");
                UNKNOWN_HWID.to_string()
            }
            Err(e) => {
                warn!(error = ?e, "Failed to read hardware id");
                UNKNOWN_HWID.to_string()
            }
        }
    }
}

/// Hex SHA-256 of another provider's id, salted per application.
///
/// Keeps the raw platform id off the wire. The sentinel is passed through
/// unhashed so the server can still tell a failed lookup apart.
#[derive(Debug, Clone)]
pub struct HashedHardwareId<P> {
    inner: P,
    salt: String,
}

impl<P: HardwareIdProvider> HashedHardwareId<P> {
    /// Wrap `inner`, mixing `salt` (typically the application name) into the digest.
    pub fn new(inner: P, salt: impl Into<String>) -> Self {
        Self {
            inner,
            salt: salt.into(),
        }
    }
}

impl<P: HardwareIdProvider> HardwareIdProvider for HashedHardwareId<P> {
    fn hardware_id(&self) -> String {
        let raw = self.inner.hardware_id();
        if raw == UNKNOWN_HWID {
            return raw;
        }
        hash_identifier(&self.salt, &raw)
    }
}

/// Caller-supplied identifier (e.g. computed by the host application).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedHardwareId(pub String);

impl FixedHardwareId {
    /// Use `id` verbatim.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl HardwareIdProvider for FixedHardwareId {
    fn hardware_id(&self) -> String {
        self.0.clone()
    }
}

/// Salted SHA-256 of an identifier, lowercase hex.
pub fn hash_identifier(salt: &str, raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"|");
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
