//! # Authlink
//!
//! **Blocking username/password and license-key authentication against
//! hosted licensing APIs.**
//!
//! Authlink posts credentials and a hardware fingerprint to a licensing
//! server, parses the JSON verdict, and hands back an [`AuthResponse`] with
//! the success flag, server message and account details. It speaks two wire
//! dialects, picked by [`Encoding`]:
//!
//! - **Form**: KeyAuth-style single endpoint, url-encoded bodies. `setup()`
//!   opens a session whose id `login` and `register` must carry.
//! - **Json**: REST-style `/login`, `/register`, `/verify` and
//!   `/license/validate` endpoints with an `X-API-Key` header. `setup()`
//!   only checks the local configuration.
//!
//! ## Quickstart
//!
//! ```no_run
//! use authlink::{AuthConfig, AuthManager, ClientIdentity};
//!
//! const IDENTITY: ClientIdentity = ClientIdentity {
//!     name: "myapp",
//!     owner_key: "your-owner-id",
//!     version: "1.0",
//! };
//!
//! fn main() -> Result<(), authlink::AuthError> {
//!     let manager = AuthManager::new(AuthConfig::form("https://keyauth.win/api/1.3", IDENTITY))?;
//!
//!     let setup = manager.setup();
//!     if !setup.success {
//!         eprintln!("Setup failed: {}", setup.message);
//!         return Ok(());
//!     }
//!
//!     let response = manager.login("alice", "hunter2");
//!     if response.success {
//!         println!("Welcome, {} (expires {})", response.username, response.formatted_expiry());
//!     } else {
//!         println!("Login failed: {}", response.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Operations never return `Err` and never panic on bad input: local
//! configuration problems, network errors, unparseable replies and server
//! rejections all come back as an [`AuthResponse`] with `success == false`
//! and a [`FailureKind`] saying which of those it was.
//!
//! Client-side licensing can always be bypassed by a determined attacker
//! with access to the binary. Authlink does not try to prevent that.

#![warn(missing_docs)]

// Core modules
pub mod config;
pub mod errors;
pub mod expiry;
pub mod hwid;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Manager (main public API)
pub mod manager;

// Re-exports for public API
pub use client::http::{ApiResponse, HttpTransport, Transport};
pub use config::{AuthConfig, ClientIdentity, Encoding};
pub use errors::AuthError;
pub use expiry::{Clock, SystemClock};
pub use hwid::{FixedHardwareId, HardwareIdProvider, HashedHardwareId, SystemHardwareId};
pub use manager::{AuthManager, SessionState};
pub use protocol::models::{AuthResponse, FailureKind, LicenseInfo, Rejection, Subscription};
pub use protocol::request::{ApiRequest, CallKind};

#[cfg(any(test, feature = "test-seams"))]
pub use expiry::MockClock;
