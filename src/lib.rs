//! Provision the PIV applet of a YubiKey with SSH identities
//!
//! A setup run validates the operator's PIN/PUK, refuses (or resets) an
//! already provisioned token, replaces the factory management key, PIN and
//! PUK, and generates one on-device P-256 key per configured slot. Each key
//! is wrapped in a self-signed certificate stored in its slot and reported
//! as an OpenSSH `authorized_keys` line.

mod adapters;
pub mod api;
pub mod error;
mod logic;
pub mod model;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use error::{YksshError, YksshResult};

// Re-export public API
pub use api::{list_devices, setup};
