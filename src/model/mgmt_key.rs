//! Management Key type for YubiKey PIV authentication
//!
//! This module defines a domain type for the PIV Management Key and
//! provides idiomatic conversions to the yubikey crate's `MgmKey`.

use std::convert::TryFrom;
use std::fmt;

use rand::rngs::OsRng;
use rand::TryRngCore;
use thiserror::Error;
use yubikey::MgmKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Management Key for YubiKey PIV authentication
///
/// A Management Key is a 24-byte key (3 DES keys of 8 bytes each) used to
/// authenticate for key management operations on the YubiKey.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ManagementKey([u8; 24]);

impl ManagementKey {
    /// Factory default key of every PIV applet
    pub const DEFAULT: [u8; 24] = [
        1, 2, 3, 4, 5, 6, 7, 8, 1, 2, 3, 4, 5, 6, 7, 8, 1, 2, 3, 4, 5, 6, 7, 8,
    ];

    pub const fn new(key: [u8; 24]) -> Self {
        Self(key)
    }

    pub fn factory_default() -> Self {
        Self(Self::DEFAULT)
    }

    /// Draw a fresh key from the operating system's CSPRNG
    ///
    /// # Errors
    ///
    /// Returns `ManagementKeyError::Randomness` if the OS source fails
    pub fn generate() -> Result<Self, ManagementKeyError> {
        let mut bytes = [0u8; 24];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ManagementKeyError::Randomness {
                reason: e.to_string(),
            })?;
        Ok(Self(bytes))
    }

    pub fn is_factory_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// Get the Management Key as a byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the Management Key as an array reference
    pub fn as_array(&self) -> &[u8; 24] {
        &self.0
    }
}

impl fmt::Debug for ManagementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ManagementKey([REDACTED])")
    }
}

/// Errors that can occur when creating or converting a Management Key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagementKeyError {
    /// The random source could not produce key material
    #[error("couldn't get random bytes: {reason}")]
    Randomness { reason: String },

    /// Underlying yubikey crate rejected the key material
    #[error("Invalid Management Key material: {reason}")]
    InvalidMaterial { reason: String },
}

/// Fallible conversion from domain `ManagementKey` to yubikey crate's `MgmKey`.
///
/// The yubikey crate refuses weak 3DES keys, hence the `TryFrom`.
impl TryFrom<&ManagementKey> for MgmKey {
    type Error = ManagementKeyError;

    fn try_from(key: &ManagementKey) -> Result<Self, Self::Error> {
        MgmKey::new(*key.as_array()).map_err(|e| ManagementKeyError::InvalidMaterial {
            reason: e.to_string(),
        })
    }
}
