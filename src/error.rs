//! Error types for ykssh library
//!
//! The top-level `YksshError` has one variant per failure class a caller can
//! act on: bad input, an already provisioned device, a device failure and a
//! host-side crypto failure. Device and crypto failures carry the workflow
//! step they happened in and the original cause as `source`.

use std::fmt;

use thiserror::Error;

use crate::model::{ManagementKeyError, Slot, ValidationError};

/// Result type alias for ykssh operations
pub type YksshResult<T> = Result<T, YksshError>;

/// Top-level error type for all ykssh operations
#[derive(Error, Debug)]
pub enum YksshError {
    /// Operator secret rejected before any device interaction
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The primary slot holds a certificate and overwriting was not requested
    #[error("security key already set up (certificate in slot {slot}) and --reset-security-key not specified")]
    AlreadyProvisioned { slot: Slot },

    /// The device failed or refused a command
    #[error("couldn't {step}: {source}")]
    Hardware {
        step: Step,
        #[source]
        source: DeviceError,
    },

    /// A host-side cryptographic operation failed
    #[error("couldn't {step}: {source}")]
    Crypto {
        step: Step,
        #[source]
        source: CryptoError,
    },
}

impl YksshError {
    /// Workflow step a device or crypto failure happened in
    pub fn step(&self) -> Option<Step> {
        match self {
            YksshError::Hardware { step, .. } | YksshError::Crypto { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Steps of the provisioning workflow, used as error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    OpenDevice,
    ReadCertificate,
    Reset,
    GenerateManagementKey,
    SetManagementKey,
    StoreManagementKey,
    SetPin,
    SetPuk,
    GenerateKey(Slot),
    GenerateIssuerKey(Slot),
    GenerateSerial(Slot),
    BuildCertificate(Slot),
    StoreCertificate(Slot),
    EncodeSshKey(Slot),
}

impl Step {
    /// Slot the step operates on, for per-slot steps
    pub fn slot(&self) -> Option<Slot> {
        match *self {
            Step::GenerateKey(slot)
            | Step::GenerateIssuerKey(slot)
            | Step::GenerateSerial(slot)
            | Step::BuildCertificate(slot)
            | Step::StoreCertificate(slot)
            | Step::EncodeSshKey(slot) => Some(slot),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::OpenDevice => write!(f, "get security key"),
            Step::ReadCertificate => write!(f, "get certificate"),
            Step::Reset => write!(f, "reset security key"),
            Step::GenerateManagementKey => write!(f, "generate management key"),
            Step::SetManagementKey => write!(f, "set management key"),
            Step::StoreManagementKey => write!(f, "store management key"),
            Step::SetPin => write!(f, "set PIN"),
            Step::SetPuk => write!(f, "set PUK"),
            Step::GenerateKey(slot) => write!(f, "configure slot {}: generate key", slot),
            Step::GenerateIssuerKey(slot) => {
                write!(f, "configure slot {}: generate parent key", slot)
            }
            Step::GenerateSerial(slot) => write!(f, "configure slot {}: generate serial", slot),
            Step::BuildCertificate(slot) => {
                write!(f, "configure slot {}: create certificate", slot)
            }
            Step::StoreCertificate(slot) => write!(f, "configure slot {}: set certificate", slot),
            Step::EncodeSshKey(slot) => {
                write!(f, "configure slot {}: get SSH public key", slot)
            }
        }
    }
}

/// YubiKey device-related errors
#[derive(Error, Debug)]
pub enum DeviceError {
    /// No YubiKey device found
    #[error("No YubiKey device found - please connect a YubiKey")]
    NotFound,

    /// A card was requested by name but no reader matches
    #[error("No YubiKey named {name:?} found")]
    NoMatchingCard { name: String },

    /// Several devices present and none selected
    #[error("Multiple YubiKeys found, select one with --card: {}", readers.join(", "))]
    Ambiguous { readers: Vec<String> },

    /// YubiKey device connection failed
    #[error("Failed to connect to YubiKey device: {reason}")]
    ConnectionFailed { reason: String },

    /// Management key, PIN or PUK refused
    #[error("YubiKey authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// The device refused a command
    #[error("YubiKey rejected the command: {reason}")]
    Rejected { reason: String },

    /// The primary slot still holds a certificate after a reset
    #[error("certificate still present in slot {slot} after reset")]
    ResetIncomplete { slot: Slot },

    /// Underlying yubikey crate error
    #[error("YubiKey library error: {0}")]
    YubikeyLib(#[from] yubikey::Error),
}

/// Host-side cryptographic operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The random source failed
    #[error("couldn't get random bytes: {reason}")]
    Randomness { reason: String },

    /// Key generation failed
    #[error("Failed to generate key: {reason}")]
    KeyGenerationFailed { reason: String },

    /// The management key could not be used
    #[error("Invalid management key: {0}")]
    InvalidManagementKey(ManagementKeyError),

    /// The wrapper certificate could not be built or encoded
    #[error("Failed to encode certificate: {reason}")]
    CertificateEncoding { reason: String },

    /// The device returned a public key that cannot be used
    #[error("Invalid public key: {reason}")]
    InvalidPublicKey { reason: String },
}

impl From<ManagementKeyError> for CryptoError {
    fn from(err: ManagementKeyError) -> Self {
        match err {
            ManagementKeyError::Randomness { reason } => CryptoError::Randomness { reason },
            other => CryptoError::InvalidManagementKey(other),
        }
    }
}

/// Attach a workflow step to a device result
pub trait DeviceResultExt<T> {
    fn during(self, step: Step) -> YksshResult<T>;
}

impl<T> DeviceResultExt<T> for Result<T, DeviceError> {
    fn during(self, step: Step) -> YksshResult<T> {
        self.map_err(|source| YksshError::Hardware { step, source })
    }
}

/// Attach a workflow step to a host-side crypto result
pub trait CryptoResultExt<T> {
    fn during(self, step: Step) -> YksshResult<T>;
}

impl<T> CryptoResultExt<T> for Result<T, CryptoError> {
    fn during(self, step: Step) -> YksshResult<T> {
        self.map_err(|source| YksshError::Crypto { step, source })
    }
}
