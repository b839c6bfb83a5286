use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw PIN or PUK bytes as sent to the device
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Pin(Vec<u8>);

impl Pin {
    pub const DEFAULT_PIN: &'static [u8] = b"123456";

    pub const DEFAULT_PUK: &'static [u8] = b"12345678";

    pub const MIN_LENGTH: usize = 6;

    pub const MAX_LENGTH: usize = 8;

    pub fn new(pin: Vec<u8>) -> Result<Self, ValidationError> {
        if pin.len() < Self::MIN_LENGTH || pin.len() > Self::MAX_LENGTH {
            return Err(ValidationError::OutOfRange);
        }
        Ok(Self(pin))
    }

    /// Factory PIN of a PIV applet
    pub fn default_pin() -> Self {
        Self(Self::DEFAULT_PIN.to_vec())
    }

    /// Factory PUK of a PIV applet
    pub fn default_puk() -> Self {
        Self(Self::DEFAULT_PUK.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pin([REDACTED])")
    }
}

impl From<&SecuritySecret> for Pin {
    fn from(secret: &SecuritySecret) -> Self {
        Self(secret.0.to_string().into_bytes())
    }
}

/// Operator secret used for both PIN and PUK
///
/// Always holds a 6 to 8 digit decimal number, so the value lies in
/// `[SecuritySecret::MIN, SecuritySecret::MAX]`.
#[derive(Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct SecuritySecret(u32);

impl SecuritySecret {
    pub const MIN: u64 = 100_000;

    pub const MAX: u64 = 99_999_999;

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u64> for SecuritySecret {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::OutOfRange);
        }
        // MAX fits in u32
        Ok(Self(value as u32))
    }
}

impl FromStr for SecuritySecret {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::NotNumeric);
        }
        // all digits, so a parse failure can only mean overflow
        let value = s.parse::<u64>().map_err(|_| ValidationError::OutOfRange)?;
        Self::try_from(value)
    }
}

impl fmt::Debug for SecuritySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecuritySecret([REDACTED])")
    }
}

/// Reasons an operator secret is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid characters, PIN/PUK must be numeric")]
    NotNumeric,

    #[error("invalid PIN/PUK, must be 6-8 digits")]
    OutOfRange,

    #[error("PIN/PUK entries not equal")]
    Mismatch,

    #[error("couldn't read PIN/PUK: {reason}")]
    Unreadable { reason: String },
}
