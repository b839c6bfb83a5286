//! Secret validation use case
//!
//! Turns operator input into a `SecuritySecret` before any device is opened.

use std::str::FromStr;

use tracing::debug;

use crate::model::{SecuritySecret, ValidationError};
use crate::ports::SecretPrompt;

pub const ENTER_PROMPT: &str = "Enter a new PIN/PUK (6-8 digits): ";

pub const REPEAT_PROMPT: &str = "Repeat PIN/PUK: ";

/// Validate a secret given on the command line
pub fn secret_from_flag(value: u64) -> Result<SecuritySecret, ValidationError> {
    SecuritySecret::try_from(value)
}

/// Ask for the secret twice and validate it
///
/// The first entry must be numeric and in range, the second must repeat it
/// byte for byte.
///
/// # Errors
///
/// - `ValidationError::Unreadable` if the prompt fails
/// - `ValidationError::NotNumeric` or `OutOfRange` for a bad first entry
/// - `ValidationError::Mismatch` if the entries differ
pub fn secret_from_prompt<P: SecretPrompt>(prompt: &mut P) -> Result<SecuritySecret, ValidationError> {
    let first = prompt.read_secret(ENTER_PROMPT)?;
    let secret = SecuritySecret::from_str(first.as_str())?;

    let repeat = prompt.read_secret(REPEAT_PROMPT)?;
    if repeat.as_bytes() != first.as_bytes() {
        return Err(ValidationError::Mismatch);
    }

    debug!("PIN/PUK entered and confirmed");
    Ok(secret)
}
