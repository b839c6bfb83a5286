//! Self-signed certificate wrapping an on-device public key
//!
//! PIV slots pair a key with a certificate. The certificate built here only
//! carries the public key into the slot: it is signed by a throwaway P-256
//! key that is dropped right after signing.

use std::str::FromStr;
use std::time::SystemTime;

use der::asn1::{GeneralizedTime, UtcTime};
use der::DateTime;
use p256::ecdsa::{DerSignature, SigningKey};
use rand::rngs::OsRng;
use rand::TryRngCore;
use tracing::debug;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::ext::pkix::{KeyUsage, KeyUsages};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::{Time, Validity};
use x509_cert::Certificate;

use crate::error::CryptoError;

/// Subject common name of every wrapper certificate
pub const SUBJECT: &str = "CN=SSH key";

/// Years between `notBefore` and `notAfter`
pub const VALIDITY_YEARS: u16 = 64;

/// RFC 5280: UTCTime up to 2049, GeneralizedTime from 2050 on
const FIRST_GENERALIZED_YEAR: u16 = 2050;

/// How often a rejected random scalar is redrawn before giving up
const MAX_KEY_ATTEMPTS: usize = 8;

/// Issuer naming this tool and its version
pub fn issuer() -> String {
    format!(
        "O={},OU={}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

/// 128 random bits for the certificate serial
pub fn random_serial() -> Result<u128, CryptoError> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Randomness {
            reason: e.to_string(),
        })?;
    Ok(u128::from_be_bytes(bytes))
}

/// Throwaway P-256 key used as certificate issuer
pub fn issuer_key() -> Result<SigningKey, CryptoError> {
    let mut bytes = [0u8; 32];
    for _ in 0..MAX_KEY_ATTEMPTS {
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Randomness {
                reason: e.to_string(),
            })?;
        // zero or >= the group order is rejected, draw again
        if let Ok(key) = SigningKey::from_slice(&bytes) {
            return Ok(key);
        }
    }
    Err(CryptoError::KeyGenerationFailed {
        reason: "no valid P-256 scalar drawn".to_string(),
    })
}

/// `now` until `now` plus `VALIDITY_YEARS` calendar years
///
/// A 29th of February without counterpart rolls over to the 1st of March.
pub fn validity_window(now: SystemTime) -> Result<Validity, CryptoError> {
    let not_before = DateTime::from_system_time(now).map_err(encoding_error)?;
    let year = not_before.year() + VALIDITY_YEARS;
    let not_after = DateTime::new(
        year,
        not_before.month(),
        not_before.day(),
        not_before.hour(),
        not_before.minutes(),
        not_before.seconds(),
    )
    .or_else(|_| {
        DateTime::new(
            year,
            3,
            1,
            not_before.hour(),
            not_before.minutes(),
            not_before.seconds(),
        )
    })
    .map_err(encoding_error)?;

    Ok(Validity {
        not_before: to_time(not_before)?,
        not_after: to_time(not_after)?,
    })
}

fn to_time(date_time: DateTime) -> Result<Time, CryptoError> {
    if date_time.year() >= FIRST_GENERALIZED_YEAR {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(date_time)))
    } else {
        Ok(Time::UtcTime(
            UtcTime::from_date_time(date_time).map_err(encoding_error)?,
        ))
    }
}

/// Build the wrapper certificate for `subject_key`
///
/// The certificate carries key usage `digitalSignature` and `keyAgreement`
/// and is signed by `issuer_key`.
pub fn build_wrapper_certificate(
    subject_key: SubjectPublicKeyInfoOwned,
    issuer_key: &SigningKey,
    serial: u128,
    now: SystemTime,
) -> Result<Certificate, CryptoError> {
    let serial_number = SerialNumber::new(&serial.to_be_bytes()).map_err(encoding_error)?;
    let validity = validity_window(now)?;
    let subject = Name::from_str(SUBJECT).map_err(encoding_error)?;
    let issuer = Name::from_str(&issuer()).map_err(encoding_error)?;

    debug!(
        "Building wrapper certificate, serial {}",
        hex::encode(serial.to_be_bytes())
    );

    let mut builder = CertificateBuilder::new(
        Profile::Manual {
            issuer: Some(issuer),
        },
        serial_number,
        validity,
        subject,
        subject_key,
        issuer_key,
    )
    .map_err(encoding_error)?;

    builder
        .add_extension(&KeyUsage(
            KeyUsages::DigitalSignature | KeyUsages::KeyAgreement,
        ))
        .map_err(encoding_error)?;

    builder.build::<DerSignature>().map_err(encoding_error)
}

fn encoding_error(err: impl std::fmt::Display) -> CryptoError {
    CryptoError::CertificateEncoding {
        reason: err.to_string(),
    }
}
