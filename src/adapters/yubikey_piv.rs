//! PIV (Personal Identity Verification) implementation of the device ports
//!
//! This module provides concrete implementations of the provisioning traits
//! using the yubikey crate's PIV functionality over PC/SC.

use std::convert::TryFrom;

use der::Encode;
use rand::rngs::OsRng;
use rand::TryRngCore;
use tracing::{debug, info, warn};
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use yubikey::certificate::{CertInfo, Certificate as PivCertificate};
use yubikey::piv::generate;
use yubikey::{Context, MgmKey, YubiKey};

use crate::error::DeviceError;
use crate::model::{ManagementKey, Pin, Slot};
use crate::ports::{
    CertificateStore, DeviceFinder, DeviceInfo, DeviceReset, KeyConfig, KeyManager,
    ManagementKeyManager, ManagementKeyVerifier, PinManager,
};

/// Upper bound on wrong PIN/PUK attempts while blocking them for a reset
const MAX_BLOCK_ATTEMPTS: usize = 16;

/// PIV-based YubiKey device finder
///
/// Finds and connects to YubiKey devices using PC/SC.
#[derive(Debug, Clone, Default)]
pub struct PivDeviceFinder;

impl PivDeviceFinder {
    fn reader_names(&self) -> Result<Vec<String>, DeviceError> {
        let mut context = open_context()?;
        let readers = context.iter().map_err(|e| DeviceError::ConnectionFailed {
            reason: format!("Failed to iterate readers: {}", e),
        })?;
        Ok(readers.map(|reader| reader.name().to_string()).collect())
    }
}

fn open_context() -> Result<Context, DeviceError> {
    Context::open().map_err(|e| DeviceError::ConnectionFailed {
        reason: format!("Failed to open PC/SC context: {}", e),
    })
}

/// Pick the reader to open from the connected ones
///
/// `card` selects by substring of the reader name. Without `card` exactly
/// one reader must be connected.
fn select_reader(names: &[String], card: Option<&str>) -> Result<String, DeviceError> {
    match card {
        Some(card) => names
            .iter()
            .find(|name| name.contains(card))
            .cloned()
            .ok_or_else(|| DeviceError::NoMatchingCard {
                name: card.to_string(),
            }),
        None => match names {
            [] => Err(DeviceError::NotFound),
            [only] => Ok(only.clone()),
            several => Err(DeviceError::Ambiguous {
                readers: several.to_vec(),
            }),
        },
    }
}

impl DeviceFinder for PivDeviceFinder {
    type Device = PivYubiKey;

    fn list(&self) -> Result<Vec<DeviceInfo>, DeviceError> {
        let mut context = open_context()?;
        let readers = context.iter().map_err(|e| DeviceError::ConnectionFailed {
            reason: format!("Failed to iterate readers: {}", e),
        })?;

        let mut devices = Vec::new();
        for reader in readers {
            let name = reader.name().to_string();
            match reader.open() {
                Ok(yk) => devices.push(DeviceInfo {
                    name,
                    serial: u32::from(yk.serial()),
                }),
                // readers without a PIV applet are not tokens
                Err(e) => debug!("Skipping reader {:?}: {}", name, e),
            }
        }
        Ok(devices)
    }

    fn open(&self, card: Option<&str>) -> Result<Self::Device, DeviceError> {
        let names = self.reader_names()?;
        let selected = select_reader(&names, card)?;

        let mut context = open_context()?;
        let readers = context.iter().map_err(|e| DeviceError::ConnectionFailed {
            reason: format!("Failed to iterate readers: {}", e),
        })?;
        for reader in readers {
            if reader.name() != selected.as_str() {
                continue;
            }
            let yk = reader.open().map_err(|e| DeviceError::ConnectionFailed {
                reason: format!("Failed to open {}: {}", selected, e),
            })?;
            debug!("Connected to YubiKey: {:?}", selected);
            return Ok(PivYubiKey::new(yk));
        }

        // unplugged between listing and opening
        Err(DeviceError::NotFound)
    }
}

/// PIV-based YubiKey device handle
///
/// Owns the PC/SC connection; dropping it releases the card.
pub struct PivYubiKey {
    device: YubiKey,
}

impl PivYubiKey {
    pub fn new(device: YubiKey) -> Self {
        Self { device }
    }

    pub fn serial(&self) -> u32 {
        u32::from(self.device.serial())
    }

    fn block_pin(&mut self) -> Result<(), DeviceError> {
        for _ in 0..MAX_BLOCK_ATTEMPTS {
            let wrong = random_wrong_secret()?;
            match self.device.verify_pin(&wrong) {
                Err(yubikey::Error::WrongPin { tries: 0 }) | Err(yubikey::Error::PinLocked) => {
                    return Ok(())
                }
                Err(yubikey::Error::WrongPin { .. }) => continue,
                // a random 8 digit guess matched, try another one
                Ok(()) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(DeviceError::Rejected {
            reason: "PIN did not block".to_string(),
        })
    }
}

impl std::fmt::Debug for PivYubiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PivYubiKey")
            .field("serial", &self.serial())
            .finish()
    }
}

/// Eight random digits, never a valid guess in practice
fn random_wrong_secret() -> Result<Vec<u8>, DeviceError> {
    let mut bytes = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| DeviceError::Rejected {
            reason: format!("couldn't get random bytes: {}", e),
        })?;
    Ok(bytes.iter().map(|b| b'0' + b % 10).collect())
}

fn to_mgm_key(mgmt_key: &ManagementKey) -> Result<MgmKey, DeviceError> {
    MgmKey::try_from(mgmt_key).map_err(|e| DeviceError::AuthenticationFailed {
        reason: e.to_string(),
    })
}

/// Refused credentials become `AuthenticationFailed`, everything else is
/// kept as the library error
fn credential_error(err: yubikey::Error) -> DeviceError {
    match err {
        yubikey::Error::AuthenticationError => DeviceError::AuthenticationFailed {
            reason: "management key refused".to_string(),
        },
        yubikey::Error::WrongPin { tries } => DeviceError::AuthenticationFailed {
            reason: format!("wrong PIN/PUK, {} tries left", tries),
        },
        yubikey::Error::PinLocked => DeviceError::AuthenticationFailed {
            reason: "PIN/PUK blocked".to_string(),
        },
        other => DeviceError::YubikeyLib(other),
    }
}

impl ManagementKeyVerifier for PivYubiKey {
    fn authenticate(&mut self, mgmt_key: &ManagementKey) -> Result<(), DeviceError> {
        let mgm_key = to_mgm_key(mgmt_key)?;
        self.device
            .authenticate(mgm_key)
            .map_err(credential_error)?;
        debug!("YubiKey authenticated with management key");
        Ok(())
    }
}

impl ManagementKeyManager for PivYubiKey {
    fn set_management_key(
        &mut self,
        current: &ManagementKey,
        new: &ManagementKey,
    ) -> Result<(), DeviceError> {
        self.authenticate(current)?;
        let new_key = to_mgm_key(new)?;
        new_key
            .set_manual(&mut self.device, false)
            .map_err(credential_error)?;
        info!("Management key replaced");
        Ok(())
    }

    fn store_management_key(&mut self, mgmt_key: &ManagementKey) -> Result<(), DeviceError> {
        self.authenticate(mgmt_key)?;
        // protected metadata is PIN-guarded; secrets are rotated only after this step
        self.device
            .verify_pin(Pin::DEFAULT_PIN)
            .map_err(credential_error)?;
        let key = to_mgm_key(mgmt_key)?;
        key.set_protected(&mut self.device)
            .map_err(credential_error)?;
        info!("Management key stored in protected metadata");
        Ok(())
    }
}

impl PinManager for PivYubiKey {
    fn change_pin(&mut self, current: &Pin, new: &Pin) -> Result<(), DeviceError> {
        self.device
            .change_pin(current.as_bytes(), new.as_bytes())
            .map_err(credential_error)?;
        debug!("PIN changed");
        Ok(())
    }

    fn change_puk(&mut self, current: &Pin, new: &Pin) -> Result<(), DeviceError> {
        self.device
            .change_puk(current.as_bytes(), new.as_bytes())
            .map_err(credential_error)?;
        debug!("PUK changed");
        Ok(())
    }
}

impl DeviceReset for PivYubiKey {
    fn reset(&mut self) -> Result<(), DeviceError> {
        warn!("Resetting PIV applet, all keys on the device are destroyed");
        // the applet only resets once PIN and PUK are both blocked
        self.block_pin()?;
        self.device.block_puk()?;
        self.device.reset_device()?;
        info!("PIV applet reset to factory settings");
        Ok(())
    }
}

impl KeyManager for PivYubiKey {
    fn generate_key(
        &mut self,
        mgmt_key: &ManagementKey,
        config: &KeyConfig,
    ) -> Result<SubjectPublicKeyInfoOwned, DeviceError> {
        self.authenticate(mgmt_key)?;

        debug!(
            "Generating {:?} key in slot {} (PIN={:?}, touch={})",
            config.algorithm, config.slot, config.pin_policy, config.touch_policy
        );

        let spki = generate(
            &mut self.device,
            config.slot.to_yubikey_slot_id(),
            config.algorithm.to_yubikey_algorithm_id(),
            config.pin_policy.to_yubikey_pin_policy(),
            config.touch_policy.to_yubikey_touch_policy(),
        )
        .map_err(|e| DeviceError::Rejected {
            reason: format!("Key generation failed: {}", e),
        })?;

        info!("Key generated in slot {}", config.slot);
        Ok(spki)
    }
}

/// Interpret a certificate read
///
/// The library reports an empty slot as an empty object, which fails to
/// parse as `InvalidObject`.
fn slot_occupied<T>(read: Result<T, yubikey::Error>) -> Result<bool, DeviceError> {
    match read {
        Ok(_) => Ok(true),
        Err(yubikey::Error::InvalidObject) | Err(yubikey::Error::NotFound) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl CertificateStore for PivYubiKey {
    fn has_certificate(&mut self, slot: Slot) -> Result<bool, DeviceError> {
        slot_occupied(PivCertificate::read(
            &mut self.device,
            slot.to_yubikey_slot_id(),
        ))
    }

    fn write_certificate(
        &mut self,
        mgmt_key: &ManagementKey,
        slot: Slot,
        certificate: &x509_cert::Certificate,
    ) -> Result<(), DeviceError> {
        self.authenticate(mgmt_key)?;

        let der = certificate.to_der().map_err(|e| DeviceError::Rejected {
            reason: format!("certificate not encodable: {}", e),
        })?;
        let piv_cert = PivCertificate::from_bytes(der)?;
        piv_cert.write(&mut self.device, slot.to_yubikey_slot_id(), CertInfo::Uncompressed)?;

        debug!("Certificate written to slot {}", slot);
        Ok(())
    }
}
