//! In-memory token for tests
//!
//! Behaves like a PIV applet for the operations the provisioning workflow
//! uses, records every call in a journal and can be told to fail one of them.

use std::cell::Cell;
use std::collections::HashMap;

use der::Decode;
use p256::pkcs8::EncodePublicKey;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::Certificate;

use crate::error::DeviceError;
use crate::logic::certificate;
use crate::model::{ManagementKey, Pin, Slot};
use crate::ports::{
    CertificateStore, DeviceFinder, DeviceInfo, DeviceReset, KeyConfig, KeyManager,
    ManagementKeyManager, ManagementKeyVerifier, PinManager,
};

/// Device calls as seen by the fake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeOp {
    Authenticate,
    SetManagementKey,
    StoreManagementKey,
    ChangePin,
    ChangePuk,
    Reset,
    ReadCertificate(Slot),
    GenerateKey(Slot),
    WriteCertificate(Slot),
}

impl FakeOp {
    /// Whether the call changes device state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, FakeOp::Authenticate | FakeOp::ReadCertificate(_))
    }
}

#[derive(Debug, Clone)]
pub struct FakeSlot {
    pub key: Option<(KeyConfig, SubjectPublicKeyInfoOwned)>,
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Clone)]
pub struct FakeYubiKey {
    pub serial: u32,
    pub mgmt_key: ManagementKey,
    pub stored_mgmt_key: Option<ManagementKey>,
    pub pin: Pin,
    pub puk: Pin,
    pub slots: HashMap<Slot, FakeSlot>,
    pub journal: Vec<FakeOp>,
    /// The first call equal to this one fails with `DeviceError::Rejected`
    pub fail_on: Option<FakeOp>,
    /// Reset reports success but keeps the certificates
    pub broken_reset: bool,
}

impl Default for FakeYubiKey {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeYubiKey {
    /// Factory-fresh token
    pub fn new() -> Self {
        Self {
            serial: 12_345_678,
            mgmt_key: ManagementKey::factory_default(),
            stored_mgmt_key: None,
            pin: Pin::default_pin(),
            puk: Pin::default_puk(),
            slots: HashMap::new(),
            journal: Vec::new(),
            fail_on: None,
            broken_reset: false,
        }
    }

    /// Token that went through an earlier setup with `secret`
    pub fn provisioned(secret: &Pin) -> Self {
        let mut device = Self::new();
        device.mgmt_key = ManagementKey::new([7u8; 24]);
        device.stored_mgmt_key = Some(device.mgmt_key.clone());
        device.pin = secret.clone();
        device.puk = secret.clone();

        let spki = random_spki();
        let cert = certificate::build_wrapper_certificate(
            spki.clone(),
            &certificate::issuer_key().unwrap(),
            certificate::random_serial().unwrap(),
            std::time::SystemTime::now(),
        )
        .unwrap();
        device.slots.insert(
            Slot::Authentication,
            FakeSlot {
                key: Some((KeyConfig::default(), spki)),
                certificate: Some(cert),
            },
        );
        device
    }

    pub fn failing_on(mut self, op: FakeOp) -> Self {
        self.fail_on = Some(op);
        self
    }

    pub fn mutations(&self) -> Vec<FakeOp> {
        self.journal
            .iter()
            .copied()
            .filter(FakeOp::is_mutation)
            .collect()
    }

    pub fn certificate(&self, slot: Slot) -> Option<&Certificate> {
        self.slots.get(&slot).and_then(|s| s.certificate.as_ref())
    }

    pub fn key(&self, slot: Slot) -> Option<&(KeyConfig, SubjectPublicKeyInfoOwned)> {
        self.slots.get(&slot).and_then(|s| s.key.as_ref())
    }

    fn record(&mut self, op: FakeOp) -> Result<(), DeviceError> {
        self.journal.push(op);
        if self.fail_on == Some(op) {
            self.fail_on = None;
            return Err(DeviceError::Rejected {
                reason: format!("injected failure on {:?}", op),
            });
        }
        Ok(())
    }

    fn check_mgmt_key(&self, mgmt_key: &ManagementKey) -> Result<(), DeviceError> {
        if *mgmt_key == self.mgmt_key {
            Ok(())
        } else {
            Err(DeviceError::AuthenticationFailed {
                reason: "management key refused".to_string(),
            })
        }
    }
}

fn random_spki() -> SubjectPublicKeyInfoOwned {
    let key = certificate::issuer_key().unwrap();
    let der = key.verifying_key().to_public_key_der().unwrap();
    SubjectPublicKeyInfoOwned::from_der(der.as_bytes()).unwrap()
}

fn check_secret(given: &Pin, expected: &Pin) -> Result<(), DeviceError> {
    if given == expected {
        Ok(())
    } else {
        Err(DeviceError::AuthenticationFailed {
            reason: "wrong PIN/PUK".to_string(),
        })
    }
}

impl ManagementKeyVerifier for FakeYubiKey {
    fn authenticate(&mut self, mgmt_key: &ManagementKey) -> Result<(), DeviceError> {
        self.record(FakeOp::Authenticate)?;
        self.check_mgmt_key(mgmt_key)
    }
}

impl ManagementKeyManager for FakeYubiKey {
    fn set_management_key(
        &mut self,
        current: &ManagementKey,
        new: &ManagementKey,
    ) -> Result<(), DeviceError> {
        self.record(FakeOp::SetManagementKey)?;
        self.check_mgmt_key(current)?;
        self.mgmt_key = new.clone();
        Ok(())
    }

    fn store_management_key(&mut self, mgmt_key: &ManagementKey) -> Result<(), DeviceError> {
        self.record(FakeOp::StoreManagementKey)?;
        self.check_mgmt_key(mgmt_key)?;
        self.stored_mgmt_key = Some(mgmt_key.clone());
        Ok(())
    }
}

impl PinManager for FakeYubiKey {
    fn change_pin(&mut self, current: &Pin, new: &Pin) -> Result<(), DeviceError> {
        self.record(FakeOp::ChangePin)?;
        check_secret(current, &self.pin)?;
        self.pin = new.clone();
        Ok(())
    }

    fn change_puk(&mut self, current: &Pin, new: &Pin) -> Result<(), DeviceError> {
        self.record(FakeOp::ChangePuk)?;
        check_secret(current, &self.puk)?;
        self.puk = new.clone();
        Ok(())
    }
}

impl DeviceReset for FakeYubiKey {
    fn reset(&mut self) -> Result<(), DeviceError> {
        self.record(FakeOp::Reset)?;
        let slots = std::mem::take(&mut self.slots);
        let journal = std::mem::take(&mut self.journal);
        let broken_reset = self.broken_reset;
        *self = Self {
            serial: self.serial,
            journal,
            fail_on: self.fail_on,
            broken_reset,
            ..Self::new()
        };
        if broken_reset {
            self.slots = slots;
        }
        Ok(())
    }
}

impl KeyManager for FakeYubiKey {
    fn generate_key(
        &mut self,
        mgmt_key: &ManagementKey,
        config: &KeyConfig,
    ) -> Result<SubjectPublicKeyInfoOwned, DeviceError> {
        self.record(FakeOp::GenerateKey(config.slot))?;
        self.check_mgmt_key(mgmt_key)?;

        let spki = random_spki();
        // a new key invalidates the certificate next to it
        self.slots.insert(
            config.slot,
            FakeSlot {
                key: Some((config.clone(), spki.clone())),
                certificate: None,
            },
        );
        Ok(spki)
    }
}

impl CertificateStore for FakeYubiKey {
    fn has_certificate(&mut self, slot: Slot) -> Result<bool, DeviceError> {
        self.record(FakeOp::ReadCertificate(slot))?;
        Ok(self.certificate(slot).is_some())
    }

    fn write_certificate(
        &mut self,
        mgmt_key: &ManagementKey,
        slot: Slot,
        certificate: &Certificate,
    ) -> Result<(), DeviceError> {
        self.record(FakeOp::WriteCertificate(slot))?;
        self.check_mgmt_key(mgmt_key)?;
        self.slots
            .entry(slot)
            .or_insert(FakeSlot {
                key: None,
                certificate: None,
            })
            .certificate = Some(certificate.clone());
        Ok(())
    }
}

/// Finder over a fixed set of fake tokens
///
/// `open` hands out a copy; `opens` counts how often it was called.
#[derive(Debug, Default)]
pub struct FakeDeviceFinder {
    pub devices: Vec<(String, FakeYubiKey)>,
    pub opens: Cell<usize>,
}

impl FakeDeviceFinder {
    pub fn with_device(name: &str, device: FakeYubiKey) -> Self {
        Self {
            devices: vec![(name.to_string(), device)],
            opens: Cell::new(0),
        }
    }
}

impl DeviceFinder for FakeDeviceFinder {
    type Device = FakeYubiKey;

    fn list(&self) -> Result<Vec<DeviceInfo>, DeviceError> {
        Ok(self
            .devices
            .iter()
            .map(|(name, device)| DeviceInfo {
                name: name.clone(),
                serial: device.serial,
            })
            .collect())
    }

    fn open(&self, card: Option<&str>) -> Result<Self::Device, DeviceError> {
        self.opens.set(self.opens.get() + 1);
        let matching: Vec<&(String, FakeYubiKey)> = self
            .devices
            .iter()
            .filter(|(name, _)| card.map_or(true, |card| name.contains(card)))
            .collect();
        match (matching.as_slice(), card) {
            ([], Some(card)) => Err(DeviceError::NoMatchingCard {
                name: card.to_string(),
            }),
            ([], None) => Err(DeviceError::NotFound),
            ([(_, device)], _) | ([(_, device), ..], Some(_)) => Ok(device.clone()),
            (several, None) => Err(DeviceError::Ambiguous {
                readers: several.iter().map(|(name, _)| name.clone()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_tests_for;
    use crate::ports::contract_tests::provisioning_contract;

    contract_tests_for!(
        fake_yubikey_contract,
        make = FakeYubiKey::new,
        tests = {
            test_mgmt_key_authentication_success_default => provisioning_contract::test_mgmt_key_authentication_success_default,
            test_mgmt_key_authentication_failure => provisioning_contract::test_mgmt_key_authentication_failure,
            test_set_management_key_replaces_default => provisioning_contract::test_set_management_key_replaces_default,
            test_set_management_key_wrong_current => provisioning_contract::test_set_management_key_wrong_current,
            test_store_management_key => provisioning_contract::test_store_management_key,
            test_store_management_key_not_installed => provisioning_contract::test_store_management_key_not_installed,
            test_change_pin_and_puk_from_defaults => provisioning_contract::test_change_pin_and_puk_from_defaults,
            test_change_pin_wrong_current => provisioning_contract::test_change_pin_wrong_current,
            test_generate_key_not_authenticated => provisioning_contract::test_generate_key_not_authenticated,
            test_generate_key_success => provisioning_contract::test_generate_key_success,
            test_fresh_device_has_no_certificate => provisioning_contract::test_fresh_device_has_no_certificate,
            test_write_certificate => provisioning_contract::test_write_certificate,
            test_reset_restores_factory_state => provisioning_contract::test_reset_restores_factory_state,
        }
    );

    #[test]
    fn test_injected_failure_fires_once() {
        let mut device = FakeYubiKey::new().failing_on(FakeOp::ChangePin);
        let new_pin = Pin::new(b"654321".to_vec()).unwrap();

        assert!(matches!(
            device.change_pin(&Pin::default_pin(), &new_pin).unwrap_err(),
            DeviceError::Rejected { .. }
        ));
        assert!(device.change_pin(&Pin::default_pin(), &new_pin).is_ok());
        assert_eq!(device.journal, vec![FakeOp::ChangePin, FakeOp::ChangePin]);
    }

    #[test]
    fn test_provisioned_has_primary_certificate() {
        let secret = Pin::new(b"654321".to_vec()).unwrap();
        let mut device = FakeYubiKey::provisioned(&secret);
        assert!(device.has_certificate(Slot::Authentication).unwrap());
        assert!(device
            .authenticate(&ManagementKey::factory_default())
            .is_err());
        assert!(device.mutations().is_empty());
    }

    #[test]
    fn test_broken_reset_keeps_certificate() {
        let secret = Pin::new(b"654321".to_vec()).unwrap();
        let mut device = FakeYubiKey::provisioned(&secret);
        device.broken_reset = true;

        device.reset().unwrap();
        assert!(device.has_certificate(Slot::Authentication).unwrap());
    }

    #[test]
    fn test_finder_selection() {
        let finder = FakeDeviceFinder {
            devices: vec![
                ("Yubico YubiKey A".to_string(), FakeYubiKey::new()),
                ("Yubico YubiKey B".to_string(), FakeYubiKey::new()),
            ],
            opens: Cell::new(0),
        };

        assert!(matches!(
            finder.open(None).unwrap_err(),
            DeviceError::Ambiguous { .. }
        ));
        assert!(finder.open(Some("Key B")).is_ok());
        assert!(matches!(
            finder.open(Some("Nitrokey")).unwrap_err(),
            DeviceError::NoMatchingCard { .. }
        ));
        assert_eq!(finder.opens.get(), 3);
        assert_eq!(finder.list().unwrap().len(), 2);
    }

    #[test]
    fn test_finder_empty() {
        let finder = FakeDeviceFinder::default();
        assert!(matches!(
            finder.open(None).unwrap_err(),
            DeviceError::NotFound
        ));
    }
}
