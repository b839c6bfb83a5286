//! Secret rotation use case
//!
//! Replaces the factory management key, PIN and PUK. Every step returns a
//! proof value that the next step consumes, so the steps can only run in
//! order:
//!
//! ```text
//! install_management_key -> persist_management_key -> rotate_pin -> rotate_puk
//! ```
//!
//! The proofs cannot be built outside this module.

use tracing::info;

use crate::error::{CryptoError, CryptoResultExt, DeviceResultExt, Step, YksshResult};
use crate::model::{ManagementKey, Pin, SecuritySecret};
use crate::ports::{ManagementKeyManager, PinManager};

/// The random management key is active on the device
#[derive(Debug)]
pub struct ManagementKeyInstalled {
    mgmt_key: ManagementKey,
}

/// The active management key is also kept in protected metadata
#[derive(Debug)]
pub struct ManagementKeyPersisted {
    mgmt_key: ManagementKey,
}

/// PIN set to the operator secret
#[derive(Debug)]
pub struct PinRotated {
    mgmt_key: ManagementKey,
}

/// Management key, PIN and PUK all replaced
///
/// The only way to obtain the management key for slot configuration.
#[derive(Debug)]
pub struct RotatedSecrets {
    mgmt_key: ManagementKey,
}

impl RotatedSecrets {
    pub fn mgmt_key(&self) -> &ManagementKey {
        &self.mgmt_key
    }
}

/// Draw a new management key and install it in place of the factory one
pub fn install_management_key<D: ManagementKeyManager>(
    device: &mut D,
) -> YksshResult<ManagementKeyInstalled> {
    let mgmt_key = ManagementKey::generate()
        .map_err(CryptoError::from)
        .during(Step::GenerateManagementKey)?;
    device
        .set_management_key(&ManagementKey::factory_default(), &mgmt_key)
        .during(Step::SetManagementKey)?;
    Ok(ManagementKeyInstalled { mgmt_key })
}

/// Keep the installed key in the token's protected metadata
pub fn persist_management_key<D: ManagementKeyManager>(
    device: &mut D,
    installed: ManagementKeyInstalled,
) -> YksshResult<ManagementKeyPersisted> {
    device
        .store_management_key(&installed.mgmt_key)
        .during(Step::StoreManagementKey)?;
    info!("Management key rotated");
    Ok(ManagementKeyPersisted {
        mgmt_key: installed.mgmt_key,
    })
}

/// Change the default PIN to `secret`
pub fn rotate_pin<D: PinManager>(
    device: &mut D,
    persisted: ManagementKeyPersisted,
    secret: &SecuritySecret,
) -> YksshResult<PinRotated> {
    device
        .change_pin(&Pin::default_pin(), &Pin::from(secret))
        .during(Step::SetPin)?;
    Ok(PinRotated {
        mgmt_key: persisted.mgmt_key,
    })
}

/// Change the default PUK to `secret`
pub fn rotate_puk<D: PinManager>(
    device: &mut D,
    pin_rotated: PinRotated,
    secret: &SecuritySecret,
) -> YksshResult<RotatedSecrets> {
    device
        .change_puk(&Pin::default_puk(), &Pin::from(secret))
        .during(Step::SetPuk)?;
    info!("PIN and PUK rotated");
    Ok(RotatedSecrets {
        mgmt_key: pin_rotated.mgmt_key,
    })
}

/// Run all four steps in order
pub fn rotate_secrets<D>(device: &mut D, secret: &SecuritySecret) -> YksshResult<RotatedSecrets>
where
    D: ManagementKeyManager + PinManager,
{
    let installed = install_management_key(device)?;
    let persisted = persist_management_key(device, installed)?;
    let pin_rotated = rotate_pin(device, persisted, secret)?;
    rotate_puk(device, pin_rotated, secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fake_yubikey::{FakeOp, FakeYubiKey};

    fn secret() -> SecuritySecret {
        SecuritySecret::try_from(31_415_926).unwrap()
    }

    #[test]
    fn test_rotation_order_and_result() {
        let mut device = FakeYubiKey::new();
        let rotated = rotate_secrets(&mut device, &secret()).unwrap();

        assert_eq!(
            device.mutations(),
            vec![
                FakeOp::SetManagementKey,
                FakeOp::StoreManagementKey,
                FakeOp::ChangePin,
                FakeOp::ChangePuk,
            ]
        );
        assert!(!rotated.mgmt_key().is_factory_default());
        assert_eq!(&device.mgmt_key, rotated.mgmt_key());
        assert_eq!(device.stored_mgmt_key.as_ref(), Some(rotated.mgmt_key()));
        assert_eq!(device.pin.as_bytes(), b"31415926");
        assert_eq!(device.puk.as_bytes(), b"31415926");
    }

    #[test]
    fn test_each_run_draws_new_key() {
        let mut first = FakeYubiKey::new();
        let mut second = FakeYubiKey::new();
        let a = rotate_secrets(&mut first, &secret()).unwrap();
        let b = rotate_secrets(&mut second, &secret()).unwrap();
        assert_ne!(a.mgmt_key(), b.mgmt_key());
    }

    #[test]
    fn test_set_management_key_refused() {
        let mut device = FakeYubiKey::new();
        device.mgmt_key = ManagementKey::new([9u8; 24]);

        let err = rotate_secrets(&mut device, &secret()).unwrap_err();
        assert_eq!(err.step(), Some(Step::SetManagementKey));
        assert_eq!(device.mutations(), vec![FakeOp::SetManagementKey]);
    }

    #[test]
    fn test_store_failure_stops_before_pin() {
        let mut device = FakeYubiKey::new().failing_on(FakeOp::StoreManagementKey);

        let err = rotate_secrets(&mut device, &secret()).unwrap_err();
        assert_eq!(err.step(), Some(Step::StoreManagementKey));
        assert!(!device.journal.contains(&FakeOp::ChangePin));
        assert_eq!(device.pin, Pin::default_pin());
    }

    #[test]
    fn test_puk_failure_keeps_new_pin() {
        let mut device = FakeYubiKey::new().failing_on(FakeOp::ChangePuk);

        let err = rotate_secrets(&mut device, &secret()).unwrap_err();
        assert_eq!(err.step(), Some(Step::SetPuk));
        assert_eq!(device.pin.as_bytes(), b"31415926");
        assert_eq!(device.puk, Pin::default_puk());
    }

    #[test]
    fn test_pin_not_default() {
        let mut device = FakeYubiKey::new();
        device.pin = Pin::new(b"111111".to_vec()).unwrap();

        let err = rotate_secrets(&mut device, &secret()).unwrap_err();
        assert_eq!(err.step(), Some(Step::SetPin));
    }
}
