//! Slot configuration use case
//!
//! For every entry of the policy table: generate a key on the device, wrap
//! its public half in a self-signed certificate, store the certificate next
//! to the key and hand the resulting SSH identity to the caller.

use std::time::SystemTime;

use tracing::{debug, info};

use crate::error::{CryptoError, CryptoResultExt, DeviceResultExt, Step, YksshResult};
use crate::logic::{build_wrapper_certificate, certificate, SshEncodable, SshEncodingError};
use crate::model::{PolicyTable, ProvisionedIdentity, SlotSpec};
use crate::ports::{CertificateStore, KeyConfig, KeyManager};

use super::rotate_secrets::RotatedSecrets;

/// Configure a single slot
pub fn configure_slot<D>(
    device: &mut D,
    secrets: &RotatedSecrets,
    spec: &SlotSpec,
) -> YksshResult<ProvisionedIdentity>
where
    D: KeyManager + CertificateStore,
{
    let slot = spec.slot;
    let mgmt_key = secrets.mgmt_key();

    let public_key = device
        .generate_key(mgmt_key, &KeyConfig::for_spec(spec))
        .during(Step::GenerateKey(slot))?;

    // signs this one certificate, then dropped
    let issuer_key = certificate::issuer_key().during(Step::GenerateIssuerKey(slot))?;
    let serial = certificate::random_serial().during(Step::GenerateSerial(slot))?;

    let cert =
        build_wrapper_certificate(public_key.clone(), &issuer_key, serial, SystemTime::now())
            .during(Step::BuildCertificate(slot))?;

    device
        .write_certificate(mgmt_key, slot, &cert)
        .during(Step::StoreCertificate(slot))?;

    let (ssh_public_key, authorized_key) =
        encode_ssh(&public_key).during(Step::EncodeSshKey(slot))?;

    info!("Slot {} configured, touch policy {}", slot, spec.touch_policy);
    Ok(ProvisionedIdentity {
        slot,
        touch_policy: spec.touch_policy,
        serial,
        certificate: cert,
        ssh_public_key,
        authorized_key,
    })
}

/// SSH key and its `authorized_keys` line
fn encode_ssh<K: SshEncodable>(
    public_key: &K,
) -> Result<(ssh_key::PublicKey, String), CryptoError> {
    let invalid = |e: SshEncodingError| CryptoError::InvalidPublicKey {
        reason: e.to_string(),
    };
    let ssh_public_key = public_key.to_ssh_public_key().map_err(invalid)?;
    let authorized_key = ssh_public_key
        .to_openssh()
        .map_err(|e| invalid(e.into()))?;
    Ok((ssh_public_key, authorized_key))
}

/// Configure every slot of `table` in order
///
/// Each identity is passed to `on_identity` as soon as its slot is done.
/// The first failure stops the run; slots configured before it stay as they
/// are.
pub fn configure_slots<D, F>(
    device: &mut D,
    secrets: &RotatedSecrets,
    table: &PolicyTable,
    mut on_identity: F,
) -> YksshResult<usize>
where
    D: KeyManager + CertificateStore,
    F: FnMut(&ProvisionedIdentity),
{
    let mut configured = 0;
    for spec in table {
        debug!("Configuring slot {}", spec.slot);
        let identity = configure_slot(device, secrets, spec)?;
        on_identity(&identity);
        configured += 1;
    }
    Ok(configured)
}
