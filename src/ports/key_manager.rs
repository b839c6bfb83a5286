//! KeyManager trait - capability to generate keys on the device

use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::DeviceError;
use crate::model::{Algorithm, ManagementKey, PinPolicy, Slot, SlotSpec, TouchPolicy};

/// Configuration for key generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConfig {
    /// Slot to store the key in
    pub slot: Slot,
    /// Algorithm to use
    pub algorithm: Algorithm,
    /// PIN policy for key usage
    pub pin_policy: PinPolicy,
    /// Touch policy for key usage
    pub touch_policy: TouchPolicy,
}

impl KeyConfig {
    /// SSH defaults for the slot and touch policy of `spec`
    pub fn for_spec(spec: &SlotSpec) -> Self {
        Self {
            slot: spec.slot,
            touch_policy: spec.touch_policy,
            ..Self::default()
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            slot: Slot::primary(),
            algorithm: Algorithm::default_ssh(),
            pin_policy: PinPolicy::recommended_ssh(),
            touch_policy: TouchPolicy::Cached,
        }
    }
}

/// Capability to generate keys on the device
///
/// The private key never leaves the device.
pub trait KeyManager {
    /// Generate a new keypair in `config.slot`, replacing any key there
    ///
    /// # Returns
    ///
    /// The public key of the generated keypair
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - `mgmt_key` is refused
    /// - The device does not support the algorithm or policy
    fn generate_key(
        &mut self,
        mgmt_key: &ManagementKey,
        config: &KeyConfig,
    ) -> Result<SubjectPublicKeyInfoOwned, DeviceError>;
}
