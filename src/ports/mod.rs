//! Ports (algebras/traits) for provisioning a YubiKey
//!
//! These traits define the capabilities the provisioning workflow needs from
//! a device. They represent ports in hexagonal architecture - the use cases
//! depend on these abstractions, not on the PIV adapter.
//!
//! Every method is a single device round trip. None of them retry.

mod certificate_store;
mod device_finder;
mod device_reset;
mod key_manager;
mod mgmt_key_verifier;
mod pin_manager;
mod secret_prompt;

pub use certificate_store::CertificateStore;
pub use device_finder::{DeviceFinder, DeviceInfo};
pub use device_reset::DeviceReset;
pub use key_manager::{KeyConfig, KeyManager};
pub use mgmt_key_verifier::{ManagementKeyManager, ManagementKeyVerifier};
pub use pin_manager::PinManager;
pub use secret_prompt::SecretPrompt;

/// Combined trait for all device capabilities used during provisioning
///
/// A device handle typically implements this.
pub trait ProvisioningDevice:
    CertificateStore + DeviceReset + ManagementKeyManager + PinManager + KeyManager
{
}

// Blanket implementation for types that implement all operation traits
impl<T> ProvisioningDevice for T where
    T: CertificateStore + DeviceReset + ManagementKeyManager + PinManager + KeyManager
{
}
