use crate::error::DeviceError;
use crate::model::ManagementKey;

pub trait ManagementKeyVerifier {
    fn authenticate(&mut self, mgmt_key: &ManagementKey) -> Result<(), DeviceError>;
}

/// Capability to replace the management key and keep it on the device
pub trait ManagementKeyManager: ManagementKeyVerifier {
    /// Authenticate with `current` and install `new`
    ///
    /// After success, `current` no longer unlocks privileged operations.
    fn set_management_key(
        &mut self,
        current: &ManagementKey,
        new: &ManagementKey,
    ) -> Result<(), DeviceError>;

    /// Persist `mgmt_key` in the device's protected metadata
    ///
    /// Authorized by `mgmt_key` itself, so it must already be installed.
    fn store_management_key(&mut self, mgmt_key: &ManagementKey) -> Result<(), DeviceError>;
}
