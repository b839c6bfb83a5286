use super::ProvisioningDevice;
use crate::error::DeviceError;

/// A token visible to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub serial: u32,
}

/// Capability to find and connect to YubiKey devices
pub trait DeviceFinder {
    type Device: ProvisioningDevice;

    /// All tokens currently connected
    fn list(&self) -> Result<Vec<DeviceInfo>, DeviceError>;

    /// Open the token named `card`, or the only connected token if `None`
    ///
    /// # Errors
    ///
    /// - `DeviceError::NotFound` if no token is connected
    /// - `DeviceError::NoMatchingCard` if `card` names no connected token
    /// - `DeviceError::Ambiguous` if `card` is `None` and several are connected
    fn open(&self, card: Option<&str>) -> Result<Self::Device, DeviceError>;
}
