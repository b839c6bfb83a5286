use crate::error::DeviceError;

/// Capability to restore factory settings
pub trait DeviceReset {
    /// Clear every slot and restore the default management key, PIN and PUK
    ///
    /// Destroys all keys on the device.
    fn reset(&mut self) -> Result<(), DeviceError>;
}
