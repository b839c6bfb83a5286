use crate::error::DeviceError;
use crate::model::Pin;

/// Capability to rotate PIN and PUK
pub trait PinManager {
    fn change_pin(&mut self, current: &Pin, new: &Pin) -> Result<(), DeviceError>;

    fn change_puk(&mut self, current: &Pin, new: &Pin) -> Result<(), DeviceError>;
}
