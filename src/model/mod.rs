mod algorithm;
mod device_state;
mod identity;
mod mgmt_key;
mod pin;
mod policy;
mod policy_table;
mod slot;

pub use algorithm::Algorithm;
pub use device_state::DeviceState;
pub use identity::{ProvisionedIdentity, KEY_ICON};
pub use mgmt_key::{ManagementKey, ManagementKeyError};
pub use pin::{Pin, SecuritySecret, ValidationError};
pub use policy::{PinPolicy, PolicyError, TouchPolicy};
pub use policy_table::{ConfigMode, PolicyTable, SlotSpec};
pub use slot::{Slot, SlotError};
