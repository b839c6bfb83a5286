//! Entry points wiring the PC/SC adapter and the terminal prompt into the
//! use cases

use crate::adapters::{PivDeviceFinder, TerminalPrompt};
use crate::error::{DeviceResultExt, Step, YksshResult};
use crate::ports::{DeviceFinder, DeviceInfo};
use crate::use_cases::provision;

pub use crate::model::*;
pub use crate::use_cases::{SecretSource, SetupRequest};

/// Set up the selected token, calling `on_identity` for each configured slot
///
/// Returns the number of configured slots.
pub fn setup<E>(request: &SetupRequest, on_identity: E) -> YksshResult<usize>
where
    E: FnMut(&ProvisionedIdentity),
{
    let finder = PivDeviceFinder;
    provision(&finder, request, &mut TerminalPrompt, on_identity)
}

/// Tokens currently connected
pub fn list_devices() -> YksshResult<Vec<DeviceInfo>> {
    PivDeviceFinder.list().during(Step::OpenDevice)
}
