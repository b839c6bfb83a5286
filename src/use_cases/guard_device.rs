//! Device guard use case
//!
//! Decides whether a token may be provisioned, resetting it when the
//! operator asked for that.

use tracing::{info, warn};

use crate::error::{DeviceError, DeviceResultExt, Step, YksshError, YksshResult};
use crate::model::{DeviceState, Slot};
use crate::ports::{CertificateStore, DeviceReset};

/// Read the provisioning state from the primary slot
pub fn inspect<D: CertificateStore>(device: &mut D) -> YksshResult<DeviceState> {
    let present = device
        .has_certificate(Slot::primary())
        .during(Step::ReadCertificate)?;
    Ok(DeviceState::from_primary_certificate(present))
}

/// Let an unprovisioned token through, refuse or reset a provisioned one
///
/// With `overwrite` a provisioned token is reset to factory settings and
/// must then report an empty primary slot.
///
/// # Errors
///
/// - `YksshError::AlreadyProvisioned` if provisioned and `!overwrite`; the
///   device is left untouched
/// - `YksshError::Hardware` with `Step::Reset` if the reset fails or leaves
///   the primary certificate in place
pub fn guard<D>(device: &mut D, overwrite: bool) -> YksshResult<()>
where
    D: CertificateStore + DeviceReset,
{
    match inspect(device)? {
        DeviceState::Unprovisioned => Ok(()),
        DeviceState::Provisioned if !overwrite => Err(YksshError::AlreadyProvisioned {
            slot: Slot::primary(),
        }),
        DeviceState::Provisioned => {
            warn!("Security key already set up, resetting it");
            device.reset().during(Step::Reset)?;

            if inspect(device)? == DeviceState::Provisioned {
                return Err(YksshError::Hardware {
                    step: Step::Reset,
                    source: DeviceError::ResetIncomplete {
                        slot: Slot::primary(),
                    },
                });
            }
            info!("Security key reset");
            Ok(())
        }
    }
}
