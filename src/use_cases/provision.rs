//! Provisioning use case
//!
//! Orchestrates a whole setup run:
//! 1. Validate the operator secret
//! 2. Open the device
//! 3. Guard against overwriting a provisioned device (or reset it)
//! 4. Rotate management key, PIN and PUK
//! 5. Configure every slot of the policy table
//!
//! Every device call is attempted once. The device handle lives in this
//! function and is dropped on every exit path.

use tracing::{debug, info};

use crate::error::{DeviceResultExt, Step, YksshResult};
use crate::model::{ConfigMode, PolicyTable, ProvisionedIdentity, SecuritySecret};
use crate::ports::{DeviceFinder, ProvisioningDevice, SecretPrompt};

use super::configure_slots::configure_slots;
use super::guard_device::guard;
use super::rotate_secrets::rotate_secrets;
use super::validate_secret::{secret_from_flag, secret_from_prompt};

/// Where the PIN/PUK comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Given on the command line
    Supplied(u64),
    /// Asked for on the terminal, with confirmation
    Interactive,
}

/// Everything a setup run needs from the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupRequest {
    /// Reader name to select, `None` for the only connected token
    pub card: Option<String>,
    /// Reset an already provisioned token
    pub overwrite: bool,
    pub secret: SecretSource,
    pub mode: ConfigMode,
}

impl Default for SetupRequest {
    fn default() -> Self {
        Self {
            card: None,
            overwrite: false,
            secret: SecretSource::Interactive,
            mode: ConfigMode::default(),
        }
    }
}

/// Full setup run, from secret validation to the last slot
///
/// Returns the number of configured slots.
///
/// # Errors
///
/// A validation failure is returned before `finder` is used. Any later
/// failure stops the run at that step.
pub fn provision<F, P, E>(
    finder: &F,
    request: &SetupRequest,
    prompt: &mut P,
    on_identity: E,
) -> YksshResult<usize>
where
    F: DeviceFinder,
    P: SecretPrompt,
    E: FnMut(&ProvisionedIdentity),
{
    let secret = match request.secret {
        SecretSource::Supplied(value) => secret_from_flag(value)?,
        SecretSource::Interactive => secret_from_prompt(prompt)?,
    };

    let mut device = finder
        .open(request.card.as_deref())
        .during(Step::OpenDevice)?;
    debug!("Security key opened");

    provision_device(&mut device, &secret, request, on_identity)
}

/// Setup run on an already opened device
pub fn provision_device<D, E>(
    device: &mut D,
    secret: &SecuritySecret,
    request: &SetupRequest,
    on_identity: E,
) -> YksshResult<usize>
where
    D: ProvisioningDevice,
    E: FnMut(&ProvisionedIdentity),
{
    let table = PolicyTable::for_mode(request.mode);

    guard(device, request.overwrite)?;
    let secrets = rotate_secrets(device, secret)?;
    let configured = configure_slots(device, &secrets, &table, on_identity)?;

    info!("Security key set up, {} slot(s) configured", configured);
    Ok(configured)
}
