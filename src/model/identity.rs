//! Result of configuring one slot

use std::fmt;

use x509_cert::Certificate;

use super::{Slot, TouchPolicy};

/// Icon printed in front of each generated key
pub const KEY_ICON: &str = "🔑";

/// An SSH identity living in a PIV slot
///
/// The private half never leaves the device. The certificate is the
/// self-signed wrapper stored next to it.
#[derive(Clone)]
pub struct ProvisionedIdentity {
    pub slot: Slot,
    pub touch_policy: TouchPolicy,
    pub serial: u128,
    pub certificate: Certificate,
    pub ssh_public_key: ssh_key::PublicKey,
    /// OpenSSH `authorized_keys` line for `ssh_public_key`
    pub authorized_key: String,
}

impl ProvisionedIdentity {
    /// Header line announcing the key, e.g. `🔑 Generated SSH key, touch policy: cached`
    pub fn banner(&self) -> String {
        format!(
            "{} Generated SSH key, touch policy: {}",
            KEY_ICON,
            self.touch_policy.label()
        )
    }
}

impl fmt::Debug for ProvisionedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionedIdentity")
            .field("slot", &self.slot)
            .field("touch_policy", &self.touch_policy)
            .field("serial", &format_args!("{:032x}", self.serial))
            .field("ssh_public_key", &self.ssh_public_key.fingerprint(Default::default()))
            .finish()
    }
}

impl fmt::Display for ProvisionedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.banner())?;
        write!(f, "{}", self.authorized_key)
    }
}
