/// Provisioning state inferred from the primary slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// No certificate in the primary slot
    Unprovisioned,
    /// The primary slot already holds a certificate
    Provisioned,
}

impl DeviceState {
    pub fn from_primary_certificate(present: bool) -> Self {
        if present {
            Self::Provisioned
        } else {
            Self::Unprovisioned
        }
    }
}
