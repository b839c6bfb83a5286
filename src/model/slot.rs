use std::fmt;

use thiserror::Error;

/// PIV key slot that can hold an SSH identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// 9a, the primary slot
    Authentication,
    /// 9c
    Signature,
    /// 9e
    CardAuthentication,
}

impl Slot {
    /// Slot whose certificate marks a device as provisioned
    pub fn primary() -> Self {
        Self::Authentication
    }

    /// Two-digit hex identifier used by PIV tooling
    pub fn id(self) -> u8 {
        match self {
            Slot::Authentication => 0x9a,
            Slot::Signature => 0x9c,
            Slot::CardAuthentication => 0x9e,
        }
    }

    pub fn to_yubikey_slot_id(self) -> yubikey::piv::SlotId {
        match self {
            Slot::Authentication => yubikey::piv::SlotId::Authentication,
            Slot::Signature => yubikey::piv::SlotId::Signature,
            Slot::CardAuthentication => yubikey::piv::SlotId::CardAuthentication,
        }
    }

    pub fn from_yubikey_slot_id(slot: yubikey::piv::SlotId) -> Result<Self, SlotError> {
        match slot {
            yubikey::piv::SlotId::Authentication => Ok(Slot::Authentication),
            yubikey::piv::SlotId::Signature => Ok(Slot::Signature),
            yubikey::piv::SlotId::CardAuthentication => Ok(Slot::CardAuthentication),
            _ => Err(SlotError::Unsupported {
                slot: format!("{:?}", slot),
            }),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x} ({:?})", self.id(), self)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Slot not supported: {slot}")]
    Unsupported { slot: String },
}
