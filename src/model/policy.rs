use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinPolicy {
    Never,
    Once,
    Always,
}

impl PinPolicy {
    /// PIN entered once per session unlocks every SSH signature
    pub fn recommended_ssh() -> Self {
        Self::Once
    }

    pub fn to_yubikey_pin_policy(self) -> yubikey::PinPolicy {
        match self {
            PinPolicy::Never => yubikey::PinPolicy::Never,
            PinPolicy::Once => yubikey::PinPolicy::Once,
            PinPolicy::Always => yubikey::PinPolicy::Always,
        }
    }

    pub fn from_yubikey_pin_policy(policy: yubikey::PinPolicy) -> Result<Self, PolicyError> {
        match policy {
            yubikey::PinPolicy::Never => Ok(PinPolicy::Never),
            yubikey::PinPolicy::Once => Ok(PinPolicy::Once),
            yubikey::PinPolicy::Always => Ok(PinPolicy::Always),
            _ => Err(PolicyError::UnsupportedPinPolicy {
                policy: format!("{:?}", policy),
            }),
        }
    }
}

/// Whether the operator must touch the device for each private key operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPolicy {
    Never,
    Always,
    /// Touch is cached for a few seconds after the first confirmation
    Cached,
}

impl TouchPolicy {
    /// Human-readable label printed next to each generated key
    pub fn label(self) -> &'static str {
        match self {
            TouchPolicy::Never => "never",
            TouchPolicy::Always => "always",
            TouchPolicy::Cached => "cached",
        }
    }

    pub fn to_yubikey_touch_policy(self) -> yubikey::TouchPolicy {
        match self {
            TouchPolicy::Never => yubikey::TouchPolicy::Never,
            TouchPolicy::Always => yubikey::TouchPolicy::Always,
            TouchPolicy::Cached => yubikey::TouchPolicy::Cached,
        }
    }

    pub fn from_yubikey_touch_policy(policy: yubikey::TouchPolicy) -> Result<Self, PolicyError> {
        match policy {
            yubikey::TouchPolicy::Never => Ok(TouchPolicy::Never),
            yubikey::TouchPolicy::Always => Ok(TouchPolicy::Always),
            yubikey::TouchPolicy::Cached => Ok(TouchPolicy::Cached),
            _ => Err(PolicyError::UnsupportedTouchPolicy {
                policy: format!("{:?}", policy),
            }),
        }
    }
}

impl fmt::Display for TouchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("PIN policy not supported: {policy}")]
    UnsupportedPinPolicy { policy: String },

    #[error("Touch policy not supported: {policy}")]
    UnsupportedTouchPolicy { policy: String },
}
