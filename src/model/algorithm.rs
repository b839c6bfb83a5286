//! Algorithm type for on-device key generation

/// Key algorithm generated on the YubiKey
///
/// The result must encode as an `ecdsa-sha2-nistp256` SSH key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// ECDSA P-256
    EcdsaP256,
}

impl Algorithm {
    /// P-256 is supported by every PIV-capable YubiKey
    pub fn default_ssh() -> Self {
        Self::EcdsaP256
    }

    /// Convert to yubikey crate's AlgorithmId
    pub fn to_yubikey_algorithm_id(self) -> yubikey::piv::AlgorithmId {
        match self {
            Algorithm::EcdsaP256 => yubikey::piv::AlgorithmId::EccP256,
        }
    }
}
