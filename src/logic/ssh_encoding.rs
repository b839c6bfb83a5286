use ssh_key::public::{EcdsaPublicKey, KeyData};
use thiserror::Error;
use x509_cert::spki::{ObjectIdentifier, SubjectPublicKeyInfoOwned};

/// `id-ecPublicKey`
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("SSH encoding error: {0}")]
pub struct SshEncodingError(String);

impl From<ssh_key::Error> for SshEncodingError {
    fn from(err: ssh_key::Error) -> Self {
        SshEncodingError(err.to_string())
    }
}

/// Public keys that have an OpenSSH representation
pub trait SshEncodable {
    fn to_ssh_public_key(&self) -> Result<ssh_key::PublicKey, SshEncodingError>;

    /// Single `authorized_keys` line, without comment
    fn to_authorized_key(&self) -> Result<String, SshEncodingError> {
        Ok(self.to_ssh_public_key()?.to_openssh()?)
    }
}

impl SshEncodable for SubjectPublicKeyInfoOwned {
    fn to_ssh_public_key(&self) -> Result<ssh_key::PublicKey, SshEncodingError> {
        if self.algorithm.oid != EC_PUBLIC_KEY_OID {
            return Err(SshEncodingError(format!(
                "unsupported key algorithm {}",
                self.algorithm.oid
            )));
        }

        // SEC1 point; the curve follows from its length
        let point = self.subject_public_key.raw_bytes();
        let key = EcdsaPublicKey::from_sec1_bytes(point)?;
        Ok(ssh_key::PublicKey::new(KeyData::Ecdsa(key), ""))
    }
}
