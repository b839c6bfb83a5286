//! CertificateStore trait - capability to read and write slot certificates

use x509_cert::Certificate;

use crate::error::DeviceError;
use crate::model::{ManagementKey, Slot};

pub trait CertificateStore {
    /// Whether `slot` holds a certificate
    ///
    /// A slot without certificate is `Ok(false)`, not an error.
    fn has_certificate(&mut self, slot: Slot) -> Result<bool, DeviceError>;

    /// Store `certificate` in `slot`, authorized by `mgmt_key`
    fn write_certificate(
        &mut self,
        mgmt_key: &ManagementKey,
        slot: Slot,
        certificate: &Certificate,
    ) -> Result<(), DeviceError>;
}
