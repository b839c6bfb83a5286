pub mod certificate;
mod ssh_encoding;

pub use certificate::build_wrapper_certificate;
pub use ssh_encoding::{SshEncodable, SshEncodingError};
