use zeroize::Zeroizing;

use crate::model::ValidationError;

/// Capability to ask the operator for a secret without echoing it
pub trait SecretPrompt {
    fn read_secret(&mut self, prompt: &str) -> Result<Zeroizing<String>, ValidationError>;
}
