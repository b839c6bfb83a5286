//! Masked terminal input for the operator secret

use zeroize::Zeroizing;

use crate::model::ValidationError;
use crate::ports::SecretPrompt;

/// Reads secrets from the controlling terminal without echo
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn read_secret(&mut self, prompt: &str) -> Result<Zeroizing<String>, ValidationError> {
        rpassword::prompt_password(prompt)
            .map(Zeroizing::new)
            .map_err(|e| ValidationError::Unreadable {
                reason: e.to_string(),
            })
    }
}
