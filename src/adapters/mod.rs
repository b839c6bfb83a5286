//! Adapters - concrete implementations of ports (traits)

mod terminal_prompt;
mod yubikey_piv;

#[cfg(test)]
pub mod fake_yubikey;

// Re-export for convenience
pub use terminal_prompt::TerminalPrompt;
pub use yubikey_piv::PivDeviceFinder;
