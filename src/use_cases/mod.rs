//! Use cases (orchestration)
//!
//! This module contains use cases that orchestrate operations across multiple ports.
//! Use cases coordinate between adapters and logic to fulfill business requirements.

mod configure_slots;
mod guard_device;
mod provision;
mod rotate_secrets;
mod validate_secret;

pub use configure_slots::{configure_slot, configure_slots};
pub use guard_device::{guard, inspect};
pub use provision::{provision, provision_device, SecretSource, SetupRequest};
pub use rotate_secrets::{
    install_management_key, persist_management_key, rotate_pin, rotate_puk, rotate_secrets,
    ManagementKeyInstalled, ManagementKeyPersisted, PinRotated, RotatedSecrets,
};
pub use validate_secret::{secret_from_flag, secret_from_prompt, ENTER_PROMPT, REPEAT_PROMPT};
