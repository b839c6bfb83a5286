//! Which slots get an SSH identity, and under which touch policy

use super::{Slot, TouchPolicy};

/// A slot paired with the touch policy its key is generated under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotSpec {
    pub slot: Slot,
    pub touch_policy: TouchPolicy,
}

impl SlotSpec {
    pub const fn new(slot: Slot, touch_policy: TouchPolicy) -> Self {
        Self { slot, touch_policy }
    }
}

const ALL_TOUCH_POLICIES: [SlotSpec; 3] = [
    SlotSpec::new(Slot::Authentication, TouchPolicy::Cached),
    SlotSpec::new(Slot::Signature, TouchPolicy::Always),
    SlotSpec::new(Slot::CardAuthentication, TouchPolicy::Never),
];

/// Selects between the primary slot alone and one slot per touch policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigMode {
    SingleSlot,
    #[default]
    AllTouchPolicies,
}

/// Ordered, read-only list of slots to configure
///
/// Order matters: the first entry is the primary identity and is reported
/// first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    specs: Vec<SlotSpec>,
}

impl PolicyTable {
    /// Authentication/cached, signature/always, card authentication/never
    pub fn all_touch_policies() -> Self {
        Self {
            specs: ALL_TOUCH_POLICIES.to_vec(),
        }
    }

    /// Authentication/cached only
    pub fn single_slot() -> Self {
        Self {
            specs: ALL_TOUCH_POLICIES[..1].to_vec(),
        }
    }

    pub fn for_mode(mode: ConfigMode) -> Self {
        match mode {
            ConfigMode::SingleSlot => Self::single_slot(),
            ConfigMode::AllTouchPolicies => Self::all_touch_policies(),
        }
    }

    pub fn primary(&self) -> &SlotSpec {
        // both constructors yield at least one entry
        &self.specs[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<'a> IntoIterator for &'a PolicyTable {
    type Item = &'a SlotSpec;
    type IntoIter = std::slice::Iter<'a, SlotSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
