//! Token policy
//!
//! Policies describe deliberate restrictions of a module, such as FIPS-mode
//! tokens refusing raw single-DES key import. The harness treats the
//! resulting `PolicyViolation` as environment variance rather than a defect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use streamcheck_api::{KeyType, MechanismId};
use streamcheck_params::mechanism;

/// Restrictions applied by a [`SoftToken`](crate::SoftToken)
///
/// The default policy enables every known mechanism and denies nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenPolicy {
    /// Mechanisms (by `CKM_*` name) the token pretends not to implement
    pub disabled_mechanisms: BTreeSet<String>,
    /// Cipher mechanisms that may not be used for wrap or unwrap
    pub no_wrap: BTreeSet<String>,
    /// Key types whose raw value may not be imported
    pub deny_import: BTreeSet<KeyType>,
}

impl TokenPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disabled_mechanism(mut self, name: impl Into<String>) -> Self {
        self.disabled_mechanisms.insert(name.into());
        self
    }

    pub fn with_no_wrap(mut self, name: impl Into<String>) -> Self {
        self.no_wrap.insert(name.into());
        self
    }

    pub fn with_denied_import(mut self, key_type: KeyType) -> Self {
        self.deny_import.insert(key_type);
        self
    }

    /// Whether the token offers `id`
    pub fn allows_mechanism(&self, id: MechanismId) -> bool {
        mechanism::lookup(id).is_some_and(|m| !self.disabled_mechanisms.contains(m.name))
    }

    /// Whether `id` may wrap and unwrap keys
    pub fn allows_wrap(&self, id: MechanismId) -> bool {
        self.allows_mechanism(id)
            && mechanism::lookup(id).is_some_and(|m| m.is_cipher() && !self.no_wrap.contains(m.name))
    }

    pub fn allows_import(&self, key_type: KeyType) -> bool {
        !self.deny_import.contains(&key_type)
    }

    /// The first mechanism name that does not exist, if any
    pub fn unknown_mechanism(&self) -> Option<&str> {
        self.disabled_mechanisms
            .iter()
            .chain(self.no_wrap.iter())
            .map(String::as_str)
            .find(|name| mechanism::by_name(name).is_none())
    }
}
