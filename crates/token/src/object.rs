//! Key object storage

use std::collections::BTreeMap;

use streamcheck_api::{Error, KeyHandle, KeyType, Result, SecretVec};

/// A secret key held by the token
#[derive(Debug, Clone)]
pub struct KeyObject {
    pub key_type: KeyType,
    pub value: SecretVec,
}

/// Handle-indexed key table
///
/// Handles are never reused within one token, so a stale handle from a
/// destroyed key can never alias a newer object.
#[derive(Debug, Default)]
pub struct ObjectTable {
    next: u64,
    keys: BTreeMap<KeyHandle, KeyObject>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key_type: KeyType, value: SecretVec) -> KeyHandle {
        self.next += 1;
        let handle = KeyHandle::new(self.next);
        self.keys.insert(handle, KeyObject { key_type, value });
        handle
    }

    pub fn get(&self, handle: KeyHandle) -> Result<&KeyObject> {
        self.keys.get(&handle).ok_or(Error::KeyHandleInvalid(handle))
    }

    pub fn remove(&mut self, handle: KeyHandle) -> Result<()> {
        self.keys
            .remove(&handle)
            .map(drop)
            .ok_or(Error::KeyHandleInvalid(handle))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
