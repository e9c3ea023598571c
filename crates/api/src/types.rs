//! Core types shared between the harness and session implementations
//!
//! Handles and identifiers are plain newtypes so they cannot be mixed up;
//! raw key values live in [`SecretVec`], which is zeroed when dropped.

use core::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which way a cipher operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    /// The other direction
    pub fn inverse(self) -> Self {
        match self {
            Self::Encrypt => Self::Decrypt,
            Self::Decrypt => Self::Encrypt,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Encrypt => "Encryption",
            Self::Decrypt => "Decryption",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric mechanism identifier (a `CKM_*` value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MechanismId(u64);

impl MechanismId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MechanismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// A mechanism plus its parameter block (the IV for chaining modes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mechanism {
    pub id: MechanismId,
    pub parameter: Vec<u8>,
}

impl Mechanism {
    /// Mechanism without a parameter
    pub fn new(id: MechanismId) -> Self {
        Self {
            id,
            parameter: Vec::new(),
        }
    }

    /// Mechanism carrying an IV
    pub fn with_iv(id: MechanismId, iv: &[u8]) -> Self {
        Self {
            id,
            parameter: iv.to_vec(),
        }
    }
}

/// Opaque reference to a key object held by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyHandle(u64);

impl KeyHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Secret key families the harness knows how to exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum KeyType {
    Des,
    Des3,
    Aes,
}

impl KeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Des => "DES",
            Self::Des3 => "DES3",
            Self::Aes => "AES",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object class of an unwrapped key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    SecretKey,
    /// Anything a session cannot turn into a cipher key
    Other(u64),
}

/// Attributes requested for a key recovered by `unwrap_key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTemplate {
    pub class: ObjectClass,
    pub key_type: KeyType,
}

impl KeyTemplate {
    /// `{CKA_CLASS: CKO_SECRET_KEY, CKA_KEY_TYPE: key_type}`
    pub fn secret(key_type: KeyType) -> Self {
        Self {
            class: ObjectClass::SecretKey,
            key_type,
        }
    }
}

/// A variable-length byte vector that is securely zeroed when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretVec {
    data: Vec<u8>,
}

impl SecretVec {
    /// Create a new instance from an existing vector
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Create by copying from a slice
    pub fn from_slice(slice: &[u8]) -> Self {
        Self {
            data: slice.to_vec(),
        }
    }

    /// Create filled with zeros
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: vec![0u8; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for SecretVec {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl AsMut<[u8]> for SecretVec {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl From<Vec<u8>> for SecretVec {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl PartialEq for SecretVec {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len() && bool::from(self.data.ct_eq(&other.data))
    }
}

impl Eq for SecretVec {}

impl fmt::Debug for SecretVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretVec(len={}, [REDACTED])", self.data.len())
    }
}
