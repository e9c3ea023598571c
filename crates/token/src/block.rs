//! Raw block transforms
//!
//! The token never implements a cipher itself; it keys one of the RustCrypto
//! block ciphers and applies it one block at a time. Chaining, buffering and
//! padding all live in [`crate::stream`].

use aes::{Aes128, Aes192, Aes256};
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde3};

use streamcheck_api::{Error, KeyType, Result};
use streamcheck_params::symmetric::{
    block_size, key_sizes, AES128_KEY_SIZE, AES192_KEY_SIZE, AES256_KEY_SIZE,
};

/// A keyed block cipher
#[derive(Clone)]
pub enum BlockEngine {
    Des(Des),
    TdesEde3(TdesEde3),
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

fn key_size_error(key_type: KeyType, actual: usize) -> Error {
    Error::KeySizeRange {
        context: "block cipher key",
        expected: key_sizes(key_type).first().copied().unwrap_or_default(),
        actual,
    }
}

impl BlockEngine {
    /// Key a block cipher of `key_type` with `key`
    pub fn new(key_type: KeyType, key: &[u8]) -> Result<Self> {
        let invalid = |_| key_size_error(key_type, key.len());
        let engine = match key_type {
            KeyType::Des => Self::Des(Des::new_from_slice(key).map_err(invalid)?),
            KeyType::Des3 => Self::TdesEde3(TdesEde3::new_from_slice(key).map_err(invalid)?),
            KeyType::Aes => match key.len() {
                AES128_KEY_SIZE => Self::Aes128(Aes128::new_from_slice(key).map_err(invalid)?),
                AES192_KEY_SIZE => Self::Aes192(Aes192::new_from_slice(key).map_err(invalid)?),
                AES256_KEY_SIZE => Self::Aes256(Aes256::new_from_slice(key).map_err(invalid)?),
                other => return Err(key_size_error(key_type, other)),
            },
        };
        Ok(engine)
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Des(_) => KeyType::Des,
            Self::TdesEde3(_) => KeyType::Des3,
            Self::Aes128(_) | Self::Aes192(_) | Self::Aes256(_) => KeyType::Aes,
        }
    }

    pub fn block_size(&self) -> usize {
        block_size(self.key_type())
    }

    /// Encrypt exactly one block in place
    ///
    /// `block` must be `block_size()` bytes long.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), self.block_size());
        match self {
            Self::Des(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::TdesEde3(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes128(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes192(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes256(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
        }
    }

    /// Decrypt exactly one block in place
    pub fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), self.block_size());
        match self {
            Self::Des(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::TdesEde3(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes128(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes192(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            Self::Aes256(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
        }
    }
}
