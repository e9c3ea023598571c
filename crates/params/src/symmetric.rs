//! Constants for symmetric block ciphers

use streamcheck_api::KeyType;

/// Largest plaintext or ciphertext a single request may carry
pub const MAX_REQUEST_SIZE: usize = 4096;

/// DES key size in bytes (parity bits included)
pub const DES_KEY_SIZE: usize = 8;

/// Three-key triple DES key size in bytes
pub const DES3_KEY_SIZE: usize = 24;

/// DES and triple DES block size in bytes
pub const DES_BLOCK_SIZE: usize = 8;

/// AES-128 key size in bytes
pub const AES128_KEY_SIZE: usize = 16;

/// AES-192 key size in bytes
pub const AES192_KEY_SIZE: usize = 24;

/// AES-256 key size in bytes
pub const AES256_KEY_SIZE: usize = 32;

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

/// Largest block size of any supported cipher
pub const MAX_BLOCK_SIZE: usize = AES_BLOCK_SIZE;

/// Block size of the cipher behind a key type
pub const fn block_size(key_type: KeyType) -> usize {
    match key_type {
        KeyType::Des | KeyType::Des3 => DES_BLOCK_SIZE,
        KeyType::Aes => AES_BLOCK_SIZE,
    }
}

/// Key lengths accepted for a key type
pub fn key_sizes(key_type: KeyType) -> &'static [usize] {
    match key_type {
        KeyType::Des => &[DES_KEY_SIZE],
        KeyType::Des3 => &[DES3_KEY_SIZE],
        KeyType::Aes => &[AES128_KEY_SIZE, AES192_KEY_SIZE, AES256_KEY_SIZE],
    }
}

/// Length of keys produced by key generation for a key type
pub const fn generated_key_size(key_type: KeyType) -> usize {
    match key_type {
        KeyType::Des => DES_KEY_SIZE,
        KeyType::Des3 => DES3_KEY_SIZE,
        KeyType::Aes => AES256_KEY_SIZE,
    }
}
