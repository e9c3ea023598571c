//! The cipher session contract
//!
//! A `CipherSession` is an already opened, already authenticated session on
//! some cryptographic module. The harness never opens or logs into one; it
//! receives a session, drives it, and hands it back.
//!
//! Output-producing calls take the destination as a mutable slice whose
//! length is the capacity offered to the session. They return the number of
//! bytes written into the front of that slice.

use crate::error::Result;
use crate::types::{Direction, KeyHandle, KeyTemplate, KeyType, Mechanism, MechanismId};

/// Session-oriented symmetric cipher API under test
pub trait CipherSession {
    /// Whether the module offers `mechanism` at all
    fn is_mechanism_supported(&self, mechanism: MechanismId) -> bool;

    /// Whether the module can wrap and unwrap keys with `mechanism`
    fn is_wrap_supported(&self, mechanism: &Mechanism) -> bool;

    /// Import a raw secret key value
    ///
    /// Returns [`Error::PolicyViolation`](crate::Error::PolicyViolation) when
    /// the module refuses the import for policy reasons.
    fn create_secret_key(&mut self, key_type: KeyType, value: &[u8]) -> Result<KeyHandle>;

    /// Generate a fresh key with a key generation mechanism
    fn generate_key(&mut self, mechanism: MechanismId) -> Result<KeyHandle>;

    /// Start an encrypt or decrypt operation
    fn cipher_init(
        &mut self,
        direction: Direction,
        mechanism: &Mechanism,
        key: KeyHandle,
    ) -> Result<()>;

    /// Feed one fragment of a multipart operation
    ///
    /// `None` is a null fragment pointer with length zero. An implementation
    /// must accept it exactly like `Some(&[])`.
    fn cipher_update(&mut self, input: Option<&[u8]>, output: &mut [u8]) -> Result<usize>;

    /// Finish a multipart operation, flushing whatever is still buffered
    fn cipher_final(&mut self, output: &mut [u8]) -> Result<usize>;

    /// Single-part operation over the whole input
    fn cipher_one_shot(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Abandon the active cipher operation, if any
    ///
    /// Like `C_SessionCancel`, this succeeds when nothing is active, so a
    /// caller may use it unconditionally to leave the session ready for the
    /// next `cipher_init`.
    fn cipher_cancel(&mut self) -> Result<()>;

    /// Export `key` encrypted under `wrapping_key`
    fn wrap_key(
        &mut self,
        mechanism: &Mechanism,
        wrapping_key: KeyHandle,
        key: KeyHandle,
        output: &mut [u8],
    ) -> Result<usize>;

    /// Recover a usable key object from wrapped bytes
    fn unwrap_key(
        &mut self,
        mechanism: &Mechanism,
        unwrapping_key: KeyHandle,
        wrapped: &[u8],
        template: &KeyTemplate,
    ) -> Result<KeyHandle>;

    /// Destroy a key object
    fn destroy_key(&mut self, key: KeyHandle) -> Result<()>;
}

/// Sessions behind a mutable reference are sessions too, so wrappers can
/// borrow the session they decorate.
impl<S: CipherSession + ?Sized> CipherSession for &mut S {
    fn is_mechanism_supported(&self, mechanism: MechanismId) -> bool {
        (**self).is_mechanism_supported(mechanism)
    }

    fn is_wrap_supported(&self, mechanism: &Mechanism) -> bool {
        (**self).is_wrap_supported(mechanism)
    }

    fn create_secret_key(&mut self, key_type: KeyType, value: &[u8]) -> Result<KeyHandle> {
        (**self).create_secret_key(key_type, value)
    }

    fn generate_key(&mut self, mechanism: MechanismId) -> Result<KeyHandle> {
        (**self).generate_key(mechanism)
    }

    fn cipher_init(
        &mut self,
        direction: Direction,
        mechanism: &Mechanism,
        key: KeyHandle,
    ) -> Result<()> {
        (**self).cipher_init(direction, mechanism, key)
    }

    fn cipher_update(&mut self, input: Option<&[u8]>, output: &mut [u8]) -> Result<usize> {
        (**self).cipher_update(input, output)
    }

    fn cipher_final(&mut self, output: &mut [u8]) -> Result<usize> {
        (**self).cipher_final(output)
    }

    fn cipher_one_shot(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        (**self).cipher_one_shot(input, output)
    }

    fn cipher_cancel(&mut self) -> Result<()> {
        (**self).cipher_cancel()
    }

    fn wrap_key(
        &mut self,
        mechanism: &Mechanism,
        wrapping_key: KeyHandle,
        key: KeyHandle,
        output: &mut [u8],
    ) -> Result<usize> {
        (**self).wrap_key(mechanism, wrapping_key, key, output)
    }

    fn unwrap_key(
        &mut self,
        mechanism: &Mechanism,
        unwrapping_key: KeyHandle,
        wrapped: &[u8],
        template: &KeyTemplate,
    ) -> Result<KeyHandle> {
        (**self).unwrap_key(mechanism, unwrapping_key, wrapped, template)
    }

    fn destroy_key(&mut self, key: KeyHandle) -> Result<()> {
        (**self).destroy_key(key)
    }
}
