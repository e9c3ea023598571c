//! In-process cipher session

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use streamcheck_api::{
    CipherSession, Direction, Error, KeyHandle, KeyTemplate, KeyType, Mechanism, MechanismId,
    ObjectClass, Result, ResultExt, SecretVec,
};
use streamcheck_params::mechanism::{self, CipherMode, MechanismInfo};
use streamcheck_params::symmetric::{generated_key_size, key_sizes};

use crate::block::BlockEngine;
use crate::object::ObjectTable;
use crate::policy::TokenPolicy;
use crate::stream::CipherStream;

struct ActiveOperation {
    mechanism: MechanismId,
    stream: CipherStream,
    /// Set once `cipher_update` has been called
    multipart: bool,
}

/// A software token implementing [`CipherSession`]
///
/// Holds keys in memory and runs DES, triple DES and AES in ECB, CBC and
/// CBC-PAD modes. Only one cipher operation may be active at a time, as on
/// a PKCS#11 session.
pub struct SoftToken {
    objects: ObjectTable,
    policy: TokenPolicy,
    rng: ChaCha20Rng,
    active: Option<ActiveOperation>,
}

impl Default for SoftToken {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftToken {
    /// Token with the default policy and an OS-seeded key generator
    pub fn new() -> Self {
        Self {
            objects: ObjectTable::new(),
            policy: TokenPolicy::default(),
            rng: ChaCha20Rng::from_entropy(),
            active: None,
        }
    }

    /// Make key generation reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
        self
    }

    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Number of live key objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether a cipher operation is in progress
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn cipher_mechanism(&self, id: MechanismId) -> Result<&'static MechanismInfo> {
        mechanism::lookup(id)
            .filter(|m| m.is_cipher() && self.policy.allows_mechanism(id))
            .ok_or(Error::MechanismInvalid(id))
    }

    /// Key a fresh stream for `mechanism` with the key behind `key`
    fn open_stream(&self, direction: Direction, mechanism: &Mechanism, key: KeyHandle) -> Result<CipherStream> {
        let info = self.cipher_mechanism(mechanism.id)?;
        let object = self.objects.get(key)?;
        if object.key_type != info.key_type {
            return Err(Error::KeyTypeInconsistent(key));
        }
        let engine = BlockEngine::new(object.key_type, object.value.as_slice())?;
        CipherStream::new(engine, direction, info.mode, &mechanism.parameter)
    }

    /// Run `f` on the active stream, ending the operation on any failure
    /// other than a short buffer
    fn with_active<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut ActiveOperation) -> Result<T>,
    ) -> Result<T> {
        let active = self
            .active
            .as_mut()
            .ok_or(Error::OperationNotInitialized(operation))?;
        let result = f(active);
        if let Err(err) = &result {
            if !matches!(err, Error::BufferTooSmall { .. }) {
                debug!(error = %err, operation, "cipher operation aborted");
                self.active = None;
            }
        }
        result
    }
}

impl CipherSession for SoftToken {
    fn is_mechanism_supported(&self, mechanism: MechanismId) -> bool {
        self.policy.allows_mechanism(mechanism)
    }

    fn is_wrap_supported(&self, mechanism: &Mechanism) -> bool {
        self.policy.allows_wrap(mechanism.id)
    }

    fn create_secret_key(&mut self, key_type: KeyType, value: &[u8]) -> Result<KeyHandle> {
        if !self.policy.allows_import(key_type) {
            return Err(Error::PolicyViolation(format!("raw {key_type} key import is disabled")));
        }
        let sizes = key_sizes(key_type);
        if !sizes.contains(&value.len()) {
            return Err(Error::KeySizeRange {
                context: "create_secret_key",
                expected: sizes[0],
                actual: value.len(),
            });
        }
        let handle = self.objects.insert(key_type, SecretVec::from_slice(value));
        debug!(%handle, %key_type, len = value.len(), "imported secret key");
        Ok(handle)
    }

    fn generate_key(&mut self, mechanism: MechanismId) -> Result<KeyHandle> {
        let info = mechanism::lookup(mechanism)
            .filter(|m| m.mode == CipherMode::KeyGen && self.policy.allows_mechanism(mechanism))
            .ok_or(Error::MechanismInvalid(mechanism))?;
        let mut value = SecretVec::zeroed(generated_key_size(info.key_type));
        self.rng.fill_bytes(value.as_mut());
        let handle = self.objects.insert(info.key_type, value);
        debug!(%handle, mechanism = info.name, "generated secret key");
        Ok(handle)
    }

    fn cipher_init(&mut self, direction: Direction, mechanism: &Mechanism, key: KeyHandle) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::OperationActive("cipher_init"));
        }
        let stream = self.open_stream(direction, mechanism, key)?;
        debug!(%direction, mechanism = mechanism::name(mechanism.id), %key, "cipher operation started");
        self.active = Some(ActiveOperation {
            mechanism: mechanism.id,
            stream,
            multipart: false,
        });
        Ok(())
    }

    fn cipher_update(&mut self, input: Option<&[u8]>, output: &mut [u8]) -> Result<usize> {
        let input = input.unwrap_or_default();
        self.with_active("cipher_update", |op| {
            op.multipart = true;
            op.stream.update(input, output).with_context("cipher_update")
        })
    }

    fn cipher_final(&mut self, output: &mut [u8]) -> Result<usize> {
        let written = self.with_active("cipher_final", |op| {
            op.stream.finish(output).with_context("cipher_final")
        })?;
        if let Some(op) = self.active.take() {
            debug!(mechanism = mechanism::name(op.mechanism), written, "cipher operation finished");
        }
        Ok(written)
    }

    fn cipher_one_shot(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let written = self.with_active("cipher_one_shot", |op| {
            if op.multipart {
                return Err(Error::OperationActive("cipher_one_shot"));
            }
            op.stream.one_shot(input, output)
        })?;
        self.active = None;
        Ok(written)
    }

    fn cipher_cancel(&mut self) -> Result<()> {
        if let Some(op) = self.active.take() {
            debug!(mechanism = mechanism::name(op.mechanism), "cipher operation cancelled");
        }
        Ok(())
    }

    fn wrap_key(
        &mut self,
        mechanism: &Mechanism,
        wrapping_key: KeyHandle,
        key: KeyHandle,
        output: &mut [u8],
    ) -> Result<usize> {
        if !self.policy.allows_wrap(mechanism.id) {
            return Err(Error::MechanismInvalid(mechanism.id));
        }
        let mut stream = self
            .open_stream(Direction::Encrypt, mechanism, wrapping_key)
            .map_err(|err| match err {
                Error::KeyHandleInvalid(h) | Error::KeyTypeInconsistent(h) => Error::WrappingKeyInvalid(h),
                other => other,
            })?;
        let value = self.objects.get(key)?.value.clone();
        let written = stream.one_shot(value.as_slice(), output).with_context("wrap_key")?;
        debug!(%wrapping_key, %key, written, "wrapped key");
        Ok(written)
    }

    fn unwrap_key(
        &mut self,
        mechanism: &Mechanism,
        unwrapping_key: KeyHandle,
        wrapped: &[u8],
        template: &KeyTemplate,
    ) -> Result<KeyHandle> {
        if template.class != ObjectClass::SecretKey {
            return Err(Error::TemplateInconsistent(format!(
                "cannot unwrap into object class {:?}",
                template.class
            )));
        }
        if !self.policy.allows_wrap(mechanism.id) {
            return Err(Error::MechanismInvalid(mechanism.id));
        }
        let mut stream = self
            .open_stream(Direction::Decrypt, mechanism, unwrapping_key)
            .map_err(|err| match err {
                Error::KeyHandleInvalid(h) | Error::KeyTypeInconsistent(h) => Error::WrappingKeyInvalid(h),
                other => other,
            })?;
        let mut value = SecretVec::zeroed(wrapped.len());
        let len = stream.one_shot(wrapped, value.as_mut()).with_context("unwrap_key")?;
        if !key_sizes(template.key_type).contains(&len) {
            return Err(Error::TemplateInconsistent(format!(
                "unwrapped {len} bytes, not a {} key",
                template.key_type
            )));
        }
        let handle = self
            .objects
            .insert(template.key_type, SecretVec::from_slice(&value.as_slice()[..len]));
        debug!(%unwrapping_key, %handle, "unwrapped key");
        Ok(handle)
    }

    fn destroy_key(&mut self, key: KeyHandle) -> Result<()> {
        self.objects.remove(key)?;
        debug!(%key, remaining = self.objects.len(), "destroyed key");
        Ok(())
    }
}
