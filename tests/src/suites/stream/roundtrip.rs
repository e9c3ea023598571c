//! Round-trip drivers for generated keys
//!
//! Without a published vector the oracle is self-consistency: data
//! encrypted under a fresh key must decrypt back to exactly the original.

use zeroize::Zeroizing;

use streamcheck_api::{CipherSession, Direction, KeyHandle, KeyTemplate, Mechanism};
use streamcheck_params::mechanism::keygen_for;
use streamcheck_params::symmetric::key_sizes;

use super::driver::{call_names, ensure_supported, stream_through};
use super::error::{CaseError, Result, SessionResultExt};
use super::model::GeneratedSuite;
use super::planner::strided;
use super::report::{CaseKind, CaseReport};
use super::scope::KeyScope;
use super::state::{overreported, StreamState, StreamTrace};
use super::verdict::Verdict;

/// How the data travels through the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundTripMode {
    /// One `C_Encrypt`, one `C_Decrypt`
    SingleShot,
    /// Fixed-size updates in both directions
    MultipartStride,
    /// Decrypt with a copy of the key that went through wrap and unwrap
    WrapUnwrap,
}

impl RoundTripMode {
    pub fn kind(self) -> CaseKind {
        match self {
            Self::SingleShot => CaseKind::RoundTrip,
            Self::MultipartStride => CaseKind::MultipartRoundTrip,
            Self::WrapUnwrap => CaseKind::WrapUnwrap,
        }
    }
}

/// Shape of the generated data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSpec {
    /// Plaintext length in bytes
    pub len: usize,
    /// Multipart fragment size; the block size when unset
    pub stride: Option<usize>,
}

impl Default for GenerationSpec {
    fn default() -> Self {
        Self {
            len: streamcheck_params::MAX_REQUEST_SIZE,
            stride: None,
        }
    }
}

/// `byte[i] = i mod 255`
pub fn synthetic_plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 255) as u8).collect()
}

/// Run one round trip of `mode` for `suite`
pub fn run_round_trip<S: CipherSession + ?Sized>(
    session: &mut S,
    suite: &GeneratedSuite,
    mode: RoundTripMode,
    spec: &GenerationSpec,
) -> CaseReport {
    let mut trace = StreamTrace::default();
    let mut scope = KeyScope::new(session);
    let result = match mode {
        RoundTripMode::SingleShot => single_shot(&mut scope, suite, spec, &mut trace),
        RoundTripMode::MultipartStride => multipart(&mut scope, suite, spec, &mut trace),
        RoundTripMode::WrapUnwrap => wrap_unwrap(&mut scope, suite, spec, &mut trace),
    };
    let cleanup = scope.close();
    CaseReport::new(&suite.name, mode.kind(), None, suite.mechanism.name, result, trace, cleanup)
}

/// Room for `len` bytes of output plus one block of padding
fn capacity_for(suite: &GeneratedSuite, len: usize) -> usize {
    len + suite.mechanism.block_size()
}

/// Unpadded modes only take whole blocks
fn check_len(suite: &GeneratedSuite, len: usize) -> Result<()> {
    let block = suite.mechanism.block_size();
    if !suite.mechanism.mode.is_padded() && len % block != 0 {
        return Err(CaseError::Configuration(format!(
            "{} needs whole {block}-byte blocks, not {len} bytes",
            suite.mechanism.name
        )));
    }
    Ok(())
}

/// init + one-shot, returning exactly the bytes produced
fn one_shot<S: CipherSession + ?Sized>(
    scope: &mut KeyScope<'_, S>,
    direction: Direction,
    mechanism: &Mechanism,
    key: KeyHandle,
    input: &[u8],
    capacity: usize,
    trace: &mut StreamTrace,
) -> Result<Zeroizing<Vec<u8>>> {
    let names = call_names(direction);
    scope.cipher_init(direction, mechanism, key)?;
    let mut out = Zeroizing::new(vec![0u8; capacity]);
    trace.one_shot_calls += 1;
    trace.bytes_consumed += input.len();
    let written = scope.cipher_one_shot(input, &mut out).during(names.one_shot)?;
    if written > capacity {
        return Err(overreported(names.one_shot, written, capacity));
    }
    trace.bytes_produced += written;
    out.truncate(written);
    Ok(out)
}

/// init + fixed-stride updates + final
fn multipart_pass<S: CipherSession + ?Sized>(
    scope: &mut KeyScope<'_, S>,
    direction: Direction,
    mechanism: &Mechanism,
    key: KeyHandle,
    input: &[u8],
    stride: usize,
    capacity: usize,
    trace: &mut StreamTrace,
) -> Result<Zeroizing<Vec<u8>>> {
    let names = call_names(direction);
    scope.cipher_init(direction, mechanism, key)?;
    let mut out = Zeroizing::new(vec![0u8; capacity]);
    let mut state = StreamState::new(capacity);
    let streamed = stream_through(&mut **scope, &mut state, Some(strided(input, stride)), input, &mut out, names);
    trace.absorb(state.trace());
    let written = streamed?;
    out.truncate(written);
    Ok(out)
}

fn single_shot<S: CipherSession + ?Sized>(
    scope: &mut KeyScope<'_, S>,
    suite: &GeneratedSuite,
    spec: &GenerationSpec,
    trace: &mut StreamTrace,
) -> Result<Verdict> {
    ensure_supported(&**scope, suite.mechanism)?;
    check_len(suite, spec.len)?;
    let original = synthetic_plaintext(spec.len);
    let mechanism = suite.cipher_mechanism();
    let key = scope.generate_key(keygen_for(suite.key_type()))?;

    let cap = capacity_for(suite, original.len());
    let crypt = one_shot(scope, Direction::Encrypt, &mechanism, key, &original, cap, trace)?;
    let cap = capacity_for(suite, crypt.len());
    let decrypt = one_shot(scope, Direction::Decrypt, &mechanism, key, &crypt, cap, trace)?;

    Ok(Verdict::compare("decrypted data", &original, &decrypt))
}

fn multipart<S: CipherSession + ?Sized>(
    scope: &mut KeyScope<'_, S>,
    suite: &GeneratedSuite,
    spec: &GenerationSpec,
    trace: &mut StreamTrace,
) -> Result<Verdict> {
    ensure_supported(&**scope, suite.mechanism)?;
    let stride = spec.stride.unwrap_or_else(|| suite.mechanism.block_size());
    if stride == 0 {
        return Err(CaseError::Configuration("multipart stride must be positive".into()));
    }
    check_len(suite, spec.len)?;
    let original = synthetic_plaintext(spec.len);
    let mechanism = suite.cipher_mechanism();
    let key = scope.generate_key(keygen_for(suite.key_type()))?;

    let cap = capacity_for(suite, original.len());
    let crypt = multipart_pass(scope, Direction::Encrypt, &mechanism, key, &original, stride, cap, trace)?;
    let cap = capacity_for(suite, crypt.len());
    let decrypt = multipart_pass(scope, Direction::Decrypt, &mechanism, key, &crypt, stride, cap, trace)?;

    Ok(Verdict::compare("decrypted multipart data", &original, &decrypt))
}

fn wrap_unwrap<S: CipherSession + ?Sized>(
    scope: &mut KeyScope<'_, S>,
    suite: &GeneratedSuite,
    spec: &GenerationSpec,
    trace: &mut StreamTrace,
) -> Result<Verdict> {
    ensure_supported(&**scope, suite.mechanism)?;
    let mechanism = suite.cipher_mechanism();
    if !scope.is_wrap_supported(&mechanism) {
        return Err(CaseError::Skip(format!(
            "Slot doesn't support wrapping with {} ({})",
            suite.mechanism.name, suite.mechanism.id
        )));
    }
    check_len(suite, spec.len)?;
    let original = synthetic_plaintext(spec.len);
    let keygen = keygen_for(suite.key_type());
    let data_key = scope.generate_key(keygen)?;
    let wrapping_key = scope.generate_key(keygen)?;

    let cap = capacity_for(suite, original.len());
    let crypt = one_shot(scope, Direction::Encrypt, &mechanism, data_key, &original, cap, trace)?;

    // room for the longest key of the type plus padding
    let longest_key = key_sizes(suite.key_type()).iter().copied().max().unwrap_or_default();
    let wrap_cap = capacity_for(suite, longest_key);
    let mut wrapped = Zeroizing::new(vec![0u8; wrap_cap]);
    let wrapped_len = scope
        .wrap_key(&mechanism, wrapping_key, data_key, &mut wrapped)
        .during("C_WrapKey")?;
    if wrapped_len > wrap_cap {
        return Err(overreported("C_WrapKey", wrapped_len, wrap_cap));
    }
    let template = KeyTemplate::secret(suite.key_type());
    let unwrapped = scope.unwrap_key(&mechanism, wrapping_key, &wrapped[..wrapped_len], &template)?;

    let cap = capacity_for(suite, crypt.len());
    let decrypt = one_shot(scope, Direction::Decrypt, &mechanism, unwrapped, &crypt, cap, trace)?;

    Ok(Verdict::compare("decrypted data", &original, &decrypt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites::stream::report::Outcome;
    use streamcheck_params::mechanism::{self, CKM_AES_CBC_PAD, CKM_DES_CBC, CKM_DES_ECB};
    use streamcheck_token::{SoftToken, TokenPolicy};

    fn suite(id: streamcheck_api::MechanismId, iv: &[u8]) -> GeneratedSuite {
        let info = mechanism::lookup(id).unwrap();
        GeneratedSuite {
            name: info.name.trim_start_matches("CKM_").to_owned(),
            mechanism: info,
            iv: iv.to_vec(),
        }
    }

    #[test]
    fn synthetic_pattern_wraps_at_255() {
        let data = synthetic_plaintext(300);
        assert_eq!(data[0], 0);
        assert_eq!(data[254], 254);
        assert_eq!(data[255], 0);
        assert_eq!(data[299], 44);
    }

    #[test]
    fn stride_of_one_block_gives_one_update_per_block() {
        let mut token = SoftToken::new().with_seed(11);
        let spec = GenerationSpec { len: 64, stride: None };
        let report = run_round_trip(&mut token, &suite(CKM_DES_CBC, &[0u8; 8]), RoundTripMode::MultipartStride, &spec);
        assert_eq!(report.outcome, Outcome::Pass);
        // 8 updates and a final for each direction
        assert_eq!(report.trace.update_calls, 16);
        assert_eq!(report.trace.final_calls, 2);
        assert_eq!(report.trace.bytes_consumed, 128);
        assert_eq!(token.object_count(), 0);
    }

    #[test]
    fn padded_multipart_handles_the_extra_block() {
        let mut token = SoftToken::new().with_seed(5);
        let spec = GenerationSpec { len: 100, stride: Some(7) };
        let report = run_round_trip(
            &mut token,
            &suite(CKM_AES_CBC_PAD, &[3u8; 16]),
            RoundTripMode::MultipartStride,
            &spec,
        );
        assert!(report.outcome.is_pass(), "{:?}", report.outcome);
    }

    #[test]
    fn single_shot_round_trip() {
        let mut token = SoftToken::new().with_seed(2);
        let report = run_round_trip(
            &mut token,
            &suite(CKM_DES_ECB, &[]),
            RoundTripMode::SingleShot,
            &GenerationSpec::default(),
        );
        assert!(report.outcome.is_pass(), "{:?}", report.outcome);
        assert_eq!(report.trace.one_shot_calls, 2);
    }

    #[test]
    fn wrap_unwrap_destroys_all_three_keys() {
        let mut token = SoftToken::new().with_seed(9);
        let report = run_round_trip(
            &mut token,
            &suite(CKM_AES_CBC_PAD, &[0u8; 16]),
            RoundTripMode::WrapUnwrap,
            &GenerationSpec { len: 256, stride: None },
        );
        assert!(report.outcome.is_pass(), "{:?}", report.outcome);
        assert!(report.cleanup_failures.is_empty());
        assert_eq!(token.object_count(), 0);
    }

    #[test]
    fn wrap_unsupported_is_a_skip() {
        let policy = TokenPolicy::new().with_no_wrap("CKM_DES_CBC");
        let mut token = SoftToken::new().with_policy(policy);
        let report = run_round_trip(
            &mut token,
            &suite(CKM_DES_CBC, &[0u8; 8]),
            RoundTripMode::WrapUnwrap,
            &GenerationSpec::default(),
        );
        assert!(matches!(report.outcome, Outcome::Skip(_)));
        assert_eq!(token.object_count(), 0);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let mut token = SoftToken::new();
        let spec = GenerationSpec { len: 16, stride: Some(0) };
        let report = run_round_trip(&mut token, &suite(CKM_DES_ECB, &[]), RoundTripMode::MultipartStride, &spec);
        assert!(matches!(report.outcome, Outcome::Error(_)));
    }

    #[test]
    fn partial_block_without_padding_is_rejected() {
        let mut token = SoftToken::new();
        let spec = GenerationSpec { len: 20, stride: None };
        let report = run_round_trip(&mut token, &suite(CKM_DES_ECB, &[]), RoundTripMode::SingleShot, &spec);
        match report.outcome {
            Outcome::Error(why) => assert!(why.contains("whole 8-byte blocks"), "{why}"),
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(token.object_count(), 0);
    }
}
