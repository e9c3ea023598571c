//! Error type definitions for session operations
//!
//! Each variant corresponds to one PKCS#11 return value so that a report can
//! name the exact code a module under test produced.

use thiserror::Error;

use crate::types::{KeyHandle, MechanismId};

/// Primary error type for cipher session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The mechanism is unknown or not usable for the requested operation
    #[error("mechanism {0} is invalid for this operation")]
    MechanismInvalid(MechanismId),

    /// The mechanism parameter (IV) has the wrong shape
    #[error("{context}: invalid mechanism parameter (expected {expected} bytes, got {actual})")]
    MechanismParamInvalid {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No object exists behind the handle
    #[error("key handle {0} is invalid")]
    KeyHandleInvalid(KeyHandle),

    /// The key value length does not fit the key type
    #[error("{context}: key size out of range (expected {expected}, got {actual})")]
    KeySizeRange {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A configured policy forbids the operation
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    /// update/final was called without a preceding init
    #[error("{0}: operation not initialized")]
    OperationNotInitialized(&'static str),

    /// init was called while another operation is still active
    #[error("{0}: an operation is already active")]
    OperationActive(&'static str),

    /// The destination cannot hold the output; state is unchanged
    #[error("output buffer too small (needed {needed}, available {available})")]
    BufferTooSmall { needed: usize, available: usize },

    /// Plaintext length is not acceptable for the mechanism
    #[error("{context}: data length {len} out of range")]
    DataLenRange { context: &'static str, len: usize },

    /// Ciphertext length (or its padding) is not acceptable for the mechanism
    #[error("{context}: encrypted data length {len} out of range")]
    EncryptedDataLenRange { context: &'static str, len: usize },

    /// Ciphertext padding did not verify
    #[error("{0}: encrypted data invalid")]
    EncryptedDataInvalid(&'static str),

    /// The key cannot be used with the mechanism's algorithm
    #[error("key {0} does not match the mechanism key type")]
    KeyTypeInconsistent(KeyHandle),

    /// The unwrap template does not describe a usable secret key
    #[error("template inconsistent: {0}")]
    TemplateInconsistent(String),

    /// The wrapping key cannot wrap with the given mechanism
    #[error("wrapping key {0} is not usable for wrapping")]
    WrappingKeyInvalid(KeyHandle),

    /// Anything else the session reports
    #[error("{context}: {message}")]
    DeviceError {
        context: &'static str,
        message: String,
    },
}

/// Result type for cipher session operations
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// The PKCS#11 return value this error stands for
    pub fn return_code(&self) -> &'static str {
        match self {
            Self::MechanismInvalid(_) => "CKR_MECHANISM_INVALID",
            Self::MechanismParamInvalid { .. } => "CKR_MECHANISM_PARAM_INVALID",
            Self::KeyHandleInvalid(_) => "CKR_KEY_HANDLE_INVALID",
            Self::KeySizeRange { .. } => "CKR_KEY_SIZE_RANGE",
            Self::PolicyViolation(_) => "CKR_POLICY_VIOLATION",
            Self::OperationNotInitialized(_) => "CKR_OPERATION_NOT_INITIALIZED",
            Self::OperationActive(_) => "CKR_OPERATION_ACTIVE",
            Self::BufferTooSmall { .. } => "CKR_BUFFER_TOO_SMALL",
            Self::DataLenRange { .. } => "CKR_DATA_LEN_RANGE",
            Self::EncryptedDataLenRange { .. } => "CKR_ENCRYPTED_DATA_LEN_RANGE",
            Self::EncryptedDataInvalid(_) => "CKR_ENCRYPTED_DATA_INVALID",
            Self::KeyTypeInconsistent(_) => "CKR_KEY_TYPE_INCONSISTENT",
            Self::TemplateInconsistent(_) => "CKR_TEMPLATE_INCONSISTENT",
            Self::WrappingKeyInvalid(_) => "CKR_WRAPPING_KEY_HANDLE_INVALID",
            Self::DeviceError { .. } => "CKR_DEVICE_ERROR",
        }
    }

    /// True for the one error the harness treats as environment variance
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation(_))
    }

    /// Replace the context of errors that carry one
    pub fn with_context(self, context: &'static str) -> Self {
        match self {
            Self::MechanismParamInvalid { expected, actual, .. } => Self::MechanismParamInvalid {
                context,
                expected,
                actual,
            },
            Self::KeySizeRange { expected, actual, .. } => Self::KeySizeRange {
                context,
                expected,
                actual,
            },
            Self::OperationNotInitialized(_) => Self::OperationNotInitialized(context),
            Self::OperationActive(_) => Self::OperationActive(context),
            Self::DataLenRange { len, .. } => Self::DataLenRange { context, len },
            Self::EncryptedDataLenRange { len, .. } => Self::EncryptedDataLenRange { context, len },
            Self::EncryptedDataInvalid(_) => Self::EncryptedDataInvalid(context),
            Self::DeviceError { message, .. } => Self::DeviceError { context, message },
            other => other,
        }
    }

    /// Shorthand for a [`Error::DeviceError`]
    pub fn device(context: &'static str, message: impl Into<String>) -> Self {
        Self::DeviceError {
            context,
            message: message.into(),
        }
    }
}
