//! Public contract for the streamcheck harness
//!
//! This crate describes the cryptographic session that the harness drives:
//! the [`CipherSession`] trait, the handle and mechanism types it speaks in,
//! and the error taxonomy a session reports through. Nothing in here performs
//! cryptography; implementations live in `streamcheck-token` or in whatever
//! module is being verified.

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate level for convenience
pub use error::{Error, Result, ResultExt};
pub use types::*;

pub use traits::CipherSession;
pub use traits::session;
