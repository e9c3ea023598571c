//! Reference cipher session for streamcheck
//!
//! [`SoftToken`] is a small in-memory module that implements
//! [`CipherSession`](streamcheck_api::CipherSession) for DES, triple DES and
//! AES. The harness uses it as its default collaborator; its own tests use
//! it as the known-good baseline that fault-injecting wrappers corrupt.

#![forbid(unsafe_code)]

pub mod block;
pub mod object;
pub mod policy;
pub mod stream;
pub mod token;

pub use block::BlockEngine;
pub use policy::TokenPolicy;
pub use stream::CipherStream;
pub use token::SoftToken;
