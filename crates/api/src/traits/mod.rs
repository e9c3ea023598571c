//! Trait definitions for session collaborators

pub mod session;

pub use session::CipherSession;
