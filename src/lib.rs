//! # streamcheck
//!
//! Verification harness for session-oriented block-cipher implementations.
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! streamcheck = "0.3"
//! ```
//!
//! ## Features
//!
//! - `token` (default): the in-process reference session
//! - `harness` (default): vector catalog, drivers, runner and CLI
//! - `serde`: serde support for the API types
//! - `full`: All features enabled
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports functionality from several sub-crates:
//!
//! - [`streamcheck-api`]: the `CipherSession` contract and its error taxonomy
//! - [`streamcheck-params`]: mechanism table, block and key sizes
//! - [`streamcheck-token`]: `SoftToken`, a reference `CipherSession`
//! - [`streamcheck-tests`]: the streaming and round-trip drivers

// Core re-exports (always available)
pub use streamcheck_api as api;
pub use streamcheck_params as params;

// Feature-gated re-exports
#[cfg(feature = "token")]
pub use streamcheck_token as token;

#[cfg(feature = "harness")]
pub use streamcheck_tests as harness;

/// Common imports for streamcheck users
pub mod prelude {
    pub use crate::api::{CipherSession, Direction, Error, KeyHandle, KeyType, Mechanism, MechanismId, Result};
    pub use crate::params::{CipherMode, MechanismInfo, MAX_REQUEST_SIZE};

    #[cfg(feature = "token")]
    pub use crate::token::{SoftToken, TokenPolicy};

    #[cfg(feature = "harness")]
    pub use crate::harness::suites::stream::{
        run_one_shot, run_round_trip, run_streaming, Catalog, ChunkPlan, GenerationSpec, Outcome, Reporter,
        RoundTripMode, RunSummary, SuiteRunner, TallyReporter,
    };

    #[cfg(feature = "harness")]
    pub use crate::harness::HarnessConfig;
}
