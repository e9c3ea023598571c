//! Constant values for streamcheck
//!
//! Block and key sizes, the harness request limit, and the table of
//! mechanisms the harness knows how to drive.

pub mod mechanism;
pub mod symmetric;

pub use mechanism::{CipherMode, MechanismInfo};
pub use symmetric::MAX_REQUEST_SIZE;
