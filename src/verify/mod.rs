//! Chain verification
//!
//! Walks a loaded record sequence and reports linkage breaks, forks and
//! custody transitions the state machine would have rejected. Verification
//! never modifies the ledger file.

mod verifier;
mod violation;

pub use verifier::{ChainVerifier, VerifyMode};
pub use violation::{VerificationReport, Violation, ViolationKind};
