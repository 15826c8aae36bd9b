//! Custody state machine
//!
//! Enforces, at append time, the per-item lifecycle:
//!
//! ```text
//! ABSENT -> CHECKEDIN <-> CHECKEDOUT
//!           CHECKEDIN  -> {DISPOSED, DESTROYED, RELEASED}
//! ```
//!
//! An invalid operation is rejected before any record is constructed, so a
//! rejection never leaves a partial append behind.

mod clock;
mod errors;
mod machine;
mod state;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use errors::{CustodyError, CustodyResult};
pub use machine::{CustodyMachine, Operation};
pub use state::{CustodyState, RemovalReason};
