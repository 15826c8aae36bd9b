//! Ledger storage subsystem
//!
//! The ledger is an append-only file of hash-linked custody records.
//!
//! # Design Principles
//!
//! - Append-only (existing bytes are never rewritten)
//! - Fixed binary layout, no header, no trailing delimiter
//! - Halt on corruption, never repair
//! - No chain or custody validation at this layer
//!
//! # Layout
//!
//! - `record`: binary codec for a single record
//! - `digest`: tamper-evidence digest linking a record to its predecessor
//! - `reader` / `writer`: sequential load and append-mode persistence
//! - `store`: `LedgerHandle` (resolved path) and `Ledger` (loaded sequence)

mod digest;
mod errors;
mod reader;
mod record;
mod store;
mod writer;

pub use digest::{canonical_text, digest_record, timestamp_text, LedgerHash, DIGEST_LEN};
pub use errors::{LedgerError, LedgerErrorCode, LedgerResult, Severity};
pub use reader::LedgerReader;
pub use record::{
    peek_payload_length, round_to_micros, Record, Status, GENESIS_PAYLOAD, PREFIX_LEN, STATUS_LEN,
};
pub use store::{Ledger, LedgerHandle, OpenOutcome};
pub use writer::LedgerWriter;
