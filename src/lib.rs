//! bchoc - tamper-evident chain-of-custody ledger
//!
//! Evidence items move through custody as immutable, hash-linked records in
//! a single append-only file. Every append is checked against the custody
//! rules, and the whole chain can be re-verified at any time.

pub mod cli;
pub mod config;
pub mod custody;
pub mod ledger;
pub mod observability;
pub mod query;
pub mod verify;
