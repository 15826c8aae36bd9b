//! CLI module for bchoc
//!
//! Provides command-line interface for:
//! - init: Create the ledger with its INITIAL block
//! - add / checkout / checkin / remove: Append custody events
//! - log: Show ledger entries
//! - verify: Check chain integrity

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{add, init, log, run, run_command, transition, verify, Transition};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{format_timestamp, write_error, write_record_text, write_response, RecordView};
