//! CLI argument definitions using clap
//!
//! Commands:
//! - bchoc init
//! - bchoc add -c <case_id> -i <item_id>...
//! - bchoc checkout -i <item_id>
//! - bchoc checkin -i <item_id>
//! - bchoc remove -i <item_id> -y <reason> [-o <owner>]
//! - bchoc log [-r] [-n <num_entries>] [-c <case_id>] [-i <item_id>] [--json]
//! - bchoc verify [--strict] [--json]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::{LEDGER_PATH_ENV, LOG_LEVEL_ENV};

/// bchoc - tamper-evident chain-of-custody ledger for evidence items
#[derive(Parser, Debug)]
#[command(name = "bchoc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the ledger file
    #[arg(long, global = true, env = LEDGER_PATH_ENV)]
    pub file: Option<PathBuf>,

    /// Log threshold for stderr diagnostics (TRACE, INFO, WARN, ERROR, FATAL)
    #[arg(long, global = true, env = LOG_LEVEL_ENV, hide = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the ledger with its initial block, or check an existing one
    Init,

    /// Add new evidence items to a case
    Add {
        /// Case the evidence belongs to
        #[arg(short = 'c', long = "case_id")]
        case_id: Uuid,

        /// Evidence item identifiers
        #[arg(short = 'i', long = "item_id", required = true, num_args = 1..)]
        item_ids: Vec<u32>,
    },

    /// Record a checkout of an item
    Checkout {
        #[arg(short = 'i', long = "item_id")]
        item_id: u32,
    },

    /// Record a checkin of an item
    Checkin {
        #[arg(short = 'i', long = "item_id")]
        item_id: u32,
    },

    /// Take an item out of custody for good
    Remove {
        #[arg(short = 'i', long = "item_id")]
        item_id: u32,

        /// DISPOSED, DESTROYED or RELEASED
        #[arg(short = 'y', long = "why")]
        reason: String,

        /// Lawful owner, required with RELEASED
        #[arg(short = 'o', long)]
        owner: Option<String>,
    },

    /// Show ledger entries, oldest first
    Log {
        /// Newest first
        #[arg(short = 'r', long)]
        reverse: bool,

        /// Show at most this many entries
        #[arg(short = 'n', long = "num_entries")]
        num_entries: Option<usize>,

        #[arg(short = 'c', long = "case_id")]
        case_id: Option<Uuid>,

        #[arg(short = 'i', long = "item_id")]
        item_id: Option<u32>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Walk the whole ledger and check its integrity
    Verify {
        /// Report every violation instead of stopping at the first
        #[arg(long)]
        strict: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_add_accepts_many_items() {
        let cli = parse(&[
            "bchoc",
            "add",
            "-c",
            "65cc391d-6568-4dcc-a3f1-86a2f04140f3",
            "-i",
            "1",
            "2",
            "-i",
            "3",
        ]);
        match cli.command {
            Command::Add { item_ids, .. } => assert_eq!(item_ids, vec![1, 2, 3]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_add_requires_item() {
        let result = Cli::try_parse_from([
            "bchoc",
            "add",
            "-c",
            "65cc391d-6568-4dcc-a3f1-86a2f04140f3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_case_id_rejected() {
        assert!(Cli::try_parse_from(["bchoc", "add", "-c", "not-a-uuid", "-i", "1"]).is_err());
    }

    #[test]
    fn test_remove_flags() {
        let cli = parse(&["bchoc", "remove", "-i", "4", "-y", "RELEASED", "-o", "Jane Doe"]);
        assert_eq!(
            cli.command,
            Command::Remove {
                item_id: 4,
                reason: "RELEASED".to_string(),
                owner: Some("Jane Doe".to_string()),
            }
        );
    }

    #[test]
    fn test_log_flags() {
        let cli = parse(&["bchoc", "log", "-r", "-n", "2", "--json"]);
        assert_eq!(
            cli.command,
            Command::Log {
                reverse: true,
                num_entries: Some(2),
                case_id: None,
                item_id: None,
                json: true,
            }
        );
    }

    #[test]
    fn test_file_flag_is_global() {
        let cli = parse(&["bchoc", "verify", "--strict", "--file", "/tmp/ledger.bin"]);
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/ledger.bin")));
        assert_eq!(
            cli.command,
            Command::Verify {
                strict: true,
                json: false
            }
        );
    }
}
