//! CLI-specific error types
//!
//! Every engine error reaches the user as one diagnostic line carrying a
//! stable code. Any error exits non-zero.

use std::error::Error as _;
use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::custody::CustodyError;
use crate::ledger::{LedgerError, LedgerErrorCode};

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Bad flag or environment value
    Config(&'static str),
    /// I/O error on stdout
    IoError,
    /// JSON rendering failed
    JsonError,
    /// Store or codec failure
    Ledger(LedgerErrorCode),
    /// Operation rejected by the custody rules
    Custody(&'static str),
    /// Existing ledger does not start with a genesis record
    InvalidGenesis,
    /// Verification found violations
    ChainViolation,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(code) | Self::Custody(code) => code,
            Self::IoError => "BCHOC_CLI_IO_ERROR",
            Self::JsonError => "BCHOC_CLI_JSON_ERROR",
            Self::Ledger(code) => code.code(),
            Self::InvalidGenesis => "BCHOC_INVALID_GENESIS",
            Self::ChainViolation => "BCHOC_CHAIN_VIOLATION",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Existing ledger has no valid genesis
    pub fn invalid_genesis(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidGenesis, msg)
    }

    /// Verification was not clean
    pub fn chain_violation(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ChainViolation, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(CliErrorCode::JsonError, format!("JSON error: {}", e))
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        let mut message = e.message().to_string();
        if let Some(details) = e.details() {
            message.push_str(&format!(" ({})", details));
        }
        if let Some(source) = e.source() {
            message.push_str(&format!(": {}", source));
        }
        Self::new(CliErrorCode::Ledger(e.code()), message)
    }
}

impl From<CustodyError> for CliError {
    fn from(e: CustodyError) -> Self {
        Self::new(CliErrorCode::Custody(e.code()), e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::Config(e.code()), e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custody_code_preserved() {
        let err = CliError::from(CustodyError::UnknownItem(9));
        assert_eq!(err.code_str(), "BCHOC_UNKNOWN_ITEM");
        assert_eq!(
            err.to_string(),
            "BCHOC_UNKNOWN_ITEM: Item 9 has never been added to the ledger"
        );
    }

    #[test]
    fn test_ledger_details_carried() {
        let err = CliError::from(LedgerError::truncated_at(3, 240, "payload cut short"));
        assert_eq!(err.code(), &CliErrorCode::Ledger(LedgerErrorCode::TruncatedLedger));
        assert!(err.message().contains("position: 3"));
        assert!(err.message().contains("byte_offset: 240"));
    }

    #[test]
    fn test_config_error() {
        let err = CliError::from(ConfigError::InvalidLogLevel("loud".to_string()));
        assert_eq!(err.code_str(), "BCHOC_CONFIG_LOG_LEVEL");
    }
}
