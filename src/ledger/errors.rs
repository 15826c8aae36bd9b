//! Ledger error types
//!
//! Error codes:
//! - BCHOC_MALFORMED_RECORD (FATAL severity)
//! - BCHOC_TRUNCATED_LEDGER (FATAL severity)
//! - BCHOC_LEDGER_IO_ERROR (ERROR severity)
//!
//! A malformed or truncated store is never repaired. Both corruption codes
//! are fatal to the invocation that observed them.

use std::fmt;
use std::io;

/// Severity levels for ledger errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, store is intact
    Error,
    /// Store is corrupt, nothing further may be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Ledger-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorCode {
    /// A record could not be decoded
    MalformedRecord,
    /// The store ends in the middle of a record
    TruncatedLedger,
    /// Disk I/O failure
    IoError,
}

impl LedgerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerErrorCode::MalformedRecord => "BCHOC_MALFORMED_RECORD",
            LedgerErrorCode::TruncatedLedger => "BCHOC_TRUNCATED_LEDGER",
            LedgerErrorCode::IoError => "BCHOC_LEDGER_IO_ERROR",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            LedgerErrorCode::MalformedRecord => Severity::Fatal,
            LedgerErrorCode::TruncatedLedger => Severity::Fatal,
            LedgerErrorCode::IoError => Severity::Error,
        }
    }
}

impl fmt::Display for LedgerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Ledger error with enough context to point at the offending bytes
#[derive(Debug)]
pub struct LedgerError {
    code: LedgerErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl LedgerError {
    /// Create a malformed record error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::MalformedRecord,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a malformed record error for the record at `position`
    pub fn malformed_at(position: usize, offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::MalformedRecord,
            message: reason.into(),
            details: Some(format!("position: {}, byte_offset: {}", position, offset)),
            source: None,
        }
    }

    /// Create a truncation error for the record starting at `offset`
    pub fn truncated_at(position: usize, offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::TruncatedLedger,
            message: reason.into(),
            details: Some(format!("position: {}, byte_offset: {}", position, offset)),
            source: None,
        }
    }

    /// Create an I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: LedgerErrorCode::IoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> LedgerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the store must be considered corrupt
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(LedgerErrorCode::MalformedRecord.code(), "BCHOC_MALFORMED_RECORD");
        assert_eq!(LedgerErrorCode::TruncatedLedger.code(), "BCHOC_TRUNCATED_LEDGER");
        assert_eq!(LedgerErrorCode::IoError.code(), "BCHOC_LEDGER_IO_ERROR");
    }

    #[test]
    fn test_corruption_is_fatal() {
        assert!(LedgerError::malformed("bad status").is_fatal());
        assert!(LedgerError::truncated_at(3, 270, "short payload").is_fatal());
    }

    #[test]
    fn test_io_error_not_fatal() {
        let err = LedgerError::io_error(
            "disk full",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(!err.is_fatal());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_display_carries_position() {
        let err = LedgerError::truncated_at(4, 362, "payload cut short");
        let display = err.to_string();
        assert!(display.contains("FATAL"));
        assert!(display.contains("BCHOC_TRUNCATED_LEDGER"));
        assert!(display.contains("payload cut short"));
        assert!(display.contains("position: 4"));
        assert!(display.contains("byte_offset: 362"));
    }
}
