//! Observable ledger events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in the custody ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Store
    /// Existing ledger read into memory
    LedgerLoaded,
    /// Empty store initialized with genesis
    LedgerCreated,
    /// New records appended and fsynced
    RecordsAppended,
    /// Store failed to decode (FATAL)
    LedgerCorruption,

    // Custody
    /// Operation produced a record
    CustodyApplied,
    /// Operation refused by the custody rules
    CustodyRejected,

    // Verification
    /// Verification begins
    VerifyBegin,
    /// A violation was found
    VerifyViolation,
    /// Verification finished
    VerifyComplete,
}

impl Event {
    /// Returns the event name as it appears in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::LedgerLoaded => "LEDGER_LOADED",
            Event::LedgerCreated => "LEDGER_CREATED",
            Event::RecordsAppended => "RECORDS_APPENDED",
            Event::LedgerCorruption => "LEDGER_CORRUPTION",
            Event::CustodyApplied => "CUSTODY_APPLIED",
            Event::CustodyRejected => "CUSTODY_REJECTED",
            Event::VerifyBegin => "VERIFY_BEGIN",
            Event::VerifyViolation => "VERIFY_VIOLATION",
            Event::VerifyComplete => "VERIFY_COMPLETE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::LedgerCorruption => Severity::Fatal,
            Event::CustodyRejected | Event::VerifyViolation => Severity::Warn,
            _ => Severity::Info,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
