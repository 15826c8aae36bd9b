//! Custody rule violations
//!
//! These are fatal to the current invocation but never indicate store
//! corruption. Preconditions are checked before a record is built, so a
//! rejected operation appends nothing.

use thiserror::Error;

/// Result type for custody operations
pub type CustodyResult<T> = Result<T, CustodyError>;

/// Errors raised by the custody state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    #[error("Item {0} already exists in the ledger")]
    DuplicateItem(u32),

    #[error("Item {0} has never been added to the ledger")]
    UnknownItem(u32),

    #[error("Item {0} is already checked out")]
    AlreadyCheckedOut(u32),

    #[error("Item {0} is already checked in")]
    AlreadyCheckedIn(u32),

    #[error("Item {item_id} must be checked in before removal (current status: {status})")]
    ItemNotCheckedIn { item_id: u32, status: String },

    #[error("Item {0} has been removed from custody")]
    ItemRemoved(u32),

    #[error("Releasing item {0} requires the lawful owner")]
    MissingOwner(u32),

    #[error("Item {item_id} has a history the custody rules cannot continue (latest status: {status})")]
    IllegalState { item_id: u32, status: String },

    #[error("Ledger has no genesis record")]
    Uninitialized,

    #[error("No item identifiers supplied")]
    NoItems,

    #[error("Invalid removal reason: '{0}' (expected DISPOSED, DESTROYED or RELEASED)")]
    InvalidReason(String),
}

impl CustodyError {
    /// Stable string code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            CustodyError::DuplicateItem(_) => "BCHOC_DUPLICATE_ITEM",
            CustodyError::UnknownItem(_) => "BCHOC_UNKNOWN_ITEM",
            CustodyError::AlreadyCheckedOut(_) => "BCHOC_ALREADY_CHECKED_OUT",
            CustodyError::AlreadyCheckedIn(_) => "BCHOC_ALREADY_CHECKED_IN",
            CustodyError::ItemNotCheckedIn { .. } => "BCHOC_ITEM_NOT_CHECKED_IN",
            CustodyError::ItemRemoved(_) => "BCHOC_ITEM_REMOVED",
            CustodyError::MissingOwner(_) => "BCHOC_MISSING_OWNER",
            CustodyError::IllegalState { .. } => "BCHOC_ILLEGAL_STATE",
            CustodyError::Uninitialized => "BCHOC_UNINITIALIZED",
            CustodyError::NoItems => "BCHOC_NO_ITEMS",
            CustodyError::InvalidReason(_) => "BCHOC_INVALID_REASON",
        }
    }

    /// The item the error refers to, if any
    pub fn item_id(&self) -> Option<u32> {
        match self {
            CustodyError::DuplicateItem(id)
            | CustodyError::UnknownItem(id)
            | CustodyError::AlreadyCheckedOut(id)
            | CustodyError::AlreadyCheckedIn(id)
            | CustodyError::ItemRemoved(id)
            | CustodyError::MissingOwner(id) => Some(*id),
            CustodyError::ItemNotCheckedIn { item_id, .. }
            | CustodyError::IllegalState { item_id, .. } => Some(*item_id),
            CustodyError::Uninitialized | CustodyError::NoItems | CustodyError::InvalidReason(_) => {
                None
            }
        }
    }
}
