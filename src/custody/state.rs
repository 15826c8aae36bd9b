//! Per-item custody state
//!
//! ```text
//! ABSENT -> CHECKEDIN <-> CHECKEDOUT
//!           CHECKEDIN  -> {DISPOSED, DESTROYED, RELEASED}
//! ```
//!
//! The state of an item is the status of its most recent record; an item
//! with no record is absent. Terminal statuses have no exits.

use std::fmt;
use std::str::FromStr;

use super::errors::CustodyError;
use crate::ledger::{Ledger, Status};

/// Where an item currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustodyState {
    /// Never added
    Absent,
    CheckedIn,
    CheckedOut,
    /// Reached a terminal status
    Removed(Status),
    /// Latest status cannot be continued (INITIAL or unrecognized)
    Invalid(Status),
}

impl CustodyState {
    /// State implied by an item's most recent status
    pub fn from_status(status: &Status) -> Self {
        match status {
            Status::CheckedIn => CustodyState::CheckedIn,
            Status::CheckedOut => CustodyState::CheckedOut,
            s if s.is_terminal() => CustodyState::Removed(s.clone()),
            other => CustodyState::Invalid(other.clone()),
        }
    }

    /// State of `item_id` in a loaded ledger
    pub fn of(ledger: &Ledger, item_id: u32) -> Self {
        ledger
            .latest_for_item(item_id)
            .map(|record| Self::from_status(record.status()))
            .unwrap_or(CustodyState::Absent)
    }

    /// State of `item_id` by scanning a raw sequence, skipping genesis.
    /// Cross-checks the item index in tests.
    #[cfg(test)]
    fn scan(records: &[crate::ledger::Record], item_id: u32) -> Self {
        records
            .iter()
            .skip(1)
            .rev()
            .find(|record| record.item_id() == item_id)
            .map(|record| Self::from_status(record.status()))
            .unwrap_or(CustodyState::Absent)
    }

    /// Label used in diagnostics
    pub fn label(&self) -> &str {
        match self {
            CustodyState::Absent => "ABSENT",
            CustodyState::CheckedIn => "CHECKEDIN",
            CustodyState::CheckedOut => "CHECKEDOUT",
            CustodyState::Removed(status) | CustodyState::Invalid(status) => status.label(),
        }
    }
}

impl fmt::Display for CustodyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an item leaves custody
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    Disposed,
    Destroyed,
    /// Returned to its lawful owner; the owner must be named
    Released,
}

impl RemovalReason {
    /// The terminal status recorded for this reason
    pub fn status(&self) -> Status {
        match self {
            RemovalReason::Disposed => Status::Disposed,
            RemovalReason::Destroyed => Status::Destroyed,
            RemovalReason::Released => Status::Released,
        }
    }
}

impl FromStr for RemovalReason {
    type Err = CustodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DISPOSED" => Ok(RemovalReason::Disposed),
            "DESTROYED" => Ok(RemovalReason::Destroyed),
            "RELEASED" => Ok(RemovalReason::Released),
            _ => Err(CustodyError::InvalidReason(s.to_string())),
        }
    }
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status().label())
    }
}
