//! Custody state machine
//!
//! Turns a requested operation plus the loaded ledger into exactly one new,
//! fully populated record, or a typed error. Existing records are never
//! touched; new records are only ever pushed onto the end of the ledger.
//!
//! Every produced record:
//! - carries the digest of the current last record as its parent
//! - is stamped by the injected clock
//! - inherits the case id of the item's previous record (add supplies it)

use std::collections::HashSet;

use uuid::Uuid;

use super::clock::Clock;
use super::errors::{CustodyError, CustodyResult};
use super::state::{CustodyState, RemovalReason};
use crate::ledger::{digest_record, Ledger, Record, Status};
use crate::observability::{log_event_with_fields, Event};

/// One custody event request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Intake of a new item under a case
    Add { case_id: Uuid, item_id: u32 },
    Checkout { item_id: u32 },
    Checkin { item_id: u32 },
    /// Terminal removal; `owner` is required for releases
    Remove {
        item_id: u32,
        reason: RemovalReason,
        owner: Option<String>,
    },
}

impl Operation {
    pub fn item_id(&self) -> u32 {
        match self {
            Operation::Add { item_id, .. }
            | Operation::Checkout { item_id }
            | Operation::Checkin { item_id }
            | Operation::Remove { item_id, .. } => *item_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Checkout { .. } => "checkout",
            Operation::Checkin { .. } => "checkin",
            Operation::Remove { .. } => "remove",
        }
    }
}

/// Applies custody operations against a ledger.
pub struct CustodyMachine<C> {
    clock: C,
}

impl<C: Clock> CustodyMachine<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Computes the record `op` would append, without changing the ledger.
    pub fn next_record(&self, ledger: &Ledger, op: &Operation) -> CustodyResult<Record> {
        let last = ledger.last().ok_or(CustodyError::Uninitialized)?;
        let item_id = op.item_id();
        let state = CustodyState::of(ledger, item_id);
        let prior_case = ledger.latest_for_item(item_id).map(Record::case_id);

        let (case_id, status, payload) = match op {
            Operation::Add { case_id, .. } => match state {
                CustodyState::Absent => (*case_id, Status::CheckedIn, Vec::new()),
                CustodyState::Removed(_) => return Err(CustodyError::ItemRemoved(item_id)),
                _ => return Err(CustodyError::DuplicateItem(item_id)),
            },
            Operation::Checkout { .. } => match state {
                CustodyState::CheckedIn => (case_of(prior_case), Status::CheckedOut, Vec::new()),
                CustodyState::Absent => return Err(CustodyError::UnknownItem(item_id)),
                CustodyState::CheckedOut => return Err(CustodyError::AlreadyCheckedOut(item_id)),
                CustodyState::Removed(_) => return Err(CustodyError::ItemRemoved(item_id)),
                CustodyState::Invalid(status) => return Err(illegal(item_id, &status)),
            },
            Operation::Checkin { .. } => match state {
                CustodyState::CheckedOut => (case_of(prior_case), Status::CheckedIn, Vec::new()),
                CustodyState::Absent => return Err(CustodyError::UnknownItem(item_id)),
                CustodyState::CheckedIn => return Err(CustodyError::AlreadyCheckedIn(item_id)),
                CustodyState::Removed(_) => return Err(CustodyError::ItemRemoved(item_id)),
                CustodyState::Invalid(status) => return Err(illegal(item_id, &status)),
            },
            Operation::Remove { reason, owner, .. } => match state {
                CustodyState::CheckedIn => {
                    let payload = removal_payload(item_id, *reason, owner.as_deref())?;
                    (case_of(prior_case), reason.status(), payload)
                }
                CustodyState::Absent => return Err(CustodyError::UnknownItem(item_id)),
                CustodyState::Removed(_) => return Err(CustodyError::ItemRemoved(item_id)),
                other => {
                    return Err(CustodyError::ItemNotCheckedIn {
                        item_id,
                        status: other.label().to_string(),
                    })
                }
            },
        };

        Ok(Record::new(
            digest_record(last),
            self.clock.now(),
            case_id,
            item_id,
            status,
            payload,
        ))
    }

    /// Validates `op`, then pushes the resulting record onto the ledger.
    pub fn apply(&self, ledger: &mut Ledger, op: &Operation) -> CustodyResult<Record> {
        let record = self.next_record(ledger, op).map_err(|e| {
            log_event_with_fields(
                Event::CustodyRejected,
                &[
                    ("code", e.code()),
                    ("item_id", op.item_id().to_string().as_str()),
                    ("operation", op.name()),
                ],
            );
            e
        })?;

        log_event_with_fields(
            Event::CustodyApplied,
            &[
                ("item_id", record.item_id().to_string().as_str()),
                ("operation", op.name()),
                ("status", record.status().label()),
            ],
        );
        ledger.push(record.clone());
        Ok(record)
    }

    /// Adds several items to one case, one chained record per item.
    ///
    /// The whole batch is validated first; if any item is rejected nothing
    /// is pushed.
    pub fn add_items(
        &self,
        ledger: &mut Ledger,
        case_id: Uuid,
        item_ids: &[u32],
    ) -> CustodyResult<Vec<Record>> {
        if item_ids.is_empty() {
            return Err(CustodyError::NoItems);
        }
        if ledger.is_empty() {
            return Err(CustodyError::Uninitialized);
        }

        let mut seen = HashSet::with_capacity(item_ids.len());
        for &item_id in item_ids {
            if !seen.insert(item_id) {
                return Err(CustodyError::DuplicateItem(item_id));
            }
            match CustodyState::of(ledger, item_id) {
                CustodyState::Absent => {}
                CustodyState::Removed(_) => return Err(CustodyError::ItemRemoved(item_id)),
                _ => return Err(CustodyError::DuplicateItem(item_id)),
            }
        }

        item_ids
            .iter()
            .map(|&item_id| self.apply(ledger, &Operation::Add { case_id, item_id }))
            .collect()
    }
}

fn case_of(prior_case: Option<Uuid>) -> Uuid {
    prior_case.unwrap_or_else(Uuid::nil)
}

fn illegal(item_id: u32, status: &Status) -> CustodyError {
    CustodyError::IllegalState {
        item_id,
        status: status.label().to_string(),
    }
}

fn removal_payload(
    item_id: u32,
    reason: RemovalReason,
    owner: Option<&str>,
) -> CustodyResult<Vec<u8>> {
    match reason {
        RemovalReason::Released => match owner.map(str::trim) {
            Some(owner) if !owner.is_empty() => Ok(owner.as_bytes().to_vec()),
            _ => Err(CustodyError::MissingOwner(item_id)),
        },
        RemovalReason::Disposed | RemovalReason::Destroyed => Ok(Vec::new()),
    }
}
