//! Custody Lifecycle Tests
//!
//! Drives the state machine against a real ledger file:
//! - Records built through the engine are linked and verify clean
//! - Rejected operations append nothing
//! - Terminal statuses have no exits

use bchoc::custody::{CustodyError, CustodyMachine, Operation, RemovalReason, SteppingClock};
use bchoc::ledger::{digest_record, Ledger, LedgerHandle, Status};
use bchoc::verify::{ChainVerifier, VerifyMode};
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

// =============================================================================
// Test Utilities
// =============================================================================

const CASE: &str = "65cc391d-6568-4dcc-a3f1-86a2f04140f3";

fn case_id() -> Uuid {
    Uuid::parse_str(CASE).unwrap()
}

fn create_ledger() -> (TempDir, LedgerHandle, Ledger) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let handle = LedgerHandle::new(temp_dir.path().join("bchoc_data"));
    let (ledger, _) = handle.open_or_init(1_700_000_000.0).unwrap();
    (temp_dir, handle, ledger)
}

fn machine() -> CustodyMachine<SteppingClock> {
    CustodyMachine::new(SteppingClock::new(1_700_000_001.0, 1.0))
}

fn remove(item_id: u32, reason: RemovalReason, owner: Option<&str>) -> Operation {
    Operation::Remove {
        item_id,
        reason,
        owner: owner.map(str::to_string),
    }
}

// =============================================================================
// Full lifecycle
// =============================================================================

#[test]
fn test_lifecycle_records_are_linked() {
    let (_dir, handle, mut ledger) = create_ledger();
    let machine = machine();

    machine.add_items(&mut ledger, case_id(), &[7]).unwrap();
    machine
        .apply(&mut ledger, &Operation::Checkout { item_id: 7 })
        .unwrap();
    machine
        .apply(&mut ledger, &Operation::Checkin { item_id: 7 })
        .unwrap();
    machine
        .apply(&mut ledger, &remove(7, RemovalReason::Disposed, None))
        .unwrap();
    handle.persist(&mut ledger).unwrap();

    let reloaded = handle.load().unwrap();
    let statuses: Vec<&Status> = reloaded.records().iter().map(|r| r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            &Status::Initial,
            &Status::CheckedIn,
            &Status::CheckedOut,
            &Status::CheckedIn,
            &Status::Disposed,
        ]
    );

    for pair in reloaded.records().windows(2) {
        assert_eq!(pair[1].parent_digest(), digest_record(&pair[0]));
    }
    for record in &reloaded.records()[1..] {
        assert_eq!(record.case_id(), case_id());
        assert_eq!(record.item_id(), 7);
    }

    let report = ChainVerifier::verify(reloaded.records(), VerifyMode::Strict);
    assert!(report.is_clean(), "{:?}", report.violations);
    assert_eq!(report.transactions, 5);
}

#[test]
fn test_release_requires_owner() {
    let (_dir, handle, mut ledger) = create_ledger();
    let machine = machine();
    machine.add_items(&mut ledger, case_id(), &[2]).unwrap();

    let err = machine
        .apply(&mut ledger, &remove(2, RemovalReason::Released, None))
        .unwrap_err();
    assert_eq!(err, CustodyError::MissingOwner(2));

    machine
        .apply(&mut ledger, &remove(2, RemovalReason::Released, Some("Jane Doe")))
        .unwrap();
    handle.persist(&mut ledger).unwrap();

    let reloaded = handle.load().unwrap();
    let last = reloaded.last().unwrap();
    assert_eq!(last.status(), &Status::Released);
    assert_eq!(last.payload(), b"Jane Doe");
    assert_eq!(last.payload_text(), "Jane Doe");
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_checkout_unknown_and_twice() {
    let (_dir, _handle, mut ledger) = create_ledger();
    let machine = machine();

    assert_eq!(
        machine
            .apply(&mut ledger, &Operation::Checkout { item_id: 11 })
            .unwrap_err(),
        CustodyError::UnknownItem(11)
    );

    machine.add_items(&mut ledger, case_id(), &[11]).unwrap();
    machine
        .apply(&mut ledger, &Operation::Checkout { item_id: 11 })
        .unwrap();
    assert_eq!(
        machine
            .apply(&mut ledger, &Operation::Checkout { item_id: 11 })
            .unwrap_err(),
        CustodyError::AlreadyCheckedOut(11)
    );
}

#[test]
fn test_removed_item_rejects_everything() {
    let (_dir, _handle, mut ledger) = create_ledger();
    let machine = machine();
    machine.add_items(&mut ledger, case_id(), &[3]).unwrap();
    machine
        .apply(&mut ledger, &remove(3, RemovalReason::Disposed, None))
        .unwrap();

    let ops = [
        Operation::Add {
            case_id: case_id(),
            item_id: 3,
        },
        Operation::Checkout { item_id: 3 },
        Operation::Checkin { item_id: 3 },
        remove(3, RemovalReason::Destroyed, None),
    ];
    for op in &ops {
        assert_eq!(
            machine.apply(&mut ledger, op).unwrap_err(),
            CustodyError::ItemRemoved(3),
            "operation {}",
            op.name()
        );
    }
    assert_eq!(ledger.len(), 3);
}

#[test]
fn test_rejected_batch_appends_nothing() {
    let (_dir, handle, mut ledger) = create_ledger();
    let machine = machine();
    machine.add_items(&mut ledger, case_id(), &[1]).unwrap();
    handle.persist(&mut ledger).unwrap();
    let before = fs::read(handle.path()).unwrap();

    let err = machine
        .add_items(&mut ledger, case_id(), &[2, 1, 3])
        .unwrap_err();
    assert_eq!(err, CustodyError::DuplicateItem(1));
    assert_eq!(handle.persist(&mut ledger).unwrap(), 0);

    assert_eq!(fs::read(handle.path()).unwrap(), before);
    assert_eq!(ledger.len(), 2);
}

#[test]
fn test_remove_requires_checked_in() {
    let (_dir, _handle, mut ledger) = create_ledger();
    let machine = machine();
    machine.add_items(&mut ledger, case_id(), &[5]).unwrap();
    machine
        .apply(&mut ledger, &Operation::Checkout { item_id: 5 })
        .unwrap();

    let err = machine
        .apply(&mut ledger, &remove(5, RemovalReason::Destroyed, None))
        .unwrap_err();
    assert_eq!(
        err,
        CustodyError::ItemNotCheckedIn {
            item_id: 5,
            status: "CHECKEDOUT".to_string(),
        }
    );
}

#[test]
fn test_state_survives_reload() {
    let (_dir, handle, mut ledger) = create_ledger();
    let machine = machine();
    machine.add_items(&mut ledger, case_id(), &[8, 9]).unwrap();
    machine
        .apply(&mut ledger, &Operation::Checkout { item_id: 9 })
        .unwrap();
    handle.persist(&mut ledger).unwrap();

    let mut reloaded = handle.load().unwrap();
    assert_eq!(
        machine
            .apply(&mut reloaded, &Operation::Checkin { item_id: 8 })
            .unwrap_err(),
        CustodyError::AlreadyCheckedIn(8)
    );
    let record = machine
        .apply(&mut reloaded, &Operation::Checkin { item_id: 9 })
        .unwrap();
    assert_eq!(record.case_id(), case_id());
    assert_eq!(record.parent_digest(), digest_record(&ledger.records()[3]));
}
