//! Chain verifier
//!
//! Re-derives linkage and custody legality over the whole loaded sequence,
//! independently of the state machine that wrote it. Checks run in order:
//!
//! 1. Genesis well-formedness
//! 2. Parent digest continuity
//! 3. Parent digest uniqueness
//! 4. No record for an item after it reached a terminal status
//! 5. Per-item transitions (duplicates and other illegal moves)
//! 6. Payload/status consistency
//!
//! The verifier is read-only. It never touches the store.

use std::collections::{HashMap, HashSet};

use super::violation::{VerificationReport, Violation, ViolationKind};
use crate::ledger::{digest_record, LedgerHash, Record, Status, GENESIS_PAYLOAD};
use crate::observability::{log_event_with_fields, Event};

/// How much to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// Stop at the first violation
    #[default]
    FailFast,
    /// Collect every violation
    Strict,
}

struct Findings {
    mode: VerifyMode,
    violations: Vec<Violation>,
}

impl Findings {
    fn push(&mut self, violation: Violation) {
        log_event_with_fields(
            Event::VerifyViolation,
            &[
                ("item_id", violation.item_id.to_string().as_str()),
                ("kind", violation.kind.code()),
                ("position", violation.position.to_string().as_str()),
            ],
        );
        self.violations.push(violation);
    }

    fn done(&self) -> bool {
        self.mode == VerifyMode::FailFast && !self.violations.is_empty()
    }
}

/// Stateless chain verifier
pub struct ChainVerifier;

impl ChainVerifier {
    /// Walks the full sequence and reports violations.
    pub fn verify(records: &[Record], mode: VerifyMode) -> VerificationReport {
        log_event_with_fields(
            Event::VerifyBegin,
            &[("transactions", records.len().to_string().as_str())],
        );

        let mut findings = Findings {
            mode,
            violations: Vec::new(),
        };

        let checks: [fn(&[Record], &mut Findings); 6] = [
            check_genesis,
            check_parent_continuity,
            check_parent_uniqueness,
            check_after_removal,
            check_transitions,
            check_payloads,
        ];
        for check in checks {
            check(records, &mut findings);
            if findings.done() {
                break;
            }
        }

        let report = VerificationReport {
            transactions: records.len(),
            violations: findings.violations,
        };
        log_event_with_fields(
            Event::VerifyComplete,
            &[
                ("state", report.state_label()),
                ("transactions", report.transactions.to_string().as_str()),
                ("violations", report.violations.len().to_string().as_str()),
            ],
        );
        report
    }
}

fn check_genesis(records: &[Record], findings: &mut Findings) {
    let Some(genesis) = records.first() else {
        findings.push(Violation::new(
            ViolationKind::InvalidGenesis,
            0,
            0,
            "ledger holds no records",
        ));
        return;
    };

    if !genesis.is_genesis_shaped() {
        findings.push(Violation::new(
            ViolationKind::InvalidGenesis,
            0,
            genesis.item_id(),
            format!(
                "first record must be INITIAL with zero parent, case and item (found {})",
                genesis.status()
            ),
        ));
    } else if genesis.payload() != GENESIS_PAYLOAD {
        findings.push(Violation::new(
            ViolationKind::InvalidGenesis,
            0,
            0,
            "genesis payload is not the initial block marker",
        ));
    }
}

fn check_parent_continuity(records: &[Record], findings: &mut Findings) {
    for (position, pair) in records.windows(2).enumerate() {
        let expected = digest_record(&pair[0]);
        let found = pair[1].parent_digest();
        if found != expected {
            findings.push(Violation::new(
                ViolationKind::ParentMismatch,
                position + 1,
                pair[1].item_id(),
                format!("expected parent {}, found {}", expected, found),
            ));
            if findings.done() {
                return;
            }
        }
    }
}

fn check_parent_uniqueness(records: &[Record], findings: &mut Findings) {
    let mut seen: HashMap<LedgerHash, usize> = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        if let Some(first) = seen.insert(record.parent_digest(), position) {
            findings.push(Violation::new(
                ViolationKind::DuplicateParent,
                position,
                record.item_id(),
                format!("parent {} already used at position {}", record.parent_digest(), first),
            ));
            if findings.done() {
                return;
            }
        }
    }
}

fn check_after_removal(records: &[Record], findings: &mut Findings) {
    let mut removed_at: HashMap<u32, usize> = HashMap::new();
    for (position, record) in records.iter().enumerate().skip(1) {
        if let Some(&removed) = removed_at.get(&record.item_id()) {
            findings.push(Violation::new(
                ViolationKind::ModifiedAfterRemoval,
                position,
                record.item_id(),
                format!(
                    "{} recorded after removal at position {}",
                    record.status(),
                    removed
                ),
            ));
            if findings.done() {
                return;
            }
        } else if record.status().is_terminal() {
            removed_at.insert(record.item_id(), position);
        }
    }
}

fn check_transitions(records: &[Record], findings: &mut Findings) {
    let mut previous: HashMap<u32, Status> = HashMap::new();
    let mut removed: HashSet<u32> = HashSet::new();

    for (position, record) in records.iter().enumerate().skip(1) {
        let item_id = record.item_id();
        if removed.contains(&item_id) {
            continue;
        }

        let status = record.status();
        let prior = previous.get(&item_id);
        let violation = match (prior, status) {
            (_, Status::Unrecognized(_)) => continue,
            (_, Status::Initial) => Some((
                ViolationKind::IllegalTransition,
                "INITIAL outside the genesis position".to_string(),
            )),
            (Some(p), s) if p == s => Some((
                ViolationKind::DuplicateTransition,
                format!("{} twice without an opposite transition", s),
            )),
            (None, Status::CheckedIn) => None,
            (Some(Status::CheckedOut), Status::CheckedIn) => None,
            (Some(Status::CheckedIn), Status::CheckedOut) => None,
            (Some(Status::CheckedIn), s) if s.is_terminal() => None,
            (p, s) => Some((
                ViolationKind::IllegalTransition,
                format!(
                    "{} cannot follow {}",
                    s,
                    p.map(Status::label).unwrap_or("ABSENT")
                ),
            )),
        };

        if let Some((kind, detail)) = violation {
            findings.push(Violation::new(kind, position, item_id, detail));
            if findings.done() {
                return;
            }
        }

        if status.is_terminal() {
            removed.insert(item_id);
        }
        if status != &Status::Initial {
            previous.insert(item_id, status.clone());
        }
    }
}

fn check_payloads(records: &[Record], findings: &mut Findings) {
    for (position, record) in records.iter().enumerate() {
        let violation = match record.status() {
            Status::Released if record.payload_text().trim().is_empty() => Some((
                ViolationKind::InvalidPayload,
                "RELEASED without the lawful owner".to_string(),
            )),
            Status::Unrecognized(label) => Some((
                ViolationKind::InvalidStatus,
                format!("unknown status '{}'", label),
            )),
            _ => None,
        };

        if let Some((kind, detail)) = violation {
            findings.push(Violation::new(kind, position, record.item_id(), detail));
            if findings.done() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Chain {
        records: Vec<Record>,
    }

    impl Chain {
        fn new() -> Self {
            Self {
                records: vec![Record::genesis(1_700_000_000.0)],
            }
        }

        fn push(mut self, item_id: u32, status: Status, payload: &[u8]) -> Self {
            let last = self.records.last().unwrap();
            let record = Record::new(
                digest_record(last),
                last.timestamp() + 1.0,
                Uuid::nil(),
                item_id,
                status,
                payload.to_vec(),
            );
            self.records.push(record);
            self
        }
    }

    fn kinds(report: &VerificationReport) -> Vec<ViolationKind> {
        report.violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_clean_chain() {
        let chain = Chain::new()
            .push(1, Status::CheckedIn, b"")
            .push(1, Status::CheckedOut, b"")
            .push(1, Status::CheckedIn, b"")
            .push(1, Status::Released, b"Jane Doe");
        let report = ChainVerifier::verify(&chain.records, VerifyMode::Strict);
        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.transactions, 5);
    }

    #[test]
    fn test_empty_sequence_has_no_genesis() {
        let report = ChainVerifier::verify(&[], VerifyMode::FailFast);
        assert_eq!(kinds(&report), vec![ViolationKind::InvalidGenesis]);
        assert_eq!(report.transactions, 0);
    }

    #[test]
    fn test_parent_mismatch_position() {
        let mut chain = Chain::new()
            .push(1, Status::CheckedIn, b"")
            .push(2, Status::CheckedIn, b"");
        let tampered = chain.records[1].clone();
        chain.records[1] = Record::new(
            tampered.parent_digest(),
            tampered.timestamp(),
            tampered.case_id(),
            99,
            Status::CheckedIn,
            Vec::new(),
        );

        let report = ChainVerifier::verify(&chain.records, VerifyMode::FailFast);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::ParentMismatch);
        assert_eq!(report.violations[0].position, 2);
    }

    #[test]
    fn test_duplicate_parent() {
        let mut chain = Chain::new().push(1, Status::CheckedIn, b"");
        let copy = chain.records[1].clone();
        chain.records.push(copy);

        let report = ChainVerifier::verify(&chain.records, VerifyMode::Strict);
        assert!(report.has(ViolationKind::DuplicateParent));
        assert!(report.has(ViolationKind::ParentMismatch));
    }

    #[test]
    fn test_modified_after_removal() {
        let chain = Chain::new()
            .push(3, Status::CheckedIn, b"")
            .push(3, Status::Disposed, b"")
            .push(3, Status::CheckedOut, b"");
        let report = ChainVerifier::verify(&chain.records, VerifyMode::FailFast);
        assert_eq!(kinds(&report), vec![ViolationKind::ModifiedAfterRemoval]);
        assert_eq!(report.violations[0].position, 3);
    }

    #[test]
    fn test_duplicate_transition_not_only_adjacent() {
        let chain = Chain::new()
            .push(1, Status::CheckedIn, b"")
            .push(2, Status::CheckedIn, b"")
            .push(1, Status::CheckedOut, b"")
            .push(2, Status::CheckedOut, b"")
            .push(1, Status::CheckedOut, b"");
        let report = ChainVerifier::verify(&chain.records, VerifyMode::FailFast);
        assert_eq!(kinds(&report), vec![ViolationKind::DuplicateTransition]);
        assert_eq!(report.violations[0].position, 5);
        assert_eq!(report.violations[0].item_id, 1);
    }

    #[test]
    fn test_checkout_before_add_is_illegal() {
        let chain = Chain::new().push(4, Status::CheckedOut, b"");
        let report = ChainVerifier::verify(&chain.records, VerifyMode::FailFast);
        assert_eq!(kinds(&report), vec![ViolationKind::IllegalTransition]);
    }

    #[test]
    fn test_release_without_owner() {
        let chain = Chain::new()
            .push(1, Status::CheckedIn, b"")
            .push(1, Status::Released, b"");
        let report = ChainVerifier::verify(&chain.records, VerifyMode::FailFast);
        assert_eq!(kinds(&report), vec![ViolationKind::InvalidPayload]);
    }

    #[test]
    fn test_unknown_status() {
        let chain = Chain::new()
            .push(1, Status::CheckedIn, b"")
            .push(1, Status::Unrecognized("LOST".to_string()), b"");
        let report = ChainVerifier::verify(&chain.records, VerifyMode::FailFast);
        assert_eq!(kinds(&report), vec![ViolationKind::InvalidStatus]);
    }

    #[test]
    fn test_fail_fast_stops_at_first() {
        let chain = Chain::new()
            .push(1, Status::CheckedOut, b"")
            .push(2, Status::CheckedIn, b"")
            .push(2, Status::Released, b"");

        let fast = ChainVerifier::verify(&chain.records, VerifyMode::FailFast);
        assert_eq!(fast.violations.len(), 1);

        let strict = ChainVerifier::verify(&chain.records, VerifyMode::Strict);
        assert_eq!(
            kinds(&strict),
            vec![ViolationKind::IllegalTransition, ViolationKind::InvalidPayload]
        );
    }

    #[test]
    fn test_genesis_with_nonzero_item() {
        let mut records = Chain::new().records;
        let g = records[0].clone();
        records[0] = Record::new(
            g.parent_digest(),
            g.timestamp(),
            g.case_id(),
            5,
            Status::Initial,
            g.payload().to_vec(),
        );
        let report = ChainVerifier::verify(&records, VerifyMode::FailFast);
        assert_eq!(kinds(&report), vec![ViolationKind::InvalidGenesis]);
    }
}
