//! Verification findings

use std::fmt;

use serde::Serialize;

/// Kinds of chain violations, in the order the verifier looks for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// Position 0 is missing or does not carry the genesis sentinels
    InvalidGenesis,
    /// Parent digest differs from the digest of the preceding record
    ParentMismatch,
    /// Two records name the same parent (a fork)
    DuplicateParent,
    /// An item appears again after reaching a terminal status
    ModifiedAfterRemoval,
    /// Same status twice for an item with no opposite status in between
    DuplicateTransition,
    /// Any other move the custody state machine does not allow
    IllegalTransition,
    /// RELEASED without an owner
    InvalidPayload,
    /// Status outside the known set
    InvalidStatus,
}

impl ViolationKind {
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::InvalidGenesis => "INVALID_GENESIS",
            ViolationKind::ParentMismatch => "PARENT_MISMATCH",
            ViolationKind::DuplicateParent => "DUPLICATE_PARENT",
            ViolationKind::ModifiedAfterRemoval => "MODIFIED_AFTER_REMOVAL",
            ViolationKind::DuplicateTransition => "DUPLICATE_TRANSITION",
            ViolationKind::IllegalTransition => "ILLEGAL_TRANSITION",
            ViolationKind::InvalidPayload => "INVALID_PAYLOAD",
            ViolationKind::InvalidStatus => "INVALID_STATUS",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One violation, located by sequence position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Index of the offending record in the sequence
    pub position: usize,
    pub item_id: u32,
    pub detail: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, position: usize, item_id: u32, detail: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            item_id,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at position {} (item {}): {}",
            self.kind, self.position, self.item_id, self.detail
        )
    }
}

/// Outcome of a verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Number of records walked, genesis included
    pub transactions: usize,
    pub violations: Vec<Violation>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// `CLEAN` or `ERROR`
    pub fn state_label(&self) -> &'static str {
        if self.is_clean() {
            "CLEAN"
        } else {
            "ERROR"
        }
    }

    /// Whether a violation of `kind` was reported
    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}
