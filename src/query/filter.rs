//! Record filtering for the log view
//!
//! Criteria are optional and AND-ed. Exact match only.

use uuid::Uuid;

use crate::ledger::Record;

/// Which records a log view yields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordFilter {
    pub item_id: Option<u32>,
    pub case_id: Option<Uuid>,
}

impl RecordFilter {
    /// Matches every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item_id: u32) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn with_case(mut self, case_id: Uuid) -> Self {
        self.case_id = Some(case_id);
        self
    }

    /// Checks a record against all criteria
    pub fn matches(&self, record: &Record) -> bool {
        self.item_id.map_or(true, |id| record.item_id() == id)
            && self.case_id.map_or(true, |id| record.case_id() == id)
    }
}
