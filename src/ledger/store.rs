//! Ledger handle and in-memory record sequence
//!
//! `LedgerHandle` carries the resolved store path; nothing below it reads
//! the environment. `Ledger` is the loaded sequence plus:
//! - a watermark separating persisted records from records created in this
//!   invocation
//! - an item id -> latest position index, rebuilt on load, kept current on push

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::errors::{LedgerError, LedgerResult};
use super::reader::LedgerReader;
use super::record::Record;
use super::writer::LedgerWriter;
use crate::observability::{log_event_with_fields, Event};

/// Whether `open_or_init` found a ledger or had to create one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Records were already present
    Existing,
    /// Store was missing or empty; genesis was written
    Created,
}

/// Resolved location of one ledger store.
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    path: PathBuf,
}

impl LedgerHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the full record sequence.
    ///
    /// A missing or zero-length store loads as an empty ledger.
    pub fn load(&self) -> LedgerResult<Ledger> {
        let len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => {
                return Err(LedgerError::io_error(
                    format!("Failed to stat ledger: {}", self.path.display()),
                    e,
                ))
            }
        };

        if len == 0 {
            return Ok(Ledger::default());
        }

        let records = LedgerReader::open(&self.path)?
            .read_all()
            .map_err(|e| {
                if e.is_fatal() {
                    log_event_with_fields(
                        Event::LedgerCorruption,
                        &[
                            ("code", e.code().code()),
                            ("details", e.details().unwrap_or("")),
                            ("path", self.path.display().to_string().as_str()),
                        ],
                    );
                }
                e
            })?;
        log_event_with_fields(
            Event::LedgerLoaded,
            &[
                ("path", self.path.display().to_string().as_str()),
                ("records", records.len().to_string().as_str()),
            ],
        );
        Ok(Ledger::from_records(records))
    }

    /// Loads the ledger, synthesizing and persisting genesis if it is empty.
    pub fn open_or_init(&self, now: f64) -> LedgerResult<(Ledger, OpenOutcome)> {
        let mut ledger = self.load()?;
        if !ledger.is_empty() {
            return Ok((ledger, OpenOutcome::Existing));
        }

        ledger.push(Record::genesis(now));
        self.persist(&mut ledger)?;
        log_event_with_fields(
            Event::LedgerCreated,
            &[("path", self.path.display().to_string().as_str())],
        );
        Ok((ledger, OpenOutcome::Created))
    }

    /// Appends the records created since load, in creation order.
    ///
    /// Returns the number of bytes written. Already persisted records are
    /// never written again.
    pub fn persist(&self, ledger: &mut Ledger) -> LedgerResult<u64> {
        let pending = ledger.pending();
        if pending.is_empty() {
            return Ok(0);
        }

        let mut writer = LedgerWriter::open(&self.path)?;
        let written = writer.append(pending)?;
        log_event_with_fields(
            Event::RecordsAppended,
            &[
                ("bytes", written.to_string().as_str()),
                ("records", pending.len().to_string().as_str()),
            ],
        );
        ledger.mark_persisted();
        Ok(written)
    }
}

/// The ordered record sequence for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<Record>,
    persisted: usize,
    latest_by_item: HashMap<u32, usize>,
}

impl Ledger {
    /// Wraps records read from the store; all count as persisted.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut ledger = Self {
            records: Vec::with_capacity(records.len()),
            persisted: 0,
            latest_by_item: HashMap::new(),
        };
        for record in records {
            ledger.push(record);
        }
        ledger.persisted = ledger.records.len();
        ledger
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record new records chain onto
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Most recent record for an item. Genesis is never indexed.
    pub fn latest_for_item(&self, item_id: u32) -> Option<&Record> {
        self.latest_by_item
            .get(&item_id)
            .map(|&position| &self.records[position])
    }

    /// Records created in this invocation and not yet persisted
    pub fn pending(&self) -> &[Record] {
        &self.records[self.persisted..]
    }

    /// Appends a record to the in-memory sequence.
    pub fn push(&mut self, record: Record) {
        let position = self.records.len();
        if position > 0 {
            self.latest_by_item.insert(record.item_id(), position);
        }
        self.records.push(record);
    }

    fn mark_persisted(&mut self) {
        self.persisted = self.records.len();
    }
}
