//! Append-only ledger writer with fsync enforcement
//!
//! The ledger file is only ever opened in append mode. Existing bytes are
//! never rewritten; each record is encoded and written exactly once.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::errors::{LedgerError, LedgerResult};
use super::record::Record;

/// Writer that appends encoded records to the ledger file.
pub struct LedgerWriter {
    file: File,
    current_offset: u64,
}

impl LedgerWriter {
    /// Opens (creating if needed) the ledger file in append mode.
    ///
    /// Creates parent directories if they are missing.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    LedgerError::io_error(
                        format!("Failed to create ledger directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LedgerError::io_error(format!("Failed to open ledger: {}", path.display()), e)
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| LedgerError::io_error("Failed to read ledger metadata", e))?
            .len();

        Ok(Self {
            file,
            current_offset,
        })
    }

    /// Byte offset at which the next record will land
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Appends records in order and fsyncs once.
    ///
    /// Returns the number of bytes written.
    pub fn append(&mut self, records: &[Record]) -> LedgerResult<u64> {
        let mut written = 0u64;

        for record in records {
            let bytes = record.encode();
            self.file.write_all(&bytes).map_err(|e| {
                LedgerError::io_error(
                    format!(
                        "Failed to append record for item {} at byte offset {}",
                        record.item_id(),
                        self.current_offset
                    ),
                    e,
                )
            })?;
            self.current_offset += bytes.len() as u64;
            written += bytes.len() as u64;
        }

        self.file
            .sync_all()
            .map_err(|e| LedgerError::io_error("fsync failed after append", e))?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::reader::LedgerReader;
    use tempfile::TempDir;

    #[test]
    fn test_writer_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("ledger.bin");

        let writer = LedgerWriter::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(writer.current_offset(), 0);
    }

    #[test]
    fn test_append_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.bin");
        let genesis = Record::genesis(1_700_000_000.0);

        let written = {
            let mut writer = LedgerWriter::open(&path).unwrap();
            writer.append(std::slice::from_ref(&genesis)).unwrap()
        };
        assert_eq!(written, 90);

        let mut reader = LedgerReader::open(&path).unwrap();
        assert_eq!(reader.read_all().unwrap(), vec![genesis]);
    }

    #[test]
    fn test_reopen_appends_after_existing_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.bin");
        let genesis = Record::genesis(1_700_000_000.0);

        LedgerWriter::open(&path)
            .unwrap()
            .append(std::slice::from_ref(&genesis))
            .unwrap();
        let before = fs::read(&path).unwrap();

        let mut writer = LedgerWriter::open(&path).unwrap();
        assert_eq!(writer.current_offset(), 90);
        writer.append(&[]).unwrap();

        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
