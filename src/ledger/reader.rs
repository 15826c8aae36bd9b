//! Ledger reader with strict corruption detection
//!
//! - The genesis record is read first and must declare a 14-byte payload
//! - Each following record is read by consuming its 76-byte prefix, learning
//!   the payload length from it, then consuming the payload
//! - End of input on a record boundary ends the scan cleanly
//! - End of input inside a record is `TruncatedLedger`
//! - No repair attempts, no skipping
//!
//! The reader does not check chain linkage or custody rules.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::errors::{LedgerError, LedgerResult};
use super::record::{peek_payload_length, Record, GENESIS_PAYLOAD, PREFIX_LEN};

/// Sequential reader over any byte source.
pub struct LedgerReader<R> {
    source: R,
    /// Byte offset of the next record
    offset: u64,
    /// Position of the next record in the sequence
    position: usize,
}

impl LedgerReader<BufReader<File>> {
    /// Opens a ledger file for reading.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let file = File::open(path).map_err(|e| {
            LedgerError::io_error(format!("Failed to open ledger: {}", path.display()), e)
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> LedgerReader<R> {
    /// Wraps a byte source positioned at the start of a ledger
    pub fn new(source: R) -> Self {
        Self {
            source,
            offset: 0,
            position: 0,
        }
    }

    /// Byte offset of the next record
    pub fn current_offset(&self) -> u64 {
        self.offset
    }

    /// Reads as many bytes as are available, up to `buf.len()`.
    fn fill(&mut self, buf: &mut [u8]) -> LedgerResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(LedgerError::io_error(
                        format!("Failed to read record at byte offset {}", self.offset),
                        e,
                    ))
                }
            }
        }
        Ok(filled)
    }

    /// Reads the next record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if a record was read
    /// - `Ok(None)` at a clean end of input
    /// - `Err(TruncatedLedger)` if the input ends inside a record
    /// - `Err(MalformedRecord)` if the record cannot be decoded
    pub fn read_next(&mut self) -> LedgerResult<Option<Record>> {
        let start = self.offset;
        let position = self.position;

        let mut prefix = [0u8; PREFIX_LEN];
        let got = self.fill(&mut prefix)?;
        if got == 0 {
            return Ok(None);
        }
        if got < PREFIX_LEN {
            return Err(LedgerError::truncated_at(
                position,
                start,
                format!("Record prefix truncated: {} of {} bytes", got, PREFIX_LEN),
            ));
        }

        let payload_length = peek_payload_length(&prefix)?;
        if position == 0 && payload_length as usize != GENESIS_PAYLOAD.len() {
            return Err(LedgerError::malformed_at(
                position,
                start,
                format!(
                    "Genesis payload length must be {}, found {}",
                    GENESIS_PAYLOAD.len(),
                    payload_length
                ),
            ));
        }

        let mut buf = Vec::with_capacity(PREFIX_LEN + 64);
        buf.extend_from_slice(&prefix);
        let got = (&mut self.source)
            .take(payload_length as u64)
            .read_to_end(&mut buf)
            .map_err(|e| {
                LedgerError::io_error(format!("Failed to read payload at byte offset {}", start), e)
            })?;
        if got < payload_length as usize {
            return Err(LedgerError::truncated_at(
                position,
                start,
                format!("Payload truncated: {} of {} bytes", got, payload_length),
            ));
        }

        let record = Record::decode(&buf, payload_length)
            .map_err(|e| LedgerError::malformed_at(position, start, e.message()))?;

        self.offset += buf.len() as u64;
        self.position += 1;

        Ok(Some(record))
    }

    /// Reads every remaining record. Any corruption fails the whole load.
    pub fn read_all(&mut self) -> LedgerResult<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::digest::{digest_record, LedgerHash};
    use crate::ledger::errors::LedgerErrorCode;
    use crate::ledger::record::Status;
    use std::io::Cursor;
    use uuid::Uuid;

    fn chain_bytes() -> (Vec<Record>, Vec<u8>) {
        let genesis = Record::genesis(1_700_000_000.0);
        let added = Record::new(
            digest_record(&genesis),
            1_700_000_001.0,
            Uuid::new_v4(),
            7,
            Status::CheckedIn,
            Vec::new(),
        );
        let released = Record::new(
            digest_record(&added),
            1_700_000_002.0,
            added.case_id(),
            7,
            Status::Released,
            b"Jane Doe".to_vec(),
        );
        let records = vec![genesis, added, released];
        let bytes = records.iter().flat_map(Record::encode).collect();
        (records, bytes)
    }

    #[test]
    fn test_read_empty_input() {
        let mut reader = LedgerReader::new(Cursor::new(Vec::new()));
        assert!(reader.read_next().unwrap().is_none());
    }

    #[test]
    fn test_read_all_records() {
        let (records, bytes) = chain_bytes();
        let mut reader = LedgerReader::new(Cursor::new(bytes.clone()));
        let loaded = reader.read_all().unwrap();
        assert_eq!(loaded, records);
        assert_eq!(reader.current_offset(), bytes.len() as u64);
    }

    #[test]
    fn test_truncated_prefix() {
        let (_, bytes) = chain_bytes();
        let cut = PREFIX_LEN + 14 + 10;
        let mut reader = LedgerReader::new(Cursor::new(bytes[..cut].to_vec()));
        let err = reader.read_all().unwrap_err();
        assert_eq!(err.code(), LedgerErrorCode::TruncatedLedger);
        assert!(err.details().unwrap().contains("position: 1"));
    }

    #[test]
    fn test_truncated_payload() {
        let (_, bytes) = chain_bytes();
        let mut reader = LedgerReader::new(Cursor::new(bytes[..bytes.len() - 3].to_vec()));
        let err = reader.read_all().unwrap_err();
        assert_eq!(err.code(), LedgerErrorCode::TruncatedLedger);
        assert!(err.message().contains("Payload truncated"));
    }

    #[test]
    fn test_genesis_with_wrong_payload_length() {
        let bogus = Record::new(LedgerHash::ZERO, 1.0, Uuid::nil(), 0, Status::Initial, b"x".to_vec());
        let mut reader = LedgerReader::new(Cursor::new(bogus.encode()));
        let err = reader.read_next().unwrap_err();
        assert_eq!(err.code(), LedgerErrorCode::MalformedRecord);
    }
}
