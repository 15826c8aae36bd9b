//! Ledger record format
//!
//! Every record is a fixed 76-byte prefix followed by a variable payload:
//!
//! ```text
//! +------------------+
//! | Parent Digest    | (32 bytes, little-endian u256)
//! +------------------+
//! | Timestamp        | (f64 LE, seconds since epoch)
//! +------------------+
//! | Case ID          | (16 bytes, little-endian u128 of the UUID)
//! +------------------+
//! | Item ID          | (u32 LE)
//! +------------------+
//! | Status           | (12 bytes ASCII, NUL padded)
//! +------------------+
//! | Payload Length   | (u32 LE)
//! +------------------+
//! | Payload          | (payload length bytes, UTF-8)
//! +------------------+
//! ```
//!
//! There is no record header, checksum or delimiter. Chain integrity comes
//! from the parent digest alone.

use std::fmt;

use uuid::Uuid;

use super::digest::{LedgerHash, DIGEST_LEN};
use super::errors::{LedgerError, LedgerResult};

/// Size of the fixed prefix of every record
pub const PREFIX_LEN: usize = 76;

/// Width of the NUL padded status field
pub const STATUS_LEN: usize = 12;

/// Payload of the genesis record
pub const GENESIS_PAYLOAD: &[u8] = b"Initial block\0";

const TIMESTAMP_OFFSET: usize = DIGEST_LEN;
const CASE_ID_OFFSET: usize = TIMESTAMP_OFFSET + 8;
const ITEM_ID_OFFSET: usize = CASE_ID_OFFSET + 16;
const STATUS_OFFSET: usize = ITEM_ID_OFFSET + 4;
const PAYLOAD_LEN_OFFSET: usize = STATUS_OFFSET + STATUS_LEN;

/// Custody status of a record.
///
/// Anything that decodes as UTF-8 but is not one of the six known labels is
/// kept verbatim so the verifier can report it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// Genesis marker
    Initial,
    /// Item is in the evidence room
    CheckedIn,
    /// Item is out with a custodian
    CheckedOut,
    /// Item was disposed of (terminal)
    Disposed,
    /// Item was destroyed (terminal)
    Destroyed,
    /// Item was released to its lawful owner (terminal)
    Released,
    /// Label outside the known set
    Unrecognized(String),
}

impl Status {
    /// Parses a status label. Unknown labels are preserved, not rejected.
    pub fn from_label(label: &str) -> Self {
        match label {
            "INITIAL" => Status::Initial,
            "CHECKEDIN" => Status::CheckedIn,
            "CHECKEDOUT" => Status::CheckedOut,
            "DISPOSED" => Status::Disposed,
            "DESTROYED" => Status::Destroyed,
            "RELEASED" => Status::Released,
            other => Status::Unrecognized(other.to_string()),
        }
    }

    /// The label as stored on disk, without padding
    pub fn label(&self) -> &str {
        match self {
            Status::Initial => "INITIAL",
            Status::CheckedIn => "CHECKEDIN",
            Status::CheckedOut => "CHECKEDOUT",
            Status::Disposed => "DISPOSED",
            Status::Destroyed => "DESTROYED",
            Status::Released => "RELEASED",
            Status::Unrecognized(label) => label,
        }
    }

    /// No custody event may follow a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Disposed | Status::Destroyed | Status::Released)
    }

    /// Whether the label is one of the known statuses
    pub fn is_known(&self) -> bool {
        !matches!(self, Status::Unrecognized(_))
    }

    fn to_field(&self) -> [u8; STATUS_LEN] {
        let mut field = [0u8; STATUS_LEN];
        let bytes = self.label().as_bytes();
        let len = bytes.len().min(STATUS_LEN);
        field[..len].copy_from_slice(&bytes[..len]);
        field
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One immutable custody event.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    parent_digest: LedgerHash,
    timestamp: f64,
    case_id: Uuid,
    item_id: u32,
    status: Status,
    payload: Vec<u8>,
}

/// Rounds seconds since epoch to whole microseconds
pub fn round_to_micros(timestamp: f64) -> f64 {
    (timestamp * 1_000_000.0).round() / 1_000_000.0
}

impl Record {
    /// Creates a record. The timestamp is rounded to microseconds.
    pub fn new(
        parent_digest: LedgerHash,
        timestamp: f64,
        case_id: Uuid,
        item_id: u32,
        status: Status,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            parent_digest,
            timestamp: round_to_micros(timestamp),
            case_id,
            item_id,
            status,
            payload,
        }
    }

    /// The mandatory first record of every ledger
    pub fn genesis(timestamp: f64) -> Self {
        Self::new(
            LedgerHash::ZERO,
            timestamp,
            Uuid::nil(),
            0,
            Status::Initial,
            GENESIS_PAYLOAD.to_vec(),
        )
    }

    pub fn parent_digest(&self) -> LedgerHash {
        self.parent_digest
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn case_id(&self) -> Uuid {
        self.case_id
    }

    pub fn item_id(&self) -> u32 {
        self.item_id
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload decoded as text, as shown to operators
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload)
            .trim_end_matches('\0')
            .to_string()
    }

    pub fn payload_length(&self) -> u32 {
        self.payload.len() as u32
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        PREFIX_LEN + self.payload.len()
    }

    /// Whether every field carries the genesis sentinel values
    pub fn is_genesis_shaped(&self) -> bool {
        self.status == Status::Initial
            && self.parent_digest.is_zero()
            && self.case_id.is_nil()
            && self.item_id == 0
    }

    /// Encodes the record. The parent digest is written as supplied.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());

        buf.extend_from_slice(self.parent_digest.as_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.case_id.as_u128().to_le_bytes());
        buf.extend_from_slice(&self.item_id.to_le_bytes());
        buf.extend_from_slice(&self.status.to_field());
        buf.extend_from_slice(&self.payload_length().to_le_bytes());
        buf.extend_from_slice(&self.payload);

        buf
    }

    /// Decodes one record whose payload is `payload_length` bytes.
    ///
    /// Fails with `MalformedRecord` when `data` is shorter than the full
    /// record, when the stored length disagrees with `payload_length`, or when
    /// the status field is not UTF-8. Trailing bytes beyond the record are
    /// ignored.
    pub fn decode(data: &[u8], payload_length: u32) -> LedgerResult<Self> {
        let total = PREFIX_LEN + payload_length as usize;
        if data.len() < total {
            return Err(LedgerError::malformed(format!(
                "Record too short: need {} bytes, got {}",
                total,
                data.len()
            )));
        }

        let stored_length = peek_payload_length(data)?;
        if stored_length != payload_length {
            return Err(LedgerError::malformed(format!(
                "Payload length mismatch: prefix declares {}, caller supplied {}",
                stored_length, payload_length
            )));
        }

        let mut parent = [0u8; DIGEST_LEN];
        parent.copy_from_slice(&data[..DIGEST_LEN]);

        let mut timestamp = [0u8; 8];
        timestamp.copy_from_slice(&data[TIMESTAMP_OFFSET..CASE_ID_OFFSET]);

        let mut case_id = [0u8; 16];
        case_id.copy_from_slice(&data[CASE_ID_OFFSET..ITEM_ID_OFFSET]);

        let mut item_id = [0u8; 4];
        item_id.copy_from_slice(&data[ITEM_ID_OFFSET..STATUS_OFFSET]);

        let status_field = &data[STATUS_OFFSET..PAYLOAD_LEN_OFFSET];
        let label = std::str::from_utf8(status_field)
            .map_err(|e| LedgerError::malformed(format!("Status is not valid UTF-8: {}", e)))?
            .trim_end_matches('\0');

        Ok(Self {
            parent_digest: LedgerHash::from_le_bytes(parent),
            timestamp: f64::from_le_bytes(timestamp),
            case_id: Uuid::from_u128(u128::from_le_bytes(case_id)),
            item_id: u32::from_le_bytes(item_id),
            status: Status::from_label(label),
            payload: data[PREFIX_LEN..total].to_vec(),
        })
    }
}

/// Reads the payload length out of a record prefix.
pub fn peek_payload_length(prefix: &[u8]) -> LedgerResult<u32> {
    if prefix.len() < PREFIX_LEN {
        return Err(LedgerError::malformed(format!(
            "Record prefix too short: need {} bytes, got {}",
            PREFIX_LEN,
            prefix.len()
        )));
    }
    let mut len = [0u8; 4];
    len.copy_from_slice(&prefix[PAYLOAD_LEN_OFFSET..PREFIX_LEN]);
    Ok(u32::from_le_bytes(len))
}
