//! Tamper-evidence digest linking each record to its predecessor
//!
//! The digest of a record is SHA-256 over a textual concatenation of its
//! logical fields, in this order:
//!
//! ```text
//! parent digest   hex text of the 256-bit integer, no leading zeros ("0" for genesis)
//! timestamp       shortest round-trip decimal, always with a fractional part
//! case id         hyphenated lowercase UUID
//! item id         decimal
//! status          status label
//! payload length  decimal
//! payload         UTF-8 text (invalid sequences replaced)
//! ```
//!
//! The hex digest is read as a 256-bit integer and packed as 32 little-endian
//! bytes. That byte layout is what the next record stores as its parent digest,
//! so changing any step here changes the on-disk format.

use std::fmt;

use sha2::{Digest, Sha256};

use super::record::Record;

/// Width of a parent digest on disk
pub const DIGEST_LEN: usize = 32;

/// A 256-bit unsigned integer stored as 32 little-endian bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerHash([u8; DIGEST_LEN]);

impl LedgerHash {
    /// The all-zero sentinel carried by the genesis record
    pub const ZERO: LedgerHash = LedgerHash([0u8; DIGEST_LEN]);

    /// Wraps little-endian bytes as read from disk
    pub fn from_le_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the little-endian bytes as written to disk
    pub fn as_le_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Builds a hash from a big-endian integer (the natural SHA-256 output order)
    pub fn from_be_bytes(mut bytes: [u8; DIGEST_LEN]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    /// Whether this is the genesis sentinel
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Parses the hex text of a 256-bit integer.
    ///
    /// Accepts an optional `0x` prefix and 1 to 64 hex digits.
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        if digits.is_empty()
            || digits.len() > DIGEST_LEN * 2
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }

        let padded = format!("{:0>width$}", digits, width = DIGEST_LEN * 2);
        let mut be = [0u8; DIGEST_LEN];
        for (i, byte) in be.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&padded[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self::from_be_bytes(be))
    }

    /// Hex text of the integer value, without leading zeros
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(DIGEST_LEN * 2);
        let mut significant = self.0.iter().rev().skip_while(|b| **b == 0);

        match significant.next() {
            None => out.push('0'),
            Some(first) => {
                out.push_str(&format!("{:x}", first));
                for byte in significant {
                    out.push_str(&format!("{:02x}", byte));
                }
            }
        }
        out
    }
}

impl Default for LedgerHash {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for LedgerHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for LedgerHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerHash({})", self.to_hex())
    }
}

/// Renders a timestamp the way it enters the digest.
///
/// Always carries a fractional part (`1700000000.0`, never `1700000000`).
pub fn timestamp_text(timestamp: f64) -> String {
    format!("{:?}", timestamp)
}

/// The exact text hashed for `record`.
pub fn canonical_text(record: &Record) -> String {
    format!(
        "{}{}{}{}{}{}{}",
        record.parent_digest().to_hex(),
        timestamp_text(record.timestamp()),
        record.case_id().hyphenated(),
        record.item_id(),
        record.status().label(),
        record.payload_length(),
        String::from_utf8_lossy(record.payload()),
    )
}

/// Computes the digest that the record following `record` must carry.
pub fn digest_record(record: &Record) -> LedgerHash {
    let digest = Sha256::digest(canonical_text(record).as_bytes());
    LedgerHash::from_be_bytes(digest.into())
}
