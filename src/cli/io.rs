//! Output rendering for the CLI
//!
//! - Text output: one `Key: value` line per field, records separated by a
//!   blank line
//! - JSON output: a single object per invocation on stdout
//! - Timestamps are shown as ISO 8601 UTC with microseconds

use std::io::Write;

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::errors::CliResult;
use crate::ledger::{digest_record, timestamp_text, Record, Status};

/// Renders seconds since epoch as `YYYY-MM-DDTHH:MM:SS.ffffffZ`
pub fn format_timestamp(timestamp: f64) -> String {
    let micros = (timestamp * 1_000_000.0).round() as i64;
    match DateTime::from_timestamp_micros(micros) {
        Some(at) => at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
        None => timestamp_text(timestamp),
    }
}

/// JSON shape of one record
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub case_id: Uuid,
    pub item_id: u32,
    pub action: String,
    pub time: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub parent_digest: String,
    pub digest: String,
}

impl RecordView {
    pub fn from_record(record: &Record) -> Self {
        let owner = match record.status() {
            Status::Released => Some(record.payload_text()),
            _ => None,
        };
        Self {
            case_id: record.case_id(),
            item_id: record.item_id(),
            action: record.status().label().to_string(),
            time: format_timestamp(record.timestamp()),
            timestamp: record.timestamp(),
            owner,
            parent_digest: record.parent_digest().to_hex(),
            digest: digest_record(record).to_hex(),
        }
    }
}

/// Write one record as text
pub fn write_record_text<W: Write>(out: &mut W, record: &Record) -> CliResult<()> {
    writeln!(out, "Case: {}", record.case_id())?;
    writeln!(out, "Item: {}", record.item_id())?;
    writeln!(out, "Action: {}", record.status())?;
    writeln!(out, "Time: {}", format_timestamp(record.timestamp()))?;
    if let Status::Released = record.status() {
        writeln!(out, "Owner: {}", record.payload_text())?;
    }
    Ok(())
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_json(out, &response)
}

/// Write an error response carrying the data that explains it
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message,
        "data": data
    });
    write_json(out, &response)
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
