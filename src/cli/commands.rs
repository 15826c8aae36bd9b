//! CLI command implementations
//!
//! Each command resolves the ledger, runs exactly one engine operation and
//! renders the result. Mutating commands persist only the records they
//! created. `log` and `verify` never write.

use std::io::{self, Write};

use serde_json::json;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::custody::{Clock, CustodyMachine, Operation, RemovalReason, SystemClock};
use crate::ledger::{
    digest_record, Ledger, LedgerHandle, OpenOutcome, Record, Status, GENESIS_PAYLOAD,
};
use crate::observability::Logger;
use crate::query::{LogQuery, Order, RecordFilter};
use crate::verify::{ChainVerifier, VerificationReport, VerifyMode};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{format_timestamp, write_error, write_record_text, write_response, RecordView};

/// Parse arguments, resolve configuration and run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = LedgerConfig::resolve(cli.file, cli.log_level.as_deref())?;
    Logger::set_threshold(config.log_level);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&config, cli.command, &SystemClock, &mut out)
}

/// Run the appropriate command based on CLI args
pub fn run_command<C: Clock, W: Write>(
    config: &LedgerConfig,
    command: Command,
    clock: &C,
    out: &mut W,
) -> CliResult<()> {
    let handle = config.handle();
    match command {
        Command::Init => init(&handle, clock, out),
        Command::Add { case_id, item_ids } => add(&handle, clock, case_id, &item_ids, out),
        Command::Checkout { item_id } => {
            transition(&handle, clock, item_id, Transition::Checkout, out)
        }
        Command::Checkin { item_id } => {
            transition(&handle, clock, item_id, Transition::Checkin, out)
        }
        Command::Remove {
            item_id,
            reason,
            owner,
        } => {
            let reason: RemovalReason = reason.parse()?;
            transition(
                &handle,
                clock,
                item_id,
                Transition::Remove { reason, owner },
                out,
            )
        }
        Command::Log {
            reverse,
            num_entries,
            case_id,
            item_id,
            json,
        } => {
            let query = LogQuery {
                filter: RecordFilter { item_id, case_id },
                order: if reverse {
                    Order::Reverse
                } else {
                    Order::Chronological
                },
                limit: num_entries,
            };
            log(&handle, &query, json, out)
        }
        Command::Verify { strict, json } => {
            let mode = if strict {
                VerifyMode::Strict
            } else {
                VerifyMode::FailFast
            };
            verify(&handle, mode, json, out)
        }
    }
}

/// Create the ledger with its genesis record, or confirm an existing one.
pub fn init<C: Clock, W: Write>(handle: &LedgerHandle, clock: &C, out: &mut W) -> CliResult<()> {
    let (ledger, outcome) = handle.open_or_init(clock.now())?;
    match outcome {
        OpenOutcome::Created => {
            writeln!(out, "Blockchain file not found. Created INITIAL block.")?;
        }
        OpenOutcome::Existing => {
            require_genesis(&ledger)?;
            writeln!(out, "Blockchain file found with INITIAL block.")?;
        }
    }
    Ok(())
}

/// Add items to a case, one record per item.
pub fn add<C: Clock, W: Write>(
    handle: &LedgerHandle,
    clock: &C,
    case_id: Uuid,
    item_ids: &[u32],
    out: &mut W,
) -> CliResult<()> {
    let mut ledger = open_ledger(handle, clock)?;
    let machine = CustodyMachine::new(clock);
    let records = machine.add_items(&mut ledger, case_id, item_ids)?;
    handle.persist(&mut ledger)?;

    writeln!(out, "Case: {}", case_id)?;
    for record in &records {
        writeln!(out, "Added item: {}", record.item_id())?;
        writeln!(out, "  Status: {}", record.status())?;
        writeln!(out, "  Time of action: {}", format_timestamp(record.timestamp()))?;
    }
    Ok(())
}

/// A custody move on an item that is already in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Checkout,
    Checkin,
    Remove {
        reason: RemovalReason,
        owner: Option<String>,
    },
}

impl Transition {
    fn verb(&self) -> &'static str {
        match self {
            Transition::Checkout => "Checked out item",
            Transition::Checkin => "Checked in item",
            Transition::Remove { .. } => "Removed item",
        }
    }

    fn into_operation(self, item_id: u32) -> Operation {
        match self {
            Transition::Checkout => Operation::Checkout { item_id },
            Transition::Checkin => Operation::Checkin { item_id },
            Transition::Remove { reason, owner } => Operation::Remove {
                item_id,
                reason,
                owner,
            },
        }
    }
}

/// Apply a checkout, checkin or removal and persist it.
pub fn transition<C: Clock, W: Write>(
    handle: &LedgerHandle,
    clock: &C,
    item_id: u32,
    change: Transition,
    out: &mut W,
) -> CliResult<()> {
    let mut ledger = open_ledger(handle, clock)?;
    let machine = CustodyMachine::new(clock);
    let verb = change.verb();
    let record = machine.apply(&mut ledger, &change.into_operation(item_id))?;
    handle.persist(&mut ledger)?;

    writeln!(out, "Case: {}", record.case_id())?;
    writeln!(out, "{}: {}", verb, record.item_id())?;
    writeln!(out, "  Status: {}", record.status())?;
    if let Status::Released = record.status() {
        writeln!(out, "  Owner info: {}", record.payload_text())?;
    }
    writeln!(out, "  Time of action: {}", format_timestamp(record.timestamp()))?;
    Ok(())
}

/// Show ledger entries matching `query`.
pub fn log<W: Write>(
    handle: &LedgerHandle,
    query: &LogQuery,
    json: bool,
    out: &mut W,
) -> CliResult<()> {
    let ledger = handle.load()?;
    let view = query.view(ledger.records());

    if json {
        let records: Vec<RecordView> = view.map(RecordView::from_record).collect();
        return write_response(out, json!({ "records": records }));
    }

    for (i, record) in view.enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        write_record_text(out, record)?;
    }
    Ok(())
}

/// Walk the ledger and report its integrity.
///
/// A dirty ledger is reported on `out` and then returned as an error so the
/// process exits non-zero.
pub fn verify<W: Write>(
    handle: &LedgerHandle,
    mode: VerifyMode,
    json: bool,
    out: &mut W,
) -> CliResult<()> {
    let ledger = handle.load()?;
    let report = ChainVerifier::verify(ledger.records(), mode);

    if json {
        let data = serde_json::to_value(&report)?;
        match report.first() {
            None => write_response(out, data)?,
            Some(first) => write_error(
                out,
                "BCHOC_CHAIN_VIOLATION",
                &first.to_string(),
                data,
            )?,
        }
    } else {
        write_report_text(out, &report, ledger.records())?;
    }

    match report.first() {
        None => Ok(()),
        Some(first) => Err(CliError::chain_violation(first.to_string())),
    }
}

fn write_report_text<W: Write>(
    out: &mut W,
    report: &VerificationReport,
    records: &[Record],
) -> CliResult<()> {
    writeln!(out, "Transactions in blockchain: {}", report.transactions)?;
    writeln!(out, "State of blockchain: {}", report.state_label())?;
    for violation in &report.violations {
        if let Some(record) = records.get(violation.position) {
            writeln!(out, "Bad block: {}", digest_record(record))?;
        }
        writeln!(out, "{}", violation)?;
    }
    Ok(())
}

/// Load the ledger for a mutating command, creating genesis if needed
fn open_ledger<C: Clock>(handle: &LedgerHandle, clock: &C) -> CliResult<Ledger> {
    let (ledger, _) = handle.open_or_init(clock.now())?;
    require_genesis(&ledger)?;
    Ok(ledger)
}

fn require_genesis(ledger: &Ledger) -> CliResult<()> {
    match ledger.records().first() {
        Some(genesis) if genesis.is_genesis_shaped() && genesis.payload() == GENESIS_PAYLOAD => {
            Ok(())
        }
        _ => Err(CliError::invalid_genesis(
            "Ledger does not begin with a valid INITIAL block",
        )),
    }
}
