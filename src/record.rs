//! Record Formatter
//!
//! Turns a validated [`TransferRequest`] into an immutable [`Record`]:
//!
//! ```text
//! TX_<epoch_ms>_<seq>,<from>,<to>,<amount:.2>,<YYYY-MM-DD HH:MM:SS>
//! ```
//!
//! The sequence counter lives inside [`RecordFormatter`]; whoever owns the
//! formatter owns the counter.

use chrono::{DateTime, Local};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core_types::SeqNum;

/// Fractional digits of a rendered amount
pub const AMOUNT_DISPLAY_DECIMALS: u32 = 2;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A validated transfer intent.
///
/// Invariant: `from` and `to` are non-empty and distinct. Construction
/// happens in [`crate::websocket::messages::TxPayload::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

impl TransferRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

/// Formatted transfer record, exists for the duration of one broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub transaction_id: String,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub timestamp: String,
}

impl Record {
    /// Stamp a request with a sequence number and a clock reading.
    ///
    /// Both the transaction id (epoch millis) and the wall-clock timestamp
    /// come from the same `now`.
    pub fn stamp(seq: SeqNum, now: DateTime<Local>, request: &TransferRequest) -> Self {
        Self {
            transaction_id: format!("TX_{}_{}", now.timestamp_millis(), seq),
            from: request.from.clone(),
            to: request.to.clone(),
            amount: format_amount(request.amount),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Canonical CSV line: `transactionId,from,to,amount,timestamp`
    pub fn row(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.transaction_id, self.from, self.to, self.amount, self.timestamp
        )
    }
}

/// Render an amount with exactly two fractional digits (half away from zero).
pub fn format_amount(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(AMOUNT_DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.prec$}", rounded, prec = AMOUNT_DISPLAY_DECIMALS as usize)
}

/// Issues records and owns the sequence counter.
///
/// `make_record` is safe to call from many tasks at once: the counter is
/// a single atomic read-modify-write, so two records never share a
/// sequence number even when they land in the same millisecond.
#[derive(Debug, Default)]
pub struct RecordFormatter {
    seq: AtomicU64,
}

impl RecordFormatter {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
        }
    }

    /// Consume one sequence number and format the request.
    pub fn make_record(&self, request: &TransferRequest) -> Record {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        Record::stamp(seq, Local::now(), request)
    }

    /// Number of records issued so far
    pub fn issued(&self) -> SeqNum {
        self.seq.load(Ordering::SeqCst)
    }
}
