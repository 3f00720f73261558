//! WebSocket message types
//!
//! Inbound (client → server):
//! ```json
//! {"type": "tx", "from": "alice", "to": "bob", "amount": 12.5}
//! ```
//!
//! Outbound (server → client):
//! ```json
//! {"type": "csv", "row": "TX_1700000000000_1,alice,bob,12.50,2024-01-01 10:00:00"}
//! {"type": "error", "message": "Invalid from/to"}
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::error::RelayError;
use crate::record::{Record, TransferRequest};

/// Client → server messages
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "tx")]
    Tx(TxPayload),
}

impl ClientMessage {
    /// Decode one raw text frame.
    ///
    /// Undecodable JSON is `MalformedInput`. Valid JSON that does not
    /// match a known variant (wrong or missing `type`, arrays, scalars,
    /// `null`) is `UnsupportedType`.
    pub fn decode(raw: &str) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_str(raw).map_err(|_| RelayError::MalformedInput)?;
        serde_json::from_value(value).map_err(|_| RelayError::UnsupportedType)
    }
}

/// Raw `tx` fields, kept loosely typed so that type mismatches surface as
/// the field-specific error instead of a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct TxPayload {
    #[serde(default)]
    pub from: Option<Value>,
    #[serde(default)]
    pub to: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
}

impl TxPayload {
    /// Check identifiers, then amount.
    pub fn validate(self) -> Result<TransferRequest, RelayError> {
        let (from, to) = match (self.from, self.to) {
            (Some(Value::String(from)), Some(Value::String(to)))
                if !from.is_empty() && !to.is_empty() && from != to =>
            {
                (from, to)
            }
            _ => return Err(RelayError::InvalidTransfer),
        };

        let amount = parse_amount(self.amount.as_ref())?;
        Ok(TransferRequest { from, to, amount })
    }
}

/// Smallest magnitude that survives rounding to two decimals
const MIN_VISIBLE_AMOUNT: f64 = 0.005;

/// Absent or `null` means zero. Numbers and numeric strings are accepted;
/// a blank string also counts as zero.
fn parse_amount(value: Option<&Value>) -> Result<Decimal, RelayError> {
    match value {
        None | Some(Value::Null) => Ok(Decimal::ZERO),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(Decimal::ZERO)
            } else {
                parse_decimal(s)
            }
        }
        Some(_) => Err(RelayError::InvalidAmount),
    }
}

/// Exact decimal first; numeric text that `Decimal` cannot hold goes
/// through f64 so that it is judged on magnitude, not on syntax.
fn parse_decimal(s: &str) -> Result<Decimal, RelayError> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .or_else(|_| match s.parse::<f64>() {
            Ok(f) => from_f64(f),
            Err(_) => Err(RelayError::InvalidAmount),
        })
}

/// `NaN` and infinities are not amounts. Values too small to show at two
/// decimals are zero; values beyond `Decimal::MAX` are out of range.
fn from_f64(f: f64) -> Result<Decimal, RelayError> {
    if !f.is_finite() {
        return Err(RelayError::InvalidAmount);
    }
    if f.abs() < MIN_VISIBLE_AMOUNT {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_f64(f).ok_or(RelayError::AmountOutOfRange)
}

/// Server → client messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Broadcast of an accepted transfer
    Csv { row: String },
    /// Unicast reply to the offending connection
    Error { message: String },
}

impl From<&Record> for ServerMessage {
    fn from(record: &Record) -> Self {
        ServerMessage::Csv { row: record.row() }
    }
}

impl From<RelayError> for ServerMessage {
    fn from(err: RelayError) -> Self {
        ServerMessage::Error {
            message: err.to_string(),
        }
    }
}
