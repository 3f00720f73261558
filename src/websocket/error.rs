//! Relay Error Types
//!
//! Every variant is recovered locally: the offending connection gets a
//! unicast `{"type":"error","message":<Display>}` reply and nothing else
//! happens. The Display strings are part of the wire protocol.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// Frame is not decodable JSON
    #[error("Invalid JSON")]
    MalformedInput,

    /// Decodable, but `type` is missing or not `tx`
    #[error("Unknown message type")]
    UnsupportedType,

    /// `from`/`to` missing, empty, not strings, or equal
    #[error("Invalid from/to")]
    InvalidTransfer,

    /// `amount` present but not numeric
    #[error("Invalid amount")]
    InvalidAmount,

    /// `amount` is numeric but beyond what a `Decimal` can carry
    #[error("Amount out of range")]
    AmountOutOfRange,
}

impl RelayError {
    /// Short machine-friendly label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MalformedInput => "malformed_input",
            RelayError::UnsupportedType => "unsupported_type",
            RelayError::InvalidTransfer => "invalid_transfer",
            RelayError::InvalidAmount => "invalid_amount",
            RelayError::AmountOutOfRange => "amount_out_of_range",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_messages() {
        assert_eq!(RelayError::MalformedInput.to_string(), "Invalid JSON");
        assert_eq!(RelayError::UnsupportedType.to_string(), "Unknown message type");
        assert_eq!(RelayError::InvalidTransfer.to_string(), "Invalid from/to");
        assert_eq!(RelayError::InvalidAmount.to_string(), "Invalid amount");
        assert_eq!(RelayError::AmountOutOfRange.to_string(), "Amount out of range");
    }
}
