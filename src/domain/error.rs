//! Error types for the offer lifecycle and its consumed capabilities.
//!
//! Every failure mode is a distinct kind so callers can tell a permanent
//! rejection (`InvalidParameter`, `Unauthorized`) from a retryable one
//! (`InsufficientRate` with a higher rate, `TooEarly` after the deadline).
//! Adapter failures propagate unchanged through `BetError` via `#[from]`.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::offer::{Account, FeedId, OfferId, OfferState, StreamHandle};

/// Failure reading the price oracle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The feed is unknown or the source could not produce a price.
    #[error("price feed {feed} unavailable: {reason}")]
    Unavailable { feed: FeedId, reason: String },
}

/// Failure from the payment-stream transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    /// Payer cannot fund a stream at the requested rate.
    #[error("payer {payer} has insufficient funds to stream at {rate}/s")]
    InsufficientFunds { payer: Account, rate: Decimal },
    /// A stream between this payer and payee is already open.
    #[error("stream from {payer} to {payee} already exists")]
    AlreadyExists { payer: Account, payee: Account },
    /// No open stream with this handle.
    #[error("stream {handle} not found")]
    NotFound { handle: StreamHandle },
}

/// Failure of an offer or registry operation.
///
/// A failed operation never mutates offer or registry state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BetError {
    /// Bad constructor argument. Permanent; retry with new parameters.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Operation not allowed in the offer's current state.
    #[error("operation not allowed while offer is {state}")]
    InvalidState { state: OfferState },

    /// Caller is not the offer owner.
    #[error("caller is not the offer owner")]
    Unauthorized,

    /// Buyer's offered rate is below the seller's minimum.
    #[error("offered rate {offered}/s is below the minimum {minimum}/s")]
    InsufficientRate { offered: Decimal, minimum: Decimal },

    /// Settlement attempted before the freeze period elapsed.
    #[error("freeze period ends at {freeze_end}, current time is {now}")]
    TooEarly { freeze_end: u64, now: u64 },

    /// No offer was ever registered under this identifier.
    #[error("offer {0} not found")]
    NotFound(OfferId),

    /// Propagated oracle failure. Retry later or abandon.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Propagated payment-stream failure.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_state_reports_current_state() {
        let err = BetError::InvalidState {
            state: OfferState::Settled,
        };
        assert_eq!(
            err.to_string(),
            "operation not allowed while offer is settled"
        );
    }

    #[test]
    fn test_insufficient_rate_names_both_rates() {
        let err = BetError::InsufficientRate {
            offered: dec!(5),
            minimum: dec!(10),
        };
        assert_eq!(err.to_string(), "offered rate 5/s is below the minimum 10/s");
    }

    #[test]
    fn test_stream_error_propagates_transparently() {
        let inner = StreamError::NotFound {
            handle: "h-1".to_string(),
        };
        let err: BetError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
    }
}
