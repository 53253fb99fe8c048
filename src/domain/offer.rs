//! Core bet-offer domain types.
//!
//! Defines the immutable terms of an offer, its lifecycle states, and the
//! pure settlement comparison. Nothing in this module performs I/O; the
//! state machine in `usecases::bet_offer` drives these types through the
//! injected ports.
//!
//! Exposes two API surfaces:
//! - Rich types (Decimal) for settlement arithmetic
//! - Lightweight identifier aliases for the ports/adapters boundary

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::error::BetError;

// ────────────────────────────────────────────
// Type aliases consumed by ports and adapters
// ────────────────────────────────────────────

/// Opaque account reference (seller, buyer, payee).
pub type Account = String;

/// Registry-assigned offer identifier. Starts at 1, strictly increasing.
pub type OfferId = u64;

/// Identity of the price feed an offer settles against.
pub type FeedId = String;

/// Opaque handle to an open payment stream.
pub type StreamHandle = String;

// ────────────────────────────────────────────
// Enums shared across domain and ports
// ────────────────────────────────────────────

/// Lifecycle state of an offer.
///
/// `Open` is initial; `Settled` and `Cancelled` are terminal.
/// `Cancelled` is reachable from both `Open` and `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferState {
    /// Posted by the seller, no buyer yet.
    Open,
    /// Buyer accepted; payment stream running, freeze period ticking.
    Active,
    /// Freeze period elapsed and the price comparison resolved the stream.
    Settled,
    /// Withdrawn by the seller before settlement.
    Cancelled,
}

impl std::fmt::Display for OfferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Active => write!(f, "active"),
            Self::Settled => write!(f, "settled"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Direction of the bet from the seller's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Seller wins if the observed price is at or above the strike.
    Call,
    /// Seller wins if the observed price is at or below the strike.
    Put,
}

impl Direction {
    /// Settlement comparison.
    ///
    /// Ties resolve in favor of the offer owner: both comparisons include
    /// equality. This is deliberate and load-bearing, not an oversight.
    pub fn owner_wins(self, strike: Decimal, observed: Decimal) -> bool {
        match self {
            Self::Call => observed >= strike,
            Self::Put => observed <= strike,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Who the payment stream ends up with after settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// Stream keeps flowing to the owner.
    OwnerWins,
    /// Stream redirected back to the buyer.
    BuyerWins,
}

impl std::fmt::Display for SettlementOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OwnerWins => write!(f, "owner"),
            Self::BuyerWins => write!(f, "buyer"),
        }
    }
}

// ────────────────────────────────────────────
// Immutable offer configuration
// ────────────────────────────────────────────

/// The immutable terms of one bet offer, fixed at construction.
///
/// Everything mutable about an offer (state, buyer, freeze deadline,
/// stream handle) lives in the state machine, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferTerms {
    /// Seller identity. Set at creation, never changes.
    pub owner: Account,
    /// Reference value the observed price is compared against.
    pub strike_price: Decimal,
    /// Call or put, from the seller's side.
    pub direction: Direction,
    /// Seconds the offer stays locked after acceptance.
    pub freeze_period_secs: u64,
    /// Minimum per-second rate the buyer must stream.
    pub min_flow_rate: Decimal,
    /// Price feed consulted at settlement.
    pub price_feed: FeedId,
}

impl OfferTerms {
    /// Validate and build the terms for a new offer.
    ///
    /// # Errors
    /// `InvalidParameter` if the strike, minimum rate or freeze period is
    /// not strictly positive, or an identity is empty.
    pub fn new(
        owner: Account,
        strike_price: Decimal,
        direction: Direction,
        freeze_period_secs: u64,
        min_flow_rate: Decimal,
        price_feed: FeedId,
    ) -> Result<Self, BetError> {
        if owner.is_empty() {
            return Err(BetError::InvalidParameter("owner must not be empty"));
        }
        if strike_price <= Decimal::ZERO {
            return Err(BetError::InvalidParameter("strike_price must be positive"));
        }
        if min_flow_rate <= Decimal::ZERO {
            return Err(BetError::InvalidParameter("min_flow_rate must be positive"));
        }
        if freeze_period_secs == 0 {
            return Err(BetError::InvalidParameter("freeze_period must be positive"));
        }
        if price_feed.is_empty() {
            return Err(BetError::InvalidParameter("price_feed must not be empty"));
        }
        Ok(Self {
            owner,
            strike_price,
            direction,
            freeze_period_secs,
            min_flow_rate,
            price_feed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn terms(strike: Decimal, min_rate: Decimal, freeze: u64) -> Result<OfferTerms, BetError> {
        OfferTerms::new(
            "alice".to_string(),
            strike,
            Direction::Call,
            freeze,
            min_rate,
            "ETH-USD".to_string(),
        )
    }

    #[test]
    fn test_valid_terms_accepted() {
        let t = terms(dec!(2000), dec!(10), 604_800).unwrap();
        assert_eq!(t.owner, "alice");
        assert_eq!(t.strike_price, dec!(2000));
    }

    #[test]
    fn test_zero_strike_rejected() {
        assert!(matches!(
            terms(dec!(0), dec!(10), 60),
            Err(BetError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(
            terms(dec!(100), dec!(-1), 60),
            Err(BetError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_zero_freeze_period_rejected() {
        assert!(matches!(
            terms(dec!(100), dec!(10), 0),
            Err(BetError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_feed_rejected() {
        let result = OfferTerms::new(
            "alice".to_string(),
            dec!(100),
            Direction::Put,
            60,
            dec!(1),
            String::new(),
        );
        assert!(matches!(result, Err(BetError::InvalidParameter(_))));
    }

    #[test]
    fn test_call_tie_goes_to_owner() {
        assert!(Direction::Call.owner_wins(dec!(100), dec!(100)));
    }

    #[test]
    fn test_put_tie_goes_to_owner() {
        assert!(Direction::Put.owner_wins(dec!(100), dec!(100)));
    }

    #[test]
    fn test_call_below_strike_loses() {
        assert!(!Direction::Call.owner_wins(dec!(100), dec!(99)));
    }

    #[test]
    fn test_put_above_strike_loses() {
        assert!(!Direction::Put.owner_wins(dec!(100), dec!(101)));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(format!("{}", OfferState::Open), "open");
        assert_eq!(format!("{}", OfferState::Cancelled), "cancelled");
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(format!("{}", Direction::Call), "call");
        assert_eq!(format!("{}", Direction::Put), "put");
    }
}
