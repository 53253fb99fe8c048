//! Price Oracle Port - Reference Price Interface
//!
//! Defines the trait for reading the latest price of a feed at
//! settlement time. The state machine never knows whether the price
//! comes from a live source or a posted board.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::error::OracleError;
use crate::domain::offer::FeedId;

/// Latest observed price for a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
  /// Fixed-point decimal price.
  pub price: Decimal,
  /// When the source observed this price (Unix seconds).
  pub observed_at: u64,
}

/// Trait for price feed providers.
///
/// Implementors wrap an external feed reference and expose the latest
/// price as an immutable read. No state beyond the feed itself.
#[async_trait]
pub trait PriceOracle: Send + Sync + 'static {
  /// Read the latest price for `feed`.
  ///
  /// # Errors
  /// `OracleError::Unavailable` if the feed is unknown or the source
  /// cannot produce a price right now.
  async fn latest_price(&self, feed: &FeedId) -> Result<PriceQuote, OracleError>;
}
