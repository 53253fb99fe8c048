//! Posted Oracle Adapter - In-Process Price Feed Board
//!
//! Implements the `PriceOracle` port over a board of posted prices,
//! one entry per feed. Operators (or tests) post prices; offers read
//! the latest. A live feed transport would slot in behind the same
//! port without touching the state machine.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::error::OracleError;
use crate::domain::offer::FeedId;
use crate::ports::price_oracle::{PriceOracle, PriceQuote};

/// Price board keyed by feed id.
///
/// Reading an unknown feed fails with `OracleUnavailable` rather than
/// inventing a price.
#[derive(Default)]
pub struct PostedOracle {
    /// Last posted quote per feed.
    quotes: RwLock<HashMap<FeedId, PriceQuote>>,
}

impl PostedOracle {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board pre-seeded with initial feed prices.
    pub async fn with_feeds(feeds: impl IntoIterator<Item = (FeedId, Decimal)>) -> Self {
        let oracle = Self::new();
        for (feed, price) in feeds {
            oracle.post(feed, price).await;
        }
        oracle
    }

    /// Post the latest price for a feed, stamping it with the wall clock.
    pub async fn post(&self, feed: FeedId, price: Decimal) {
        let quote = PriceQuote {
            price,
            observed_at: Utc::now().timestamp().max(0) as u64,
        };
        debug!(feed = %feed, price = %price, "Price posted");
        self.quotes.write().await.insert(feed, quote);
    }
}

#[async_trait]
impl PriceOracle for PostedOracle {
    async fn latest_price(&self, feed: &FeedId) -> Result<PriceQuote, OracleError> {
        self.quotes
            .read()
            .await
            .get(feed)
            .cloned()
            .ok_or_else(|| OracleError::Unavailable {
                feed: feed.clone(),
                reason: "no price posted for feed".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn test_unknown_feed_is_unavailable() {
        let oracle = PostedOracle::new();
        let err = oracle
            .latest_price(&"ETH-USD".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_post_then_read_returns_latest() {
        let oracle = PostedOracle::new();
        oracle.post("ETH-USD".to_string(), dec!(2000)).await;
        oracle.post("ETH-USD".to_string(), dec!(2100)).await;

        let quote = oracle.latest_price(&"ETH-USD".to_string()).await.unwrap();
        assert_eq!(quote.price, dec!(2100));
    }

    #[tokio::test]
    async fn test_seeded_feeds_readable() {
        let oracle = PostedOracle::with_feeds([
            ("ETH-USD".to_string(), dec!(2000)),
            ("BTC-USD".to_string(), dec!(60000)),
        ])
        .await;

        let quote = oracle.latest_price(&"BTC-USD".to_string()).await.unwrap();
        assert_eq!(quote.price, dec!(60000));
    }
}
