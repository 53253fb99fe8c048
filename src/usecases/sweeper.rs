//! Settlement Sweeper - Keeper for Matured Offers
//!
//! `settle` is callable by anyone, so the service acts as the keeper:
//! each sweep scans the registry and settles every active offer whose
//! freeze period has elapsed.
//!
//! Sweep flow:
//! 1. Snapshot the registry (ids in order)
//! 2. Skip offers that are not due
//! 3. Settle each due offer, tolerating per-offer failures
//! 4. Aggregate results into a report

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::error::BetError;
use crate::domain::offer::{OfferId, SettlementOutcome};
use crate::ports::clock::Clock;
use crate::ports::payment_stream::PaymentStream;
use crate::ports::price_oracle::PriceOracle;
use crate::usecases::bet_factory::BetFactory;

/// One settled offer within a sweep.
#[derive(Debug, Clone)]
pub struct SweepSettlement {
  /// Registry id of the settled offer.
  pub offer_id: OfferId,
  /// Who ended up with the stream.
  pub outcome: SettlementOutcome,
}

/// One offer that was due but failed to settle.
#[derive(Debug, Clone)]
pub struct SweepFailure {
  /// Registry id of the failing offer.
  pub offer_id: OfferId,
  /// The settlement error, unchanged.
  pub error: BetError,
}

/// Aggregated result of one sweep over the registry.
#[derive(Debug, Clone)]
pub struct SweepReport {
  /// Offers settled this sweep.
  pub settled: Vec<SweepSettlement>,
  /// Due offers whose settlement failed (oracle or stream trouble);
  /// they stay active and are retried next sweep.
  pub failed: Vec<SweepFailure>,
  /// Total registry entries scanned.
  pub scanned: usize,
  /// When the sweep ran.
  pub timestamp: DateTime<Utc>,
}

/// Keeper that settles matured offers across the whole registry.
pub struct SettlementSweeper<O: PriceOracle, S: PaymentStream, C: Clock> {
  factory: Arc<BetFactory<O, S, C>>,
}

impl<O: PriceOracle, S: PaymentStream, C: Clock> SettlementSweeper<O, S, C> {
  /// Create a sweeper over the given registry.
  pub fn new(factory: Arc<BetFactory<O, S, C>>) -> Self {
    Self { factory }
  }

  /// Run one sweep across the registry.
  ///
  /// Never aborts mid-sweep: a failing offer is recorded and the sweep
  /// moves on. An offer settled concurrently between the due-check and
  /// our settle call is simply skipped.
  pub async fn sweep(&self) -> SweepReport {
    let offers = self.factory.snapshot();
    let scanned = offers.len();

    let mut settled = Vec::new();
    let mut failed = Vec::new();

    for (offer_id, offer) in offers {
      if !offer.is_due().await {
        continue;
      }
      match offer.settle().await {
        Ok(outcome) => settled.push(SweepSettlement { offer_id, outcome }),
        // Lost the race to another settler; nothing to do.
        Err(BetError::InvalidState { .. } | BetError::TooEarly { .. }) => {}
        Err(error) => {
          warn!(offer_id, error = %error, "Sweep settlement failed");
          failed.push(SweepFailure { offer_id, error });
        }
      }
    }

    let report = SweepReport {
      settled,
      failed,
      scanned,
      timestamp: Utc::now(),
    };

    if !report.settled.is_empty() || !report.failed.is_empty() {
      info!(
        scanned = report.scanned,
        settled = report.settled.len(),
        failed = report.failed.len(),
        "Settlement sweep complete"
      );
    }
    report
  }
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;
  use crate::domain::offer::{Direction, OfferState};
  use crate::usecases::bet_offer::test_support::{FixedOracle, ManualClock, RecordingStreams};

  struct Fixture {
    factory: Arc<BetFactory<FixedOracle, RecordingStreams, ManualClock>>,
    clock: Arc<ManualClock>,
  }

  fn fixture(price: rust_decimal::Decimal) -> Fixture {
    let clock = Arc::new(ManualClock::at(0));
    let factory = Arc::new(BetFactory::new(
      Arc::new(FixedOracle::at(price)),
      Arc::new(RecordingStreams::ok()),
      Arc::clone(&clock),
    ));
    Fixture { factory, clock }
  }

  fn create(f: &Fixture, owner: &str, freeze: u64) -> OfferId {
    let (id, _) = f
      .factory
      .create_offer(
        owner.to_string(),
        dec!(2000),
        Direction::Call,
        freeze,
        dec!(10),
        "ETH-USD".to_string(),
      )
      .unwrap();
    id
  }

  #[tokio::test]
  async fn test_sweep_settles_only_matured_offers() {
    let f = fixture(dec!(2100));
    let due = create(&f, "alice", 60);
    let later = create(&f, "alice", 600);
    let open = create(&f, "bob", 60);

    f.factory
      .offer_by_id(due)
      .unwrap()
      .accept("bob".to_string(), dec!(10))
      .await
      .unwrap();
    f.factory
      .offer_by_id(later)
      .unwrap()
      .accept("carol".to_string(), dec!(10))
      .await
      .unwrap();
    f.clock.set(60);

    let sweeper = SettlementSweeper::new(Arc::clone(&f.factory));
    let report = sweeper.sweep().await;

    assert_eq!(report.scanned, 3);
    assert_eq!(report.settled.len(), 1);
    assert_eq!(report.settled[0].offer_id, due);
    assert_eq!(report.settled[0].outcome, SettlementOutcome::OwnerWins);
    assert!(report.failed.is_empty());

    let untouched = f.factory.offer_by_id(later).unwrap();
    assert_eq!(untouched.state().await, OfferState::Active);
    let still_open = f.factory.offer_by_id(open).unwrap();
    assert_eq!(still_open.state().await, OfferState::Open);
  }

  #[tokio::test]
  async fn test_sweep_tolerates_oracle_failure_and_retries_later() {
    let clock = Arc::new(ManualClock::at(0));
    let oracle = Arc::new(FixedOracle::unavailable());
    let factory = Arc::new(BetFactory::new(
      Arc::clone(&oracle),
      Arc::new(RecordingStreams::ok()),
      Arc::clone(&clock),
    ));
    let (id, offer) = factory
      .create_offer(
        "alice".to_string(),
        dec!(2000),
        Direction::Call,
        60,
        dec!(10),
        "ETH-USD".to_string(),
      )
      .unwrap();
    offer.accept("bob".to_string(), dec!(10)).await.unwrap();
    clock.set(60);

    let sweeper = SettlementSweeper::new(Arc::clone(&factory));
    let report = sweeper.sweep().await;
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].offer_id, id);
    assert_eq!(offer.state().await, OfferState::Active);

    oracle.post(dec!(1000)).await;
    let report = sweeper.sweep().await;
    assert_eq!(report.settled.len(), 1);
    assert_eq!(report.settled[0].outcome, SettlementOutcome::BuyerWins);
  }

  #[tokio::test]
  async fn test_sweep_on_empty_registry_is_a_no_op() {
    let f = fixture(dec!(2100));
    let sweeper = SettlementSweeper::new(Arc::clone(&f.factory));
    let report = sweeper.sweep().await;
    assert_eq!(report.scanned, 0);
    assert!(report.settled.is_empty());
  }
}
