//! Bet Offer - Per-Offer Settlement State Machine
//!
//! One `BetOffer` per posted bet. Owns the offer's immutable terms and
//! its mutable phase, and decides how the associated payment stream
//! ends. All effects go through the injected ports.
//!
//! Lifecycle: `Open` → `Active` (buyer accepts, stream opens) →
//! `Settled` (price vs strike resolves the stream) or `Cancelled`
//! (owner exits early; reachable from `Open` and `Active`).
//!
//! Concurrency: a per-offer async mutex serializes `accept`, `cancel`
//! and `settle`. The mutex is held across the adapter call and the
//! phase commit, so a transition is observed either not at all or in
//! full, and racing `accept` calls resolve to exactly one winner.
//! State is committed only after the adapter call succeeds; a failed
//! operation leaves no trace.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::error::BetError;
use crate::domain::offer::{
  Account, Direction, FeedId, OfferState, OfferTerms, SettlementOutcome, StreamHandle,
};
use crate::ports::clock::Clock;
use crate::ports::payment_stream::PaymentStream;
use crate::ports::price_oracle::{PriceOracle, PriceQuote};

/// Mutable phase of an offer.
///
/// Buyer, freeze deadline and stream handle exist exactly when the
/// phase says they do; there is no way to observe a half-accepted
/// offer.
#[derive(Debug, Clone)]
enum Phase {
  /// Posted, no counterparty yet.
  Open,
  /// Buyer committed; stream running until the freeze period ends.
  Active {
    buyer: Account,
    freeze_period_end: u64,
    stream: StreamHandle,
  },
  /// Terminal: price comparison resolved the stream.
  Settled {
    buyer: Account,
    freeze_period_end: u64,
    outcome: SettlementOutcome,
  },
  /// Terminal: owner withdrew before settlement.
  Cancelled,
}

impl Phase {
  fn state(&self) -> OfferState {
    match self {
      Self::Open => OfferState::Open,
      Self::Active { .. } => OfferState::Active,
      Self::Settled { .. } => OfferState::Settled,
      Self::Cancelled => OfferState::Cancelled,
    }
  }
}

/// One bet offer: immutable terms plus the serialized state machine.
///
/// Generic over the oracle, stream transport and clock ports so the
/// settlement rules are testable against fakes. Constructible directly
/// for a standalone offer or through `BetFactory` for registry-managed
/// ones.
#[derive(Debug)]
pub struct BetOffer<O: PriceOracle, S: PaymentStream, C: Clock> {
  /// Immutable configuration fixed at creation.
  terms: OfferTerms,
  /// Serialized mutable phase. Single writer per offer.
  phase: Mutex<Phase>,
  /// Price source consulted at settlement.
  oracle: Arc<O>,
  /// Payment-stream transport.
  streams: Arc<S>,
  /// Time source for the freeze gate.
  clock: Arc<C>,
}

impl<O: PriceOracle, S: PaymentStream, C: Clock> BetOffer<O, S, C> {
  /// Create a new open offer from validated terms.
  pub fn new(terms: OfferTerms, oracle: Arc<O>, streams: Arc<S>, clock: Arc<C>) -> Self {
    Self {
      terms,
      phase: Mutex::new(Phase::Open),
      oracle,
      streams,
      clock,
    }
  }

  /// Accept the offer as `buyer`, streaming `offered_rate` per second
  /// to the owner.
  ///
  /// The only path that opens a stream, and it runs at most once: any
  /// later call observes a non-`Open` phase and fails.
  ///
  /// # Errors
  /// `InvalidState` unless the offer is `Open`, `InsufficientRate` if
  /// the rate is below the owner's minimum, stream transport errors
  /// propagated unchanged (the offer stays `Open` in that case).
  pub async fn accept(&self, buyer: Account, offered_rate: Decimal) -> Result<(), BetError> {
    let mut phase = self.phase.lock().await;
    if !matches!(*phase, Phase::Open) {
      return Err(BetError::InvalidState {
        state: phase.state(),
      });
    }
    if offered_rate < self.terms.min_flow_rate {
      return Err(BetError::InsufficientRate {
        offered: offered_rate,
        minimum: self.terms.min_flow_rate,
      });
    }

    let accepted_at = self.clock.unix_now();
    let stream = self
      .streams
      .open_stream(&buyer, &self.terms.owner, offered_rate)
      .await?;
    let freeze_period_end = accepted_at + self.terms.freeze_period_secs;

    info!(
      owner = %self.terms.owner,
      buyer = %buyer,
      rate = %offered_rate,
      freeze_period_end,
      "Offer accepted, payment stream opened"
    );

    *phase = Phase::Active {
      buyer,
      freeze_period_end,
      stream,
    };
    Ok(())
  }

  /// Cancel the offer. Owner only, and only before settlement.
  ///
  /// From `Open` this is a pure phase change; from `Active` the
  /// buyer→owner stream is stopped first (one `stop_stream`, no
  /// retroactive redistribution of already-streamed funds).
  ///
  /// # Errors
  /// `Unauthorized` for any non-owner caller regardless of state,
  /// `InvalidState` from the terminal states.
  pub async fn cancel(&self, caller: &Account) -> Result<(), BetError> {
    if *caller != self.terms.owner {
      return Err(BetError::Unauthorized);
    }

    let mut phase = self.phase.lock().await;
    match &*phase {
      Phase::Open => {
        info!(owner = %self.terms.owner, "Open offer cancelled");
        *phase = Phase::Cancelled;
        Ok(())
      }
      Phase::Active { buyer, stream, .. } => {
        let (buyer, stream) = (buyer.clone(), stream.clone());
        self.streams.stop_stream(&stream).await?;
        info!(
          owner = %self.terms.owner,
          buyer = %buyer,
          "Active offer cancelled, payment stream stopped"
        );
        *phase = Phase::Cancelled;
        Ok(())
      }
      Phase::Settled { .. } | Phase::Cancelled => Err(BetError::InvalidState {
        state: phase.state(),
      }),
    }
  }

  /// Settle the offer once the freeze period has elapsed.
  ///
  /// Callable by anyone, effective exactly once. Reads the oracle and
  /// compares against the strike: the owner wins on ties. An owner win
  /// leaves the stream flowing to the owner untouched; a buyer win
  /// redirects the stream back to the buyer. There is no deadline on
  /// settling — a call long after the freeze end is still valid.
  ///
  /// # Errors
  /// `InvalidState` unless `Active`, `TooEarly` before the freeze end,
  /// oracle/stream errors propagated unchanged (the offer stays
  /// `Active` and settlement can be retried).
  pub async fn settle(&self) -> Result<SettlementOutcome, BetError> {
    let mut phase = self.phase.lock().await;
    let (buyer, freeze_period_end, stream) = match &*phase {
      Phase::Active {
        buyer,
        freeze_period_end,
        stream,
      } => (buyer.clone(), *freeze_period_end, stream.clone()),
      _ => {
        return Err(BetError::InvalidState {
          state: phase.state(),
        });
      }
    };

    let now = self.clock.unix_now();
    if now < freeze_period_end {
      return Err(BetError::TooEarly {
        freeze_end: freeze_period_end,
        now,
      });
    }

    let quote = self.oracle.latest_price(&self.terms.price_feed).await?;
    let owner_wins = self
      .terms
      .direction
      .owner_wins(self.terms.strike_price, quote.price);

    let outcome = if owner_wins {
      // Stream already flows to the owner; nothing to move.
      SettlementOutcome::OwnerWins
    } else {
      self.streams.redirect_stream(&stream, &buyer).await?;
      SettlementOutcome::BuyerWins
    };

    info!(
      owner = %self.terms.owner,
      buyer = %buyer,
      feed = %self.terms.price_feed,
      observed = %quote.price,
      strike = %self.terms.strike_price,
      direction = %self.terms.direction,
      winner = %outcome,
      "Offer settled"
    );

    *phase = Phase::Settled {
      buyer,
      freeze_period_end,
      outcome,
    };
    Ok(outcome)
  }

  // ── Read accessors ──────────────────────────────────────────

  /// Immutable terms of the offer.
  pub fn terms(&self) -> &OfferTerms {
    &self.terms
  }

  /// Seller identity.
  pub fn owner(&self) -> &Account {
    &self.terms.owner
  }

  /// Strike price the observed price is compared against.
  pub fn strike_price(&self) -> Decimal {
    self.terms.strike_price
  }

  /// Call or put, from the seller's side.
  pub fn direction(&self) -> Direction {
    self.terms.direction
  }

  /// Minimum per-second rate an acceptable stream must carry.
  pub fn min_flow_rate(&self) -> Decimal {
    self.terms.min_flow_rate
  }

  /// Freeze period in seconds.
  pub fn freeze_period_secs(&self) -> u64 {
    self.terms.freeze_period_secs
  }

  /// Feed this offer settles against.
  pub fn price_feed(&self) -> &FeedId {
    &self.terms.price_feed
  }

  /// Current lifecycle state.
  pub async fn state(&self) -> OfferState {
    self.phase.lock().await.state()
  }

  /// Accepting counterparty, absent until acceptance.
  pub async fn buyer(&self) -> Option<Account> {
    match &*self.phase.lock().await {
      Phase::Active { buyer, .. } | Phase::Settled { buyer, .. } => Some(buyer.clone()),
      Phase::Open | Phase::Cancelled => None,
    }
  }

  /// Freeze deadline (Unix seconds), absent until acceptance.
  pub async fn freeze_period_end(&self) -> Option<u64> {
    match &*self.phase.lock().await {
      Phase::Active {
        freeze_period_end, ..
      }
      | Phase::Settled {
        freeze_period_end, ..
      } => Some(*freeze_period_end),
      Phase::Open | Phase::Cancelled => None,
    }
  }

  /// Settlement outcome, absent until settled.
  pub async fn outcome(&self) -> Option<SettlementOutcome> {
    match &*self.phase.lock().await {
      Phase::Settled { outcome, .. } => Some(*outcome),
      _ => None,
    }
  }

  /// Whether the offer is `Active` with its freeze period elapsed.
  ///
  /// Used by the settlement sweeper to pick candidates without paying
  /// for an oracle read.
  pub async fn is_due(&self) -> bool {
    match &*self.phase.lock().await {
      Phase::Active {
        freeze_period_end, ..
      } => self.clock.unix_now() >= *freeze_period_end,
      _ => false,
    }
  }

  /// Pass-through read of the offer's feed. No side effects.
  pub async fn latest_price(&self) -> Result<PriceQuote, BetError> {
    match self.oracle.latest_price(&self.terms.price_feed).await {
      Ok(quote) => Ok(quote),
      Err(e) => {
        warn!(feed = %self.terms.price_feed, error = %e, "Oracle read failed");
        Err(e.into())
      }
    }
  }
}

#[cfg(test)]
pub(crate) mod test_support {
  //! Hand-rolled port fakes shared by the usecase unit tests.

  use std::sync::atomic::{AtomicU64, Ordering};

  use tokio::sync::Mutex;

  use super::*;
  use crate::domain::error::{OracleError, StreamError};

  /// Clock that tests advance by hand.
  #[derive(Debug)]
  pub struct ManualClock {
    now: AtomicU64,
  }

  impl ManualClock {
    pub fn at(now: u64) -> Self {
      Self {
        now: AtomicU64::new(now),
      }
    }

    pub fn set(&self, now: u64) {
      self.now.store(now, Ordering::SeqCst);
    }
  }

  impl Clock for ManualClock {
    fn unix_now(&self) -> u64 {
      self.now.load(Ordering::SeqCst)
    }
  }

  /// Oracle returning a posted price, or failing on demand.
  #[derive(Debug)]
  pub struct FixedOracle {
    price: Mutex<Option<Decimal>>,
  }

  impl FixedOracle {
    pub fn at(price: Decimal) -> Self {
      Self {
        price: Mutex::new(Some(price)),
      }
    }

    pub fn unavailable() -> Self {
      Self {
        price: Mutex::new(None),
      }
    }

    pub async fn post(&self, price: Decimal) {
      *self.price.lock().await = Some(price);
    }
  }

  #[async_trait::async_trait]
  impl PriceOracle for FixedOracle {
    async fn latest_price(&self, feed: &FeedId) -> Result<PriceQuote, OracleError> {
      match *self.price.lock().await {
        Some(price) => Ok(PriceQuote {
          price,
          observed_at: 0,
        }),
        None => Err(OracleError::Unavailable {
          feed: feed.clone(),
          reason: "no price posted".to_string(),
        }),
      }
    }
  }

  /// Recorded stream operation for assertion.
  #[derive(Debug, Clone, PartialEq, Eq)]
  pub enum StreamOp {
    Open {
      payer: Account,
      payee: Account,
      rate: Decimal,
    },
    Redirect {
      handle: StreamHandle,
      new_payee: Account,
    },
    Stop {
      handle: StreamHandle,
    },
  }

  /// Stream transport that records every call, optionally rejecting opens.
  #[derive(Debug)]
  pub struct RecordingStreams {
    pub ops: Mutex<Vec<StreamOp>>,
    reject_open: bool,
    reject_redirect: bool,
  }

  impl RecordingStreams {
    pub fn ok() -> Self {
      Self {
        ops: Mutex::new(Vec::new()),
        reject_open: false,
        reject_redirect: false,
      }
    }

    pub fn rejecting_open() -> Self {
      Self {
        reject_open: true,
        ..Self::ok()
      }
    }

    pub fn rejecting_redirect() -> Self {
      Self {
        reject_redirect: true,
        ..Self::ok()
      }
    }

    pub async fn op_count(&self) -> usize {
      self.ops.lock().await.len()
    }
  }

  #[async_trait::async_trait]
  impl PaymentStream for RecordingStreams {
    async fn open_stream(
      &self,
      payer: &Account,
      payee: &Account,
      rate: Decimal,
    ) -> Result<StreamHandle, StreamError> {
      if self.reject_open {
        return Err(StreamError::InsufficientFunds {
          payer: payer.clone(),
          rate,
        });
      }
      let mut ops = self.ops.lock().await;
      ops.push(StreamOp::Open {
        payer: payer.clone(),
        payee: payee.clone(),
        rate,
      });
      Ok(format!("stream-{}", ops.len()))
    }

    async fn redirect_stream(
      &self,
      handle: &StreamHandle,
      new_payee: &Account,
    ) -> Result<(), StreamError> {
      if self.reject_redirect {
        return Err(StreamError::NotFound {
          handle: handle.clone(),
        });
      }
      self.ops.lock().await.push(StreamOp::Redirect {
        handle: handle.clone(),
        new_payee: new_payee.clone(),
      });
      Ok(())
    }

    async fn stop_stream(&self, handle: &StreamHandle) -> Result<(), StreamError> {
      self.ops.lock().await.push(StreamOp::Stop {
        handle: handle.clone(),
      });
      Ok(())
    }
  }
}
