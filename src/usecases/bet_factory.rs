//! Bet Factory - Offer Registry and Creation
//!
//! Creates `BetOffer` instances on demand, assigns them sequential
//! identifiers and indexes them per creator. Holds no settlement logic;
//! every offer carries its own state machine.
//!
//! Registry entries are never deleted: settled and cancelled offers
//! stay queryable forever.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::error::BetError;
use crate::domain::offer::{Account, Direction, FeedId, OfferId, OfferTerms};
use crate::ports::clock::Clock;
use crate::ports::payment_stream::PaymentStream;
use crate::ports::price_oracle::PriceOracle;
use crate::usecases::bet_offer::BetOffer;

/// Identifier arena plus per-owner index, guarded by one lock so id
/// allocation and registration are a single atomic step.
struct Registry<O: PriceOracle, S: PaymentStream, C: Clock> {
  /// Next identifier to hand out. Ids start at 1 and never repeat.
  next_id: OfferId,
  /// Arena of all offers ever created, by id.
  offers: HashMap<OfferId, Arc<BetOffer<O, S, C>>>,
  /// Creation-ordered offer ids per owner.
  by_owner: HashMap<Account, Vec<OfferId>>,
}

/// Factory and registry for bet offers.
///
/// Shares one set of port adapters across every offer it creates.
pub struct BetFactory<O: PriceOracle, S: PaymentStream, C: Clock> {
  oracle: Arc<O>,
  streams: Arc<S>,
  clock: Arc<C>,
  registry: RwLock<Registry<O, S, C>>,
}

impl<O: PriceOracle, S: PaymentStream, C: Clock> BetFactory<O, S, C> {
  /// Create an empty registry wired to the given adapters.
  pub fn new(oracle: Arc<O>, streams: Arc<S>, clock: Arc<C>) -> Self {
    Self {
      oracle,
      streams,
      clock,
      registry: RwLock::new(Registry {
        next_id: 1,
        offers: HashMap::new(),
        by_owner: HashMap::new(),
      }),
    }
  }

  /// Create and register a new offer.
  ///
  /// Terms are validated before any identifier is allocated, so a
  /// rejected creation consumes no id and leaves no registry entry.
  /// Concurrent creations receive distinct, gapless sequential ids.
  ///
  /// # Errors
  /// Whatever `OfferTerms::new` rejects, propagated unchanged.
  pub fn create_offer(
    &self,
    owner: Account,
    strike_price: Decimal,
    direction: Direction,
    freeze_period_secs: u64,
    min_flow_rate: Decimal,
    price_feed: FeedId,
  ) -> Result<(OfferId, Arc<BetOffer<O, S, C>>), BetError> {
    let terms = OfferTerms::new(
      owner,
      strike_price,
      direction,
      freeze_period_secs,
      min_flow_rate,
      price_feed,
    )?;
    let offer = Arc::new(BetOffer::new(
      terms,
      Arc::clone(&self.oracle),
      Arc::clone(&self.streams),
      Arc::clone(&self.clock),
    ));

    let id = {
      let mut reg = self.registry.write();
      let id = reg.next_id;
      reg.next_id += 1;
      reg.offers.insert(id, Arc::clone(&offer));
      reg
        .by_owner
        .entry(offer.owner().clone())
        .or_default()
        .push(id);
      id
    };

    info!(
      offer_id = id,
      owner = %offer.owner(),
      strike = %offer.terms().strike_price,
      direction = %offer.terms().direction,
      feed = %offer.price_feed(),
      "Offer created"
    );
    Ok((id, offer))
  }

  /// Creation-ordered ids of the offers `owner` created. Empty if none.
  pub fn offers_for(&self, owner: &Account) -> Vec<OfferId> {
    self
      .registry
      .read()
      .by_owner
      .get(owner)
      .cloned()
      .unwrap_or_default()
  }

  /// Look up an offer by id.
  ///
  /// # Errors
  /// `NotFound` if the id was never assigned.
  pub fn offer_by_id(&self, id: OfferId) -> Result<Arc<BetOffer<O, S, C>>, BetError> {
    self
      .registry
      .read()
      .offers
      .get(&id)
      .cloned()
      .ok_or(BetError::NotFound(id))
  }

  /// Id-ordered snapshot of every registered offer.
  ///
  /// Used by the settlement sweeper; the snapshot is taken under the
  /// read lock, then released before any offer is touched.
  pub fn snapshot(&self) -> Vec<(OfferId, Arc<BetOffer<O, S, C>>)> {
    let reg = self.registry.read();
    let mut offers: Vec<_> = reg
      .offers
      .iter()
      .map(|(id, offer)| (*id, Arc::clone(offer)))
      .collect();
    drop(reg);
    offers.sort_by_key(|(id, _)| *id);
    offers
  }

  /// Number of offers ever created.
  pub fn len(&self) -> usize {
    self.registry.read().offers.len()
  }

  /// Whether no offer has been created yet.
  pub fn is_empty(&self) -> bool {
    self.registry.read().offers.is_empty()
  }
}
