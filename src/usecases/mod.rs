//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! offer lifecycle:
//! - `BetOffer`: per-offer settlement state machine
//! - `BetFactory`: offer creation, sequential ids, per-owner index
//! - `SettlementSweeper`: keeper loop settling matured offers

pub mod bet_factory;
pub mod bet_offer;
pub mod sweeper;

pub use bet_factory::BetFactory;
pub use bet_offer::BetOffer;
pub use sweeper::{SettlementSweeper, SweepReport};
