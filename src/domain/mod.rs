//! Domain layer - Core offer model and settlement logic.
//!
//! Pure types for the bet-offer lifecycle. No external dependencies or
//! I/O here (hexagonal architecture inner ring); everything is
//! serializable and testable in isolation.

pub mod error;
pub mod offer;

// Re-export core types for convenience
pub use error::{BetError, OracleError, StreamError};
pub use offer::{
    Account, Direction, FeedId, OfferId, OfferState, OfferTerms, SettlementOutcome,
    StreamHandle,
};
