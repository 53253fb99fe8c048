//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PriceOracle`: Latest-price reads for a feed
//! - `PaymentStream`: Open / redirect / stop continuous payment flows
//! - `Clock`: Time source for the freeze-period gate

pub mod clock;
pub mod payment_stream;
pub mod price_oracle;
