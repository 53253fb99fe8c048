//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! technology choices:
//! - `SystemClock`: wall-clock time via chrono
//! - `PostedOracle`: in-process price feed board
//! - `LedgerStreams`: deposit-backed in-memory stream transport
//! - `MetricsRegistry`: Prometheus metrics served over axum

pub mod clock;
pub mod metrics;
pub mod oracle;
pub mod streams;

pub use clock::SystemClock;
pub use metrics::MetricsRegistry;
pub use oracle::PostedOracle;
pub use streams::LedgerStreams;
