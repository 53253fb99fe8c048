//! Clock Port - Time Source Interface
//!
//! The freeze-period gate is the only time-sensitive rule in the
//! system, so time comes in through a port: production wires the wall
//! clock, tests drive a manual one.

/// Trait for time sources. All timestamps are Unix seconds.
pub trait Clock: Send + Sync + 'static {
  /// Current time in Unix seconds.
  fn unix_now(&self) -> u64;
}
