//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`. Feeds, funded
//! accounts and seed offers are all externalized here - nothing is
//! hardcoded in the domain layer.

pub mod loader;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::offer::Direction;

/// Top-level service configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the service begins operation.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and logging.
  pub service: ServiceConfig,
  /// Metrics endpoint.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Settlement sweeper cadence.
  #[serde(default)]
  pub sweeper: SweeperConfig,
  /// Price feeds available to offers.
  #[serde(default)]
  pub feeds: Vec<FeedConfig>,
  /// Accounts pre-funded on the stream ledger.
  #[serde(default)]
  pub accounts: Vec<AccountConfig>,
  /// Offers created at startup.
  #[serde(default)]
  pub offers: Vec<OfferSeedConfig>,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Bind address for the /live and /ready probes.
  #[serde(default = "default_health_bind")]
  pub health_bind: String,
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable the Prometheus endpoint.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_bind")]
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_bind(),
    }
  }
}

/// Settlement sweeper configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
  /// Enable the background sweeper.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Seconds between sweeps.
  #[serde(default = "default_sweep_interval")]
  pub interval_seconds: u64,
}

impl Default for SweeperConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      interval_seconds: default_sweep_interval(),
    }
  }
}

/// One price feed on the posted-oracle board.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
  /// Feed identity offers reference (e.g. "ETH-USD").
  pub id: String,
  /// Price posted at startup.
  pub initial_price: Decimal,
}

/// One pre-funded ledger account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
  /// Account identity.
  pub name: String,
  /// Deposit backing the account's streams.
  pub deposit: Decimal,
}

/// One offer created at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct OfferSeedConfig {
  /// Seller identity.
  pub owner: String,
  /// Strike price the feed is compared against.
  pub strike_price: Decimal,
  /// Call or put.
  pub direction: Direction,
  /// Freeze period in seconds.
  pub freeze_period_seconds: u64,
  /// Minimum acceptable flow rate per second.
  pub min_flow_rate: Decimal,
  /// Feed the offer settles against. Must name a configured feed.
  pub feed: String,
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_health_bind() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_metrics_bind() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_sweep_interval() -> u64 {
  30
}
