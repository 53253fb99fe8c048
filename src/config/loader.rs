//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig =
    toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    feeds = config.feeds.len(),
    accounts = config.accounts.len(),
    seed_offers = config.offers.len(),
    sweep_interval = config.sweeper.interval_seconds,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty identities
/// - Positive prices, rates and periods
/// - Seed offers referencing configured feeds
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.service.name.is_empty(),
    "service.name must not be empty"
  );
  anyhow::ensure!(
    config.sweeper.interval_seconds > 0,
    "sweeper.interval_seconds must be positive, got {}",
    config.sweeper.interval_seconds
  );

  for (i, feed) in config.feeds.iter().enumerate() {
    anyhow::ensure!(!feed.id.is_empty(), "Feed {i} has empty id");
    anyhow::ensure!(
      feed.initial_price > Decimal::ZERO,
      "Feed {} ({}) initial_price must be positive, got {}",
      i,
      feed.id,
      feed.initial_price
    );
  }

  for (i, account) in config.accounts.iter().enumerate() {
    anyhow::ensure!(!account.name.is_empty(), "Account {i} has empty name");
    anyhow::ensure!(
      account.deposit >= Decimal::ZERO,
      "Account {} ({}) deposit must not be negative",
      i,
      account.name
    );
  }

  for (i, offer) in config.offers.iter().enumerate() {
    anyhow::ensure!(!offer.owner.is_empty(), "Offer {i} has empty owner");
    anyhow::ensure!(
      offer.strike_price > Decimal::ZERO,
      "Offer {} strike_price must be positive, got {}",
      i,
      offer.strike_price
    );
    anyhow::ensure!(
      offer.min_flow_rate > Decimal::ZERO,
      "Offer {} min_flow_rate must be positive, got {}",
      i,
      offer.min_flow_rate
    );
    anyhow::ensure!(
      offer.freeze_period_seconds > 0,
      "Offer {i} freeze_period_seconds must be positive"
    );
    anyhow::ensure!(
      config.feeds.iter().any(|f| f.id == offer.feed),
      "Offer {} references unknown feed {}",
      i,
      offer.feed
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_parses() {
    let config: AppConfig = toml::from_str(
      r#"
        [service]
        name = "streambet"
      "#,
    )
    .unwrap();
    assert!(validate_config(&config).is_ok());
    assert!(config.metrics.enabled);
    assert_eq!(config.sweeper.interval_seconds, 30);
  }

  #[test]
  fn test_offer_with_unknown_feed_rejected() {
    let config: AppConfig = toml::from_str(
      r#"
        [service]
        name = "streambet"

        [[offers]]
        owner = "alice"
        strike_price = "2000"
        direction = "call"
        freeze_period_seconds = 604800
        min_flow_rate = "10"
        feed = "ETH-USD"
      "#,
    )
    .unwrap();
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("unknown feed"));
  }

  #[test]
  fn test_full_config_parses() {
    let config: AppConfig = toml::from_str(
      r#"
        [service]
        name = "streambet"
        log_level = "debug"

        [metrics]
        enabled = false

        [sweeper]
        interval_seconds = 5

        [[feeds]]
        id = "ETH-USD"
        initial_price = "2000"

        [[accounts]]
        name = "bob"
        deposit = "250"

        [[offers]]
        owner = "alice"
        strike_price = "2000"
        direction = "put"
        freeze_period_seconds = 60
        min_flow_rate = "0.001"
        feed = "ETH-USD"
      "#,
    )
    .unwrap();
    assert!(validate_config(&config).is_ok());
    assert_eq!(config.offers.len(), 1);
    assert_eq!(
      config.offers[0].direction,
      crate::domain::offer::Direction::Put
    );
  }
}
