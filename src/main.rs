//! Streambet — Entry Point
//!
//! Initializes configuration, logging, the in-process adapters and the
//! offer registry. Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build adapters (clock, price board, stream ledger)
//! 4. Build BetFactory and seed offers from config
//! 5. Spawn metrics server (/metrics)
//! 6. Spawn health server (/live + /ready)
//! 7. Spawn settlement sweeper loop
//! 8. Wait for SIGINT → graceful shutdown (stop sweeps→drain→exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{broadcast, watch};
use tracing::{error, info};

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::{LedgerStreams, MetricsRegistry, PostedOracle, SystemClock};
use domain::offer::SettlementOutcome;
use usecases::{BetFactory, SettlementSweeper};

type Factory = BetFactory<PostedOracle, LedgerStreams, SystemClock>;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.service.log_level)
            }),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        feeds = config.feeds.len(),
        seed_offers = config.offers.len(),
        "Starting streambet settlement service"
    );

    // ── 3. Shutdown signal channels ─────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let (health_tx, health_rx) = watch::channel(true);

    // ── 4. Build adapters ───────────────────────────────────
    let clock = Arc::new(SystemClock);
    let oracle = Arc::new(
        PostedOracle::with_feeds(
            config
                .feeds
                .iter()
                .map(|f| (f.id.clone(), f.initial_price)),
        )
        .await,
    );
    let streams = Arc::new(
        LedgerStreams::with_deposits(
            config
                .accounts
                .iter()
                .map(|a| (a.name.clone(), a.deposit)),
        )
        .await,
    );

    // ── 5. Build the factory and seed offers from config ────
    let factory: Arc<Factory> = Arc::new(BetFactory::new(oracle, streams, clock));
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to build metrics")?);

    for seed in &config.offers {
        let (offer_id, offer) = factory
            .create_offer(
                seed.owner.clone(),
                seed.strike_price,
                seed.direction,
                seed.freeze_period_seconds,
                seed.min_flow_rate,
                seed.feed.clone(),
            )
            .with_context(|| format!("Failed to seed offer owned by {}", seed.owner))?;
        let direction = offer.terms().direction.to_string();
        metrics
            .offers_created
            .with_label_values(&[direction.as_str()])
            .inc();
        info!(offer_id, owner = %seed.owner, "Seed offer registered");
    }

    // ── 6. Spawn metrics server ─────────────────────────────
    let metrics_handle = if config.metrics.enabled {
        let serve_metrics = Arc::clone(&metrics);
        let metrics_shutdown = shutdown_tx.subscribe();
        let bind = config.metrics.bind_address.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = serve_metrics.serve(bind, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    // ── 7. Spawn health server ──────────────────────────────
    let health_handle = tokio::spawn(serve_health(
        config.service.health_bind.clone(),
        health_rx,
    ));

    // ── 8. Spawn settlement sweeper loop ────────────────────
    let sweeper_handle = if config.sweeper.enabled {
        let sweeper = SettlementSweeper::new(Arc::clone(&factory));
        let sweep_metrics = Arc::clone(&metrics);
        let interval = std::time::Duration::from_secs(config.sweeper.interval_seconds);
        let mut sweeper_shutdown = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = sweeper_shutdown.recv() => {
                        info!("Sweeper received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let timer = sweep_metrics.sweep_duration.start_timer();
                        let report = sweeper.sweep().await;
                        timer.observe_duration();

                        sweep_metrics.sweep_scanned.set(report.scanned as f64);
                        for settlement in &report.settled {
                            let winner = match settlement.outcome {
                                SettlementOutcome::OwnerWins => "owner",
                                SettlementOutcome::BuyerWins => "buyer",
                            };
                            sweep_metrics
                                .offers_settled
                                .with_label_values(&[winner])
                                .inc();
                        }
                        sweep_metrics
                            .sweep_failures
                            .inc_by(report.failed.len() as u64);
                    }
                }
            }
        }))
    } else {
        None
    };

    info!("All tasks spawned — service is running");

    // ── 9. Wait for SIGINT ──────────────────────────────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
    }

    // ── Graceful shutdown ───────────────────────────────────

    // 1. Signal all tasks to stop
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    // 2. Mark health as unhealthy (readiness probe → 503)
    let _ = health_tx.send(false);

    // 3. Wait for the sweeper to finish its current sweep (up to 30s)
    if let Some(handle) = sweeper_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    // 4. Wait for the metrics server to close (up to 5s)
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
    }

    // 5. Stop health server
    health_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

/// Serve health endpoints.
///
/// - `/live`  — Liveness probe: 200 if process is running
/// - `/ready` — Readiness probe: 503 during graceful shutdown
async fn serve_health(bind_address: String, health_rx: watch::Receiver<bool>) -> Result<()> {
    use axum::{extract::State, http::StatusCode, routing::get, Router};

    let app = Router::new()
        .route("/live", get(|| async { StatusCode::OK }))
        .route(
            "/ready",
            get(
                move |State(rx): State<watch::Receiver<bool>>| async move {
                    if *rx.borrow() {
                        StatusCode::OK
                    } else {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                },
            ),
        )
        .with_state(health_rx);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Health server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
