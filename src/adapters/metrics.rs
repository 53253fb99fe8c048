//! Prometheus Metrics Registry - Settlement Observability
//!
//! Registers and exposes Prometheus metrics for the offer lifecycle.
//! Covers creations, settlements by winner and sweep timing.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, Gauge, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::info;

/// Centralized Prometheus metrics for the settlement service.
///
/// All metrics follow the naming convention `streambet_*` and label
/// settlement counters by the winning side.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Total offers created, labelled by direction.
    pub offers_created: IntCounterVec,
    /// Total offers settled, labelled by winner.
    pub offers_settled: IntCounterVec,
    /// Settlement failures observed by the sweeper.
    pub sweep_failures: IntCounter,
    /// Registry entries scanned by the last sweep.
    pub sweep_scanned: Gauge,
    /// Sweep duration in seconds.
    pub sweep_duration: prometheus::Histogram,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let offers_created = IntCounterVec::new(
            Opts::new("streambet_offers_created_total", "Total offers created"),
            &["direction"],
        )?;

        let offers_settled = IntCounterVec::new(
            Opts::new("streambet_offers_settled_total", "Total offers settled"),
            &["winner"],
        )?;

        let sweep_failures = IntCounter::new(
            "streambet_sweep_failures_total",
            "Settlements that failed during a sweep",
        )?;

        let sweep_scanned = Gauge::new(
            "streambet_sweep_scanned",
            "Registry entries scanned by the last sweep",
        )?;

        let sweep_duration = prometheus::Histogram::with_opts(
            HistogramOpts::new(
                "streambet_sweep_duration_seconds",
                "Time spent in one settlement sweep",
            )
            .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;

        // Register all metrics
        registry.register(Box::new(offers_created.clone()))?;
        registry.register(Box::new(offers_settled.clone()))?;
        registry.register(Box::new(sweep_failures.clone()))?;
        registry.register(Box::new(sweep_scanned.clone()))?;
        registry.register(Box::new(sweep_duration.clone()))?;

        Ok(Self {
            registry,
            offers_created,
            offers_settled,
            sweep_failures,
            sweep_scanned,
            sweep_duration,
        })
    }

    /// Serve Prometheus metrics on the configured bind address.
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let registry = metrics_self.registry.clone();
                async move {
                    let encoder = TextEncoder::new();
                    let metric_families = registry.gather();
                    let mut buffer = Vec::new();
                    if encoder.encode(&metric_families, &mut buffer).is_err() {
                        return String::new();
                    }
                    String::from_utf8(buffer).unwrap_or_default()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
