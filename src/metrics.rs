use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process).
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("trending_cycles_total", "Completed update cycles.");
        describe_counter!(
            "trending_sweep_failures_total",
            "Per-item save failures during heat sweeps."
        );
        describe_counter!(
            "trending_keywords_ingested_total",
            "Keyword weights folded into hotword accumulators."
        );
        describe_histogram!("trending_cycle_ms", "Update cycle duration in milliseconds.");
        describe_gauge!("trending_hotwords_tracked", "Hotwords currently tracked.");
        describe_gauge!("trending_last_cycle_ts", "Unix ts when the last cycle finished.");
    });
}
