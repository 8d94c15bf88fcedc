//! Content trending service: binary entrypoint.
//! Boots the Axum HTTP server, the periodic update cycle and metrics.

use shuttle_axum::ShuttleAxum;

use content_trending::metrics::Metrics;
use content_trending::scheduler::{spawn_cycle_scheduler, CycleSchedulerCfg};
use content_trending::{api, build_engine, init_tracing, AppState, EngineConfig};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = EngineConfig::load_default()?;
    tracing::info!(
        decay_k = cfg.decay_k,
        interval_secs = cfg.interval_secs,
        keywords_per_item = cfg.keywords_per_item,
        "engine config"
    );

    let engine = build_engine(&cfg).await?;

    let metrics = if cfg.metrics_enabled {
        match Metrics::init() {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "metrics disabled");
                None
            }
        }
    } else {
        None
    };

    spawn_cycle_scheduler(
        engine.clone(),
        CycleSchedulerCfg {
            interval_secs: cfg.interval_secs,
        },
    );

    let state = AppState {
        engine,
        default_limit: cfg.default_limit,
    };
    let router = api::router(state, metrics.as_ref());

    Ok(router.into())
}
