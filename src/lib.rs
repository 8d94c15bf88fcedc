// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod engine;
pub mod keywords;
pub mod metrics;
pub mod scheduler;
pub mod snapshot;
pub mod store;

// Scoring core
pub mod clout;
pub mod content_heat;
pub mod heat;
pub mod hotword;
pub mod orchestrator;
pub mod ranking;
pub mod source_heat;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::EngineConfig;
pub use crate::engine::TrendingEngine;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::hotword::HotwordTracker;
use crate::keywords::TermFrequencyExtractor;
use crate::store::InMemoryRepository;

/// Install the global tracing subscriber.
/// `RUST_LOG` wins; otherwise info for the crate and its `cycle`, `heat` and `api` targets.
/// `TRENDING_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("content_trending=info,cycle=info,heat=info,api=info,warn"));

    let json = std::env::var("TRENDING_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: a host (e.g. the shuttle runtime) may have installed one already
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

/// Wire repository, tracker and engine from config, restoring hotword
/// history and the feed cursor from the snapshot when one is configured.
///
/// An unparsable snapshot is moved to `<path>.corrupt` and the engine starts
/// empty; any other snapshot I/O failure is an error.
pub async fn build_engine(cfg: &EngineConfig) -> Result<Arc<TrendingEngine>> {
    let repo = match &cfg.dataset_path {
        Some(p) => {
            let repo = InMemoryRepository::load_from_file(p)?;
            info!(path = %p.display(), "dataset loaded");
            repo
        }
        None => {
            warn!("no dataset_path configured; starting with an empty repository");
            InMemoryRepository::new()
        }
    };

    let engine = TrendingEngine::new(
        Arc::new(repo),
        Arc::new(HotwordTracker::new()),
        Arc::new(TermFrequencyExtractor::default()),
        cfg,
    );

    if let Some(p) = &cfg.snapshot_path {
        let snap = snapshot::load_or_quarantine(p)
            .await
            .context("restoring hotword snapshot")?;
        let last_cycle = snap.last_cycle;
        let n = engine.restore(snap);
        info!(restored = n, last_cycle = ?last_cycle, path = %p.display(), "hotword snapshot");
    }

    Ok(Arc::new(engine))
}
