// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::engine::TrendingEngine;

#[derive(Clone, Copy, Debug)]
pub struct CycleSchedulerCfg {
    pub interval_secs: u64,
}

/// Spawn the periodic update job. Ticks never overlap: the next tick
/// waits for the running cycle, and missed ticks are delayed, not burst.
pub fn spawn_cycle_scheduler(engine: Arc<TrendingEngine>, cfg: CycleSchedulerCfg) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now();
            let report = engine.trigger_cycle(now).await;
            if !report.errors.is_empty() {
                tracing::warn!(
                    target: "cycle",
                    errors = report.errors.len(),
                    "scheduled cycle finished with errors"
                );
            }
        }
    })
}
