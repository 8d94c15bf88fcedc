//! # Update Orchestrator
//! One cycle, strictly ordered:
//! 1) content heat sweep
//! 2) source heat aggregation (sees step 1's writes)
//! 3) keyword weights → hotword accumulators
//! 4) advance every hotword window
//!
//! Whole cycles are serialized by an async mutex, so one cycle's
//! `advance_cycle` can never interleave with another cycle's accumulation.
//!
//! The keyword-feed cursor lives here so it is moved and persisted in the
//! same critical section as the hotword windows it fed.

use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::sync::Mutex;

use crate::content_heat::{ContentHeatStore, SweepReport};
use crate::heat::HeatDecay;
use crate::hotword::HotwordTracker;
use crate::snapshot::{self, Snapshot};
use crate::source_heat::SourceAggregator;
use crate::store::ContentRepository;

/// Summary of one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub at: DateTime<Utc>,
    /// `None` when the sweep could not start (listing failed).
    pub content: Option<SweepReport>,
    pub sources: Option<SweepReport>,
    pub keywords_ingested: usize,
    pub hotwords_tracked: usize,
    pub errors: Vec<String>,
}

pub struct UpdateOrchestrator {
    content: ContentHeatStore,
    sources: SourceAggregator,
    hotwords: Arc<HotwordTracker>,
    snapshot_path: Option<PathBuf>,
    feed_cursor: RwLock<Option<DateTime<Utc>>>,
    cycle_lock: Mutex<()>,
}

impl UpdateOrchestrator {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        hotwords: Arc<HotwordTracker>,
        decay: HeatDecay,
    ) -> Self {
        Self {
            content: ContentHeatStore::new(repo.clone(), decay),
            sources: SourceAggregator::new(repo),
            hotwords,
            snapshot_path: None,
            feed_cursor: RwLock::new(None),
            cycle_lock: Mutex::new(()),
        }
    }

    /// Persist hotword history after every cycle.
    pub fn with_snapshot_path(mut self, path: Option<PathBuf>) -> Self {
        self.snapshot_path = path;
        self
    }

    pub fn hotwords(&self) -> &Arc<HotwordTracker> {
        &self.hotwords
    }

    /// `now` of the last fed cycle, if any.
    pub fn feed_cursor(&self) -> Option<DateTime<Utc>> {
        *self.feed_cursor.read().expect("feed cursor lock poisoned")
    }

    /// Load persisted state into the tracker and cursor. Returns restored hotwords.
    pub fn restore(&self, snap: Snapshot) -> usize {
        *self.feed_cursor.write().expect("feed cursor lock poisoned") = snap.last_cycle;
        self.hotwords.restore(snap.hotwords)
    }

    /// Run a full cycle. Failures are tolerated per step and reported.
    pub async fn run_cycle(&self, now: DateTime<Utc>, keywords: &[(String, f64)]) -> CycleReport {
        self.run(now, keywords, false).await
    }

    /// Like [`run_cycle`](Self::run_cycle), for keywords fed from content
    /// published up to `now`: the feed cursor moves to `now` before the
    /// snapshot is written.
    pub async fn run_fed_cycle(&self, now: DateTime<Utc>, keywords: &[(String, f64)]) -> CycleReport {
        self.run(now, keywords, true).await
    }

    async fn run(&self, now: DateTime<Utc>, keywords: &[(String, f64)], fed: bool) -> CycleReport {
        let _guard = self.cycle_lock.lock().await;
        let started = Instant::now();
        let mut errors = Vec::new();

        // 1) content heat
        let content = match self.content.recompute_all(now).await {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::warn!(target: "cycle", error = %format!("{e:#}"), "content sweep skipped");
                errors.push(format!("{e:#}"));
                None
            }
        };

        // 2) source heat, after step 1 even if it failed (sources then reflect stored heat)
        let sources = match self.sources.recompute_all().await {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::warn!(target: "cycle", error = %format!("{e:#}"), "source sweep skipped");
                errors.push(format!("{e:#}"));
                None
            }
        };

        // 3) keyword ingestion
        for (term, weight) in keywords {
            self.hotwords.accumulate_heat(term, *weight);
        }
        counter!("trending_keywords_ingested_total").increment(keywords.len() as u64);

        // 4) finalize the cycle; nothing may accumulate after this point
        let hotwords_tracked = self.hotwords.advance_cycle();
        if fed {
            *self.feed_cursor.write().expect("feed cursor lock poisoned") = Some(now);
        }

        if let Some(path) = &self.snapshot_path {
            let snap = Snapshot {
                last_cycle: self.feed_cursor(),
                hotwords: self.hotwords.snapshot(),
            };
            if let Err(e) = snapshot::write_snapshot(path, &snap).await {
                tracing::warn!(target: "cycle", error = %format!("{e:#}"), "hotword snapshot");
                errors.push(format!("{e:#}"));
            }
        }

        let ms = started.elapsed().as_secs_f64() * 1000.0;
        counter!("trending_cycles_total").increment(1);
        histogram!("trending_cycle_ms").record(ms);
        gauge!("trending_hotwords_tracked").set(hotwords_tracked as f64);
        gauge!("trending_last_cycle_ts").set(now.timestamp() as f64);

        tracing::info!(
            target: "cycle",
            content = content.as_ref().map(|r| r.updated).unwrap_or(0),
            sources = sources.as_ref().map(|r| r.updated).unwrap_or(0),
            keywords = keywords.len(),
            hotwords = hotwords_tracked,
            ms,
            "cycle finished"
        );

        CycleReport {
            at: now,
            content,
            sources,
            keywords_ingested: keywords.len(),
            hotwords_tracked,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ContentItem, InMemoryRepository, Source};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap()
    }

    fn setup() -> (Arc<InMemoryRepository>, UpdateOrchestrator) {
        let repo = Arc::new(InMemoryRepository::with_data(
            vec![Source {
                id: "s".into(),
                name: "S".into(),
                heat: 0.0,
            }],
            vec![ContentItem {
                id: "c".into(),
                title: "c".into(),
                body: String::new(),
                source_id: "s".into(),
                likes: 100,
                reads: 200,
                published_at: now() - Duration::days(20),
                heat: 0.0,
            }],
        ));
        let orch = UpdateOrchestrator::new(
            repo.clone(),
            Arc::new(HotwordTracker::new()),
            HeatDecay::default(),
        );
        (repo, orch)
    }

    #[tokio::test]
    async fn cycle_runs_all_steps_in_order() {
        let (repo, orch) = setup();
        let kw = vec![("rabies".to_string(), 2.0), ("rabies".to_string(), 3.0)];

        let report = orch.run_cycle(now(), &kw).await;
        assert!(report.errors.is_empty());
        assert_eq!(report.keywords_ingested, 2);
        assert_eq!(report.hotwords_tracked, 1);

        assert_eq!(repo.content("c").unwrap().heat, 110.0);
        assert_eq!(repo.source("s").unwrap().heat, 110.0);
        assert_eq!(orch.hotwords().clout_of("rabies"), [5.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn empty_cycles_shift_windows() {
        let (_repo, orch) = setup();
        orch.run_cycle(now(), &[("flu".to_string(), 1.0)]).await;
        orch.run_cycle(now(), &[]).await;
        assert_eq!(orch.hotwords().clout_of("flu"), [0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn only_fed_cycles_move_the_cursor_into_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotwords.json");
        let (repo, _) = setup();
        let orch = UpdateOrchestrator::new(repo, Arc::new(HotwordTracker::new()), HeatDecay::default())
            .with_snapshot_path(Some(path.clone()));

        orch.run_cycle(now(), &[("flu".to_string(), 1.0)]).await;
        assert_eq!(orch.feed_cursor(), None);
        assert_eq!(snapshot::read_snapshot(&path).await.unwrap().last_cycle, None);

        let later = now() + Duration::minutes(5);
        orch.run_fed_cycle(later, &[]).await;
        assert_eq!(orch.feed_cursor(), Some(later));
        let snap = snapshot::read_snapshot(&path).await.unwrap();
        assert_eq!(snap.last_cycle, Some(later));
        assert_eq!(snap.hotwords[0].clout_history, [0.0, 1.0, 0.0, 0.0, 0.0]);
    }
}
