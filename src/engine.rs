//! # Trending Engine
//! Query-facing facade over the repository, the hotword tracker and the
//! orchestrator. Controllers (HTTP routes, scheduler) only talk to this type.
//!
//! Keyword feed: each triggered cycle extracts keywords from the title and body
//! of content published since the previous fed cycle (all content on the first
//! one). The cursor is persisted with the hotword snapshot, so a restart does not
//! feed the same content twice.
//!
//! Terms passed in by callers are normalized with [`normalize_term`] so manual
//! entries and extracted keywords share one hotword.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clout::CLOUT_SLOTS;
use crate::config::EngineConfig;
use crate::heat::HeatDecay;
use crate::hotword::HotwordTracker;
use crate::keywords::{normalize_term, KeywordExtractor};
use crate::orchestrator::{CycleReport, UpdateOrchestrator};
use crate::ranking::{self, RankedEntry};
use crate::snapshot::Snapshot;
use crate::store::{ContentItem, ContentRepository, Source};

pub struct TrendingEngine {
    repo: Arc<dyn ContentRepository>,
    hotwords: Arc<HotwordTracker>,
    orchestrator: UpdateOrchestrator,
    extractor: Arc<dyn KeywordExtractor>,
    keywords_per_item: usize,
    /// Held from reading the feed cursor until the fed cycle has moved it.
    trigger_lock: Mutex<()>,
}

impl TrendingEngine {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        hotwords: Arc<HotwordTracker>,
        extractor: Arc<dyn KeywordExtractor>,
        cfg: &EngineConfig,
    ) -> Self {
        let orchestrator =
            UpdateOrchestrator::new(repo.clone(), hotwords.clone(), HeatDecay::new(cfg.decay_k))
                .with_snapshot_path(cfg.snapshot_path.clone());
        Self {
            repo,
            hotwords,
            orchestrator,
            extractor,
            keywords_per_item: cfg.keywords_per_item,
            trigger_lock: Mutex::new(()),
        }
    }

    pub fn hotwords(&self) -> &Arc<HotwordTracker> {
        &self.hotwords
    }

    pub fn get_top_hotwords(&self, limit: usize) -> Vec<String> {
        self.hotwords.top_by_word(limit)
    }

    pub fn get_clout_history(&self, term: &str) -> [f64; CLOUT_SLOTS] {
        self.hotwords.clout_of(&normalize_term(term))
    }

    pub async fn get_top_content(&self, limit: usize) -> Result<Vec<RankedEntry<ContentItem>>> {
        let items = self
            .repo
            .list_all_content()
            .await
            .context("listing content for ranking")?;
        Ok(ranking::top_k(items, |c| c.heat, limit))
    }

    pub async fn get_top_sources(&self, limit: usize) -> Result<Vec<RankedEntry<Source>>> {
        let sources = self
            .repo
            .list_all_sources()
            .await
            .context("listing sources for ranking")?;
        Ok(ranking::top_k(sources, |s| s.heat, limit))
    }

    /// Manual entry: start tracking a term. Returns the key it is tracked under.
    pub fn ensure_hotword(&self, term: &str) -> String {
        let key = normalize_term(term);
        self.hotwords.ensure_exists(&key);
        key
    }

    /// Manual entry: push a clout value for a known term. Returns false for unknown terms.
    pub fn set_clout(&self, term: &str, value: f64) -> bool {
        self.hotwords.set_clout_direct(&normalize_term(term), value)
    }

    /// Load persisted hotwords and feed cursor. Returns restored hotwords.
    pub fn restore(&self, snap: Snapshot) -> usize {
        self.orchestrator.restore(snap)
    }

    /// `now` of the last triggered cycle, restored across restarts.
    pub fn last_fed_cycle(&self) -> Option<DateTime<Utc>> {
        self.orchestrator.feed_cursor()
    }

    /// Run a cycle at `now`, feeding keywords from newly published content.
    pub async fn trigger_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let _guard = self.trigger_lock.lock().await;
        let since = self.orchestrator.feed_cursor();

        let keywords = match self.collect_keywords(since, now).await {
            Ok(k) => k,
            Err(e) => {
                tracing::warn!(target: "cycle", error = %format!("{e:#}"), "keyword feed skipped");
                Vec::new()
            }
        };

        self.orchestrator.run_fed_cycle(now, &keywords).await
    }

    /// Run a cycle with an explicit keyword list (no feed).
    pub async fn run_cycle_with(&self, now: DateTime<Utc>, keywords: &[(String, f64)]) -> CycleReport {
        self.orchestrator.run_cycle(now, keywords).await
    }

    async fn collect_keywords(
        &self,
        since: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, f64)>> {
        let items = self
            .repo
            .list_all_content()
            .await
            .context("listing content for keyword feed")?;

        let mut out = Vec::new();
        for it in items
            .iter()
            .filter(|it| it.published_at <= now && since.map_or(true, |s| it.published_at > s))
        {
            let text = format!("{} {}", it.title, it.body);
            out.extend(self.extractor.extract(&text, self.keywords_per_item));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::TermFrequencyExtractor;
    use crate::store::InMemoryRepository;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn item(id: &str, title: &str, src: &str, likes: u64, published_at: DateTime<Utc>) -> ContentItem {
        ContentItem {
            id: id.into(),
            title: title.into(),
            body: String::new(),
            source_id: src.into(),
            likes,
            reads: 0,
            published_at,
            heat: 0.0,
        }
    }

    fn engine(repo: Arc<InMemoryRepository>) -> TrendingEngine {
        TrendingEngine::new(
            repo,
            Arc::new(HotwordTracker::new()),
            Arc::new(TermFrequencyExtractor::default()),
            &EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn feed_only_uses_content_published_since_last_cycle() {
        let repo = Arc::new(InMemoryRepository::with_data(
            vec![],
            vec![item("1", "rabies", "s", 1, t0() - Duration::hours(1))],
        ));
        let eng = engine(repo.clone());

        eng.trigger_cycle(t0()).await;
        assert_eq!(eng.get_clout_history("rabies"), [1.0, 0.0, 0.0, 0.0, 0.0]);

        repo.upsert_content(item("2", "measles", "s", 1, t0() + Duration::minutes(5)));
        eng.trigger_cycle(t0() + Duration::minutes(10)).await;
        assert_eq!(eng.get_clout_history("rabies"), [0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(eng.get_clout_history("measles"), [1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(eng.get_top_hotwords(1), vec!["measles"]);
    }

    #[tokio::test]
    async fn top_content_and_sources_rank_by_heat() {
        let repo = Arc::new(InMemoryRepository::with_data(
            vec![
                Source { id: "a".into(), name: "A".into(), heat: 0.0 },
                Source { id: "b".into(), name: "B".into(), heat: 0.0 },
            ],
            vec![
                item("low", "x", "a", 1, t0()),
                item("high", "y", "b", 9, t0()),
                item("mid", "z", "a", 5, t0()),
            ],
        ));
        let eng = engine(repo);
        eng.trigger_cycle(t0()).await;

        let content = eng.get_top_content(10).await.unwrap();
        let ids: Vec<_> = content.iter().map(|e| e.item.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
        assert_eq!(content[2].rank, 3);

        let sources = eng.get_top_sources(1).await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].item.id, "b");
        assert_eq!(sources[0].item.heat, 9.0);
    }

    #[test]
    fn manual_entries_follow_tracker_rules() {
        let eng = engine(Arc::new(InMemoryRepository::new()));
        assert!(!eng.set_clout("nope", 1.0));
        eng.ensure_hotword("nope");
        assert!(eng.set_clout("nope", 1.0));
        assert_eq!(eng.get_clout_history("nope")[0], 1.0);
    }

    #[tokio::test]
    async fn manual_term_in_any_case_joins_the_extracted_hotword() {
        let repo = Arc::new(InMemoryRepository::with_data(
            vec![],
            vec![item("1", "rabies", "s", 1, t0() - Duration::hours(1))],
        ));
        let eng = engine(repo);

        assert_eq!(eng.ensure_hotword(" Rabies "), "rabies");
        assert!(eng.set_clout("RABIES", 7.0));
        eng.trigger_cycle(t0()).await;

        assert_eq!(eng.hotwords().len(), 1);
        assert_eq!(eng.get_clout_history("Rabies"), [1.0, 7.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn restored_cursor_skips_content_already_fed() {
        let repo = Arc::new(InMemoryRepository::with_data(
            vec![],
            vec![item("1", "rabies", "s", 1, t0() - Duration::hours(1))],
        ));
        let eng = engine(repo);
        eng.restore(Snapshot {
            last_cycle: Some(t0()),
            hotwords: Vec::new(),
        });

        let report = eng.trigger_cycle(t0() + Duration::minutes(5)).await;
        assert_eq!(report.keywords_ingested, 0);
        assert_eq!(eng.last_fed_cycle(), Some(t0() + Duration::minutes(5)));
    }
}
