//! # Content Heat
//! Recomputes and persists heat for every content item.
//!
//! Best-effort sweep: a failed save is logged and recorded in the
//! [`SweepReport`], the remaining items are still processed. Heat is fully
//! derived, so the next cycle repairs anything a failed save left stale.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;

use crate::heat::HeatDecay;
use crate::store::ContentRepository;

/// Outcome of one sweep over a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub updated: usize,
    pub failures: Vec<SweepFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepFailure {
    pub id: String,
    pub error: String,
}

impl SweepReport {
    pub(crate) fn record_failure(&mut self, target: &'static str, id: &str, err: anyhow::Error) {
        tracing::warn!(target: "heat", kind = target, id, error = %format!("{err:#}"), "save failed");
        counter!("trending_sweep_failures_total", "kind" => target).increment(1);
        self.failures.push(SweepFailure {
            id: id.to_string(),
            error: format!("{err:#}"),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ContentHeatStore {
    repo: Arc<dyn ContentRepository>,
    decay: HeatDecay,
}

impl ContentHeatStore {
    pub fn new(repo: Arc<dyn ContentRepository>, decay: HeatDecay) -> Self {
        Self { repo, decay }
    }

    /// Recompute every item's heat at `now` and save it back (no dirty check).
    pub async fn recompute_all(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let items = self
            .repo
            .list_all_content()
            .await
            .context("listing content for heat sweep")?;

        let mut report = SweepReport::default();
        for mut item in items {
            item.heat = self
                .decay
                .compute_heat(item.likes, item.reads, item.published_at, now);
            match self.repo.save_content(&item).await {
                Ok(()) => report.updated += 1,
                Err(e) => report.record_failure("content", &item.id, e),
            }
        }

        tracing::debug!(
            target: "heat",
            updated = report.updated,
            failed = report.failures.len(),
            "content heat sweep"
        );
        Ok(report)
    }
}
