//! Source heat = sum of the heat of the source's content items.
//!
//! Items are grouped by `source_id` once per sweep, so the cost is
//! O(items + sources). Must run after the content heat sweep of the same cycle.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;

use crate::content_heat::SweepReport;
use crate::store::ContentRepository;

pub struct SourceAggregator {
    repo: Arc<dyn ContentRepository>,
}

impl SourceAggregator {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Reset and re-sum every source's heat, then save it.
    pub async fn recompute_all(&self) -> Result<SweepReport> {
        let items = self
            .repo
            .list_all_content()
            .await
            .context("listing content for source aggregation")?;
        let sources = self
            .repo
            .list_all_sources()
            .await
            .context("listing sources for aggregation")?;

        let mut totals: HashMap<&str, f64> = HashMap::new();
        for it in &items {
            *totals.entry(it.source_id.as_str()).or_default() += it.heat;
        }

        let mut report = SweepReport::default();
        for mut src in sources {
            src.heat = totals.get(src.id.as_str()).copied().unwrap_or(0.0);
            match self.repo.save_source(&src).await {
                Ok(()) => report.updated += 1,
                Err(e) => report.record_failure("source", &src.id, e),
            }
        }

        tracing::debug!(
            target: "heat",
            updated = report.updated,
            failed = report.failures.len(),
            "source heat sweep"
        );
        Ok(report)
    }
}
