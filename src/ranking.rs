//! Generic top-K selection used for content, sources and hotwords.
//!
//! Sort key is the score, descending. Equal scores keep their input order
//! (stable sort), so callers control tie-breaking through iteration order.

use serde::Serialize;

/// Query-time ranked view; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry<T> {
    /// 1-based position.
    pub rank: usize,
    pub item: T,
}

/// Rank `items` by `score` and keep at most `k` of them.
pub fn top_k<T, I, F>(items: I, score: F, k: usize) -> Vec<RankedEntry<T>>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> f64,
{
    if k == 0 {
        return Vec::new();
    }

    // `+ 0.0` folds -0.0 into 0.0 so total_cmp treats them as a tie
    let mut scored: Vec<(f64, T)> = items
        .into_iter()
        .map(|it| (score(&it) + 0.0, it))
        .collect();
    // total_cmp keeps NaN from panicking; b-vs-a gives descending order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, (_, item))| RankedEntry { rank: i + 1, item })
        .collect()
}
