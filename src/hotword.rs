//! # Hotword Tracker
//! Keyed store of tracked terms, each owning a [`CloutWindow`].
//!
//! - `accumulate_heat` collects weights for the running cycle into a pending bucket.
//! - `advance_cycle` folds every pending bucket into the window (once per cycle).
//! - Reads never fail: unknown terms report a zero-filled history.
//!
//! Terms are kept in insertion order so ranking ties resolve to the
//! first-created term. Terms are never evicted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::clout::{CloutWindow, CLOUT_SLOTS};
use crate::ranking::{self, RankedEntry};

/// One tracked term.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotword {
    pub term: String,
    pub clout: CloutWindow,
    /// Number of keyword sightings so far (never decreases).
    pub occurrences: u64,
    /// Weight gathered during the running cycle; folded by `advance_cycle`.
    pub pending_heat: f64,
}

impl Hotword {
    fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            clout: CloutWindow::new(),
            occurrences: 0,
            pending_heat: 0.0,
        }
    }
}

/// Persisted shape of a hotword (pending heat is never stored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotwordRecord {
    pub term: String,
    pub clout_history: [f64; CLOUT_SLOTS],
    pub occurrence_count: u64,
}

#[derive(Debug, Default)]
pub struct HotwordTracker {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Insertion-ordered hotwords.
    words: Vec<Hotword>,
    /// term -> position in `words`
    index: HashMap<String, usize>,
}

impl Inner {
    fn ensure(&mut self, term: &str) -> usize {
        if let Some(&i) = self.index.get(term) {
            return i;
        }
        let i = self.words.len();
        self.words.push(Hotword::new(term));
        self.index.insert(term.to_string(), i);
        i
    }

    fn get_mut(&mut self, term: &str) -> Option<&mut Hotword> {
        let i = *self.index.get(term)?;
        self.words.get_mut(i)
    }
}

impl HotwordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `term` if unknown. Existing history is left untouched.
    pub fn ensure_exists(&self, term: &str) {
        let mut inner = self.inner.write().expect("hotword lock poisoned");
        inner.ensure(term);
    }

    /// Push `value` straight into the window of a known term.
    /// Unknown terms are ignored (not created).
    pub fn set_clout_direct(&self, term: &str, value: f64) -> bool {
        let mut inner = self.inner.write().expect("hotword lock poisoned");
        match inner.get_mut(term) {
            Some(hw) => {
                hw.clout.push(value);
                true
            }
            None => false,
        }
    }

    /// Add `delta` to the pending bucket of `term`, creating the term first if needed.
    pub fn accumulate_heat(&self, term: &str, delta: f64) {
        let mut inner = self.inner.write().expect("hotword lock poisoned");
        let i = inner.ensure(term);
        let hw = &mut inner.words[i];
        hw.pending_heat += delta;
        hw.occurrences = hw.occurrences.saturating_add(1);
    }

    /// Fold every pending bucket into its window and reset it.
    /// Call exactly once per cycle, after all accumulation for that cycle.
    pub fn advance_cycle(&self) -> usize {
        let mut inner = self.inner.write().expect("hotword lock poisoned");
        for hw in inner.words.iter_mut() {
            hw.clout.push(hw.pending_heat);
            hw.pending_heat = 0.0;
        }
        inner.words.len()
    }

    /// Up to `limit` terms by most recent clout, descending.
    pub fn top_by_word(&self, limit: usize) -> Vec<String> {
        self.top_ranked(limit)
            .into_iter()
            .map(|e| e.item.term)
            .collect()
    }

    /// Ranked snapshot of the strongest hotwords.
    pub fn top_ranked(&self, limit: usize) -> Vec<RankedEntry<Hotword>> {
        let inner = self.inner.read().expect("hotword lock poisoned");
        ranking::top_k(inner.words.iter().cloned(), |hw| hw.clout.current_top(), limit)
    }

    /// Clout history of `term`, newest first; zeros if the term is unknown.
    pub fn clout_of(&self, term: &str) -> [f64; CLOUT_SLOTS] {
        let inner = self.inner.read().expect("hotword lock poisoned");
        inner
            .index
            .get(term)
            .and_then(|&i| inner.words.get(i))
            .map(|hw| hw.clout.as_sequence())
            .unwrap_or([0.0; CLOUT_SLOTS])
    }

    pub fn get(&self, term: &str) -> Option<Hotword> {
        let inner = self.inner.read().expect("hotword lock poisoned");
        inner.index.get(term).and_then(|&i| inner.words.get(i)).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("hotword lock poisoned").words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persistable view in insertion order.
    pub fn snapshot(&self) -> Vec<HotwordRecord> {
        let inner = self.inner.read().expect("hotword lock poisoned");
        inner
            .words
            .iter()
            .map(|hw| HotwordRecord {
                term: hw.term.clone(),
                clout_history: hw.clout.as_sequence(),
                occurrence_count: hw.occurrences,
            })
            .collect()
    }

    /// Load stored records. Known terms get their history replaced,
    /// unknown ones are appended in record order.
    pub fn restore(&self, records: Vec<HotwordRecord>) -> usize {
        let mut inner = self.inner.write().expect("hotword lock poisoned");
        let n = records.len();
        for rec in records {
            let i = inner.ensure(&rec.term);
            let hw = &mut inner.words[i];
            hw.clout = CloutWindow::from_slots(rec.clout_history);
            hw.occurrences = hw.occurrences.max(rec.occurrence_count);
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent_and_keeps_history() {
        let t = HotwordTracker::new();
        t.ensure_exists("rust");
        assert!(t.set_clout_direct("rust", 4.0));
        t.ensure_exists("rust");
        assert_eq!(t.clout_of("rust"), [4.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn set_clout_direct_ignores_unknown_terms() {
        let t = HotwordTracker::new();
        assert!(!t.set_clout_direct("ghost", 9.0));
        assert!(t.is_empty());
        assert_eq!(t.clout_of("ghost"), [0.0; CLOUT_SLOTS]);
    }

    #[test]
    fn same_cycle_accumulation_lands_in_one_slot() {
        let t = HotwordTracker::new();
        t.accumulate_heat("rabies", 2.0);
        t.accumulate_heat("rabies", 3.0);
        t.advance_cycle();
        assert_eq!(t.clout_of("rabies"), [5.0, 0.0, 0.0, 0.0, 0.0]);

        let hw = t.get("rabies").unwrap();
        assert_eq!(hw.pending_heat, 0.0);
        assert_eq!(hw.occurrences, 2);
    }

    #[test]
    fn quiet_terms_fade_to_zero_but_stay_tracked() {
        let t = HotwordTracker::new();
        t.accumulate_heat("flu", 1.5);
        t.advance_cycle();
        for _ in 0..CLOUT_SLOTS {
            t.advance_cycle();
        }
        assert_eq!(t.clout_of("flu"), [0.0; CLOUT_SLOTS]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("flu").unwrap().occurrences, 1);
    }

    #[test]
    fn top_by_word_breaks_ties_by_insertion_order() {
        let t = HotwordTracker::new();
        t.accumulate_heat("b", 1.0);
        t.accumulate_heat("a", 1.0);
        t.accumulate_heat("c", 2.0);
        t.ensure_exists("d");
        t.advance_cycle();

        assert_eq!(t.top_by_word(3), vec!["c", "b", "a"]);
        assert_eq!(t.top_by_word(10).len(), 4);
        assert!(t.top_by_word(0).is_empty());
    }

    #[test]
    fn snapshot_restore_keeps_order_and_history() {
        let t = HotwordTracker::new();
        t.accumulate_heat("x", 1.0);
        t.accumulate_heat("y", 2.0);
        t.advance_cycle();
        t.accumulate_heat("y", 0.5);

        let snap = t.snapshot();
        assert_eq!(snap[0].term, "x");
        assert_eq!(snap[1].clout_history, [2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(snap[1].occurrence_count, 2);

        let fresh = HotwordTracker::new();
        assert_eq!(fresh.restore(snap.clone()), 2);
        assert_eq!(fresh.snapshot(), snap);
        assert_eq!(fresh.get("y").unwrap().pending_heat, 0.0);
    }
}
