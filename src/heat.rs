//! # Heat Decay
//! Pure scoring that maps `(likes, reads, published_at, now)` → heat.
//! No I/O, suitable for unit tests and offline recomputation.
//!
//! heat = trunc((likes + reads) * exp(-k * whole_days_since_publish))

use chrono::{DateTime, Utc};

/// Default decay constant per elapsed day.
pub const DEFAULT_DECAY_K: f64 = 0.05;

/// Exponential day-based decay with a tunable constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatDecay {
    k: f64,
}

impl Default for HeatDecay {
    fn default() -> Self {
        Self { k: DEFAULT_DECAY_K }
    }
}

impl HeatDecay {
    /// Negative or non-finite constants fall back to the default.
    pub fn new(k: f64) -> Self {
        if k.is_finite() && k >= 0.0 {
            Self { k }
        } else {
            Self::default()
        }
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /// Compute heat for one item. Items published "in the future" count as day 0.
    pub fn compute_heat(
        &self,
        likes: u64,
        reads: u64,
        published_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f64 {
        let interaction = likes.saturating_add(reads) as f64;
        let days = (now - published_at).num_days().max(0);
        self.heat_for_days(interaction, days)
    }

    /// Same formula with the day count already known.
    pub fn heat_for_days(&self, interaction: f64, days: i64) -> f64 {
        let time_factor = (-self.k * days.max(0) as f64).exp();
        // truncation, not rounding: heat is only used for ranking
        (interaction * time_factor).trunc()
    }
}
