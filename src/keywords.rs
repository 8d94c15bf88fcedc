//! Keyword extraction seam.
//!
//! The engine only consumes ranked `(term, weight)` pairs. `TermFrequencyExtractor`
//! is a small stand-in so the service runs without an external extractor;
//! swap in a TF-IDF implementation behind the same trait.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashMap;

/// Canonical hotword key: trimmed and lowercased. Extracted terms and
/// manual entries both go through this, so they land on the same hotword.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

pub trait KeywordExtractor: Send + Sync {
    /// Up to `n` terms ranked by importance, highest first.
    fn extract(&self, text: &str, n: usize) -> Vec<(String, f64)>;
}

/// Default stop words (English function words).
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "has", "have",
    "he", "her", "his", "in", "into", "is", "it", "its", "not", "of", "on", "or", "she", "that",
    "the", "their", "them", "they", "this", "to", "was", "were", "which", "will", "with", "you",
];

/// Weight = occurrences of the term / number of kept tokens.
#[derive(Debug, Clone)]
pub struct TermFrequencyExtractor {
    min_len: usize,
}

impl Default for TermFrequencyExtractor {
    fn default() -> Self {
        Self { min_len: 2 }
    }
}

impl TermFrequencyExtractor {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    fn tokens<'a>(&self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        static RE_WORD: OnceCell<Regex> = OnceCell::new();
        let re = RE_WORD.get_or_init(|| Regex::new(r"(?u)\b\w+\b").expect("word regex"));
        let min_len = self.min_len;
        re.find_iter(text)
            .map(|m| normalize_term(m.as_str()))
            .filter(move |t| t.chars().count() >= min_len)
            .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
            .filter(|t| !STOP_WORDS.contains(&t.as_str()))
    }
}

impl KeywordExtractor for TermFrequencyExtractor {
    fn extract(&self, text: &str, n: usize) -> Vec<(String, f64)> {
        if n == 0 {
            return Vec::new();
        }

        // first-seen order keeps ties deterministic
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut total = 0usize;
        for tok in self.tokens(text) {
            total += 1;
            let c = counts.entry(tok.clone()).or_insert(0);
            if *c == 0 {
                order.push(tok);
            }
            *c += 1;
        }
        if total == 0 {
            return Vec::new();
        }

        let mut out: Vec<(String, f64)> = order
            .into_iter()
            .map(|t| {
                let w = counts[&t] as f64 / total as f64;
                (t, w)
            })
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out.truncate(n);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_frequency_and_drops_stop_words() {
        let ex = TermFrequencyExtractor::default();
        let out = ex.extract("Rabies cases rise. The rabies vaccine is in stock; rabies again", 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, "rabies");
        assert!((out[0].1 - 3.0 / 8.0).abs() < 1e-9);
        assert_eq!(out[1].0, "cases");
    }

    #[test]
    fn manual_spelling_matches_extracted_term() {
        let ex = TermFrequencyExtractor::default();
        let out = ex.extract("RABIES outbreak", 1);
        assert_eq!(out[0].0, normalize_term("  Rabies "));
    }

    #[test]
    fn empty_or_noise_text_yields_nothing() {
        let ex = TermFrequencyExtractor::default();
        assert!(ex.extract("", 5).is_empty());
        assert!(ex.extract("a the 42 ,,, !!", 5).is_empty());
        assert!(ex.extract("something", 0).is_empty());
    }
}
