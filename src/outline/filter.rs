//! Noise filtering for raw text runs.

use std::collections::HashSet;

use regex::Regex;

use super::options::OutlineOptions;

/// Rejects fragments too short, stop words, and bare numbers.
#[derive(Debug, Clone)]
pub struct FragmentFilter {
    min_text_len: usize,
    stop_words: HashSet<String>,
    numeric_regex: Regex,
}

impl FragmentFilter {
    /// Create a filter from outline options.
    pub fn new(options: &OutlineOptions) -> Self {
        Self {
            min_text_len: options.min_text_len,
            stop_words: options.stop_words.clone(),
            numeric_regex: Regex::new(r"^\d+$").unwrap(),
        }
    }

    /// Return the trimmed text, or `None` when the run is noise.
    ///
    /// Accepted text keeps its case and inner punctuation.
    pub fn clean<'a>(&self, text: &'a str) -> Option<&'a str> {
        let text = text.trim();
        if text.is_empty() || text.chars().count() < self.min_text_len {
            return None;
        }
        if self.stop_words.contains(&text.to_lowercase()) {
            return None;
        }
        if self.numeric_regex.is_match(text) {
            return None;
        }
        Some(text)
    }
}

impl Default for FragmentFilter {
    fn default() -> Self {
        Self::new(&OutlineOptions::default())
    }
}
