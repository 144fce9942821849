//! Outline heuristics configuration.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::UNTITLED_DOCUMENT;

/// Words rejected as fragments on their own (compared lower-cased).
pub const DEFAULT_STOP_WORDS: [&str; 12] = [
    "the", "a", "an", "in", "fare", "from", "date", "age", "name", "bus", "rail", "rs.",
];

/// Minimum number of characters a fragment needs to survive filtering.
pub const DEFAULT_MIN_TEXT_LEN: usize = 4;

/// Largest vertical gap (layout units) across which fragments still merge.
pub const DEFAULT_MAX_VERTICAL_GAP: f32 = 8.0;

/// Number of distinct font sizes mapped to heading levels.
pub const DEFAULT_HEADING_LEVELS: usize = 3;

/// Options for outline extraction.
#[derive(Debug, Clone)]
pub struct OutlineOptions {
    /// Minimum trimmed length in characters
    pub min_text_len: usize,

    /// Lower-case texts rejected outright
    pub stop_words: HashSet<String>,

    /// Merge only when the vertical gap is strictly below this
    pub max_vertical_gap: f32,

    /// How many of the largest sizes become headings (1..=3)
    pub heading_levels: usize,

    /// Cluster font sizes within this distance before ranking (None = exact)
    pub size_tolerance: Option<f32>,

    /// Title returned when no H1 appears on page 1
    pub title_placeholder: String,
}

impl OutlineOptions {
    /// Create new outline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum fragment length.
    pub fn with_min_text_len(mut self, len: usize) -> Self {
        self.min_text_len = len;
        self
    }

    /// Replace the stop-word set. Words are lower-cased.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Set the merge gap threshold.
    pub fn with_max_vertical_gap(mut self, gap: f32) -> Self {
        self.max_vertical_gap = gap;
        self
    }

    /// Set the number of heading levels.
    pub fn with_heading_levels(mut self, levels: usize) -> Self {
        self.heading_levels = levels;
        self
    }

    /// Cluster font sizes within `tolerance` when ranking headings.
    pub fn with_size_tolerance(mut self, tolerance: f32) -> Self {
        self.size_tolerance = Some(tolerance);
        self
    }

    /// Set the placeholder title.
    pub fn with_title_placeholder(mut self, title: impl Into<String>) -> Self {
        self.title_placeholder = title.into();
        self
    }

    /// Check that the options describe a usable configuration.
    pub fn validate(&self) -> Result<()> {
        if !(1..=DEFAULT_HEADING_LEVELS).contains(&self.heading_levels) {
            return Err(Error::InvalidOptions(format!(
                "heading_levels must be between 1 and {}, got {}",
                DEFAULT_HEADING_LEVELS, self.heading_levels
            )));
        }
        if !self.max_vertical_gap.is_finite() || self.max_vertical_gap < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "max_vertical_gap must be a non-negative number, got {}",
                self.max_vertical_gap
            )));
        }
        if let Some(tolerance) = self.size_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(Error::InvalidOptions(format!(
                    "size_tolerance must be a non-negative number, got {}",
                    tolerance
                )));
            }
        }
        Ok(())
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            max_vertical_gap: DEFAULT_MAX_VERTICAL_GAP,
            heading_levels: DEFAULT_HEADING_LEVELS,
            size_tolerance: None,
            title_placeholder: UNTITLED_DOCUMENT.to_string(),
        }
    }
}
