//! Greedy merging of contiguous fragments into logical lines.
//!
//! The merger walks fragments in reading order and keeps at most one line
//! under construction. A following fragment is absorbed when it has the same
//! font name and size, starts within the vertical gap threshold of the line's
//! bottom edge, sits on the same page, and does not look like the start of a
//! new section. Otherwise the line is closed and the fragment starts the next
//! one. There is no backtracking and no reordering.

use crate::model::{BoundingBox, Fragment, MergedLine};

use super::boundary::is_likely_new_section;
use super::options::{OutlineOptions, DEFAULT_MAX_VERTICAL_GAP};

/// Coalesces vertically contiguous, same-style fragments.
#[derive(Debug, Clone, Copy)]
pub struct FragmentMerger {
    max_vertical_gap: f32,
}

impl FragmentMerger {
    /// Create a merger with an explicit gap threshold.
    pub fn new(max_vertical_gap: f32) -> Self {
        Self { max_vertical_gap }
    }

    /// Create a merger from outline options.
    pub fn from_options(options: &OutlineOptions) -> Self {
        Self::new(options.max_vertical_gap)
    }

    /// Merge fragments into lines, preserving input order.
    pub fn merge<I>(&self, fragments: I) -> Vec<MergedLine>
    where
        I: IntoIterator<Item = Fragment>,
    {
        let mut lines = Vec::new();
        let mut state = MergeState::BetweenLines;
        let mut absorbed = 0usize;

        for fragment in fragments {
            state = match state {
                MergeState::BetweenLines => MergeState::Accumulating(LineBuilder::start(fragment)),
                MergeState::Accumulating(mut builder) => {
                    if builder.accepts(&fragment, self.max_vertical_gap) {
                        builder.absorb(fragment);
                        absorbed += 1;
                        MergeState::Accumulating(builder)
                    } else {
                        lines.push(builder.finish());
                        MergeState::Accumulating(LineBuilder::start(fragment))
                    }
                }
            };
        }

        if let MergeState::Accumulating(builder) = state {
            lines.push(builder.finish());
        }

        log::debug!(
            "Merged {} fragments into {} lines",
            lines.len() + absorbed,
            lines.len()
        );

        lines
    }
}

impl Default for FragmentMerger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VERTICAL_GAP)
    }
}

enum MergeState {
    BetweenLines,
    Accumulating(LineBuilder),
}

/// Owns the text and box of the line being built.
struct LineBuilder {
    line: MergedLine,
}

impl LineBuilder {
    fn start(fragment: Fragment) -> Self {
        Self {
            line: MergedLine::from(fragment),
        }
    }

    fn accepts(&self, next: &Fragment, max_vertical_gap: f32) -> bool {
        let line = &self.line;
        let same_style = line.font_size == next.font_size && line.font_name == next.font_name;
        let close_vertically = line.bbox.vertical_gap_to(&next.bbox) < max_vertical_gap;
        let same_page = line.page == next.page;

        same_style && close_vertically && same_page && !is_likely_new_section(&next.text)
    }

    fn absorb(&mut self, next: Fragment) {
        let line = &mut self.line;
        line.text.push(' ');
        line.text.push_str(&next.text);
        line.bbox = BoundingBox::new(
            line.bbox.left.min(next.bbox.left),
            line.bbox.top,
            line.bbox.right.max(next.bbox.right),
            next.bbox.bottom,
        );
    }

    fn finish(self) -> MergedLine {
        self.line
    }
}
