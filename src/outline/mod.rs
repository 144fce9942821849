//! Outline inference from text layout.
//!
//! The pipeline is a single pass over one document's fragments:
//! filter noise, merge contiguous runs into lines, then rank font sizes to
//! assign heading levels and pick a title. Every stage is total over its
//! input; only the document reader can fail.

mod boundary;
mod classify;
mod filter;
mod merge;
mod options;

pub use boundary::is_likely_new_section;
pub use classify::{HeadingClassifier, SizeRanking};
pub use filter::FragmentFilter;
pub use merge::FragmentMerger;
pub use options::{
    OutlineOptions, DEFAULT_HEADING_LEVELS, DEFAULT_MAX_VERTICAL_GAP, DEFAULT_MIN_TEXT_LEN,
    DEFAULT_STOP_WORDS,
};

use crate::error::Result;
use crate::model::{ExtractionResult, Fragment, MergedLine, RawFragment};
use crate::reader::DocumentReader;

/// Runs filter, merger and classifier over a document's fragments.
///
/// Holds no per-document state, so one extractor can be shared across
/// threads and reused for any number of documents.
#[derive(Debug, Clone)]
pub struct OutlineExtractor {
    filter: FragmentFilter,
    merger: FragmentMerger,
    classifier: HeadingClassifier,
}

impl OutlineExtractor {
    /// Create an extractor, validating the options.
    pub fn new(options: OutlineOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            filter: FragmentFilter::new(&options),
            merger: FragmentMerger::from_options(&options),
            classifier: HeadingClassifier::new(&options),
        })
    }

    /// Read every page from `reader` and extract the outline.
    pub fn extract<R: DocumentReader + ?Sized>(&self, reader: &R) -> Result<ExtractionResult> {
        let fragments = reader.fragments()?;
        Ok(self.extract_fragments(fragments))
    }

    /// Extract the outline from `(page_number, fragment)` pairs in reading order.
    pub fn extract_fragments<I>(&self, fragments: I) -> ExtractionResult
    where
        I: IntoIterator<Item = (u32, RawFragment)>,
    {
        let lines = self.merge_lines(fragments);
        let result = self.classifier.classify(&lines);
        log::debug!(
            "Classified {} of {} lines as headings",
            result.outline.len(),
            lines.len()
        );
        result
    }

    /// Filter and merge fragments without classifying them.
    pub fn merge_lines<I>(&self, fragments: I) -> Vec<MergedLine>
    where
        I: IntoIterator<Item = (u32, RawFragment)>,
    {
        let filtered = self.filter_fragments(fragments);
        self.merger.merge(filtered)
    }

    /// Drop noise fragments and attach page numbers to the survivors.
    pub fn filter_fragments<I>(&self, fragments: I) -> Vec<Fragment>
    where
        I: IntoIterator<Item = (u32, RawFragment)>,
    {
        let mut rejected = 0usize;
        let kept: Vec<Fragment> = fragments
            .into_iter()
            .filter_map(|(page, raw)| match self.filter.clean(&raw.text) {
                Some(text) => Some(Fragment::new(
                    text,
                    raw.font_size,
                    raw.font_name,
                    raw.bbox,
                    page,
                )),
                None => {
                    rejected += 1;
                    None
                }
            })
            .collect();
        log::debug!("Kept {} fragments, rejected {}", kept.len(), rejected);
        kept
    }
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        let options = OutlineOptions::default();
        Self {
            filter: FragmentFilter::new(&options),
            merger: FragmentMerger::from_options(&options),
            classifier: HeadingClassifier::new(&options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, HeadingLevel};

    fn raw(text: &str, size: f32, top: f32) -> RawFragment {
        RawFragment::new(text, "F", size, BoundingBox::new(72.0, top, 400.0, top + size))
    }

    #[test]
    fn test_invalid_options_rejected() {
        let result = OutlineExtractor::new(OutlineOptions::new().with_heading_levels(5));
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_attaches_pages() {
        let extractor = OutlineExtractor::default();
        let fragments = extractor.filter_fragments(vec![
            (1, raw("  Introduction ", 18.0, 50.0)),
            (1, raw("12", 10.0, 80.0)),
            (2, raw("the", 10.0, 90.0)),
            (2, raw("Conclusion", 18.0, 50.0)),
        ]);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "Introduction");
        assert_eq!(fragments[0].page, 1);
        assert_eq!(fragments[1].text, "Conclusion");
        assert_eq!(fragments[1].page, 2);
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let extractor = OutlineExtractor::default();
        let result = extractor.extract_fragments(vec![
            (1, raw("Field Guide", 24.0, 40.0)),
            (1, raw("Getting started", 16.0, 80.0)),
            (1, raw("Install the tools", 10.0, 110.0)),
            (1, raw("before you begin.", 10.0, 121.0)),
            (1, raw("7", 10.0, 760.0)),
        ]);
        assert_eq!(result.title, "Field Guide");
        assert_eq!(result.outline.len(), 4);
        assert_eq!(result.outline[2].level, HeadingLevel::H3);
        assert_eq!(result.outline[2].text, "Install the tools");
        assert_eq!(result.outline[3].text, "before you begin.");
    }

    #[test]
    fn test_empty_document() {
        let result = OutlineExtractor::default().extract_fragments(Vec::new());
        assert_eq!(result, ExtractionResult::untitled());
    }
}
