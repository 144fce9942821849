//! Document readers.
//!
//! A reader turns a paginated document into raw text runs with font and
//! position metadata, page by page, in reading order. The outline pipeline
//! only depends on the [`DocumentReader`] trait; [`PdfReader`] decodes PDF
//! content streams with lopdf and [`MemoryReader`] serves fragments that
//! were extracted elsewhere.

mod content;
mod memory;
mod pdf;

pub use memory::MemoryReader;
pub use pdf::PdfReader;

use crate::error::Result;
use crate::model::RawFragment;

/// Source of raw text fragments for one document.
pub trait DocumentReader {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Raw fragments of one page (1-indexed), in reading order.
    fn page_fragments(&self, page_number: u32) -> Result<Vec<RawFragment>>;

    /// All fragments tagged with their page number, in document order.
    fn fragments(&self) -> Result<Vec<(u32, RawFragment)>> {
        let mut all = Vec::new();
        for page_number in 1..=self.page_count() {
            let page = self.page_fragments(page_number)?;
            log::debug!("Page {}: {} fragments", page_number, page.len());
            all.extend(page.into_iter().map(|fragment| (page_number, fragment)));
        }
        Ok(all)
    }
}
