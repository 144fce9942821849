//! # pdf-outline
//!
//! Infer a document title and a three-level heading outline from the text
//! layout of a PDF, for documents that carry no structural tags.
//!
//! The only inputs are the text runs on each page with their font name,
//! font size and bounding box. Runs are filtered for noise, merged into
//! logical lines, and classified by font size rank: the largest distinct
//! size is H1, the next H2, the next H3.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_outline_from_file, render};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let result = extract_outline_from_file("report.pdf")?;
//!     println!("{}", result.title);
//!
//!     let json = render::to_json(&result, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Pre-extracted fragments
//!
//! Any source of positioned text can feed the pipeline through
//! [`DocumentReader`], or directly as `(page, fragment)` pairs:
//!
//! ```
//! use pdf_outline::{extract_outline, BoundingBox, RawFragment};
//!
//! let result = extract_outline(vec![
//!     (1, RawFragment::new("Introduction", "A", 18.0, BoundingBox::new(72.0, 60.0, 200.0, 78.0))),
//!     (1, RawFragment::new("This is body text.", "A", 10.0, BoundingBox::new(72.0, 90.0, 300.0, 100.0))),
//! ]);
//! assert_eq!(result.title, "Introduction");
//! ```

pub mod detect;
pub mod error;
pub mod model;
pub mod outline;
pub mod reader;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    BoundingBox, ExtractionResult, Fragment, HeadingLevel, MergedLine, OutlineEntry, RawFragment,
    UNTITLED_DOCUMENT,
};
pub use outline::{OutlineExtractor, OutlineOptions};
pub use reader::{DocumentReader, MemoryReader, PdfReader};
pub use render::{JsonFormat, MarkdownStyle};

use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

/// Extract the outline of a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::extract_outline_from_file;
///
/// let result = extract_outline_from_file("report.pdf").unwrap();
/// for entry in &result.outline {
///     println!("{} {} (p. {})", entry.level, entry.text, entry.page);
/// }
/// ```
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P) -> Result<ExtractionResult> {
    extract_outline_from_file_with_options(path, OutlineOptions::default())
}

/// Extract the outline of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_outline_from_file_with_options, OutlineOptions};
///
/// let options = OutlineOptions::new()
///     .with_max_vertical_gap(6.0)
///     .with_heading_levels(2);
/// let result = extract_outline_from_file_with_options("report.pdf", options).unwrap();
/// ```
pub fn extract_outline_from_file_with_options<P: AsRef<Path>>(
    path: P,
    options: OutlineOptions,
) -> Result<ExtractionResult> {
    let extractor = OutlineExtractor::new(options)?;
    let reader = PdfReader::open(path)?;
    extractor.extract(&reader)
}

/// Extract the outline of a PDF held in memory.
pub fn extract_outline_from_bytes(data: &[u8]) -> Result<ExtractionResult> {
    extract_outline_from_bytes_with_options(data, OutlineOptions::default())
}

/// Extract the outline of a PDF held in memory, with custom options.
pub fn extract_outline_from_bytes_with_options(
    data: &[u8],
    options: OutlineOptions,
) -> Result<ExtractionResult> {
    let extractor = OutlineExtractor::new(options)?;
    let reader = PdfReader::from_bytes(data)?;
    extractor.extract(&reader)
}

/// Extract the outline of a PDF read from any `Read`.
pub fn extract_outline_from_reader<R: Read>(reader: R) -> Result<ExtractionResult> {
    let extractor = OutlineExtractor::default();
    let reader = PdfReader::from_reader(reader)?;
    extractor.extract(&reader)
}

/// Run the pipeline over `(page_number, fragment)` pairs with default options.
///
/// Never fails: empty input yields an untitled, empty outline.
pub fn extract_outline<I>(fragments: I) -> ExtractionResult
where
    I: IntoIterator<Item = (u32, RawFragment)>,
{
    OutlineExtractor::default().extract_fragments(fragments)
}

/// Extract outlines of many PDF files in parallel.
///
/// Options are validated once up front. Each file is read and classified
/// independently; results come back in input order, paired with the path.
pub fn extract_outlines<P>(
    paths: &[P],
    options: OutlineOptions,
) -> Result<Vec<(PathBuf, Result<ExtractionResult>)>>
where
    P: AsRef<Path> + Sync,
{
    extract_outlines_with_progress(paths, options, |_| {})
}

/// Like [`extract_outlines`], calling `on_done` as each file finishes.
///
/// `on_done` runs on rayon worker threads, in completion order.
pub fn extract_outlines_with_progress<P, F>(
    paths: &[P],
    options: OutlineOptions,
    on_done: F,
) -> Result<Vec<(PathBuf, Result<ExtractionResult>)>>
where
    P: AsRef<Path> + Sync,
    F: Fn(&Path) + Sync,
{
    let extractor = OutlineExtractor::new(options)?;
    Ok(paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let result = PdfReader::open(path).and_then(|reader| extractor.extract(&reader));
            if let Err(ref e) = result {
                log::warn!("Failed to extract outline from {}: {}", path.display(), e);
            }
            on_done(path);
            (path.to_path_buf(), result)
        })
        .collect())
}

/// Extract the outline of a PDF file without blocking the async runtime.
///
/// The file is read with `tokio::fs` and the pipeline runs on the blocking
/// thread pool.
#[cfg(feature = "async")]
pub async fn extract_outline_from_file_async<P: AsRef<Path>>(
    path: P,
    options: OutlineOptions,
) -> Result<ExtractionResult> {
    let extractor = OutlineExtractor::new(options)?;
    let data = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || {
        let reader = PdfReader::from_bytes(&data)?;
        extractor.extract(&reader)
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, size: f32, top: f32) -> RawFragment {
        RawFragment::new(text, "A", size, BoundingBox::new(72.0, top, 300.0, top + size))
    }

    #[test]
    fn test_extract_outline_fragments() {
        let result = extract_outline(vec![
            (1, raw("Introduction", 18.0, 60.0)),
            (1, raw("This is body text.", 10.0, 90.0)),
        ]);
        assert_eq!(result.title, "Introduction");
        assert_eq!(result.outline.len(), 2);
    }

    #[test]
    fn test_extract_bytes_empty_data() {
        let result = extract_outline_from_bytes(&[]);
        assert!(matches!(result, Err(Error::UnreadableDocument(_))));
    }

    #[test]
    fn test_extract_bytes_not_pdf() {
        let result = extract_outline_from_bytes(b"<!DOCTYPE html><html></html>");
        assert!(result.unwrap_err().is_unreadable_document());
    }

    #[test]
    fn test_extract_bytes_corrupt_pdf() {
        let result = extract_outline_from_bytes(b"%PDF-1.7\nthis is not a pdf body");
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_missing_file() {
        let result = extract_outline_from_file("/nonexistent/definitely-missing.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_invalid_options_fail_before_reading() {
        let options = OutlineOptions::new().with_heading_levels(0);
        let result = extract_outline_from_file_with_options("/nonexistent.pdf", options);
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_extract_outlines_reports_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.pdf");
        std::fs::write(&bad, b"not a pdf at all").unwrap();
        let missing = dir.path().join("missing.pdf");

        let results = extract_outlines(&[bad.clone(), missing.clone()], OutlineOptions::default())
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, bad);
        assert!(results[0].1.as_ref().unwrap_err().is_unreadable_document());
        assert_eq!(results[1].0, missing);
        assert!(matches!(results[1].1, Err(Error::Io(_))));
    }
}
