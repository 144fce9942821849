//! In-memory reader over pre-extracted fragments.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::RawFragment;

use super::DocumentReader;

/// Reader backed by fragments already grouped by page.
///
/// The JSON form is an array of pages, each an array of
/// `{"text", "font_name", "font_size", "bbox": [l, t, r, b]}` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryReader {
    pages: Vec<Vec<RawFragment>>,
}

impl MemoryReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader from fragments grouped by page.
    pub fn from_pages(pages: Vec<Vec<RawFragment>>) -> Self {
        Self { pages }
    }

    /// Parse a JSON fragment dump.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::UnreadableDocument(format!("invalid fragment JSON: {}", e)))
    }

    /// Load a JSON fragment dump from a file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Append a page.
    pub fn push_page(&mut self, fragments: Vec<RawFragment>) {
        self.pages.push(fragments);
    }

    /// Serialize to the JSON dump format.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }
}

impl DocumentReader for MemoryReader {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_fragments(&self, page_number: u32) -> Result<Vec<RawFragment>> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .cloned()
            .ok_or_else(|| {
                Error::UnreadableDocument(format!(
                    "page {} is out of range (document has {} pages)",
                    page_number,
                    self.pages.len()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn sample() -> MemoryReader {
        MemoryReader::from_pages(vec![
            vec![RawFragment::new(
                "Title",
                "Helvetica-Bold",
                20.0,
                BoundingBox::new(72.0, 50.0, 200.0, 70.0),
            )],
            vec![],
            vec![RawFragment::new(
                "Body",
                "Helvetica",
                10.0,
                BoundingBox::new(72.0, 90.0, 120.0, 100.0),
            )],
        ])
    }

    #[test]
    fn test_fragments_carry_page_numbers() {
        let fragments = sample().fragments().unwrap();
        let pages: Vec<u32> = fragments.iter().map(|(p, _)| *p).collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[test]
    fn test_page_out_of_range() {
        let reader = sample();
        assert!(reader.page_fragments(0).is_err());
        assert!(reader.page_fragments(4).is_err());
        assert!(reader.page_fragments(2).unwrap().is_empty());
    }

    #[test]
    fn test_json_round_trip_shape() {
        let json = r#"[[{"text":"Intro","font_name":"A","font_size":18,"bbox":[0,10,50,28]}]]"#;
        let reader = MemoryReader::from_json(json).unwrap();
        assert_eq!(reader.page_count(), 1);
        let fragment = &reader.page_fragments(1).unwrap()[0];
        assert_eq!(fragment.text, "Intro");
        assert_eq!(fragment.bbox.bottom, 28.0);
        assert_eq!(MemoryReader::from_json(&reader.to_json().unwrap()).unwrap(), reader);
    }

    #[test]
    fn test_invalid_json() {
        let err = MemoryReader::from_json("{not json").unwrap_err();
        assert!(err.is_unreadable_document());
    }
}
