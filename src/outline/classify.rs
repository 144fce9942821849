//! Heading classification by font size rank.
//!
//! Larger text is assumed to be a higher-ranked heading. The distinct sizes
//! of all merged lines are sorted largest first and the top ones become
//! H1, H2 and H3. Lines at any other size are body text and are dropped.

use crate::model::{ExtractionResult, HeadingLevel, MergedLine, OutlineEntry};

use super::options::OutlineOptions;

/// Distinct font sizes, largest first, grouped into bands.
///
/// Without a tolerance every band holds a single exact size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeRanking {
    /// `(largest, smallest)` size of each band
    bands: Vec<(f32, f32)>,
}

impl SizeRanking {
    /// Rank the sizes of the given lines.
    pub fn new(lines: &[MergedLine], tolerance: Option<f32>) -> Self {
        let mut sizes: Vec<f32> = lines.iter().map(|l| l.font_size).collect();
        sizes.sort_by(|a, b| b.total_cmp(a));
        sizes.dedup();

        let bands = match tolerance {
            None => sizes.into_iter().map(|s| (s, s)).collect(),
            Some(tolerance) => {
                let mut bands: Vec<(f32, f32)> = Vec::new();
                for size in sizes {
                    match bands.last_mut() {
                        Some((largest, smallest)) if *largest - size <= tolerance => {
                            *smallest = size;
                        }
                        _ => bands.push((size, size)),
                    }
                }
                bands
            }
        };

        Self { bands }
    }

    /// Number of distinct size bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Check if no sizes were observed.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Representative (largest) size of each band, largest first.
    pub fn sizes(&self) -> Vec<f32> {
        self.bands.iter().map(|(largest, _)| *largest).collect()
    }

    /// Zero-based rank of the band containing `size`.
    pub fn rank_of(&self, size: f32) -> Option<usize> {
        self.bands
            .iter()
            .position(|&(largest, smallest)| size <= largest && size >= smallest)
    }
}

/// Maps merged lines to heading levels and picks the document title.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    heading_levels: usize,
    size_tolerance: Option<f32>,
    title_placeholder: String,
}

impl HeadingClassifier {
    /// Create a classifier from outline options.
    pub fn new(options: &OutlineOptions) -> Self {
        Self {
            heading_levels: options.heading_levels.min(HeadingLevel::ALL.len()),
            size_tolerance: options.size_tolerance,
            title_placeholder: options.title_placeholder.clone(),
        }
    }

    /// Heading level of a size within a ranking, if it is among the top sizes.
    pub fn level_for(&self, ranking: &SizeRanking, size: f32) -> Option<HeadingLevel> {
        ranking
            .rank_of(size)
            .filter(|rank| *rank < self.heading_levels)
            .and_then(HeadingLevel::from_rank)
    }

    /// Classify lines into a title and an outline in reading order.
    ///
    /// The title is the first H1 on page 1 and stays in the outline too.
    pub fn classify(&self, lines: &[MergedLine]) -> ExtractionResult {
        let ranking = SizeRanking::new(lines, self.size_tolerance);
        log::debug!(
            "Ranked {} distinct font sizes: {:?}",
            ranking.len(),
            ranking.sizes()
        );

        let mut title: Option<&str> = None;
        let mut outline = Vec::new();

        for line in lines {
            let Some(level) = self.level_for(&ranking, line.font_size) else {
                continue;
            };
            if title.is_none() && level == HeadingLevel::H1 && line.page == 1 {
                title = Some(line.text.as_str());
            }
            outline.push(OutlineEntry::new(level, line.text.clone(), line.page));
        }

        let title = match title {
            Some(text) => text.to_string(),
            None => {
                log::debug!("No H1 heading on page 1, using placeholder title");
                self.title_placeholder.clone()
            }
        };

        ExtractionResult::new(title, outline)
    }
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new(&OutlineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn line(text: &str, size: f32, page: u32) -> MergedLine {
        MergedLine {
            text: text.to_string(),
            font_size: size,
            font_name: "F".to_string(),
            bbox: BoundingBox::new(0.0, 0.0, 100.0, size),
            page,
        }
    }

    #[test]
    fn test_ranking_exact() {
        let lines = vec![
            line("a", 10.0, 1),
            line("b", 18.0, 1),
            line("c", 10.0, 1),
            line("d", 12.5, 1),
        ];
        let ranking = SizeRanking::new(&lines, None);
        assert_eq!(ranking.sizes(), vec![18.0, 12.5, 10.0]);
        assert_eq!(ranking.rank_of(12.5), Some(1));
        assert_eq!(ranking.rank_of(12.4), None);
    }

    #[test]
    fn test_ranking_with_tolerance() {
        let lines = vec![
            line("a", 18.0, 1),
            line("b", 17.96, 1),
            line("c", 12.0, 1),
            line("d", 11.98, 1),
            line("e", 10.0, 1),
        ];
        let ranking = SizeRanking::new(&lines, Some(0.1));
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking.rank_of(17.96), Some(0));
        assert_eq!(ranking.rank_of(11.98), Some(1));
        assert_eq!(ranking.rank_of(10.0), Some(2));
    }

    #[test]
    fn test_empty_lines() {
        let result = HeadingClassifier::default().classify(&[]);
        assert_eq!(result.title, "Untitled Document");
        assert!(result.outline.is_empty());
    }

    #[test]
    fn test_top_three_sizes_map_to_levels() {
        let lines = vec![
            line("Annual Report", 24.0, 1),
            line("Overview", 18.0, 1),
            line("Regional detail", 14.0, 2),
            line("Body text here", 10.0, 2),
        ];
        let result = HeadingClassifier::default().classify(&lines);
        assert_eq!(result.title, "Annual Report");
        assert_eq!(
            result.outline,
            vec![
                OutlineEntry::new(HeadingLevel::H1, "Annual Report", 1),
                OutlineEntry::new(HeadingLevel::H2, "Overview", 1),
                OutlineEntry::new(HeadingLevel::H3, "Regional detail", 2),
            ]
        );
    }

    #[test]
    fn test_two_sizes_have_no_h3() {
        let lines = vec![line("Heading", 18.0, 1), line("Body text", 10.0, 1)];
        let result = HeadingClassifier::default().classify(&lines);
        assert_eq!(result.count_level(HeadingLevel::H1), 1);
        assert_eq!(result.count_level(HeadingLevel::H2), 1);
        assert_eq!(result.count_level(HeadingLevel::H3), 0);
    }

    #[test]
    fn test_title_must_be_on_first_page() {
        let lines = vec![line("Cover note", 10.0, 1), line("Chapter One", 20.0, 2)];
        let result = HeadingClassifier::default().classify(&lines);
        assert_eq!(result.title, "Untitled Document");
        assert_eq!(result.outline[1], OutlineEntry::new(HeadingLevel::H1, "Chapter One", 2));
    }

    #[test]
    fn test_first_h1_wins_title() {
        let lines = vec![line("First Title", 20.0, 1), line("Second Title", 20.0, 1)];
        let result = HeadingClassifier::default().classify(&lines);
        assert_eq!(result.title, "First Title");
        assert_eq!(result.outline.len(), 2);
    }

    #[test]
    fn test_fewer_heading_levels() {
        let options = OutlineOptions::new().with_heading_levels(1);
        let lines = vec![line("Title Page", 20.0, 1), line("Section", 14.0, 1)];
        let result = HeadingClassifier::new(&options).classify(&lines);
        assert_eq!(result.outline.len(), 1);
        assert_eq!(result.outline[0].level, HeadingLevel::H1);
    }

    #[test]
    fn test_custom_placeholder() {
        let options = OutlineOptions::new().with_title_placeholder("No title");
        let result = HeadingClassifier::new(&options).classify(&[line("Later", 12.0, 3)]);
        assert_eq!(result.title, "No title");
    }
}
