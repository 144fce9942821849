//! Text fragments and merged lines.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in top-down page coordinates (`top < bottom`).
///
/// Serialized as a four-element array `[left, top, right, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    /// Left edge
    pub left: f32,
    /// Top edge (smaller y is higher on the page)
    pub top: f32,
    /// Right edge
    pub right: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Check whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.left <= other.left
            && self.right >= other.right
            && self.top <= other.top
            && self.bottom >= other.bottom
    }

    /// Absolute distance between this box's bottom edge and the top edge of
    /// the box that follows it.
    pub fn vertical_gap_to(&self, next: &BoundingBox) -> f32 {
        (next.top - self.bottom).abs()
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(b: [f32; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.left, b.top, b.right, b.bottom]
    }
}

/// A text run as emitted by a document reader, before any filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFragment {
    /// Text content, possibly with surrounding whitespace
    pub text: String,
    /// Font name (e.g., "Helvetica-Bold"); compared for equality only
    pub font_name: String,
    /// Font size in document units
    pub font_size: f32,
    /// Position on the page
    pub bbox: BoundingBox,
}

impl RawFragment {
    /// Create a new raw fragment.
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f32,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            text: text.into(),
            font_name: font_name.into(),
            font_size,
            bbox,
        }
    }
}

/// A fragment that survived the filter: trimmed text on a known page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Trimmed, non-empty text
    pub text: String,
    /// Font size in document units
    pub font_size: f32,
    /// Font name; compared for equality only
    pub font_name: String,
    /// Position on the page
    pub bbox: BoundingBox,
    /// Page number (1-indexed)
    pub page: u32,
}

impl Fragment {
    /// Create a new fragment.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
        bbox: BoundingBox,
        page: u32,
    ) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_name: font_name.into(),
            bbox,
            page,
        }
    }
}

/// One or more fragments coalesced into a logical line or paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedLine {
    /// Source texts joined by single spaces
    pub text: String,
    /// Font size shared by every source fragment
    pub font_size: f32,
    /// Font name shared by every source fragment
    pub font_name: String,
    /// Union of the source boxes (top from the first, bottom from the last)
    pub bbox: BoundingBox,
    /// Page number (1-indexed)
    pub page: u32,
}

impl From<Fragment> for MergedLine {
    fn from(fragment: Fragment) -> Self {
        Self {
            text: fragment.text,
            font_size: fragment.font_size,
            font_name: fragment.font_name,
            bbox: fragment.bbox,
            page: fragment.page,
        }
    }
}
