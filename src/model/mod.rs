//! Data model for outline extraction.
//!
//! Fragments flow from a document reader through the outline pipeline and
//! come out as leveled outline entries. Everything here is created fresh for
//! one document and serializes to the JSON shape callers consume.

mod fragment;
mod outline;

pub use fragment::{BoundingBox, Fragment, MergedLine, RawFragment};
pub use outline::{ExtractionResult, HeadingLevel, OutlineEntry, UNTITLED_DOCUMENT};
