//! Rendering of extraction results.

mod json;
mod markdown;

pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, to_markdown_with_style, MarkdownStyle};
