//! Markdown rendering for extraction results.

use crate::model::ExtractionResult;

/// How outline entries are laid out in Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkdownStyle {
    /// Nested bullet list, two spaces of indent per level below H1
    #[default]
    List,
    /// One Markdown heading per entry, `##` for H1 down to `####` for H3
    Headings,
}

/// Render the title and a nested bullet list of headings.
pub fn to_markdown(result: &ExtractionResult) -> String {
    to_markdown_with_style(result, MarkdownStyle::List)
}

/// Render with an explicit layout.
pub fn to_markdown_with_style(result: &ExtractionResult, style: MarkdownStyle) -> String {
    let mut output = format!("# {}\n", escape_inline(&result.title));
    if result.outline.is_empty() {
        return output;
    }
    output.push('\n');

    for entry in &result.outline {
        let depth = entry.level.depth() as usize;
        let text = escape_inline(&entry.text);
        match style {
            MarkdownStyle::List => {
                output.push_str(&"  ".repeat(depth - 1));
                output.push_str(&format!("- {} (p. {})\n", text, entry.page));
            }
            MarkdownStyle::Headings => {
                output.push_str(&"#".repeat(depth + 1));
                output.push_str(&format!(" {} (p. {})\n\n", text, entry.page));
            }
        }
    }

    output.trim_end().to_string() + "\n"
}

/// Escape characters that would otherwise start Markdown formatting.
///
/// Text lands after `- ` or `#`, so a leading block marker (heading, quote,
/// bullet, ordered list number) would also be parsed as structure.
fn escape_inline(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 1);
    for c in text.chars() {
        if matches!(c, '*' | '_' | '`' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escape_block_marker(escaped)
}

fn escape_block_marker(text: String) -> String {
    let ends_marker = |rest: &str| rest.is_empty() || rest.starts_with([' ', '\t']);

    match text.chars().next() {
        Some('#' | '>') => return format!("\\{}", text),
        Some('+' | '-') if ends_marker(&text[1..]) => return format!("\\{}", text),
        _ => {}
    }

    // CommonMark list numbers are at most nine digits.
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if (1..=9).contains(&digits) {
        let rest = &text[digits..];
        if rest.starts_with(['.', ')']) && ends_marker(&rest[1..]) {
            return format!("{}\\{}", &text[..digits], rest);
        }
    }
    text
}
