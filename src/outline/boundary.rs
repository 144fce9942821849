//! Section-start detection from a fragment's text shape.

/// Check if a fragment looks like the start of a new heading or paragraph.
///
/// True when the text opens with an ASCII capital, an ASCII digit, `(` or
/// `[`, or closes with `.` or `:`. Anything else is taken as the wrapped
/// continuation of the preceding fragment.
pub fn is_likely_new_section(text: &str) -> bool {
    let text = text.trim();
    let starts_section = text
        .chars()
        .next()
        .map(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '(' || c == '[')
        .unwrap_or(false);

    starts_section || text.ends_with('.') || text.ends_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capital_digit_bracket_start() {
        assert!(is_likely_new_section("Background"));
        assert!(is_likely_new_section("3 Results"));
        assert!(is_likely_new_section("(a) first item"));
        assert!(is_likely_new_section("[1] reference"));
    }

    #[test]
    fn test_terminal_punctuation() {
        assert!(is_likely_new_section("see the appendix."));
        assert!(is_likely_new_section("as follows:"));
    }

    #[test]
    fn test_continuations() {
        assert!(!is_likely_new_section("and motivation"));
        assert!(!is_likely_new_section("of the proposed design"));
        assert!(!is_likely_new_section("— continued"));
        assert!(!is_likely_new_section(""));
    }

    #[test]
    fn test_non_ascii_capitals_do_not_start_sections() {
        assert!(!is_likely_new_section("Éléments de preuve"));
        assert!(!is_likely_new_section("{braced}"));
    }
}
