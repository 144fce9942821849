//! Content stream interpretation.
//!
//! Tracks the text state through a page's operations and records one run
//! per show-text operator, then converts runs to top-down bounding boxes in
//! reading order.

use lopdf::content::Operation;
use lopdf::Object;

use crate::model::{BoundingBox, RawFragment};

/// Kerning adjustment (thousandths of an em) treated as a word space in TJ.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Approximate ascender as a fraction of the font size.
const ASCENT: f32 = 0.8;

/// Approximate descender as a fraction of the font size.
const DESCENT: f32 = 0.2;

/// Approximate glyph advance as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;

/// Font lookups needed while walking a page.
pub(super) trait TextDecoder {
    /// Display name (BaseFont) for a font resource name.
    fn base_font(&self, resource: &[u8]) -> String;

    /// Decode string bytes shown with the given font resource.
    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String;
}

/// A shown string positioned in PDF user space (y grows upwards).
#[derive(Debug, Clone)]
pub(super) struct PositionedRun {
    pub text: String,
    pub font_name: String,
    pub font_size: f32,
    pub x: f32,
    pub baseline: f32,
}

impl PositionedRun {
    fn width(&self) -> f32 {
        self.text.chars().count() as f32 * self.font_size * AVG_CHAR_WIDTH
    }

    fn into_fragment(self, page_height: f32) -> RawFragment {
        let bbox = BoundingBox::new(
            self.x,
            page_height - (self.baseline + self.font_size * ASCENT),
            self.x + self.width(),
            page_height - (self.baseline - self.font_size * DESCENT),
        );
        RawFragment::new(self.text, self.font_name, self.font_size, bbox)
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Read six numeric operands (`cm`, `Tm`).
    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Self {
            a: get_number(&operands[0])?,
            b: get_number(&operands[1])?,
            c: get_number(&operands[2])?,
            d: get_number(&operands[3])?,
            e: get_number(&operands[4])?,
            f: get_number(&operands[5])?,
        })
    }

    /// `self × other`: apply `self` first, then `other`.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Length of the transformed text-space y axis.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text matrix with the leading used by `T*`, `'` and `"`.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    m: Matrix,
    leading: f32,
}

impl TextMatrix {
    fn new(leading: f32) -> Self {
        Self {
            m: Matrix::IDENTITY,
            leading,
        }
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        let m = &mut self.m;
        m.e += tx * m.a + ty * m.c;
        m.f += tx * m.b + ty * m.d;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 { self.leading } else { 12.0 };
        self.translate(0.0, -leading);
    }

    /// Text space to page space under the given CTM.
    fn in_page_space(&self, ctm: &Matrix) -> Matrix {
        self.m.multiply(ctm)
    }
}

/// Walk a page's operations and collect positioned runs in stream order.
pub(super) fn walk_operations<D: TextDecoder + ?Sized>(
    operations: &[Operation],
    decoder: &D,
) -> Vec<PositionedRun> {
    let mut runs = Vec::new();
    let mut font_resource: Vec<u8> = Vec::new();
    let mut font_name = String::new();
    let mut font_size: f32 = 12.0;
    let mut matrix = TextMatrix::new(0.0);
    let mut leading: f32 = 0.0;
    let mut in_text_block = false;
    let mut ctm = Matrix::IDENTITY;
    let mut ctm_stack: Vec<Matrix> = Vec::new();

    for op in operations {
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    ctm = m.multiply(&ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                matrix = TextMatrix::new(leading);
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(name) = &op.operands[0] {
                        font_resource = name.clone();
                        font_name = decoder.base_font(name);
                    }
                    font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(value) = op.operands.first().and_then(get_number) {
                    leading = value;
                    matrix.leading = value;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        leading = -ty;
                        matrix.leading = leading;
                    }
                    matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    matrix.m = m;
                }
            }
            "T*" => matrix.next_line(),
            "Tj" | "TJ" | "'" | "\"" => {
                if matches!(op.operator.as_str(), "'" | "\"") {
                    matrix.next_line();
                }
                if !in_text_block {
                    continue;
                }
                let text = match op.operator.as_str() {
                    "TJ" => match op.operands.first() {
                        Some(Object::Array(items)) => {
                            decode_tj_array(items, &font_resource, decoder)
                        }
                        _ => String::new(),
                    },
                    "\"" => decode_string(op.operands.get(2), &font_resource, decoder),
                    _ => decode_string(op.operands.first(), &font_resource, decoder),
                };
                if text.trim().is_empty() {
                    continue;
                }
                let page_matrix = matrix.in_page_space(&ctm);
                runs.push(PositionedRun {
                    text,
                    font_name: font_name.clone(),
                    font_size: font_size * page_matrix.vertical_scale(),
                    x: page_matrix.e,
                    baseline: page_matrix.f,
                });
            }
            _ => {}
        }
    }

    runs
}

/// Sort runs into reading order and convert them to top-down fragments.
///
/// Runs whose baselines are within 30% of the font size share a visual line
/// and are ordered left to right; lines go top to bottom.
pub(super) fn into_reading_order(runs: Vec<PositionedRun>, page_height: f32) -> Vec<RawFragment> {
    let mut runs = runs;
    runs.sort_by(|a, b| b.baseline.total_cmp(&a.baseline).then(a.x.total_cmp(&b.x)));

    let mut fragments = Vec::with_capacity(runs.len());
    let mut line: Vec<PositionedRun> = Vec::new();
    let mut line_baseline: Option<f32> = None;

    for run in runs {
        let tolerance = run.font_size * 0.3;
        match line_baseline {
            Some(y) if (run.baseline - y).abs() <= tolerance => line.push(run),
            _ => {
                flush_line(&mut line, page_height, &mut fragments);
                line_baseline = Some(run.baseline);
                line.push(run);
            }
        }
    }
    flush_line(&mut line, page_height, &mut fragments);

    fragments
}

fn flush_line(line: &mut Vec<PositionedRun>, page_height: f32, out: &mut Vec<RawFragment>) {
    line.sort_by(|a, b| a.x.total_cmp(&b.x));
    out.extend(line.drain(..).map(|run| run.into_fragment(page_height)));
}

fn decode_string<D: TextDecoder + ?Sized>(
    operand: Option<&Object>,
    font_resource: &[u8],
    decoder: &D,
) -> String {
    match operand {
        Some(Object::String(bytes, _)) => decoder.decode(font_resource, bytes),
        _ => String::new(),
    }
}

/// Decode a TJ array, turning large negative kerning into word spaces.
///
/// The space is decided when the next string arrives, so it can be dropped
/// between two characters of a script written without word spaces.
fn decode_tj_array<D: TextDecoder + ?Sized>(
    items: &[Object],
    font_resource: &[u8],
    decoder: &D,
) -> String {
    let mut combined = String::new();
    let mut pending_space = false;
    for item in items {
        match item {
            Object::String(bytes, _) => {
                let part = decoder.decode(font_resource, bytes);
                if part.is_empty() {
                    continue;
                }
                if pending_space && needs_word_space(&combined, &part) {
                    combined.push(' ');
                }
                pending_space = false;
                combined.push_str(&part);
            }
            Object::Integer(_) | Object::Real(_) => {
                let adjustment = -get_number(item).unwrap_or(0.0);
                if adjustment > TJ_SPACE_THRESHOLD {
                    pending_space = true;
                }
            }
            _ => {}
        }
    }
    combined
}

fn needs_word_space(before: &str, after: &str) -> bool {
    let (Some(last), Some(next)) = (before.chars().last(), after.chars().next()) else {
        return false;
    };
    if last == ' ' || last == '\u{00A0}' || next == ' ' || next == '\u{00A0}' {
        return false;
    }
    !(is_spaceless_script_char(last) && is_spaceless_script_char(next))
}

/// Helper to extract number from PDF object.
pub(super) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if a character belongs to a script written without word spaces.
///
/// Chinese and Japanese don't use spaces between words; Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no font encoding is available.
pub(super) fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlainDecoder;

    impl TextDecoder for PlainDecoder {
        fn base_font(&self, resource: &[u8]) -> String {
            match resource {
                b"F1" => "Helvetica-Bold".to_string(),
                _ => String::from_utf8_lossy(resource).to_string(),
            }
        }

        fn decode(&self, _resource: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    #[test]
    fn test_walk_tj_with_font_and_position() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 18.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op("Tj", vec![Object::string_literal("Introduction")]),
            op("ET", vec![]),
        ];
        let runs = walk_operations(&ops, &PlainDecoder);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Introduction");
        assert_eq!(runs[0].font_name, "Helvetica-Bold");
        assert_eq!(runs[0].font_size, 18.0);
        assert_eq!(runs[0].x, 72.0);
        assert_eq!(runs[0].baseline, 700.0);
    }

    #[test]
    fn test_text_matrix_scales_font_size() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F2".to_vec()), 1.into()]),
            op(
                "Tm",
                vec![12.into(), 0.into(), 0.into(), 12.into(), 50.into(), 600.into()],
            ),
            op("Tj", vec![Object::string_literal("Scaled")]),
            op("ET", vec![]),
        ];
        let runs = walk_operations(&ops, &PlainDecoder);
        assert_eq!(runs[0].font_size, 12.0);
        assert_eq!(runs[0].font_name, "F2");
    }

    #[test]
    fn test_tj_kerning_inserts_space() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hello"),
                    Object::Integer(-250),
                    Object::string_literal("World"),
                    Object::Integer(-20),
                    Object::string_literal("!"),
                ])],
            ),
            op("ET", vec![]),
        ];
        let runs = walk_operations(&ops, &PlainDecoder);
        assert_eq!(runs[0].text, "Hello World!");
    }

    #[test]
    fn test_tj_kerning_space_between_scripts() {
        let tj = |parts: Vec<Object>| -> String {
            let ops = vec![
                op("BT", vec![]),
                op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
                op("TJ", vec![Object::Array(parts)]),
                op("ET", vec![]),
            ];
            walk_operations(&ops, &PlainDecoder).remove(0).text
        };
        let utf8 = |s: &str| Object::string_literal(s.as_bytes().to_vec());

        assert_eq!(
            tj(vec![utf8("中文"), Object::Integer(-300), utf8("Hello")]),
            "中文 Hello"
        );
        assert_eq!(
            tj(vec![utf8("Hello"), Object::Integer(-300), utf8("中文")]),
            "Hello 中文"
        );
        assert_eq!(
            tj(vec![utf8("中"), Object::Integer(-300), utf8("文")]),
            "中文"
        );
        assert_eq!(
            tj(vec![utf8("Hello "), Object::Integer(-300), utf8("World")]),
            "Hello World"
        );
    }

    #[test]
    fn test_text_outside_block_is_ignored() {
        let ops = vec![
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Tj", vec![Object::string_literal("stray")]),
            op("BT", vec![]),
            op("Tj", vec![Object::string_literal("   ")]),
            op("ET", vec![]),
        ];
        assert!(walk_operations(&ops, &PlainDecoder).is_empty());
    }

    #[test]
    fn test_next_line_uses_leading() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("TL", vec![14.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op("Tj", vec![Object::string_literal("first line")]),
            op("T*", vec![]),
            op("Tj", vec![Object::string_literal("second line")]),
            op("ET", vec![]),
        ];
        let runs = walk_operations(&ops, &PlainDecoder);
        assert_eq!(runs[1].baseline, 686.0);
    }

    #[test]
    fn test_flipped_ctm_keeps_reading_order() {
        let flip = |y: i64| -> Vec<Object> {
            vec![1.into(), 0.into(), 0.into(), (-1).into(), 72.into(), y.into()]
        };
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![1.into(), 0.into(), 0.into(), (-1).into(), 0.into(), 792.into()]),
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Tm", flip(114)),
            op("Tj", vec![Object::string_literal("continues below")]),
            op("Tm", flip(100)),
            op("Tj", vec![Object::string_literal("Heading Top")]),
            op("ET", vec![]),
            op("Q", vec![]),
        ];
        let runs = walk_operations(&ops, &PlainDecoder);
        assert_eq!(runs[0].baseline, 678.0);
        assert_eq!(runs[1].baseline, 692.0);
        assert_eq!(runs[1].x, 72.0);
        assert_eq!(runs[1].font_size, 10.0);

        let fragments = into_reading_order(runs, 792.0);
        assert_eq!(fragments[0].text, "Heading Top");
        assert_eq!(fragments[1].text, "continues below");
        assert_eq!(fragments[0].bbox.top, 792.0 - 700.0);
        assert!(fragments[0].bbox.bottom < fragments[1].bbox.bottom);
    }

    #[test]
    fn test_graphics_state_restores_ctm() {
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![2.into(), 0.into(), 0.into(), 2.into(), 10.into(), 20.into()]),
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 9.into()]),
            op("Td", vec![5.into(), 100.into()]),
            op("Tj", vec![Object::string_literal("scaled")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Td", vec![5.into(), 100.into()]),
            op("Tj", vec![Object::string_literal("plain")]),
            op("ET", vec![]),
        ];
        let runs = walk_operations(&ops, &PlainDecoder);
        assert_eq!(runs[0].font_size, 18.0);
        assert_eq!((runs[0].x, runs[0].baseline), (20.0, 220.0));
        assert_eq!(runs[1].font_size, 9.0);
        assert_eq!((runs[1].x, runs[1].baseline), (5.0, 100.0));
    }

    #[test]
    fn test_reading_order_and_bbox() {
        let run = |text: &str, x: f32, baseline: f32| PositionedRun {
            text: text.to_string(),
            font_name: "F".to_string(),
            font_size: 10.0,
            x,
            baseline,
        };
        let runs = vec![
            run("lower", 72.0, 600.0),
            run("right", 200.0, 701.0),
            run("left", 72.0, 700.0),
        ];
        let fragments = into_reading_order(runs, 792.0);
        let texts: Vec<_> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["left", "right", "lower"]);

        let left = &fragments[0].bbox;
        assert_eq!(left.top, 792.0 - 708.0);
        assert_eq!(left.bottom, 792.0 - 698.0);
        assert_eq!(left.right, 72.0 + 20.0);
        assert!(left.top < left.bottom);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[test]
    fn test_spaceless_scripts() {
        assert!(is_spaceless_script_char('中'));
        assert!(is_spaceless_script_char('か'));
        assert!(!is_spaceless_script_char('한'));
        assert!(!is_spaceless_script_char('a'));
    }
}
