//! PDF layout extraction backed by `lopdf`.
//!
//! This is the concrete page-layout collaborator: it decodes content
//! streams into positioned [`Span`]s, groups them into baseline lines and
//! gap-separated blocks, and reads document metadata from the Info
//! dictionary. PDF user space is bottom-up; everything leaving this module
//! uses the top-down convention of [`crate::layout`].

use std::collections::HashMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document as LopdfDocument, Object};

use crate::error::{Error, Result};
use crate::layout::{BBox, DocumentInfo, LayoutTree, PageLayout, Span, TextBlock, TextLine};

/// Open a PDF file and extract its layout tree.
pub fn open<P: AsRef<Path>>(path: P) -> Result<LayoutTree> {
    let doc = LopdfDocument::load(path.as_ref()).map_err(|e| Error::Open(e.to_string()))?;
    build_tree(&doc)
}

/// Extract a layout tree from in-memory PDF bytes.
pub fn from_bytes(data: &[u8]) -> Result<LayoutTree> {
    let doc = LopdfDocument::load_mem(data).map_err(|e| Error::Open(e.to_string()))?;
    build_tree(&doc)
}

/// Walk every page of a parsed document and build the layout tree.
fn build_tree(doc: &LopdfDocument) -> Result<LayoutTree> {
    let mut tree = LayoutTree {
        info: extract_info(doc),
        pages: Vec::new(),
    };

    // get_pages is keyed by 1-based page number; iteration order is the
    // document's page order.
    for (index, (_page_num, page_id)) in doc.get_pages().into_iter().enumerate() {
        let (width, height) = page_dimensions(doc, page_id);
        let mut page = PageLayout::new(index, width, height);

        let spans = match extract_page_spans(doc, page_id, index, height) {
            Ok(spans) => spans,
            Err(e) => {
                // A page without decodable content contributes no spans but
                // does not fail the document.
                log::warn!("page {}: span extraction failed: {}", index, e);
                Vec::new()
            }
        };

        let lines = group_spans_into_lines(spans);
        for block in group_lines_into_blocks(lines) {
            page.add_block(block);
        }

        tree.add_page(page);
    }

    Ok(tree)
}

/// Read title/author/dates from the trailer's Info dictionary.
fn extract_info(doc: &LopdfDocument) -> DocumentInfo {
    let mut info = DocumentInfo::default();

    let Ok(obj) = doc.trailer.get(b"Info") else {
        return info;
    };

    let dict = match obj {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Dictionary(d)) => d,
            _ => return info,
        },
        Object::Dictionary(d) => d,
        _ => return info,
    };

    info.title = get_string_from_dict(dict, b"Title").filter(|s| !s.trim().is_empty());
    info.author = get_string_from_dict(dict, b"Author").filter(|s| !s.trim().is_empty());
    if let Some(date_str) = get_string_from_dict(dict, b"CreationDate") {
        info.created = parse_pdf_date(&date_str);
    }
    if let Some(date_str) = get_string_from_dict(dict, b"ModDate") {
        info.modified = parse_pdf_date(&date_str);
    }

    info
}

/// Page dimensions from the MediaBox, walking up the page tree if needed.
fn page_dimensions(doc: &LopdfDocument, page_id: lopdf::ObjectId) -> (f32, f32) {
    fn media_box(doc: &LopdfDocument, dict: &lopdf::Dictionary) -> Option<Vec<f32>> {
        if let Ok(obj) = dict.get(b"MediaBox") {
            let arr = match obj {
                Object::Array(arr) => Some(arr.clone()),
                Object::Reference(id) => match doc.get_object(*id) {
                    Ok(Object::Array(arr)) => Some(arr.clone()),
                    _ => None,
                },
                _ => None,
            };
            if let Some(arr) = arr {
                let nums: Vec<f32> = arr
                    .iter()
                    .filter_map(|o| match o {
                        Object::Integer(i) => Some(*i as f32),
                        Object::Real(r) => Some(*r),
                        _ => None,
                    })
                    .collect();
                if nums.len() >= 4 {
                    return Some(nums);
                }
            }
        }

        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent = doc.get_object(parent_id).ok()?.as_dict().ok()?;
        media_box(doc, parent)
    }

    if let Ok(dict) = doc.get_dictionary(page_id) {
        if let Some(nums) = media_box(doc, dict) {
            return (nums[2] - nums[0], nums[3] - nums[1]);
        }
    }

    // Letter size default
    (612.0, 792.0)
}

/// Per-font information resolved from the page's font resources.
#[derive(Debug, Clone, Default)]
struct FontInfo {
    base_font: String,
    encoding: Option<String>,
}

/// Extract positioned spans from one page's content stream.
fn extract_page_spans(
    doc: &LopdfDocument,
    page_id: lopdf::ObjectId,
    page_index: usize,
    page_height: f32,
) -> Result<Vec<Span>> {
    let mut fonts: HashMap<Vec<u8>, FontInfo> = HashMap::new();
    if let Ok(page_fonts) = doc.get_page_fonts(page_id) {
        for (name, dict) in &page_fonts {
            let base_font = dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
                .unwrap_or_else(|| "Unknown".to_string());
            let encoding = dict.get(b"Encoding").ok().and_then(|o| match o {
                Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
                _ => None,
            });
            fonts.insert(name.clone(), FontInfo { base_font, encoding });
        }
    }

    let content = doc
        .get_page_content(page_id)
        .map_err(|e| Error::Open(format!("cannot get page content: {}", e)))?;
    let content =
        Content::decode(&content).map_err(|e| Error::Open(format!("content stream: {}", e)))?;

    let mut spans = Vec::new();
    let mut current_font = FontInfo::default();
    let mut current_size: f32 = 12.0;
    let mut matrix = TextMatrix::default();
    let mut in_text_block = false;

    for op in content.operations {
        match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                matrix = TextMatrix::default();
            }
            "ET" => {
                in_text_block = false;
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(font_name) = &op.operands[0] {
                        current_font = fonts.get(font_name.as_slice()).cloned().unwrap_or_else(
                            || FontInfo {
                                base_font: String::from_utf8_lossy(font_name).into_owned(),
                                encoding: None,
                            },
                        );
                    }
                    current_size = get_number(&op.operands[1]).unwrap_or(12.0);
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    matrix.set(
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    );
                }
            }
            "T*" => {
                matrix.next_line();
            }
            "Tj" | "TJ" => {
                if !in_text_block {
                    continue;
                }
                let text = if op.operator == "TJ" {
                    decode_tj_array(op.operands.first(), &current_font, current_size)
                } else if let Some(Object::String(bytes, _)) = op.operands.first() {
                    decode_with_font(bytes, &current_font)
                } else {
                    String::new()
                };

                push_span(
                    &mut spans,
                    text,
                    &matrix,
                    &current_font,
                    current_size,
                    page_index,
                    page_height,
                );
            }
            "'" | "\"" => {
                matrix.next_line();
                if !in_text_block {
                    continue;
                }
                let text_idx = if op.operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                    let text = decode_with_font(bytes, &current_font);
                    push_span(
                        &mut spans,
                        text,
                        &matrix,
                        &current_font,
                        current_size,
                        page_index,
                        page_height,
                    );
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Append a span for decoded text at the current text position.
fn push_span(
    spans: &mut Vec<Span>,
    text: String,
    matrix: &TextMatrix,
    font: &FontInfo,
    size: f32,
    page_index: usize,
    page_height: f32,
) {
    if text.trim().is_empty() {
        return;
    }

    let (x, y) = matrix.position();
    let effective_size = size * matrix.scale();

    // Approximate extent: half the font size per character, with the
    // ascender/descender split the original extractor assumes.
    let width = text.chars().count() as f32 * effective_size * 0.5;
    let top = page_height - (y + effective_size * 0.8);
    let bottom = page_height - (y - effective_size * 0.2);

    spans.push(Span::new(
        text,
        font.base_font.clone(),
        effective_size,
        BBox::new(x, top, x + width, bottom),
        page_index,
    ));
}

/// Decode a TJ operand array, turning large kerning adjustments into spaces.
fn decode_tj_array(operand: Option<&Object>, font: &FontInfo, _size: f32) -> String {
    let Some(Object::Array(arr)) = operand else {
        return String::new();
    };

    let mut combined = String::new();
    // Adjustments are in 1/1000 text-space units; large negative values
    // usually stand in for word spaces.
    let space_threshold = 200.0;

    for item in arr {
        match item {
            Object::String(bytes, _) => {
                combined.push_str(&decode_with_font(bytes, font));
            }
            Object::Integer(n) => {
                if -(*n as f32) > space_threshold && !combined.ends_with(char::is_whitespace) {
                    combined.push(' ');
                }
            }
            Object::Real(n) => {
                if -n > space_threshold && !combined.ends_with(char::is_whitespace) {
                    combined.push(' ');
                }
            }
            _ => {}
        }
    }

    combined
}

/// Decode string bytes using the font's declared encoding as a hint.
fn decode_with_font(bytes: &[u8], font: &FontInfo) -> String {
    if let Some(enc) = &font.encoding {
        // Identity-H/V fonts carry 2-byte CID codes; try UTF-16BE.
        if enc.contains("Identity") && bytes.len() >= 2 && bytes.len() % 2 == 0 {
            let code_units: Vec<u16> = bytes
                .chunks(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&code_units);
            if !decoded.is_empty() && !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }
    }

    decode_text_simple(bytes)
}

/// Simple text decoding fallback when no usable encoding is declared.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    // UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Group spans into baseline lines, top to bottom.
fn group_spans_into_lines(mut spans: Vec<Span>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    spans.sort_by(|a, b| {
        let y_cmp = a
            .bbox
            .y0
            .partial_cmp(&b.bbox.y0)
            .unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.bbox
                .x0
                .partial_cmp(&b.bbox.x0)
                .unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.size * 0.3;
        match current_y {
            Some(y) if (span.bbox.y0 - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.bbox.y0);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Group lines into blocks separated by spacing, size, or indentation jumps.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    if lines.is_empty() {
        return vec![];
    }

    let avg_spacing = average_line_spacing(&lines);
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        let break_block = match current.last() {
            None => false,
            Some(prev) => {
                let spacing = line.bbox.y0 - prev.bbox.y1;
                spacing > avg_spacing * 1.5
                    || (prev.size() - line.size()).abs() > 1.0
                    || (prev.bbox.x0 - line.bbox.x0).abs() > 20.0
            }
        };

        if break_block && !current.is_empty() {
            blocks.push(TextBlock::from_lines(std::mem::take(&mut current)));
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(TextBlock::from_lines(current));
    }

    blocks
}

/// Mean vertical distance between consecutive line tops.
fn average_line_spacing(lines: &[TextLine]) -> f32 {
    if lines.len() < 2 {
        return 12.0;
    }

    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[1].bbox.y0 - w[0].bbox.y0).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default leading; a TL operator would refine this.
        self.f -= 12.0 * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper to get a text string from a PDF dictionary.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    })
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}
