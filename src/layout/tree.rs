//! Layout data model: the seam to the page-layout extraction collaborator.
//!
//! Coordinates use a top-left origin with y growing downward, so `bbox.y0`
//! is a span's top edge and `bbox.y1` its bottom edge. Producers working in
//! PDF user space (bottom-up) convert before building spans.

use chrono::{DateTime, Utc};

/// Axis-aligned bounding box, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A styled text fragment, the smallest unit the collaborator produces.
#[derive(Debug, Clone)]
pub struct Span {
    /// Text content, whitespace-stripped
    pub text: String,

    /// Font name (e.g. "Helvetica-Bold")
    pub font: String,

    /// Font size in points
    pub size: f32,

    /// Bounding box on the page
    pub bbox: BBox,

    /// Page index (0-based)
    pub page: usize,
}

impl Span {
    /// Create a new span. The text is stripped of surrounding whitespace.
    pub fn new(
        text: impl Into<String>,
        font: impl Into<String>,
        size: f32,
        bbox: BBox,
        page: usize,
    ) -> Self {
        Self {
            text: text.into().trim().to_string(),
            font: font.into(),
            size,
            bbox,
            page,
        }
    }

    /// Whether the font name indicates bold or heavy weight.
    pub fn is_bold(&self) -> bool {
        let font = self.font.to_lowercase();
        ["bold", "heavy", "black", "demi"]
            .iter()
            .any(|kw| font.contains(kw))
    }

    /// Whether the font name indicates medium or semi weight.
    pub fn is_medium(&self) -> bool {
        let font = self.font.to_lowercase();
        ["medium", "semi"].iter().any(|kw| font.contains(kw))
    }
}

/// A line of spans sharing a baseline, ordered left to right.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Spans in this line, sorted by left edge
    pub spans: Vec<Span>,

    /// Line bounding box (union of span boxes)
    pub bbox: BBox,
}

impl TextLine {
    /// Build a line from spans. Spans are sorted by their left edge and the
    /// line bbox is the union of span boxes. Panics on an empty span list
    /// only in debug builds; callers must not construct empty lines.
    pub fn from_spans(mut spans: Vec<Span>) -> Self {
        debug_assert!(!spans.is_empty());
        spans.sort_by(|a, b| {
            a.bbox
                .x0
                .partial_cmp(&b.bbox.x0)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let bbox = spans
            .iter()
            .skip(1)
            .fold(spans[0].bbox, |acc, s| acc.union(&s.bbox));

        Self { spans, bbox }
    }

    /// The first (leftmost) span, carrying the line's nominal font and size.
    pub fn first_span(&self) -> Option<&Span> {
        self.spans.first()
    }

    /// Nominal font size of the line.
    pub fn size(&self) -> f32 {
        self.first_span().map(|s| s.size).unwrap_or(0.0)
    }

    /// Combined text of all spans.
    ///
    /// A single space is inserted between spans whose horizontal gap exceeds
    /// a fifth of the font size, unless one of them already carries the
    /// whitespace.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.bbox.x0 - prev.bbox.x1;
                if gap > span.size * 0.2 && !result.ends_with(char::is_whitespace) {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }
        result.trim().to_string()
    }
}

/// A block of consecutive lines (paragraph, heading, list, ...).
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// Lines in this block, in reading order
    pub lines: Vec<TextLine>,

    /// Block bounding box (union of line boxes)
    pub bbox: BBox,
}

impl TextBlock {
    /// Build a block from lines.
    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        debug_assert!(!lines.is_empty());
        let bbox = lines
            .iter()
            .skip(1)
            .fold(lines[0].bbox, |acc, l| acc.union(&l.bbox));

        Self { lines, bbox }
    }
}

/// One page of extracted layout.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Page index (0-based)
    pub index: usize,

    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text blocks in reading order
    pub blocks: Vec<TextBlock>,
}

impl PageLayout {
    /// Create an empty page.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Append a block.
    pub fn add_block(&mut self, block: TextBlock) {
        self.blocks.push(block);
    }

    /// Iterate all lines on the page in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// Iterate all spans on the page.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines().flat_map(|l| l.spans.iter())
    }
}

/// Document metadata supplied by the collaborator.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    /// Title from the document's own metadata, if any
    pub title: Option<String>,

    /// Author
    pub author: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

/// The full extracted layout of one document.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    /// Document metadata
    pub info: DocumentInfo,

    /// Pages in order
    pub pages: Vec<PageLayout>,
}

impl LayoutTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page.
    pub fn add_page(&mut self, page: PageLayout) {
        self.pages.push(page);
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether the document has zero pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate every span in the document.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.pages.iter().flat_map(|p| p.spans())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f32, x1: f32) -> Span {
        Span::new(text, "Helvetica", 12.0, BBox::new(x0, 100.0, x1, 112.0), 0)
    }

    #[test]
    fn test_span_bold_detection() {
        let s = Span::new("x", "Arial-BoldMT", 12.0, BBox::new(0.0, 0.0, 1.0, 1.0), 0);
        assert!(s.is_bold());

        let s = Span::new("x", "Arial-Black", 12.0, BBox::new(0.0, 0.0, 1.0, 1.0), 0);
        assert!(s.is_bold());

        let s = Span::new("x", "Helvetica", 12.0, BBox::new(0.0, 0.0, 1.0, 1.0), 0);
        assert!(!s.is_bold());

        let s = Span::new("x", "NotoSans-SemiBold", 12.0, BBox::new(0.0, 0.0, 1.0, 1.0), 0);
        assert!(s.is_medium());
    }

    #[test]
    fn test_line_text_joins_with_gap_spacing() {
        let line = TextLine::from_spans(vec![span("Hello", 0.0, 30.0), span("world", 40.0, 70.0)]);
        assert_eq!(line.text(), "Hello world");

        // Tight kerning joins without a space
        let line = TextLine::from_spans(vec![span("Hel", 0.0, 18.0), span("lo", 18.5, 30.0)]);
        assert_eq!(line.text(), "Hello");
    }

    #[test]
    fn test_line_sorts_spans_by_x() {
        let line = TextLine::from_spans(vec![span("world", 40.0, 70.0), span("Hello", 0.0, 30.0)]);
        assert_eq!(line.text(), "Hello world");
        assert_eq!(line.bbox.x0, 0.0);
        assert_eq!(line.bbox.x1, 70.0);
    }

    #[test]
    fn test_tree_span_iteration() {
        let mut tree = LayoutTree::new();
        let mut page = PageLayout::new(0, 612.0, 792.0);
        page.add_block(TextBlock::from_lines(vec![TextLine::from_spans(vec![
            span("a", 0.0, 5.0),
            span("b", 10.0, 15.0),
        ])]));
        tree.add_page(page);

        assert_eq!(tree.page_count(), 1);
        assert_eq!(tree.spans().count(), 2);
    }
}
