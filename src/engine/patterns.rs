//! Static pattern tables for heading and title heuristics.
//!
//! All keyword and numbering recognition is table-driven: the compiled
//! regexes live here, scoring logic elsewhere. Extending a keyword set is an
//! edit to this file only.

use regex::Regex;

/// Kind of explicit numbering found at the start of a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingKind {
    /// Dotted decimal numbering; the payload is the segment count (1..=4)
    Decimal(usize),
    /// Roman numeral ("IV.")
    Roman,
    /// Single letter ("A.")
    Letter,
}

/// Substrings that disqualify a line from being the document title.
pub const TITLE_SKIP_SUBSTRINGS: &[&str] = &["page", "copyright", "confidential", "draft"];

/// Exact lowercase matches that are never headings, across languages.
pub const HEADING_SKIP_EXACT: &[&str] = &[
    "page",
    "seite",
    "página",
    "pagina",
    "страница",
    "页",
    "페이지",
    "copyright",
    "confidential",
    "draft",
    "preliminary",
    "table of contents",
    "inhaltsverzeichnis",
    "índice",
    "sommaire",
    "date",
    "remarks",
    "version",
    "revision",
    "author",
    "title",
];

/// Lowercase labels dropped from the final outline.
pub const OUTLINE_DROP_LABELS: &[&str] = &["table of contents", "contents", "index"];

/// Compiled pattern table for heading detection and text cleanup.
///
/// Compiled once per engine run; all patterns are static and the
/// constructor cannot fail, so the `Regex::new` calls unwrap.
#[derive(Debug)]
pub struct HeadingPatterns {
    numbered: Regex,
    decimal_depths: [Regex; 4],
    roman: Regex,
    letter: Regex,
    appendix: Regex,
    chapter: Regex,
    section: Regex,
    date_day_month_year: Regex,
    date_numeric: Regex,
    date_long_form: Regex,
    sentence_end: Regex,
    toc_leader: Regex,
    control_chars: Regex,
    whitespace: Regex,
    edge_dots: Regex,
}

impl HeadingPatterns {
    /// Compile the pattern table.
    pub fn new() -> Self {
        Self {
            numbered: Regex::new(
                r"^(?:\d+\.\d+\.\d+\.\d+|\d+\.\d+\.\d+|\d+\.\d+|\d+\.|[IVXLCDM]+\.|[A-Za-z]\.)\s+",
            )
            .unwrap(),
            decimal_depths: [
                Regex::new(r"^\d+\.\d+\.\d+\.\d+").unwrap(),
                Regex::new(r"^\d+\.\d+\.\d+").unwrap(),
                Regex::new(r"^\d+\.\d+").unwrap(),
                Regex::new(r"^\d+\.").unwrap(),
            ],
            roman: Regex::new(r"^[IVXLCDM]+\.").unwrap(),
            letter: Regex::new(r"^[A-Za-z]\.").unwrap(),
            appendix: Regex::new(r"^(appendix|annex|anhang|appendice|附录|부록|приложение|ملحق)\b")
                .unwrap(),
            chapter: Regex::new(r"^(chapter|chapitre|kapitel|capitolo|capítulo|章|장|глава|فصل)\s+")
                .unwrap(),
            section: Regex::new(r"^(section|abschnitt|sezione|sección|节|섹션|раздел|قسم)\s+")
                .unwrap(),
            date_day_month_year: Regex::new(
                r"^\d{1,2}\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\s+\d{4}$",
            )
            .unwrap(),
            date_numeric: Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$").unwrap(),
            date_long_form: Regex::new(
                r"^(january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2},?\s+\d{4}$",
            )
            .unwrap(),
            sentence_end: Regex::new(r"[.,;:!?]\s*$").unwrap(),
            toc_leader: Regex::new(r"\s*[\._]{2,}\s*(\d+|[ivx]+)\s*$").unwrap(),
            control_chars: Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f-\x84\x86-\x9f]").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
            edge_dots: Regex::new(r"^[\s\._]+|[\s\._]+$").unwrap(),
        }
    }

    /// Whether the text starts with an explicit numbering pattern.
    pub fn is_numbered(&self, text: &str) -> bool {
        self.numbered.is_match(text)
    }

    /// Classify the numbering at the start of the text, if any.
    ///
    /// Depth checks run deepest first so "2.3.1" is not mistaken for "2.3".
    pub fn numbering_kind(&self, text: &str) -> Option<NumberingKind> {
        for (i, re) in self.decimal_depths.iter().enumerate() {
            if re.is_match(text) {
                return Some(NumberingKind::Decimal(4 - i));
            }
        }
        if self.roman.is_match(text) {
            return Some(NumberingKind::Roman);
        }
        if self.letter.is_match(text) {
            return Some(NumberingKind::Letter);
        }
        None
    }

    /// Appendix/annex keyword match (expects lowercased text).
    pub fn is_appendix(&self, text_lower: &str) -> bool {
        self.appendix.is_match(text_lower)
    }

    /// Chapter keyword match (expects lowercased text).
    pub fn is_chapter(&self, text_lower: &str) -> bool {
        self.chapter.is_match(text_lower)
    }

    /// Section keyword match (expects lowercased text).
    pub fn is_section(&self, text_lower: &str) -> bool {
        self.section.is_match(text_lower)
    }

    /// Whether the text is a date in any recognized format.
    pub fn is_date(&self, text_lower: &str) -> bool {
        self.date_day_month_year.is_match(text_lower)
            || self.date_numeric.is_match(text_lower)
            || self.date_long_form.is_match(text_lower)
    }

    /// Whether the text ends with sentence punctuation.
    pub fn ends_like_sentence(&self, text: &str) -> bool {
        self.sentence_end.is_match(text)
    }

    /// Collapse whitespace runs and strip control characters.
    pub fn clean_text(&self, text: &str) -> String {
        let text = self.whitespace.replace_all(text, " ");
        self.control_chars.replace_all(&text, "").trim().to_string()
    }

    /// Strip table-of-contents artifacts: leader dots with page numbers and
    /// leading/trailing dot-underscore runs.
    pub fn strip_toc_artifacts(&self, text: &str) -> String {
        let text = self.toc_leader.replace(text, "");
        let text = self.clean_text(&text);
        self.edge_dots.replace_all(&text, "").to_string()
    }
}

impl Default for HeadingPatterns {
    fn default() -> Self {
        Self::new()
    }
}
