//! Heading candidate classification over pages after the first.

use crate::config::ClassifierConfig;
use crate::engine::patterns::{HeadingPatterns, HEADING_SKIP_EXACT};
use crate::engine::profile::StyleProfile;
use crate::layout::{LayoutTree, TextBlock, TextLine};

/// A line accepted as a heading candidate, with the signals that scored it.
#[derive(Debug, Clone)]
pub struct HeadingCandidate {
    /// Combined line text
    pub text: String,

    /// Font size of the line's first span
    pub size: f32,

    /// Font name of the line's first span
    pub font: String,

    /// Page index (0-based)
    pub page: usize,

    /// Top edge of the line on the page
    pub y: f32,

    /// Composite score at acceptance time
    pub score: i32,

    /// Starts with an explicit numbering pattern
    pub is_numbered: bool,

    /// Starts with an appendix/annex keyword
    pub is_appendix: bool,

    /// Starts with a chapter keyword
    pub is_chapter: bool,

    /// Starts with a section keyword
    pub is_section: bool,

    /// Bold or heavy font weight
    pub is_bold: bool,

    /// Entirely uppercase (within the word limit)
    pub is_all_caps: bool,

    /// Font size relative to the body size
    pub size_ratio: f32,
}

/// Scores lines against the style profile and pattern table, keeping those
/// that clear the context-dependent threshold.
pub struct HeadingClassifier<'a> {
    profile: &'a StyleProfile,
    config: &'a ClassifierConfig,
    patterns: &'a HeadingPatterns,
}

impl<'a> HeadingClassifier<'a> {
    /// Create a classifier over a profiled document.
    pub fn new(
        profile: &'a StyleProfile,
        config: &'a ClassifierConfig,
        patterns: &'a HeadingPatterns,
    ) -> Self {
        Self {
            profile,
            config,
            patterns,
        }
    }

    /// Scan pages after the first and collect accepted heading candidates
    /// in reading order.
    pub fn classify(&self, tree: &LayoutTree) -> Vec<HeadingCandidate> {
        let mut candidates = Vec::new();

        for page in tree.pages.iter().skip(1) {
            let band = page.height * self.config.header_footer_band;
            let mut previous_block: Option<&TextBlock> = None;

            for block in &page.blocks {
                // Header/footer zone; the block also stays out of the
                // spacing context.
                if block.bbox.y0 < band || block.bbox.y1 > page.height - band {
                    continue;
                }

                for line in &block.lines {
                    if let Some(candidate) =
                        self.classify_line(line, block, previous_block, page.index, page.width)
                    {
                        candidates.push(candidate);
                    }
                }

                previous_block = Some(block);
            }
        }

        log::debug!("classifier accepted {} heading candidates", candidates.len());
        candidates
    }

    /// Score one line; `None` when a filter rejects it or the score falls
    /// short of its threshold.
    fn classify_line(
        &self,
        line: &TextLine,
        block: &TextBlock,
        previous_block: Option<&TextBlock>,
        page_index: usize,
        page_width: f32,
    ) -> Option<HeadingCandidate> {
        let span = line.first_span()?;
        let text = line.text();
        if text.chars().count() < 2 {
            return None;
        }

        let word_count = text.split_whitespace().count();
        if word_count > self.config.max_words || word_count < self.config.min_words {
            return None;
        }

        if self.patterns.ends_like_sentence(&text) {
            return None;
        }

        let text_lower = text.to_lowercase();
        let text_lower = text_lower.trim();
        if HEADING_SKIP_EXACT.contains(&text_lower) {
            return None;
        }

        if self.patterns.is_date(text_lower) {
            return None;
        }

        if punctuation_ratio(&text) > self.config.max_punct_ratio {
            return None;
        }

        // Signal derivation
        let is_bold = span.is_bold();
        let is_medium = span.is_medium();

        let size_ratio = self.profile.size_ratio(span.size);
        let is_larger = size_ratio > self.config.larger_ratio;
        let is_much_larger = size_ratio > self.config.much_larger_ratio;

        let is_numbered = self.patterns.is_numbered(&text);
        let is_appendix = self.patterns.is_appendix(text_lower);
        let is_chapter = self.patterns.is_chapter(text_lower);
        let is_section = self.patterns.is_section(text_lower);

        let is_all_caps = is_upper(&text) && word_count <= self.config.caps_max_words;
        let is_title_case = is_title_case(&text);

        let line_center = line.bbox.center_x();
        let is_centered = (line_center - page_width / 2.0).abs() < self.config.center_tolerance;
        let is_left_aligned = line.bbox.x0 < page_width * self.config.left_margin_ratio;

        let has_space_before = previous_block
            .map(|prev| (block.bbox.y0 - prev.bbox.y1) > self.profile.body_size * self.config.gap_factor)
            .unwrap_or(false);

        let tiers = &self.profile.heading_sizes;
        let tol = self.config.tier_tolerance;
        let is_top_size = (span.size - tiers.largest).abs() < tol;
        let is_second_size = (span.size - tiers.second_largest).abs() < tol;
        let is_third_size = (span.size - tiers.third_largest).abs() < tol;

        // Composite score
        let mut score = 0;
        let cfg = self.config;

        if is_much_larger {
            score += cfg.size_bonuses.0;
        } else if is_larger {
            score += cfg.size_bonuses.1;
        } else if size_ratio > cfg.slight_ratio {
            score += cfg.size_bonuses.2;
        }

        if is_bold {
            score += cfg.weight_bonuses.0;
        } else if is_medium {
            score += cfg.weight_bonuses.1;
        }

        if is_numbered {
            score += cfg.pattern_bonuses.0;
        }
        if is_chapter {
            score += cfg.pattern_bonuses.1;
        }
        if is_section {
            score += cfg.pattern_bonuses.2;
        }
        if is_appendix {
            score += cfg.pattern_bonuses.3;
        }

        if is_all_caps && word_count <= cfg.caps_bonus_max_words {
            score += cfg.caps_bonus;
        } else if is_title_case {
            score += cfg.title_case_bonus;
        }

        if is_centered || is_left_aligned {
            score += cfg.alignment_bonus;
        }

        if has_space_before {
            score += cfg.spacing_bonus;
        }

        if word_count >= cfg.min_words && word_count <= cfg.max_words {
            score += cfg.length_bonus;
        }

        if is_top_size {
            score += cfg.tier_bonuses.0;
        } else if is_second_size {
            score += cfg.tier_bonuses.1;
        } else if is_third_size {
            score += cfg.tier_bonuses.2;
        }

        // Context-dependent acceptance threshold
        let mut threshold = cfg.base_threshold;
        if is_numbered || is_chapter || is_appendix {
            threshold = cfg.structured_threshold;
        } else if is_much_larger && is_bold {
            threshold = cfg.emphasis_threshold;
        } else if word_count <= cfg.short_words && is_larger {
            threshold = cfg.emphasis_threshold;
        }
        if word_count > cfg.weak_max_words || !is_larger {
            threshold = cfg.weak_threshold;
        }

        if score < threshold {
            return None;
        }

        log::debug!(
            "page {}: heading candidate {:?} (score {} >= {})",
            page_index,
            text,
            score,
            threshold
        );

        Some(HeadingCandidate {
            text,
            size: span.size,
            font: span.font.clone(),
            page: page_index,
            y: line.bbox.y0,
            score,
            is_numbered,
            is_appendix,
            is_chapter,
            is_section,
            is_bold,
            is_all_caps,
            size_ratio,
        })
    }
}

/// Fraction of non-word, non-space characters in the text.
fn punctuation_ratio(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let punct = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && *c != '_' && !c.is_whitespace())
        .count();
    punct as f32 / total as f32
}

/// Whether every cased character is uppercase (and at least one exists).
fn is_upper(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        has_cased = true;
        if c.is_lowercase() {
            return false;
        }
    }
    has_cased
}

/// Title case: each alphabetic run starts uppercase and continues lowercase.
fn is_title_case(text: &str) -> bool {
    let mut has_cased = false;
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if !in_word {
                if !c.is_uppercase() {
                    return false;
                }
                in_word = true;
            } else if c.is_uppercase() {
                return false;
            }
            has_cased = true;
        } else {
            in_word = false;
        }
    }

    has_cased
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;
    use crate::layout::{BBox, PageLayout, Span, TextBlock, TextLine};

    fn line_at(text: &str, font: &str, size: f32, y: f32) -> TextLine {
        TextLine::from_spans(vec![Span::new(
            text,
            font,
            size,
            BBox::new(72.0, y, 72.0 + text.len() as f32 * size * 0.5, y + size),
            1,
        )])
    }

    /// A two-page document: page 0 holds the title, a subtitle, and body
    /// filler (fixing the size tiers), page 1 holds the given heading line
    /// surrounded by body blocks.
    fn doc_with_heading(text: &str, font: &str, size: f32) -> LayoutTree {
        let body = "ordinary paragraph text that anchors the document body size firmly";
        let mut tree = LayoutTree::new();

        let mut page0 = PageLayout::new(0, 612.0, 792.0);
        page0.add_block(TextBlock::from_lines(vec![line_at(
            "Document Title",
            "Helvetica-Bold",
            18.0,
            60.0,
        )]));
        page0.add_block(TextBlock::from_lines(vec![line_at(
            "With a Subtitle",
            "Helvetica",
            14.0,
            90.0,
        )]));
        page0.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 300.0)]));
        page0.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 320.0)]));
        tree.add_page(page0);

        let mut page1 = PageLayout::new(1, 612.0, 792.0);
        page1.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 100.0)]));
        page1.add_block(TextBlock::from_lines(vec![line_at(text, font, size, 200.0)]));
        page1.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 260.0)]));
        tree.add_page(page1);

        tree
    }

    fn classify(tree: &LayoutTree) -> Vec<HeadingCandidate> {
        let profile = StyleProfile::build(tree, &ProfileConfig::default()).unwrap();
        let patterns = HeadingPatterns::new();
        HeadingClassifier::new(&profile, &ClassifierConfig::default(), &patterns).classify(tree)
    }

    #[test]
    fn test_large_bold_heading_accepted() {
        let tree = doc_with_heading("Implementation Overview", "Helvetica-Bold", 16.0);
        let candidates = classify(&tree);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Implementation Overview");
        assert!(candidates[0].is_bold);
        assert_eq!(candidates[0].page, 1);
    }

    #[test]
    fn test_numbered_heading_accepted_at_body_size() {
        let tree = doc_with_heading("2.3 Sampling Procedure", "Helvetica", 10.0);
        let candidates = classify(&tree);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].is_numbered);
    }

    #[test]
    fn test_first_page_is_skipped() {
        let body = "ordinary paragraph text that anchors the document body size firmly";
        let mut tree = LayoutTree::new();
        let mut page0 = PageLayout::new(0, 612.0, 792.0);
        page0.add_block(TextBlock::from_lines(vec![line_at(
            "Huge Heading Here",
            "Helvetica-Bold",
            20.0,
        200.0)]));
        page0.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 400.0)]));
        page0.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 420.0)]));
        tree.add_page(page0);
        assert!(classify(&tree).is_empty());
    }

    #[test]
    fn test_sentence_line_rejected() {
        let tree = doc_with_heading("This wraps up the argument.", "Helvetica-Bold", 16.0);
        assert!(classify(&tree).is_empty());
    }

    #[test]
    fn test_long_line_rejected() {
        let long = "a heading cannot possibly run this long because sixteen \
                    separate words clearly make it a paragraph of body text";
        let tree = doc_with_heading(long, "Helvetica-Bold", 16.0);
        assert!(classify(&tree).is_empty());
    }

    #[test]
    fn test_boilerplate_exact_match_rejected() {
        let tree = doc_with_heading("Table of Contents", "Helvetica-Bold", 18.0);
        assert!(classify(&tree).is_empty());
    }

    #[test]
    fn test_date_line_rejected() {
        let tree = doc_with_heading("12 Mar 2024", "Helvetica-Bold", 16.0);
        assert!(classify(&tree).is_empty());

        let tree = doc_with_heading("March 15, 2024", "Helvetica-Bold", 16.0);
        assert!(classify(&tree).is_empty());
    }

    #[test]
    fn test_header_footer_band_rejected() {
        let body = "ordinary paragraph text that anchors the document body size firmly";
        let mut tree = LayoutTree::new();
        let mut page0 = PageLayout::new(0, 612.0, 792.0);
        page0.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 300.0)]));
        page0.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 320.0)]));
        tree.add_page(page0);

        let mut page1 = PageLayout::new(1, 612.0, 792.0);
        // Top edge within the top 8% band (792 * 0.08 = 63.4)
        page1.add_block(TextBlock::from_lines(vec![line_at(
            "Running Header Title",
            "Helvetica-Bold",
            16.0,
            30.0,
        )]));
        page1.add_block(TextBlock::from_lines(vec![line_at(body, "Helvetica", 10.0, 400.0)]));
        tree.add_page(page1);

        assert!(classify(&tree).is_empty());
    }

    #[test]
    fn test_punctuation_heavy_line_rejected() {
        let tree = doc_with_heading("*** $$$ Results !!! ***", "Helvetica-Bold", 16.0);
        assert!(classify(&tree).is_empty());
    }

    #[test]
    fn test_is_upper() {
        assert!(is_upper("EXECUTIVE SUMMARY"));
        assert!(!is_upper("Executive Summary"));
        assert!(!is_upper("123"));
        assert!(is_upper("PHASE 2"));
    }

    #[test]
    fn test_is_title_case() {
        assert!(is_title_case("Executive Summary"));
        assert!(is_title_case("2.3 Sampling Procedure"));
        assert!(!is_title_case("EXECUTIVE SUMMARY"));
        assert!(!is_title_case("executive summary"));
        assert!(!is_title_case("McIntosh Review"));
    }

    #[test]
    fn test_punctuation_ratio() {
        assert!(punctuation_ratio("Introduction") < 0.01);
        assert!(punctuation_ratio("a.b.c.d.e") > 0.4);
    }
}
