//! Document style profiling.
//!
//! A single pass over every span builds the frequency table the rest of the
//! pipeline keys off: the dominant body size and font, and the three largest
//! distinct sizes as heading tiers.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::config::ProfileConfig;
use crate::layout::LayoutTree;

/// Canonical rounded font-size key, in hundredths of a point.
///
/// Every rounding pass goes through this key, so a size can never drift
/// between representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SizeKey(i32);

impl SizeKey {
    /// Key for a raw font size.
    pub fn from_size(size: f32) -> Self {
        SizeKey((size * 100.0).round() as i32)
    }

    /// The size this key canonicalizes.
    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

/// Accumulated statistics for one rounded font size.
#[derive(Debug, Clone, Default)]
pub struct SizeStats {
    /// Number of spans at this size
    pub count: usize,

    /// Spans whose font reads as bold/heavy
    pub bold_count: usize,

    /// Font-name frequency at this size
    pub fonts: BTreeMap<String, usize>,

    /// Total characters rendered at this size
    pub total_chars: usize,
}

/// The three largest distinct sizes, the prior for heading levels.
#[derive(Debug, Clone, Copy)]
pub struct HeadingSizes {
    pub largest: f32,
    pub second_largest: f32,
    pub third_largest: f32,
}

/// Style profile of one document.
#[derive(Debug, Clone)]
pub struct StyleProfile {
    /// Font size judged to represent ordinary paragraph text
    pub body_size: f32,

    /// Most frequent font name overall
    pub body_font: String,

    /// Per-size statistics keyed by canonical size
    pub size_stats: BTreeMap<SizeKey, SizeStats>,

    /// Top three size tiers
    pub heading_sizes: HeadingSizes,

    /// All distinct sizes, largest first
    pub sorted_sizes: Vec<f32>,
}

impl StyleProfile {
    /// Profile every span in the document.
    ///
    /// Returns `None` when the document contains no spans; the caller treats
    /// that as the terminal no-text-content condition.
    pub fn build(tree: &LayoutTree, config: &ProfileConfig) -> Option<Self> {
        let mut size_stats: BTreeMap<SizeKey, SizeStats> = BTreeMap::new();

        for span in tree.spans() {
            let stats = size_stats.entry(SizeKey::from_size(span.size)).or_default();
            stats.count += 1;
            stats.total_chars += span.text.chars().count();
            *stats.fonts.entry(span.font.clone()).or_insert(0) += 1;
            if span.is_bold() {
                stats.bold_count += 1;
            }
        }

        if size_stats.is_empty() {
            return None;
        }

        // Body size: most frequent size backing substantial content, falling
        // back to the most frequent size outright. Ties break toward the
        // smaller size.
        let body_size = size_stats
            .iter()
            .filter(|(_, s)| s.total_chars > config.body_char_threshold)
            .min_by_key(|(key, s)| (Reverse(s.count), **key))
            .or_else(|| {
                size_stats
                    .iter()
                    .min_by_key(|(key, s)| (Reverse(s.count), **key))
            })
            .map(|(key, _)| key.as_f32())
            .unwrap_or(config.fallback_body_size);

        // Most frequent font overall; ties break lexicographically.
        let mut font_totals: BTreeMap<&str, usize> = BTreeMap::new();
        for stats in size_stats.values() {
            for (font, count) in &stats.fonts {
                *font_totals.entry(font.as_str()).or_insert(0) += count;
            }
        }
        let body_font = font_totals
            .iter()
            .min_by_key(|(name, count)| (Reverse(**count), **name))
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let sorted_sizes: Vec<f32> = size_stats.keys().rev().map(|k| k.as_f32()).collect();

        let heading_sizes = HeadingSizes {
            largest: sorted_sizes.first().copied().unwrap_or(body_size),
            second_largest: sorted_sizes.get(1).copied().unwrap_or(body_size),
            third_largest: sorted_sizes.get(2).copied().unwrap_or(body_size),
        };

        log::debug!(
            "style profile: body {:.2}pt {}, {} distinct sizes, tiers {:.2}/{:.2}/{:.2}",
            body_size,
            body_font,
            sorted_sizes.len(),
            heading_sizes.largest,
            heading_sizes.second_largest,
            heading_sizes.third_largest,
        );

        Some(Self {
            body_size,
            body_font,
            size_stats,
            heading_sizes,
            sorted_sizes,
        })
    }

    /// Ratio of a span size to the profiled body size.
    pub fn size_ratio(&self, size: f32) -> f32 {
        if self.body_size > 0.0 {
            size / self.body_size
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BBox, PageLayout, Span, TextBlock, TextLine};

    fn page_with_spans(spans: Vec<Span>) -> LayoutTree {
        let mut tree = LayoutTree::new();
        let mut page = PageLayout::new(0, 612.0, 792.0);
        if !spans.is_empty() {
            page.add_block(TextBlock::from_lines(vec![TextLine::from_spans(spans)]));
        }
        tree.add_page(page);
        tree
    }

    fn span(text: &str, font: &str, size: f32) -> Span {
        Span::new(text, font, size, BBox::new(0.0, 0.0, 100.0, size), 0)
    }

    #[test]
    fn test_empty_document_yields_none() {
        let tree = page_with_spans(vec![]);
        assert!(StyleProfile::build(&tree, &ProfileConfig::default()).is_none());
    }

    #[test]
    fn test_body_size_requires_substantial_content() {
        // 24pt appears often but carries few characters; 11pt backs the text.
        let long = "long enough paragraph text to cross the character floor";
        let mut spans = Vec::new();
        for _ in 0..5 {
            spans.push(span(long, "Helvetica", 11.0));
        }
        for _ in 0..8 {
            spans.push(span("Hi", "Helvetica-Bold", 24.0));
        }
        let tree = page_with_spans(spans);
        let profile = StyleProfile::build(&tree, &ProfileConfig::default()).unwrap();
        assert!((profile.body_size - 11.0).abs() < 0.01);
    }

    #[test]
    fn test_body_size_fallback_most_frequent() {
        // Nothing crosses the char floor; most frequent size wins.
        let mut spans = Vec::new();
        for _ in 0..4 {
            spans.push(span("abc", "Helvetica", 9.0));
        }
        spans.push(span("xy", "Helvetica", 14.0));
        let tree = page_with_spans(spans);
        let profile = StyleProfile::build(&tree, &ProfileConfig::default()).unwrap();
        assert!((profile.body_size - 9.0).abs() < 0.01);
    }

    #[test]
    fn test_frequency_tie_breaks_toward_smaller_size() {
        let spans = vec![
            span("aa", "Helvetica", 12.0),
            span("bb", "Helvetica", 10.0),
        ];
        let tree = page_with_spans(spans);
        let profile = StyleProfile::build(&tree, &ProfileConfig::default()).unwrap();
        assert!((profile.body_size - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_heading_tiers_degenerate_to_body_size() {
        let long = "enough characters to qualify as the document body size here";
        let mut spans = Vec::new();
        for _ in 0..3 {
            spans.push(span(long, "Times", 12.0));
        }
        let tree = page_with_spans(spans);
        let profile = StyleProfile::build(&tree, &ProfileConfig::default()).unwrap();
        assert!((profile.heading_sizes.largest - 12.0).abs() < 0.01);
        assert!((profile.heading_sizes.second_largest - 12.0).abs() < 0.01);
        assert!((profile.heading_sizes.third_largest - 12.0).abs() < 0.01);
    }

    #[test]
    fn test_sorted_sizes_descending() {
        let spans = vec![
            span("aaa", "Times", 10.0),
            span("bbb", "Times", 18.0),
            span("ccc", "Times", 14.0),
        ];
        let tree = page_with_spans(spans);
        let profile = StyleProfile::build(&tree, &ProfileConfig::default()).unwrap();
        assert_eq!(profile.sorted_sizes, vec![18.0, 14.0, 10.0]);
        assert!((profile.heading_sizes.largest - 18.0).abs() < 0.01);
        assert!((profile.heading_sizes.third_largest - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_bold_counting() {
        let spans = vec![
            span("aaa", "Arial-Bold", 12.0),
            span("bbb", "Arial", 12.0),
        ];
        let tree = page_with_spans(spans);
        let profile = StyleProfile::build(&tree, &ProfileConfig::default()).unwrap();
        let stats = &profile.size_stats[&SizeKey::from_size(12.0)];
        assert_eq!(stats.count, 2);
        assert_eq!(stats.bold_count, 1);
    }

    #[test]
    fn test_size_key_roundtrip() {
        let key = SizeKey::from_size(11.98);
        assert!((key.as_f32() - 11.98).abs() < 0.001);
        assert_eq!(SizeKey::from_size(11.984), SizeKey::from_size(11.98));
    }
}
