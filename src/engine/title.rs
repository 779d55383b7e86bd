//! Title extraction from the first page.

use crate::config::TitleConfig;
use crate::engine::patterns::{HeadingPatterns, TITLE_SKIP_SUBSTRINGS};
use crate::engine::profile::StyleProfile;
use crate::layout::PageLayout;

/// A scored candidate line, consumed within the extractor.
#[derive(Debug, Clone)]
struct TitleCandidate {
    text: String,
    score: i32,
    y: f32,
    size: f32,
}

/// Extracts the document title from the first page's top half.
pub struct TitleExtractor<'a> {
    profile: &'a StyleProfile,
    config: &'a TitleConfig,
    patterns: &'a HeadingPatterns,
}

impl<'a> TitleExtractor<'a> {
    /// Create a title extractor over a profiled document.
    pub fn new(
        profile: &'a StyleProfile,
        config: &'a TitleConfig,
        patterns: &'a HeadingPatterns,
    ) -> Self {
        Self {
            profile,
            config,
            patterns,
        }
    }

    /// Extract the title, falling back to the document metadata title and
    /// finally to "Untitled". Never fails.
    pub fn extract(&self, first_page: &PageLayout, metadata_title: Option<&str>) -> String {
        let fallback = metadata_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled")
            .to_string();

        let mut lines = self.top_half_lines(first_page);
        if lines.is_empty() {
            return fallback;
        }
        lines.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal));

        let max_size = lines.iter().map(|l| l.size).fold(0.0_f32, f32::max);
        let candidates = self.score_candidates(&lines, first_page.height);

        if candidates.is_empty() {
            // No line clears the candidate gate; take the topmost line at the
            // page's maximum size.
            if let Some(best) = lines.iter().find(|l| (l.size - max_size).abs() < 0.01) {
                return best.text.clone();
            }
            return fallback;
        }

        let title = self.merge_candidates(candidates);
        if title.is_empty() {
            fallback
        } else {
            title
        }
    }

    /// Cleaned lines whose top edge lies in the page's top half.
    fn top_half_lines(&self, page: &PageLayout) -> Vec<TitleLine> {
        let top_limit = page.height * self.config.top_region;
        let mut lines = Vec::new();

        for line in page.lines() {
            if line.bbox.y0 > top_limit {
                continue;
            }
            let text = self.patterns.clean_text(&line.text());
            if text.chars().count() < 3 {
                continue;
            }
            let Some(span) = line.first_span() else {
                continue;
            };
            lines.push(TitleLine {
                text,
                y: line.bbox.y0,
                size: span.size,
                font: span.font.clone(),
            });
        }

        lines
    }

    /// Score every line that qualifies as a title candidate.
    fn score_candidates(&self, lines: &[TitleLine], page_height: f32) -> Vec<TitleCandidate> {
        let body_size = self.profile.body_size;
        let mut candidates = Vec::new();

        for line in lines {
            if line.size < body_size * self.config.min_size_ratio {
                continue;
            }

            let text_lower = line.text.to_lowercase();
            if TITLE_SKIP_SUBSTRINGS.iter().any(|s| text_lower.contains(s)) {
                continue;
            }

            let word_count = line.text.split_whitespace().count();
            if word_count > self.config.max_words {
                continue;
            }

            if line.text.trim_end().ends_with('.') {
                continue;
            }

            let mut score = 0;

            let size_ratio = line.size / body_size;
            for (tier, bonus) in self.config.size_tiers {
                if size_ratio >= tier {
                    score += bonus;
                    break;
                }
            }

            let relative_y = line.y / page_height;
            for (tier, bonus) in self.config.position_tiers {
                if relative_y < tier {
                    score += bonus;
                    break;
                }
            }

            let font_lower = line.font.to_lowercase();
            if ["bold", "heavy", "black"]
                .iter()
                .any(|kw| font_lower.contains(kw))
            {
                score += self.config.weight_bonus;
            }

            let (lo, hi) = self.config.length_range;
            if (lo..=hi).contains(&word_count) {
                score += self.config.length_bonus;
            }

            candidates.push(TitleCandidate {
                text: line.text.clone(),
                score,
                y: line.y,
                size: line.size,
            });
        }

        candidates
    }

    /// Seed the title with the best candidate and append adjacent
    /// continuation lines, stopping at the first line that no longer fits.
    fn merge_candidates(&self, mut candidates: Vec<TitleCandidate>) -> String {
        candidates.sort_by(|a, b| {
            b.score.cmp(&a.score).then(
                a.y.partial_cmp(&b.y)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
        });

        let seed = &candidates[0];
        let seed_size = seed.size;
        let mut running_y = seed.y;
        let mut parts = vec![seed.text.clone()];

        for candidate in &candidates[1..] {
            let y_diff = (candidate.y - running_y).abs();
            let size_diff = (candidate.size - seed_size).abs();

            let fits = y_diff < seed_size * self.config.merge_gap_factor
                && size_diff < self.config.merge_max_size_diff
                && candidate.score >= self.config.merge_min_score;
            if !fits {
                break;
            }

            let combined = format!("{} {}", parts.join(" "), candidate.text);
            if is_repetitive(&combined, self.config.max_word_repeats) {
                break;
            }

            parts.push(candidate.text.clone());
            running_y = candidate.y;
        }

        let merged = collapse_repeated_words(&parts.join(" "));
        self.patterns.clean_text(&merged)
    }
}

/// A cleaned first-page line under consideration.
#[derive(Debug, Clone)]
struct TitleLine {
    text: String,
    y: f32,
    size: f32,
    font: String,
}

/// Whether any substantial word repeats more than `max_repeats` times.
fn is_repetitive(text: &str, max_repeats: usize) -> bool {
    let words: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if words.len() < 3 {
        return false;
    }

    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for word in &words {
        if word.chars().count() > 2 {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }
    }

    counts.values().any(|&c| c > max_repeats)
}

/// Collapse immediately repeated words and simple two-word repeat patterns
/// ("Annual Report Annual Report" -> "Annual Report").
fn collapse_repeated_words(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    let mut cleaned: Vec<&str> = Vec::with_capacity(words.len());

    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();

        if cleaned
            .last()
            .map(|w| w.to_lowercase() == lower)
            .unwrap_or(false)
        {
            continue;
        }
        if i > 0
            && cleaned.len() > 1
            && cleaned[cleaned.len() - 2].to_lowercase() == lower
            && cleaned[cleaned.len() - 1].to_lowercase() == words[i - 1].to_lowercase()
        {
            continue;
        }

        cleaned.push(word);
    }

    cleaned.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;
    use crate::layout::{BBox, LayoutTree, PageLayout, Span, TextBlock, TextLine};

    fn line(text: &str, font: &str, size: f32, y: f32) -> TextLine {
        TextLine::from_spans(vec![Span::new(
            text,
            font,
            size,
            BBox::new(72.0, y, 72.0 + text.len() as f32 * size * 0.5, y + size),
            0,
        )])
    }

    fn page_of(lines: Vec<TextLine>) -> PageLayout {
        let mut page = PageLayout::new(0, 612.0, 792.0);
        for l in lines {
            page.add_block(TextBlock::from_lines(vec![l]));
        }
        page
    }

    fn profile_for(page: &PageLayout) -> StyleProfile {
        let mut tree = LayoutTree::new();
        tree.add_page(page.clone());
        StyleProfile::build(&tree, &ProfileConfig::default()).unwrap()
    }

    fn body_filler(y: f32) -> TextLine {
        line(
            "ordinary paragraph text that anchors the document body size firmly",
            "Helvetica",
            10.0,
            y,
        )
    }

    #[test]
    fn test_large_bold_top_line_wins() {
        let page = page_of(vec![
            line("Quarterly Report", "Helvetica-Bold", 24.0, 60.0),
            body_filler(300.0),
            body_filler(320.0),
        ]);
        let profile = profile_for(&page);
        let patterns = HeadingPatterns::new();
        let config = TitleConfig::default();
        let extractor = TitleExtractor::new(&profile, &config, &patterns);

        assert_eq!(extractor.extract(&page, None), "Quarterly Report");
    }

    #[test]
    fn test_metadata_fallback_when_no_lines() {
        let page = page_of(vec![]);
        let other = page_of(vec![body_filler(300.0)]);
        let profile = profile_for(&other);
        let patterns = HeadingPatterns::new();
        let config = TitleConfig::default();
        let extractor = TitleExtractor::new(&profile, &config, &patterns);

        assert_eq!(extractor.extract(&page, Some("From Metadata")), "From Metadata");
        assert_eq!(extractor.extract(&page, None), "Untitled");
    }

    #[test]
    fn test_boilerplate_lines_rejected() {
        // "Draft copy" is large and on top but contains a skip substring;
        // max-size fallback still returns it as the topmost largest line.
        let page = page_of(vec![
            line("Draft copy", "Helvetica-Bold", 20.0, 50.0),
            body_filler(300.0),
            body_filler(320.0),
        ]);
        let profile = profile_for(&page);
        let patterns = HeadingPatterns::new();
        let config = TitleConfig::default();
        let extractor = TitleExtractor::new(&profile, &config, &patterns);

        // No scored candidate survives, so the fallback picks the topmost
        // line at the page's maximum size.
        assert_eq!(extractor.extract(&page, None), "Draft copy");
    }

    #[test]
    fn test_multi_line_title_merge() {
        let page = page_of(vec![
            line("Annual Review of", "Helvetica-Bold", 22.0, 60.0),
            line("Infrastructure Spending", "Helvetica-Bold", 22.0, 90.0),
            body_filler(400.0),
            body_filler(420.0),
        ]);
        let profile = profile_for(&page);
        let patterns = HeadingPatterns::new();
        let config = TitleConfig::default();
        let extractor = TitleExtractor::new(&profile, &config, &patterns);

        assert_eq!(
            extractor.extract(&page, None),
            "Annual Review of Infrastructure Spending"
        );
    }

    #[test]
    fn test_distant_line_not_merged() {
        let page = page_of(vec![
            line("Main Title Here", "Helvetica-Bold", 22.0, 40.0),
            line("Unrelated Banner Text", "Helvetica-Bold", 22.0, 360.0),
            body_filler(500.0),
            body_filler(520.0),
        ]);
        let profile = profile_for(&page);
        let patterns = HeadingPatterns::new();
        let config = TitleConfig::default();
        let extractor = TitleExtractor::new(&profile, &config, &patterns);

        assert_eq!(extractor.extract(&page, None), "Main Title Here");
    }

    #[test]
    fn test_is_repetitive() {
        assert!(is_repetitive("alpha alpha alpha alpha report", 3));
        assert!(!is_repetitive("alpha beta gamma delta", 3));
        // Words of two characters or fewer never count
        assert!(!is_repetitive("of of of of of report title", 3));
    }

    #[test]
    fn test_collapse_repeated_words() {
        assert_eq!(collapse_repeated_words("Annual Annual Report"), "Annual Report");
        assert_eq!(
            collapse_repeated_words("Annual Report Annual Report"),
            "Annual Report"
        );
        assert_eq!(collapse_repeated_words("Clean Title"), "Clean Title");
    }
}
