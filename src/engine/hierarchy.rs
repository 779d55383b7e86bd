//! Level assignment for accepted heading candidates.
//!
//! Chapter/appendix headings are top-level by convention and numbered
//! headings carry their own depth; everything else is leveled by clustering
//! font sizes and ranking the clusters.

use std::collections::BTreeMap;

use crate::config::HierarchyConfig;
use crate::engine::classify::HeadingCandidate;
use crate::engine::patterns::{HeadingPatterns, NumberingKind, OUTLINE_DROP_LABELS};
use crate::engine::profile::{SizeKey, StyleProfile};
use crate::model::OutlineLevel;

/// A leveled heading, still carrying its page position for final ordering.
#[derive(Debug, Clone)]
pub struct PlacedHeading {
    /// Assigned level
    pub level: OutlineLevel,

    /// Cleaned heading text
    pub text: String,

    /// Page index (0-based)
    pub page: usize,

    /// Top edge of the heading line on its page
    pub y: f32,
}

/// Assigns H1..H4 levels to heading candidates.
pub struct HierarchyAssigner<'a> {
    profile: &'a StyleProfile,
    config: &'a HierarchyConfig,
    patterns: &'a HeadingPatterns,
}

impl<'a> HierarchyAssigner<'a> {
    /// Create an assigner over a profiled document.
    pub fn new(
        profile: &'a StyleProfile,
        config: &'a HierarchyConfig,
        patterns: &'a HeadingPatterns,
    ) -> Self {
        Self {
            profile,
            config,
            patterns,
        }
    }

    /// Level every candidate, partitioned into the special, numbered, and
    /// size-clustered streams. Headings equal to the document title and
    /// table-of-contents labels are dropped.
    pub fn assign(&self, candidates: &[HeadingCandidate], title: &str) -> Vec<PlacedHeading> {
        let mut placed = Vec::new();

        // Chapters and appendices are top-level by convention.
        let mut special: Vec<&HeadingCandidate> = candidates
            .iter()
            .filter(|h| h.is_chapter || h.is_appendix)
            .collect();
        sort_by_position(&mut special);
        for h in special {
            self.place(&mut placed, OutlineLevel::H1, h, title);
        }

        // Numbered headings carry their depth in the numbering itself.
        let mut numbered: Vec<&HeadingCandidate> = candidates
            .iter()
            .filter(|h| h.is_numbered && !h.is_chapter && !h.is_appendix)
            .collect();
        sort_by_position(&mut numbered);
        for h in numbered {
            let level = match self.patterns.numbering_kind(&h.text) {
                Some(NumberingKind::Decimal(depth)) => OutlineLevel::from_depth(depth),
                Some(NumberingKind::Roman) => OutlineLevel::H1,
                Some(NumberingKind::Letter) => OutlineLevel::H2,
                None => OutlineLevel::H1,
            };
            self.place(&mut placed, level, h, title);
        }

        // Everything else is leveled through size clusters.
        let mut unnumbered: Vec<&HeadingCandidate> = candidates
            .iter()
            .filter(|h| !h.is_numbered && !h.is_chapter && !h.is_appendix)
            .collect();
        sort_by_position(&mut unnumbered);

        let size_level_map = self.level_size_clusters(&unnumbered);
        for h in unnumbered {
            if let Some(level) = self.lookup_level(&size_level_map, h.size) {
                self.place(&mut placed, level, h, title);
            }
        }

        placed
    }

    /// Clean a heading's text and append it unless it is degenerate, equals
    /// the title, or is a table-of-contents label.
    fn place(
        &self,
        placed: &mut Vec<PlacedHeading>,
        level: OutlineLevel,
        candidate: &HeadingCandidate,
        title: &str,
    ) {
        let text = self.patterns.strip_toc_artifacts(&candidate.text);
        if text.chars().count() <= self.config.min_text_len {
            return;
        }

        let text_lower = text.to_lowercase();
        if text_lower == title.to_lowercase() {
            return;
        }
        if OUTLINE_DROP_LABELS.contains(&text_lower.as_str()) {
            return;
        }

        placed.push(PlacedHeading {
            level,
            text,
            page: candidate.page,
            y: candidate.y,
        });
    }

    /// Cluster unnumbered headings by size and map each cluster to a level.
    ///
    /// Clusters are ranked by a composite of size ratio, formatting
    /// prevalence, and average score, then walked greedily: the first unused
    /// level whose gates pass wins, and a cluster failing every gate still
    /// takes the next unused level. Sizes near an assigned cluster inherit
    /// its level.
    fn level_size_clusters(
        &self,
        headings: &[&HeadingCandidate],
    ) -> BTreeMap<SizeKey, OutlineLevel> {
        let mut size_level_map = BTreeMap::new();
        if headings.is_empty() {
            return size_level_map;
        }

        // Distinct rounded sizes, largest first.
        let mut unique_sizes: Vec<SizeKey> =
            headings.iter().map(|h| SizeKey::from_size(h.size)).collect();
        unique_sizes.sort();
        unique_sizes.dedup();
        unique_sizes.reverse();

        let clusters: Vec<SizeCluster> = unique_sizes
            .iter()
            .map(|&key| self.analyze_cluster(key, headings))
            .collect();

        // Rank by composite, size breaking ties for determinism.
        let mut ranked: Vec<&SizeCluster> = clusters.iter().collect();
        ranked.sort_by(|a, b| {
            b.composite(self.config)
                .partial_cmp(&a.composite(self.config))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.key.cmp(&a.key))
        });

        let mut assigned = [false; 4];
        for cluster in ranked {
            let mut level = None;
            for (i, gate) in self.config.gates.iter().enumerate() {
                if !assigned[i]
                    && cluster.size_ratio >= gate.min_size_ratio
                    && cluster.avg_score >= gate.min_score
                {
                    level = Some(OutlineLevel::ALL[i]);
                    assigned[i] = true;
                    break;
                }
            }

            // Guaranteed fallback: a cluster is never dropped while a level
            // remains unused.
            if level.is_none() {
                for (i, used) in assigned.iter_mut().enumerate() {
                    if !*used {
                        level = Some(OutlineLevel::ALL[i]);
                        *used = true;
                        break;
                    }
                }
            }

            if let Some(level) = level {
                log::debug!(
                    "size cluster {:.2}pt (ratio {:.2}, avg score {:.1}) -> {}",
                    cluster.key.as_f32(),
                    cluster.size_ratio,
                    cluster.avg_score,
                    level
                );
                for &key in &unique_sizes {
                    if (key.as_f32() - cluster.key.as_f32()).abs() < self.config.inherit_tolerance {
                        size_level_map.insert(key, level);
                    }
                }
            }
        }

        size_level_map
    }

    /// Statistics for the cluster of headings near one rounded size.
    fn analyze_cluster(&self, key: SizeKey, headings: &[&HeadingCandidate]) -> SizeCluster {
        let size = key.as_f32();
        let members: Vec<&&HeadingCandidate> = headings
            .iter()
            .filter(|h| (h.size - size).abs() < self.config.cluster_tolerance)
            .collect();
        let count = members.len().max(1) as f32;

        SizeCluster {
            key,
            avg_score: members.iter().map(|h| h.score as f32).sum::<f32>() / count,
            bold_ratio: members.iter().filter(|h| h.is_bold).count() as f32 / count,
            caps_ratio: members.iter().filter(|h| h.is_all_caps).count() as f32 / count,
            size_ratio: self.profile.size_ratio(size),
        }
    }

    /// Level for a heading size: the closest mapped cluster within the
    /// mapping tolerance.
    fn lookup_level(
        &self,
        size_level_map: &BTreeMap<SizeKey, OutlineLevel>,
        size: f32,
    ) -> Option<OutlineLevel> {
        let (closest, level) = size_level_map
            .iter()
            .min_by(|(a, _), (b, _)| {
                let da = (a.as_f32() - size).abs();
                let db = (b.as_f32() - size).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(k, v)| (*k, *v))?;

        if (closest.as_f32() - size).abs() < self.config.map_tolerance {
            Some(level)
        } else {
            None
        }
    }
}

/// Per-cluster aggregates feeding the composite ranking.
#[derive(Debug, Clone)]
struct SizeCluster {
    key: SizeKey,
    avg_score: f32,
    bold_ratio: f32,
    caps_ratio: f32,
    size_ratio: f32,
}

impl SizeCluster {
    fn composite(&self, config: &HierarchyConfig) -> f32 {
        self.size_ratio * config.weight_size
            + (self.bold_ratio + self.caps_ratio) * config.weight_format
            + (self.avg_score / config.score_norm) * config.weight_score
    }
}

fn sort_by_position(headings: &mut [&HeadingCandidate]) {
    headings.sort_by(|a, b| {
        a.page.cmp(&b.page).then(
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;
    use crate::layout::{BBox, LayoutTree, PageLayout, Span, TextBlock, TextLine};

    fn candidate(text: &str, size: f32, score: i32, page: usize, y: f32) -> HeadingCandidate {
        let patterns = HeadingPatterns::new();
        let lower = text.to_lowercase();
        HeadingCandidate {
            text: text.to_string(),
            size,
            font: "Helvetica".to_string(),
            page,
            y,
            score,
            is_numbered: patterns.is_numbered(text),
            is_appendix: patterns.is_appendix(&lower),
            is_chapter: patterns.is_chapter(&lower),
            is_section: patterns.is_section(&lower),
            is_bold: false,
            is_all_caps: false,
            size_ratio: size / 10.0,
        }
    }

    fn profile_with_body_10() -> StyleProfile {
        let body = "ordinary paragraph text that anchors the document body size firmly";
        let mut tree = LayoutTree::new();
        let mut page = PageLayout::new(0, 612.0, 792.0);
        for y in [100.0, 120.0] {
            page.add_block(TextBlock::from_lines(vec![TextLine::from_spans(vec![
                Span::new(body, "Helvetica", 10.0, BBox::new(72.0, y, 400.0, y + 10.0), 0),
            ])]));
        }
        tree.add_page(page);
        StyleProfile::build(&tree, &ProfileConfig::default()).unwrap()
    }

    fn assign(candidates: &[HeadingCandidate], title: &str) -> Vec<PlacedHeading> {
        let profile = profile_with_body_10();
        let patterns = HeadingPatterns::new();
        HierarchyAssigner::new(&profile, &HierarchyConfig::default(), &patterns)
            .assign(candidates, title)
    }

    #[test]
    fn test_numbering_depth_levels_independent_of_size() {
        let candidates = vec![
            candidate("2. Scope", 10.0, 12, 1, 100.0),
            candidate("2.3 Methods", 10.0, 12, 1, 150.0),
            candidate("2.3.1 Sampling", 10.0, 12, 1, 200.0),
            candidate("2.3.1.4 Outliers", 10.0, 12, 1, 250.0),
        ];
        let placed = assign(&candidates, "Title");
        let levels: Vec<OutlineLevel> = placed.iter().map(|p| p.level).collect();
        assert_eq!(
            levels,
            vec![
                OutlineLevel::H1,
                OutlineLevel::H2,
                OutlineLevel::H3,
                OutlineLevel::H4
            ]
        );
    }

    #[test]
    fn test_roman_and_letter_numbering() {
        let candidates = vec![
            candidate("IV. Scope of Work", 10.0, 12, 1, 100.0),
            candidate("A. Background Notes", 10.0, 12, 1, 150.0),
        ];
        let placed = assign(&candidates, "Title");
        assert_eq!(placed[0].level, OutlineLevel::H1);
        assert_eq!(placed[1].level, OutlineLevel::H2);
    }

    #[test]
    fn test_chapter_and_appendix_are_h1() {
        let candidates = vec![
            candidate("Chapter 4 Results", 12.0, 14, 2, 100.0),
            candidate("Appendix B Data Tables", 12.0, 14, 9, 100.0),
        ];
        let placed = assign(&candidates, "Title");
        assert!(placed.iter().all(|p| p.level == OutlineLevel::H1));
    }

    #[test]
    fn test_size_clusters_rank_to_levels() {
        // 18pt (ratio 1.8) clears the H1 gate, 15pt (1.5) clears H2,
        // 12pt (1.2) clears H3.
        let candidates = vec![
            candidate("Major Part Heading", 18.0, 14, 1, 100.0),
            candidate("Mid Level Heading", 15.0, 11, 1, 200.0),
            candidate("Minor Level Heading", 12.0, 10, 1, 300.0),
        ];
        let placed = assign(&candidates, "Title");
        assert_eq!(placed.len(), 3);
        assert_eq!(placed[0].level, OutlineLevel::H1);
        assert_eq!(placed[1].level, OutlineLevel::H2);
        assert_eq!(placed[2].level, OutlineLevel::H3);
    }

    #[test]
    fn test_weak_cluster_gets_fallback_level() {
        // Ratio 1.05 with a low score fails every gate but still receives
        // the first unused level.
        let candidates = vec![candidate("Barely Larger Heading", 10.5, 4, 1, 100.0)];
        let placed = assign(&candidates, "Title");
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].level, OutlineLevel::H1);
    }

    #[test]
    fn test_title_match_dropped() {
        let candidates = vec![
            candidate("Annual Report", 16.0, 12, 1, 100.0),
            candidate("Other Heading", 16.0, 12, 1, 200.0),
        ];
        let placed = assign(&candidates, "annual report");
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].text, "Other Heading");
    }

    #[test]
    fn test_toc_labels_dropped() {
        let candidates = vec![candidate("Table of Contents", 16.0, 12, 1, 100.0)];
        // The classifier already skips this exact string, but the assigner
        // guards independently.
        assert!(assign(&candidates, "Title").is_empty());
    }

    #[test]
    fn test_toc_leader_artifacts_stripped() {
        let candidates = vec![candidate("Introduction ...... 7", 16.0, 12, 1, 100.0)];
        let placed = assign(&candidates, "Title");
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].text, "Introduction");
    }

    #[test]
    fn test_nearby_sizes_inherit_cluster_level() {
        // 16.0 and 16.4 round to different keys but sit within the inherit
        // tolerance, so both map to the same level.
        let candidates = vec![
            candidate("First Major Heading", 16.0, 12, 1, 100.0),
            candidate("Second Major Heading", 16.4, 12, 1, 200.0),
        ];
        let placed = assign(&candidates, "Title");
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].level, placed[1].level);
    }
}
