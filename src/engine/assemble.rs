//! Final outline assembly: ordering and deduplication.

use crate::engine::hierarchy::PlacedHeading;
use crate::model::OutlineEntry;

/// Merge the leveled heading streams into the final outline.
///
/// Entries sort by page, then vertical position, then text, preserving
/// reading order within a page. Duplicates sharing (lowercased text, page)
/// keep their first occurrence.
pub fn assemble(mut placed: Vec<PlacedHeading>) -> Vec<OutlineEntry> {
    placed.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(
                a.y.partial_cmp(&b.y)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then_with(|| a.text.cmp(&b.text))
    });

    let mut seen = std::collections::HashSet::new();
    let mut outline = Vec::with_capacity(placed.len());

    for heading in placed {
        let key = (heading.text.to_lowercase(), heading.page);
        if seen.insert(key) {
            outline.push(OutlineEntry::new(heading.level, heading.text, heading.page));
        }
    }

    outline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutlineLevel;

    fn placed(text: &str, page: usize, y: f32, level: OutlineLevel) -> PlacedHeading {
        PlacedHeading {
            level,
            text: text.to_string(),
            page,
            y,
        }
    }

    #[test]
    fn test_sorted_by_page_then_position() {
        let outline = assemble(vec![
            placed("Later Heading", 3, 100.0, OutlineLevel::H1),
            placed("Lower On Page", 1, 400.0, OutlineLevel::H2),
            placed("Upper On Page", 1, 100.0, OutlineLevel::H1),
        ]);

        let texts: Vec<&str> = outline.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Upper On Page", "Lower On Page", "Later Heading"]);
    }

    #[test]
    fn test_duplicates_removed_case_insensitively() {
        let outline = assemble(vec![
            placed("Overview", 2, 100.0, OutlineLevel::H1),
            placed("OVERVIEW", 2, 300.0, OutlineLevel::H2),
        ]);

        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "Overview");
        assert_eq!(outline[0].level, OutlineLevel::H1);
    }

    #[test]
    fn test_same_text_on_different_pages_kept() {
        let outline = assemble(vec![
            placed("Summary", 2, 100.0, OutlineLevel::H2),
            placed("Summary", 5, 100.0, OutlineLevel::H2),
        ]);

        assert_eq!(outline.len(), 2);
    }
}
