//! # docstruct
//!
//! Infers a document's semantic structure — a title and a leveled heading
//! outline (H1–H4 with page numbers) — from the styled text layout of a
//! paginated document.
//!
//! All thresholds are derived from the document's own typography: a single
//! profiling pass finds the dominant body size and the largest display
//! sizes, and the title/heading heuristics score candidate lines against
//! that profile. The engine is stateless and single-document-scoped.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docstruct::extract_file;
//!
//! let structure = extract_file("document.pdf");
//! println!("{}", structure.title);
//! for entry in &structure.outline {
//!     println!("{} {} (p. {})", entry.level, entry.text, entry.page);
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Style profiling**: frequency table over every span, body size/font,
//!   top three size tiers
//! - **Title extraction**: scored candidates from the first page's top half
//! - **Heading classification**: filtered, scored candidates from the
//!   remaining pages
//! - **Hierarchy assignment**: explicit numbering depth, chapter/appendix
//!   conventions, and size clustering
//! - **Outline assembly**: reading-order sort and deduplication
//!
//! Failures never abort a document: the lenient boundary degrades every
//! error to a record whose title carries an `"Error:"` prefix and whose
//! outline is empty.

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod model;

// Re-export commonly used types
pub use config::{ClassifierConfig, EngineConfig, HierarchyConfig, ProfileConfig, TitleConfig};
pub use engine::{extract_structure, extract_structure_lenient, StyleProfile};
pub use error::{Error, Result};
pub use layout::{BBox, DocumentInfo, LayoutTree, PageLayout, Span, TextBlock, TextLine};
pub use model::{to_json, DocumentStructure, JsonFormat, OutlineEntry, OutlineLevel};

use std::path::Path;

/// Extract the structure of a PDF file.
///
/// Runs under the per-document fault boundary: open failures, empty
/// documents, and extraction failures all come back as error-shaped records
/// rather than errors.
///
/// # Example
///
/// ```no_run
/// let structure = docstruct::extract_file("report.pdf");
/// assert!(!structure.is_error() || structure.outline.is_empty());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> DocumentStructure {
    extract_file_with_config(path, &EngineConfig::default())
}

/// Extract the structure of a PDF file with a custom configuration.
pub fn extract_file_with_config<P: AsRef<Path>>(
    path: P,
    config: &EngineConfig,
) -> DocumentStructure {
    match layout::pdf::open(path) {
        Ok(tree) => extract_structure_lenient(&tree, config),
        Err(err) => {
            log::warn!("open failed: {}", err);
            DocumentStructure::from_error(&err)
        }
    }
}

/// Extract the structure of in-memory PDF bytes.
pub fn extract_bytes(data: &[u8]) -> DocumentStructure {
    extract_bytes_with_config(data, &EngineConfig::default())
}

/// Extract the structure of in-memory PDF bytes with a custom configuration.
pub fn extract_bytes_with_config(data: &[u8], config: &EngineConfig) -> DocumentStructure {
    match layout::pdf::from_bytes(data) {
        Ok(tree) => extract_structure_lenient(&tree, config),
        Err(err) => {
            log::warn!("open failed: {}", err);
            DocumentStructure::from_error(&err)
        }
    }
}

/// Extract structures for a batch of files on a rayon worker pool.
///
/// Documents are independent and share no state, so the batch is
/// embarrassingly parallel. Results come back in input order; a failed
/// document occupies its slot with an error-shaped record.
pub fn extract_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<DocumentStructure> {
    extract_files_with_config(paths, &EngineConfig::default())
}

/// Extract structures for a batch of files with a custom configuration.
pub fn extract_files_with_config<P: AsRef<Path> + Sync>(
    paths: &[P],
    config: &EngineConfig,
) -> Vec<DocumentStructure> {
    use rayon::prelude::*;

    paths
        .par_iter()
        .map(|path| extract_file_with_config(path, config))
        .collect()
}

/// Extract the structure of a PDF file, surfacing typed errors.
///
/// Unlike [`extract_file`], failure causes are inspectable: the caller sees
/// the [`Error`] variant instead of an in-band error record.
pub fn try_extract_file<P: AsRef<Path>>(path: P) -> Result<DocumentStructure> {
    let tree = layout::pdf::open(path)?;
    extract_structure(&tree, &EngineConfig::default())
}

/// Extract the structure of in-memory PDF bytes, surfacing typed errors.
pub fn try_extract_bytes(data: &[u8]) -> Result<DocumentStructure> {
    let tree = layout::pdf::from_bytes(data)?;
    extract_structure(&tree, &EngineConfig::default())
}

/// Builder for structure extraction with a custom configuration.
///
/// # Example
///
/// ```no_run
/// use docstruct::{ClassifierConfig, Extractor};
///
/// let structure = Extractor::new()
///     .with_classifier(ClassifierConfig {
///         base_threshold: 9,
///         ..Default::default()
///     })
///     .extract_file("document.pdf");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: EngineConfig,
}

impl Extractor {
    /// Create an extractor with the calibrated default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the profiling table.
    pub fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.config.profile = profile;
        self
    }

    /// Replace the title table.
    pub fn with_title(mut self, title: TitleConfig) -> Self {
        self.config.title = title;
        self
    }

    /// Replace the classifier table.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Replace the hierarchy table.
    pub fn with_hierarchy(mut self, hierarchy: HierarchyConfig) -> Self {
        self.config.hierarchy = hierarchy;
        self
    }

    /// The effective configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract from a file under the fault boundary.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> DocumentStructure {
        extract_file_with_config(path, &self.config)
    }

    /// Extract from in-memory bytes under the fault boundary.
    pub fn extract_bytes(&self, data: &[u8]) -> DocumentStructure {
        extract_bytes_with_config(data, &self.config)
    }

    /// Extract from an already built layout tree under the fault boundary.
    pub fn extract_tree(&self, tree: &LayoutTree) -> DocumentStructure {
        extract_structure_lenient(tree, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_builder() {
        let extractor = Extractor::new().with_classifier(ClassifierConfig {
            base_threshold: 9,
            ..Default::default()
        });
        assert_eq!(extractor.config().classifier.base_threshold, 9);
    }

    #[test]
    fn test_invalid_bytes_degrade_to_error_record() {
        let record = extract_bytes(b"not a pdf at all");
        assert!(record.is_error());
        assert!(record.title.starts_with("Error: Failed to open or read PDF:"));
        assert!(record.outline.is_empty());
    }

    #[test]
    fn test_missing_file_degrades_to_error_record() {
        let record = extract_file("definitely/not/a/real/file.pdf");
        assert!(record.is_error());
        assert!(record.outline.is_empty());
    }

    #[test]
    fn test_try_extract_surfaces_typed_errors() {
        let err = try_extract_bytes(b"junk").unwrap_err();
        assert!(matches!(err, Error::Open(_)));
    }

    #[test]
    fn test_batch_preserves_input_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.pdf");
        std::fs::write(&bad, b"definitely not a pdf").unwrap();
        let missing = dir.path().join("missing.pdf");

        let records = extract_files(&[bad, missing]);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_error()));
        assert!(records.iter().all(|r| r.outline.is_empty()));
    }
}
