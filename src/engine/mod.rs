//! The structure inference engine.
//!
//! Dependency order: [`profile`] feeds [`title`] and [`classify`]; accepted
//! candidates flow through [`hierarchy`] into [`assemble`]. Each stage is a
//! pure function of the layout tree and the style profile; nothing persists
//! across documents.

pub mod assemble;
pub mod classify;
pub mod hierarchy;
pub mod patterns;
pub mod profile;
pub mod title;

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::layout::LayoutTree;
use crate::model::DocumentStructure;

pub use classify::{HeadingCandidate, HeadingClassifier};
pub use hierarchy::{HierarchyAssigner, PlacedHeading};
pub use patterns::HeadingPatterns;
pub use profile::{SizeKey, SizeStats, StyleProfile};
pub use title::TitleExtractor;

/// Run the full pipeline over an extracted layout tree.
///
/// Errors are typed: an empty document and a document without text content
/// surface as their own variants so callers can distinguish failure causes.
pub fn extract_structure(tree: &LayoutTree, config: &EngineConfig) -> Result<DocumentStructure> {
    if tree.is_empty() {
        return Err(Error::EmptyDocument);
    }

    let profile =
        StyleProfile::build(tree, &config.profile).ok_or(Error::NoTextContent)?;
    let patterns = HeadingPatterns::new();

    let title = TitleExtractor::new(&profile, &config.title, &patterns)
        .extract(&tree.pages[0], tree.info.title.as_deref());

    let candidates =
        HeadingClassifier::new(&profile, &config.classifier, &patterns).classify(tree);

    let placed = HierarchyAssigner::new(&profile, &config.hierarchy, &patterns)
        .assign(&candidates, &title);

    let outline = assemble::assemble(placed);

    Ok(DocumentStructure::new(title, outline))
}

/// Run the pipeline under the per-document fault-isolation boundary.
///
/// Every failure, including an unexpected panic inside a heuristic stage,
/// degrades to the error-shaped record; this function never fails and never
/// unwinds into the caller.
pub fn extract_structure_lenient(tree: &LayoutTree, config: &EngineConfig) -> DocumentStructure {
    let outcome = catch_unwind(AssertUnwindSafe(|| extract_structure(tree, config)));

    match outcome {
        Ok(Ok(structure)) => structure,
        Ok(Err(err)) => {
            log::warn!("structure extraction degraded: {}", err);
            DocumentStructure::from_error(&err)
        }
        Err(_) => {
            log::error!("structure extraction panicked; emitting error record");
            DocumentStructure::from_error(&Error::Extraction(
                "unexpected internal failure".to_string(),
            ))
        }
    }
}
