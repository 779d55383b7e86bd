//! Page-layout input model and the PDF extraction backend.
//!
//! The structure engine consumes only the data model in [`tree`]; any
//! producer that can fill a [`LayoutTree`] (the bundled [`pdf`] backend, a
//! test fixture, another extraction service) can drive it.

pub mod pdf;
mod tree;

pub use tree::{BBox, DocumentInfo, LayoutTree, PageLayout, Span, TextBlock, TextLine};
