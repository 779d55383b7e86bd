//! Externally visible output model.

mod outline;

pub use outline::{to_json, DocumentStructure, JsonFormat, OutlineEntry, OutlineLevel};
