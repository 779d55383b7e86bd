//! The inferred structure record: a title plus a leveled heading outline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Heading level of an outline entry.
///
/// The engine assigns at most four levels; documents with deeper explicit
/// numbering are clamped to `H4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OutlineLevel {
    H1,
    H2,
    H3,
    H4,
}

impl OutlineLevel {
    /// All levels in rank order, highest first.
    pub const ALL: [OutlineLevel; 4] = [
        OutlineLevel::H1,
        OutlineLevel::H2,
        OutlineLevel::H3,
        OutlineLevel::H4,
    ];

    /// Numeric rank (1 for `H1` .. 4 for `H4`).
    pub fn rank(self) -> u8 {
        match self {
            OutlineLevel::H1 => 1,
            OutlineLevel::H2 => 2,
            OutlineLevel::H3 => 3,
            OutlineLevel::H4 => 4,
        }
    }

    /// The level for a dotted-decimal numbering depth (1 segment -> `H1`,
    /// 4 or more -> `H4`).
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => OutlineLevel::H1,
            2 => OutlineLevel::H2,
            3 => OutlineLevel::H3,
            _ => OutlineLevel::H4,
        }
    }
}

impl std::fmt::Display for OutlineLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutlineLevel::H1 => "H1",
            OutlineLevel::H2 => "H2",
            OutlineLevel::H3 => "H3",
            OutlineLevel::H4 => "H4",
        };
        f.write_str(s)
    }
}

/// A single heading in the final outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: OutlineLevel,

    /// Cleaned heading text
    pub text: String,

    /// Page index the heading was found on (0-based, matching the scan)
    pub page: usize,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: OutlineLevel, text: impl Into<String>, page: usize) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// The engine's output record for one document.
///
/// Error conditions are reported in-band: the title carries an `"Error:"`
/// prefix and the outline is empty. [`DocumentStructure::is_error`] checks
/// for that shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// Extracted document title
    pub title: String,

    /// Leveled heading outline in reading order
    pub outline: Vec<OutlineEntry>,
}

impl DocumentStructure {
    /// Create a structure record.
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// Create the degraded error-shaped record for a failed document.
    pub fn from_error(err: &Error) -> Self {
        Self {
            title: err.as_record_title(),
            outline: Vec::new(),
        }
    }

    /// Whether this record reports a per-document failure.
    pub fn is_error(&self) -> bool {
        self.title.starts_with("Error:")
    }

    /// Serialize this record to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(self, format)
    }
}

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a structure record to JSON.
pub fn to_json(structure: &DocumentStructure, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(structure),
        JsonFormat::Compact => serde_json::to_string(structure),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
