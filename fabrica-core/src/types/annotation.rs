//! Highlights and notes anchored to a chapter's base text

use super::id::AnnotationId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Highlight,
    Note,
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKind::Highlight => f.write_str("highlight"),
            AnnotationKind::Note => f.write_str("note"),
        }
    }
}

impl FromStr for AnnotationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "highlight" => Ok(AnnotationKind::Highlight),
            "note" => Ok(AnnotationKind::Note),
            other => Err(format!("unknown annotation type `{other}`")),
        }
    }
}

/// An annotation covering the half-open character range `[start, end)`.
///
/// Offsets count Unicode scalar values of the chapter's base text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,

    #[serde(rename = "type")]
    pub kind: AnnotationKind,

    pub start: usize,

    pub end: usize,

    /// Text captured when the annotation was placed
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Annotation {
    /// Whether `[start, end)` shares at least one character with this annotation
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && end > self.start
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
