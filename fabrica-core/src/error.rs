//! Error types for Fabrica Core

use crate::types::EntityId;
use thiserror::Error;

/// Result type alias using FabricaError
pub type Result<T> = std::result::Result<T, FabricaError>;

/// Top-level error type for all Fabrica operations
#[derive(Debug, Error)]
pub enum FabricaError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Annotation rejected: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// User input that fails a required-field or business rule check.
/// The message is meant to be shown to the user as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("{0}")]
    Rule(String),
}

/// Reasons an annotation cannot be placed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("the selected range is empty")]
    EmptyRange,

    #[error("range {start}..{end} is outside a text of {len} characters")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("the selection overlaps annotation {0}")]
    Overlap(EntityId),

    #[error("this chapter has no base text to annotate")]
    NoBaseText,
}

/// Errors from planning or executing content generation
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("a generation is already in progress")]
    Busy,

    #[error("API error: {0}")]
    Api(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

/// Errors that reject an import document
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read the import file: {0}")]
    Unreadable(String),

    #[error("invalid import file: missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("invalid import file: {0}")]
    Malformed(String),
}

/// Errors while packaging content into a ZIP archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{0}")]
    NothingToPackage(String),

    #[error("zip failure: {0}")]
    Zip(String),
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Corrupt document {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule(message.into())
    }
}
