//! Fabrica Core Library
//!
//! Core types and logic for Fabrica, a workshop for authoring books chapter
//! by chapter and deriving variants of each chapter's text through
//! generative "artisans". The whole application state lives in
//! [`AppState`]; [`Persistence`] loads and saves it through a
//! [`StorageProvider`].

pub mod annotation;
pub mod archive;
pub mod config;
pub mod error;
pub mod filter;
pub mod generation;
pub mod persistence;
pub mod preferences;
pub mod reader;
pub mod state;
pub mod storage;
pub mod transfer;
pub mod types;

pub use config::Config;
pub use error::{
    AnnotationError, ArchiveError, FabricaError, GenerationError, ImportError, Result,
    StorageError, ValidationError,
};
pub use generation::{GenerationPlan, GenerationRequest, Generator, TextGenerator};
pub use persistence::{Document, Persistence};
pub use state::AppState;
pub use storage::{LocalStorage, MemoryStorage, StorageProvider};
pub use types::{
    Annotation, AnnotationKind, Artisan, ArtisanGroup, ArtisanId, Book, Chapter, Collection,
    ContentItem, EntityId, MediaItem, MediaKind, Producer, Translation,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_default_artisans() {
        let state = AppState::new();
        assert_eq!(state.artisans().len(), 4);
        assert!(state.artisan(ArtisanId::Multicultural).is_some());
        assert!(state.dirty().is_empty());
    }
}
