//! Loading and saving the application state through a storage provider
//!
//! State is split into independently keyed JSON documents. Loading never
//! fails: a missing or unreadable document is logged and replaced by its
//! default. Saving is best-effort: failed writes are logged and not retried.

use crate::error::StorageError;
use crate::state::{AppState, Catalog};
use crate::storage::StorageProvider;
use crate::types::{Artisan, ArtisanGroup, BookDocument, Collection, MediaTags};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// One independently stored piece of state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Books,
    Artisans,
    Groups,
    Collections,
    MediaTags,
    ApiKey,
    Preferences,
}

impl Document {
    pub const ALL: [Document; 7] = [
        Document::Books,
        Document::Artisans,
        Document::Groups,
        Document::Collections,
        Document::MediaTags,
        Document::ApiKey,
        Document::Preferences,
    ];

    /// Storage key of the document
    pub fn key(&self) -> &'static str {
        match self {
            Document::Books => "libros.json",
            Document::Artisans => "artesanos.json",
            Document::Groups => "gruposArtesanos.json",
            Document::Collections => "colecciones.json",
            Document::MediaTags => "mediaTags.json",
            Document::ApiKey => "apiKey",
            Document::Preferences => "preferencias.json",
        }
    }
}

/// Outcome of a save: which documents were written and which failed
#[derive(Debug, Default)]
pub struct SaveReport {
    pub written: Vec<Document>,
    pub failed: Vec<(Document, String)>,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Persistence {
    storage: Arc<dyn StorageProvider>,
}

impl Persistence {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self { storage }
    }

    async fn read_json<T: DeserializeOwned>(&self, document: Document) -> Option<T> {
        let bytes = match self.storage.read(document.key()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = document.key(), "failed to read stored document: {}", e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = StorageError::Corrupt {
                    key: document.key().to_string(),
                    reason: e.to_string(),
                };
                tracing::error!("{}; using defaults", err);
                None
            }
        }
    }

    /// Load the full state, falling back to defaults document by document
    pub async fn load(&self) -> AppState {
        let books: Vec<BookDocument> = self.read_json(Document::Books).await.unwrap_or_default();
        let stored_artisans: Option<Vec<Artisan>> = self.read_json(Document::Artisans).await;
        let seeded = stored_artisans.is_none();
        let artisans = stored_artisans.unwrap_or_else(Artisan::defaults);
        let groups: Vec<ArtisanGroup> = self.read_json(Document::Groups).await.unwrap_or_default();
        let collections: Vec<Collection> = self
            .read_json(Document::Collections)
            .await
            .unwrap_or_default();
        let media_tags: MediaTags = self
            .read_json(Document::MediaTags)
            .await
            .unwrap_or_default();

        let mut state = AppState::default();
        state.replace_catalog(Catalog {
            books,
            artisans,
            collections,
            groups,
            media_tags,
        });

        let api_key = match self.storage.read(Document::ApiKey.key()).await {
            Ok(bytes) => bytes.and_then(|b| String::from_utf8(b).ok()),
            Err(e) => {
                tracing::warn!("failed to read API key: {}", e);
                None
            }
        };
        state.restore_api_key(api_key);
        state.restore_preferences(
            self.read_json(Document::Preferences)
                .await
                .unwrap_or_default(),
        );

        state.mark_clean();
        if seeded {
            state.touch(Document::Artisans);
        }
        tracing::debug!(books = state.books().count(), "state loaded");
        state
    }

    fn encode(state: &AppState, document: Document) -> serde_json::Result<Vec<u8>> {
        fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
            serde_json::to_vec_pretty(value)
        }

        match document {
            Document::Books => json(&state.book_documents()),
            Document::Artisans => json(state.artisans()),
            Document::Groups => json(state.groups()),
            Document::Collections => json(state.collections()),
            Document::MediaTags => json(state.media_tags()),
            Document::ApiKey => Ok(state.api_key().unwrap_or_default().as_bytes().to_vec()),
            Document::Preferences => json(state.preferences()),
        }
    }

    /// Write every document changed since the last save
    pub async fn save(&self, state: &mut AppState) -> SaveReport {
        let mut pending: Vec<Document> = state.dirty().iter().copied().collect();
        pending.sort_by_key(|d| Document::ALL.iter().position(|a| a == d));
        self.write(state, &pending).await
    }

    /// Write every document regardless of what changed
    pub async fn save_all(&self, state: &mut AppState) -> SaveReport {
        self.write(state, &Document::ALL).await
    }

    async fn write(&self, state: &mut AppState, documents: &[Document]) -> SaveReport {
        let mut report = SaveReport::default();
        for &document in documents {
            let result = match Self::encode(state, document) {
                Ok(bytes) => self
                    .storage
                    .write(document.key(), bytes)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match result {
                Ok(()) => report.written.push(document),
                Err(e) => {
                    tracing::warn!(key = document.key(), "failed to save document: {}", e);
                    report.failed.push((document, e));
                }
            }
        }
        state.mark_clean();
        report
    }
}
