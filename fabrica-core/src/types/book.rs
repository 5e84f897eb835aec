//! Books and their serialized (nested) form

use super::{BookId, Chapter, ChapterId, CollectionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A book as held in the normalized state.
///
/// Chapters live in the state's chapter map; the book only keeps their order.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub cover_url: String,
    pub created_at: DateTime<Utc>,
    pub collection_id: Option<CollectionId>,
    pub chapter_ids: Vec<ChapterId>,
}

impl Book {
    pub fn new(id: BookId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            cover_url: String::new(),
            created_at: Utc::now(),
            collection_id: None,
            chapter_ids: Vec::new(),
        }
    }
}

/// A book with its chapters inlined, as stored and exported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookDocument {
    pub id: BookId,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "coverUrl", default)]
    pub cover_url: String,

    #[serde(rename = "fechaCreacion", default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "collectionId", default)]
    pub collection_id: Option<CollectionId>,

    #[serde(rename = "capitulos", default)]
    pub chapters: Vec<Chapter>,
}

impl BookDocument {
    /// Split into the normalized book and its chapters
    pub fn into_parts(self) -> (Book, Vec<Chapter>) {
        let book = Book {
            id: self.id,
            title: self.title,
            cover_url: self.cover_url,
            created_at: self.created_at,
            collection_id: self.collection_id,
            chapter_ids: self.chapters.iter().map(|c| c.id).collect(),
        };
        (book, self.chapters)
    }

    pub fn from_parts(book: &Book, chapters: Vec<Chapter>) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            cover_url: book.cover_url.clone(),
            created_at: book.created_at,
            collection_id: book.collection_id,
            chapters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityId;

    #[test]
    fn test_document_round_trip_through_parts() {
        let json = r#"{
            "id": 10,
            "titulo": "Mi libro",
            "coverUrl": "",
            "fechaCreacion": "2024-03-01T10:00:00Z",
            "collectionId": "7",
            "capitulos": [{"id": 11, "titulo": "Intro"}, {"id": 12, "titulo": "Dos"}]
        }"#;
        let doc: BookDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.collection_id, Some(EntityId::new(7)));

        let (book, chapters) = doc.clone().into_parts();
        assert_eq!(book.chapter_ids, vec![EntityId::new(11), EntityId::new(12)]);
        assert_eq!(BookDocument::from_parts(&book, chapters), doc);
    }

    #[test]
    fn test_null_collection_is_unassigned() {
        let doc: BookDocument =
            serde_json::from_str(r#"{"id": 1, "titulo": "T", "collectionId": null}"#).unwrap();
        assert_eq!(doc.collection_id, None);
        assert!(doc.chapters.is_empty());
    }
}
