//! Chapter type: base text, generated variants, translations, media, annotations

use super::{Annotation, ChapterId, ContentItem, MediaItem, MediaKind, Producer, Translation};
use serde::{Deserialize, Serialize};

/// Title given to chapters added after book creation
pub const NEW_CHAPTER_TITLE: &str = "Nuevo Capítulo";

/// A single chapter of a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub id: ChapterId,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "completado", default)]
    pub completed: bool,

    /// Base text plus one entry per artisan output
    #[serde(rename = "contenido", default)]
    pub contents: Vec<ContentItem>,

    #[serde(rename = "traducciones", default)]
    pub translations: Vec<Translation>,

    #[serde(rename = "videoItems", default)]
    pub videos: Vec<MediaItem>,

    #[serde(rename = "audioItems", default)]
    pub audios: Vec<MediaItem>,

    #[serde(rename = "pdfItems", default)]
    pub pdfs: Vec<MediaItem>,

    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Chapter {
    /// Create an empty chapter with a title
    pub fn new(id: ChapterId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            contents: Vec::new(),
            translations: Vec::new(),
            videos: Vec::new(),
            audios: Vec::new(),
            pdfs: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// The author's own text, if any was saved
    pub fn base_text(&self) -> Option<&str> {
        self.content_by(Producer::Base).map(|c| c.text.as_str())
    }

    pub fn content_by(&self, producer: Producer) -> Option<&ContentItem> {
        self.contents.iter().find(|c| c.producer == producer)
    }

    /// Content items other than the base text, in stored order
    pub fn derived_contents(&self) -> impl Iterator<Item = &ContentItem> {
        self.contents.iter().filter(|c| !c.producer.is_base())
    }

    pub fn media(&self, kind: MediaKind) -> &[MediaItem] {
        match kind {
            MediaKind::Video => &self.videos,
            MediaKind::Audio => &self.audios,
            MediaKind::Pdf => &self.pdfs,
        }
    }

    pub fn media_mut(&mut self, kind: MediaKind) -> &mut Vec<MediaItem> {
        match kind {
            MediaKind::Video => &mut self.videos,
            MediaKind::Audio => &mut self.audios,
            MediaKind::Pdf => &mut self.pdfs,
        }
    }

    pub fn has_media(&self) -> bool {
        MediaKind::ALL.iter().any(|k| !self.media(*k).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityId;

    #[test]
    fn test_missing_lists_default_to_empty() {
        let chapter: Chapter = serde_json::from_str(r#"{"id": 5, "titulo": "Uno"}"#).unwrap();
        assert_eq!(chapter.title, "Uno");
        assert!(!chapter.completed);
        assert!(chapter.contents.is_empty());
        assert!(chapter.annotations.is_empty());
        assert!(!chapter.has_media());
    }

    #[test]
    fn test_base_text_lookup() {
        let mut chapter = Chapter::new(EntityId::new(1), "Intro");
        assert_eq!(chapter.base_text(), None);
        chapter.contents.push(ContentItem::base("Hello world"));
        assert_eq!(chapter.base_text(), Some("Hello world"));
        assert_eq!(chapter.derived_contents().count(), 0);
    }
}
