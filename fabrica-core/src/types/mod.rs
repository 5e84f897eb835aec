//! Core types for the Fabrica data model

mod annotation;
mod artisan;
mod book;
mod chapter;
mod collection;
mod content;
mod id;
mod media;

pub use annotation::{Annotation, AnnotationKind};
pub use artisan::{Artisan, ArtisanGroup, ArtisanId, Producer, BASE_KEY, MULTICULTURAL_KEY};
pub use book::{Book, BookDocument};
pub use chapter::{Chapter, NEW_CHAPTER_TITLE};
pub use collection::Collection;
pub use content::{ContentItem, Translation, BASE_PRODUCER_NAME};
pub use id::{AnnotationId, BookId, ChapterId, CollectionId, EntityId, GroupId, IdGenerator};
pub use media::{video_embed_url, MediaItem, MediaKind, MediaTags};
