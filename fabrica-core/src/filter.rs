//! Book and library filters
//!
//! Pure, order-preserving selections over the state. Nothing here mutates.

use crate::state::AppState;
use crate::types::{
    ArtisanId, Book, BookId, Chapter, ChapterId, CollectionId, ContentItem, EntityId, GroupId,
    Producer, Translation,
};
use std::fmt;
use std::str::FromStr;

/// Which books to list, by collection membership
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionFilter {
    #[default]
    All,
    /// Books outside every collection
    Unassigned,
    Collection(CollectionId),
}

impl CollectionFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            CollectionFilter::All => true,
            CollectionFilter::Unassigned => book.collection_id.is_none(),
            CollectionFilter::Collection(id) => book.collection_id == Some(*id),
        }
    }
}

impl FromStr for CollectionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todas" | "all" => Ok(CollectionFilter::All),
            "ninguna" | "none" => Ok(CollectionFilter::Unassigned),
            other => other
                .parse::<EntityId>()
                .map(CollectionFilter::Collection)
                .map_err(|_| format!("unknown collection filter `{s}`")),
        }
    }
}

impl fmt::Display for CollectionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionFilter::All => f.write_str("todas"),
            CollectionFilter::Unassigned => f.write_str("ninguna"),
            CollectionFilter::Collection(id) => write!(f, "{id}"),
        }
    }
}

/// Books matching `filter`, in catalog order
pub fn filter_books(state: &AppState, filter: CollectionFilter) -> Vec<&Book> {
    state.books().filter(|b| filter.matches(b)).collect()
}

/// Library view filters. `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryFilter {
    pub chapter: Option<ChapterId>,
    pub producer: Option<Producer>,
    pub group: Option<GroupId>,
}

/// A chapter as shown in the library, with its visible items
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterView<'a> {
    pub chapter: &'a Chapter,
    pub contents: Vec<&'a ContentItem>,
    pub translations: Vec<&'a Translation>,
}

impl ChapterView<'_> {
    fn is_visible(&self) -> bool {
        !self.contents.is_empty() || !self.translations.is_empty() || self.chapter.has_media()
    }
}

/// Chapters of a book with the content that passes `filter`.
///
/// A chapter stays in the view when it has matching content, visible
/// translations, or any attached media.
pub fn library_view(state: &AppState, book_id: BookId, filter: LibraryFilter) -> Vec<ChapterView<'_>> {
    // An unknown group matches nothing
    let group_members: Option<Vec<ArtisanId>> = filter
        .group
        .map(|id| state.group(id).map(|g| g.artisan_ids.clone()).unwrap_or_default());

    let show_translations = filter.group.is_none()
        && matches!(
            filter.producer,
            None | Some(Producer::Artisan(ArtisanId::Multicultural))
        );

    state
        .chapters_of(book_id)
        .into_iter()
        .filter(|c| filter.chapter.map_or(true, |id| c.id == id))
        .map(|chapter| {
            let contents = chapter
                .contents
                .iter()
                .filter(|item| filter.producer.map_or(true, |p| item.producer == p))
                .filter(|item| match &group_members {
                    None => true,
                    Some(members) => item
                        .producer
                        .artisan()
                        .is_some_and(|id| members.contains(&id)),
                })
                .collect();
            let translations = if show_translations {
                chapter.translations.iter().collect()
            } else {
                Vec::new()
            };
            ChapterView {
                chapter,
                contents,
                translations,
            }
        })
        .filter(ChapterView::is_visible)
        .collect()
}
