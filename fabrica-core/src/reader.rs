//! Chapter-by-chapter reading of a book

use crate::annotation::{render_segments, Segment};
use crate::error::{FabricaError, Result};
use crate::state::AppState;
use crate::types::{Book, BookId, Chapter, ChapterId};

/// Shown in place of a chapter that has no base text yet
pub const EMPTY_CHAPTER_MESSAGE: &str = "Este capítulo no tiene contenido base.";

/// What the reader shows for one chapter
#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    Segments(Vec<Segment>),
    Empty,
}

impl PageBody {
    /// Plain text of the page
    pub fn text(&self) -> String {
        match self {
            PageBody::Segments(segments) => segments.iter().map(|s| s.text.as_str()).collect(),
            PageBody::Empty => EMPTY_CHAPTER_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub book: &'a Book,
    pub chapter: &'a Chapter,
    /// Zero-based chapter position
    pub position: usize,
    pub total: usize,
    pub body: PageBody,
}

impl Page<'_> {
    pub fn has_previous(&self) -> bool {
        self.position > 0
    }

    pub fn has_next(&self) -> bool {
        self.position + 1 < self.total
    }
}

/// Render a chapter's base text with its annotations
pub fn render_chapter(chapter: &Chapter) -> PageBody {
    match chapter.base_text().filter(|t| !t.is_empty()) {
        Some(text) => PageBody::Segments(render_segments(text, &chapter.annotations)),
        None => PageBody::Empty,
    }
}

/// Position of a reader within one book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSession {
    book_id: BookId,
    index: usize,
}

impl ReaderSession {
    /// Open a book at its first chapter, or at `chapter` when given
    pub fn open(state: &AppState, book_id: BookId, chapter: Option<ChapterId>) -> Result<Self> {
        let book = state.require_book(book_id)?;
        if book.chapter_ids.is_empty() {
            return Err(FabricaError::NotFound(format!("chapters in book {book_id}")));
        }
        let index = match chapter {
            Some(id) => book
                .chapter_ids
                .iter()
                .position(|c| *c == id)
                .ok_or_else(|| FabricaError::NotFound(format!("chapter {id} in book {book_id}")))?,
            None => 0,
        };
        Ok(Self { book_id, index })
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to `index` if it names a chapter. Returns whether the position changed.
    pub fn go_to(&mut self, state: &AppState, index: usize) -> bool {
        let total = state.chapters_of(self.book_id).len();
        if index < total && index != self.index {
            self.index = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self, state: &AppState) -> bool {
        self.go_to(state, self.index + 1)
    }

    pub fn previous(&mut self, state: &AppState) -> bool {
        match self.index.checked_sub(1) {
            Some(index) => self.go_to(state, index),
            None => false,
        }
    }

    pub fn page<'a>(&self, state: &'a AppState) -> Result<Page<'a>> {
        let book = state.require_book(self.book_id)?;
        let chapters = state.chapters_of(self.book_id);
        let chapter = chapters
            .get(self.index)
            .copied()
            .ok_or_else(|| FabricaError::NotFound(format!("chapter {} of book {}", self.index + 1, book.id)))?;
        Ok(Page {
            book,
            chapter,
            position: self.index,
            total: chapters.len(),
            body: render_chapter(chapter),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::TextRange;
    use crate::types::AnnotationKind;

    fn book() -> (AppState, BookId) {
        let mut state = AppState::new();
        let id = state.create_book("Libro", "Uno\nDos\nTres", "").unwrap();
        (state, id)
    }

    #[test]
    fn test_navigation_is_bounded() {
        let (state, id) = book();
        let mut session = ReaderSession::open(&state, id, None).unwrap();
        assert!(!session.previous(&state));
        assert!(session.next(&state));
        assert!(session.next(&state));
        assert!(!session.next(&state));
        assert_eq!(session.index(), 2);
        assert!(!session.go_to(&state, 7));

        let page = session.page(&state).unwrap();
        assert_eq!(page.chapter.title, "Tres");
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn test_open_at_chapter() {
        let (state, id) = book();
        let second = state.require_book(id).unwrap().chapter_ids[1];
        let session = ReaderSession::open(&state, id, Some(second)).unwrap();
        assert_eq!(session.index(), 1);
        assert!(ReaderSession::open(&state, id, Some(crate::types::EntityId::new(5))).is_err());
    }

    #[test]
    fn test_chapter_without_base_shows_placeholder() {
        let (mut state, id) = book();
        let session = ReaderSession::open(&state, id, None).unwrap();
        let page = session.page(&state).unwrap();
        assert_eq!(page.body, PageBody::Empty);
        assert_eq!(page.body.text(), EMPTY_CHAPTER_MESSAGE);

        let first = state.require_book(id).unwrap().chapter_ids[0];
        state.set_base_text(first, "").unwrap();
        assert_eq!(session.page(&state).unwrap().body, PageBody::Empty);
    }

    #[test]
    fn test_page_renders_annotations() {
        let (mut state, id) = book();
        let first = state.require_book(id).unwrap().chapter_ids[0];
        state.set_base_text(first, "Hola mundo").unwrap();
        state
            .add_annotation(first, TextRange::new(5, 10), AnnotationKind::Highlight, None)
            .unwrap();

        let page = ReaderSession::open(&state, id, None)
            .unwrap()
            .page(&state)
            .unwrap();
        match &page.body {
            PageBody::Segments(segments) => {
                assert_eq!(segments.len(), 2);
                assert!(segments[1].mark.is_some());
            }
            PageBody::Empty => panic!("expected segments"),
        }
        assert_eq!(page.body.text(), "Hola mundo");
    }
}
