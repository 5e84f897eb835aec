//! Application state: every entity in normalized maps, updated by id
//!
//! `AppState` is the single owner of books, chapters, artisans, groups,
//! collections, tags and preferences. Views read from it and call the
//! update-by-id methods below; each mutation records which stored document
//! it touched so [`crate::persistence::Persistence::save`] only rewrites
//! those.

use crate::annotation::{self, TextRange};
use crate::error::{FabricaError, Result, ValidationError};
use crate::persistence::Document;
use crate::preferences::Preferences;
use crate::types::{
    Annotation, AnnotationId, AnnotationKind, Artisan, ArtisanGroup, ArtisanId, Book,
    BookDocument, BookId, Chapter, ChapterId, Collection, CollectionId, ContentItem,
    GroupId, IdGenerator, MediaItem, MediaKind, MediaTags, Producer, NEW_CHAPTER_TITLE,
};
use std::collections::{HashMap, HashSet};

/// The catalog part of the state: what export writes and import replaces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub books: Vec<BookDocument>,
    pub artisans: Vec<Artisan>,
    pub collections: Vec<Collection>,
    pub groups: Vec<ArtisanGroup>,
    pub media_tags: MediaTags,
}

/// Changes to a book's editable fields
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct AppState {
    books: HashMap<BookId, Book>,
    book_order: Vec<BookId>,
    chapters: HashMap<ChapterId, Chapter>,
    chapter_owner: HashMap<ChapterId, BookId>,
    artisans: Vec<Artisan>,
    groups: Vec<ArtisanGroup>,
    collections: Vec<Collection>,
    media_tags: MediaTags,
    preferences: Preferences,
    api_key: Option<String>,
    ids: IdGenerator,
    dirty: HashSet<Document>,
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::missing(field).into());
    }
    Ok(value.to_string())
}

/// Trimmed, non-blank, first occurrence only
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}

impl AppState {
    /// Fresh state with the default artisans
    pub fn new() -> Self {
        let mut state = Self::default();
        state.replace_catalog(Catalog {
            artisans: Artisan::defaults(),
            ..Catalog::default()
        });
        state.dirty.clear();
        state
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Books in creation (or import) order
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.book_order.iter().filter_map(|id| self.books.get(id))
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.get(&id)
    }

    pub fn require_book(&self, id: BookId) -> Result<&Book> {
        self.book(id)
            .ok_or_else(|| FabricaError::NotFound(format!("book {id}")))
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.get(&id)
    }

    pub fn require_chapter(&self, id: ChapterId) -> Result<&Chapter> {
        self.chapter(id)
            .ok_or_else(|| FabricaError::NotFound(format!("chapter {id}")))
    }

    /// A book's chapters in order
    pub fn chapters_of(&self, book_id: BookId) -> Vec<&Chapter> {
        self.book(book_id)
            .map(|b| {
                b.chapter_ids
                    .iter()
                    .filter_map(|id| self.chapters.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn book_of(&self, chapter_id: ChapterId) -> Option<BookId> {
        self.chapter_owner.get(&chapter_id).copied()
    }

    pub fn artisans(&self) -> &[Artisan] {
        &self.artisans
    }

    pub fn artisan(&self, id: ArtisanId) -> Option<&Artisan> {
        self.artisans.iter().find(|a| a.id == id)
    }

    pub fn groups(&self) -> &[ArtisanGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&ArtisanGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, id: CollectionId) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn media_tags(&self) -> &MediaTags {
        &self.media_tags
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Documents changed since the last save
    pub fn dirty(&self) -> &HashSet<Document> {
        &self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    pub(crate) fn touch(&mut self, document: Document) {
        self.dirty.insert(document);
    }

    // ------------------------------------------------------------------
    // Catalog snapshot
    // ------------------------------------------------------------------

    /// Books with their chapters inlined, in order
    pub fn book_documents(&self) -> Vec<BookDocument> {
        self.books()
            .map(|book| {
                let chapters = self.chapters_of(book.id).into_iter().cloned().collect();
                BookDocument::from_parts(book, chapters)
            })
            .collect()
    }

    pub fn catalog(&self) -> Catalog {
        Catalog {
            books: self.book_documents(),
            artisans: self.artisans.clone(),
            collections: self.collections.clone(),
            groups: self.groups.clone(),
            media_tags: self.media_tags.clone(),
        }
    }

    /// Replace every catalog entity at once.
    ///
    /// Applies the load-time shape fixes: the multicultural artisan is
    /// re-added when absent and duplicate chapter ids get fresh ids.
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.books.clear();
        self.book_order.clear();
        self.chapters.clear();
        self.chapter_owner.clear();

        for collection in &catalog.collections {
            self.ids.observe(collection.id);
        }
        for group in &catalog.groups {
            self.ids.observe(group.id);
        }
        for artisan in &catalog.artisans {
            if let ArtisanId::Custom(id) = artisan.id {
                self.ids.observe(id);
            }
        }
        for document in &catalog.books {
            self.ids.observe(document.id);
            for chapter in &document.chapters {
                self.ids.observe(chapter.id);
                for annotation in &chapter.annotations {
                    self.ids.observe(annotation.id);
                }
            }
        }

        for document in catalog.books {
            if self.books.contains_key(&document.id) {
                tracing::warn!(id = %document.id, "dropping book with duplicate id");
                continue;
            }
            self.insert_book_document(document);
        }

        self.artisans = catalog.artisans;
        if !self.artisans.iter().any(|a| a.id.is_multicultural()) {
            self.artisans.push(Artisan::multicultural());
        }
        self.collections = catalog.collections;
        self.groups = catalog.groups;
        self.media_tags = catalog.media_tags;

        if let Some(selected) = self.preferences.selected_book {
            if !self.books.contains_key(&selected) {
                self.preferences.selected_book = None;
            }
        }

        self.dirty.extend([
            Document::Books,
            Document::Artisans,
            Document::Collections,
            Document::Groups,
            Document::MediaTags,
        ]);
    }

    fn insert_book_document(&mut self, document: BookDocument) {
        let (mut book, chapters) = document.into_parts();
        book.chapter_ids.clear();
        for mut chapter in chapters {
            if self.chapters.contains_key(&chapter.id) {
                let fresh = self.ids.next_id();
                tracing::warn!(old = %chapter.id, new = %fresh, "reassigning duplicate chapter id");
                chapter.id = fresh;
            }
            book.chapter_ids.push(chapter.id);
            self.chapter_owner.insert(chapter.id, book.id);
            self.chapters.insert(chapter.id, chapter);
        }
        self.book_order.push(book.id);
        self.books.insert(book.id, book);
    }

    pub(crate) fn restore_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
        if let Some(selected) = self.preferences.selected_book {
            if !self.books.contains_key(&selected) {
                self.preferences.selected_book = None;
            }
        }
    }

    pub(crate) fn restore_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
    }

    // ------------------------------------------------------------------
    // Books and chapters
    // ------------------------------------------------------------------

    /// Create a book with one chapter per non-blank line of `index`
    pub fn create_book(&mut self, title: &str, index: &str, cover_url: &str) -> Result<BookId> {
        if title.trim().is_empty() || index.trim().is_empty() {
            return Err(ValidationError::missing("title and index").into());
        }

        let book_id = self.ids.next_id();
        let mut book = Book::new(book_id, title.trim());
        book.cover_url = cover_url.trim().to_string();

        let chapters: Vec<Chapter> = index
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Chapter::new(self.ids.next_id(), line))
            .collect();

        self.insert_book_document(BookDocument::from_parts(&book, chapters));
        self.touch(Document::Books);
        tracing::info!(id = %book_id, title = %title.trim(), "book created");
        Ok(book_id)
    }

    pub fn update_book(&mut self, id: BookId, update: BookUpdate) -> Result<()> {
        let title = update.title.as_deref().map(|t| required(t, "title")).transpose()?;
        let book = self
            .books
            .get_mut(&id)
            .ok_or_else(|| FabricaError::NotFound(format!("book {id}")))?;
        if let Some(title) = title {
            book.title = title;
        }
        if let Some(cover) = update.cover_url {
            book.cover_url = cover.trim().to_string();
        }
        self.touch(Document::Books);
        Ok(())
    }

    /// Delete a book and all of its chapters. Irreversible.
    pub fn delete_book(&mut self, id: BookId) -> Result<Book> {
        let book = self
            .books
            .remove(&id)
            .ok_or_else(|| FabricaError::NotFound(format!("book {id}")))?;
        self.book_order.retain(|b| *b != id);
        for chapter_id in &book.chapter_ids {
            self.chapters.remove(chapter_id);
            self.chapter_owner.remove(chapter_id);
        }
        if self.preferences.selected_book == Some(id) {
            self.preferences.selected_book = None;
            self.touch(Document::Preferences);
        }
        self.touch(Document::Books);
        tracing::info!(id = %id, "book deleted");
        Ok(book)
    }

    /// Put a book in a collection, or take it out with `None`
    pub fn assign_collection(
        &mut self,
        book_id: BookId,
        collection_id: Option<CollectionId>,
    ) -> Result<()> {
        if let Some(cid) = collection_id {
            if self.collection(cid).is_none() {
                return Err(FabricaError::NotFound(format!("collection {cid}")));
            }
        }
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or_else(|| FabricaError::NotFound(format!("book {book_id}")))?;
        book.collection_id = collection_id;
        self.touch(Document::Books);
        Ok(())
    }

    pub fn add_chapter(&mut self, book_id: BookId, title: Option<&str>) -> Result<ChapterId> {
        if !self.books.contains_key(&book_id) {
            return Err(FabricaError::NotFound(format!("book {book_id}")));
        }
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(NEW_CHAPTER_TITLE);
        let chapter = Chapter::new(self.ids.next_id(), title);
        let chapter_id = chapter.id;

        self.chapter_owner.insert(chapter_id, book_id);
        self.chapters.insert(chapter_id, chapter);
        if let Some(book) = self.books.get_mut(&book_id) {
            book.chapter_ids.push(chapter_id);
        }
        self.touch(Document::Books);
        Ok(chapter_id)
    }

    /// Apply `f` to one chapter, found by id
    pub fn update_chapter<T>(
        &mut self,
        id: ChapterId,
        f: impl FnOnce(&mut Chapter) -> Result<T>,
    ) -> Result<T> {
        let chapter = self
            .chapters
            .get_mut(&id)
            .ok_or_else(|| FabricaError::NotFound(format!("chapter {id}")))?;
        let value = f(chapter)?;
        self.touch(Document::Books);
        Ok(value)
    }

    pub fn rename_chapter(&mut self, id: ChapterId, title: &str) -> Result<()> {
        let title = required(title, "chapter title")?;
        self.update_chapter(id, |c| {
            c.title = title;
            Ok(())
        })
    }

    /// Flip the completion flag, returning the new value
    pub fn toggle_chapter_completed(&mut self, id: ChapterId) -> Result<bool> {
        self.update_chapter(id, |c| {
            c.completed = !c.completed;
            Ok(c.completed)
        })
    }

    /// Save the author's text as the chapter's base content
    pub fn set_base_text(&mut self, id: ChapterId, text: &str) -> Result<()> {
        self.update_chapter(id, |c| {
            match c.contents.iter_mut().find(|item| item.producer.is_base()) {
                Some(base) => base.text = text.to_string(),
                None => c.contents.insert(0, ContentItem::base(text)),
            }
            Ok(())
        })
    }

    /// Replace the text of the content item produced by `producer`
    pub fn update_content_text(
        &mut self,
        id: ChapterId,
        producer: Producer,
        text: &str,
    ) -> Result<()> {
        self.update_chapter(id, |c| {
            let item = c
                .contents
                .iter_mut()
                .find(|item| item.producer == producer)
                .ok_or_else(|| {
                    FabricaError::NotFound(format!("content by {producer} in chapter {id}"))
                })?;
            item.text = text.to_string();
            Ok(())
        })
    }

    /// Delete the content item produced by `producer`
    pub fn remove_content(&mut self, id: ChapterId, producer: Producer) -> Result<ContentItem> {
        self.update_chapter(id, |c| {
            let index = c
                .contents
                .iter()
                .position(|item| item.producer == producer)
                .ok_or_else(|| {
                    FabricaError::NotFound(format!("content by {producer} in chapter {id}"))
                })?;
            Ok(c.contents.remove(index))
        })
    }

    // ------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------

    /// Annotate `range` of a chapter's base text
    pub fn add_annotation(
        &mut self,
        chapter_id: ChapterId,
        range: TextRange,
        kind: AnnotationKind,
        note: Option<&str>,
    ) -> Result<AnnotationId> {
        let note = match kind {
            AnnotationKind::Note => Some(required(note.unwrap_or_default(), "note text")?),
            AnnotationKind::Highlight => None,
        };
        let id = self.ids.next_id();
        self.update_chapter(chapter_id, |chapter| {
            let text = chapter
                .base_text()
                .ok_or(crate::error::AnnotationError::NoBaseText)?;
            let annotation =
                annotation::place_annotation(id, text, &chapter.annotations, range, kind, note)?;
            chapter.annotations.push(annotation);
            Ok(id)
        })
    }

    pub fn remove_annotation(
        &mut self,
        chapter_id: ChapterId,
        annotation_id: AnnotationId,
    ) -> Result<Annotation> {
        self.update_chapter(chapter_id, |chapter| {
            let index = chapter
                .annotations
                .iter()
                .position(|a| a.id == annotation_id)
                .ok_or_else(|| FabricaError::NotFound(format!("annotation {annotation_id}")))?;
            Ok(chapter.annotations.remove(index))
        })
    }

    // ------------------------------------------------------------------
    // Media
    // ------------------------------------------------------------------

    /// Attach a media item; its tags join the kind's known tags
    pub fn add_media(
        &mut self,
        chapter_id: ChapterId,
        kind: MediaKind,
        mut item: MediaItem,
    ) -> Result<()> {
        item.tags = clean_tags(item.tags);
        let tags = item.tags.clone();
        self.update_chapter(chapter_id, |c| {
            c.media_mut(kind).push(item);
            Ok(())
        })?;
        self.register_tags(kind, &tags);
        Ok(())
    }

    pub fn remove_media(
        &mut self,
        chapter_id: ChapterId,
        kind: MediaKind,
        index: usize,
    ) -> Result<MediaItem> {
        self.update_chapter(chapter_id, |c| {
            let items = c.media_mut(kind);
            if index >= items.len() {
                return Err(FabricaError::NotFound(format!("{kind} item {index}")));
            }
            Ok(items.remove(index))
        })
    }

    /// Change an item's name and/or URL in place; tags are kept
    pub fn update_media(
        &mut self,
        chapter_id: ChapterId,
        kind: MediaKind,
        index: usize,
        name: Option<&str>,
        url: Option<&str>,
    ) -> Result<()> {
        self.update_chapter(chapter_id, |c| {
            let item = c
                .media_mut(kind)
                .get_mut(index)
                .ok_or_else(|| FabricaError::NotFound(format!("{kind} item {index}")))?;
            if let Some(name) = name {
                item.name = name.trim().to_string();
            }
            if let Some(url) = url {
                item.url = url.trim().to_string();
            }
            Ok(())
        })
    }

    /// Replace an item's tags (deduplicated, blanks dropped)
    pub fn set_media_tags(
        &mut self,
        chapter_id: ChapterId,
        kind: MediaKind,
        index: usize,
        tags: Vec<String>,
    ) -> Result<()> {
        let cleaned = clean_tags(tags);
        let registered = cleaned.clone();
        self.update_chapter(chapter_id, |c| {
            let item = c
                .media_mut(kind)
                .get_mut(index)
                .ok_or_else(|| FabricaError::NotFound(format!("{kind} item {index}")))?;
            item.tags = cleaned;
            Ok(())
        })?;
        self.register_tags(kind, &registered);
        Ok(())
    }

    fn register_tags(&mut self, kind: MediaKind, tags: &[String]) {
        let mut changed = false;
        for tag in tags {
            changed |= self.media_tags.add(kind, tag);
        }
        if changed {
            self.touch(Document::MediaTags);
        }
    }

    pub fn add_tag(&mut self, kind: MediaKind, tag: &str) -> Result<bool> {
        let tag = required(tag, "tag")?;
        let added = self.media_tags.add(kind, &tag);
        if added {
            self.touch(Document::MediaTags);
        }
        Ok(added)
    }

    pub fn remove_tag(&mut self, kind: MediaKind, tag: &str) -> bool {
        let removed = self.media_tags.remove(kind, tag);
        if removed {
            self.touch(Document::MediaTags);
        }
        removed
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    pub fn create_collection(&mut self, name: &str) -> Result<CollectionId> {
        let name = required(name, "collection name")?;
        let id = self.ids.next_id();
        self.collections.push(Collection { id, name });
        self.touch(Document::Collections);
        Ok(id)
    }

    pub fn rename_collection(&mut self, id: CollectionId, name: &str) -> Result<()> {
        let name = required(name, "collection name")?;
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| FabricaError::NotFound(format!("collection {id}")))?;
        collection.name = name;
        self.touch(Document::Collections);
        Ok(())
    }

    /// Delete a collection. Its books stay, unassigned.
    pub fn delete_collection(&mut self, id: CollectionId) -> Result<Collection> {
        let index = self
            .collections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| FabricaError::NotFound(format!("collection {id}")))?;
        let removed = self.collections.remove(index);
        for book in self.books.values_mut() {
            if book.collection_id == Some(id) {
                book.collection_id = None;
            }
        }
        self.touch(Document::Collections);
        self.touch(Document::Books);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Artisans and groups
    // ------------------------------------------------------------------

    pub fn create_artisan(&mut self, name: &str, prompt: &str) -> Result<ArtisanId> {
        let name = required(name, "artisan name")?;
        let prompt = required(prompt, "artisan prompt")?;
        let id = ArtisanId::Custom(self.ids.next_id());
        self.artisans.push(Artisan::new(id, name, prompt));
        self.touch(Document::Artisans);
        Ok(id)
    }

    /// Edit an artisan. The multicultural artisan keeps its name.
    pub fn update_artisan(&mut self, id: ArtisanId, name: &str, prompt: &str) -> Result<()> {
        let name = required(name, "artisan name")?;
        let prompt = required(prompt, "artisan prompt")?;
        let artisan = self
            .artisans
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| FabricaError::NotFound(format!("artisan {id}")))?;
        if id.is_multicultural() && artisan.name != name {
            return Err(ValidationError::rule("the multicultural artisan cannot be renamed").into());
        }
        artisan.name = name;
        artisan.prompt = prompt;
        self.touch(Document::Artisans);
        Ok(())
    }

    pub fn delete_artisan(&mut self, id: ArtisanId) -> Result<Artisan> {
        if id.is_multicultural() {
            return Err(ValidationError::rule("the multicultural artisan cannot be deleted").into());
        }
        let index = self
            .artisans
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| FabricaError::NotFound(format!("artisan {id}")))?;
        self.touch(Document::Artisans);
        Ok(self.artisans.remove(index))
    }

    pub fn create_group(&mut self, name: &str, artisan_ids: Vec<ArtisanId>) -> Result<GroupId> {
        let name = required(name, "group name")?;
        let id = self.ids.next_id();
        self.groups.push(ArtisanGroup {
            id,
            name,
            artisan_ids,
        });
        self.touch(Document::Groups);
        Ok(id)
    }

    pub fn update_group(
        &mut self,
        id: GroupId,
        name: &str,
        artisan_ids: Vec<ArtisanId>,
    ) -> Result<()> {
        let name = required(name, "group name")?;
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| FabricaError::NotFound(format!("group {id}")))?;
        group.name = name;
        group.artisan_ids = artisan_ids;
        self.touch(Document::Groups);
        Ok(())
    }

    pub fn delete_group(&mut self, id: GroupId) -> Result<ArtisanGroup> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| FabricaError::NotFound(format!("group {id}")))?;
        self.touch(Document::Groups);
        Ok(self.groups.remove(index))
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn set_api_key(&mut self, key: Option<&str>) {
        self.api_key = key.map(str::trim).filter(|k| !k.is_empty()).map(str::to_string);
        self.touch(Document::ApiKey);
    }

    /// Mutate preferences and mark them for saving
    pub fn update_preferences(&mut self, f: impl FnOnce(&mut Preferences)) {
        f(&mut self.preferences);
        self.touch(Document::Preferences);
    }

    /// Remember the book the user is working on
    pub fn select_book(&mut self, id: Option<BookId>) -> Result<()> {
        if let Some(id) = id {
            self.require_book(id)?;
        }
        self.update_preferences(|p| p.selected_book = id);
        Ok(())
    }
}
