//! End-to-end tests over the public API
//!
//! Each test drives the library the way the CLI does: load state from a
//! store, mutate it, run generation against a scripted backend, save, and
//! load again.

use async_trait::async_trait;
use fabrica_core::archive::ChapterArchive;
use fabrica_core::filter::{filter_books, library_view, CollectionFilter, LibraryFilter};
use fabrica_core::generation::{commit, GenerationEvent};
use fabrica_core::transfer::{export_library, import_library};
use fabrica_core::types::{MediaItem, MediaKind};
use fabrica_core::{
    AppState, ArtisanId, Document, EntityId, GenerationError, GenerationPlan, GenerationRequest,
    Generator, LocalStorage, Persistence, TextGenerator,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend that upper-cases the source text and counts calls
#[derive(Default)]
struct Shouting {
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for Shouting {
    fn name(&self) -> &str {
        "shouting"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let source = prompt
            .rsplit("--- TEXTO A TRANSFORMAR ---")
            .next()
            .unwrap_or_default();
        Ok(source.trim().to_uppercase())
    }
}

#[tokio::test]
async fn test_generate_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = Persistence::new(Arc::new(LocalStorage::new(dir.path())));

    let mut state = persistence.load().await;
    let book = state.create_book("Cuentos", "Intro\nChapter One", "").unwrap();
    let chapter = state.require_book(book).unwrap().chapter_ids[0];
    state.set_api_key(Some("test-key"));

    let request = GenerationRequest {
        chapter_id: Some(chapter),
        base_text: "Hello world".to_string(),
        artisan_ids: vec![
            ArtisanId::Custom(EntityId::new(1)),
            ArtisanId::Custom(EntityId::new(2)),
            ArtisanId::Multicultural,
        ],
        languages: vec!["Inglés".to_string()],
    };
    let plan = GenerationPlan::prepare(&state, request, state.api_key()).unwrap();
    assert!(!plan.requires_confirmation());

    let backend = Arc::new(Shouting::default());
    let generator = Generator::new(backend.clone());
    let mut progress = Vec::new();
    let outcome = generator
        .run(&plan, |event| {
            if let GenerationEvent::Content { completed, total, .. }
            | GenerationEvent::Translation { completed, total, .. } = event
            {
                progress.push((completed, total));
            }
        })
        .await
        .unwrap();
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

    let archive = ChapterArchive::from_outcome("Intro", &outcome).unwrap();
    assert_eq!(archive.entries.len(), 3);

    commit(&mut state, outcome).unwrap();
    let report = persistence.save(&mut state).await;
    assert!(report.is_clean());
    assert!(report.written.contains(&Document::Books));
    assert!(dir.path().join("libros.json").exists());

    let reloaded = persistence.load().await;
    let saved = reloaded.chapter(chapter).unwrap();
    assert_eq!(saved.base_text(), Some("Hello world"));
    assert_eq!(saved.contents.len(), 3);
    assert_eq!(saved.contents[1].text, "HELLO WORLD");
    assert_eq!(saved.translations.len(), 1);
    assert_eq!(reloaded.api_key(), Some("test-key"));
}

#[tokio::test]
async fn test_zero_artisans_sends_nothing() {
    let mut state = AppState::new();
    let book = state.create_book("Libro", "Uno", "").unwrap();
    let chapter = state.require_book(book).unwrap().chapter_ids[0];

    let request = GenerationRequest {
        chapter_id: Some(chapter),
        base_text: "Hello world".to_string(),
        ..GenerationRequest::default()
    };
    let backend = Arc::new(Shouting::default());
    assert!(GenerationPlan::prepare(&state, request, Some("key")).is_err());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    assert!(state.chapter(chapter).unwrap().contents.is_empty());
}

#[test]
fn test_export_import_between_states() {
    let mut source = AppState::new();
    let essays = source.create_collection("Ensayos").unwrap();
    let a = source.create_book("A", "Uno\nDos", "").unwrap();
    source.create_book("B", "Tres", "").unwrap();
    source.assign_collection(a, Some(essays)).unwrap();
    let chapter = source.require_book(a).unwrap().chapter_ids[1];
    source
        .add_media(
            chapter,
            MediaKind::Video,
            MediaItem::new("Clase", "https://youtu.be/abc"),
        )
        .unwrap();

    let json = export_library(&source).unwrap();
    let mut target = AppState::new();
    import_library(&mut target, &json).unwrap();
    assert_eq!(target.catalog(), source.catalog());

    let in_essays = filter_books(&target, CollectionFilter::Collection(essays));
    assert_eq!(in_essays.len(), 1);
    assert_eq!(in_essays[0].title, "A");
    assert_eq!(filter_books(&target, CollectionFilter::Unassigned).len(), 1);

    let view = library_view(&target, a, LibraryFilter::default());
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].chapter.id, chapter);
}

#[test]
fn test_saved_archive_unzips() {
    let mut state = AppState::new();
    let book = state.create_book("Libro", "Capítulo Uno", "").unwrap();
    let chapter = state.require_book(book).unwrap().chapter_ids[0];
    state.set_base_text(chapter, "Texto").unwrap();

    let bytes = ChapterArchive::from_chapter(state.chapter(chapter).unwrap())
        .unwrap()
        .to_zip()
        .unwrap();
    let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: Vec<&str> = zip.file_names().filter(|n| !n.ends_with('/')).collect();
    assert_eq!(names, vec!["Cap_tulo_Uno/00_Texto_Base.txt"]);
}
