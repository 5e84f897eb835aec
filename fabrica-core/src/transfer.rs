//! Library export and import as a single JSON document

use crate::error::{ImportError, Result};
use crate::state::{AppState, Catalog};
use crate::types::{Artisan, ArtisanGroup, BookDocument, Collection, MediaTags};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The exported library
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LibraryExport {
    #[serde(rename = "libros")]
    pub books: Vec<BookDocument>,

    #[serde(rename = "artesanos")]
    pub artisans: Vec<Artisan>,

    #[serde(rename = "colecciones")]
    pub collections: Vec<Collection>,

    #[serde(rename = "gruposArtesanos")]
    pub groups: Vec<ArtisanGroup>,

    #[serde(rename = "mediaTags")]
    pub media_tags: MediaTags,
}

/// Import shape: every key may be absent or null
#[derive(Deserialize)]
struct RawImport {
    libros: Option<Vec<BookDocument>>,
    artesanos: Option<Vec<Artisan>>,
    colecciones: Option<Vec<Collection>>,
    #[serde(rename = "gruposArtesanos")]
    grupos_artesanos: Option<Vec<ArtisanGroup>>,
    #[serde(rename = "mediaTags")]
    media_tags: Option<MediaTags>,
}

impl From<Catalog> for LibraryExport {
    fn from(catalog: Catalog) -> Self {
        Self {
            books: catalog.books,
            artisans: catalog.artisans,
            collections: catalog.collections,
            groups: catalog.groups,
            media_tags: catalog.media_tags,
        }
    }
}

impl From<LibraryExport> for Catalog {
    fn from(export: LibraryExport) -> Self {
        Self {
            books: export.books,
            artisans: export.artisans,
            collections: export.collections,
            groups: export.groups,
            media_tags: export.media_tags,
        }
    }
}

impl LibraryExport {
    pub fn from_state(state: &AppState) -> Self {
        state.catalog().into()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an exported document. `libros` and `artesanos` must be present.
    pub fn parse(json: &str) -> std::result::Result<Self, ImportError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ImportError::Unreadable(e.to_string()))?;
        if !value.is_object() {
            return Err(ImportError::Malformed("expected a JSON object".to_string()));
        }
        for key in ["libros", "artesanos"] {
            if value.get(key).map_or(true, serde_json::Value::is_null) {
                return Err(ImportError::MissingKey(key));
            }
        }

        let raw: RawImport =
            serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()))?;
        Ok(Self {
            books: raw.libros.unwrap_or_default(),
            artisans: raw.artesanos.unwrap_or_default(),
            collections: raw.colecciones.unwrap_or_default(),
            groups: raw.grupos_artesanos.unwrap_or_default(),
            media_tags: raw.media_tags.unwrap_or_default(),
        })
    }
}

/// Counts reported after a successful import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub books: usize,
    pub chapters: usize,
    pub artisans: usize,
}

/// Default file name for an export made on `date`
pub fn export_filename(date: NaiveDate) -> String {
    format!("biblioteca_fabrica_contenido_{}.json", date.format("%Y-%m-%d"))
}

/// Serialize the whole library
pub fn export_library(state: &AppState) -> Result<String> {
    let json = LibraryExport::from_state(state).to_json()?;
    tracing::info!(books = state.books().count(), "library exported");
    Ok(json)
}

/// Replace the library with an exported document.
///
/// The state is only touched once the whole document has parsed.
pub fn import_library(state: &mut AppState, json: &str) -> Result<ImportSummary> {
    let export = LibraryExport::parse(json).map_err(|e| {
        tracing::warn!("import rejected: {}", e);
        e
    })?;
    let summary = ImportSummary {
        books: export.books.len(),
        chapters: export.books.iter().map(|b| b.chapters.len()).sum(),
        artisans: export.artisans.len(),
    };
    state.replace_catalog(export.into());
    tracing::info!(books = summary.books, chapters = summary.chapters, "library imported");
    Ok(summary)
}
