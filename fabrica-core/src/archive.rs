//! ZIP packaging of a chapter's texts

use crate::error::ArchiveError;
use crate::generation::GenerationOutcome;
use crate::types::Chapter;
use regex::Regex;
use std::io::{Cursor, Write};
use std::sync::LazyLock;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const BASE_ENTRY_NAME: &str = "00_Texto_Base.txt";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("constant pattern compiles"));

/// Replace every character outside `[A-Za-z0-9]` with `_`
pub fn sanitize(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "_").into_owned()
}

/// File name for a chapter archive of a book
pub fn archive_filename(book_title: &str, chapter_title: &str) -> String {
    format!("{}_{}.zip", sanitize(book_title), sanitize(chapter_title))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub text: String,
}

/// The texts of one chapter, laid out as they go into the archive
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterArchive {
    pub folder: String,
    pub entries: Vec<ArchiveEntry>,
}

impl ChapterArchive {
    fn build<'a>(
        chapter_title: &str,
        base_text: &str,
        items: impl Iterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut entries = vec![ArchiveEntry {
            file_name: BASE_ENTRY_NAME.to_string(),
            text: base_text.to_string(),
        }];
        entries.extend(items.enumerate().map(|(i, (producer, text))| ArchiveEntry {
            file_name: format!("{:02}_{}.txt", i + 1, sanitize(producer)),
            text: text.to_string(),
        }));
        Self {
            folder: sanitize(chapter_title),
            entries,
        }
    }

    /// Package a chapter's saved content
    pub fn from_chapter(chapter: &Chapter) -> Result<Self, ArchiveError> {
        if chapter.contents.is_empty() {
            return Err(ArchiveError::NothingToPackage(format!(
                "chapter `{}` has no content to package",
                chapter.title
            )));
        }
        Ok(Self::build(
            &chapter.title,
            chapter.base_text().unwrap_or_default(),
            chapter
                .derived_contents()
                .map(|c| (c.producer_name.as_str(), c.text.as_str())),
        ))
    }

    /// Package results of a run that have not been saved yet
    pub fn from_outcome(chapter_title: &str, outcome: &GenerationOutcome) -> Result<Self, ArchiveError> {
        if outcome.contents.is_empty() {
            return Err(ArchiveError::NothingToPackage(
                "there is no generated content to package".to_string(),
            ));
        }
        Ok(Self::build(
            chapter_title,
            &outcome.base_text,
            outcome
                .contents
                .iter()
                .map(|c| (c.producer_name.as_str(), c.text.as_str())),
        ))
    }

    /// Full paths of the files inside the archive
    pub fn paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("{}/{}", self.folder, e.file_name))
            .collect()
    }

    /// Write the archive into memory
    pub fn to_zip(&self) -> Result<Vec<u8>, ArchiveError> {
        let zip_err = |e: zip::result::ZipError| ArchiveError::Zip(e.to_string());

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        writer
            .add_directory(format!("{}/", self.folder), options)
            .map_err(zip_err)?;
        for (path, entry) in self.paths().into_iter().zip(&self.entries) {
            writer.start_file(path, options).map_err(zip_err)?;
            writer
                .write_all(entry.text.as_bytes())
                .map_err(|e| ArchiveError::Zip(e.to_string()))?;
        }
        let cursor = writer.finish().map_err(zip_err)?;
        tracing::debug!(folder = %self.folder, files = self.entries.len(), "archive written");
        Ok(cursor.into_inner())
    }
}
