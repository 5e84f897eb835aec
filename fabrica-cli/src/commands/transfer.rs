//! Export, import and archive commands

use super::Workspace;
use anyhow::{Context, Result};
use fabrica_core::archive::{archive_filename, ChapterArchive};
use fabrica_core::transfer::{export_filename, export_library, import_library};
use fabrica_core::types::ChapterId;
use std::fs;
use std::path::{Path, PathBuf};

pub fn export(ws: &Workspace, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| {
        PathBuf::from(export_filename(chrono::Local::now().date_naive()))
    });
    let json = export_library(&ws.state)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Library exported to {}", path.display());
    Ok(())
}

pub async fn import(ws: &mut Workspace, input: &Path) -> Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let summary = import_library(&mut ws.state, &json)
        .with_context(|| format!("Could not import {}", input.display()))?;
    ws.save().await;
    println!(
        "Imported {} books ({} chapters) and {} artisans",
        summary.books, summary.chapters, summary.artisans
    );
    Ok(())
}

pub fn archive(ws: &Workspace, chapter_id: ChapterId, output_dir: &Path) -> Result<()> {
    let chapter = ws.state.require_chapter(chapter_id)?;
    let book_title = ws
        .state
        .book_of(chapter_id)
        .and_then(|id| ws.state.book(id))
        .map(|b| b.title.as_str())
        .unwrap_or_default();

    let archive = ChapterArchive::from_chapter(chapter)?;
    let bytes = archive.to_zip()?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = output_dir.join(archive_filename(book_title, &chapter.title));
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Archive written to {}", path.display());
    for entry in archive.paths() {
        println!("  {entry}");
    }
    Ok(())
}
