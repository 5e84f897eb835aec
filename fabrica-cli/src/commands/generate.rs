//! Generate command implementation

use super::{text_arg, Workspace};
use anyhow::{bail, Context, Result};
use clap::Args;
use fabrica_core::archive::{archive_filename, ChapterArchive};
use fabrica_core::generation::{
    commit, group_selection, GeminiClient, GenerationEvent, GenerationOutcome,
};
use fabrica_core::types::{ArtisanId, ChapterId, GroupId};
use fabrica_core::{GenerationPlan, GenerationRequest, Generator};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args)]
pub struct GenerateArgs {
    /// Chapter id
    chapter: ChapterId,

    /// Base text to transform (defaults to the chapter's saved base text)
    #[arg(short, long)]
    text: Option<String>,

    /// Read the base text from a file
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Artisan ids, comma separated ("multicultural" for translations)
    #[arg(short, long, value_delimiter = ',')]
    artisans: Vec<ArtisanId>,

    /// Use the artisans of a saved group
    #[arg(short, long, conflicts_with = "artisans")]
    group: Option<GroupId>,

    /// Target languages for the multicultural artisan, comma separated
    /// (for example "Inglés,Francés")
    #[arg(short, long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Replace existing artisan content without asking
    #[arg(short, long)]
    yes: bool,

    /// Keep the results out of the library (use with --archive)
    #[arg(long)]
    no_save: bool,

    /// Also write a ZIP archive of the results into this directory
    #[arg(long, value_name = "DIR")]
    archive: Option<PathBuf>,
}

pub async fn generate(ws: &mut Workspace, args: GenerateArgs) -> Result<()> {
    let chapter = ws.state.require_chapter(args.chapter)?;
    let chapter_title = chapter.title.clone();
    let base_text = match text_arg(args.text, args.file.as_deref())? {
        Some(text) => text,
        None => chapter.base_text().unwrap_or_default().to_string(),
    };

    let artisan_ids = match args.group {
        Some(group) => group_selection(&ws.state, group)?,
        None => args.artisans,
    };

    let request = GenerationRequest {
        chapter_id: Some(args.chapter),
        base_text,
        artisan_ids,
        languages: args.languages,
    };
    let api_key = ws.config.resolve_api_key(&ws.state).map(str::to_string);
    let plan = GenerationPlan::prepare(&ws.state, request, api_key.as_deref())?;

    if plan.requires_confirmation() && !args.yes && !args.no_save {
        let names: Vec<&str> = plan
            .overwrite_conflicts
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        bail!(
            "Content already exists for: {}. Pass --yes to overwrite it",
            names.join(", ")
        );
    }

    let client = GeminiClient::new(plan.api_key.clone(), &ws.config.gemini)?;
    let generator = Generator::new(Arc::new(client));

    let pb = ProgressBar::new(plan.request_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}")?
            .progress_chars("##-"),
    );

    let outcome = generator
        .run(&plan, |event| match event {
            GenerationEvent::Started { .. } => pb.set_message("generating"),
            GenerationEvent::Content { item, failed, .. } => {
                if failed {
                    pb.println(format!("  failed: {}", item.producer_name));
                }
                pb.set_message(item.producer_name);
                pb.inc(1);
            }
            GenerationEvent::Translation { item, failed, .. } => {
                if failed {
                    pb.println(format!("  failed: translation to {}", item.language));
                }
                pb.set_message(item.language);
                pb.inc(1);
            }
            GenerationEvent::Finished { .. } => pb.finish_with_message("done"),
        })
        .await?;

    println!(
        "Generated {} texts and {} translations ({} failed)",
        outcome.contents.len(),
        outcome.translations.len(),
        outcome.failures
    );

    let archive = match &args.archive {
        Some(dir) => Some(write_archive(ws, args.chapter, &chapter_title, &outcome, dir)),
        None => None,
    };

    if !args.no_save {
        commit(&mut ws.state, outcome)?;
        ws.save().await;
        println!("Saved to chapter {}", args.chapter);
    }

    match archive {
        Some(Ok(path)) => println!("Archive written to {}", path.display()),
        // Results are already saved; only the archive is missing
        Some(Err(e)) if !args.no_save => {
            tracing::warn!("archive not written: {:#}", e);
            eprintln!("Warning: archive not written: {e:#}");
        }
        Some(Err(e)) => return Err(e),
        None => {}
    }
    Ok(())
}

fn write_archive(
    ws: &Workspace,
    chapter_id: ChapterId,
    chapter_title: &str,
    outcome: &GenerationOutcome,
    dir: &Path,
) -> Result<PathBuf> {
    let archive = ChapterArchive::from_outcome(chapter_title, outcome)?;
    let book_title = ws
        .state
        .book_of(chapter_id)
        .and_then(|id| ws.state.book(id))
        .map(|b| b.title.as_str())
        .unwrap_or_default();
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(archive_filename(book_title, chapter_title));
    fs::write(&path, archive.to_zip()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
