//! Chapter commands

use super::{preview, text_arg, Workspace};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use fabrica_core::types::{BookId, ChapterId, Producer};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ChapterCommand {
    /// Append a chapter to a book
    Add {
        /// Book id
        book: BookId,

        /// Chapter title (defaults to "Nuevo Capítulo")
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Rename a chapter
    Rename {
        /// Chapter id
        chapter: ChapterId,

        /// New title
        title: String,
    },

    /// Mark a chapter done, or not done again
    Toggle {
        /// Chapter id
        chapter: ChapterId,
    },

    /// Save the author's base text for a chapter
    SetBase {
        /// Chapter id
        chapter: ChapterId,

        #[arg(short, long, required_unless_present = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Replace the text produced by one artisan
    EditContent {
        /// Chapter id
        chapter: ChapterId,

        /// Producer: base, multicultural, or an artisan id
        #[arg(short, long)]
        producer: Producer,

        #[arg(short, long, required_unless_present = "file")]
        text: Option<String>,

        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Delete the text produced by one artisan
    RemoveContent {
        /// Chapter id
        chapter: ChapterId,

        /// Producer: base, multicultural, or an artisan id
        producer: Producer,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Print every text saved for a chapter
    Show {
        /// Chapter id
        chapter: ChapterId,

        /// Print full texts instead of previews
        #[arg(long)]
        full: bool,
    },
}

pub async fn run(ws: &mut Workspace, cmd: ChapterCommand) -> Result<()> {
    match cmd {
        ChapterCommand::Add { book, title } => {
            let id = ws.state.add_chapter(book, title.as_deref())?;
            ws.save().await;
            println!("Added chapter {id}");
        }
        ChapterCommand::Rename { chapter, title } => {
            ws.state.rename_chapter(chapter, &title)?;
            ws.save().await;
            println!("Renamed chapter {chapter}");
        }
        ChapterCommand::Toggle { chapter } => {
            let done = ws.state.toggle_chapter_completed(chapter)?;
            ws.save().await;
            println!(
                "Chapter {chapter} marked {}",
                if done { "done" } else { "not done" }
            );
        }
        ChapterCommand::SetBase { chapter, text, file } => {
            let text = text_arg(text, file.as_deref())?.context("No text given")?;
            ws.state.set_base_text(chapter, &text)?;
            ws.save().await;
            println!("Saved base text of chapter {chapter}");
        }
        ChapterCommand::EditContent {
            chapter,
            producer,
            text,
            file,
        } => {
            let text = text_arg(text, file.as_deref())?.context("No text given")?;
            ws.state.update_content_text(chapter, producer, &text)?;
            ws.save().await;
            println!("Updated {producer} text of chapter {chapter}");
        }
        ChapterCommand::RemoveContent {
            chapter,
            producer,
            yes,
        } => {
            let name = ws
                .state
                .require_chapter(chapter)?
                .content_by(producer)
                .map(|item| item.producer_name.clone())
                .with_context(|| format!("No content by {producer} in chapter {chapter}"))?;
            if !yes {
                bail!("Deleting the \"{name}\" text cannot be undone; pass --yes to confirm");
            }
            ws.state.remove_content(chapter, producer)?;
            ws.save().await;
            println!("Removed \"{name}\" text from chapter {chapter}");
        }
        ChapterCommand::Show { chapter, full } => {
            let chapter = ws.state.require_chapter(chapter)?;
            println!("{}", chapter.title);
            for item in &chapter.contents {
                println!("\n== {} ({})", item.producer_name, item.producer);
                if full {
                    println!("{}", item.text);
                } else {
                    println!("{}", preview(&item.text, 100));
                }
            }
            for translation in &chapter.translations {
                println!("\n== Traducción: {}", translation.language);
                if full {
                    println!("{}", translation.text);
                } else {
                    println!("{}", preview(&translation.text, 100));
                }
            }
        }
    }
    Ok(())
}
