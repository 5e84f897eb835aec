//! Book commands

use super::{text_arg, Workspace};
use anyhow::{bail, Result};
use clap::Subcommand;
use fabrica_core::filter::{filter_books, CollectionFilter};
use fabrica_core::state::BookUpdate;
use fabrica_core::types::BookId;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum BookCommand {
    /// List books
    List {
        /// Collection filter: todas, ninguna, or a collection id
        #[arg(short, long, default_value = "todas")]
        collection: CollectionFilter,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a book with one chapter per line of the index
    Create {
        /// Book title
        #[arg(short, long)]
        title: String,

        /// Chapter index, one title per line
        #[arg(short, long, required_unless_present = "index_file")]
        index: Option<String>,

        /// Read the chapter index from a file
        #[arg(long, conflicts_with = "index")]
        index_file: Option<PathBuf>,

        /// Cover image URL
        #[arg(long, default_value = "")]
        cover: String,
    },

    /// Show a book and its chapters
    Show {
        /// Book id
        book: BookId,
    },

    /// Change a book's title or cover
    Edit {
        /// Book id
        book: BookId,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        cover: Option<String>,
    },

    /// Delete a book and all of its chapters
    Delete {
        /// Book id
        book: BookId,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Put a book in a collection
    Assign {
        /// Book id
        book: BookId,

        /// Collection id
        #[arg(short, long, required_unless_present = "none")]
        collection: Option<fabrica_core::types::CollectionId>,

        /// Take the book out of its collection
        #[arg(long, conflicts_with = "collection")]
        none: bool,
    },

    /// Make a book the working book
    Select {
        /// Book id
        book: BookId,
    },
}

#[derive(Serialize)]
struct BookRow<'a> {
    id: BookId,
    title: &'a str,
    collection: Option<&'a str>,
    chapters: usize,
    completed: usize,
}

pub async fn run(ws: &mut Workspace, cmd: BookCommand) -> Result<()> {
    match cmd {
        BookCommand::List { collection, json } => list(ws, collection, json),
        BookCommand::Create {
            title,
            index,
            index_file,
            cover,
        } => {
            let index = text_arg(index, index_file.as_deref())?.unwrap_or_default();
            let id = ws.state.create_book(&title, &index, &cover)?;
            ws.save().await;
            let chapters = ws.state.chapters_of(id).len();
            println!("Created book {id} with {chapters} chapters");
            Ok(())
        }
        BookCommand::Show { book } => show(ws, book),
        BookCommand::Edit { book, title, cover } => {
            if title.is_none() && cover.is_none() {
                bail!("Nothing to change: pass --title and/or --cover");
            }
            ws.state.update_book(
                book,
                BookUpdate {
                    title,
                    cover_url: cover,
                },
            )?;
            ws.save().await;
            println!("Updated book {book}");
            Ok(())
        }
        BookCommand::Delete { book, yes } => {
            let title = ws.state.require_book(book)?.title.clone();
            if !yes {
                bail!("Deleting \"{title}\" cannot be undone; pass --yes to confirm");
            }
            ws.state.delete_book(book)?;
            ws.save().await;
            println!("Deleted book \"{title}\"");
            Ok(())
        }
        BookCommand::Assign {
            book,
            collection,
            none,
        } => {
            let target = if none { None } else { collection };
            ws.state.assign_collection(book, target)?;
            ws.save().await;
            match target {
                Some(id) => println!("Book {book} is now in collection {id}"),
                None => println!("Book {book} is no longer in a collection"),
            }
            Ok(())
        }
        BookCommand::Select { book } => {
            ws.state.select_book(Some(book))?;
            ws.save().await;
            println!("Selected book {book}");
            Ok(())
        }
    }
}

fn list(ws: &Workspace, filter: CollectionFilter, json: bool) -> Result<()> {
    let rows: Vec<BookRow> = filter_books(&ws.state, filter)
        .into_iter()
        .map(|book| {
            let chapters = ws.state.chapters_of(book.id);
            BookRow {
                id: book.id,
                title: &book.title,
                collection: book
                    .collection_id
                    .and_then(|id| ws.state.collection(id))
                    .map(|c| c.name.as_str()),
                chapters: chapters.len(),
                completed: chapters.iter().filter(|c| c.completed).count(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No books found");
        return Ok(());
    }
    let selected = ws.state.preferences().selected_book;
    for row in rows {
        let marker = if selected == Some(row.id) { "*" } else { " " };
        print!(
            "{marker} {:<15} {}  ({}/{} chapters done)",
            row.id, row.title, row.completed, row.chapters
        );
        match row.collection {
            Some(name) => println!("  [{name}]"),
            None => println!(),
        }
    }
    Ok(())
}

fn show(ws: &Workspace, id: BookId) -> Result<()> {
    let book = ws.state.require_book(id)?;
    println!("Title:      {}", book.title);
    if !book.cover_url.is_empty() {
        println!("Cover:      {}", book.cover_url);
    }
    println!("Created:    {}", book.created_at.format("%Y-%m-%d"));
    if let Some(collection) = book.collection_id.and_then(|c| ws.state.collection(c)) {
        println!("Collection: {}", collection.name);
    }
    println!("Chapters:");
    for (i, chapter) in ws.state.chapters_of(id).iter().enumerate() {
        let done = if chapter.completed { "x" } else { " " };
        println!(
            "  {:>2}. [{done}] {:<15} {}  ({} texts, {} translations)",
            i + 1,
            chapter.id,
            chapter.title,
            chapter.contents.len(),
            chapter.translations.len()
        );
    }
    Ok(())
}
