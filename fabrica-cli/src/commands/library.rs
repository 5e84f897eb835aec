//! Library command implementation

use super::{preview, Workspace};
use anyhow::Result;
use clap::Args;
use fabrica_core::filter::{library_view, LibraryFilter};
use fabrica_core::types::{video_embed_url, BookId, ChapterId, GroupId, MediaKind, Producer};
use serde_json::json;

#[derive(Args)]
pub struct LibraryArgs {
    /// Book id
    book: BookId,

    /// Only this chapter
    #[arg(short, long)]
    chapter: Option<ChapterId>,

    /// Only content from this producer (base, multicultural, or an artisan id)
    #[arg(short, long)]
    producer: Option<Producer>,

    /// Only content from the members of this group
    #[arg(short, long)]
    group: Option<GroupId>,

    /// Print full texts instead of previews
    #[arg(long)]
    full: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn library(ws: &Workspace, args: LibraryArgs) -> Result<()> {
    let book = ws.state.require_book(args.book)?;
    let filter = LibraryFilter {
        chapter: args.chapter,
        producer: args.producer,
        group: args.group,
    };
    let views = library_view(&ws.state, book.id, filter);

    if args.json {
        let chapters: Vec<_> = views
            .iter()
            .map(|view| {
                json!({
                    "id": view.chapter.id,
                    "title": view.chapter.title,
                    "contents": view.contents,
                    "translations": view.translations,
                    "media": {
                        "video": view.chapter.media(MediaKind::Video),
                        "audio": view.chapter.media(MediaKind::Audio),
                        "pdf": view.chapter.media(MediaKind::Pdf),
                    },
                })
            })
            .collect();
        let output = json!({ "book": book.title, "chapters": chapters });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", book.title);
    if views.is_empty() {
        println!("\nNothing matches these filters");
        return Ok(());
    }

    let text = |t: &str| {
        if args.full {
            t.to_string()
        } else {
            preview(t, 100)
        }
    };

    for view in &views {
        println!("\n# {} [{}]", view.chapter.title, view.chapter.id);
        for item in &view.contents {
            println!("  == {}", item.producer_name);
            println!("  {}", text(&item.text));
        }
        for translation in &view.translations {
            println!("  == Traducción: {}", translation.language);
            println!("  {}", text(&translation.text));
        }
        for kind in MediaKind::ALL {
            for item in view.chapter.media(kind) {
                let link = match kind {
                    MediaKind::Video => video_embed_url(&item.url).unwrap_or_else(|| item.url.clone()),
                    _ => item.url.clone(),
                };
                println!("  [{kind}] {} <{link}>", item.name);
            }
        }
    }
    Ok(())
}
