//! Media attachment and tag commands

use super::Workspace;
use anyhow::Result;
use clap::Subcommand;
use fabrica_core::types::{video_embed_url, ChapterId, MediaItem, MediaKind};

#[derive(Subcommand)]
pub enum MediaCommand {
    /// List a chapter's media
    List {
        /// Chapter id
        chapter: ChapterId,
    },

    /// Attach a media link to a chapter
    Add {
        /// Chapter id
        chapter: ChapterId,

        /// Media kind (video, audio, pdf)
        kind: MediaKind,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        url: String,

        /// Tags, repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Remove a media item by its position in the list
    Remove {
        chapter: ChapterId,
        kind: MediaKind,
        /// 1-based position as shown by `media list`
        position: usize,
    },

    /// Change a media item's name or URL, keeping its tags
    Edit {
        chapter: ChapterId,
        kind: MediaKind,
        /// 1-based position as shown by `media list`
        position: usize,

        #[arg(short, long, required_unless_present = "url")]
        name: Option<String>,

        #[arg(short, long)]
        url: Option<String>,
    },

    /// Replace the tags of a media item
    Retag {
        chapter: ChapterId,
        kind: MediaKind,
        /// 1-based position as shown by `media list`
        position: usize,

        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum TagCommand {
    /// List known tags
    List {
        /// Only this media kind
        kind: Option<MediaKind>,
    },

    /// Add a tag to the known set
    Add { kind: MediaKind, tag: String },

    /// Remove a tag from the known set
    Remove { kind: MediaKind, tag: String },
}

/// Position shown to users is 1-based
fn to_index(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("Positions start at 1"))
}

pub async fn run(ws: &mut Workspace, cmd: MediaCommand) -> Result<()> {
    match cmd {
        MediaCommand::List { chapter } => {
            let chapter = ws.state.require_chapter(chapter)?;
            if !chapter.has_media() {
                println!("No media attached");
            }
            for kind in MediaKind::ALL {
                for (i, item) in chapter.media(kind).iter().enumerate() {
                    println!("{kind} {:>2}. {} <{}>", i + 1, item.name, item.url);
                    if kind == MediaKind::Video {
                        if let Some(embed) = video_embed_url(&item.url) {
                            println!("          player: {embed}");
                        }
                    }
                    if !item.tags.is_empty() {
                        println!("          tags: {}", item.tags.join(", "));
                    }
                }
            }
        }
        MediaCommand::Add {
            chapter,
            kind,
            name,
            url,
            tags,
        } => {
            let mut item = MediaItem::new(name.trim(), url.trim());
            item.tags = tags;
            ws.state.add_media(chapter, kind, item)?;
            let count = ws.state.require_chapter(chapter)?.media(kind).len();
            ws.save().await;
            println!("Attached {kind} #{count} to chapter {chapter}");
        }
        MediaCommand::Remove {
            chapter,
            kind,
            position,
        } => {
            let removed = ws.state.remove_media(chapter, kind, to_index(position)?)?;
            ws.save().await;
            println!("Removed {kind} \"{}\"", removed.name);
        }
        MediaCommand::Edit {
            chapter,
            kind,
            position,
            name,
            url,
        } => {
            ws.state.update_media(
                chapter,
                kind,
                to_index(position)?,
                name.as_deref(),
                url.as_deref(),
            )?;
            ws.save().await;
            println!("Updated {kind} #{position}");
        }
        MediaCommand::Retag {
            chapter,
            kind,
            position,
            tags,
        } => {
            ws.state
                .set_media_tags(chapter, kind, to_index(position)?, tags)?;
            ws.save().await;
            println!("Updated tags of {kind} #{position}");
        }
    }
    Ok(())
}

pub async fn run_tag(ws: &mut Workspace, cmd: TagCommand) -> Result<()> {
    match cmd {
        TagCommand::List { kind } => {
            let kinds: Vec<MediaKind> = match kind {
                Some(kind) => vec![kind],
                None => MediaKind::ALL.to_vec(),
            };
            for kind in kinds {
                let tags = ws.state.media_tags().tags(kind);
                if tags.is_empty() {
                    println!("{kind}: (none)");
                } else {
                    println!("{kind}: {}", tags.join(", "));
                }
            }
        }
        TagCommand::Add { kind, tag } => {
            if ws.state.add_tag(kind, &tag)? {
                ws.save().await;
                println!("Added {kind} tag \"{}\"", tag.trim());
            } else {
                println!("{kind} tag \"{}\" already exists", tag.trim());
            }
        }
        TagCommand::Remove { kind, tag } => {
            if ws.state.remove_tag(kind, &tag) {
                ws.save().await;
                println!("Removed {kind} tag \"{tag}\"");
            } else {
                println!("No {kind} tag \"{tag}\"");
            }
        }
    }
    Ok(())
}
