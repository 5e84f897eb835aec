//! Annotation commands

use super::Workspace;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use fabrica_core::annotation::{resolve_selection, Selection, SelectionPoint, TextRange};
use fabrica_core::reader::{render_chapter, PageBody};
use fabrica_core::types::{AnnotationId, AnnotationKind, ChapterId};

#[derive(Subcommand)]
pub enum AnnotateCommand {
    /// Show a chapter's text as segments with their character offsets
    List {
        /// Chapter id
        chapter: ChapterId,
    },

    /// Highlight a range of the base text
    Highlight(RangeArgs),

    /// Attach a note to a range of the base text
    Note {
        #[command(flatten)]
        range: RangeArgs,

        /// Note text
        #[arg(short, long)]
        note: String,
    },

    /// Remove an annotation
    Remove {
        /// Chapter id
        chapter: ChapterId,

        /// Annotation id
        annotation: AnnotationId,

        /// Confirm deleting a note
        #[arg(long)]
        yes: bool,
    },
}

/// A range given either as absolute offsets or as points on listed segments
#[derive(Args)]
pub struct RangeArgs {
    /// Chapter id
    chapter: ChapterId,

    /// First character (0-based)
    #[arg(long, requires = "end", conflicts_with_all = ["from", "to"])]
    start: Option<usize>,

    /// One past the last character
    #[arg(long)]
    end: Option<usize>,

    /// Selection start as SEGMENT:OFFSET, as shown by `annotate list`
    #[arg(long, requires = "to", value_parser = parse_point)]
    from: Option<SelectionPoint>,

    /// Selection end as SEGMENT:OFFSET
    #[arg(long, value_parser = parse_point)]
    to: Option<SelectionPoint>,
}

fn parse_point(s: &str) -> Result<SelectionPoint, String> {
    let (segment, offset) = s
        .split_once(':')
        .ok_or_else(|| format!("expected SEGMENT:OFFSET, got `{s}`"))?;
    let number = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|_| format!("`{v}` is not a number"))
    };
    Ok(SelectionPoint {
        segment: number(segment)?,
        offset: number(offset)?,
    })
}

impl RangeArgs {
    fn resolve(&self, ws: &Workspace) -> Result<TextRange> {
        match (self.start, self.end, self.from, self.to) {
            (Some(start), Some(end), _, _) => Ok(TextRange::new(start, end)),
            (_, _, Some(anchor), Some(focus)) => {
                let chapter = ws.state.require_chapter(self.chapter)?;
                let PageBody::Segments(segments) = render_chapter(chapter) else {
                    bail!("Chapter {} has no base text to annotate", self.chapter);
                };
                resolve_selection(&segments, &Selection { anchor, focus })
                    .context("The selection is empty or outside the chapter text")
            }
            _ => bail!("Give --start/--end or --from/--to"),
        }
    }
}

pub async fn run(ws: &mut Workspace, cmd: AnnotateCommand) -> Result<()> {
    match cmd {
        AnnotateCommand::List { chapter } => {
            let chapter = ws.state.require_chapter(chapter)?;
            let PageBody::Segments(segments) = render_chapter(chapter) else {
                println!("{}", PageBody::Empty.text());
                return Ok(());
            };
            for (i, segment) in segments.iter().enumerate() {
                let label = match &segment.mark {
                    None => String::new(),
                    Some(mark) => match &mark.note {
                        Some(note) => format!("  [{} {}: {}]", mark.kind, mark.id, note),
                        None => format!("  [{} {}]", mark.kind, mark.id),
                    },
                };
                println!(
                    "{i:>3} {:>6}..{:<6} {:?}{label}",
                    segment.start, segment.end, segment.text
                );
            }
        }
        AnnotateCommand::Highlight(range) => {
            let chapter = range.chapter;
            let text_range = range.resolve(ws)?;
            let id = ws
                .state
                .add_annotation(chapter, text_range, AnnotationKind::Highlight, None)?;
            ws.save().await;
            println!("Added highlight {id}");
        }
        AnnotateCommand::Note { range, note } => {
            let chapter = range.chapter;
            let text_range = range.resolve(ws)?;
            let id = ws.state.add_annotation(
                chapter,
                text_range,
                AnnotationKind::Note,
                Some(&note),
            )?;
            ws.save().await;
            println!("Added note {id}");
        }
        AnnotateCommand::Remove {
            chapter,
            annotation,
            yes,
        } => {
            let target = ws
                .state
                .require_chapter(chapter)?
                .annotations
                .iter()
                .find(|a| a.id == annotation)
                .with_context(|| format!("Annotation {annotation} not found in chapter {chapter}"))?;
            if target.kind == AnnotationKind::Note && !yes {
                bail!(
                    "Deleting the note \"{}\" on \"{}\" cannot be undone; pass --yes to confirm",
                    target.note.as_deref().unwrap_or_default(),
                    target.text
                );
            }
            let removed = ws.state.remove_annotation(chapter, annotation)?;
            ws.save().await;
            println!("Removed {} \"{}\"", removed.kind, removed.text);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(
            parse_point("2:5"),
            Ok(SelectionPoint {
                segment: 2,
                offset: 5
            })
        );
        assert!(parse_point("2").is_err());
        assert!(parse_point("a:1").is_err());
    }
}
