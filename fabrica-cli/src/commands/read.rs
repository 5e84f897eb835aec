//! Reader command implementation

use super::Workspace;
use anyhow::{bail, Result};
use clap::Args;
use fabrica_core::annotation::Segment;
use fabrica_core::preferences::{Theme, View};
use fabrica_core::reader::{PageBody, ReaderSession};
use fabrica_core::types::{AnnotationKind, BookId, ChapterId};

#[derive(Args)]
pub struct ReadArgs {
    /// Book id (defaults to the selected book)
    book: Option<BookId>,

    /// Open at this chapter
    #[arg(short, long, conflicts_with = "page")]
    chapter: Option<ChapterId>,

    /// Open at this chapter number (1-based)
    #[arg(short, long)]
    page: Option<usize>,

    /// Increase the font size one step
    #[arg(long, conflicts_with = "smaller")]
    larger: bool,

    /// Decrease the font size one step
    #[arg(long)]
    smaller: bool,

    /// Color theme (claro, oscuro, sepia)
    #[arg(long)]
    theme: Option<Theme>,

    /// Mark highlights and notes in the output
    #[arg(long)]
    marks: bool,
}

pub async fn read(ws: &mut Workspace, args: ReadArgs) -> Result<()> {
    let Some(book_id) = args.book.or(ws.state.preferences().selected_book) else {
        bail!("No book given and none selected (see `book select`)");
    };

    let mut session = ReaderSession::open(&ws.state, book_id, args.chapter)?;
    if let Some(page) = args.page {
        let total = ws.state.chapters_of(book_id).len();
        if page == 0 || page > total {
            bail!("Chapter number must be between 1 and {total}");
        }
        session.go_to(&ws.state, page - 1);
    }

    let theme = args.theme;
    let adjust = (args.larger || args.smaller).then_some(args.larger);
    ws.state.update_preferences(|p| {
        p.active_view = View::Reader;
        p.selected_book = Some(book_id);
        if let Some(theme) = theme {
            p.reader.theme = theme;
        }
        if let Some(larger) = adjust {
            p.reader.adjust_font(larger);
        }
    });
    ws.save().await;

    let reader = ws.state.preferences().reader;
    let page = session.page(&ws.state)?;
    println!("{}", page.book.title);
    println!(
        "Capítulo {} de {}: {}",
        page.position + 1,
        page.total,
        page.chapter.title
    );
    tracing::debug!(font_size = reader.font_size, theme = %reader.theme, "reader settings");
    println!();

    match &page.body {
        PageBody::Segments(segments) if args.marks => println!("{}", marked(segments)),
        body => println!("{}", body.text()),
    }

    println!();
    let mut footer = Vec::new();
    if page.has_previous() {
        footer.push(format!("previous: --page {}", page.position));
    }
    if page.has_next() {
        footer.push(format!("next: --page {}", page.position + 2));
    }
    footer.push(format!("font {} / {}", reader.font_size, reader.theme));
    println!("{}", footer.join("  |  "));
    Ok(())
}

/// Page text with highlights in `[[...]]` and notes in `{{...}}` followed by the note
fn marked(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match &segment.mark {
            None => segment.text.clone(),
            Some(mark) => match mark.kind {
                AnnotationKind::Highlight => format!("[[{}]]", segment.text),
                AnnotationKind::Note => format!(
                    "{{{{{}}}}}({})",
                    segment.text,
                    mark.note.as_deref().unwrap_or_default()
                ),
            },
        })
        .collect()
}
