//! Annotation placement and segment rendering for the reader
//!
//! The reader shows a chapter's base text as a sequence of [`Segment`]s:
//! plain runs interleaved with highlighted or annotated runs. A user
//! selection is expressed against those rendered segments and resolved back
//! to absolute character offsets in the full chapter text.
//!
//! Ranges are half-open (`[start, end)`) and count Unicode scalar values.
//! Two ranges conflict when `start < other.end && end > other.start`, so
//! ranges that only touch at a boundary may coexist.

use crate::error::AnnotationError;
use crate::types::{Annotation, AnnotationId, AnnotationKind};

/// Absolute character range in a chapter's base text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// The annotation a rendered segment belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMark {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    pub note: Option<String>,
}

/// A run of the chapter text, either plain or covered by one annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub mark: Option<SegmentMark>,
}

impl Segment {
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_plain(&self) -> bool {
        self.mark.is_none()
    }
}

/// One end of a selection: a character offset inside a rendered segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPoint {
    pub segment: usize,
    pub offset: usize,
}

/// A selection made on rendered segments. Anchor may come after focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: SelectionPoint,
    pub focus: SelectionPoint,
}

/// Byte offset of every char boundary, plus the end of the string
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into ordered, non-overlapping segments.
///
/// Annotations outside the text or overlapping an earlier one are skipped,
/// so the concatenated segment texts always equal `text`.
pub fn render_segments(text: &str, annotations: &[Annotation]) -> Vec<Segment> {
    let bounds = char_boundaries(text);
    let len = bounds.len() - 1;
    let slice = |start: usize, end: usize| text[bounds[start]..bounds[end]].to_string();

    let mut ordered: Vec<&Annotation> = annotations
        .iter()
        .filter(|a| a.start < a.end && a.end <= len)
        .collect();
    ordered.sort_by_key(|a| (a.start, a.end));

    let mut segments = Vec::with_capacity(ordered.len() * 2 + 1);
    let mut cursor = 0;
    for annotation in ordered {
        if annotation.start < cursor {
            tracing::debug!(id = %annotation.id, "skipping annotation overlapping an earlier one");
            continue;
        }
        if annotation.start > cursor {
            segments.push(Segment {
                start: cursor,
                end: annotation.start,
                text: slice(cursor, annotation.start),
                mark: None,
            });
        }
        segments.push(Segment {
            start: annotation.start,
            end: annotation.end,
            text: slice(annotation.start, annotation.end),
            mark: Some(SegmentMark {
                id: annotation.id,
                kind: annotation.kind,
                note: annotation.note.clone(),
            }),
        });
        cursor = annotation.end;
    }
    if cursor < len {
        segments.push(Segment {
            start: cursor,
            end: len,
            text: slice(cursor, len),
            mark: None,
        });
    }
    segments
}

/// Map a selection on rendered segments to an absolute range.
///
/// Returns `None` when either end lies outside the rendered segments or the
/// selection is collapsed.
pub fn resolve_selection(segments: &[Segment], selection: &Selection) -> Option<TextRange> {
    let absolute = |point: &SelectionPoint| {
        let segment = segments.get(point.segment)?;
        (point.offset <= segment.char_len()).then_some(segment.start + point.offset)
    };

    let a = absolute(&selection.anchor)?;
    let b = absolute(&selection.focus)?;
    let range = TextRange::new(a.min(b), a.max(b));
    (!range.is_empty()).then_some(range)
}

/// Check that `range` may be annotated in a text of `text_len` characters
pub fn check_placement(
    text_len: usize,
    existing: &[Annotation],
    range: TextRange,
) -> Result<(), AnnotationError> {
    if range.is_empty() {
        return Err(AnnotationError::EmptyRange);
    }
    if range.end > text_len {
        return Err(AnnotationError::OutOfBounds {
            start: range.start,
            end: range.end,
            len: text_len,
        });
    }
    match existing.iter().find(|a| a.overlaps(range.start, range.end)) {
        Some(conflict) => Err(AnnotationError::Overlap(conflict.id)),
        None => Ok(()),
    }
}

/// Build a new annotation over `range` of `text`, rejecting conflicts
pub fn place_annotation(
    id: AnnotationId,
    text: &str,
    existing: &[Annotation],
    range: TextRange,
    kind: AnnotationKind,
    note: Option<String>,
) -> Result<Annotation, AnnotationError> {
    let bounds = char_boundaries(text);
    check_placement(bounds.len() - 1, existing, range)?;

    Ok(Annotation {
        id,
        kind,
        start: range.start,
        end: range.end,
        text: text[bounds[range.start]..bounds[range.end]].to_string(),
        note: match kind {
            AnnotationKind::Note => note,
            AnnotationKind::Highlight => None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityId;

    fn highlight(id: u64, start: usize, end: usize) -> Annotation {
        Annotation {
            id: EntityId::new(id),
            kind: AnnotationKind::Highlight,
            start,
            end,
            text: String::new(),
            note: None,
        }
    }

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_plain_text_is_one_segment() {
        let segments = render_segments("Hello world", &[]);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_plain());
        assert_eq!(segments[0].end, 11);
    }

    #[test]
    fn test_empty_text_has_no_segments() {
        assert!(render_segments("", &[highlight(1, 0, 2)]).is_empty());
    }

    #[test]
    fn test_segments_sorted_and_interleaved() {
        let text = "The quick brown fox";
        let annotations = vec![highlight(2, 10, 15), highlight(1, 4, 9)];
        let segments = render_segments(text, &annotations);

        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["The ", "quick", " ", "brown", " fox"]);
        assert_eq!(segments[1].mark.as_ref().unwrap().id, EntityId::new(1));
        assert_eq!(segments[3].mark.as_ref().unwrap().id, EntityId::new(2));
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_invalid_annotations_are_skipped() {
        let text = "abcdef";
        let annotations = vec![highlight(1, 1, 4), highlight(2, 2, 5), highlight(3, 4, 99)];
        let segments = render_segments(text, &annotations);
        assert_eq!(joined(&segments), text);
        assert_eq!(segments.iter().filter(|s| !s.is_plain()).count(), 1);
    }

    #[test]
    fn test_multibyte_text_uses_char_offsets() {
        let text = "Canción ñandú";
        let annotation = place_annotation(
            EntityId::new(1),
            text,
            &[],
            TextRange::new(8, 13),
            AnnotationKind::Highlight,
            None,
        )
        .unwrap();
        assert_eq!(annotation.text, "ñandú");

        let segments = render_segments(text, &[annotation]);
        assert_eq!(segments[1].text, "ñandú");
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_overlap_rejected() {
        let existing = vec![highlight(7, 5, 10)];
        let result = check_placement(20, &existing, TextRange::new(8, 12));
        assert_eq!(result, Err(AnnotationError::Overlap(EntityId::new(7))));
        let result = check_placement(20, &existing, TextRange::new(0, 20));
        assert_eq!(result, Err(AnnotationError::Overlap(EntityId::new(7))));
    }

    #[test]
    fn test_touching_ranges_are_accepted() {
        let existing = vec![highlight(7, 5, 10)];
        assert!(check_placement(20, &existing, TextRange::new(10, 12)).is_ok());
        assert!(check_placement(20, &existing, TextRange::new(0, 5)).is_ok());
    }

    #[test]
    fn test_empty_and_out_of_bounds_rejected() {
        assert_eq!(
            check_placement(5, &[], TextRange::new(3, 3)),
            Err(AnnotationError::EmptyRange)
        );
        assert!(matches!(
            check_placement(5, &[], TextRange::new(3, 6)),
            Err(AnnotationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_highlight_drops_note_body() {
        let annotation = place_annotation(
            EntityId::new(1),
            "abc",
            &[],
            TextRange::new(0, 1),
            AnnotationKind::Highlight,
            Some("ignored".to_string()),
        )
        .unwrap();
        assert_eq!(annotation.note, None);
    }

    #[test]
    fn test_selection_across_segments() {
        let text = "The quick brown fox";
        let segments = render_segments(text, &[highlight(1, 4, 9)]);
        // From "T|he" in the first segment back to "qu|ick" in the second
        let selection = Selection {
            anchor: SelectionPoint { segment: 1, offset: 2 },
            focus: SelectionPoint { segment: 0, offset: 1 },
        };
        assert_eq!(
            resolve_selection(&segments, &selection),
            Some(TextRange::new(1, 6))
        );
    }

    #[test]
    fn test_selection_outside_container_ignored() {
        let segments = render_segments("abc", &[]);
        let outside = Selection {
            anchor: SelectionPoint { segment: 0, offset: 0 },
            focus: SelectionPoint { segment: 3, offset: 0 },
        };
        assert_eq!(resolve_selection(&segments, &outside), None);

        let past_end = Selection {
            anchor: SelectionPoint { segment: 0, offset: 0 },
            focus: SelectionPoint { segment: 0, offset: 4 },
        };
        assert_eq!(resolve_selection(&segments, &past_end), None);
    }

    #[test]
    fn test_collapsed_selection_ignored() {
        let segments = render_segments("abc", &[]);
        let point = SelectionPoint { segment: 0, offset: 2 };
        let selection = Selection {
            anchor: point,
            focus: point,
        };
        assert_eq!(resolve_selection(&segments, &selection), None);
    }
}
