//! Property tests for annotation placement and segment rendering

use fabrica_core::annotation::{char_len, place_annotation, render_segments, TextRange};
use fabrica_core::types::{Annotation, AnnotationKind, EntityId};
use fabrica_core::AnnotationError;
use proptest::prelude::*;

/// Place as many of `ranges` as the placement rules allow
fn annotate(text: &str, ranges: &[(usize, usize)]) -> Vec<Annotation> {
    let mut placed: Vec<Annotation> = Vec::new();
    for (i, &(a, b)) in ranges.iter().enumerate() {
        let range = TextRange::new(a.min(b), a.max(b));
        if let Ok(annotation) = place_annotation(
            EntityId::new(i as u64 + 1),
            text,
            &placed,
            range,
            AnnotationKind::Highlight,
            None,
        ) {
            placed.push(annotation);
        }
    }
    placed
}

proptest! {
    #[test]
    fn segments_concatenate_to_original(
        text in "[a-zñé ]{0,60}",
        ranges in prop::collection::vec((0usize..70, 0usize..70), 0..12),
    ) {
        let annotations = annotate(&text, &ranges);
        let segments = render_segments(&text, &annotations);

        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        prop_assert_eq!(joined, text.clone());

        let mut cursor = 0;
        for segment in &segments {
            prop_assert_eq!(segment.start, cursor);
            prop_assert!(segment.end > segment.start);
            cursor = segment.end;
        }
        prop_assert_eq!(cursor, char_len(&text));
        prop_assert_eq!(
            segments.iter().filter(|s| !s.is_plain()).count(),
            annotations.len()
        );
    }

    #[test]
    fn placed_annotations_never_overlap(
        text in "[a-z ]{1,50}",
        ranges in prop::collection::vec((0usize..50, 0usize..50), 0..15),
    ) {
        let annotations = annotate(&text, &ranges);
        for (i, a) in annotations.iter().enumerate() {
            for b in &annotations[i + 1..] {
                prop_assert!(!a.overlaps(b.start, b.end));
            }
        }
    }

    #[test]
    fn intersecting_range_is_rejected(
        text in "[a-z]{10,40}",
        start in 0usize..5,
        len in 1usize..5,
        shift in 0usize..4,
    ) {
        let first = place_annotation(
            EntityId::new(1),
            &text,
            &[],
            TextRange::new(start, start + len),
            AnnotationKind::Highlight,
            None,
        )
        .unwrap();

        let inner_start = start + shift.min(len - 1);
        let result = place_annotation(
            EntityId::new(2),
            &text,
            std::slice::from_ref(&first),
            TextRange::new(inner_start, inner_start + 1),
            AnnotationKind::Note,
            Some("nota".to_string()),
        );
        prop_assert_eq!(result.unwrap_err(), AnnotationError::Overlap(EntityId::new(1)));
    }
}
