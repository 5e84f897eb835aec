//! Segment rendering benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use fabrica_core::annotation::render_segments;
use fabrica_core::types::{Annotation, AnnotationKind, EntityId};
use std::hint::black_box;

fn chapter_text() -> String {
    "Érase una vez un taller donde las palabras se pulían como piedras. ".repeat(400)
}

fn annotations(text_len: usize, count: usize) -> Vec<Annotation> {
    let stride = text_len / count;
    (0..count)
        .map(|i| Annotation {
            id: EntityId::new(i as u64),
            kind: if i % 2 == 0 {
                AnnotationKind::Highlight
            } else {
                AnnotationKind::Note
            },
            start: i * stride,
            end: i * stride + stride / 2,
            text: String::new(),
            note: None,
        })
        .rev()
        .collect()
}

fn segments_benchmark(c: &mut Criterion) {
    let text = chapter_text();
    let len = text.chars().count();
    let few = annotations(len, 10);
    let many = annotations(len, 500);
    let none: Vec<Annotation> = Vec::new();

    c.bench_function("render_segments/plain", |b| {
        b.iter(|| render_segments(black_box(&text), black_box(&none)))
    });
    c.bench_function("render_segments/10", |b| {
        b.iter(|| render_segments(black_box(&text), black_box(&few)))
    });
    c.bench_function("render_segments/500", |b| {
        b.iter(|| render_segments(black_box(&text), black_box(&many)))
    });
}

criterion_group!(benches, segments_benchmark);
criterion_main!(benches);
