//! Benchmarks for the response-extraction heuristics.
//!
//! Run with: cargo bench -p spotlight-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use spotlight_core::inference::{extract_canonical_text, extract_coordinates, extract_description};

fn benchmark_coordinates_json(c: &mut Criterion) {
    let text = "Sure! Here are the coordinates:\n```json\n{\"x\": 640, \"y\": 360}\n```";

    c.bench_function("coordinates_json_object", |b| {
        b.iter(|| extract_coordinates(black_box(text)))
    });
}

fn benchmark_coordinates_scan(c: &mut Criterion) {
    let text = "The main character stands slightly left of centre, around 412.5 by 298 pixels.";

    c.bench_function("coordinates_number_scan", |b| {
        b.iter(|| extract_coordinates(black_box(text)))
    });
}

fn benchmark_canonical_text(c: &mut Criterion) {
    let messages = json!({
        "messages": [
            {"role": "user", "content": "where?"},
            {"role": "assistant", "content": [{"type": "text", "text": "{\"x\": 1, \"y\": 2}"}]}
        ]
    });
    let candidates = json!({
        "candidates": [{"content": {"parts": [{"text": "{\"x\": 1, \"y\": 2}"}]}}]
    });

    c.bench_function("canonical_text_messages", |b| {
        b.iter(|| extract_canonical_text(black_box(&messages)))
    });
    c.bench_function("canonical_text_candidates", |b| {
        b.iter(|| extract_canonical_text(black_box(&candidates)))
    });
}

fn benchmark_description_fallback(c: &mut Criterion) {
    let body = json!({"unknown": {"nested": [1, 2, 3]}, "_timing": {"api_call_duration_seconds": 1.5}});

    c.bench_function("description_pretty_fallback", |b| {
        b.iter(|| extract_description(black_box(&body)))
    });
}

criterion_group!(
    benches,
    benchmark_coordinates_json,
    benchmark_coordinates_scan,
    benchmark_canonical_text,
    benchmark_description_fallback,
);
criterion_main!(benches);
