//! # MoodQueue Performance Benchmarks
//!
//! Benchmarks for the pipeline hot paths: mood interpretation, per-candidate
//! scoring, and duration-window selection.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run a specific benchmark
//! cargo bench estimate
//! ```

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use moodqueue::algorithm::{estimate, rank_score, ScoringWeights};
use moodqueue::mood::{interpret, HintOutcome};
use moodqueue::queue::{select_by_duration, QueueTrack};

/// Synthetic metadata rows with varied popularity, year, and wording.
fn candidate_rows(count: u32) -> Vec<(Option<u32>, Option<i32>, String)> {
    (0..count)
        .map(|i| {
            let popularity = if i % 11 == 0 { None } else { Some((i * 7) % 101) };
            let year = if i % 13 == 0 { None } else { Some(1970 + ((i * 3) % 56) as i32) };
            let text = match i % 4 {
                0 => format!("Track {i} Club Remix"),
                1 => format!("Track {i} Acoustic Session"),
                _ => format!("Track {i} Album {}", i % 10),
            };
            (popularity, year, text)
        })
        .collect()
}

fn synthetic_tracks(count: u32) -> Vec<QueueTrack> {
    (0..count)
        .map(|i| QueueTrack {
            name: format!("Track {i}"),
            artists: format!("Artist {}", i % 20),
            uri: format!("spotify:track:bench{i}"),
            valence: f64::from(i % 100) / 100.0,
            energy: f64::from((i * 37) % 100) / 100.0,
            popularity: Some((i * 7) % 101),
            year: Some(1970 + ((i * 3) % 56) as i32),
            duration_ms: if i % 9 == 0 { None } else { Some(u64::from(120 + (i * 17) % 240) * 1000) },
        })
        .collect()
}

fn benchmark_interpretation(c: &mut Criterion) {
    c.bench_function("interpret_mood", |b| {
        b.iter(|| {
            interpret(
                black_box("underground classic night drive"),
                false,
                true,
                HintOutcome::Unavailable,
            )
        });
    });
}

fn benchmark_scoring(c: &mut Criterion) {
    let interpretation = interpret("happy party", false, false, HintOutcome::Unavailable);
    let weights = ScoringWeights::default();
    let rows = candidate_rows(100);

    c.bench_function("estimate_100_candidates", |b| {
        b.iter(|| {
            for (popularity, year, text) in &rows {
                black_box(estimate(&interpretation, *popularity, *year, text, &weights));
            }
        });
    });

    c.bench_function("rank_100_candidates", |b| {
        b.iter(|| {
            for (popularity, year, _) in &rows {
                black_box(rank_score(*popularity, *year, &interpretation));
            }
        });
    });
}

fn benchmark_selection(c: &mut Criterion) {
    let tracks = synthetic_tracks(200);

    c.bench_function("select_by_duration_200_tracks", |b| {
        b.iter(|| black_box(select_by_duration(black_box(&tracks), 60)));
    });
}

criterion_group!(
    benches,
    benchmark_interpretation,
    benchmark_scoring,
    benchmark_selection
);
criterion_main!(benches);
