//! # MoodQueue - mood-to-queue CLI
//!
//! Turns a free-text mood description into an ordered queue of tracks from
//! an external music catalog, using metadata-only scoring.
//!
//! ## Architecture
//!
//! - `cli`: Command-line interface definitions
//! - `mood`: Mood interpretation (rule-based, optionally hint-enriched)
//! - `algorithm`: Metadata scoring and ranking
//! - `queue`: Selection and arc ordering
//! - `catalog`: Catalog Web API client
//! - `infer`: Optional mood-inference client
//! - `config`: Configuration loading
//!
//! ## Usage
//!
//! ```bash
//! # Generate a 12-track queue
//! moodqueue queue "rainy midnight drive"
//!
//! # Target a total runtime instead of a track count
//! moodqueue queue "gym anthems" --intense --minutes 45
//!
//! # Inspect raw catalog metadata
//! moodqueue search "blinding lights"
//!
//! # See the interpretation without building a queue
//! moodqueue interpret "underground classic night"
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::info;

use moodqueue::catalog::{Candidate, CatalogClient, CatalogSearch};
use moodqueue::infer::{InferenceClient, MoodInference};
use moodqueue::mood::{self, HintOutcome, MoodInterpretation};
use moodqueue::queue::{self, QueueRequest, QueueResult};
use moodqueue::{cli, completion, config};

/// Main entry point for the MoodQueue application.
///
/// Initializes logging, parses command-line arguments, and routes commands
/// to the appropriate module functions. Errors are propagated with context
/// and displayed by anyhow.
///
/// Logging is controlled via `RUST_LOG`, e.g.
/// `RUST_LOG=debug moodqueue queue "gym anthems"`.
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Queue { mood, length, minutes, intense, soft, no_infer } => {
            let cfg = config::load()?;
            let catalog = CatalogClient::new(cfg.catalog)?;
            let inference = build_inference(cfg.inference, no_infer)?;

            let request = QueueRequest {
                mood_text: mood,
                length: usize::from(length),
                duration_minutes: minutes,
                intense,
                soft,
            };
            info!("Generating queue for mood: {:?}", request.mood_text);

            let result = queue::generate_queue(
                &catalog,
                inference.as_ref().map(|client| client as &dyn MoodInference),
                &request,
            )?;
            render_queue(&result);
        }
        cli::Command::Search { query, limit } => {
            let cfg = config::load()?;
            let catalog = CatalogClient::new(cfg.catalog)?;

            info!("Inspecting catalog metadata for: {query:?}");
            let candidates = catalog.search_tracks(&query, usize::from(limit))?;
            render_candidates(&query, &candidates);
        }
        cli::Command::Interpret { mood, intense, soft, no_infer } => {
            let cfg = config::load()?;
            let inference = build_inference(cfg.inference, no_infer)?;

            let hint = match inference.as_ref() {
                Some(client) => client.infer(&mood, intense, soft),
                None => HintOutcome::Unavailable,
            };
            let interpretation = mood::interpret(&mood, intense, soft, hint);
            render_interpretation(&mood, &interpretation);
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
    }

    Ok(())
}

/// Build the inference client when it is both configured and wanted.
fn build_inference(cfg: config::InferenceConfig, no_infer: bool) -> Result<Option<InferenceClient>> {
    if no_infer || cfg.api_key.is_none() {
        return Ok(None);
    }
    Ok(Some(InferenceClient::new(cfg)?))
}

/// Eight-cell bar for a 0-1 value, e.g. "█████···".
fn bar(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * 8.0).round() as usize;
    "█".repeat(filled) + &"·".repeat(8 - filled)
}

/// Character-safe truncation with a "..." tail.
fn truncated(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// "m:ss" for a millisecond duration, "?:??" when unknown.
fn format_duration(duration_ms: Option<u64>) -> String {
    match duration_ms {
        Some(ms) => {
            let total_seconds = ms / 1000;
            format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
        }
        None => "?:??".to_string(),
    }
}

fn render_queue(result: &QueueResult) {
    println!(
        "Mood: {:?}  valence {:.2}  energy {:.2}",
        result.mood_text, result.mood_vector.valence, result.mood_vector.energy
    );

    if result.tracks.is_empty() {
        println!("No suitable tracks found for that mood.");
        println!("{}", result.summary);
        return;
    }

    println!(
        "{:>3}  {:<32} {:<22} {:<15} {:<15} {}",
        "#", "Track", "Artist", "Valence", "Energy", "URI"
    );
    for (idx, track) in result.tracks.iter().enumerate() {
        println!(
            "{:>3}  {:<32} {:<22} {:.2} {} {:.2} {} {}",
            idx + 1,
            truncated(&track.name, 32),
            truncated(&track.artists, 22),
            track.valence,
            bar(track.valence),
            track.energy,
            bar(track.energy),
            truncated(&track.uri, 32),
        );
    }

    println!("{}", result.summary);
}

fn render_candidates(query: &str, candidates: &[Candidate]) {
    println!("Top matches for {query:?}:");
    if candidates.is_empty() {
        println!("No tracks found for that query.");
        return;
    }

    println!(
        "{:>3}  {:<32} {:<22} {:<22} {:>5} {:>10} {:>8}",
        "#", "Name", "Artists", "Album", "Year", "Popularity", "Length"
    );
    for (idx, candidate) in candidates.iter().enumerate() {
        println!(
            "{:>3}  {:<32} {:<22} {:<22} {:>5} {:>10} {:>8}",
            idx + 1,
            truncated(&candidate.name, 32),
            truncated(&candidate.artist_line(), 22),
            truncated(&candidate.album, 22),
            candidate.release_year().map_or_else(|| "----".to_string(), |y| y.to_string()),
            candidate.popularity.map_or_else(|| "?".to_string(), |p| p.to_string()),
            format_duration(candidate.duration_ms),
        );
    }
}

fn render_interpretation(mood: &str, interpretation: &MoodInterpretation) {
    println!("Mood: {mood:?}");
    println!(
        "  valence {:.2} {}",
        interpretation.vector.valence,
        bar(interpretation.vector.valence)
    );
    println!(
        "  energy  {:.2} {}",
        interpretation.vector.energy,
        bar(interpretation.vector.energy)
    );
    println!(
        "  prefer: popular={} obscure={} recent={} classics={}",
        interpretation.prefer_popular,
        interpretation.prefer_obscure,
        interpretation.prefer_recent,
        interpretation.prefer_classics
    );
    println!("  search terms: {}", interpretation.search_terms.join(" | "));
}
