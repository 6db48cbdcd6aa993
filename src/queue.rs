//! Queue assembly: ranking, selection, and arc ordering.
//!
//! Consumes one catalog search per request and produces the final ordered
//! queue. Two mutually exclusive selection modes exist: fixed count (take
//! the top N ranked tracks) and duration window (take the ranked prefix
//! whose total runtime best matches a target, within ±3 minutes). Either
//! way, the selection is then reordered by ascending energy so the queue
//! rises gently.
//!
//! Everything here is free of I/O and shared state; the only fallible step
//! is the catalog search itself.

use std::cmp::Ordering;

use log::{debug, info, warn};

use crate::algorithm::{self, ScoringWeights};
use crate::catalog::{CatalogError, CatalogSearch};
use crate::infer::MoodInference;
use crate::mood::{self, HintOutcome, MoodVector};

/// Default number of tracks for fixed-count selection.
pub const DEFAULT_LENGTH: usize = 12;

/// Allowed deviation around a duration target.
const DURATION_TOLERANCE_MS: u64 = 3 * 60 * 1000;

/// Floor for how many candidates one search requests.
const MIN_SEARCH_LIMIT: usize = 40;

/// One track of the final queue, with its synthetic mood estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueTrack {
    pub name: String,
    /// Artists joined for display ("A, B").
    pub artists: String,
    pub uri: String,
    pub valence: f64,
    pub energy: f64,
    pub popularity: Option<u32>,
    pub year: Option<i32>,
    pub duration_ms: Option<u64>,
}

/// Terminal output of the pipeline for one request.
#[derive(Debug, Clone)]
pub struct QueueResult {
    pub mood_text: String,
    pub mood_vector: MoodVector,
    pub tracks: Vec<QueueTrack>,
    pub summary: String,
}

/// Parameters for one mood-to-queue request.
///
/// When `duration_minutes` is set it takes precedence over `length`.
#[derive(Debug, Clone)]
pub struct QueueRequest {
    pub mood_text: String,
    pub length: usize,
    pub duration_minutes: Option<u32>,
    pub intense: bool,
    pub soft: bool,
}

impl QueueRequest {
    #[must_use]
    pub fn new(mood_text: impl Into<String>) -> Self {
        Self {
            mood_text: mood_text.into(),
            length: DEFAULT_LENGTH,
            duration_minutes: None,
            intense: false,
            soft: false,
        }
    }
}

/// Run the full mood-to-queue pipeline.
///
/// The inference collaborator is optional; without one (or whenever it
/// cannot produce a hint) interpretation is purely rule-based. The only
/// error surfaced to the caller is a failed catalog search — an empty
/// result set is a normal outcome and yields an empty queue with a
/// descriptive summary.
pub fn generate_queue(
    catalog: &dyn CatalogSearch,
    inference: Option<&dyn MoodInference>,
    request: &QueueRequest,
) -> Result<QueueResult, CatalogError> {
    let hint = match inference {
        Some(service) => service.infer(&request.mood_text, request.intense, request.soft),
        None => HintOutcome::Unavailable,
    };
    let interpretation = mood::interpret(&request.mood_text, request.intense, request.soft, hint);
    debug!(
        "Interpreted {:?} as valence {:.2}, energy {:.2}",
        request.mood_text, interpretation.vector.valence, interpretation.vector.energy
    );

    let query = interpretation.search_terms.join(" ");
    let limit = (request.length * 3).max(MIN_SEARCH_LIMIT);
    let candidates = catalog.search_tracks(&query, limit)?;
    info!("Catalog search returned {} candidates for {query:?}", candidates.len());

    if candidates.is_empty() {
        return Ok(QueueResult {
            mood_text: request.mood_text.clone(),
            mood_vector: interpretation.vector,
            tracks: Vec::new(),
            summary: "No tracks found for this mood.".to_string(),
        });
    }

    let weights = ScoringWeights::default();
    let mut scored: Vec<(f64, QueueTrack)> = candidates
        .iter()
        .map(|candidate| {
            let year = candidate.release_year();
            let text = format!("{} {}", candidate.name, candidate.album);
            let (valence, energy) =
                algorithm::estimate(&interpretation, candidate.popularity, year, &text, &weights);
            let rank = algorithm::rank_score(candidate.popularity, year, &interpretation);
            let track = QueueTrack {
                name: candidate.name.clone(),
                artists: candidate.artist_line(),
                uri: candidate.uri.clone(),
                valence,
                energy,
                popularity: candidate.popularity,
                year,
                duration_ms: candidate.duration_ms,
            };
            (rank, track)
        })
        .collect();

    // Stable: equal rank scores keep the catalog's result order.
    scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    let ranked: Vec<QueueTrack> = scored.into_iter().map(|(_, track)| track).collect();

    let mut selection = match request.duration_minutes {
        Some(minutes) => select_by_duration(&ranked, minutes),
        None => select_by_count(&ranked, request.length),
    };
    order_by_energy(&mut selection);

    let summary = summarize(&selection);
    Ok(QueueResult {
        mood_text: request.mood_text.clone(),
        mood_vector: interpretation.vector,
        tracks: selection,
        summary,
    })
}

/// Fixed-count selection: the first `length` ranked tracks, never fewer
/// than one as long as any candidate exists.
#[must_use]
pub fn select_by_count(ranked: &[QueueTrack], length: usize) -> Vec<QueueTrack> {
    ranked.iter().take(length.max(1)).cloned().collect()
}

#[derive(Debug, Clone, Copy)]
struct PrefixFit {
    len: usize,
    total_ms: u64,
    diff: u64,
    within: bool,
}

impl PrefixFit {
    fn new(len: usize, total_ms: u64, target_ms: u64) -> Self {
        let diff = total_ms.abs_diff(target_ms);
        Self {
            len,
            total_ms,
            diff,
            within: diff <= DURATION_TOLERANCE_MS,
        }
    }
}

/// Running-best update rule for duration selection, written out case by
/// case:
///
/// | candidate  | best so far | outcome                                    |
/// |------------|-------------|--------------------------------------------|
/// | in window  | outside     | replace                                    |
/// | outside    | in window   | keep                                       |
/// | in window  | in window   | replace on `diff <=` (ties: longer prefix) |
/// | outside    | outside     | replace on `diff <`  (ties: shorter stays) |
fn prefix_replaces_best(candidate: &PrefixFit, best: &PrefixFit) -> bool {
    match (candidate.within, best.within) {
        (true, false) => true,
        (false, true) => false,
        (true, true) => candidate.diff <= best.diff,
        (false, false) => candidate.diff < best.diff,
    }
}

/// Duration-window selection: the ranked prefix whose total runtime best
/// matches the target.
///
/// Walks every prefix of the ranked list keeping a running best; the
/// length-1 prefix initializes it unconditionally. The walk never stops at
/// the first in-window hit — a later prefix can still be a strictly better
/// match. A track with no known duration contributes 0 ms to the running
/// total, which can quietly shorten the effective runtime of the result;
/// when every duration is unknown the selection collapses to a single
/// track.
#[must_use]
pub fn select_by_duration(ranked: &[QueueTrack], target_minutes: u32) -> Vec<QueueTrack> {
    let Some(first) = ranked.first() else {
        return Vec::new();
    };

    let target_ms = u64::from(target_minutes) * 60 * 1000;
    let mut total_ms = first.duration_ms.unwrap_or(0);
    let mut best = PrefixFit::new(1, total_ms, target_ms);

    for (idx, track) in ranked.iter().enumerate().skip(1) {
        if track.duration_ms.is_none() {
            warn!("Track {:?} has no duration; it adds 0ms to the running total", track.name);
        }
        total_ms += track.duration_ms.unwrap_or(0);
        let fit = PrefixFit::new(idx + 1, total_ms, target_ms);
        if prefix_replaces_best(&fit, &best) {
            best = fit;
        }
    }

    debug!(
        "Duration selection: {} tracks totalling {}ms against a {}min target (within window: {})",
        best.len, best.total_ms, target_minutes, best.within
    );
    ranked[..best.len].to_vec()
}

/// Reorder the selection in place by ascending energy.
///
/// Stable, so tracks with equal energy keep their ranking order. Runs after
/// selection and never changes which tracks were chosen, only their
/// presentation sequence.
pub fn order_by_energy(selection: &mut [QueueTrack]) {
    selection.sort_by(|a, b| a.energy.partial_cmp(&b.energy).unwrap_or(Ordering::Equal));
}

fn summarize(selection: &[QueueTrack]) -> String {
    match (selection.first(), selection.last()) {
        (Some(first), Some(last)) => format!(
            "This queue starts at valence {:.2} and moves toward {:.2} (energy rises gently).",
            first.valence, last.valence
        ),
        _ => "Generated an empty queue.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, duration_min: Option<u64>) -> QueueTrack {
        QueueTrack {
            name: name.to_string(),
            artists: "Test Artist".to_string(),
            uri: format!("spotify:track:{name}"),
            valence: 0.5,
            energy: 0.5,
            popularity: Some(50),
            year: Some(2010),
            duration_ms: duration_min.map(|m| m * 60 * 1000),
        }
    }

    /// Durations 3, 4, 5, 2, 6 minutes, already in ranking order.
    fn fixture() -> Vec<QueueTrack> {
        vec![
            track("a", Some(3)),
            track("b", Some(4)),
            track("c", Some(5)),
            track("d", Some(2)),
            track("e", Some(6)),
        ]
    }

    #[test]
    fn test_select_by_count_takes_prefix() {
        let ranked = fixture();
        let selection = select_by_count(&ranked, 3);
        assert_eq!(selection.len(), 3);
        assert_eq!(selection[0].name, "a");
        assert_eq!(selection[2].name, "c");
    }

    #[test]
    fn test_select_by_count_never_empty_with_candidates() {
        let ranked = fixture();
        assert_eq!(select_by_count(&ranked, 0).len(), 1);
        assert_eq!(select_by_count(&ranked, 100).len(), ranked.len());
        assert!(select_by_count(&[], 5).is_empty());
    }

    #[test]
    fn test_duration_prefers_smallest_in_window_diff() {
        // Running totals 3, 7, 12, 14, 20 against a 10min target: both 7
        // (diff 3) and 12 (diff 2) are inside ±3; the closer total wins
        // even though it appears later.
        let selection = select_by_duration(&fixture(), 10);
        assert_eq!(selection.len(), 3);
        let total: u64 = selection.iter().filter_map(|t| t.duration_ms).sum();
        assert_eq!(total, 12 * 60 * 1000);
    }

    #[test]
    fn test_duration_equal_diff_prefers_later_prefix() {
        // Against a 5min target, totals 3 (diff 2) and 7 (diff 2) are both
        // inside ±3 with equal diffs; the longer prefix must win.
        let selection = select_by_duration(&fixture(), 5);
        assert_eq!(selection.len(), 2);
        let total: u64 = selection.iter().filter_map(|t| t.duration_ms).sum();
        assert_eq!(total, 7 * 60 * 1000);
    }

    #[test]
    fn test_duration_scans_to_the_end_of_the_list() {
        // Target 20min: every prefix before the last is outside the window,
        // and the full list is an exact match.
        let selection = select_by_duration(&fixture(), 20);
        assert_eq!(selection.len(), 5);
    }

    #[test]
    fn test_duration_all_unknown_degrades_to_one_track() {
        let ranked = vec![track("a", None), track("b", None), track("c", None)];
        let selection = select_by_duration(&ranked, 10);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].name, "a");
    }

    #[test]
    fn test_duration_mixed_unknown_counts_zero() {
        // 3min, unknown, 6min -> totals 3, 3, 9. Target 9: exact match at
        // the full prefix.
        let ranked = vec![track("a", Some(3)), track("b", None), track("c", Some(6))];
        let selection = select_by_duration(&ranked, 9);
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn test_duration_empty_list_yields_empty_selection() {
        assert!(select_by_duration(&[], 10).is_empty());
    }

    #[test]
    fn test_order_by_energy_is_stable_ascending() {
        let mut selection = vec![
            QueueTrack { energy: 0.9, ..track("hot", Some(3)) },
            QueueTrack { energy: 0.2, ..track("cool-1", Some(3)) },
            QueueTrack { energy: 0.2, ..track("cool-2", Some(3)) },
            QueueTrack { energy: 0.5, ..track("mid", Some(3)) },
        ];
        order_by_energy(&mut selection);
        let names: Vec<&str> = selection.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["cool-1", "cool-2", "mid", "hot"]);
    }

    #[test]
    fn test_summary_describes_arc() {
        let mut selection = vec![
            QueueTrack { valence: 0.31, energy: 0.2, ..track("a", Some(3)) },
            QueueTrack { valence: 0.74, energy: 0.8, ..track("b", Some(3)) },
        ];
        order_by_energy(&mut selection);
        let summary = summarize(&selection);
        assert!(summary.contains("0.31"));
        assert!(summary.contains("0.74"));

        assert_eq!(summarize(&[]), "Generated an empty queue.");
    }
}
