//! Metadata-driven scoring for catalog candidates.
//!
//! The catalog exposes no real acoustic features, so the scorer synthesizes
//! a plausible (valence, energy) estimate per track from popularity, release
//! year, and title/album wording, anchored at the interpreted mood target.
//! A separate rank score orders candidates before selection and is
//! independent of the synthetic estimate.

use crate::mood::{clamp01, MoodInterpretation};

/// Release years are normalized inside this window; anything outside is
/// clamped to its edge.
const YEAR_WINDOW: (i32, i32) = (1970, 2025);

/// Wording that marks a track as likely high-energy, matched as substrings
/// of the combined track + album text.
const HIGH_ENERGY_TOKENS: [&str; 9] = [
    "remix", "club", "bass", "trap", "drum", "dubstep", "live", "edit", "mix",
];

/// Wording that marks a track as likely low-energy.
const LOW_ENERGY_TOKENS: [&str; 7] = [
    "acoustic", "piano", "ambient", "lofi", "unplugged", "ballad", "instrumental",
];

/// Immutable weight configuration for the synthetic estimate.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    /// Valence shift per unit of (year_norm - 0.5).
    pub year_valence: f64,
    /// Valence shift per unit of (pop_norm - 0.5).
    pub pop_valence: f64,
    /// Energy shift per unit of (pop_norm - 0.5). Popularity moves energy
    /// more than valence.
    pub pop_energy: f64,
    /// Energy shift per unit of (year_norm - 0.5).
    pub year_energy: f64,
    /// Energy adjustment when the text hits a lexical set.
    pub text_energy: f64,
    /// Valence adjustment when the text hits a lexical set.
    pub text_valence: f64,
    /// Shift applied per active metadata preference.
    pub preference_nudge: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            year_valence: 0.20,
            pop_valence: 0.15,
            pop_energy: 0.40,
            year_energy: 0.25,
            text_energy: 0.15,
            text_valence: 0.05,
            preference_nudge: 0.05,
        }
    }
}

/// Synthesize a (valence, energy) estimate for one candidate.
///
/// Pure and total: every input combination yields a clamped pair. Missing
/// popularity normalizes to 0.0 (scored as unpopular), while a missing year
/// normalizes to the window midpoint 0.5 — the two defaults differ on
/// purpose, and changing either silently reorders queues.
///
/// The high- and low-energy text checks are independent; a title matching
/// both sets receives both adjustments and nets to zero from that step.
#[must_use]
pub fn estimate(
    interp: &MoodInterpretation,
    popularity: Option<u32>,
    year: Option<i32>,
    text: &str,
    weights: &ScoringWeights,
) -> (f64, f64) {
    let pop_norm = popularity.map_or(0.0, |p| clamp01(f64::from(p) / 100.0));
    let year_norm = year.map_or(0.5, |y| {
        let clamped = y.clamp(YEAR_WINDOW.0, YEAR_WINDOW.1);
        f64::from(clamped - YEAR_WINDOW.0) / f64::from(YEAR_WINDOW.1 - YEAR_WINDOW.0)
    });

    let mut valence = interp.vector.valence
        + weights.year_valence * (year_norm - 0.5)
        + weights.pop_valence * (pop_norm - 0.5);
    let mut energy = interp.vector.energy
        + weights.pop_energy * (pop_norm - 0.5)
        + weights.year_energy * (year_norm - 0.5);

    let lowered = text.to_lowercase();
    if HIGH_ENERGY_TOKENS.iter().any(|token| lowered.contains(token)) {
        energy += weights.text_energy;
        valence += weights.text_valence;
    }
    if LOW_ENERGY_TOKENS.iter().any(|token| lowered.contains(token)) {
        energy -= weights.text_energy;
        valence -= weights.text_valence;
    }

    if interp.prefer_obscure {
        energy -= weights.preference_nudge;
    }
    if interp.prefer_popular {
        energy += weights.preference_nudge;
    }
    if interp.prefer_classics {
        valence -= weights.preference_nudge;
    }
    if interp.prefer_recent {
        valence += weights.preference_nudge;
    }

    (clamp01(valence), clamp01(energy))
}

/// Rank score used to order candidates before selection.
///
/// Unbounded; only meaningful as a descending sort key. Base score is the
/// raw popularity (missing counts as 0). Preference modifiers are
/// independent and stack. A missing year counts as 2000, which zeroes the
/// recency term. Callers must sort stably so equal scores keep the
/// catalog's result order.
#[must_use]
pub fn rank_score(popularity: Option<u32>, year: Option<i32>, interp: &MoodInterpretation) -> f64 {
    let pop = popularity.map_or(0.0, f64::from);
    let year = f64::from(year.unwrap_or(2000));

    let mut score = pop;
    if interp.prefer_recent {
        score += (year - 2000.0) * 0.2;
    }
    if interp.prefer_classics {
        score -= (year - 2000.0) * 0.2;
    }
    if interp.prefer_obscure {
        score -= pop * 0.5;
    }
    if interp.prefer_popular {
        score += pop * 0.5;
    }
    score
}
