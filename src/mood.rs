//! Mood interpretation: free-text mood descriptions to a target mood vector.
//!
//! Maps mood text plus intensity flags to a (valence, energy) target, a list
//! of catalog search terms, and four metadata preferences. The rule-based
//! path is pure and deterministic. An externally inferred hint, when one is
//! available and well-formed, overrides the rule-based values; anything less
//! than a well-formed hint leaves the rule-based result untouched.
//!
//! # Examples
//!
//! ```
//! use moodqueue::mood::{interpret, HintOutcome};
//!
//! let interp = interpret("sad lonely night", false, false, HintOutcome::Unavailable);
//! assert!(interp.vector.valence < 0.5);
//! assert_eq!(interp.search_terms[0], "sad lonely night");
//! ```

use serde::Deserialize;
use std::collections::HashSet;

/// Maximum number of search terms carried into the catalog query.
const MAX_SEARCH_TERMS: usize = 10;

/// Per-keyword-set adjustment applied to valence or energy.
const KEYWORD_DELTA: f64 = 0.2;
/// Energy adjustment for the `intense`/`soft` flags.
const FLAG_ENERGY_DELTA: f64 = 0.2;
/// Valence adjustment for the `intense`/`soft` flags.
const FLAG_VALENCE_DELTA: f64 = 0.05;

lazy_static::lazy_static! {
    static ref NEGATIVE_WORDS: HashSet<&'static str> =
        ["sad", "cry", "lonely", "alone", "hurt", "broken", "melancholy", "melancholic"]
            .into_iter().collect();
    static ref POSITIVE_WORDS: HashSet<&'static str> =
        ["happy", "joy", "euphoric", "victory", "celebration", "party"]
            .into_iter().collect();
    static ref LOW_ENERGY_WORDS: HashSet<&'static str> =
        ["chill", "sleep", "calm", "midnight", "night", "late"]
            .into_iter().collect();
    static ref HIGH_ENERGY_WORDS: HashSet<&'static str> =
        ["hype", "rage", "workout", "gym", "dance", "party", "run"]
            .into_iter().collect();

    static ref POPULAR_WORDS: HashSet<&'static str> =
        ["hits", "popular", "mainstream", "bangers", "anthems"]
            .into_iter().collect();
    static ref OBSCURE_WORDS: HashSet<&'static str> =
        ["underground", "obscure", "deep", "rare", "b-sides"]
            .into_iter().collect();
    static ref RECENT_WORDS: HashSet<&'static str> =
        ["new", "recent", "latest", "fresh", "2020s", "2023", "2024", "2025"]
            .into_iter().collect();
    static ref CLASSIC_WORDS: HashSet<&'static str> =
        ["classic", "retro", "throwback", "old-school", "90s", "80s", "70s", "2000s"]
            .into_iter().collect();
}

/// Clamp a value into the unit interval.
#[inline]
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// A target mood as a point in valence/energy space.
///
/// Both components are always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodVector {
    /// Emotional positivity, 0.0 (negative) to 1.0 (positive).
    pub valence: f64,
    /// Perceived intensity, 0.0 (calm) to 1.0 (intense).
    pub energy: f64,
}

impl MoodVector {
    /// Build a vector with both components clamped into range.
    #[must_use]
    pub fn new(valence: f64, energy: f64) -> Self {
        Self {
            valence: clamp01(valence),
            energy: clamp01(energy),
        }
    }
}

/// Everything the pipeline derives from the mood text, computed once per
/// request and shared read-only across all candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodInterpretation {
    pub vector: MoodVector,
    /// Search terms, original input text always first. At most
    /// [`MAX_SEARCH_TERMS`] entries.
    pub search_terms: Vec<String>,
    pub prefer_popular: bool,
    pub prefer_obscure: bool,
    pub prefer_recent: bool,
    pub prefer_classics: bool,
}

/// Structured hint from the external inference service.
///
/// A hint whose vector values fall outside `[0, 1]` is rejected wholesale;
/// its other fields are not trusted either.
#[derive(Debug, Clone, Deserialize)]
pub struct MoodHint {
    pub valence: f64,
    pub energy: f64,
    #[serde(default)]
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub prefer_popular: Option<bool>,
    #[serde(default)]
    pub prefer_obscure: Option<bool>,
    #[serde(default)]
    pub prefer_recent: Option<bool>,
    #[serde(default)]
    pub prefer_classics: Option<bool>,
}

impl MoodHint {
    /// A hint is usable only when its vector is already in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.valence) && (0.0..=1.0).contains(&self.energy)
    }
}

/// Result of asking the external inference service for a hint.
///
/// A tagged outcome rather than a nullable hint, so the merge in
/// [`interpret`] is exhaustive: there is no way to observe a half-failed
/// hint.
#[derive(Debug, Clone)]
pub enum HintOutcome {
    Hint(MoodHint),
    Unavailable,
}

/// Interpret a mood description into a [`MoodInterpretation`].
///
/// Never fails: whatever the text, flags, or hint, the result is usable.
/// Valence and energy start neutral at (0.5, 0.5), shift by fixed keyword
/// and flag deltas, and end clamped to `[0, 1]`. Both flags may be set at
/// once; their deltas stack.
#[must_use]
pub fn interpret(text: &str, intense: bool, soft: bool, hint: HintOutcome) -> MoodInterpretation {
    let base = interpret_rules(text, intense, soft);
    match hint {
        HintOutcome::Hint(hint) if hint.is_valid() => base.with_hint(&hint),
        HintOutcome::Hint(_) => {
            log::warn!("Discarding out-of-range inference hint; keeping rule-based interpretation");
            base
        }
        HintOutcome::Unavailable => base,
    }
}

fn interpret_rules(text: &str, intense: bool, soft: bool) -> MoodInterpretation {
    let lowered = text.to_lowercase().replace(',', " ");
    let tokens: HashSet<&str> = lowered.split_whitespace().collect();

    let mut valence = 0.5;
    let mut energy = 0.5;

    // Keyword sets combine additively; a text can hit several at once.
    if intersects(&tokens, &NEGATIVE_WORDS) {
        valence -= KEYWORD_DELTA;
    }
    if intersects(&tokens, &POSITIVE_WORDS) {
        valence += KEYWORD_DELTA;
    }
    if intersects(&tokens, &LOW_ENERGY_WORDS) {
        energy -= KEYWORD_DELTA;
    }
    if intersects(&tokens, &HIGH_ENERGY_WORDS) {
        energy += KEYWORD_DELTA;
    }

    if intense {
        energy += FLAG_ENERGY_DELTA;
        valence += FLAG_VALENCE_DELTA;
    }
    if soft {
        energy -= FLAG_ENERGY_DELTA;
        valence -= FLAG_VALENCE_DELTA;
    }

    let mut search_terms = vec![text.to_string()];
    if intense {
        search_terms.push("intense".to_string());
    }
    if soft {
        search_terms.push("acoustic".to_string());
        search_terms.push("chill".to_string());
    }

    MoodInterpretation {
        vector: MoodVector::new(valence, energy),
        search_terms,
        prefer_popular: intersects(&tokens, &POPULAR_WORDS),
        prefer_obscure: intersects(&tokens, &OBSCURE_WORDS),
        prefer_recent: intersects(&tokens, &RECENT_WORDS),
        prefer_classics: intersects(&tokens, &CLASSIC_WORDS),
    }
}

fn intersects(tokens: &HashSet<&str>, words: &HashSet<&'static str>) -> bool {
    tokens.iter().any(|token| words.contains(token))
}

impl MoodInterpretation {
    /// Merge a validated hint into a new interpretation.
    ///
    /// Hint values replace the rule-based vector; preference flags present
    /// in the hint replace the rule-based ones; extra search terms append
    /// after dedup, with the combined list truncated so the original text
    /// stays the first entry.
    fn with_hint(&self, hint: &MoodHint) -> MoodInterpretation {
        let mut search_terms = self.search_terms.clone();
        for term in &hint.search_terms {
            let term = term.trim();
            if term.is_empty() || search_terms.iter().any(|existing| existing == term) {
                continue;
            }
            search_terms.push(term.to_string());
        }
        search_terms.truncate(MAX_SEARCH_TERMS);

        MoodInterpretation {
            vector: MoodVector::new(hint.valence, hint.energy),
            search_terms,
            prefer_popular: hint.prefer_popular.unwrap_or(self.prefer_popular),
            prefer_obscure: hint.prefer_obscure.unwrap_or(self.prefer_obscure),
            prefer_recent: hint.prefer_recent.unwrap_or(self.prefer_recent),
            prefer_classics: hint.prefer_classics.unwrap_or(self.prefer_classics),
        }
    }
}
