//! Mood-to-queue music recommendations from catalog metadata.
//!
//! Core modules:
//! - [`mood`] - Mood interpretation (text + flags to a valence/energy target)
//! - [`algorithm`] - Metadata scoring and candidate ranking
//! - [`queue`] - Selection, arc ordering, and pipeline orchestration
//! - [`catalog`] - Catalog Web API search client
//! - [`infer`] - Optional external mood-inference hint client
//!
//! ### Supporting Modules
//!
//! - [`config`] - Configuration loading (env + optional config file)
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use moodqueue::catalog::CatalogClient;
//! use moodqueue::queue::{generate_queue, QueueRequest};
//!
//! let config = moodqueue::config::load()?;
//! let catalog = CatalogClient::new(config.catalog)?;
//!
//! let mut request = QueueRequest::new("rainy midnight drive");
//! request.soft = true;
//!
//! let result = generate_queue(&catalog, None, &request)?;
//! println!("{} tracks. {}", result.tracks.len(), result.summary);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Pipeline Overview
//!
//! One request flows through five pure stages after a single catalog
//! search:
//!
//! 1. **Interpretation**: mood text + flags become a (valence, energy)
//!    target, search terms, and metadata preferences. An optional external
//!    inference hint can override the rule-based reading; when it is
//!    missing or malformed the rules stand, silently.
//! 2. **Scoring**: each candidate gets a synthetic (valence, energy)
//!    estimate from popularity, release year, and title/album wording.
//! 3. **Ranking**: candidates are stably sorted by a popularity-based rank
//!    score shaped by the metadata preferences.
//! 4. **Selection**: either the top N tracks, or the ranked prefix whose
//!    total runtime best matches a duration target within ±3 minutes.
//! 5. **Arc ordering**: the selection is reordered by ascending energy so
//!    the queue rises gently; the summary line describes the valence arc.
//!
//! ## Error Handling
//!
//! Only an unreachable catalog surfaces as an error
//! ([`catalog::CatalogError`]). Zero search results, missing metadata
//! fields, and failed inference calls are all absorbed: they shape the
//! queue and its summary instead of failing the request.
//!
//! ## Logging
//!
//! All modules log through the `log` facade; the binary installs
//! `env_logger`, controlled via `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=debug moodqueue queue "gym anthems"
//! RUST_LOG=moodqueue::queue=trace moodqueue queue "chill evening"
//! ```

pub mod algorithm;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod infer;
pub mod mood;
pub mod queue;
