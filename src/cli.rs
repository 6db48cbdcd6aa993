//! Command-line interface definitions using Clap derive macros.
//!
//! ## Commands
//!
//! - `queue`: run the mood-to-queue pipeline and print the result
//! - `search`: inspect raw catalog metadata for a query
//! - `interpret`: show how a mood description is interpreted
//! - `completion`: generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! moodqueue queue "rainy midnight drive" --soft
//! moodqueue queue "gym anthems" --intense --minutes 45
//! moodqueue search "blinding lights"
//! ```

use clap::{Parser, Subcommand, ValueEnum};

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// Uses Clap derive macros to automatically generate argument parsing,
/// help text, and validation. All functionality is accessed through
/// subcommands.
#[derive(Parser)]
#[command(name = "moodqueue")]
#[command(about = "MoodQueue: mood-to-queue music recommendations from catalog metadata")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate an ordered queue for a mood
    ///
    /// Interprets the mood description into a valence/energy target,
    /// searches the catalog, ranks the results by metadata, and prints the
    /// final queue ordered as a gentle rise in energy.
    Queue {
        /// Mood description, e.g. "rainy midnight drive"
        mood: String,

        /// Desired queue length (8-30)
        #[arg(
            short = 'n',
            long,
            default_value_t = 12,
            value_parser = clap::value_parser!(u16).range(8..=30)
        )]
        length: u16,

        /// Target total runtime in minutes (overrides --length; the result
        /// lands within 3 minutes of the target when the catalog allows it)
        #[arg(long)]
        minutes: Option<u32>,

        /// Bias toward higher energy
        #[arg(long)]
        intense: bool,

        /// Bias toward lower energy, gentler vibes
        #[arg(long)]
        soft: bool,

        /// Skip the external inference hint even when it is configured
        #[arg(long)]
        no_infer: bool,
    },

    /// Inspect raw catalog metadata for a query
    ///
    /// Prints the top matches with the metadata the pipeline scores on
    /// (year, popularity, duration). Useful for understanding why a track
    /// landed where it did in a queue.
    Search {
        /// Song or song + artist, e.g. "blinding lights the weeknd"
        query: String,

        /// How many top matches to inspect (1-10)
        #[arg(
            long,
            default_value_t = 3,
            value_parser = clap::value_parser!(u8).range(1..=10)
        )]
        limit: u8,
    },

    /// Show how a mood description is interpreted
    ///
    /// Prints the mood vector, metadata preferences, and search terms that
    /// the pipeline would use, without running a catalog search.
    Interpret {
        /// Mood description, e.g. "rainy midnight drive"
        mood: String,

        /// Bias toward higher energy
        #[arg(long)]
        intense: bool,

        /// Bias toward lower energy, gentler vibes
        #[arg(long)]
        soft: bool,

        /// Skip the external inference hint even when it is configured
        #[arg(long)]
        no_infer: bool,
    },

    /// Generate shell completions
    ///
    /// Usage: moodqueue completion bash > ~/.local/share/bash-completion/completions/moodqueue
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_queue_defaults() {
        let args = Args::try_parse_from(["moodqueue", "queue", "late night drive"])
            .expect("parses");
        match args.command {
            Command::Queue { mood, length, minutes, intense, soft, no_infer } => {
                assert_eq!(mood, "late night drive");
                assert_eq!(length, 12);
                assert_eq!(minutes, None);
                assert!(!intense && !soft && !no_infer);
            }
            _ => panic!("expected queue command"),
        }
    }

    #[test]
    fn test_queue_length_bounds() {
        assert!(Args::try_parse_from(["moodqueue", "queue", "m", "-n", "7"]).is_err());
        assert!(Args::try_parse_from(["moodqueue", "queue", "m", "-n", "31"]).is_err());
        assert!(Args::try_parse_from(["moodqueue", "queue", "m", "-n", "30"]).is_ok());
    }

    #[test]
    fn test_search_limit_bounds() {
        assert!(Args::try_parse_from(["moodqueue", "search", "q", "--limit", "0"]).is_err());
        assert!(Args::try_parse_from(["moodqueue", "search", "q", "--limit", "10"]).is_ok());
    }
}
