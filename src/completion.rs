//! Shell completion generation for the CLI.

use std::io;

use clap::Command;
use clap_complete::{generate, Shell as CompletionShell};

use crate::cli::Shell;

/// Map the CLI shell flag onto clap_complete's shell type.
#[must_use]
pub fn shell_to_completion_shell(shell: &Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Write a completion script for `cmd` to stdout.
pub fn generate_completions(shell: CompletionShell, cmd: &mut Command) {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, &mut io::stdout());
}
