//! Application orchestration and command routing.
//!
//! Parses command-line arguments and delegates to the command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Scrolling amplitude waveform in the terminal
#[derive(Parser)]
#[command(name = "wavegraph")]
#[command(version)]
#[command(about = "Scrolling amplitude waveform in the terminal")]
#[command(long_about = "Scrolling amplitude waveform in the terminal.\n\nA live capture scrolls right to left with a time label every few seconds.\nStop it to get the whole capture as a pannable, zoomable graph.\n\nDEFAULT COMMAND:\n    If no command is specified, 'live' is used by default.\n\nEXAMPLES:\n    # Start a live capture\n    $ wavegraph\n\n    # Capture and save the samples when stopped\n    $ wavegraph live --save take.toml\n\n    # Look at a saved capture\n    $ wavegraph view take.toml\n\n    # Stop a running capture from another shell\n    $ pkill -USR1 wavegraph")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavegraph/wavegraph.toml\n    Logs:               ~/.local/state/wavegraph/wavegraph.log.*"
)]
struct Cli {
    /// Save the capture to FILE when it stops (live default command)
    #[arg(short, long, value_name = "FILE", global = true)]
    save: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live capture with a scrolling graph (default)
    ///
    /// Space pauses, Enter stops and shows the full graph, Escape/q quits.
    #[command(visible_alias = "l")]
    Live {
        /// Save the capture to FILE when it stops
        #[arg(short, long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Show a saved capture as a pannable full graph
    ///
    /// Arrow keys or mouse drag pan, +/- zoom, Escape/q quits.
    #[command(visible_alias = "v")]
    View {
        /// Capture file written by `wavegraph live --save`
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries
    ///
    /// Displays the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   wavegraph completions bash > wavegraph.bash
    ///   wavegraph completions zsh > _wavegraph
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need neither logging nor config.
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavegraph", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None => commands::handle_live(cli.save)?,
        // Explicit subcommand options take precedence over the top-level ones.
        Some(Commands::Live { save }) => commands::handle_live(save.or(cli.save))?,
        Some(Commands::View { file }) => commands::handle_view(&file)?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_takes_save() {
        let cli = Cli::try_parse_from(["wavegraph", "--save", "take.toml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.save, Some(PathBuf::from("take.toml")));
    }

    #[test]
    fn test_view_requires_file() {
        assert!(Cli::try_parse_from(["wavegraph", "view"]).is_err());
        let cli = Cli::try_parse_from(["wavegraph", "v", "take.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::View { .. })));
    }
}
