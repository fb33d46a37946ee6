//! clipstep - touch-driven, frame-accurate transport control for video clips.
//!
//! The binary offers two ways to drive the transport:
//!
//! 1. **Terminal player** (optional feature): the terminal acts as a touch
//!    surface. Clicks in the left, center and right thirds step back, toggle
//!    play and step forward; a press held in place starts a scrub that follows
//!    the pointer; a quick double click toggles the clip's favorite flag.
//!
//! 2. **Script replay**: a recorded JSON timeline of touch events is pushed
//!    through the same gesture recognizer and controller, and the recognized
//!    gestures plus the final player state are printed.

use clap::{CommandFactory, Parser, Subcommand, builder::PossibleValuesParser};
use clap_complete::{Generator, Shell, generate};
use clipstep::config::SETTABLE_KEYS;
use std::error::Error;
use std::io;

mod cli;

#[cfg(feature = "player")]
mod player;

#[derive(Parser)]
#[command(name = "clipstep")]
#[command(about = "Touch-driven frame-accurate transport control for video clips")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Open the terminal player on a clock-driven clip
    Play {
        /// Clip length in seconds
        #[arg(short, long, default_value_t = 60.0)]
        duration: f64,
        /// Override the configured frame rate
        #[arg(short, long)]
        fps: Option<f64>,
    },
    /// Replay a JSON touch script and report the recognized gestures
    Simulate {
        /// Path to the touch script
        script: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// View current configuration
    View,
    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_parser = PossibleValuesParser::new(SETTABLE_KEYS.iter().copied()))]
        key: String,
        /// Configuration value
        value: String,
    },
    /// Edit configuration file in your editor
    Edit,
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            cli::init::handle_init()?;
        }
        Commands::Config { action } => match action {
            ConfigAction::View => {
                cli::config::handle_config_view()?;
            }
            ConfigAction::Set { key, value } => {
                cli::config::handle_config_set(&key, &value)?;
            }
            ConfigAction::Edit => {
                cli::config::handle_config_edit()?;
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
        Commands::Play { duration, fps } => {
            cli::play::handle_play(duration, fps)?;
        }
        Commands::Simulate { script, json } => {
            cli::simulate::handle_simulate(&script, json)?;
        }
    }

    Ok(())
}
