//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Podium - drive a Keynote presentation with Russian voice commands
#[derive(Parser, Debug)]
#[command(name = "podium")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = "PODIUM_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Use an in-memory demo presentation instead of Keynote
    #[arg(long)]
    pub simulate: bool,

    /// Print turn results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive REPL mode
    Repl,

    /// Handle a single command and exit
    Say {
        /// Command text, e.g. "следующий слайд"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show the presentation state
    Status,

    /// List actions allowed in the current state
    Actions,
}

impl Cli {
    /// Returns the state directory path, using default if not specified.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(podium_core::config::state_dir)
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
