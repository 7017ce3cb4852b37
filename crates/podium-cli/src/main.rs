//! Podium CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use podium_cli::cli::{Cli, Commands};
use podium_cli::commands::{self, Console};
use podium_cli::repl::Repl;

fn main() {
    let cli = Cli::parse();
    let state_dir = cli.state_dir();
    let loaded = podium_core::config::load_env_files(&state_dir);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();
    tracing::debug!(files = ?loaded, "Loaded env files");

    if let Err(e) = podium_core::config::ensure_state_dir(&state_dir) {
        tracing::warn!(error = %e, "Failed to create state directory");
    }

    let result = Console::new(&cli).and_then(|console| match cli.command {
        Some(Commands::Repl) | None => run_repl(&state_dir, console),
        Some(cmd) => commands::execute(cmd, &console),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_repl(state_dir: &std::path::Path, console: Console) -> commands::Result<()> {
    let mut repl = Repl::new(state_dir, console)?;
    repl.run()?;
    Ok(())
}
