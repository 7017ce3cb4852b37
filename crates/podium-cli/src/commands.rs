//! Command handlers for CLI subcommands.

use std::sync::Arc;

use podium_core::PodiumConfig;
use podium_keynote::{KeynoteBackend, PresentationBackend, SimulatedBackend};
use podium_models::{TurnResult, UserId};
use podium_runtime::{ActionValidator, CommandRouter, RuntimeConfig};
use tokio::runtime::Runtime;
use tracing::info;

use crate::cli::{Cli, Commands};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// A router plus the runtime that drives it from synchronous code.
pub struct Console {
    runtime: Runtime,
    router: CommandRouter,
    json: bool,
}

impl Console {
    /// Builds the pipeline described by the command-line flags.
    pub fn new(cli: &Cli) -> Result<Self> {
        let settings = PodiumConfig::from_env();
        let backend: Arc<dyn PresentationBackend> = if cli.simulate {
            info!("Using simulated presentation");
            Arc::new(SimulatedBackend::demo())
        } else {
            Arc::new(KeynoteBackend::new()?)
        };

        let router = CommandRouter::from_config(&settings, backend, RuntimeConfig::default())?;
        Self::with_router(router, cli.json)
    }

    pub fn with_router(router: CommandRouter, json: bool) -> Result<Self> {
        Ok(Self {
            runtime: Runtime::new()?,
            router,
            json,
        })
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn json(&self) -> bool {
        self.json
    }

    pub fn set_json(&mut self, json: bool) {
        self.json = json;
    }

    /// Handles one command line as the local user.
    pub fn say(&self, text: &str) -> Result<String> {
        let turn = self
            .runtime
            .block_on(self.router.handle_command(UserId::LOCAL, text));
        format_turn(&turn, self.json)
    }

    /// Current presentation state.
    pub fn status(&self) -> Result<String> {
        let snapshot = self.runtime.block_on(self.router.status());
        if self.json {
            return Ok(serde_json::to_string_pretty(&snapshot)?);
        }
        Ok(format!("📊 [{}] {}", snapshot.state, snapshot.status_message()))
    }

    /// Actions the validator allows right now.
    pub fn actions(&self) -> String {
        let snapshot = self.runtime.block_on(self.router.status());
        let mut lines = vec![format!("Доступно в состоянии {}:", snapshot.state)];
        lines.extend(
            ActionValidator::legal_actions(snapshot.state)
                .iter()
                .map(|action| format!("  {:<18} {}", action.as_str(), action.label())),
        );
        lines.join("\n")
    }

    /// Recent commands of the local user, oldest first.
    pub fn history(&self) -> String {
        let session = self.runtime.block_on(self.router.session(UserId::LOCAL));
        if session.history.is_empty() {
            return "История пуста.".to_string();
        }
        session
            .history
            .iter()
            .map(|entry| {
                let mark = match entry.success {
                    Some(true) => "✅",
                    Some(false) => "❌",
                    None => "·",
                };
                format!(
                    "{} {} {} → {}",
                    entry.at.format("%H:%M:%S"),
                    mark,
                    entry.text,
                    entry.action
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Execute a one-shot CLI command.
pub fn execute(command: Commands, console: &Console) -> Result<()> {
    match command {
        Commands::Say { text } => println!("{}", console.say(&text.join(" "))?),
        Commands::Status => println!("{}", console.status()?),
        Commands::Actions => println!("{}", console.actions()),
        Commands::Repl => {
            // REPL is handled separately in main
        }
    }
    Ok(())
}

/// Formats a turn for the terminal.
pub fn format_turn(turn: &TurnResult, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(turn)?);
    }

    let body = match turn {
        TurnResult::Single {
            execution_result: Some(result),
            ..
        } if !result.success => format!("⚠️ {}", result.message),
        TurnResult::Multiple { actions, .. } => actions
            .iter()
            .map(|outcome| match (&outcome.execution_result, &outcome.skipped) {
                (Some(result), _) if result.success => format!("✅ {}", result.message),
                (Some(result), _) => format!("❌ {}", result.message),
                (None, reason) => format!(
                    "⏭ {}: {}",
                    outcome.action.label(),
                    reason.as_deref().unwrap_or("пропущено")
                ),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        TurnResult::NeedClarification { message, .. } => format!("🤔 {}", message),
        _ => turn.display_text(),
    };

    let spoken = match turn {
        TurnResult::NeedClarification { .. } => None,
        _ => turn.speech_text().filter(|speech| !body.contains(*speech)),
    };
    Ok(match spoken {
        Some(speech) => format!("{}\n🔊 {}", body, speech),
        None => body,
    })
}
