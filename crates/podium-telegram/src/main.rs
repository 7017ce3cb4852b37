//! Podium Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx cargo run -p podium-telegram
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use podium_core::{config, OpenAiSpeech, PodiumConfig};
use podium_keynote::{KeynoteBackend, PresentationBackend, SimulatedBackend};
use podium_runtime::{CommandRouter, RuntimeConfig};
use podium_telegram::logging::log_directives;
use podium_telegram::{BotState, PodiumBot, TelegramError};
use tracing_subscriber::EnvFilter;

/// Podium Telegram Bot - drive a Keynote presentation by voice or text
#[derive(Parser, Debug)]
#[command(name = "podium-telegram")]
#[command(about = "Telegram bot that controls a Keynote presentation")]
struct Args {
    /// Use an in-memory demo presentation instead of Keynote
    #[arg(short, long)]
    simulate: bool,

    /// State directory (default: ~/.podium)
    #[arg(long, env = "PODIUM_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let state_dir = args.state_dir.clone().unwrap_or_else(config::state_dir);
    let loaded = config::load_env_files(&state_dir);

    let filter = log_directives(args.verbose, std::env::var("RUST_LOG").ok().as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::debug!(files = ?loaded, "Loaded env files");
    if let Err(e) = config::ensure_state_dir(&state_dir) {
        tracing::warn!(error = %e, "Failed to create state directory");
    }

    let settings = PodiumConfig::from_env();
    let token = settings
        .telegram_bot_token
        .clone()
        .ok_or(TelegramError::NoToken)?;

    let backend: Arc<dyn PresentationBackend> = if args.simulate {
        Arc::new(SimulatedBackend::demo())
    } else {
        Arc::new(KeynoteBackend::new().map_err(TelegramError::from)?)
    };

    let router = CommandRouter::from_config(&settings, backend, RuntimeConfig::default())
        .map_err(TelegramError::from)?;

    let mut state = BotState::new(router).with_voice_replies(settings.voice_replies);
    if settings.has_speech() {
        let speech = Arc::new(OpenAiSpeech::from_config(&settings).map_err(TelegramError::from)?);
        state = state
            .with_transcriber(speech.clone())
            .with_synthesizer(speech);
    } else {
        tracing::warn!("No OpenAI key: voice messages and spoken replies disabled");
    }

    let bot = PodiumBot::new(token, state)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[podium] Podium Telegram Bot");
            println!("   Bot: @{}", username);
            println!("   Backend: {}", if args.simulate { "simulated" } else { "keynote" });
            println!(
                "   Voice: {}",
                if bot.state().can_transcribe() { "enabled" } else { "disabled" }
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling().await?;

    Ok(())
}
