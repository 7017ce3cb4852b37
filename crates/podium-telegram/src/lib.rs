//! Telegram bot front-end for Podium.
//!
//! Text and voice messages are routed through a
//! [`CommandRouter`](podium_runtime::CommandRouter); replies come back as
//! HTML text and, when speech synthesis is configured, as voice notes at
//! the rate the user asked for.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `OPENROUTER_API_KEY`: model fallback and knowledge actions
//! - `TAVILY_API_KEY`: web search
//! - `OPENAI_API_KEY`: voice transcription and spoken replies
//! - `PODIUM_VOICE_REPLIES`: also answer typed messages with voice (default: on)
//! - `RUST_LOG`: log filter, overrides `-v`
//!
//! # Commands
//!
//! - `/start` - Welcome message and available services
//! - `/help` - Show available commands
//! - `/status` - Presentation state

pub mod bot;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod state;

pub use bot::PodiumBot;
pub use error::{Result, TelegramError};
pub use state::BotState;
