//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur while starting or running the bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    NoToken,

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Presentation host could not be set up.
    #[error("Presentation backend error: {0}")]
    Backend(#[from] podium_keynote::BackendError),

    /// Remote service client could not be built.
    #[error("Service error: {0}")]
    Service(#[from] podium_core::ServiceError),

    /// Turn pipeline could not be assembled.
    #[error("Runtime error: {0}")]
    Runtime(#[from] podium_runtime::RuntimeError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
