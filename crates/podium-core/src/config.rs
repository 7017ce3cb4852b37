//! Shared configuration for Podium.
//!
//! Locates the state directory and env file, and reads service settings
//! from the environment.
//!
//! ```text
//! ~/.podium/
//! ├── podium.env    # Secrets (API keys, bot token)
//! └── logs/
//! ```
//!
//! # Environment Variables
//!
//! - `PODIUM_STATE_DIR`: Override the base state directory
//! - `OPENROUTER_API_KEY`, `OPENROUTER_BASE_URL`: completion service
//! - `PODIUM_PRIMARY_MODEL`, `PODIUM_FALLBACK_MODEL`: completion models
//! - `TAVILY_API_KEY`: web search
//! - `OPENAI_API_KEY`: speech-to-text and text-to-speech
//! - `TELEGRAM_BOT_TOKEN`: Telegram transport
//! - `PODIUM_REQUEST_TIMEOUT_SECS`: timeout for remote calls
//! - `PODIUM_VOICE_REPLIES`: reply with synthesized voice (`true`/`false`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "PODIUM_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".podium";

const ENV_FILE_NAME: &str = "podium.env";
const LOGS_SUBDIR: &str = "logs";

/// Default OpenRouter API base.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model for intent fallback and answers.
pub const DEFAULT_PRIMARY_MODEL: &str = "openai/gpt-4o";

/// Cheaper model used after a rate limit.
pub const DEFAULT_FALLBACK_MODEL: &str = "openai/gpt-4o-mini";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Get the Podium state directory.
///
/// `PODIUM_STATE_DIR` if set, else `~/.podium`, else `.podium` in the
/// current directory.
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the env file holding secrets.
pub fn env_file() -> PathBuf {
    state_dir().join(ENV_FILE_NAME)
}

/// Get the logs directory.
pub fn logs_dir() -> PathBuf {
    state_dir().join(LOGS_SUBDIR)
}

/// Ensure the state directory and its logs directory exist under `base`.
///
/// # Errors
/// Returns an error if a directory cannot be created.
pub fn ensure_state_dir(base: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(base.join(LOGS_SUBDIR))
}

/// Loads dotenv files: the state-dir env file, then `.env.local`, then
/// `.env`. Variables already set are never overwritten.
///
/// Returns the files that were loaded.
pub fn load_env_files(state_dir: &Path) -> Vec<PathBuf> {
    let candidates = [
        state_dir.join(ENV_FILE_NAME),
        PathBuf::from(".env.local"),
        PathBuf::from(".env"),
    ];

    candidates
        .into_iter()
        .filter(|path| path.exists())
        .filter(|path| match dotenvy::from_path(path) {
            Ok(()) => true,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping env file");
                false
            }
        })
        .collect()
}

/// Service settings read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct PodiumConfig {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub primary_model: String,
    pub fallback_model: String,
    pub tavily_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub request_timeout: Duration,
    pub voice_replies: bool,
}

impl PodiumConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let request_timeout = get("PODIUM_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let voice_replies = get("PODIUM_VOICE_REPLIES")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Self {
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_base_url: get("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            primary_model: get("PODIUM_PRIMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string()),
            fallback_model: get("PODIUM_FALLBACK_MODEL")
                .unwrap_or_else(|| DEFAULT_FALLBACK_MODEL.to_string()),
            tavily_api_key: get("TAVILY_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            request_timeout: Duration::from_secs(request_timeout),
            voice_replies,
        }
    }

    pub fn has_completion(&self) -> bool {
        self.openrouter_api_key.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.tavily_api_key.is_some()
    }

    pub fn has_speech(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

impl std::fmt::Debug for PodiumConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("PodiumConfig")
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("openrouter_base_url", &self.openrouter_base_url)
            .field("primary_model", &self.primary_model)
            .field("fallback_model", &self.fallback_model)
            .field("tavily_api_key", &redact(&self.tavily_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("telegram_bot_token", &redact(&self.telegram_bot_token))
            .field("request_timeout", &self.request_timeout)
            .field("voice_replies", &self.voice_replies)
            .finish()
    }
}
