//! Error types for presentation backend operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while driving the presentation host.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The presentation application is not running.
    #[error("presentation host is not running")]
    HostNotRunning,

    /// No document is open.
    #[error("no document is open")]
    NoDocument,

    /// `start` while a slideshow is already on screen.
    #[error("slideshow is already playing")]
    AlreadyPlaying,

    /// Pause, resume or stop without a slideshow on screen.
    #[error("slideshow is not playing")]
    NotPlaying,

    /// Slide index outside the deck.
    #[error("slide {0} does not exist")]
    NoSuchSlide(u32),

    /// The host rejected the call because it was busy.
    #[error("presentation host is busy: {0}")]
    Busy(String),

    /// The script did not finish in time.
    #[error("script timed out after {0:?}")]
    Timeout(Duration),

    /// osascript exited with an error we don't recognise.
    #[error("script failed: {0}")]
    ScriptFailed(String),

    /// osascript is not available on this machine.
    #[error("osascript not found in PATH")]
    OsascriptNotFound,

    /// Failed to parse script output.
    #[error("parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Busy hosts and timeouts are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Busy(_) | BackendError::Timeout(_))
    }

    /// Polite sentence for the user.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::HostNotRunning => "Keynote не запущен.".to_string(),
            BackendError::NoDocument => "В Keynote не открыта ни одна презентация.".to_string(),
            BackendError::AlreadyPlaying => "Презентация уже запущена.".to_string(),
            BackendError::NotPlaying => "Презентация сейчас не воспроизводится.".to_string(),
            BackendError::NoSuchSlide(n) => format!("Слайда {} нет в презентации.", n),
            BackendError::Busy(_) | BackendError::Timeout(_) => {
                "Keynote не отвечает. Попробуйте ещё раз.".to_string()
            }
            BackendError::OsascriptNotFound => {
                "Управление Keynote доступно только на macOS.".to_string()
            }
            BackendError::ScriptFailed(_) | BackendError::Parse(_) | BackendError::Io(_) => {
                "Не удалось выполнить команду в Keynote.".to_string()
            }
        }
    }

    /// Maps osascript stderr to a typed error.
    pub fn from_script_stderr(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        if lower.contains("already playing") || lower.contains("уже воспроизводится") {
            BackendError::AlreadyPlaying
        } else if lower.contains("-1712") || lower.contains("timed out") {
            BackendError::Busy(stderr.trim().to_string())
        } else if lower.contains("-600") || lower.contains("isn’t running")
            || lower.contains("isn't running")
        {
            BackendError::HostNotRunning
        } else if lower.contains("no document") || lower.contains("get document 1") {
            BackendError::NoDocument
        } else if lower.contains("get slide") || lower.contains("no such slide") {
            BackendError::NoSuchSlide(0)
        } else {
            BackendError::ScriptFailed(stderr.trim().to_string())
        }
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
