//! The presentation backend interface.

use async_trait::async_trait;

use crate::error::{BackendError, Result};

/// Whether a slideshow is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Playback details of the open document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub document_name: String,
    pub mode: PlaybackMode,
    /// 1-based current slide.
    pub current_slide: u32,
    pub total_slides: u32,
}

impl PlaybackStatus {
    /// Parses a `name|playing|current|total` status line.
    ///
    /// The document name may itself contain `|`, so fields are taken from
    /// the right.
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.trim().rsplitn(4, '|');
        let total = parts.next();
        let current = parts.next();
        let playing = parts.next();
        let name = parts.next();

        let (Some(name), Some(playing), Some(current), Some(total)) = (name, playing, current, total)
        else {
            return Err(BackendError::Parse(format!("invalid status line: {}", line)));
        };

        let parse_u32 = |field: &str| {
            field
                .trim()
                .parse::<u32>()
                .map_err(|_| BackendError::Parse(format!("invalid slide index '{}'", field)))
        };

        let mode = match playing.trim() {
            "true" => PlaybackMode::Playing,
            "false" => PlaybackMode::Stopped,
            other => return Err(BackendError::Parse(format!("invalid playing flag '{}'", other))),
        };

        Ok(Self {
            document_name: name.trim().to_string(),
            mode,
            current_slide: parse_u32(current)?,
            total_slides: parse_u32(total)?,
        })
    }
}

/// Text of one slide.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlideContent {
    /// 1-based slide number.
    pub number: u32,
    pub title: String,
    pub body: String,
}

impl SlideContent {
    pub fn new(number: u32, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Title and body as one block of text, one paragraph per line.
    pub fn full_text(&self) -> String {
        match (self.title.trim(), self.body.trim()) {
            ("", body) => body.to_string(),
            (title, "") => title.to_string(),
            (title, body) => format!("{}\n{}", title, body),
        }
    }
}

/// Atomic operations on a presentation host.
///
/// Every call is a blocking round trip to an external application;
/// implementations bound each one with a timeout.
#[async_trait]
pub trait PresentationBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn is_host_running(&self) -> Result<bool>;

    async fn is_document_open(&self) -> Result<bool>;

    async fn playback_status(&self) -> Result<PlaybackStatus>;

    async fn next(&self) -> Result<()>;

    async fn previous(&self) -> Result<()>;

    /// Starts the slideshow, launching the host if needed.
    async fn start(&self) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;

    /// Jumps to a 1-based slide.
    async fn show_slide(&self, number: u32) -> Result<()>;

    /// Title and body of every slide in the open document.
    async fn slides(&self) -> Result<Vec<SlideContent>>;

    /// All text on the current slide, one text item per line.
    async fn current_slide_text(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_line() {
        let status = PlaybackStatus::parse("Доклад.key|true|3|12\n").unwrap();
        assert_eq!(status.document_name, "Доклад.key");
        assert_eq!(status.mode, PlaybackMode::Playing);
        assert_eq!(status.current_slide, 3);
        assert_eq!(status.total_slides, 12);
    }

    #[test]
    fn test_parse_status_keeps_pipes_in_name() {
        let status = PlaybackStatus::parse("Q1|Q2 review|false|1|4").unwrap();
        assert_eq!(status.document_name, "Q1|Q2 review");
        assert_eq!(status.mode, PlaybackMode::Stopped);
    }

    #[test]
    fn test_parse_status_rejects_garbage() {
        assert!(PlaybackStatus::parse("no_document").is_err());
        assert!(PlaybackStatus::parse("deck|maybe|1|2").is_err());
        assert!(PlaybackStatus::parse("deck|true|x|2").is_err());
    }

    #[test]
    fn test_full_text_joins_title_and_body() {
        assert_eq!(SlideContent::new(1, "Title", "Body").full_text(), "Title\nBody");
        assert_eq!(SlideContent::new(1, "", "Body").full_text(), "Body");
    }
}
