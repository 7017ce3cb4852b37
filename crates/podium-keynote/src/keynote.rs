//! Keynote control through AppleScript.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::{PlaybackMode, PlaybackStatus, PresentationBackend, SlideContent};
use crate::error::{BackendError, Result};
use crate::script::ScriptRunner;

/// How long the slide list stays valid.
const SLIDES_CACHE_TTL: Duration = Duration::from_secs(30);

/// Wait after launching Keynote before talking to it.
const LAUNCH_GRACE: Duration = Duration::from_secs(2);

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';

const IS_RUNNING_SCRIPT: &str =
    r#"tell application "System Events" to return (exists process "Keynote")"#;

const HAS_DOCUMENT_SCRIPT: &str =
    r#"tell application "Keynote" to return ((count of documents) > 0)"#;

const STATUS_SCRIPT: &str = r#"tell application "Keynote"
    if (count of documents) is 0 then error "No document is open"
    set docName to name of front document
    set isPlaying to playing
    tell front document
        set totalSlides to count of slides
        set currentSlide to slide number of current slide
    end tell
    return docName & "|" & isPlaying & "|" & currentSlide & "|" & totalSlides
end tell"#;

const LAUNCH_SCRIPT: &str = r#"tell application "Keynote" to activate"#;
const START_SCRIPT: &str = r#"tell application "Keynote" to start front document"#;
const STOP_SCRIPT: &str = r#"tell application "Keynote" to stop front document"#;
const NEXT_SCRIPT: &str = r#"tell application "Keynote" to show next"#;
const PREVIOUS_SCRIPT: &str = r#"tell application "Keynote" to show previous"#;

/// Keynote toggles a black pause screen on "b".
const TOGGLE_PAUSE_SCRIPT: &str = r#"tell application "Keynote" to activate
tell application "System Events" to keystroke "b""#;

const CURRENT_TEXT_SCRIPT: &str = r#"tell application "Keynote"
    set out to ""
    tell current slide of front document
        repeat with t in text items
            set out to out & (object text of t) & linefeed
        end repeat
    end tell
    return out
end tell"#;

const SLIDES_SCRIPT: &str = r#"tell application "Keynote"
    set fs to ASCII character 31
    set rs to ASCII character 30
    set out to ""
    tell front document
        repeat with i from 1 to count of slides
            set s to slide i
            set t to ""
            set b to ""
            try
                set t to object text of default title item of s
            end try
            try
                set b to object text of default body item of s
            end try
            set out to out & i & fs & t & fs & b & rs
        end repeat
    end tell
    return out
end tell"#;

struct CachedSlides {
    fetched_at: Instant,
    slides: Vec<SlideContent>,
}

/// Keynote on macOS, driven by `osascript`.
pub struct KeynoteBackend {
    runner: ScriptRunner,
    /// Keynote reports only "playing"; pause is tracked here.
    paused: AtomicBool,
    slides_cache: Mutex<Option<CachedSlides>>,
}

impl KeynoteBackend {
    /// # Errors
    ///
    /// Returns `BackendError::OsascriptNotFound` off macOS.
    pub fn new() -> Result<Self> {
        Ok(Self::with_runner(ScriptRunner::new()?))
    }

    pub fn with_runner(runner: ScriptRunner) -> Self {
        Self {
            runner,
            paused: AtomicBool::new(false),
            slides_cache: Mutex::new(None),
        }
    }

    async fn ensure_running(&self) -> Result<()> {
        if self.runner.run_bool(IS_RUNNING_SCRIPT).await? {
            return Ok(());
        }
        info!("Launching Keynote");
        self.runner.run(LAUNCH_SCRIPT).await?;
        tokio::time::sleep(LAUNCH_GRACE).await;
        if self.runner.run_bool(IS_RUNNING_SCRIPT).await? {
            Ok(())
        } else {
            Err(BackendError::HostNotRunning)
        }
    }

    async fn require_showing(&self) -> Result<PlaybackStatus> {
        let status = self.playback_status().await?;
        if status.mode == PlaybackMode::Stopped {
            return Err(BackendError::NotPlaying);
        }
        Ok(status)
    }

    async fn invalidate_slides(&self) {
        *self.slides_cache.lock().await = None;
    }
}

/// Parses the record/field separated output of the slides script.
fn parse_slides(raw: &str) -> Result<Vec<SlideContent>> {
    raw.split(RECORD_SEPARATOR)
        .map(|record| record.trim_matches(|c| c == '\n' || c == '\r'))
        .filter(|record| !record.trim().is_empty())
        .map(|record| {
            let mut fields = record.splitn(3, FIELD_SEPARATOR);
            let number = fields
                .next()
                .and_then(|n| n.trim().parse::<u32>().ok())
                .ok_or_else(|| BackendError::Parse(format!("invalid slide record: {}", record)))?;
            let title = fields.next().unwrap_or_default().trim();
            let body = fields.next().unwrap_or_default().trim();
            Ok(SlideContent::new(number, title, body))
        })
        .collect()
}

#[async_trait]
impl PresentationBackend for KeynoteBackend {
    fn name(&self) -> &str {
        "keynote"
    }

    async fn is_host_running(&self) -> Result<bool> {
        self.runner.run_bool(IS_RUNNING_SCRIPT).await
    }

    async fn is_document_open(&self) -> Result<bool> {
        self.runner.run_bool(HAS_DOCUMENT_SCRIPT).await
    }

    async fn playback_status(&self) -> Result<PlaybackStatus> {
        let line = self.runner.run(STATUS_SCRIPT).await?;
        let mut status = PlaybackStatus::parse(&line)?;
        if status.mode == PlaybackMode::Stopped {
            self.paused.store(false, Ordering::SeqCst);
        } else if self.paused.load(Ordering::SeqCst) {
            status.mode = PlaybackMode::Paused;
        }
        Ok(status)
    }

    async fn next(&self) -> Result<()> {
        self.runner.run(NEXT_SCRIPT).await.map(drop)
    }

    async fn previous(&self) -> Result<()> {
        self.runner.run(PREVIOUS_SCRIPT).await.map(drop)
    }

    async fn start(&self) -> Result<()> {
        self.ensure_running().await?;
        if !self.is_document_open().await? {
            return Err(BackendError::NoDocument);
        }
        if self.playback_status().await?.mode != PlaybackMode::Stopped {
            return Err(BackendError::AlreadyPlaying);
        }
        self.runner.run(START_SCRIPT).await?;
        self.paused.store(false, Ordering::SeqCst);
        self.invalidate_slides().await;
        info!("Slideshow started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.require_showing().await?;
        self.runner.run(STOP_SCRIPT).await?;
        self.paused.store(false, Ordering::SeqCst);
        self.invalidate_slides().await;
        info!("Slideshow stopped");
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let status = self.require_showing().await?;
        if status.mode == PlaybackMode::Paused {
            return Ok(());
        }
        self.runner.run(TOGGLE_PAUSE_SCRIPT).await?;
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        let status = self.require_showing().await?;
        if status.mode != PlaybackMode::Paused {
            return Ok(());
        }
        self.runner.run(TOGGLE_PAUSE_SCRIPT).await?;
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn show_slide(&self, number: u32) -> Result<()> {
        let script = format!(
            r#"tell application "Keynote" to tell front document to set current slide to slide {}"#,
            number
        );
        self.runner.run(&script).await.map(drop).map_err(|e| match e {
            BackendError::NoSuchSlide(_) => BackendError::NoSuchSlide(number),
            other => other,
        })
    }

    async fn slides(&self) -> Result<Vec<SlideContent>> {
        let mut cache = self.slides_cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < SLIDES_CACHE_TTL {
                return Ok(cached.slides.clone());
            }
        }

        let raw = self.runner.run(SLIDES_SCRIPT).await?;
        let slides = parse_slides(&raw)?;
        debug!(count = slides.len(), "Slide list refreshed");
        *cache = Some(CachedSlides {
            fetched_at: Instant::now(),
            slides: slides.clone(),
        });
        Ok(slides)
    }

    async fn current_slide_text(&self) -> Result<String> {
        self.runner.run(CURRENT_TEXT_SCRIPT).await
    }
}
