//! In-memory presentation host.
//!
//! Behaves like Keynote closely enough to run the bot without macOS, and
//! exposes hooks (`set_unreachable`, `navigation_calls`) for tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::{PlaybackMode, PlaybackStatus, PresentationBackend, SlideContent};
use crate::error::{BackendError, Result};

#[derive(Debug, Clone)]
struct Document {
    name: String,
    slides: Vec<SlideContent>,
}

#[derive(Debug, Default)]
struct Deck {
    host_running: bool,
    document: Option<Document>,
    mode: PlaybackMode,
    current: u32,
    unreachable: bool,
    latency: Duration,
    navigation_calls: u32,
}

impl Deck {
    fn document(&self) -> Result<&Document> {
        if !self.host_running {
            return Err(BackendError::HostNotRunning);
        }
        self.document.as_ref().ok_or(BackendError::NoDocument)
    }

    fn total(&self) -> u32 {
        self.document
            .as_ref()
            .map_or(0, |d| u32::try_from(d.slides.len()).unwrap_or(u32::MAX))
    }
}

/// A fake presentation host holding its deck in memory.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    deck: Mutex<Deck>,
}

impl SimulatedBackend {
    /// Host not running, nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host running with `slides` open and not playing.
    pub fn with_document(name: impl Into<String>, slides: Vec<SlideContent>) -> Self {
        let current = u32::from(!slides.is_empty());
        Self {
            deck: Mutex::new(Deck {
                host_running: true,
                document: Some(Document {
                    name: name.into(),
                    slides,
                }),
                current,
                ..Deck::default()
            }),
        }
    }

    /// Host running, no document open.
    pub fn without_document() -> Self {
        Self {
            deck: Mutex::new(Deck {
                host_running: true,
                ..Deck::default()
            }),
        }
    }

    /// A small Russian-language demo deck.
    pub fn demo() -> Self {
        Self::with_document("Здоровый образ жизни", demo_slides())
    }

    /// Builder: slideshow already playing at `slide`.
    pub fn playing_at(mut self, slide: u32) -> Self {
        let deck = self.deck.get_mut();
        deck.mode = PlaybackMode::Playing;
        deck.current = slide.clamp(1, deck.total().max(1));
        self
    }

    /// Builder: slideshow paused at `slide`.
    pub fn paused_at(self, slide: u32) -> Self {
        let mut backend = self.playing_at(slide);
        backend.deck.get_mut().mode = PlaybackMode::Paused;
        backend
    }

    /// Builder: every call sleeps this long first.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.deck.get_mut().latency = latency;
        self
    }

    /// Makes every call fail as if the scripting bridge were broken.
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.deck.lock().await.unreachable = unreachable;
    }

    pub async fn set_host_running(&self, running: bool) {
        let mut deck = self.deck.lock().await;
        deck.host_running = running;
        if !running {
            deck.mode = PlaybackMode::Stopped;
        }
    }

    /// Number of successful slide changes (`next`, `previous`, `show_slide`).
    pub async fn navigation_calls(&self) -> u32 {
        self.deck.lock().await.navigation_calls
    }

    pub async fn mode(&self) -> PlaybackMode {
        self.deck.lock().await.mode
    }

    pub async fn current_slide(&self) -> u32 {
        self.deck.lock().await.current
    }

    async fn enter(&self) -> Result<tokio::sync::MutexGuard<'_, Deck>> {
        let latency = {
            let deck = self.deck.lock().await;
            if deck.unreachable {
                return Err(BackendError::ScriptFailed(
                    "simulated host unreachable".to_string(),
                ));
            }
            deck.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(self.deck.lock().await)
    }
}

#[async_trait]
impl PresentationBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn is_host_running(&self) -> Result<bool> {
        Ok(self.enter().await?.host_running)
    }

    async fn is_document_open(&self) -> Result<bool> {
        let deck = self.enter().await?;
        if !deck.host_running {
            return Err(BackendError::HostNotRunning);
        }
        Ok(deck.document.is_some())
    }

    async fn playback_status(&self) -> Result<PlaybackStatus> {
        let deck = self.enter().await?;
        let document = deck.document()?;
        Ok(PlaybackStatus {
            document_name: document.name.clone(),
            mode: deck.mode,
            current_slide: deck.current,
            total_slides: deck.total(),
        })
    }

    async fn next(&self) -> Result<()> {
        let mut deck = self.enter().await?;
        deck.document()?;
        if deck.current < deck.total() {
            deck.current += 1;
        }
        deck.navigation_calls += 1;
        debug!(slide = deck.current, "simulated next");
        Ok(())
    }

    async fn previous(&self) -> Result<()> {
        let mut deck = self.enter().await?;
        deck.document()?;
        if deck.current > 1 {
            deck.current -= 1;
        }
        deck.navigation_calls += 1;
        debug!(slide = deck.current, "simulated previous");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        let mut deck = self.enter().await?;
        deck.host_running = true;
        deck.document()?;
        if deck.mode != PlaybackMode::Stopped {
            return Err(BackendError::AlreadyPlaying);
        }
        deck.mode = PlaybackMode::Playing;
        if deck.current == 0 {
            deck.current = u32::from(deck.total() > 0);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut deck = self.enter().await?;
        deck.document()?;
        if deck.mode == PlaybackMode::Stopped {
            return Err(BackendError::NotPlaying);
        }
        deck.mode = PlaybackMode::Stopped;
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let mut deck = self.enter().await?;
        deck.document()?;
        if deck.mode == PlaybackMode::Stopped {
            return Err(BackendError::NotPlaying);
        }
        deck.mode = PlaybackMode::Paused;
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        let mut deck = self.enter().await?;
        deck.document()?;
        if deck.mode == PlaybackMode::Stopped {
            return Err(BackendError::NotPlaying);
        }
        deck.mode = PlaybackMode::Playing;
        Ok(())
    }

    async fn show_slide(&self, number: u32) -> Result<()> {
        let mut deck = self.enter().await?;
        deck.document()?;
        if number == 0 || number > deck.total() {
            return Err(BackendError::NoSuchSlide(number));
        }
        deck.current = number;
        deck.navigation_calls += 1;
        Ok(())
    }

    async fn slides(&self) -> Result<Vec<SlideContent>> {
        let deck = self.enter().await?;
        Ok(deck.document()?.slides.clone())
    }

    async fn current_slide_text(&self) -> Result<String> {
        let deck = self.enter().await?;
        let document = deck.document()?;
        let index = deck.current.saturating_sub(1) as usize;
        Ok(document
            .slides
            .get(index)
            .map(SlideContent::full_text)
            .unwrap_or_default())
    }
}

fn demo_slides() -> Vec<SlideContent> {
    vec![
        SlideContent::new(
            1,
            "Здоровый образ жизни",
            "Доклад для семинара\nВедущий: команда Podium",
        ),
        SlideContent::new(2, "1. Введение", "Почему здоровье важно\nЧто мы обсудим сегодня"),
        SlideContent::new(
            3,
            "2. Питание",
            "Больше овощей и фруктов\nМеньше сахара\nПейте воду",
        ),
        SlideContent::new(4, "3. Движение", "30 минут активности в день\nПрогулки вместо лифта"),
        SlideContent::new(5, "4. Здоровье", "Сон не менее 7 часов\nРегулярные осмотры у врача"),
        SlideContent::new(6, "Итоги", "Маленькие шаги каждый день\nВопросы?"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_launches_host_and_plays() {
        let backend = SimulatedBackend::demo();
        backend.set_host_running(false).await;

        backend.start().await.unwrap();

        assert!(backend.is_host_running().await.unwrap());
        assert_eq!(backend.mode().await, PlaybackMode::Playing);
        assert!(matches!(
            backend.start().await,
            Err(BackendError::AlreadyPlaying)
        ));
    }

    #[tokio::test]
    async fn test_show_slide_range_checked() {
        let backend = SimulatedBackend::demo().playing_at(1);
        assert!(matches!(
            backend.show_slide(7).await,
            Err(BackendError::NoSuchSlide(7))
        ));
        assert_eq!(backend.navigation_calls().await, 0);

        backend.show_slide(5).await.unwrap();
        assert_eq!(backend.current_slide().await, 5);
        assert_eq!(backend.navigation_calls().await, 1);
    }

    #[tokio::test]
    async fn test_next_stops_at_last_slide() {
        let backend = SimulatedBackend::demo().playing_at(6);
        backend.next().await.unwrap();
        assert_eq!(backend.current_slide().await, 6);
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let backend = SimulatedBackend::demo();
        assert!(matches!(backend.pause().await, Err(BackendError::NotPlaying)));

        let backend = backend.playing_at(2);
        backend.pause().await.unwrap();
        assert_eq!(
            backend.playback_status().await.unwrap().mode,
            PlaybackMode::Paused
        );
        backend.resume().await.unwrap();
        assert_eq!(backend.mode().await, PlaybackMode::Playing);
    }

    #[tokio::test]
    async fn test_unreachable_fails_every_call() {
        let backend = SimulatedBackend::demo();
        backend.set_unreachable(true).await;
        assert!(backend.is_host_running().await.is_err());
        assert!(backend.slides().await.is_err());
    }

    #[tokio::test]
    async fn test_current_slide_text() {
        let backend = SimulatedBackend::demo().playing_at(3);
        let text = backend.current_slide_text().await.unwrap();
        assert_eq!(text, "2. Питание\nБольше овощей и фруктов\nМеньше сахара\nПейте воду");
    }

    #[tokio::test]
    async fn test_without_document() {
        let backend = SimulatedBackend::without_document();
        assert!(!backend.is_document_open().await.unwrap());
        assert!(matches!(
            backend.playback_status().await,
            Err(BackendError::NoDocument)
        ));
    }
}
