//! Presentation state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized view of the presentation host.
///
/// Ordered by capability: each state implies every check before it passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PresentationState {
    /// The presentation application is not running.
    #[default]
    NoHost,
    /// Running, but no document is open.
    NoDocument,
    /// A document is open and not playing.
    Ready,
    /// The slideshow is playing.
    Playing,
    /// The slideshow is paused.
    Paused,
}

impl PresentationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresentationState::NoHost => "no_host",
            PresentationState::NoDocument => "no_document",
            PresentationState::Ready => "ready",
            PresentationState::Playing => "playing",
            PresentationState::Paused => "paused",
        }
    }

    /// Returns true while a slideshow is on screen.
    pub fn is_showing(&self) -> bool {
        matches!(self, PresentationState::Playing | PresentationState::Paused)
    }
}

impl fmt::Display for PresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State plus the side-channel details gathered while deriving it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresentationSnapshot {
    pub state: PresentationState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation_name: Option<String>,

    /// 1-based index of the current slide, 0 when unknown.
    pub current_slide: u32,

    pub total_slides: u32,
}

impl PresentationSnapshot {
    /// Snapshot carrying only a state.
    pub fn bare(state: PresentationState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Name of the open document, or a placeholder.
    pub fn display_name(&self) -> &str {
        self.presentation_name.as_deref().unwrap_or("презентация")
    }

    /// A user-facing sentence describing the current state.
    pub fn status_message(&self) -> String {
        match self.state {
            PresentationState::NoHost => {
                "Keynote не запущен. Скажите «запустить презентацию», чтобы начать.".to_string()
            }
            PresentationState::NoDocument => {
                "Keynote запущен, но презентация не открыта.".to_string()
            }
            PresentationState::Ready => format!(
                "Презентация «{}» готова к показу ({} слайдов). Скажите «начать».",
                self.display_name(),
                self.total_slides
            ),
            PresentationState::Playing => format!(
                "Идёт показ «{}»: слайд {} из {}.",
                self.display_name(),
                self.current_slide,
                self.total_slides
            ),
            PresentationState::Paused => format!(
                "Показ «{}» на паузе на слайде {} из {}. Скажите «продолжить».",
                self.display_name(),
                self.current_slide,
                self.total_slides
            ),
        }
    }
}
