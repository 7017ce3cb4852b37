//! Built-in capabilities.
//!
//! - **navigation**: relative steps and jumps by number or title
//! - **playback**: start, end, pause, resume and status
//! - **speech**: reading the current slide aloud paragraph by paragraph
//! - **knowledge**: answering questions, web search and summaries

mod knowledge;
mod navigation;
mod playback;
mod speech;

use std::sync::Arc;

use tokio::sync::Mutex;

use podium_core::{CompletionService, SearchService};
use podium_keynote::PresentationBackend;

use crate::capability::CapabilityRegistry;
use crate::cursor::SpokenTextCursor;
use crate::error::Result;

pub use knowledge::{PresentationSummary, QuestionAnswer, WebSearch};
pub use navigation::{best_slide_match, JumpToSlide, StepSlides};
pub use playback::{EndShow, PauseShow, ResumeShow, ShowStatus, StartShow};
pub use speech::{ReadAloud, RepeatBlock};

/// Collaborators shared by the built-in capabilities.
#[derive(Clone)]
pub struct PresenterServices {
    pub backend: Arc<dyn PresentationBackend>,
    pub completion: Option<Arc<dyn CompletionService>>,
    pub search: Option<Arc<dyn SearchService>>,
    pub cursor: Arc<Mutex<SpokenTextCursor>>,
}

impl PresenterServices {
    pub fn new(backend: Arc<dyn PresentationBackend>) -> Self {
        Self {
            backend,
            completion: None,
            search: None,
            cursor: Arc::new(Mutex::new(SpokenTextCursor::new())),
        }
    }

    pub fn with_completion(mut self, completion: Arc<dyn CompletionService>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchService>) -> Self {
        self.search = Some(search);
        self
    }
}

/// Registers one capability per executable action.
pub fn register_defaults(
    registry: &mut CapabilityRegistry,
    services: PresenterServices,
) -> Result<()> {
    let PresenterServices {
        backend,
        completion,
        search,
        cursor,
    } = services;

    registry.register(Arc::new(StepSlides::forward(backend.clone())))?;
    registry.register(Arc::new(StepSlides::backward(backend.clone())))?;
    registry.register(Arc::new(JumpToSlide::new(backend.clone())))?;

    registry.register(Arc::new(StartShow::new(backend.clone())))?;
    registry.register(Arc::new(EndShow::new(backend.clone())))?;
    registry.register(Arc::new(PauseShow::new(backend.clone())))?;
    registry.register(Arc::new(ResumeShow::new(backend.clone())))?;
    registry.register(Arc::new(ShowStatus::new(backend.clone())))?;

    registry.register(Arc::new(ReadAloud::new(backend.clone(), cursor.clone())))?;
    registry.register(Arc::new(RepeatBlock::new(cursor)))?;

    registry.register(Arc::new(QuestionAnswer::new(
        backend.clone(),
        completion.clone(),
        search.clone(),
    )))?;
    registry.register(Arc::new(WebSearch::new(search)))?;
    registry.register(Arc::new(PresentationSummary::new(backend, completion)))?;

    Ok(())
}
