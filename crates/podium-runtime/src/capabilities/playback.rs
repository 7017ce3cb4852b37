//! Slideshow lifecycle and status.

use std::sync::Arc;

use async_trait::async_trait;

use podium_keynote::PresentationBackend;
use podium_models::{
    ActionName, ActionParams, ExecutionResult, PresentationSnapshot, PresentationState,
};

use crate::capability::Capability;
use crate::error::Result;
use crate::tracker::snapshot_from_status;

/// Starts the slideshow, launching the host if needed.
pub struct StartShow {
    backend: Arc<dyn PresentationBackend>,
}

impl StartShow {
    pub fn new(backend: Arc<dyn PresentationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Capability for StartShow {
    fn action(&self) -> ActionName {
        ActionName::Start
    }

    async fn invoke(&self, _params: ActionParams) -> Result<ExecutionResult> {
        self.backend.start().await?;
        let status = self.backend.playback_status().await?;

        Ok(ExecutionResult::ok(format!(
            "▶️ Презентация «{}» запущена. Слайд {} из {}.",
            status.document_name, status.current_slide, status.total_slides
        ))
        .with_speech("Презентация запущена.")
        .with_data("current_slide", status.current_slide)
        .with_data("total_slides", status.total_slides))
    }
}

pub struct EndShow {
    backend: Arc<dyn PresentationBackend>,
}

impl EndShow {
    pub fn new(backend: Arc<dyn PresentationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Capability for EndShow {
    fn action(&self) -> ActionName {
        ActionName::EndPresentation
    }

    async fn invoke(&self, _params: ActionParams) -> Result<ExecutionResult> {
        self.backend.stop().await?;
        Ok(ExecutionResult::ok("⏹ Показ завершён.").with_speech("Показ завершён. Спасибо за внимание!"))
    }
}

pub struct PauseShow {
    backend: Arc<dyn PresentationBackend>,
}

impl PauseShow {
    pub fn new(backend: Arc<dyn PresentationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Capability for PauseShow {
    fn action(&self) -> ActionName {
        ActionName::Pause
    }

    async fn invoke(&self, _params: ActionParams) -> Result<ExecutionResult> {
        self.backend.pause().await?;
        Ok(ExecutionResult::ok(
            "⏸ Пауза. Скажите «продолжить», когда будете готовы.",
        ))
    }
}

pub struct ResumeShow {
    backend: Arc<dyn PresentationBackend>,
}

impl ResumeShow {
    pub fn new(backend: Arc<dyn PresentationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Capability for ResumeShow {
    fn action(&self) -> ActionName {
        ActionName::Resume
    }

    async fn invoke(&self, _params: ActionParams) -> Result<ExecutionResult> {
        self.backend.resume().await?;
        let status = self.backend.playback_status().await?;
        Ok(ExecutionResult::ok(format!(
            "▶️ Продолжаем со слайда {}.",
            status.current_slide
        ))
        .with_data("current_slide", status.current_slide))
    }
}

/// Reports host, document and slide position.
pub struct ShowStatus {
    backend: Arc<dyn PresentationBackend>,
}

impl ShowStatus {
    pub fn new(backend: Arc<dyn PresentationBackend>) -> Self {
        Self { backend }
    }

    async fn snapshot(&self) -> Result<PresentationSnapshot> {
        if !self.backend.is_host_running().await? {
            return Ok(PresentationSnapshot::bare(PresentationState::NoHost));
        }
        if !self.backend.is_document_open().await? {
            return Ok(PresentationSnapshot::bare(PresentationState::NoDocument));
        }
        Ok(snapshot_from_status(self.backend.playback_status().await?))
    }
}

#[async_trait]
impl Capability for ShowStatus {
    fn action(&self) -> ActionName {
        ActionName::Status
    }

    async fn invoke(&self, _params: ActionParams) -> Result<ExecutionResult> {
        let snapshot = self.snapshot().await?;

        let mut result = ExecutionResult::ok(format!("📊 {}", snapshot.status_message()))
            .with_data("state", snapshot.state.as_str());
        if snapshot.state.is_showing() {
            result = result.with_speech(format!(
                "Слайд {} из {}.",
                snapshot.current_slide, snapshot.total_slides
            ));
        }
        if let Some(name) = &snapshot.presentation_name {
            result = result
                .with_data("presentation_name", name.as_str())
                .with_data("current_slide", snapshot.current_slide)
                .with_data("total_slides", snapshot.total_slides);
        }
        Ok(result)
    }
}
