//! Reading slides aloud.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use podium_core::to_speakable;
use podium_keynote::PresentationBackend;
use podium_models::action::PARAM_RATE;
use podium_models::{ActionName, ActionParams, ExecutionResult};

use crate::capability::Capability;
use crate::cursor::SpokenTextCursor;
use crate::error::Result;

fn with_rate(result: ExecutionResult, params: &ActionParams) -> ExecutionResult {
    match params.get_f64(PARAM_RATE) {
        Some(rate) => result.with_data("rate", rate),
        None => result,
    }
}

/// Speaks the next paragraph of the current slide.
pub struct ReadAloud {
    backend: Arc<dyn PresentationBackend>,
    cursor: Arc<Mutex<SpokenTextCursor>>,
}

impl ReadAloud {
    pub fn new(backend: Arc<dyn PresentationBackend>, cursor: Arc<Mutex<SpokenTextCursor>>) -> Self {
        Self { backend, cursor }
    }
}

#[async_trait]
impl Capability for ReadAloud {
    fn action(&self) -> ActionName {
        ActionName::SpeakNextBlock
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[PARAM_RATE]
    }

    async fn invoke(&self, params: ActionParams) -> Result<ExecutionResult> {
        // Held across the backend call so concurrent readers queue up.
        let mut cursor = self.cursor.lock().await;
        let slide_text = self.backend.current_slide_text().await?;

        let Some(block) = cursor.advance(&slide_text) else {
            return Ok(ExecutionResult::failure(
                "На этом слайде нет текста для чтения.",
            ));
        };
        debug!(paragraph = block.index + 1, of = block.total, "Reading paragraph");

        let result = ExecutionResult::ok(format!("🗣 {}", block.text))
            .with_speech(to_speakable(&block.text))
            .with_data("paragraph", block.index + 1)
            .with_data("paragraphs", block.total);
        Ok(with_rate(result, &params))
    }
}

/// Speaks the last paragraph again without moving the cursor.
pub struct RepeatBlock {
    cursor: Arc<Mutex<SpokenTextCursor>>,
}

impl RepeatBlock {
    pub fn new(cursor: Arc<Mutex<SpokenTextCursor>>) -> Self {
        Self { cursor }
    }
}

#[async_trait]
impl Capability for RepeatBlock {
    fn action(&self) -> ActionName {
        ActionName::RepeatLastBlock
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[PARAM_RATE]
    }

    async fn invoke(&self, params: ActionParams) -> Result<ExecutionResult> {
        let cursor = self.cursor.lock().await;
        let Some(text) = cursor.last_spoken() else {
            return Ok(ExecutionResult::failure(
                "Я ещё ничего не прочитал. Скажите «читай», чтобы начать.",
            ));
        };

        let result = ExecutionResult::ok(format!("🔁 {}", text)).with_speech(to_speakable(text));
        Ok(with_rate(result, &params))
    }
}
