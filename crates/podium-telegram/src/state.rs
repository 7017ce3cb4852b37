//! Shared state for the Telegram bot.

use std::sync::Arc;

use podium_core::{Synthesizer, Transcriber};
use podium_models::{TurnResult, UserId};
use podium_runtime::CommandRouter;
use tracing::{debug, warn};

/// Everything the handlers need, shared across updates.
pub struct BotState {
    router: CommandRouter,
    transcriber: Option<Arc<dyn Transcriber>>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    voice_replies: bool,
}

impl BotState {
    pub fn new(router: CommandRouter) -> Self {
        Self {
            router,
            transcriber: None,
            synthesizer: None,
            voice_replies: false,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Also answer typed messages with a voice note.
    pub fn with_voice_replies(mut self, enabled: bool) -> Self {
        self.voice_replies = enabled;
        self
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn can_transcribe(&self) -> bool {
        self.transcriber.is_some()
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Whether a reply to a message should include a voice note.
    ///
    /// Voice input always gets a voice answer when synthesis is available;
    /// typed input only when voice replies are switched on.
    pub fn wants_voice_reply(&self, voice_input: bool) -> bool {
        self.can_speak() && (voice_input || self.voice_replies)
    }

    /// Runs one turn for `user_id`.
    pub async fn handle_text(&self, user_id: UserId, text: &str) -> TurnResult {
        self.router.handle_command(user_id, text).await
    }

    /// Transcribes a voice note. `None` when speech is unavailable or fails.
    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Option<String> {
        let transcriber = self.transcriber.as_ref()?;
        match transcriber.transcribe(audio, file_name).await {
            Ok(text) => {
                let text = text.trim().to_string();
                debug!(chars = text.chars().count(), "Voice note transcribed");
                (!text.is_empty()).then_some(text)
            }
            Err(e) => {
                warn!(error = %e, "Transcription failed");
                None
            }
        }
    }

    /// Synthesizes `text` at the user's preferred rate.
    pub async fn synthesize(&self, user_id: UserId, text: &str) -> Option<Vec<u8>> {
        let synthesizer = self.synthesizer.as_ref()?;
        let rate = self.router.voice_rate(user_id).await;
        match synthesizer.synthesize(text, rate).await {
            Ok(audio) if !audio.is_empty() => Some(audio),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed");
                None
            }
        }
    }
}
