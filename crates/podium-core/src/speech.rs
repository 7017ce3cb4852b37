//! Speech-to-text and text-to-speech.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PodiumConfig;
use crate::error::{Result, ServiceError};

const PROVIDER: &str = "openai-audio";

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Turns recorded audio into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// `file_name` carries the container format (e.g. `voice.ogg`).
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String>;
}

/// Turns text into audio.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// `rate` is a speed multiplier, 1.0 being normal speech.
    async fn synthesize(&self, text: &str, rate: f32) -> Result<Vec<u8>>;
}

/// OpenAI audio endpoints (whisper transcription and TTS).
///
/// Synthesis returns Ogg/Opus, which Telegram accepts as a voice note.
#[derive(Clone)]
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    transcription_model: String,
    speech_model: String,
    voice: String,
    language: Option<String>,
    timeout: Duration,
}

impl OpenAiSpeech {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            transcription_model: "whisper-1".to_string(),
            speech_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            language: Some("ru".to_string()),
            timeout: Duration::from_secs(30),
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotConfigured` without an API key.
    pub fn from_config(config: &PodiumConfig) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| ServiceError::NotConfigured(PROVIDER.to_string()))?;
        Ok(Self::new(api_key).with_timeout(config.request_timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Language hint for transcription; `None` lets the model detect it.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ServiceError::RateLimited(PROVIDER.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Clamps a rate multiplier into what the TTS endpoint accepts.
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_finite() {
        rate.clamp(0.25, 4.0)
    } else {
        1.0
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    speed: f32,
}

#[async_trait]
impl Transcriber for OpenAiSpeech {
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
        let bytes = audio.len();
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", part);
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(e, self.timeout.as_secs()))?;

        let parsed: TranscriptionResponse = self
            .check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        debug!(bytes, chars = parsed.text.len(), "Audio transcribed");
        Ok(parsed.text.trim().to_string())
    }
}

#[async_trait]
impl Synthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str, rate: f32) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.speech_model,
            input: text,
            voice: &self.voice,
            response_format: "opus",
            speed: clamp_rate(rate),
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(e, self.timeout.as_secs()))?;

        let audio = self
            .check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| ServiceError::from_reqwest(e, self.timeout.as_secs()))?;

        debug!(chars = text.len(), bytes = audio.len(), rate, "Speech synthesized");
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_rate() {
        assert_eq!(clamp_rate(0.8), 0.8);
        assert_eq!(clamp_rate(10.0), 4.0);
        assert_eq!(clamp_rate(0.0), 0.25);
        assert_eq!(clamp_rate(f32::NAN), 1.0);
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = PodiumConfig::from_lookup(|_| None);
        assert!(OpenAiSpeech::from_config(&config).is_err());
    }
}
