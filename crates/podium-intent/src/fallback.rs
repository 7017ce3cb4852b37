//! Language-model fallback classification.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use podium_core::{CompletionService, ModelTier, ServiceError};
use podium_models::{ActionIntent, ActionName, PresentationState};

/// Message attached when the model itself asks for clarification.
const CLARIFICATION_MESSAGE: &str = "Не совсем понял. Уточните, пожалуйста, что нужно сделать.";

/// Confidence and retry settings for the fallback layer.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// Confidence assigned to answers from the primary model.
    pub primary_confidence: f32,
    /// Confidence assigned after degrading to the fallback model.
    pub degraded_confidence: f32,
    /// Pause before retrying on the fallback model after a rate limit.
    pub rate_limit_backoff: Duration,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            primary_confidence: 0.7,
            degraded_confidence: 0.6,
            rate_limit_backoff: Duration::from_secs(2),
        }
    }
}

/// Classifies text with a completion model.
pub struct LlmFallback {
    service: Arc<dyn CompletionService>,
    config: FallbackConfig,
}

impl LlmFallback {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            config: FallbackConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FallbackConfig) -> Self {
        self.config = config;
        self
    }

    /// Asks the model for one action or an ordered list of actions.
    ///
    /// Never fails: remote errors become a single `unknown` intent carrying
    /// the error text.
    pub async fn classify(&self, text: &str, state: PresentationState) -> Vec<ActionIntent> {
        let system = system_prompt(state);
        let user = format!("Команда пользователя: \"{}\"", text.trim());

        let (reply, confidence) = match self
            .service
            .complete(ModelTier::Primary, &system, &user)
            .await
        {
            Ok(reply) => (reply, self.config.primary_confidence),
            Err(ServiceError::RateLimited(provider)) => {
                warn!(
                    provider = %provider,
                    backoff_ms = self.config.rate_limit_backoff.as_millis() as u64,
                    "Rate limited, retrying on fallback model"
                );
                tokio::time::sleep(self.config.rate_limit_backoff).await;
                match self
                    .service
                    .complete(ModelTier::Fallback, &system, &user)
                    .await
                {
                    Ok(reply) => (reply, self.config.degraded_confidence),
                    Err(e) => {
                        warn!(error = %e, "Fallback model failed");
                        return vec![ActionIntent::unknown_with_error(e.to_string())];
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Intent model call failed");
                return vec![ActionIntent::unknown_with_error(e.to_string())];
            }
        };

        let intents = parse_model_output(&reply, confidence);
        debug!(
            reply = %reply,
            actions = ?intents.iter().map(|i| i.action).collect::<Vec<_>>(),
            "Model classification"
        );
        intents
    }
}

/// Sentence describing what is likely in each state.
pub fn state_hint(state: PresentationState) -> &'static str {
    match state {
        PresentationState::NoHost => {
            "Keynote не запущен: скорее всего пользователь хочет запустить презентацию (start)."
        }
        PresentationState::NoDocument => {
            "Keynote запущен, но презентация не открыта: навигация сейчас невозможна."
        }
        PresentationState::Ready => {
            "Презентация открыта, но не запущена: вероятна команда start или переход к слайду."
        }
        PresentationState::Playing => {
            "Идёт показ: вероятны навигация, озвучивание текста, пауза или вопросы аудитории."
        }
        PresentationState::Paused => {
            "Показ на паузе: вероятна команда resume, навигация или завершение."
        }
    }
}

/// Builds the system prompt listing the vocabulary and a state hint.
pub fn system_prompt(state: PresentationState) -> String {
    let vocabulary = ActionName::ALL
        .iter()
        .map(|a| format!("- {}: {}", a.as_str(), a.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Ты классификатор голосовых команд для управления презентацией Keynote.\n\
         Определи, какое действие хочет выполнить пользователь.\n\n\
         Допустимые действия:\n{}\n\n\
         Текущее состояние: {}. {}\n\n\
         Ответь только названием действия. Если в команде несколько действий подряд, \
         перечисли их через запятую в порядке выполнения. Если команда неоднозначна, \
         ответь need_clarification. Если это не команда, ответь unknown.",
        vocabulary,
        state,
        state_hint(state)
    )
}

/// Turns the model's reply into intents.
///
/// Any token outside the vocabulary makes the whole reply `unknown`.
pub fn parse_model_output(reply: &str, confidence: f32) -> Vec<ActionIntent> {
    let tokens: Vec<&str> = reply
        .split([',', '\n', ';'])
        .map(|t| t.trim().trim_matches(|c: char| !c.is_alphanumeric() && c != '_'))
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return vec![ActionIntent::unknown()];
    }

    let parsed: Result<Vec<ActionName>, _> = tokens.iter().map(|t| t.parse()).collect();
    let Ok(actions) = parsed else {
        debug!(reply = %reply, "Model reply outside the action vocabulary");
        return vec![ActionIntent::unknown()];
    };

    actions
        .into_iter()
        .map(|action| match action {
            ActionName::NeedClarification => {
                ActionIntent::clarification(CLARIFICATION_MESSAGE, confidence)
            }
            other => ActionIntent::new(other, confidence),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<podium_core::Result<String>>>,
        tiers: Mutex<Vec<ModelTier>>,
    }

    impl Scripted {
        fn new(replies: Vec<podium_core::Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                tiers: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionService for Scripted {
        async fn complete(
            &self,
            tier: ModelTier,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> podium_core::Result<String> {
            self.tiers.lock().unwrap().push(tier);
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn fast_config() -> FallbackConfig {
        FallbackConfig {
            rate_limit_backoff: Duration::from_millis(1),
            ..FallbackConfig::default()
        }
    }

    #[test]
    fn test_parse_single_and_list() {
        let single = parse_model_output("`next_slide`", 0.7);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].action, ActionName::NextSlide);
        assert_eq!(single[0].confidence, 0.7);

        let list = parse_model_output("start, next_slide, speak_next_block", 0.7);
        let actions: Vec<_> = list.iter().map(|i| i.action).collect();
        assert_eq!(
            actions,
            vec![ActionName::Start, ActionName::NextSlide, ActionName::SpeakNextBlock]
        );
    }

    #[test]
    fn test_parse_out_of_vocabulary_is_unknown() {
        let intents = parse_model_output("next_slide, dance", 0.7);
        assert_eq!(intents.len(), 1);
        assert!(intents[0].is_unknown());
        assert_eq!(intents[0].confidence, 0.0);

        assert!(parse_model_output("   ", 0.7)[0].is_unknown());
    }

    #[test]
    fn test_parse_clarification_carries_message() {
        let intents = parse_model_output("need_clarification", 0.7);
        assert_eq!(intents[0].action, ActionName::NeedClarification);
        assert!(intents[0].message.is_some());
    }

    #[test]
    fn test_prompt_includes_state_hint() {
        let prompt = system_prompt(PresentationState::Paused);
        assert!(prompt.contains("paused"));
        assert!(prompt.contains(state_hint(PresentationState::Paused)));
        assert!(prompt.contains("goto_slide"));
    }

    #[tokio::test]
    async fn test_rate_limit_degrades_to_fallback_model() {
        let service = Scripted::new(vec![
            Err(ServiceError::RateLimited("openrouter".into())),
            Ok("pause".into()),
        ]);
        let fallback = LlmFallback::new(service.clone()).with_config(fast_config());

        let intents = fallback.classify("притормози", PresentationState::Playing).await;

        assert_eq!(intents[0].action, ActionName::Pause);
        assert_eq!(intents[0].confidence, 0.6);
        assert_eq!(
            *service.tiers.lock().unwrap(),
            vec![ModelTier::Primary, ModelTier::Fallback]
        );
    }

    #[tokio::test]
    async fn test_transport_error_becomes_unknown_with_error() {
        let service = Scripted::new(vec![Err(ServiceError::Transport("connection reset".into()))]);
        let fallback = LlmFallback::new(service.clone()).with_config(fast_config());

        let intents = fallback.classify("что-то", PresentationState::Ready).await;

        assert_eq!(intents.len(), 1);
        assert!(intents[0].is_unknown());
        assert!(intents[0].error.as_deref().unwrap().contains("connection reset"));
        assert_eq!(service.tiers.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_rate_limit_gives_up() {
        let service = Scripted::new(vec![
            Err(ServiceError::RateLimited("openrouter".into())),
            Err(ServiceError::RateLimited("openrouter".into())),
        ]);
        let fallback = LlmFallback::new(service).with_config(fast_config());

        let intents = fallback.classify("что-то", PresentationState::Ready).await;
        assert!(intents[0].is_unknown());
    }
}
