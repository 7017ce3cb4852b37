//! Turn entry point.
//!
//! One inbound message is one turn: classify, decide by confidence,
//! validate, execute, record. Turns of the same user are serialized by
//! holding the session lock for the whole turn.

use std::sync::Arc;

use tracing::{debug, info, warn};

use podium_core::{CompletionService, OpenRouterClient, PodiumConfig, SearchService, TavilyClient};
use podium_intent::{normalize, Classification, FallbackConfig, IntentClassifier, LlmFallback};
use podium_keynote::PresentationBackend;
use podium_models::action::PARAM_RATE;
use podium_models::{
    ActionIntent, ActionName, ExecutionResult, PresentationSnapshot, TurnResult, UserId,
};

use crate::capabilities::PresenterServices;
use crate::capability::CapabilityRegistry;
use crate::config::RuntimeConfig;
use crate::coordinator::MultiIntentCoordinator;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::session::{DialogSession, DialogSessionStore};
use crate::tracker::StateTracker;

const AFFIRMATIVE: &[&str] = &[
    "да", "ага", "угу", "верно", "точно", "конечно", "давай", "да давай", "да конечно",
    "ок", "окей", "yes", "yep", "sure", "ok",
];

const NEGATIVE: &[&str] = &[
    "нет", "не", "не надо", "нет спасибо", "отмена", "отмени", "no", "nope", "cancel",
];

const DEFAULT_CLARIFICATION: &str = "Не совсем понял. Уточните, пожалуйста, что нужно сделать.";

/// Reads a reply to a confirmation question.
///
/// `Some(true)` for yes, `Some(false)` for no, `None` for anything else.
pub fn confirmation_of(text: &str) -> Option<bool> {
    let normalized = normalize(text);
    let words: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let reply = words.join(" ");

    if AFFIRMATIVE.contains(&reply.as_str()) {
        Some(true)
    } else if NEGATIVE.contains(&reply.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Builder for [`CommandRouter`].
pub struct RouterBuilder {
    backend: Arc<dyn PresentationBackend>,
    completion: Option<Arc<dyn CompletionService>>,
    search: Option<Arc<dyn SearchService>>,
    config: RuntimeConfig,
    fallback_config: FallbackConfig,
}

impl RouterBuilder {
    /// Completion service for the fallback classifier and knowledge actions.
    pub fn completion(mut self, completion: Arc<dyn CompletionService>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn search(mut self, search: Arc<dyn SearchService>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fallback_config(mut self, config: FallbackConfig) -> Self {
        self.fallback_config = config;
        self
    }

    /// Wires the pipeline together.
    ///
    /// # Errors
    ///
    /// Fails if a built-in capability does not match its action's schema.
    pub fn build(self) -> Result<CommandRouter> {
        let mut services = PresenterServices::new(self.backend.clone());
        if let Some(completion) = &self.completion {
            services = services.with_completion(completion.clone());
        }
        if let Some(search) = &self.search {
            services = services.with_search(search.clone());
        }

        let registry = CapabilityRegistry::with_services(services)?;
        let tracker = Arc::new(StateTracker::new(self.backend));
        let executor = Arc::new(CommandExecutor::new(
            registry,
            tracker.clone(),
            self.config.command_timeout,
        ));

        let mut classifier = IntentClassifier::new().with_threshold(self.config.execution_threshold);
        if let Some(completion) = self.completion {
            classifier = classifier
                .with_fallback(LlmFallback::new(completion).with_config(self.fallback_config));
        }

        let coordinator = MultiIntentCoordinator::new(
            executor.clone(),
            self.config.multi_intent_min_confidence,
            self.config.separator.clone(),
        );
        let sessions = DialogSessionStore::new(
            self.config.session_capacity,
            self.config.session_ttl,
            self.config.history_limit,
        );

        info!(
            capabilities = executor.registry().len(),
            fallback = classifier.has_fallback(),
            "Command router ready"
        );

        Ok(CommandRouter {
            classifier,
            executor,
            tracker,
            coordinator,
            sessions,
            config: self.config,
        })
    }
}

/// Resolves and executes one message per call.
pub struct CommandRouter {
    classifier: IntentClassifier,
    executor: Arc<CommandExecutor>,
    tracker: Arc<StateTracker>,
    coordinator: MultiIntentCoordinator,
    sessions: DialogSessionStore,
    config: RuntimeConfig,
}

impl CommandRouter {
    pub fn builder(backend: Arc<dyn PresentationBackend>) -> RouterBuilder {
        RouterBuilder {
            backend,
            completion: None,
            search: None,
            config: RuntimeConfig::default(),
            fallback_config: FallbackConfig::default(),
        }
    }

    /// Builds a router with whichever remote services `config` has keys for.
    pub fn from_config(
        config: &PodiumConfig,
        backend: Arc<dyn PresentationBackend>,
        runtime: RuntimeConfig,
    ) -> Result<Self> {
        let mut builder = Self::builder(backend).config(runtime);

        if config.has_completion() {
            builder = builder.completion(Arc::new(OpenRouterClient::from_config(config)?));
        } else {
            warn!("No OpenRouter key: model fallback and knowledge actions disabled");
        }
        if config.has_search() {
            builder = builder.search(Arc::new(TavilyClient::from_config(config)?));
        } else {
            warn!("No Tavily key: web search disabled");
        }

        builder.build()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn has_fallback(&self) -> bool {
        self.classifier.has_fallback()
    }

    /// Fresh snapshot of the presentation.
    pub async fn status(&self) -> PresentationSnapshot {
        self.tracker.refresh_snapshot().await
    }

    /// Speech rate the user last asked for.
    pub async fn voice_rate(&self, user_id: UserId) -> f32 {
        self.sessions.get(user_id).await.lock().await.voice_rate
    }

    /// Copy of the user's session.
    pub async fn session(&self, user_id: UserId) -> DialogSession {
        self.sessions.get(user_id).await.lock().await.clone()
    }

    /// Handles one message from `user_id`.
    pub async fn handle_command(&self, user_id: UserId, text: &str) -> TurnResult {
        let text = text.trim();
        let handle = self.sessions.get(user_id).await;
        let mut session = handle.lock().await;

        if let Some(pending) = session.take_clarification() {
            match confirmation_of(text) {
                Some(true) => {
                    info!(user = %user_id, action = %pending.action, "Clarification confirmed");
                    let turn = self.execute_single(&mut session, pending).await;
                    record(&mut session, text, &turn);
                    return turn;
                }
                Some(false) => {
                    info!(user = %user_id, action = %pending.action, "Clarification declined");
                    let turn = TurnResult::Single {
                        action: ActionName::Unknown,
                        confidence: 0.0,
                        execution_result: Some(ExecutionResult::ok("Хорошо, ничего не делаю.")),
                    };
                    record(&mut session, text, &turn);
                    return turn;
                }
                None => debug!(user = %user_id, "Clarification answer not a yes/no, reclassifying"),
            }
        }

        let state = self.tracker.refresh().await;
        let turn = match self.classifier.classify(text, state).await {
            Classification::Multiple(intents) => {
                remember_rate(&mut session, &intents);
                self.coordinator.run(text, intents).await
            }
            Classification::Single(intent) => self.resolve_single(&mut session, intent).await,
        };

        record(&mut session, text, &turn);
        turn
    }

    /// Applies the confidence band to a single intent.
    async fn resolve_single(&self, session: &mut DialogSession, intent: ActionIntent) -> TurnResult {
        match intent.action {
            ActionName::NeedClarification => {
                session.request_clarification(None);
                TurnResult::NeedClarification {
                    message: intent
                        .message
                        .unwrap_or_else(|| DEFAULT_CLARIFICATION.to_string()),
                    candidate: None,
                    confidence: intent.confidence,
                }
            }
            ActionName::Unknown => {
                if let Some(error) = &intent.error {
                    debug!(error = %error, "Classification failed remotely");
                }
                TurnResult::Single {
                    action: ActionName::Unknown,
                    confidence: 0.0,
                    execution_result: None,
                }
            }
            action if intent.confidence < self.config.clarification_floor => {
                debug!(action = %action, confidence = intent.confidence, "Too uncertain to act");
                TurnResult::Single {
                    action,
                    confidence: intent.confidence,
                    execution_result: None,
                }
            }
            action if intent.confidence < self.config.execution_threshold => {
                let confidence = intent.confidence;
                session.request_clarification(Some(intent));
                TurnResult::NeedClarification {
                    message: format!(
                        "Возможно, вы имели в виду «{}»? Ответьте «да», чтобы выполнить.",
                        action.label()
                    ),
                    candidate: Some(action),
                    confidence,
                }
            }
            _ => self.execute_single(session, intent).await,
        }
    }

    async fn execute_single(&self, session: &mut DialogSession, intent: ActionIntent) -> TurnResult {
        remember_rate(session, std::slice::from_ref(&intent));
        let result = self
            .executor
            .validate_and_execute(intent.action, intent.params)
            .await;
        TurnResult::Single {
            action: intent.action,
            confidence: intent.confidence,
            execution_result: Some(result),
        }
    }
}

fn remember_rate(session: &mut DialogSession, intents: &[ActionIntent]) {
    if let Some(rate) = intents.iter().rev().find_map(|i| i.params.get_f64(PARAM_RATE)) {
        session.voice_rate = rate as f32;
    }
}

fn record(session: &mut DialogSession, text: &str, turn: &TurnResult) {
    let (action, success) = match turn {
        TurnResult::Single {
            action,
            execution_result,
            ..
        } => (*action, execution_result.as_ref().map(|r| r.success)),
        TurnResult::Multiple { actions, .. } => (
            actions.last().map_or(ActionName::Unknown, |a| a.action),
            Some(turn.is_success()),
        ),
        TurnResult::NeedClarification { .. } => (ActionName::NeedClarification, None),
    };
    session.record(text, action, success);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_words() {
        assert_eq!(confirmation_of("Да"), Some(true));
        assert_eq!(confirmation_of("да, давай!"), Some(true));
        assert_eq!(confirmation_of("ok"), Some(true));
        assert_eq!(confirmation_of("Нет."), Some(false));
        assert_eq!(confirmation_of("отмена"), Some(false));
        assert_eq!(confirmation_of("дальше"), None);
        assert_eq!(confirmation_of("да нет наверное"), None);
    }
}
