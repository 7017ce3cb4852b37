//! Ordered execution of several intents from one utterance.

use std::sync::Arc;

use tracing::{debug, info};

use podium_models::{ActionIntent, IntentOutcome, TurnResult};

use crate::executor::CommandExecutor;

/// Runs a sequence of intents one after another.
///
/// Each intent is validated against the state left by the previous one.
/// A failure does not stop the rest: the intents are independent.
pub struct MultiIntentCoordinator {
    executor: Arc<CommandExecutor>,
    min_confidence: f32,
    separator: String,
}

impl MultiIntentCoordinator {
    pub fn new(executor: Arc<CommandExecutor>, min_confidence: f32, separator: impl Into<String>) -> Self {
        Self {
            executor,
            min_confidence,
            separator: separator.into(),
        }
    }

    /// Executes `intents` in order and aggregates the outcome.
    pub async fn run(&self, text: &str, intents: Vec<ActionIntent>) -> TurnResult {
        info!(text = %text, count = intents.len(), "Running intent sequence");

        let mut outcomes = Vec::with_capacity(intents.len());
        for intent in intents {
            outcomes.push(self.run_one(intent).await);
        }

        let summary = outcomes
            .iter()
            .filter_map(|o| o.execution_result.as_ref())
            .map(|r| r.message.as_str())
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join(&self.separator);

        let speech: Vec<&str> = outcomes
            .iter()
            .filter_map(|o| o.execution_result.as_ref())
            .filter_map(|r| r.text_to_speak.as_deref())
            .collect();

        TurnResult::Multiple {
            summary,
            text_to_speak: (!speech.is_empty()).then(|| speech.join(" ")),
            actions: outcomes,
        }
    }

    async fn run_one(&self, intent: ActionIntent) -> IntentOutcome {
        let skipped = if !intent.action.is_executable() {
            Some(format!("не исполняемое действие: {}", intent.action))
        } else if intent.confidence < self.min_confidence {
            Some(format!(
                "низкая уверенность: {:.2} < {:.2}",
                intent.confidence, self.min_confidence
            ))
        } else {
            None
        };

        if let Some(reason) = skipped {
            debug!(action = %intent.action, reason = %reason, "Skipping intent");
            return IntentOutcome {
                action: intent.action,
                confidence: intent.confidence,
                params: intent.params,
                execution_result: None,
                skipped: Some(reason),
            };
        }

        let result = self
            .executor
            .validate_and_execute(intent.action, intent.params.clone())
            .await;

        IntentOutcome {
            action: intent.action,
            confidence: intent.confidence,
            params: intent.params,
            execution_result: Some(result),
            skipped: None,
        }
    }
}
