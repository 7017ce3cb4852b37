//! Execution and turn results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::ActionName;
use crate::params::ActionParams;

/// Outcome of invoking one capability.
///
/// `message` is for display and may carry formatting; `text_to_speak` is
/// the minimal utterance to vocalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_to_speak: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl ExecutionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            text_to_speak: None,
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    pub fn with_speech(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.text_to_speak = Some(text);
        }
        self
    }

    /// Adds one entry to the `data` map.
    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn data_value(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}

/// One intent of a multi-intent turn with what happened to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentOutcome {
    pub action: ActionName,
    pub confidence: f32,

    #[serde(default, skip_serializing_if = "ActionParams::is_empty")]
    pub params: ActionParams,

    /// Present when the intent was validated and executed, or rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_result: Option<ExecutionResult>,

    /// Why the intent was not attempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl IntentOutcome {
    pub fn succeeded(&self) -> bool {
        self.execution_result.as_ref().is_some_and(|r| r.success)
    }
}

/// The response to one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnResult {
    /// One action was recognised. `execution_result` is absent when nothing
    /// was executed (unrecognised or too uncertain).
    Single {
        action: ActionName,
        confidence: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_result: Option<ExecutionResult>,
    },
    /// Several ordered actions from one utterance.
    Multiple {
        actions: Vec<IntentOutcome>,
        summary: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_to_speak: Option<String>,
    },
    /// The bot asks the user to confirm or restate.
    NeedClarification {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        candidate: Option<ActionName>,
        confidence: f32,
    },
}

impl TurnResult {
    /// Plain text shown to the user.
    pub fn display_text(&self) -> String {
        match self {
            TurnResult::Single {
                execution_result: Some(result),
                ..
            } => result.message.clone(),
            TurnResult::Single { .. } => {
                "Не удалось распознать команду. Попробуйте сказать иначе.".to_string()
            }
            TurnResult::Multiple { summary, .. } => summary.clone(),
            TurnResult::NeedClarification { message, .. } => message.clone(),
        }
    }

    /// Text to vocalize, if any.
    pub fn speech_text(&self) -> Option<&str> {
        match self {
            TurnResult::Single {
                execution_result: Some(result),
                ..
            } => result.text_to_speak.as_deref(),
            TurnResult::Single { .. } => None,
            TurnResult::Multiple { text_to_speak, .. } => text_to_speak.as_deref(),
            TurnResult::NeedClarification { message, .. } => Some(message),
        }
    }

    /// True when every executed action succeeded and at least one ran.
    pub fn is_success(&self) -> bool {
        match self {
            TurnResult::Single {
                execution_result, ..
            } => execution_result.as_ref().is_some_and(|r| r.success),
            TurnResult::Multiple { actions, .. } => {
                let executed: Vec<_> = actions
                    .iter()
                    .filter(|a| a.execution_result.is_some())
                    .collect();
                !executed.is_empty() && executed.iter().all(|a| a.succeeded())
            }
            TurnResult::NeedClarification { .. } => false,
        }
    }
}
