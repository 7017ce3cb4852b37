//! Classified intents.

use serde::{Deserialize, Serialize};

use crate::action::ActionName;
use crate::params::ActionParams;

/// One candidate action recognised in user text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionIntent {
    pub action: ActionName,

    /// Confidence in `[0, 1]`. Always 0.0 for [`ActionName::Unknown`].
    pub confidence: f32,

    #[serde(default, skip_serializing_if = "ActionParams::is_empty")]
    pub params: ActionParams,

    /// Human-readable prompt carried by `need_clarification`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Raw error text when classification failed on a remote call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionIntent {
    /// Creates an intent, clamping confidence into `[0, 1]`.
    pub fn new(action: ActionName, confidence: f32) -> Self {
        let confidence = if action == ActionName::Unknown || confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            action,
            confidence,
            params: ActionParams::new(),
            message: None,
            error: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(ActionName::Unknown, 0.0)
    }

    /// An `unknown` intent carrying the error that prevented classification.
    pub fn unknown_with_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::unknown()
        }
    }

    pub fn clarification(message: impl Into<String>, confidence: f32) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(ActionName::NeedClarification, confidence)
        }
    }

    pub fn with_params(mut self, params: ActionParams) -> Self {
        self.params = params;
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.action == ActionName::Unknown
    }
}
