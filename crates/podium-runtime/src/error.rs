//! Error types for the runtime crate.

use thiserror::Error;

use podium_core::ServiceError;
use podium_keynote::BackendError;
use podium_models::ActionName;

/// Errors raised below the executor boundary.
///
/// None of these reach the caller of a turn: the executor turns them into
/// failed results.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Presentation backend error.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Knowledge or speech service error.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// No capability handles this action.
    #[error("no capability registered for '{0}'")]
    UnregisteredAction(ActionName),

    /// Classifier outcomes cannot be registered as capabilities.
    #[error("'{0}' is not an executable action")]
    NotExecutable(ActionName),

    /// A capability accepts a parameter its action does not define.
    #[error("capability for '{action}' accepts undeclared parameter '{param}'")]
    UndeclaredParam { action: ActionName, param: String },

    /// A capability was invoked without a parameter it needs.
    #[error("'{action}' requires parameter '{param}'")]
    MissingParam {
        action: ActionName,
        param: &'static str,
    },

    /// A collaborator needed by the capability was not configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl RuntimeError {
    /// Polite sentence for the user.
    pub fn user_message(&self) -> String {
        match self {
            RuntimeError::Backend(e) => e.user_message(),
            RuntimeError::Service(e) => e.user_message(),
            RuntimeError::UnregisteredAction(action) | RuntimeError::NotExecutable(action) => {
                format!("Команда «{}» пока не реализована.", action.label())
            }
            RuntimeError::UndeclaredParam { .. } => "Внутренняя ошибка конфигурации.".to_string(),
            RuntimeError::MissingParam { action, .. } => match action {
                ActionName::HandleQuestion => "Не расслышал вопрос. Повторите, пожалуйста.".to_string(),
                ActionName::SearchWeb => "Что нужно найти?".to_string(),
                _ => format!("Не хватает данных для команды «{}».", action.label()),
            },
            RuntimeError::NotConfigured(what) => format!("Сервис «{}» не настроен.", what),
        }
    }
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
