//! Error types for knowledge and speech services.

use thiserror::Error;

/// Errors from remote services (completion, search, speech).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service has no credentials configured.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// The provider answered HTTP 429.
    #[error("rate limited by {0}")]
    RateLimited(String),

    /// The request did not finish in time.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not what we expected.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl ServiceError {
    /// Rate limits and timeouts are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::RateLimited(_) | ServiceError::Timeout(_))
    }

    /// Polite sentence for the user.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::NotConfigured(service) => {
                format!("Сервис «{}» не настроен.", service)
            }
            ServiceError::RateLimited(_) => {
                "Сервис перегружен запросами. Попробуйте чуть позже.".to_string()
            }
            ServiceError::Timeout(_) => "Сервис не ответил вовремя. Попробуйте ещё раз.".to_string(),
            ServiceError::Transport(_) | ServiceError::Api { .. } | ServiceError::Parse(_) => {
                "Не удалось получить ответ от внешнего сервиса.".to_string()
            }
        }
    }

    /// Maps a reqwest failure, keeping timeouts distinguishable.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(timeout_secs)
        } else if err.is_decode() {
            ServiceError::Parse(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// Result type alias for service calls.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ServiceError::RateLimited("openrouter".into()).is_transient());
        assert!(ServiceError::Timeout(30).is_transient());
        assert!(!ServiceError::Api {
            status: 400,
            body: "bad".into()
        }
        .is_transient());
        assert!(!ServiceError::NotConfigured("tavily".into()).is_transient());
    }
}
