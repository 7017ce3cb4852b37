//! Runtime configuration.

use std::time::Duration;

/// Configuration for the turn pipeline.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Upper bound for a single capability invocation.
    pub command_timeout: Duration,
    /// Confidence at or above which a single intent executes directly.
    pub execution_threshold: f32,
    /// Confidence at or above which an uncertain intent is offered for confirmation.
    pub clarification_floor: f32,
    /// Intents of a sequence below this confidence are skipped.
    pub multi_intent_min_confidence: f32,
    /// Maximum number of dialog sessions kept in memory.
    pub session_capacity: usize,
    /// Sessions idle for longer than this are dropped.
    pub session_ttl: Duration,
    /// History entries kept per session.
    pub history_limit: usize,
    /// Joins messages of a multi-intent turn.
    pub separator: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(45),
            execution_threshold: 0.7,
            clarification_floor: 0.3,
            multi_intent_min_confidence: 0.5,
            session_capacity: 1000,
            session_ttl: Duration::from_secs(6 * 60 * 60),
            history_limit: 20,
            separator: "\n".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the confidence band: below `floor` is ignored, between `floor`
    /// and `threshold` asks for confirmation.
    pub fn with_confidence_band(mut self, floor: f32, threshold: f32) -> Self {
        self.clarification_floor = floor;
        self.execution_threshold = threshold;
        self
    }

    /// Sets the minimum confidence for intents inside a sequence.
    pub fn with_multi_intent_min_confidence(mut self, confidence: f32) -> Self {
        self.multi_intent_min_confidence = confidence;
        self
    }

    /// Sets session capacity and idle TTL.
    pub fn with_session_limits(mut self, capacity: usize, ttl: Duration) -> Self {
        self.session_capacity = capacity.max(1);
        self.session_ttl = ttl;
        self
    }

    /// Sets the per-session history length.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Sets the separator for aggregated messages.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();

        assert_eq!(config.execution_threshold, 0.7);
        assert_eq!(config.clarification_floor, 0.3);
        assert_eq!(config.multi_intent_min_confidence, 0.5);
        assert_eq!(config.separator, "\n");
    }

    #[test]
    fn test_config_builder() {
        let config = RuntimeConfig::new()
            .with_command_timeout(Duration::from_secs(3))
            .with_confidence_band(0.2, 0.8)
            .with_session_limits(0, Duration::from_secs(60))
            .with_separator(" | ");

        assert_eq!(config.command_timeout, Duration::from_secs(3));
        assert_eq!(config.clarification_floor, 0.2);
        assert_eq!(config.execution_threshold, 0.8);
        assert_eq!(config.session_capacity, 1);
        assert_eq!(config.separator, " | ");
    }
}
