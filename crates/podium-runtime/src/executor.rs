//! Capability invocation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use podium_models::{ActionName, ActionParams, ExecutionResult};

use crate::capability::CapabilityRegistry;
use crate::tracker::StateTracker;
use crate::validator::ActionValidator;

/// Looks up and runs capabilities.
///
/// Every outcome is an [`ExecutionResult`]: lookup misses, timeouts and
/// errors become failed results with a user-facing message.
pub struct CommandExecutor {
    registry: CapabilityRegistry,
    tracker: Arc<StateTracker>,
    validator: ActionValidator,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(registry: CapabilityRegistry, tracker: Arc<StateTracker>, timeout: Duration) -> Self {
        Self {
            registry,
            tracker,
            validator: ActionValidator::new(),
            timeout,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &Arc<StateTracker> {
        &self.tracker
    }

    /// Refreshes the state, checks legality, then executes.
    pub async fn validate_and_execute(
        &self,
        action: ActionName,
        params: ActionParams,
    ) -> ExecutionResult {
        let snapshot = self.tracker.refresh_snapshot().await;
        let validation = self.validator.validate(action, &snapshot);
        if !validation.valid {
            info!(action = %action, state = %snapshot.state, "Action rejected in current state");
            return ExecutionResult::failure(
                validation
                    .message
                    .unwrap_or_else(|| "Команда сейчас недоступна.".to_string()),
            );
        }
        self.execute(action, params).await
    }

    /// Invokes the capability for `action` without a state check.
    ///
    /// Parameters outside the capability's accepted set are dropped. On
    /// success the tracker is refreshed so the next step sees the new state.
    pub async fn execute(&self, action: ActionName, params: ActionParams) -> ExecutionResult {
        let Some(capability) = self.registry.get(action) else {
            warn!(action = %action, "No capability registered");
            return ExecutionResult::failure(format!(
                "Команда «{}» пока не реализована.",
                action.label()
            ));
        };

        let (params, dropped) = params.retain_only(capability.accepted_params());
        if !dropped.is_empty() {
            debug!(action = %action, dropped = ?dropped, "Dropped unaccepted parameters");
        }

        info!(action = %action, params = params.len(), "Executing");
        let result = match tokio::time::timeout(self.timeout, capability.invoke(params)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!(action = %action, error = %e, "Capability failed");
                ExecutionResult::failure(e.user_message())
            }
            Err(_) => {
                error!(
                    action = %action,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Capability timed out"
                );
                ExecutionResult::failure(format!(
                    "Команда «{}» не успела выполниться. Попробуйте ещё раз.",
                    action.label()
                ))
            }
        };

        if result.success {
            self.tracker.refresh().await;
        }
        debug!(action = %action, success = result.success, "Execution finished");
        result
    }
}
