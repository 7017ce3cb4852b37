//! Capability trait and registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use podium_models::{ActionName, ActionParams, ExecutionResult};

use crate::capabilities::{self, PresenterServices};
use crate::error::{Result, RuntimeError};

/// A named, parameterized operation the executor can invoke.
///
/// Implementations return `Ok` with a failed [`ExecutionResult`] for
/// expected refusals (slide out of range, nothing to repeat) and `Err` for
/// backend or service failures; the executor turns both into a result.
#[async_trait]
pub trait Capability: Send + Sync {
    /// The action this capability handles.
    fn action(&self) -> ActionName;

    /// Parameter keys the capability reads. Must be a subset of the
    /// action's schema; anything else is dropped before invocation.
    fn accepted_params(&self) -> &'static [&'static str] {
        &[]
    }

    async fn invoke(&self, params: ActionParams) -> Result<ExecutionResult>;
}

/// Registry of capabilities keyed by action.
///
/// Registration is checked: only executable actions, and only parameters
/// the action declares.
///
/// # Example
///
/// ```ignore
/// use podium_runtime::{CapabilityRegistry, PresenterServices};
///
/// let registry = CapabilityRegistry::with_services(services)?;
/// for action in registry.list() {
///     println!("Available: {}", action);
/// }
/// ```
pub struct CapabilityRegistry {
    capabilities: HashMap<ActionName, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Creates a registry with every built-in capability.
    pub fn with_services(services: PresenterServices) -> Result<Self> {
        let mut registry = Self::empty();
        capabilities::register_defaults(&mut registry, services)?;
        Ok(registry)
    }

    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    /// Registers a capability, replacing any previous one for the action.
    pub fn register(&mut self, capability: Arc<dyn Capability>) -> Result<()> {
        let action = capability.action();
        if !action.is_executable() {
            return Err(RuntimeError::NotExecutable(action));
        }

        let schema = action.param_schema();
        if let Some(param) = capability
            .accepted_params()
            .iter()
            .find(|p| !schema.contains(*p))
        {
            return Err(RuntimeError::UndeclaredParam {
                action,
                param: param.to_string(),
            });
        }

        self.capabilities.insert(action, capability);
        Ok(())
    }

    /// Gets the capability for an action.
    pub fn get(&self, action: ActionName) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(&action).cloned()
    }

    pub fn contains(&self, action: ActionName) -> bool {
        self.capabilities.contains_key(&action)
    }

    /// Lists registered actions in declaration order.
    pub fn list(&self) -> Vec<ActionName> {
        let mut actions: Vec<ActionName> = self.capabilities.keys().copied().collect();
        actions.sort();
        actions
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_models::action::{PARAM_COUNT, PARAM_QUERY};

    struct Fixed {
        action: ActionName,
        params: &'static [&'static str],
    }

    #[async_trait]
    impl Capability for Fixed {
        fn action(&self) -> ActionName {
            self.action
        }

        fn accepted_params(&self) -> &'static [&'static str] {
            self.params
        }

        async fn invoke(&self, _params: ActionParams) -> Result<ExecutionResult> {
            Ok(ExecutionResult::ok("done"))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = CapabilityRegistry::empty();
        assert!(registry.is_empty());

        registry
            .register(Arc::new(Fixed {
                action: ActionName::NextSlide,
                params: &[PARAM_COUNT],
            }))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get(ActionName::NextSlide).is_some());
        assert!(registry.get(ActionName::Pause).is_none());
    }

    #[test]
    fn test_undeclared_param_rejected() {
        let mut registry = CapabilityRegistry::empty();
        let err = registry
            .register(Arc::new(Fixed {
                action: ActionName::NextSlide,
                params: &[PARAM_QUERY],
            }))
            .unwrap_err();

        assert!(matches!(err, RuntimeError::UndeclaredParam { param, .. } if param == "query"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_classifier_outcomes_cannot_register() {
        let mut registry = CapabilityRegistry::empty();
        let err = registry
            .register(Arc::new(Fixed {
                action: ActionName::Unknown,
                params: &[],
            }))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NotExecutable(ActionName::Unknown)));
    }

    #[test]
    fn test_list_is_ordered() {
        let mut registry = CapabilityRegistry::empty();
        for action in [ActionName::Status, ActionName::NextSlide, ActionName::Pause] {
            registry
                .register(Arc::new(Fixed { action, params: &[] }))
                .unwrap();
        }
        assert_eq!(
            registry.list(),
            vec![ActionName::NextSlide, ActionName::Pause, ActionName::Status]
        );
    }
}
