//! Executor registry — capability lookup from action name to executor.
//!
//! Resolved once at startup; rule-set validation checks action names
//! against [`ExecutorRegistry::action_names`] so the dispatcher never hits
//! an unregistered name through a validated rule set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::ports::ActionExecutor;

/// Name → executor capability table.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn ActionExecutor>>,
}

impl ExecutorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor under a unique action name. Replacing an
    /// existing registration is allowed but logged, since it usually
    /// indicates a configuration mistake.
    pub fn register(&mut self, name: impl Into<String>, executor: Arc<dyn ActionExecutor>) {
        let name = name.into();
        if self.executors.insert(name.clone(), executor).is_some() {
            tracing::warn!(action = %name, "replaced previously registered executor");
        }
    }

    /// Look up the executor for an action name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionExecutor>> {
        self.executors.get(name).cloned()
    }

    /// The set of registered action names, for rule-set validation.
    #[must_use]
    pub fn action_names(&self) -> HashSet<String> {
        self.executors.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ActionContext;
    use async_trait::async_trait;
    use zoneshift_domain::error::ActionError;

    struct NoopExecutor;

    #[async_trait]
    impl ActionExecutor for NoopExecutor {
        async fn execute(&self, _ctx: &ActionContext) -> Result<(), ActionError> {
            Ok(())
        }

        async fn rollback(&self, _ctx: &ActionContext) -> Result<(), ActionError> {
            Ok(())
        }
    }

    #[test]
    fn should_resolve_registered_executor_by_name() {
        let mut registry = ExecutorRegistry::new();
        registry.register("lockClipboard", Arc::new(NoopExecutor));
        assert!(registry.get("lockClipboard").is_some());
        assert!(registry.get("enableVpn").is_none());
    }

    #[test]
    fn should_expose_action_names_for_validation() {
        let mut registry = ExecutorRegistry::new();
        registry.register("lockClipboard", Arc::new(NoopExecutor));
        registry.register("notifyUser", Arc::new(NoopExecutor));
        let names = registry.action_names();
        assert_eq!(names.len(), 2);
        assert!(names.contains("notifyUser"));
    }

    #[test]
    fn should_replace_executor_registered_twice() {
        let mut registry = ExecutorRegistry::new();
        registry.register("notifyUser", Arc::new(NoopExecutor));
        registry.register("notifyUser", Arc::new(NoopExecutor));
        assert_eq!(registry.len(), 1);
    }
}
