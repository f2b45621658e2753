//! Logging executor — emits a structured line instead of a side effect.
//!
//! Useful as a user notifier and for smoke-testing rule sets without
//! touching the system.

use async_trait::async_trait;

use zoneshift_app::ports::{ActionContext, ActionExecutor};
use zoneshift_domain::error::ActionError;

/// Always-succeeding executor that only logs.
pub struct LogExecutor {
    name: String,
}

impl LogExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl ActionExecutor for LogExecutor {
    async fn execute(&self, ctx: &ActionContext) -> Result<(), ActionError> {
        tracing::info!(
            action = %self.name,
            rule = %ctx.rule_id,
            from = %ctx.from_zone,
            to = %ctx.to_zone,
            trigger = %ctx.event.trigger,
            "action fired"
        );
        Ok(())
    }

    async fn rollback(&self, ctx: &ActionContext) -> Result<(), ActionError> {
        tracing::info!(
            action = %self.name,
            rule = %ctx.rule_id,
            "action rolled back"
        );
        Ok(())
    }
}
