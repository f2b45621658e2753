//! External-command executor.
//!
//! Each invocation spawns the configured program with the rule application
//! context exposed through `ZONESHIFT_*` environment variables. A non-zero
//! exit status is an action failure; the dispatcher decides about retries.

use serde::Deserialize;
use tokio::process::Command;

use async_trait::async_trait;

use zoneshift_app::ports::{ActionContext, ActionExecutor};
use zoneshift_domain::error::ActionError;

/// Program invocations for one named action, as argv vectors. The first
/// element is the program, the rest its arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    pub execute: Vec<String>,
    /// Compensating program; when absent, rollback is a no-op.
    #[serde(default)]
    pub rollback: Option<Vec<String>>,
}

/// Runs external programs as a reversible side effect.
pub struct CommandExecutor {
    name: String,
    spec: CommandSpec,
}

impl CommandExecutor {
    /// Create an executor for the given action name.
    ///
    /// # Errors
    ///
    /// Returns an error when the execute argv is empty or a rollback argv
    /// is present but empty.
    pub fn new(name: impl Into<String>, spec: CommandSpec) -> Result<Self, ActionError> {
        let name = name.into();
        if spec.execute.is_empty() {
            return Err(ActionError::Failed {
                action: name,
                detail: "empty execute command".to_string(),
            });
        }
        if spec.rollback.as_ref().is_some_and(Vec::is_empty) {
            return Err(ActionError::Failed {
                action: name,
                detail: "empty rollback command".to_string(),
            });
        }
        Ok(Self { name, spec })
    }

    async fn run(&self, argv: &[String], ctx: &ActionContext) -> Result<(), ActionError> {
        let payload = serde_json::Value::Object(ctx.event.payload.clone()).to_string();
        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .env("ZONESHIFT_ACTION", &self.name)
            .env("ZONESHIFT_RULE", ctx.rule_id.as_str())
            .env("ZONESHIFT_EVENT_ID", ctx.event.id.to_string())
            .env("ZONESHIFT_TRIGGER", ctx.event.trigger.as_str())
            .env("ZONESHIFT_FROM_ZONE", ctx.from_zone.as_str())
            .env("ZONESHIFT_TO_ZONE", ctx.to_zone.as_str())
            .env("ZONESHIFT_PAYLOAD", payload)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| ActionError::Failed {
                action: self.name.clone(),
                detail: format!("failed to spawn `{}`: {err}", argv[0]),
            })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ActionError::Failed {
            action: self.name.clone(),
            detail: format!("`{}` exited with {}: {}", argv[0], output.status, stderr.trim()),
        })
    }
}

#[async_trait]
impl ActionExecutor for CommandExecutor {
    async fn execute(&self, ctx: &ActionContext) -> Result<(), ActionError> {
        tracing::debug!(action = %self.name, program = %self.spec.execute[0], "running action command");
        self.run(&self.spec.execute, ctx).await
    }

    async fn rollback(&self, ctx: &ActionContext) -> Result<(), ActionError> {
        match &self.spec.rollback {
            Some(argv) => {
                tracing::debug!(action = %self.name, program = %argv[0], "running rollback command");
                self.run(argv, ctx).await
            }
            None => {
                tracing::debug!(action = %self.name, "no rollback command configured");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoneshift_domain::event::{Payload, TriggerEvent, TriggerType};
    use zoneshift_domain::id::{RuleId, ZoneId};

    fn ctx() -> ActionContext {
        let mut payload = Payload::new();
        payload.insert("class".to_string(), "mass_storage".into());
        ActionContext {
            rule_id: RuleId::from("usb-ultra"),
            event: TriggerEvent::new(TriggerType::UsbPlugged, payload, "test"),
            from_zone: ZoneId::from("normal"),
            to_zone: ZoneId::from("ultra"),
        }
    }

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn should_reject_empty_execute_command() {
        let spec = CommandSpec {
            execute: vec![],
            rollback: None,
        };
        assert!(CommandExecutor::new("lockClipboard", spec).is_err());
    }

    #[tokio::test]
    async fn should_succeed_when_program_exits_zero() {
        let spec = CommandSpec {
            execute: argv(&["true"]),
            rollback: None,
        };
        let executor = CommandExecutor::new("lockClipboard", spec).unwrap();
        executor.execute(&ctx()).await.unwrap();
    }

    #[tokio::test]
    async fn should_fail_with_exit_status_detail_when_program_exits_nonzero() {
        let spec = CommandSpec {
            execute: argv(&["sh", "-c", "echo broken >&2; exit 3"]),
            rollback: None,
        };
        let executor = CommandExecutor::new("lockClipboard", spec).unwrap();
        let err = executor.execute(&ctx()).await.unwrap_err();
        let detail = err.to_string();
        assert!(detail.contains("broken"), "missing stderr in: {detail}");
    }

    #[tokio::test]
    async fn should_fail_when_program_does_not_exist() {
        let spec = CommandSpec {
            execute: argv(&["/nonexistent/zoneshift-test-binary"]),
            rollback: None,
        };
        let executor = CommandExecutor::new("lockClipboard", spec).unwrap();
        assert!(executor.execute(&ctx()).await.is_err());
    }

    #[tokio::test]
    async fn should_expose_context_through_environment() {
        let spec = CommandSpec {
            execute: argv(&[
                "sh",
                "-c",
                r#"test "$ZONESHIFT_TO_ZONE" = ultra && test "$ZONESHIFT_TRIGGER" = usbPlugged"#,
            ]),
            rollback: None,
        };
        let executor = CommandExecutor::new("lockClipboard", spec).unwrap();
        executor.execute(&ctx()).await.unwrap();
    }

    #[tokio::test]
    async fn should_treat_missing_rollback_as_noop() {
        let spec = CommandSpec {
            execute: argv(&["true"]),
            rollback: None,
        };
        let executor = CommandExecutor::new("lockClipboard", spec).unwrap();
        executor.rollback(&ctx()).await.unwrap();
    }

    #[tokio::test]
    async fn should_run_configured_rollback_command() {
        let spec = CommandSpec {
            execute: argv(&["true"]),
            rollback: Some(argv(&["sh", "-c", "exit 1"])),
        };
        let executor = CommandExecutor::new("lockClipboard", spec).unwrap();
        assert!(executor.rollback(&ctx()).await.is_err());
    }
}
