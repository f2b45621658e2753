//! Rule — a declarative mapping from (zone, trigger, condition) to
//! (target zone, action list), with priority and cooldown.
//!
//! Rules are immutable once loaded; the whole set is replaced atomically on
//! reload (see [`RuleSet`]).

mod condition;
mod ruleset;

pub use condition::Condition;
pub use ruleset::RuleSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::event::TriggerType;
use crate::id::{RuleId, ZoneId};
use crate::zone::ZoneSelector;

/// A single transition rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    /// Source zone this rule applies in, or the `"*"` wildcard.
    pub from: ZoneSelector,
    /// Target zone committed when the rule fires successfully.
    pub to: ZoneId,
    /// Trigger type this rule responds to.
    pub trigger: TriggerType,
    /// Predicate over the event payload.
    #[serde(default)]
    pub condition: Condition,
    /// Ordered action names, executed strictly in sequence.
    pub actions: Vec<String>,
    /// Higher wins; ties break by ascending rule id.
    #[serde(default)]
    pub priority: u32,
    /// Minimum interval between successive committed firings.
    #[serde(default)]
    pub cooldown_seconds: u64,
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Cooldown as a signed chrono duration for timestamp arithmetic.
    ///
    /// Values beyond the representable range saturate to the maximum
    /// duration, which a wall clock never elapses.
    #[must_use]
    pub fn cooldown(&self) -> chrono::Duration {
        i64::try_from(self.cooldown_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRuleId`] or
    /// [`ValidationError::NoActions`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyRuleId);
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions(self.id.clone()));
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    from: Option<ZoneSelector>,
    to: Option<ZoneId>,
    trigger: Option<TriggerType>,
    condition: Condition,
    actions: Vec<String>,
    priority: u32,
    cooldown_seconds: u64,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<RuleId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn from(mut self, from: ZoneSelector) -> Self {
        self.from = Some(from);
        self
    }

    #[must_use]
    pub fn to(mut self, to: impl Into<ZoneId>) -> Self {
        self.to = Some(to.into());
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: TriggerType) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn cooldown_seconds(mut self, seconds: u64) -> Self {
        self.cooldown_seconds = seconds;
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if required fields are missing or empty.
    pub fn build(self) -> Result<Rule, ValidationError> {
        let rule = Rule {
            id: self.id.unwrap_or_else(|| RuleId::from("")),
            from: self.from.unwrap_or(ZoneSelector::Any),
            to: self.to.unwrap_or_else(|| ZoneId::from("")),
            trigger: self.trigger.unwrap_or(TriggerType::UsbPlugged),
            condition: self.condition,
            actions: self.actions,
            priority: self.priority,
            cooldown_seconds: self.cooldown_seconds,
        };
        rule.validate()?;
        Ok(rule)
    }
}
