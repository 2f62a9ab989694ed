//! Automation rules: condition/action pairs evaluated each monitoring cycle.
//!
//! Rules let the system react to route state without manual intervention.
//! Each rule pairs a [`Condition`] checked against a snapshot with a single
//! [`RuleAction`] to dispatch when the condition holds. Rules are
//! independent of one another and evaluate in insertion order.

mod action;
mod condition;

pub use action::{BatchOperation, RuleAction};
pub use condition::Condition;

use serde::{Deserialize, Serialize};

use crate::error::{CourierError, ValidationError};
use crate::id::RuleId;
use crate::time::Timestamp;

/// An operator-defined rule that reacts to route state by emitting an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub name: String,
    pub enabled: bool,
    pub condition: Condition,
    pub action: RuleAction,
    /// When the rule last fired. Used as the once-per-day guard for
    /// time-of-day conditions.
    pub last_fired: Option<Timestamp>,
}

impl AutomationRule {
    /// Create a builder for constructing an [`AutomationRule`].
    #[must_use]
    pub fn builder() -> AutomationRuleBuilder {
        AutomationRuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - the condition carries an out-of-range threshold or a malformed
    ///   time-of-day pattern
    pub fn validate(&self) -> Result<(), CourierError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.condition.validate()?;
        Ok(())
    }

    /// Whether the rule already fired on the given day.
    #[must_use]
    pub fn fired_on(&self, day: Timestamp) -> bool {
        self.last_fired
            .is_some_and(|fired| crate::time::same_day(fired, day))
    }
}

/// Step-by-step builder for [`AutomationRule`].
#[derive(Debug, Default)]
pub struct AutomationRuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    enabled: Option<bool>,
    condition: Option<Condition>,
    action: Option<RuleAction>,
    last_fired: Option<Timestamp>,
}

impl AutomationRuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: RuleAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn last_fired(mut self, ts: Timestamp) -> Self {
        self.last_fired = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRule`].
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Validation`] if required fields are missing
    /// or invalid.
    pub fn build(self) -> Result<AutomationRule, CourierError> {
        let condition = self.condition.ok_or(ValidationError::NoCondition)?;
        let action = self.action.ok_or(ValidationError::NoAction)?;
        let rule = AutomationRule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            condition,
            action,
            last_fired: self.last_fired,
        };
        rule.validate()?;
        Ok(rule)
    }
}
