//! Rule engine: pure evaluation of automation rules against a snapshot.
//!
//! The engine maps each enabled rule's condition to a boolean and, when it
//! holds, emits the rule's action descriptor. It never executes actions and
//! never performs IO, which keeps evaluation testable without mocking
//! timers or collaborators. Evaluation is deterministic in (rules,
//! snapshot): calling it twice with the same inputs yields identical
//! results.

use chrono::{NaiveTime, TimeDelta};

use courier_domain::error::RuleError;
use courier_domain::id::RuleId;
use courier_domain::rule::{AutomationRule, Condition, RuleAction};
use courier_domain::snapshot::RouteSnapshot;

/// A rule whose condition held, paired with the action to dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAction {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub action: RuleAction,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// Triggered actions in rule insertion order.
    pub triggered: Vec<TriggeredAction>,
    /// Rules that failed to evaluate, without aborting the pass.
    pub errors: Vec<(RuleId, RuleError)>,
}

/// Evaluate all rules against a single snapshot.
///
/// Disabled rules are skipped. A rule whose condition fails to evaluate
/// contributes an error entry and the pass continues with the remaining
/// rules.
#[must_use]
pub fn evaluate(rules: &[AutomationRule], snapshot: &RouteSnapshot) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for rule in rules.iter().filter(|rule| rule.enabled) {
        match condition_holds(rule, snapshot) {
            Ok(true) => evaluation.triggered.push(TriggeredAction {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                action: rule.action.clone(),
            }),
            Ok(false) => {}
            Err(err) => evaluation.errors.push((rule.id, err)),
        }
    }
    evaluation
}

fn condition_holds(rule: &AutomationRule, snapshot: &RouteSnapshot) -> Result<bool, RuleError> {
    match &rule.condition {
        Condition::CapacityThreshold { percent } => {
            Ok(snapshot.load_percent() >= f64::from(*percent))
        }
        Condition::TimeOfDay { at } => {
            let target = NaiveTime::parse_from_str(at, "%H:%M")
                .map_err(|_| RuleError::InvalidTimeOfDay { value: at.clone() })?;
            if rule.fired_on(snapshot.taken_at) {
                return Ok(false);
            }
            Ok(snapshot.taken_at.time() >= target)
        }
        Condition::PriorityPresent { min } => Ok(snapshot.pending_at_least(*min) > 0),
        Condition::WindowApproaching { warning_minutes } => {
            let horizon = TimeDelta::minutes(i64::from(*warning_minutes));
            Ok(snapshot.pending().any(|stop| {
                stop.window.start.is_some_and(|start| {
                    start >= snapshot.taken_at && start - snapshot.taken_at <= horizon
                })
            }))
        }
    }
}
