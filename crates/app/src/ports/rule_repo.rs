//! Rule repository port: persistence for automation rules.

use std::future::Future;

use courier_domain::error::CourierError;
use courier_domain::id::RuleId;
use courier_domain::rule::AutomationRule;
use courier_domain::time::Timestamp;

/// Repository for persisting and querying [`AutomationRule`]s.
pub trait RuleRepository {
    /// Create a new rule in storage.
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, CourierError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, CourierError>> + Send;

    /// Get all rules in insertion order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<AutomationRule>, CourierError>> + Send;

    /// Get all enabled rules in insertion order.
    fn get_enabled(&self)
    -> impl Future<Output = Result<Vec<AutomationRule>, CourierError>> + Send;

    /// Update an existing rule.
    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, CourierError>> + Send;

    /// Record that a rule fired at the given instant.
    fn mark_fired(
        &self,
        id: RuleId,
        fired_at: Timestamp,
    ) -> impl Future<Output = Result<(), CourierError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), CourierError>> + Send;
}
