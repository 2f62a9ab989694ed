//! Rule service: use-cases for managing automation rules.

use courier_domain::error::{CourierError, NotFoundError};
use courier_domain::id::RuleId;
use courier_domain::rule::AutomationRule;
use courier_domain::time::Timestamp;

use crate::ports::RuleRepository;

/// Application service for rule CRUD and enablement.
pub struct RuleService<R> {
    repo: R,
}

impl<R: RuleRepository> RuleService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new rule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn create_rule(&self, rule: AutomationRule) -> Result<AutomationRule, CourierError> {
        rule.validate()?;
        self.repo.create(rule).await
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<AutomationRule, CourierError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(&self) -> Result<Vec<AutomationRule>, CourierError> {
        self.repo.get_all().await
    }

    /// List all enabled rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_enabled(&self) -> Result<Vec<AutomationRule>, CourierError> {
        self.repo.get_enabled().await
    }

    /// Update an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, rule))]
    pub async fn update_rule(&self, rule: AutomationRule) -> Result<AutomationRule, CourierError> {
        rule.validate()?;
        self.repo.update(rule).await
    }

    /// Enable or disable a rule.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(
        &self,
        id: RuleId,
        enabled: bool,
    ) -> Result<AutomationRule, CourierError> {
        let mut rule = self.get_rule(id).await?;
        rule.enabled = enabled;
        self.repo.update(rule).await
    }

    /// Record that a rule fired at the given instant.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn mark_fired(&self, id: RuleId, fired_at: Timestamp) -> Result<(), CourierError> {
        self.repo.mark_fired(id, fired_at).await
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), CourierError> {
        self.repo.delete(id).await
    }
}
