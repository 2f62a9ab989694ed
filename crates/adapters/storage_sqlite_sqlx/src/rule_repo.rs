//! `SQLite` implementation of [`RuleRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use courier_app::ports::RuleRepository;
use courier_domain::error::CourierError;
use courier_domain::id::RuleId;
use courier_domain::rule::{AutomationRule, Condition, RuleAction};
use courier_domain::time::Timestamp;

use crate::error::StorageError;

struct Wrapper(AutomationRule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<AutomationRule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let enabled: bool = row.try_get("enabled")?;
        let condition_json: String = row.try_get("condition")?;
        let action_json: String = row.try_get("action")?;
        let last_fired_str: Option<String> = row.try_get("last_fired")?;

        let id = RuleId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let condition: Condition = serde_json::from_str(&condition_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let action: RuleAction = serde_json::from_str(&action_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_fired = last_fired_str
            .map(|s| {
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.to_utc())
                    .map_err(|err| sqlx::Error::Decode(Box::new(err)))
            })
            .transpose()?;

        Ok(Self(AutomationRule {
            id,
            name,
            enabled,
            condition,
            action,
            last_fired,
        }))
    }
}

/// `SQLite`-backed rule repository.
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create(&self, rule: AutomationRule) -> Result<AutomationRule, CourierError> {
        let condition_json = serde_json::to_string(&rule.condition).map_err(StorageError::from)?;
        let action_json = serde_json::to_string(&rule.action).map_err(StorageError::from)?;
        let last_fired = rule.last_fired.map(|ts| ts.to_rfc3339());

        sqlx::query(
                "INSERT INTO rules (id, name, enabled, condition, action, last_fired, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(rule.id.to_string())
            .bind(&rule.name)
            .bind(rule.enabled)
            .bind(&condition_json)
            .bind(&action_json)
            .bind(&last_fired)
            .bind(courier_domain::time::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<AutomationRule>, CourierError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM rules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<AutomationRule>, CourierError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM rules ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_enabled(&self) -> Result<Vec<AutomationRule>, CourierError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM rules WHERE enabled = 1 ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, CourierError> {
        let condition_json = serde_json::to_string(&rule.condition).map_err(StorageError::from)?;
        let action_json = serde_json::to_string(&rule.action).map_err(StorageError::from)?;
        let last_fired = rule.last_fired.map(|ts| ts.to_rfc3339());

        sqlx::query(
                "UPDATE rules SET name = ?, enabled = ?, condition = ?, action = ?, last_fired = ? WHERE id = ?",
            )
            .bind(&rule.name)
            .bind(rule.enabled)
            .bind(&condition_json)
            .bind(&action_json)
            .bind(&last_fired)
            .bind(rule.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn mark_fired(&self, id: RuleId, fired_at: Timestamp) -> Result<(), CourierError> {
        sqlx::query("UPDATE rules SET last_fired = ? WHERE id = ?")
            .bind(fired_at.to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn delete(&self, id: RuleId) -> Result<(), CourierError> {
        sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use courier_domain::rule::BatchOperation;
    use courier_domain::stop::Priority;

    async fn setup() -> SqliteRuleRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteRuleRepository::new(db.pool().clone())
    }

    fn valid_rule() -> AutomationRule {
        AutomationRule::builder()
            .name("capacity optimizer")
            .condition(Condition::CapacityThreshold { percent: 80 })
            .action(RuleAction::OptimizeRoute)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_rule() {
        let repo = setup().await;
        let rule = valid_rule();
        let id = rule.id;

        repo.create(rule).await.unwrap();
        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.name, "capacity optimizer");
        assert!(fetched.enabled);
    }

    #[tokio::test]
    async fn should_return_none_when_rule_not_found() {
        let repo = setup().await;
        let result = repo.get_by_id(RuleId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_list_only_enabled_rules() {
        let repo = setup().await;
        repo.create(valid_rule()).await.unwrap();

        let mut disabled = valid_rule();
        disabled.name = "disabled rule".to_string();
        disabled.enabled = false;
        repo.create(disabled).await.unwrap();

        let enabled = repo.get_enabled().await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert!(enabled[0].enabled);

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn should_update_rule() {
        let repo = setup().await;
        let rule = valid_rule();
        let id = rule.id;
        repo.create(rule).await.unwrap();

        let mut fetched = repo.get_by_id(id).await.unwrap().unwrap();
        fetched.name = "renamed".to_string();
        fetched.enabled = false;
        repo.update(fetched).await.unwrap();

        let updated = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(updated.name, "renamed");
        assert!(!updated.enabled);
    }

    #[tokio::test]
    async fn should_record_last_fired() {
        let repo = setup().await;
        let rule = valid_rule();
        let id = rule.id;
        repo.create(rule).await.unwrap();

        let fired_at = courier_domain::time::now();
        repo.mark_fired(id, fired_at).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.last_fired, Some(fired_at));
    }

    #[tokio::test]
    async fn should_delete_rule() {
        let repo = setup().await;
        let rule = valid_rule();
        let id = rule.id;
        repo.create(rule).await.unwrap();

        repo.delete(id).await.unwrap();
        assert!(repo.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_preserve_condition_and_action_through_roundtrip() {
        let repo = setup().await;
        let rule = AutomationRule::builder()
            .name("complex rule")
            .condition(Condition::PriorityPresent {
                min: Priority::Urgent,
            })
            .action(RuleAction::BatchProcess {
                operation: BatchOperation::DailySummary,
            })
            .build()
            .unwrap();
        let id = rule.id;

        repo.create(rule).await.unwrap();
        let fetched = repo.get_by_id(id).await.unwrap().unwrap();

        assert!(matches!(
            fetched.condition,
            Condition::PriorityPresent {
                min: Priority::Urgent
            }
        ));
        assert!(matches!(
            fetched.action,
            RuleAction::BatchProcess {
                operation: BatchOperation::DailySummary
            }
        ));
    }
}
