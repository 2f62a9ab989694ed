//! # courier-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using sqlx. Implements the `RouteStore`
//! and `RuleRepository` ports defined in `courier-app`.

mod error;
mod pool;
mod rule_repo;
mod stop_repo;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use rule_repo::SqliteRuleRepository;
pub use stop_repo::SqliteRouteStore;
