//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

pub mod collaborators;
pub mod event_bus;
pub mod geocoder;
pub mod route_store;
pub mod rule_repo;
pub mod travel;

pub use collaborators::{BackupStore, BatchExporter, Notifier};
pub use event_bus::EventPublisher;
pub use geocoder::Geocoder;
pub use route_store::RouteStore;
pub use rule_repo::RuleRepository;
pub use travel::TravelTimeProvider;
