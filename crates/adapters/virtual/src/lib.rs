//! # courier-adapter-virtual
//!
//! Virtual/demo collaborators that implement the `courier-app` ports with
//! deterministic in-process behavior, for testing and demonstration:
//!
//! | Collaborator | Port | Behaviour |
//! |--------------|------|-----------|
//! | [`StaticGeocoder`] | `Geocoder` | Resolves addresses from a fixed table |
//! | [`FlatSpeedTravelModel`] | `TravelTimeProvider` | Great-circle distance at a fixed speed |
//! | [`TracingNotifier`] | `Notifier` | Logs notifications and retains them |
//! | [`FileBackupStore`] | `BackupStore` | Timestamped copy of the database file |
//! | [`JsonExportWriter`] | `BatchExporter` | Writes batch reports as JSON files |
//!
//! ## Dependency rule
//!
//! Depends on `courier-app` (port traits) and `courier-domain` only.

mod backup;
mod export;
mod geocoder;
mod notifier;
mod travel;

pub use backup::FileBackupStore;
pub use export::JsonExportWriter;
pub use geocoder::StaticGeocoder;
pub use notifier::TracingNotifier;
pub use travel::FlatSpeedTravelModel;
