//! Route store port: load/save persistence for stops and the vehicle.
//!
//! The core treats persistence purely as a load/save interface; how rows
//! are laid out is the storage adapter's business.

use std::future::Future;

use courier_domain::error::CourierError;
use courier_domain::id::StopId;
use courier_domain::stop::Stop;
use courier_domain::vehicle::Vehicle;

/// Persistence for the stop list and vehicle state.
pub trait RouteStore {
    /// Persist a newly added stop.
    fn save_stop(&self, stop: &Stop) -> impl Future<Output = Result<(), CourierError>> + Send;

    /// Persist changes to an existing stop.
    fn update_stop(&self, stop: &Stop) -> impl Future<Output = Result<(), CourierError>> + Send;

    /// Remove a stop from storage.
    fn delete_stop(&self, id: StopId) -> impl Future<Output = Result<(), CourierError>> + Send;

    /// Persist the route positions of the given stops.
    fn save_ordering(&self, stops: &[Stop])
    -> impl Future<Output = Result<(), CourierError>> + Send;

    /// Load all stops in route order.
    fn load_stops(&self) -> impl Future<Output = Result<Vec<Stop>, CourierError>> + Send;

    /// Persist the vehicle state.
    fn save_vehicle(
        &self,
        vehicle: &Vehicle,
    ) -> impl Future<Output = Result<(), CourierError>> + Send;

    /// Load the vehicle state, if one has been saved.
    fn load_vehicle(&self) -> impl Future<Output = Result<Option<Vehicle>, CourierError>> + Send;
}
