//! Route service: operator use-cases over the stop registry.
//!
//! Wraps the registry's mutation contract with the surrounding concerns
//! the registry itself must stay free of: geocoding on add, persistence
//! writes after each mutation, and event publication. All of that IO runs
//! outside the registry lock.

use std::sync::Arc;

use courier_domain::error::CourierError;
use courier_domain::event::{Event, EventType};
use courier_domain::id::StopId;
use courier_domain::snapshot::RouteSnapshot;
use courier_domain::stop::Stop;
use courier_domain::vehicle::Vehicle;

use crate::optimizer::{self, OrderingPolicy, RouteOptimizationResult};
use crate::ports::{EventPublisher, Geocoder, RouteStore, TravelTimeProvider};
use crate::registry::StopRegistry;

/// Application service for route mutations and optimization.
pub struct RouteService<S, G, T, P> {
    registry: Arc<StopRegistry>,
    store: S,
    geocoder: G,
    travel: T,
    publisher: P,
    policy: OrderingPolicy,
}

impl<S, G, T, P> RouteService<S, G, T, P>
where
    S: RouteStore + Send + Sync,
    G: Geocoder + Send + Sync,
    T: TravelTimeProvider + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    /// Create a new service around an existing registry.
    pub fn new(
        registry: Arc<StopRegistry>,
        store: S,
        geocoder: G,
        travel: T,
        publisher: P,
        policy: OrderingPolicy,
    ) -> Self {
        Self {
            registry,
            store,
            geocoder,
            travel,
            publisher,
            policy,
        }
    }

    /// Take a consistent snapshot of the route.
    #[must_use]
    pub fn snapshot(&self) -> RouteSnapshot {
        self.registry.snapshot()
    }

    /// Add a stop to the route.
    ///
    /// Stops arriving without coordinates are geocoded first; an
    /// unresolvable address is logged and the stop is accepted with no
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Validation`] for an invalid stop,
    /// [`CourierError::CapacityExceeded`] when the load does not fit, or a
    /// storage error from the route store.
    #[tracing::instrument(skip(self, stop), fields(address = %stop.address))]
    pub async fn add_stop(&self, mut stop: Stop) -> Result<Stop, CourierError> {
        stop.validate()?;
        if stop.coordinates.is_none() {
            match self.geocoder.resolve(&stop.address).await {
                Ok(coordinates) => stop.coordinates = Some(coordinates),
                Err(err) => {
                    tracing::warn!(error = %err, "stop accepted without coordinates");
                }
            }
        }
        let stop = self.registry.add_stop(stop)?;
        self.store.save_stop(&stop).await?;
        self.save_vehicle_state().await?;
        self.publish(Event::new(
            EventType::StopAdded,
            Some(stop.id),
            serde_json::json!({"address": stop.address, "load": stop.load}),
        ))
        .await;
        Ok(stop)
    }

    /// Remove a stop from the route.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no such stop exists, or a
    /// storage error from the route store.
    #[tracing::instrument(skip(self))]
    pub async fn remove_stop(&self, id: StopId) -> Result<Stop, CourierError> {
        let removed = self.registry.remove_stop(id)?;
        self.store.delete_stop(id).await?;
        self.save_vehicle_state().await?;
        self.publish(Event::new(
            EventType::StopRemoved,
            Some(id),
            serde_json::json!({"address": removed.address}),
        ))
        .await;
        Ok(removed)
    }

    /// Mark a pending stop as en route.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no pending stop has this
    /// id, or a storage error from the route store.
    #[tracing::instrument(skip(self))]
    pub async fn start_stop(&self, id: StopId) -> Result<Stop, CourierError> {
        let stop = self.registry.start_stop(id)?;
        self.store.update_stop(&stop).await?;
        self.publish(Event::new(
            EventType::StopUpdated,
            Some(id),
            serde_json::json!({"status": stop.status}),
        ))
        .await;
        Ok(stop)
    }

    /// Complete a stop, consuming its load off the vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no pending or en-route stop
    /// has this id, or a storage error from the route store.
    #[tracing::instrument(skip(self))]
    pub async fn complete_stop(&self, id: StopId) -> Result<Stop, CourierError> {
        let stop = self.registry.complete_stop(id)?;
        self.store.update_stop(&stop).await?;
        self.save_vehicle_state().await?;
        self.publish(Event::new(
            EventType::StopCompleted,
            Some(id),
            serde_json::json!({"load": stop.load}),
        ))
        .await;
        Ok(stop)
    }

    /// Undo a completion, restoring the stop and its load.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no completed stop has this
    /// id, [`CourierError::CapacityExceeded`] when the load no longer
    /// fits, or a storage error from the route store.
    #[tracing::instrument(skip(self))]
    pub async fn undo_complete(&self, id: StopId) -> Result<Stop, CourierError> {
        let stop = self.registry.undo_complete(id)?;
        self.store.update_stop(&stop).await?;
        self.save_vehicle_state().await?;
        self.publish(Event::new(
            EventType::StopUpdated,
            Some(id),
            serde_json::json!({"status": stop.status}),
        ))
        .await;
        Ok(stop)
    }

    /// Skip a stop, leaving its cargo aboard.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no pending or en-route stop
    /// has this id, or a storage error from the route store.
    #[tracing::instrument(skip(self))]
    pub async fn skip_stop(&self, id: StopId) -> Result<Stop, CourierError> {
        let stop = self.registry.skip_stop(id)?;
        self.store.update_stop(&stop).await?;
        self.publish(Event::new(
            EventType::StopUpdated,
            Some(id),
            serde_json::json!({"status": stop.status}),
        ))
        .await;
        Ok(stop)
    }

    /// Swap in a different vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::CapacityExceeded`] when the new vehicle
    /// cannot hold the load already aboard, or a storage error from the
    /// route store.
    #[tracing::instrument(skip(self, vehicle), fields(model = %vehicle.model))]
    pub async fn replace_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle, CourierError> {
        vehicle.validate()?;
        let vehicle = self.registry.replace_vehicle(vehicle)?;
        self.store.save_vehicle(&vehicle).await?;
        Ok(vehicle)
    }

    /// Recompute the pending stop ordering and apply it to the route.
    ///
    /// The window-violation report is advisory: a failing travel-time
    /// collaborator downgrades to an empty report rather than blocking the
    /// reorder.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::InvalidPermutation`] when the pending set
    /// changed mid-flight, or a storage error from the route store.
    #[tracing::instrument(skip(self))]
    pub async fn optimize(&self) -> Result<RouteOptimizationResult, CourierError> {
        let snapshot = self.registry.snapshot();
        let ordering = optimizer::plan(&snapshot, self.policy);

        let ordered: Vec<Stop> = ordering
            .iter()
            .filter_map(|id| snapshot.stops.iter().find(|stop| stop.id == *id).cloned())
            .collect();
        let violations = match self.travel.leg_durations(&ordered).await {
            Ok(legs) => {
                let refs: Vec<&Stop> = ordered.iter().collect();
                optimizer::window_violations(&refs, &legs, snapshot.taken_at)
            }
            Err(err) => {
                tracing::warn!(error = %err, "leg durations unavailable, skipping window check");
                Vec::new()
            }
        };

        self.registry.reorder(&ordering)?;
        let reordered = self.registry.snapshot();
        self.store.save_ordering(&reordered.stops).await?;
        self.publish(Event::new(
            EventType::RouteReordered,
            None,
            serde_json::json!({
                "pending": ordering.len(),
                "window_violations": violations.len(),
            }),
        ))
        .await;

        tracing::info!(
            pending = ordering.len(),
            window_violations = violations.len(),
            "route reordered"
        );
        Ok(RouteOptimizationResult {
            ordering,
            violations,
        })
    }

    async fn save_vehicle_state(&self) -> Result<(), CourierError> {
        let vehicle = self.registry.snapshot().vehicle;
        self.store.save_vehicle(&vehicle).await
    }

    async fn publish(&self, event: Event) {
        // Event fan-out is best-effort; a full bus never fails a mutation.
        let _ = self.publisher.publish(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use courier_domain::error::{AddressUnresolved, DispatchError};
    use courier_domain::stop::{Coordinates, Priority, TimeWindow};
    use courier_domain::time::Timestamp;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    // In-memory route store.

    #[derive(Default)]
    struct InMemoryRouteStore {
        stops: Mutex<HashMap<StopId, Stop>>,
        vehicle: Mutex<Option<Vehicle>>,
    }

    impl RouteStore for InMemoryRouteStore {
        fn save_stop(&self, stop: &Stop) -> impl Future<Output = Result<(), CourierError>> + Send {
            self.stops.lock().unwrap().insert(stop.id, stop.clone());
            async { Ok(()) }
        }

        fn update_stop(
            &self,
            stop: &Stop,
        ) -> impl Future<Output = Result<(), CourierError>> + Send {
            self.stops.lock().unwrap().insert(stop.id, stop.clone());
            async { Ok(()) }
        }

        fn delete_stop(&self, id: StopId) -> impl Future<Output = Result<(), CourierError>> + Send {
            self.stops.lock().unwrap().remove(&id);
            async { Ok(()) }
        }

        fn save_ordering(
            &self,
            stops: &[Stop],
        ) -> impl Future<Output = Result<(), CourierError>> + Send {
            let mut store = self.stops.lock().unwrap();
            for stop in stops {
                store.insert(stop.id, stop.clone());
            }
            async { Ok(()) }
        }

        fn load_stops(&self) -> impl Future<Output = Result<Vec<Stop>, CourierError>> + Send {
            let mut stops: Vec<Stop> = self.stops.lock().unwrap().values().cloned().collect();
            stops.sort_by_key(|stop| stop.position);
            async { Ok(stops) }
        }

        fn save_vehicle(
            &self,
            vehicle: &Vehicle,
        ) -> impl Future<Output = Result<(), CourierError>> + Send {
            *self.vehicle.lock().unwrap() = Some(vehicle.clone());
            async { Ok(()) }
        }

        fn load_vehicle(
            &self,
        ) -> impl Future<Output = Result<Option<Vehicle>, CourierError>> + Send {
            let vehicle = self.vehicle.lock().unwrap().clone();
            async { Ok(vehicle) }
        }
    }

    // Stub collaborators.

    struct KnownAddressGeocoder;

    impl Geocoder for KnownAddressGeocoder {
        fn resolve(
            &self,
            address: &str,
        ) -> impl Future<Output = Result<Coordinates, AddressUnresolved>> + Send {
            let result = if address.contains("Harbour") {
                Ok(Coordinates {
                    lat: 51.5074,
                    lon: -0.1278,
                })
            } else {
                Err(AddressUnresolved {
                    address: address.to_string(),
                })
            };
            async { result }
        }
    }

    struct FixedLegTravel;

    impl TravelTimeProvider for FixedLegTravel {
        fn leg_durations(
            &self,
            stops: &[Stop],
        ) -> impl Future<Output = Result<Vec<TimeDelta>, CourierError>> + Send {
            let legs = vec![TimeDelta::minutes(30); stops.len()];
            async { Ok(legs) }
        }
    }

    struct FailingTravel;

    impl TravelTimeProvider for FailingTravel {
        fn leg_durations(
            &self,
            _stops: &[Stop],
        ) -> impl Future<Output = Result<Vec<TimeDelta>, CourierError>> + Send {
            async {
                Err(CourierError::Dispatch(DispatchError::Export(
                    "provider offline".to_string(),
                )))
            }
        }
    }

    #[derive(Default)]
    struct SpyPublisher {
        events: Mutex<Vec<Event>>,
    }

    impl EventPublisher for &SpyPublisher {
        fn publish(&self, event: Event) -> impl Future<Output = Result<(), CourierError>> + Send {
            self.events.lock().unwrap().push(event);
            async { Ok(()) }
        }
    }

    fn ts(h: u32, m: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2030, 6, 2, h, m, 0).unwrap()
    }

    fn service<'a, T>(
        publisher: &'a SpyPublisher,
        travel: T,
    ) -> RouteService<InMemoryRouteStore, KnownAddressGeocoder, T, &'a SpyPublisher>
    where
        T: TravelTimeProvider + Send + Sync,
    {
        let registry = Arc::new(StopRegistry::new(Vehicle::new(
            "Ford", "Transit", 10.0, 12.5,
        )));
        RouteService::new(
            registry,
            InMemoryRouteStore::default(),
            KnownAddressGeocoder,
            travel,
            publisher,
            OrderingPolicy::PriorityFirst,
        )
    }

    fn stop(address: &str, load: f64, priority: Priority) -> Stop {
        Stop::builder()
            .address(address)
            .load(load)
            .priority(priority)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_geocode_stop_on_add() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        let added = svc
            .add_stop(stop("12 Harbour Road", 2.0, Priority::Normal))
            .await
            .unwrap();
        assert!(added.coordinates.is_some());
    }

    #[tokio::test]
    async fn should_accept_stop_with_unresolvable_address() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        let added = svc
            .add_stop(stop("nowhere in particular", 2.0, Priority::Normal))
            .await
            .unwrap();
        assert!(added.coordinates.is_none());
        assert_eq!(svc.snapshot().stops.len(), 1);
    }

    #[tokio::test]
    async fn should_publish_stop_added_event() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        let added = svc
            .add_stop(stop("12 Harbour Road", 2.0, Priority::Normal))
            .await
            .unwrap();

        let events = publisher.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::StopAdded);
        assert_eq!(events[0].stop_id, Some(added.id));
    }

    #[tokio::test]
    async fn should_persist_stop_and_vehicle_on_add() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        svc.add_stop(stop("12 Harbour Road", 2.0, Priority::Normal))
            .await
            .unwrap();

        let stored = svc.store.load_stops().await.unwrap();
        assert_eq!(stored.len(), 1);
        let vehicle = svc.store.load_vehicle().await.unwrap().unwrap();
        assert!((vehicle.current_load - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_surface_capacity_error_without_persisting() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        svc.add_stop(stop("12 Harbour Road", 9.0, Priority::Normal))
            .await
            .unwrap();
        let result = svc
            .add_stop(stop("12 Harbour Road East", 3.0, Priority::Normal))
            .await;
        assert!(matches!(result, Err(CourierError::CapacityExceeded(_))));
        assert_eq!(svc.store.load_stops().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_complete_stop_and_persist_released_load() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        let added = svc
            .add_stop(stop("12 Harbour Road", 4.0, Priority::Normal))
            .await
            .unwrap();
        svc.complete_stop(added.id).await.unwrap();

        let vehicle = svc.store.load_vehicle().await.unwrap().unwrap();
        assert!((vehicle.current_load - 0.0).abs() < f64::EPSILON);

        let events = publisher.events.lock().unwrap();
        assert_eq!(events.last().unwrap().event_type, EventType::StopCompleted);
    }

    #[tokio::test]
    async fn should_apply_optimized_ordering_and_persist_positions() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        // Inserted B (low, windowed) then A (high, no window).
        let mut b = stop("12 Harbour Road", 1.0, Priority::Low);
        b.window = TimeWindow {
            start: Some(ts(9, 0)),
            end: None,
        };
        let b = svc.add_stop(b).await.unwrap();
        let a = svc
            .add_stop(stop("12 Harbour Road East", 1.0, Priority::High))
            .await
            .unwrap();

        let result = svc.optimize().await.unwrap();
        assert_eq!(result.ordering, vec![a.id, b.id]);

        let snap = svc.snapshot();
        assert_eq!(snap.stops[0].id, a.id);

        let stored = svc.store.load_stops().await.unwrap();
        assert_eq!(stored[0].id, a.id);
        assert_eq!(stored[0].position, 0);

        let events = publisher.events.lock().unwrap();
        assert_eq!(
            events.last().unwrap().event_type,
            EventType::RouteReordered
        );
    }

    #[tokio::test]
    async fn should_report_window_violations_from_leg_durations() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        // A 30 minute leg against a window that closed in the past.
        let closed = chrono::Utc.with_ymd_and_hms(2020, 1, 1, 9, 0, 0).unwrap();
        let mut tight = stop("12 Harbour Road", 1.0, Priority::Normal);
        tight.window = TimeWindow {
            start: None,
            end: Some(closed),
        };
        let tight = svc.add_stop(tight).await.unwrap();

        let result = svc.optimize().await.unwrap();
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].stop_id, tight.id);
    }

    #[tokio::test]
    async fn should_optimize_without_window_report_when_travel_fails() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FailingTravel);

        let a = svc
            .add_stop(stop("12 Harbour Road", 1.0, Priority::High))
            .await
            .unwrap();

        let result = svc.optimize().await.unwrap();
        assert_eq!(result.ordering, vec![a.id]);
        assert!(result.violations.is_empty());
    }

    #[tokio::test]
    async fn should_reject_undersized_replacement_vehicle() {
        let publisher = SpyPublisher::default();
        let svc = service(&publisher, FixedLegTravel);

        svc.add_stop(stop("12 Harbour Road", 8.0, Priority::Normal))
            .await
            .unwrap();
        let result = svc
            .replace_vehicle(Vehicle::new("Mini", "Van", 5.0, 8.0))
            .await;
        assert!(matches!(result, Err(CourierError::CapacityExceeded(_))));
    }
}
