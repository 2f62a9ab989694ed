//! Stop registry: the single owner of vehicle and stop state.
//!
//! Every mutation (operator edits and the monitor's route reordering alike)
//! goes through the entry points on [`StopRegistry`], serialized by one
//! mutex. `snapshot()` reads under the same lock, so a snapshot never
//! observes a half-applied mutation. All operations are O(stop count) and
//! perform no IO while holding the lock.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use courier_domain::error::{CapacityExceeded, CourierError, InvalidPermutation, NotFoundError};
use courier_domain::id::StopId;
use courier_domain::snapshot::RouteSnapshot;
use courier_domain::stop::{Stop, StopStatus};
use courier_domain::time::now;
use courier_domain::vehicle::Vehicle;

struct RegistryState {
    vehicle: Vehicle,
    stops: Vec<Stop>,
}

/// Exclusive owner of the route's stops and vehicle load state.
pub struct StopRegistry {
    state: Mutex<RegistryState>,
}

impl StopRegistry {
    /// Create a registry for an empty route.
    #[must_use]
    pub fn new(vehicle: Vehicle) -> Self {
        Self::hydrate(vehicle, Vec::new())
    }

    /// Create a registry from persisted state.
    ///
    /// Stops are ordered by their stored position and positions are
    /// renumbered to be contiguous.
    #[must_use]
    pub fn hydrate(vehicle: Vehicle, mut stops: Vec<Stop>) -> Self {
        stops.sort_by_key(|stop| stop.position);
        renumber(&mut stops);
        Self {
            state: Mutex::new(RegistryState { vehicle, stops }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A poisoned lock only means another writer panicked mid-call;
        // the state itself is still consistent enough to continue.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a stop to the end of the route.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::CapacityExceeded`] when the stop's load does
    /// not fit in the vehicle's remaining capacity. State is unchanged on
    /// error.
    pub fn add_stop(&self, mut stop: Stop) -> Result<Stop, CourierError> {
        let mut state = self.lock();
        let available = state.vehicle.remaining_capacity();
        if stop.load > available {
            return Err(CapacityExceeded {
                requested: stop.load,
                available,
            }
            .into());
        }
        stop.status = StopStatus::Pending;
        stop.position = u32::try_from(state.stops.len()).unwrap_or(u32::MAX);
        state.vehicle.current_load += stop.load;
        state.stops.push(stop.clone());
        Ok(stop)
    }

    /// Remove a stop from the route, releasing its load if still aboard.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no such stop exists.
    pub fn remove_stop(&self, id: StopId) -> Result<Stop, CourierError> {
        let mut state = self.lock();
        let index = state
            .stops
            .iter()
            .position(|stop| stop.id == id)
            .ok_or_else(|| stop_not_found(id))?;
        let removed = state.stops.remove(index);
        if removed.carries_load() {
            state.vehicle.current_load = (state.vehicle.current_load - removed.load).max(0.0);
        }
        renumber(&mut state.stops);
        Ok(removed)
    }

    /// Mark a pending stop as en route.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no pending stop has this id.
    pub fn start_stop(&self, id: StopId) -> Result<Stop, CourierError> {
        let mut state = self.lock();
        let stop = find_with_status(&mut state.stops, id, &[StopStatus::Pending])?;
        stop.status = StopStatus::EnRoute;
        Ok(stop.clone())
    }

    /// Mark a pending or en-route stop as completed, consuming its load
    /// off the vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no pending or en-route stop
    /// has this id.
    pub fn complete_stop(&self, id: StopId) -> Result<Stop, CourierError> {
        let mut state = self.lock();
        let stop = find_with_status(
            &mut state.stops,
            id,
            &[StopStatus::Pending, StopStatus::EnRoute],
        )?;
        stop.status = StopStatus::Completed;
        stop.completed_at = Some(now());
        let load = stop.load;
        let stop = stop.clone();
        state.vehicle.current_load = (state.vehicle.current_load - load).max(0.0);
        Ok(stop)
    }

    /// Undo a completion, restoring the stop to pending and its load to
    /// the vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no completed stop has this
    /// id, or [`CourierError::CapacityExceeded`] when the load no longer
    /// fits (e.g. after a vehicle swap).
    pub fn undo_complete(&self, id: StopId) -> Result<Stop, CourierError> {
        let mut state = self.lock();
        let available = state.vehicle.remaining_capacity();
        let stop = find_with_status(&mut state.stops, id, &[StopStatus::Completed])?;
        if stop.load > available {
            return Err(CapacityExceeded {
                requested: stop.load,
                available,
            }
            .into());
        }
        stop.status = StopStatus::Pending;
        stop.completed_at = None;
        let load = stop.load;
        let stop = stop.clone();
        state.vehicle.current_load += load;
        Ok(stop)
    }

    /// Mark a pending or en-route stop as skipped. Its cargo stays aboard
    /// until the stop is removed.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::NotFound`] when no pending or en-route stop
    /// has this id.
    pub fn skip_stop(&self, id: StopId) -> Result<Stop, CourierError> {
        let mut state = self.lock();
        let stop = find_with_status(
            &mut state.stops,
            id,
            &[StopStatus::Pending, StopStatus::EnRoute],
        )?;
        stop.status = StopStatus::Skipped;
        Ok(stop.clone())
    }

    /// Replace the route ordering of the pending stops.
    ///
    /// Non-pending stops keep their slots; the pending slots are refilled
    /// in the order given by `new_sequence`. Load and capacity are
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::InvalidPermutation`] unless `new_sequence`
    /// is exactly a permutation of the current pending stop ids. The prior
    /// order is intact on failure.
    pub fn reorder(&self, new_sequence: &[StopId]) -> Result<(), CourierError> {
        let mut state = self.lock();

        let pending: HashMap<StopId, Stop> = state
            .stops
            .iter()
            .filter(|stop| stop.is_pending())
            .map(|stop| (stop.id, stop.clone()))
            .collect();

        if new_sequence.len() != pending.len() {
            return Err(InvalidPermutation {
                reason: format!(
                    "expected {} pending stops, got {}",
                    pending.len(),
                    new_sequence.len()
                ),
            }
            .into());
        }
        let mut seen = HashSet::new();
        for id in new_sequence {
            if !pending.contains_key(id) {
                return Err(InvalidPermutation {
                    reason: format!("{id} is not a pending stop"),
                }
                .into());
            }
            if !seen.insert(*id) {
                return Err(InvalidPermutation {
                    reason: format!("{id} appears more than once"),
                }
                .into());
            }
        }

        let mut replacements = new_sequence.iter();
        for slot in &mut state.stops {
            if !slot.is_pending() {
                continue;
            }
            if let Some(stop) = replacements.next().and_then(|id| pending.get(id)) {
                *slot = stop.clone();
            }
        }
        renumber(&mut state.stops);
        Ok(())
    }

    /// Swap in a different vehicle, carrying the current load over.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::CapacityExceeded`] when the new vehicle
    /// cannot hold the load already aboard.
    pub fn replace_vehicle(&self, mut vehicle: Vehicle) -> Result<Vehicle, CourierError> {
        let mut state = self.lock();
        if state.vehicle.current_load > vehicle.capacity {
            return Err(CapacityExceeded {
                requested: state.vehicle.current_load,
                available: vehicle.capacity,
            }
            .into());
        }
        vehicle.current_load = state.vehicle.current_load;
        state.vehicle = vehicle.clone();
        Ok(vehicle)
    }

    /// Take a consistent snapshot of the route. Side-effect-free.
    #[must_use]
    pub fn snapshot(&self) -> RouteSnapshot {
        let state = self.lock();
        RouteSnapshot {
            vehicle: state.vehicle.clone(),
            stops: state.stops.clone(),
            taken_at: now(),
        }
    }
}

fn renumber(stops: &mut [Stop]) {
    for (index, stop) in stops.iter_mut().enumerate() {
        stop.position = u32::try_from(index).unwrap_or(u32::MAX);
    }
}

fn find_with_status<'a>(
    stops: &'a mut [Stop],
    id: StopId,
    allowed: &[StopStatus],
) -> Result<&'a mut Stop, CourierError> {
    stops
        .iter_mut()
        .find(|stop| stop.id == id && allowed.contains(&stop.status))
        .ok_or_else(|| stop_not_found(id))
}

fn stop_not_found(id: StopId) -> CourierError {
    NotFoundError {
        entity: "Stop",
        id: id.to_string(),
    }
    .into()
}
