//! Snapshot: an immutable point-in-time read of vehicle and stop state.
//!
//! One snapshot is taken per monitoring cycle and every rule condition in
//! that cycle evaluates against it, so a pass never observes a half-applied
//! mutation. Snapshots are value objects and are not retained beyond one
//! evaluation.

use serde::{Deserialize, Serialize};

use crate::stop::{Priority, Stop};
use crate::time::Timestamp;
use crate::vehicle::Vehicle;

/// Consistent view of the route at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub vehicle: Vehicle,
    /// All stops in route order, regardless of status.
    pub stops: Vec<Stop>,
    pub taken_at: Timestamp,
}

impl RouteSnapshot {
    /// Iterate over the pending stops in route order.
    pub fn pending(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter().filter(|stop| stop.is_pending())
    }

    /// Number of pending stops.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Number of pending stops at or above the given priority.
    #[must_use]
    pub fn pending_at_least(&self, min: Priority) -> usize {
        self.pending().filter(|stop| stop.priority >= min).count()
    }

    /// Vehicle load as a percentage of capacity.
    #[must_use]
    pub fn load_percent(&self) -> f64 {
        self.vehicle.load_percent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stop::StopStatus;

    fn stop(priority: Priority, status: StopStatus) -> Stop {
        let mut stop = Stop::builder()
            .address("12 Harbour Road")
            .load(1.0)
            .priority(priority)
            .build()
            .unwrap();
        stop.status = status;
        stop
    }

    fn snapshot(stops: Vec<Stop>) -> RouteSnapshot {
        let mut vehicle = Vehicle::new("Ford", "Transit", 10.0, 12.5);
        vehicle.current_load = 4.0;
        RouteSnapshot {
            vehicle,
            stops,
            taken_at: crate::time::now(),
        }
    }

    #[test]
    fn should_iterate_pending_stops_only() {
        let snap = snapshot(vec![
            stop(Priority::Normal, StopStatus::Pending),
            stop(Priority::High, StopStatus::Completed),
            stop(Priority::Low, StopStatus::Pending),
            stop(Priority::Urgent, StopStatus::Skipped),
        ]);
        assert_eq!(snap.pending_count(), 2);
    }

    #[test]
    fn should_count_pending_at_or_above_priority() {
        let snap = snapshot(vec![
            stop(Priority::Low, StopStatus::Pending),
            stop(Priority::High, StopStatus::Pending),
            stop(Priority::Urgent, StopStatus::Pending),
            stop(Priority::Urgent, StopStatus::Completed),
        ]);
        assert_eq!(snap.pending_at_least(Priority::High), 2);
        assert_eq!(snap.pending_at_least(Priority::Low), 3);
    }

    #[test]
    fn should_delegate_load_percent_to_vehicle() {
        let snap = snapshot(vec![]);
        assert!((snap.load_percent() - 40.0).abs() < f64::EPSILON);
    }
}
