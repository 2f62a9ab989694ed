//! Route optimizer: priority- and window-aware ordering of pending stops.
//!
//! Ordering is a stable sort, so stops that compare equal keep their
//! insertion order. Window feasibility is advisory only: the optimizer
//! never rejects an ordering, it just reports the stops whose projected
//! arrival (from externally supplied leg durations) falls after their
//! window end.

use std::cmp::Ordering;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use courier_domain::id::StopId;
use courier_domain::snapshot::RouteSnapshot;
use courier_domain::stop::Stop;
use courier_domain::time::Timestamp;

/// Which sort key dominates when ordering pending stops.
///
/// `PriorityFirst` is the documented default: a high-priority stop without
/// a tight window still precedes a low-priority stop with a loose one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    #[default]
    PriorityFirst,
    WindowFirst,
}

/// A stop whose projected arrival falls after its window end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowViolation {
    pub stop_id: StopId,
    pub projected_arrival: Timestamp,
    pub window_end: Timestamp,
}

/// Outcome of an optimization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOptimizationResult {
    /// New ordering of the pending stop ids.
    pub ordering: Vec<StopId>,
    /// Advisory list of stops projected to miss their windows.
    pub violations: Vec<WindowViolation>,
}

/// Compute a new ordering of the snapshot's pending stops.
#[must_use]
pub fn plan(snapshot: &RouteSnapshot, policy: OrderingPolicy) -> Vec<StopId> {
    let mut pending: Vec<&Stop> = snapshot.pending().collect();
    pending.sort_by(|a, b| compare(a, b, policy));
    pending.iter().map(|stop| stop.id).collect()
}

fn compare(a: &Stop, b: &Stop, policy: OrderingPolicy) -> Ordering {
    let by_priority = b.priority.cmp(&a.priority);
    let by_window = match (a.window.start, b.window.start) {
        (Some(x), Some(y)) => x.cmp(&y),
        // A stop with no window sorts after one with a window.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    match policy {
        OrderingPolicy::PriorityFirst => by_priority.then(by_window),
        OrderingPolicy::WindowFirst => by_window.then(by_priority),
    }
}

/// Project arrival times along `ordered` using per-leg durations and report
/// every stop whose arrival exceeds its window end.
///
/// `legs[i]` is the travel time to reach `ordered[i]` from its
/// predecessor. If fewer legs than stops are supplied the projection stops
/// at the last known leg.
#[must_use]
pub fn window_violations(
    ordered: &[&Stop],
    legs: &[TimeDelta],
    departed_at: Timestamp,
) -> Vec<WindowViolation> {
    let mut arrival = departed_at;
    let mut violations = Vec::new();
    for (stop, leg) in ordered.iter().zip(legs) {
        arrival += *leg;
        if let Some(end) = stop.window.end
            && arrival > end
        {
            violations.push(WindowViolation {
                stop_id: stop.id,
                projected_arrival: arrival,
                window_end: end,
            });
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use courier_domain::snapshot::RouteSnapshot;
    use courier_domain::stop::{Priority, StopStatus, TimeWindow};
    use courier_domain::vehicle::Vehicle;

    fn ts(h: u32, m: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn stop(address: &str, priority: Priority, window_start: Option<Timestamp>) -> Stop {
        Stop::builder()
            .address(address)
            .load(1.0)
            .priority(priority)
            .window(TimeWindow {
                start: window_start,
                end: None,
            })
            .build()
            .unwrap()
    }

    fn snapshot(stops: Vec<Stop>) -> RouteSnapshot {
        RouteSnapshot {
            vehicle: Vehicle::new("Ford", "Transit", 10.0, 12.5),
            stops,
            taken_at: ts(8, 0),
        }
    }

    #[test]
    fn should_order_high_priority_before_low_despite_window() {
        // Inserted B (low, windowed) then A (high, no window).
        let b = stop("B", Priority::Low, Some(ts(9, 0)));
        let a = stop("A", Priority::High, None);
        let (a_id, b_id) = (a.id, b.id);

        let ordering = plan(&snapshot(vec![b, a]), OrderingPolicy::PriorityFirst);
        assert_eq!(ordering, vec![a_id, b_id]);
    }

    #[test]
    fn should_order_by_window_start_within_equal_priority() {
        let late = stop("late", Priority::Normal, Some(ts(15, 0)));
        let early = stop("early", Priority::Normal, Some(ts(9, 0)));
        let open = stop("open", Priority::Normal, None);
        let (late_id, early_id, open_id) = (late.id, early.id, open.id);

        let ordering = plan(&snapshot(vec![late, open, early]), OrderingPolicy::default());
        assert_eq!(ordering, vec![early_id, late_id, open_id]);
    }

    #[test]
    fn should_preserve_insertion_order_for_equal_keys() {
        let first = stop("first", Priority::Normal, None);
        let second = stop("second", Priority::Normal, None);
        let third = stop("third", Priority::Normal, None);
        let ids = vec![first.id, second.id, third.id];

        let ordering = plan(
            &snapshot(vec![first, second, third]),
            OrderingPolicy::PriorityFirst,
        );
        assert_eq!(ordering, ids);
    }

    #[test]
    fn should_let_window_dominate_under_window_first_policy() {
        let b = stop("B", Priority::Low, Some(ts(9, 0)));
        let a = stop("A", Priority::High, None);
        let (a_id, b_id) = (a.id, b.id);

        let ordering = plan(&snapshot(vec![b, a]), OrderingPolicy::WindowFirst);
        assert_eq!(ordering, vec![b_id, a_id]);
    }

    #[test]
    fn should_ignore_non_pending_stops() {
        let mut done = stop("done", Priority::Urgent, None);
        done.status = StopStatus::Completed;
        let open = stop("open", Priority::Low, None);
        let open_id = open.id;

        let ordering = plan(&snapshot(vec![done, open]), OrderingPolicy::PriorityFirst);
        assert_eq!(ordering, vec![open_id]);
    }

    #[test]
    fn should_report_stops_arriving_after_window_end() {
        let mut tight = stop("tight", Priority::Normal, Some(ts(8, 0)));
        tight.window.end = Some(ts(8, 30));
        let loose = stop("loose", Priority::Normal, None);
        let tight_id = tight.id;

        let ordered = [&tight, &loose];
        let legs = [TimeDelta::minutes(45), TimeDelta::minutes(10)];
        let violations = window_violations(&ordered, &legs, ts(8, 0));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].stop_id, tight_id);
        assert_eq!(violations[0].projected_arrival, ts(8, 45));
    }

    #[test]
    fn should_report_nothing_when_arrivals_fit_windows() {
        let mut a = stop("a", Priority::Normal, Some(ts(8, 0)));
        a.window.end = Some(ts(12, 0));

        let ordered = [&a];
        let legs = [TimeDelta::minutes(30)];
        assert!(window_violations(&ordered, &legs, ts(8, 0)).is_empty());
    }

    #[test]
    fn should_accumulate_legs_along_the_route() {
        let mut last = stop("last", Priority::Normal, None);
        last.window.end = Some(ts(8, 50));
        let first = stop("first", Priority::Normal, None);

        let ordered = [&first, &last];
        let legs = [TimeDelta::minutes(30), TimeDelta::minutes(30)];
        let violations = window_violations(&ordered, &legs, ts(8, 0));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].projected_arrival, ts(9, 0));
    }

    #[test]
    fn should_stop_projection_when_legs_run_out() {
        let mut far = stop("far", Priority::Normal, None);
        far.window.end = Some(ts(8, 1));
        let near = stop("near", Priority::Normal, None);

        let ordered = [&near, &far];
        let legs = [TimeDelta::minutes(5)];
        assert!(window_violations(&ordered, &legs, ts(8, 0)).is_empty());
    }
}
