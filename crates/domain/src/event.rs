//! Event: an immutable record of something that happened on the route.
//!
//! Events are produced when stops change, the route is reordered, rules
//! fire, etc. They flow over the in-process event bus for any interested
//! subscriber.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, StopId};
use crate::time::Timestamp;

/// What kind of thing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StopAdded,
    StopUpdated,
    StopCompleted,
    StopRemoved,
    RouteReordered,
    RuleTriggered,
}

/// A single event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    /// The stop involved, when the event concerns a single stop.
    pub stop_id: Option<StopId>,
    /// Event-specific payload.
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, stop_id: Option<StopId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            stop_id,
            data,
            timestamp: crate::time::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stamp_new_events_with_unique_ids() {
        let a = Event::new(EventType::StopAdded, None, serde_json::json!({}));
        let b = Event::new(EventType::StopAdded, None, serde_json::json!({}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_carry_stop_id_and_payload() {
        let stop_id = StopId::new();
        let event = Event::new(
            EventType::StopCompleted,
            Some(stop_id),
            serde_json::json!({"load": 2.5}),
        );
        assert_eq!(event.stop_id, Some(stop_id));
        assert_eq!(event.data["load"], 2.5);
    }

    #[test]
    fn should_roundtrip_event_through_serde_json() {
        let event = Event::new(
            EventType::RouteReordered,
            None,
            serde_json::json!({"window_violations": 1}),
        );
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
