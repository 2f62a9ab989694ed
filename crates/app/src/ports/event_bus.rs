//! Event publisher port: fan-out of route events.

use std::future::Future;

use courier_domain::error::CourierError;
use courier_domain::event::Event;

/// Publishes route events to any interested subscriber.
pub trait EventPublisher {
    /// Publish a single event. Must succeed even with no subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), CourierError>> + Send;
}
