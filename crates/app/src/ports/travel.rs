//! Travel-time port: per-leg duration collaborator.

use std::future::Future;

use chrono::TimeDelta;
use courier_domain::error::CourierError;
use courier_domain::stop::Stop;

/// Supplies travel durations for an ordered stop sequence.
///
/// The returned vector is aligned with the input: element `i` is the time
/// to reach stop `i` from its predecessor (or from the depot for the first
/// stop). Used only for the advisory window-violation check; failures never
/// block an optimization.
pub trait TravelTimeProvider {
    /// Estimate per-leg durations for the given ordered stops.
    fn leg_durations(
        &self,
        stops: &[Stop],
    ) -> impl Future<Output = Result<Vec<TimeDelta>, CourierError>> + Send;
}
