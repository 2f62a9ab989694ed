//! Geocoder port: address resolution collaborator.

use std::future::Future;

use courier_domain::error::AddressUnresolved;
use courier_domain::stop::Coordinates;

/// Resolves an opaque address string to coordinates.
///
/// Resolution failure is degraded and non-fatal: callers accept the stop
/// anyway with no coordinates.
pub trait Geocoder {
    /// Resolve an address.
    fn resolve(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinates, AddressUnresolved>> + Send;
}
