//! Fixed-table geocoder.

use std::collections::HashMap;
use std::future::Future;

use courier_app::ports::Geocoder;
use courier_domain::error::AddressUnresolved;
use courier_domain::stop::Coordinates;

/// Geocoder that resolves addresses from a fixed lookup table.
///
/// Matching is case-insensitive on the trimmed address. Anything not in
/// the table is reported as unresolved, which callers treat as degraded
/// rather than fatal.
pub struct StaticGeocoder {
    table: HashMap<String, Coordinates>,
}

impl Default for StaticGeocoder {
    fn default() -> Self {
        Self::with_entries([
            ("1 market street", Coordinates { lat: 51.5081, lon: -0.0759 }),
            ("12 harbour road", Coordinates { lat: 51.5033, lon: -0.0195 }),
            ("34 station approach", Coordinates { lat: 51.5154, lon: -0.0726 }),
            ("7 orchard close", Coordinates { lat: 51.4613, lon: -0.1157 }),
            ("90 mill lane", Coordinates { lat: 51.5462, lon: -0.1034 }),
        ])
    }
}

impl StaticGeocoder {
    /// Build a geocoder from explicit entries. Keys are normalized to
    /// lowercase.
    #[must_use]
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Coordinates)>,
        K: Into<String>,
    {
        let table = entries
            .into_iter()
            .map(|(key, value)| (key.into().trim().to_lowercase(), value))
            .collect();
        Self { table }
    }
}

impl Geocoder for StaticGeocoder {
    fn resolve(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinates, AddressUnresolved>> + Send {
        let result = self
            .table
            .get(&address.trim().to_lowercase())
            .copied()
            .ok_or_else(|| AddressUnresolved {
                address: address.to_string(),
            });
        async { result }
    }
}
