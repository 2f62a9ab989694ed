//! Flat-speed travel model.

use std::future::Future;

use chrono::TimeDelta;

use courier_app::ports::TravelTimeProvider;
use courier_domain::error::CourierError;
use courier_domain::stop::{Coordinates, Stop};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Travel estimator using great-circle distance at a fixed average speed.
///
/// The first leg (depot to first stop) and any leg touching a stop without
/// coordinates fall back to a fixed duration.
pub struct FlatSpeedTravelModel {
    speed_kmh: f64,
    fallback: TimeDelta,
}

impl Default for FlatSpeedTravelModel {
    fn default() -> Self {
        Self {
            speed_kmh: 30.0,
            fallback: TimeDelta::minutes(15),
        }
    }
}

impl FlatSpeedTravelModel {
    /// Build a model with an explicit average speed and fallback leg time.
    #[must_use]
    pub fn new(speed_kmh: f64, fallback: TimeDelta) -> Self {
        Self {
            speed_kmh,
            fallback,
        }
    }

    fn leg(&self, from: Option<Coordinates>, to: Option<Coordinates>) -> TimeDelta {
        match (from, to) {
            (Some(from), Some(to)) if self.speed_kmh > 0.0 => {
                let km = haversine_km(from, to);
                let minutes = km / self.speed_kmh * 60.0;
                TimeDelta::minutes(minutes.ceil().max(1.0) as i64)
            }
            _ => self.fallback,
        }
    }
}

impl TravelTimeProvider for FlatSpeedTravelModel {
    fn leg_durations(
        &self,
        stops: &[Stop],
    ) -> impl Future<Output = Result<Vec<TimeDelta>, CourierError>> + Send {
        let mut legs = Vec::with_capacity(stops.len());
        let mut previous: Option<Coordinates> = None;
        for (index, stop) in stops.iter().enumerate() {
            if index == 0 {
                legs.push(self.fallback);
            } else {
                legs.push(self.leg(previous, stop.coordinates));
            }
            previous = stop.coordinates;
        }
        async { Ok(legs) }
    }
}

fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_domain::stop::Stop;

    fn stop_at(coordinates: Option<Coordinates>) -> Stop {
        let mut stop = Stop::builder()
            .address("somewhere")
            .load(1.0)
            .build()
            .unwrap();
        stop.coordinates = coordinates;
        stop
    }

    #[tokio::test]
    async fn should_return_one_leg_per_stop() {
        let model = FlatSpeedTravelModel::default();
        let stops = vec![
            stop_at(Some(Coordinates { lat: 51.50, lon: -0.07 })),
            stop_at(Some(Coordinates { lat: 51.51, lon: -0.08 })),
            stop_at(None),
        ];
        let legs = model.leg_durations(&stops).await.unwrap();
        assert_eq!(legs.len(), 3);
    }

    #[tokio::test]
    async fn should_use_fallback_for_first_leg_and_missing_coordinates() {
        let model = FlatSpeedTravelModel::new(30.0, TimeDelta::minutes(15));
        let stops = vec![
            stop_at(Some(Coordinates { lat: 51.50, lon: -0.07 })),
            stop_at(None),
        ];
        let legs = model.leg_durations(&stops).await.unwrap();
        assert_eq!(legs[0], TimeDelta::minutes(15));
        assert_eq!(legs[1], TimeDelta::minutes(15));
    }

    #[tokio::test]
    async fn should_scale_leg_time_with_distance() {
        let model = FlatSpeedTravelModel::new(60.0, TimeDelta::minutes(15));
        // Roughly one degree of latitude apart, about 111 km.
        let stops = vec![
            stop_at(Some(Coordinates { lat: 51.0, lon: 0.0 })),
            stop_at(Some(Coordinates { lat: 52.0, lon: 0.0 })),
        ];
        let legs = model.leg_durations(&stops).await.unwrap();
        let minutes = legs[1].num_minutes();
        assert!((105..=120).contains(&minutes), "got {minutes} minutes");
    }

    #[tokio::test]
    async fn should_floor_short_hops_at_one_minute() {
        let model = FlatSpeedTravelModel::new(30.0, TimeDelta::minutes(15));
        let stops = vec![
            stop_at(Some(Coordinates { lat: 51.5000, lon: -0.0700 })),
            stop_at(Some(Coordinates { lat: 51.5001, lon: -0.0701 })),
        ];
        let legs = model.leg_durations(&stops).await.unwrap();
        assert!(legs[1] >= TimeDelta::minutes(1));
    }
}
