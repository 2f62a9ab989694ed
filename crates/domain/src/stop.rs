//! Stop: a single delivery destination.
//!
//! A stop carries a load volume, a priority, an optional delivery time
//! window, and a position in the route ordering. Addresses are opaque
//! strings; resolving them to coordinates is a collaborator's job, and a
//! stop without coordinates is perfectly valid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CourierError, ValidationError};
use crate::id::StopId;
use crate::time::Timestamp;

/// Delivery urgency, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        };
        f.write_str(name)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("unknown priority {other:?}")),
        }
    }
}

/// Lifecycle state of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    #[default]
    Pending,
    EnRoute,
    Completed,
    Skipped,
}

impl fmt::Display for StopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::EnRoute => "en_route",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

impl FromStr for StopStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "en_route" => Ok(Self::EnRoute),
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            other => Err(format!("unknown stop status {other:?}")),
        }
    }
}

/// Geographic coordinates resolved by an external geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Delivery time window. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimeWindow {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl TimeWindow {
    /// A window with both bounds open.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// Whether any bound is set.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Check that the start does not fall after the end.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidWindow`] when both bounds are set
    /// and `start > end`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(ValidationError::InvalidWindow),
            _ => Ok(()),
        }
    }
}

/// A single delivery destination on the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    /// Cargo volume in cubic metres.
    pub load: f64,
    pub priority: Priority,
    pub window: TimeWindow,
    pub status: StopStatus,
    /// Index in the route ordering. Reassigned by the registry only.
    pub position: u32,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Stop {
    /// Create a builder for constructing a [`Stop`].
    #[must_use]
    pub fn builder() -> StopBuilder {
        StopBuilder::default()
    }

    /// Whether the stop is waiting to be routed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.status, StopStatus::Pending)
    }

    /// Whether the stop still carries load on the vehicle.
    #[must_use]
    pub fn carries_load(&self) -> bool {
        !matches!(self.status, StopStatus::Completed)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Validation`] when:
    /// - `address` is empty ([`ValidationError::EmptyAddress`])
    /// - `load` is not positive ([`ValidationError::NonPositiveLoad`])
    /// - the window start falls after its end ([`ValidationError::InvalidWindow`])
    pub fn validate(&self) -> Result<(), CourierError> {
        if self.address.is_empty() {
            return Err(ValidationError::EmptyAddress.into());
        }
        if self.load <= 0.0 {
            return Err(ValidationError::NonPositiveLoad.into());
        }
        self.window.validate()?;
        Ok(())
    }
}

/// Step-by-step builder for [`Stop`].
#[derive(Debug, Default)]
pub struct StopBuilder {
    id: Option<StopId>,
    address: Option<String>,
    coordinates: Option<Coordinates>,
    load: Option<f64>,
    priority: Option<Priority>,
    window: Option<TimeWindow>,
    created_at: Option<Timestamp>,
}

impl StopBuilder {
    #[must_use]
    pub fn id(mut self, id: StopId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    #[must_use]
    pub fn load(mut self, load: f64) -> Self {
        self.load = Some(load);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Stop`].
    ///
    /// New stops start out `Pending` at position 0; the registry assigns
    /// the real position on insertion.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Validation`] if required fields are missing
    /// or invalid.
    pub fn build(self) -> Result<Stop, CourierError> {
        let stop = Stop {
            id: self.id.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            coordinates: self.coordinates,
            load: self.load.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            window: self.window.unwrap_or_default(),
            status: StopStatus::Pending,
            position: 0,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
            completed_at: None,
        };
        stop.validate()?;
        Ok(stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2025, 6, 2, h, 0, 0).unwrap()
    }

    #[test]
    fn should_build_valid_stop_with_defaults() {
        let stop = Stop::builder()
            .address("12 Harbour Road")
            .load(2.5)
            .build()
            .unwrap();
        assert_eq!(stop.priority, Priority::Normal);
        assert_eq!(stop.status, StopStatus::Pending);
        assert!(stop.coordinates.is_none());
        assert!(!stop.window.is_constrained());
        assert!(stop.completed_at.is_none());
    }

    #[test]
    fn should_reject_empty_address() {
        let result = Stop::builder().load(1.0).build();
        assert!(matches!(
            result,
            Err(CourierError::Validation(ValidationError::EmptyAddress))
        ));
    }

    #[test]
    fn should_reject_non_positive_load() {
        let result = Stop::builder().address("somewhere").load(0.0).build();
        assert!(matches!(
            result,
            Err(CourierError::Validation(ValidationError::NonPositiveLoad))
        ));
    }

    #[test]
    fn should_reject_inverted_time_window() {
        let result = Stop::builder()
            .address("somewhere")
            .load(1.0)
            .window(TimeWindow {
                start: Some(ts(14)),
                end: Some(ts(9)),
            })
            .build();
        assert!(matches!(
            result,
            Err(CourierError::Validation(ValidationError::InvalidWindow))
        ));
    }

    #[test]
    fn should_accept_half_open_windows() {
        let stop = Stop::builder()
            .address("somewhere")
            .load(1.0)
            .window(TimeWindow {
                start: Some(ts(9)),
                end: None,
            })
            .build()
            .unwrap();
        assert!(stop.window.is_constrained());
    }

    #[test]
    fn should_order_priorities_by_urgency() {
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
    }

    #[test]
    fn should_roundtrip_priority_through_display_and_from_str() {
        for priority in [
            Priority::Low,
            Priority::Normal,
            Priority::High,
            Priority::Urgent,
        ] {
            let parsed: Priority = priority.to_string().parse().unwrap();
            assert_eq!(parsed, priority);
        }
    }

    #[test]
    fn should_roundtrip_status_through_display_and_from_str() {
        for status in [
            StopStatus::Pending,
            StopStatus::EnRoute,
            StopStatus::Completed,
            StopStatus::Skipped,
        ] {
            let parsed: StopStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn should_roundtrip_stop_through_serde_json() {
        let stop = Stop::builder()
            .address("12 Harbour Road")
            .load(2.5)
            .priority(Priority::High)
            .coordinates(Coordinates {
                lat: 51.5074,
                lon: -0.1278,
            })
            .build()
            .unwrap();
        let json = serde_json::to_string(&stop).unwrap();
        let parsed: Stop = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stop);
    }

    #[test]
    fn should_report_load_carrying_by_status() {
        let mut stop = Stop::builder()
            .address("12 Harbour Road")
            .load(2.5)
            .build()
            .unwrap();
        assert!(stop.carries_load());
        stop.status = StopStatus::Completed;
        assert!(!stop.carries_load());
        stop.status = StopStatus::Skipped;
        assert!(stop.carries_load());
    }
}
