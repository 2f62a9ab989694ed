//! Condition: the route-state predicate that makes a rule fire.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::stop::Priority;

/// A predicate evaluated against a single route snapshot.
///
/// All conditions are pure reads of the snapshot; none performs IO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Holds when the vehicle load reaches the given percentage of capacity.
    CapacityThreshold {
        /// Threshold in percent, 1 to 100.
        percent: u8,
    },
    /// Holds once per day when the wall clock crosses the given minute.
    TimeOfDay {
        /// Time of day, `HH:MM` in 24-hour format.
        at: String,
    },
    /// Holds when any pending stop has at least the given priority.
    PriorityPresent {
        /// Minimum priority, inclusive.
        min: Priority,
    },
    /// Holds when a pending stop's window opens within the warning horizon.
    WindowApproaching {
        /// Horizon in minutes ahead of the window start.
        warning_minutes: u32,
    },
}

impl Condition {
    /// Check that the condition's parameters are well-formed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ThresholdOutOfRange`] for a capacity
    /// threshold outside 1..=100, or
    /// [`ValidationError::InvalidTimeOfDay`] for a time pattern that does
    /// not parse as `HH:MM`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::CapacityThreshold { percent } => {
                if *percent == 0 || *percent > 100 {
                    return Err(ValidationError::ThresholdOutOfRange);
                }
                Ok(())
            }
            Self::TimeOfDay { at } => {
                chrono::NaiveTime::parse_from_str(at, "%H:%M").map_err(|_| {
                    ValidationError::InvalidTimeOfDay { value: at.clone() }
                })?;
                Ok(())
            }
            Self::PriorityPresent { .. } | Self::WindowApproaching { .. } => Ok(()),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityThreshold { percent } => {
                write!(f, "capacity_threshold({percent}%)")
            }
            Self::TimeOfDay { at } => write!(f, "time_of_day({at})"),
            Self::PriorityPresent { min } => write!(f, "priority_present(>={min})"),
            Self::WindowApproaching { warning_minutes } => {
                write!(f, "window_approaching({warning_minutes}min)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_condition_variants() {
        let c = Condition::CapacityThreshold { percent: 80 };
        assert_eq!(c.to_string(), "capacity_threshold(80%)");

        let c = Condition::TimeOfDay {
            at: "08:30".to_string(),
        };
        assert_eq!(c.to_string(), "time_of_day(08:30)");

        let c = Condition::PriorityPresent {
            min: Priority::Urgent,
        };
        assert_eq!(c.to_string(), "priority_present(>=urgent)");

        let c = Condition::WindowApproaching {
            warning_minutes: 30,
        };
        assert_eq!(c.to_string(), "window_approaching(30min)");
    }

    #[test]
    fn should_roundtrip_conditions_through_serde_json() {
        let conditions = vec![
            Condition::CapacityThreshold { percent: 80 },
            Condition::TimeOfDay {
                at: "00:00".to_string(),
            },
            Condition::PriorityPresent {
                min: Priority::High,
            },
            Condition::WindowApproaching {
                warning_minutes: 30,
            },
        ];

        for condition in &conditions {
            let json = serde_json::to_string(condition).unwrap();
            let parsed: Condition = serde_json::from_str(&json).unwrap();
            assert_eq!(&parsed, condition);
        }
    }

    #[test]
    fn should_deserialize_capacity_threshold_from_tagged_json() {
        let json = serde_json::json!({
            "type": "capacity_threshold",
            "percent": 75
        });
        let c: Condition = serde_json::from_value(json).unwrap();
        assert!(matches!(c, Condition::CapacityThreshold { percent: 75 }));
    }

    #[test]
    fn should_deserialize_priority_present_from_tagged_json() {
        let json = serde_json::json!({
            "type": "priority_present",
            "min": "urgent"
        });
        let c: Condition = serde_json::from_value(json).unwrap();
        assert!(matches!(
            c,
            Condition::PriorityPresent {
                min: Priority::Urgent
            }
        ));
    }

    #[test]
    fn should_validate_threshold_range() {
        assert!(Condition::CapacityThreshold { percent: 100 }.validate().is_ok());
        assert!(Condition::CapacityThreshold { percent: 0 }.validate().is_err());
        assert!(Condition::CapacityThreshold { percent: 101 }.validate().is_err());
    }

    #[test]
    fn should_validate_time_of_day_format() {
        assert!(
            Condition::TimeOfDay {
                at: "23:59".to_string()
            }
            .validate()
            .is_ok()
        );
        assert!(
            Condition::TimeOfDay {
                at: "midnight".to_string()
            }
            .validate()
            .is_err()
        );
    }
}
