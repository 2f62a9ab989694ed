//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`CourierError`] via `#[from]`. Registry mutation errors are surfaced
//! synchronously to the caller; errors raised inside the periodic monitor
//! loop are logged and never abort the cycle.

/// Top-level error for the courier core.
#[derive(Debug, thiserror::Error)]
pub enum CourierError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// Adding or restoring a load would overflow the vehicle.
    #[error("capacity exceeded")]
    CapacityExceeded(#[from] CapacityExceeded),

    /// A referenced stop or rule does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A reorder request did not cover exactly the pending stops.
    #[error("invalid permutation")]
    InvalidPermutation(#[from] InvalidPermutation),

    /// Geocoding failed; the stop is still accepted without coordinates.
    #[error("address unresolved")]
    AddressUnresolved(#[from] AddressUnresolved),

    /// A single rule failed to evaluate; the pass continues.
    #[error("rule evaluation failed")]
    Rule(#[from] RuleError),

    /// A single action failed to dispatch; the batch continues.
    #[error("action dispatch failed")]
    Dispatch(#[from] DispatchError),

    /// Persistence failure from a storage adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("address must not be empty")]
    EmptyAddress,

    #[error("load must be positive")]
    NonPositiveLoad,

    #[error("time window start must not be after its end")]
    InvalidWindow,

    #[error("name must not be empty")]
    EmptyName,

    #[error("rule requires a condition")]
    NoCondition,

    #[error("rule requires an action")]
    NoAction,

    #[error("capacity threshold must be between 1 and 100")]
    ThresholdOutOfRange,

    #[error("invalid time of day {value:?}, expected HH:MM")]
    InvalidTimeOfDay { value: String },

    #[error("vehicle capacity must be positive")]
    NonPositiveCapacity,

    #[error("monitor interval must be at least one second")]
    ZeroInterval,
}

/// A load that does not fit in the vehicle's remaining capacity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("load {requested:.1}m3 exceeds remaining capacity {available:.1}m3")]
pub struct CapacityExceeded {
    pub requested: f64,
    pub available: f64,
}

/// A missing stop or rule, identified by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A reorder sequence that is not a permutation of the pending stops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop permutation: {reason}")]
pub struct InvalidPermutation {
    pub reason: String,
}

/// Geocoding could not resolve an address. Degraded and non-fatal: the
/// stop is accepted with no coordinates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not resolve address {address:?}")]
pub struct AddressUnresolved {
    pub address: String,
}

/// Per-rule evaluation failures, caught and logged without aborting the
/// evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("invalid time of day {value:?}, expected HH:MM")]
    InvalidTimeOfDay { value: String },
}

/// Per-action dispatch failures, caught and logged without blocking the
/// remaining actions in a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("notification channel failed: {0}")]
    Notification(String),

    #[error("backup store failed: {0}")]
    Backup(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("unsupported batch operation {operation}")]
    Unsupported { operation: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_capacity_exceeded_with_volumes() {
        let err = CapacityExceeded {
            requested: 3.0,
            available: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "load 3.0m3 exceeds remaining capacity 1.5m3"
        );
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Stop",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Stop abc not found");
    }

    #[test]
    fn should_convert_sub_errors_into_courier_error() {
        let err: CourierError = ValidationError::EmptyAddress.into();
        assert!(matches!(
            err,
            CourierError::Validation(ValidationError::EmptyAddress)
        ));

        let err: CourierError = InvalidPermutation {
            reason: "duplicate id".to_string(),
        }
        .into();
        assert!(matches!(err, CourierError::InvalidPermutation(_)));
    }

    #[test]
    fn should_expose_source_for_storage_errors() {
        use std::error::Error;

        let inner = std::io::Error::other("disk gone");
        let err = CourierError::Storage(Box::new(inner));
        assert!(err.source().is_some());
    }
}
