//! Vehicle: capacity and load accounting for the delivery van.

use serde::{Deserialize, Serialize};

use crate::error::{CourierError, ValidationError};

/// The single vehicle whose stops the route covers.
///
/// Invariant: `0 <= current_load <= capacity`. The load is mutated only
/// through the stop registry (stop addition, completion, undo, removal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    /// Cargo capacity in cubic metres.
    pub capacity: f64,
    /// Volume currently aboard, in cubic metres.
    pub current_load: f64,
    /// Fuel use in litres per 100 km.
    pub fuel_efficiency: f64,
}

/// A built-in van model with known capacity figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehiclePreset {
    pub make: &'static str,
    pub model: &'static str,
    pub capacity: f64,
    pub fuel_efficiency: f64,
}

/// Built-in van capacity dataset.
const PRESETS: &[VehiclePreset] = &[
    VehiclePreset {
        make: "Ford",
        model: "Transit",
        capacity: 11.0,
        fuel_efficiency: 12.5,
    },
    VehiclePreset {
        make: "Mercedes",
        model: "Sprinter",
        capacity: 13.5,
        fuel_efficiency: 10.8,
    },
    VehiclePreset {
        make: "Volkswagen",
        model: "Crafter",
        capacity: 14.0,
        fuel_efficiency: 11.2,
    },
    VehiclePreset {
        make: "Iveco",
        model: "Daily",
        capacity: 12.0,
        fuel_efficiency: 13.1,
    },
    VehiclePreset {
        make: "Renault",
        model: "Master",
        capacity: 13.0,
        fuel_efficiency: 11.8,
    },
];

impl Vehicle {
    /// Create an empty vehicle.
    #[must_use]
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        capacity: f64,
        fuel_efficiency: f64,
    ) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            capacity,
            current_load: 0.0,
            fuel_efficiency,
        }
    }

    /// The built-in van models.
    #[must_use]
    pub fn presets() -> &'static [VehiclePreset] {
        PRESETS
    }

    /// Create an empty vehicle from a preset.
    #[must_use]
    pub fn from_preset(preset: &VehiclePreset) -> Self {
        Self::new(
            preset.make,
            preset.model,
            preset.capacity,
            preset.fuel_efficiency,
        )
    }

    /// Look up a preset by `"Make Model"` label.
    #[must_use]
    pub fn preset_named(label: &str) -> Option<&'static VehiclePreset> {
        PRESETS
            .iter()
            .find(|p| format!("{} {}", p.make, p.model) == label)
    }

    /// Remaining free cargo volume.
    #[must_use]
    pub fn remaining_capacity(&self) -> f64 {
        (self.capacity - self.current_load).max(0.0)
    }

    /// Current load as a percentage of capacity.
    #[must_use]
    pub fn load_percent(&self) -> f64 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        self.current_load / self.capacity * 100.0
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Validation`] when the capacity is not
    /// positive, or [`CourierError::CapacityExceeded`] when the current
    /// load overflows it.
    pub fn validate(&self) -> Result<(), CourierError> {
        if self.capacity <= 0.0 {
            return Err(ValidationError::NonPositiveCapacity.into());
        }
        if self.current_load < 0.0 || self.current_load > self.capacity {
            return Err(crate::error::CapacityExceeded {
                requested: self.current_load,
                available: self.capacity,
            }
            .into());
        }
        Ok(())
    }
}
