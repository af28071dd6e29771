//! Evacuation fleet model — vehicle types, unit bounds, capacity envelope.
//!
//! A fleet is an ordered list of [`VehicleType`]s. Order matters only for
//! reporting and for deterministic bookkeeping inside the apportionment
//! engine; it never changes which allocation is feasible.

use serde::{Deserialize, Serialize};

use crate::apportion::{ApportionError, TOLERANCE};

/// One kind of transport available for an evacuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleType {
    pub name: String,
    /// Passengers carried per unit.
    pub capacity: f64,
    /// Units that must always be deployed.
    pub min_units: u32,
    /// Hard ceiling on deployed units.
    pub max_units: u32,
}

impl VehicleType {
    pub fn new(name: impl Into<String>, capacity: f64, min_units: u32, max_units: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
            min_units,
            max_units,
        }
    }

    /// Check the per-type bounds: `max_units >= min_units` and a finite,
    /// positive capacity.
    pub fn validate(&self) -> Result<(), ApportionError> {
        let capacity_ok = self.capacity.is_finite() && self.capacity > 0.0;
        if self.max_units < self.min_units || !capacity_ok {
            return Err(ApportionError::InvalidVehicle {
                name: self.name.clone(),
                min_units: self.min_units,
                max_units: self.max_units,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Capacity with only the mandatory units deployed.
    pub fn min_capacity(&self) -> f64 {
        self.capacity * self.min_units as f64
    }

    /// Capacity with every permitted unit deployed.
    pub fn max_capacity(&self) -> f64 {
        self.capacity * self.max_units as f64
    }

    /// Number of optional units between the floor and the ceiling.
    pub fn unit_span(&self) -> u32 {
        self.max_units.saturating_sub(self.min_units)
    }
}

/// Total capacity reachable by a fleet, from all-minimum to all-maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityEnvelope {
    pub min_capacity: f64,
    pub max_capacity: f64,
}

impl CapacityEnvelope {
    pub fn range(&self) -> f64 {
        self.max_capacity - self.min_capacity
    }

    /// True when every type has `min_units == max_units`, i.e. the fleet
    /// has a single fixed total capacity.
    pub fn is_fixed(&self) -> bool {
        self.range().abs() < TOLERANCE
    }

    /// Whether `target` is reachable, allowing [`TOLERANCE`] of round-off
    /// on either edge.
    pub fn contains(&self, target: f64) -> bool {
        target >= self.min_capacity - TOLERANCE && target <= self.max_capacity + TOLERANCE
    }
}

/// Sum minimum and maximum capacities over the fleet, in fleet order.
pub fn capacity_envelope(fleet: &[VehicleType]) -> CapacityEnvelope {
    let (min_capacity, max_capacity) = fleet.iter().fold((0.0, 0.0), |(lo, hi), v| {
        (lo + v.min_capacity(), hi + v.max_capacity())
    });
    CapacityEnvelope {
        min_capacity,
        max_capacity,
    }
}

/// The built-in regional evacuation fleet.
///
/// Minimum units sum to 1090 seats, maximum units to 3326.
pub fn reference_fleet() -> Vec<VehicleType> {
    vec![
        VehicleType::new("Mercedes Sprinter", 12.0, 5, 20),
        VehicleType::new("Renault Master", 12.0, 5, 18),
        VehicleType::new("GAZ-66", 30.0, 6, 18),
        VehicleType::new("PAZ-3205", 18.0, 8, 25),
        VehicleType::new("BAZ Voloshka", 15.0, 10, 40),
        VehicleType::new("Mi-8", 8.0, 2, 10),
        VehicleType::new("Dnipro Train", 200.0, 2, 5),
        VehicleType::new("Yunyi Orel Boat", 20.0, 4, 10),
    ]
}
