//! Transport apportionment — integer unit counts per vehicle type.
//!
//! Given a fleet and a number of people to evacuate, [`apportion`] picks a
//! unit count for every vehicle type so that:
//! - each count stays within `[min_units, max_units]`
//! - the total capacity reaches the target, overshooting only by what
//!   integer rounding forces
//!
//! The computation runs in three steps:
//! 1. Continuous relaxation: a single partition coefficient `p` places every
//!    type at the same fraction between its maximum (`p = 0`) and minimum
//!    (`p = 1`) unit count, so that the fractional fleet matches the target.
//! 2. Discretization: each fractional count is floored.
//! 3. Remainder repair: the capacity lost by flooring is won back by bumping
//!    types with a fractional remainder, smallest capacity first, larger
//!    remainder first among equal capacities.
//!
//! ```
//! use evacsim_logic::apportion::apportion;
//! use evacsim_logic::fleet::VehicleType;
//!
//! let fleet = vec![
//!     VehicleType::new("Minibus", 10.0, 1, 5),
//!     VehicleType::new("Bus", 20.0, 1, 3),
//! ];
//! let plan = apportion(&fleet, 70.0).unwrap();
//! assert_eq!(plan.total_calculated_capacity, 70.0);
//! assert_eq!(plan.results[0].calculated_units, 3);
//! assert_eq!(plan.results[1].calculated_units, 2);
//! ```

use std::cmp::Ordering;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fleet::{capacity_envelope, VehicleType};

/// Round-off allowance for feasibility checks and remainder detection.
pub const TOLERANCE: f64 = 1e-9;

/// Final capacity may differ from the target by at most this much before a
/// warning is attached.
pub const DISCREPANCY_TOLERANCE: f64 = 1e-6;

const ZERO_TARGET_MESSAGE: &str = "Target is 0 people; deploying minimum required units.";
const FIXED_CAPACITY_MESSAGE: &str =
    "Required capacity equals the fixed total capacity. Allocating min/max units for each type.";

/// Units assigned to one vehicle type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAllocation {
    pub name: String,
    pub calculated_units: u32,
}

/// A successful apportionment, one entry per vehicle type in fleet order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetAllocation {
    pub results: Vec<UnitAllocation>,
    /// Sum of `calculated_units × capacity` over all types.
    pub total_calculated_capacity: f64,
    /// Relaxation coefficient `p` in `[0, 1]`. `None` when the fleet has a
    /// single fixed capacity and no interpolation took place.
    pub partition_coefficient: Option<f64>,
    /// Informational or warning text. Present on success too; never a
    /// failure signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FleetAllocation {
    /// Every type at its `min_units`.
    fn minimum(
        fleet: &[VehicleType],
        min_capacity: f64,
        partition_coefficient: Option<f64>,
        message: &str,
    ) -> Self {
        Self {
            results: fleet
                .iter()
                .map(|v| UnitAllocation {
                    name: v.name.clone(),
                    calculated_units: v.min_units,
                })
                .collect(),
            total_calculated_capacity: min_capacity,
            partition_coefficient,
            message: Some(message.to_string()),
        }
    }

    /// Unit count for the type with the given name.
    pub fn units_for(&self, name: &str) -> Option<u32> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.calculated_units)
    }

    pub fn total_units(&self) -> u32 {
        self.results.iter().map(|r| r.calculated_units).sum()
    }
}

/// Broad class of an [`ApportionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: fix the fleet definition or the target value.
    Structural,
    /// Well-formed input the fleet cannot serve: adjust fleet or target.
    Infeasible,
}

/// Why an apportionment could not be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApportionError {
    #[error("fleet cannot be empty")]
    EmptyFleet,
    #[error("target cannot be negative (got {0})")]
    NegativeTarget(f64),
    #[error("target must be a finite number (got {0})")]
    NonFiniteTarget(f64),
    #[error(
        "invalid data for vehicle type \"{name}\": min_units ({min_units}), max_units ({max_units}), \
         capacity ({capacity}); ensure max >= min and capacity > 0"
    )]
    InvalidVehicle {
        name: String,
        min_units: u32,
        max_units: u32,
        capacity: f64,
    },
    #[error(
        "target of {target} people is outside the achievable capacity range \
         [{min_capacity}, {max_capacity}]"
    )]
    OutOfRange {
        target: f64,
        min_capacity: f64,
        max_capacity: f64,
    },
}

impl ApportionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApportionError::OutOfRange { .. } => ErrorKind::Infeasible,
            _ => ErrorKind::Structural,
        }
    }
}

/// Fractional part left after flooring one type's relaxed unit count.
#[derive(Debug, Clone, Copy)]
struct Remainder {
    index: usize,
    fraction: f64,
}

/// Allocate integer unit counts so the fleet carries `target` people.
///
/// Preconditions are checked in order (empty fleet, negative target, first
/// malformed vehicle) and fail without further work. A zero target deploys
/// the minimum fleet; a fleet with a single fixed capacity returns its
/// minimum allocation with no partition coefficient. Rounding overshoot is
/// reported through `message`, not as an error.
pub fn apportion(fleet: &[VehicleType], target: f64) -> Result<FleetAllocation, ApportionError> {
    if fleet.is_empty() {
        return Err(ApportionError::EmptyFleet);
    }
    if target < 0.0 {
        return Err(ApportionError::NegativeTarget(target));
    }
    if !target.is_finite() {
        return Err(ApportionError::NonFiniteTarget(target));
    }
    for vehicle in fleet {
        vehicle.validate()?;
    }

    let envelope = capacity_envelope(fleet);
    debug!(
        "apportion: {} types, target {}, envelope [{}, {}]",
        fleet.len(),
        target,
        envelope.min_capacity,
        envelope.max_capacity
    );

    if target == 0.0 {
        return Ok(FleetAllocation::minimum(
            fleet,
            envelope.min_capacity,
            Some(1.0),
            ZERO_TARGET_MESSAGE,
        ));
    }

    if !envelope.contains(target) {
        return Err(ApportionError::OutOfRange {
            target,
            min_capacity: envelope.min_capacity,
            max_capacity: envelope.max_capacity,
        });
    }

    if envelope.is_fixed() {
        return Ok(FleetAllocation::minimum(
            fleet,
            envelope.min_capacity,
            None,
            FIXED_CAPACITY_MESSAGE,
        ));
    }

    let p = ((envelope.max_capacity - target) / envelope.range()).clamp(0.0, 1.0);
    let fill = 1.0 - p;
    debug!("apportion: partition coefficient p = {p}");

    // Floor the relaxed counts, remembering what was cut off.
    let mut units = Vec::with_capacity(fleet.len());
    let mut remainders = Vec::new();
    for (index, vehicle) in fleet.iter().enumerate() {
        let desired = vehicle.min_units as f64 + vehicle.unit_span() as f64 * fill;
        let floored = desired.floor();
        let floored_units = floored as u32;
        debug_assert!(
            (vehicle.min_units..=vehicle.max_units).contains(&floored_units),
            "relaxed count {desired} for {} left [{}, {}]",
            vehicle.name,
            vehicle.min_units,
            vehicle.max_units
        );
        units.push(floored_units);
        let fraction = desired - floored;
        if fraction > TOLERANCE {
            remainders.push(Remainder { index, fraction });
        }
    }

    let mut deficit = target - total_capacity(fleet, &units);
    debug!(
        "apportion: floored allocation leaves deficit {deficit} over {} fractional types",
        remainders.len()
    );

    // Stable sort: fully tied entries keep fleet order.
    remainders.sort_by(|a, b| repair_order(fleet, a, b));

    for rem in &remainders {
        let vehicle = &fleet[rem.index];
        while deficit > 0.0 && units[rem.index] < vehicle.max_units {
            units[rem.index] += 1;
            deficit -= vehicle.capacity;
            debug!(
                "apportion: +1 {} -> {} units, deficit {deficit}",
                vehicle.name, units[rem.index]
            );
        }
    }

    let total = total_capacity(fleet, &units);
    let mut notes: Vec<String> = Vec::new();
    if total > target + TOLERANCE {
        notes.push(format!(
            "Total capacity ({total}) exceeds target ({target}) by {} due to rounding up vehicle units.",
            (total - target).round()
        ));
    } else if (total - target).abs() > DISCREPANCY_TOLERANCE {
        warn!("apportion: final capacity {total} differs from target {target}");
        notes.push(format!(
            "Warning: Final calculated capacity ({total:.3}) differs from target ({target}) by more than rounding tolerance."
        ));
    }

    let results = fleet
        .iter()
        .zip(&units)
        .map(|(vehicle, &calculated_units)| UnitAllocation {
            name: vehicle.name.clone(),
            calculated_units,
        })
        .collect();

    Ok(FleetAllocation {
        results,
        total_calculated_capacity: total,
        partition_coefficient: Some(p),
        message: if notes.is_empty() {
            None
        } else {
            Some(notes.join("\n"))
        },
    })
}

/// Smaller capacity first; among equal capacities, larger remainder first.
fn repair_order(fleet: &[VehicleType], a: &Remainder, b: &Remainder) -> Ordering {
    fleet[a.index]
        .capacity
        .total_cmp(&fleet[b.index].capacity)
        .then_with(|| b.fraction.total_cmp(&a.fraction))
}

fn total_capacity(fleet: &[VehicleType], units: &[u32]) -> f64 {
    fleet
        .iter()
        .zip(units)
        .map(|(v, &u)| u as f64 * v.capacity)
        .sum()
}
