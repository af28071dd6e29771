//! Transport statistics — display rows derived from an apportionment.
//!
//! Nothing here allocates units; it only multiplies out what the engine
//! decided and compares the result with the people target.

use serde::{Deserialize, Serialize};

use crate::apportion::{ApportionError, FleetAllocation};
use crate::fleet::VehicleType;

/// One display row: a vehicle type that is actually deployed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportItem {
    pub name: String,
    pub units: u32,
    pub unit_capacity: f64,
    pub total_capacity: f64,
}

/// All display rows plus fleet-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportStats {
    pub items: Vec<TransportItem>,
    pub total_units: u32,
    pub total_capacity: f64,
}

impl TransportStats {
    /// Build rows from an allocation. Types with zero units are skipped.
    ///
    /// `fleet` must be the fleet the allocation was computed from; rows are
    /// matched by position, so both are walked in order.
    pub fn from_allocation(fleet: &[VehicleType], allocation: &FleetAllocation) -> Self {
        let mut stats = TransportStats::default();
        for (vehicle, result) in fleet.iter().zip(&allocation.results) {
            if result.calculated_units == 0 {
                continue;
            }
            let total_capacity = vehicle.capacity * result.calculated_units as f64;
            stats.items.push(TransportItem {
                name: result.name.clone(),
                units: result.calculated_units,
                unit_capacity: vehicle.capacity,
                total_capacity,
            });
            stats.total_units += result.calculated_units;
            stats.total_capacity += total_capacity;
        }
        stats
    }

    /// Empty stats when the apportionment failed.
    pub fn from_result(
        fleet: &[VehicleType],
        result: &Result<FleetAllocation, ApportionError>,
    ) -> Self {
        match result {
            Ok(allocation) => Self::from_allocation(fleet, allocation),
            Err(_) => TransportStats::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Whether the deployed capacity seats everyone.
pub fn all_people_placed(stats: &TransportStats, people: f64) -> bool {
    stats.total_capacity >= people
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apportion::{apportion, UnitAllocation};

    fn fleet() -> Vec<VehicleType> {
        vec![
            VehicleType::new("A", 10.0, 0, 5),
            VehicleType::new("B", 20.0, 1, 3),
            VehicleType::new("C", 50.0, 0, 2),
        ]
    }

    fn allocation(units: &[u32]) -> FleetAllocation {
        let results = fleet()
            .iter()
            .zip(units)
            .map(|(v, &u)| UnitAllocation {
                name: v.name.clone(),
                calculated_units: u,
            })
            .collect();
        FleetAllocation {
            results,
            total_calculated_capacity: 0.0,
            partition_coefficient: Some(0.5),
            message: None,
        }
    }

    #[test]
    fn test_rows_multiply_capacity() {
        let stats = TransportStats::from_allocation(&fleet(), &allocation(&[3, 2, 1]));
        assert_eq!(stats.items.len(), 3);
        assert_eq!(stats.items[1].name, "B");
        assert_eq!(stats.items[1].unit_capacity, 20.0);
        assert_eq!(stats.items[1].total_capacity, 40.0);
        assert_eq!(stats.total_units, 6);
        assert_eq!(stats.total_capacity, 120.0);
    }

    #[test]
    fn test_zero_unit_types_skipped() {
        let stats = TransportStats::from_allocation(&fleet(), &allocation(&[0, 1, 0]));
        assert_eq!(stats.items.len(), 1);
        assert_eq!(stats.items[0].name, "B");
        assert_eq!(stats.total_capacity, 20.0);
    }

    #[test]
    fn test_failure_gives_empty_stats() {
        let result = apportion(&fleet(), 10_000.0);
        let stats = TransportStats::from_result(&fleet(), &result);
        assert!(stats.is_empty());
        assert_eq!(stats.total_units, 0);
        assert!(!all_people_placed(&stats, 1.0));
    }

    #[test]
    fn test_totals_match_engine() {
        let fleet = fleet();
        let plan = apportion(&fleet, 137.0).unwrap();
        let stats = TransportStats::from_allocation(&fleet, &plan);
        assert_eq!(stats.total_capacity, plan.total_calculated_capacity);
        assert_eq!(stats.total_units, plan.total_units());
        assert!(all_people_placed(&stats, 137.0));
    }

    #[test]
    fn test_all_people_placed_threshold() {
        let stats = TransportStats::from_allocation(&fleet(), &allocation(&[1, 1, 0]));
        assert!(all_people_placed(&stats, 30.0));
        assert!(!all_people_placed(&stats, 31.0));
    }
}
