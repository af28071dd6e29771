//! Integration tests for the evacuation planning pipeline.
//!
//! Exercises: PlannerConfig → EvacuationPlanner → apportion → TransportStats
//!
//! Property tests sweep random fleets and feasible targets to check the
//! allocation invariants that the unit tests only pin at single points.

use evacsim_logic::apportion::{apportion, ErrorKind, FleetAllocation, DISCREPANCY_TOLERANCE};
use evacsim_logic::config::{validate_config, PlannerConfig};
use evacsim_logic::fleet::{capacity_envelope, VehicleType};
use evacsim_logic::planner::EvacuationPlanner;
use evacsim_logic::stats::TransportStats;
use proptest::prelude::*;

const FLEET_JSON: &str = include_str!("../../../data/evacuation_fleet.json");

// ── Helpers ────────────────────────────────────────────────────────────

fn shipped_config() -> PlannerConfig {
    PlannerConfig::from_json(FLEET_JSON).expect("shipped fleet JSON should parse")
}

fn assert_within_bounds(fleet: &[VehicleType], plan: &FleetAllocation) {
    assert_eq!(plan.results.len(), fleet.len());
    for (r, v) in plan.results.iter().zip(fleet) {
        assert_eq!(r.name, v.name);
        assert!(
            (v.min_units..=v.max_units).contains(&r.calculated_units),
            "{} got {} units, bounds [{}, {}]",
            v.name,
            r.calculated_units,
            v.min_units,
            v.max_units
        );
    }
}

prop_compose! {
    fn arb_vehicle()(capacity in 1u32..60, min_units in 0u32..10, span in 0u32..15) -> (u32, u32, u32) {
        (capacity, min_units, span)
    }
}

prop_compose! {
    fn arb_fleet()(specs in prop::collection::vec(arb_vehicle(), 1..8)) -> Vec<VehicleType> {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (capacity, min_units, span))| {
                VehicleType::new(format!("T{i}"), capacity as f64, min_units, min_units + span)
            })
            .collect()
    }
}

prop_compose! {
    fn arb_fractional_fleet()(
        specs in prop::collection::vec((0.1f64..60.0, 0u32..10, 0u32..15), 1..8)
    ) -> Vec<VehicleType> {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (capacity, min_units, span))| {
                VehicleType::new(format!("F{i}"), capacity, min_units, min_units + span)
            })
            .collect()
    }
}

// ── Shipped data ───────────────────────────────────────────────────────

#[test]
fn shipped_fleet_matches_reference() {
    let config = shipped_config();
    assert!(validate_config(&config).is_empty());
    assert_eq!(config, PlannerConfig::default());
}

#[test]
fn shipped_fleet_sweep() {
    let config = shipped_config();
    let env = capacity_envelope(&config.fleet);
    let mut people = env.min_capacity as u32;
    while people as f64 <= env.max_capacity {
        let plan = apportion(&config.fleet, people as f64).unwrap();
        assert_within_bounds(&config.fleet, &plan);
        assert!(plan.total_calculated_capacity >= people as f64);
        people += 37;
    }
}

#[test]
fn planner_walks_out_of_range() {
    let config = shipped_config();
    let mut planner = EvacuationPlanner::from_config(&config);
    assert!(planner.calculate().all_people_placed());

    // One step below the minimum fleet is infeasible.
    planner.decrement_people();
    let outcome = planner.calculate();
    assert_eq!(
        outcome.result.as_ref().unwrap_err().kind(),
        ErrorKind::Infeasible
    );
    assert!(outcome.stats().is_empty());

    planner.increment_people();
    planner.increment_people();
    let outcome = planner.calculate();
    assert!(outcome.is_ok());
    assert!(outcome.all_people_placed());
}

#[test]
fn planner_zero_target_deploys_minimum() {
    let mut planner = EvacuationPlanner::default();
    planner.set_people(0);
    let outcome = planner.calculate();
    let plan = outcome.allocation().unwrap();
    assert_eq!(plan.partition_coefficient, Some(1.0));
    assert_eq!(plan.total_calculated_capacity, 1090.0);
    assert!(outcome.all_people_placed());
}

#[test]
fn structural_and_range_errors_are_distinguishable() {
    let fleet = shipped_config().fleet;
    let structural = apportion(&fleet, -20.0).unwrap_err();
    let infeasible = apportion(&fleet, 5000.0).unwrap_err();
    assert_eq!(structural.kind(), ErrorKind::Structural);
    assert_eq!(infeasible.kind(), ErrorKind::Infeasible);
    assert_ne!(structural.to_string(), infeasible.to_string());
}

// ── Properties ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn allocation_respects_bounds_and_order(fleet in arb_fleet(), frac in 0.0f64..=1.0) {
        let env = capacity_envelope(&fleet);
        let target = env.min_capacity + frac * env.range();
        let plan = apportion(&fleet, target).unwrap();
        prop_assert_eq!(plan.results.len(), fleet.len());
        for (r, v) in plan.results.iter().zip(&fleet) {
            prop_assert_eq!(&r.name, &v.name);
            prop_assert!(r.calculated_units >= v.min_units);
            prop_assert!(r.calculated_units <= v.max_units);
        }
    }

    #[test]
    fn repair_always_covers_feasible_target(fleet in arb_fleet(), frac in 0.0f64..=1.0) {
        let env = capacity_envelope(&fleet);
        let target = env.min_capacity + frac * env.range();
        let plan = apportion(&fleet, target).unwrap();
        prop_assert!(
            plan.total_calculated_capacity >= target - DISCREPANCY_TOLERANCE,
            "total {} short of target {}", plan.total_calculated_capacity, target
        );
        let largest = fleet.iter().map(|v| v.capacity).fold(0.0, f64::max);
        prop_assert!(
            plan.total_calculated_capacity - target < largest + DISCREPANCY_TOLERANCE,
            "overshoot {} not below largest capacity {}",
            plan.total_calculated_capacity - target, largest
        );
        if let Some(message) = &plan.message {
            prop_assert!(!message.starts_with("Warning"), "unexpected warning: {}", message);
        }
    }

    #[test]
    fn fractional_capacities_stay_in_bounds(fleet in arb_fractional_fleet(), frac in 0.0f64..=1.0) {
        let env = capacity_envelope(&fleet);
        let target = env.min_capacity + frac * env.range();
        let plan = apportion(&fleet, target).unwrap();
        prop_assert_eq!(plan.results.len(), fleet.len());
        for (r, v) in plan.results.iter().zip(&fleet) {
            prop_assert!(r.calculated_units >= v.min_units);
            prop_assert!(r.calculated_units <= v.max_units);
        }
    }

    #[test]
    fn fractional_capacities_cover_target(fleet in arb_fractional_fleet(), frac in 0.0f64..=1.0) {
        let env = capacity_envelope(&fleet);
        let target = env.min_capacity + frac * env.range();
        let plan = apportion(&fleet, target).unwrap();
        prop_assert!(
            plan.total_calculated_capacity >= target - DISCREPANCY_TOLERANCE,
            "total {} short of target {}", plan.total_calculated_capacity, target
        );
        let largest = fleet.iter().map(|v| v.capacity).fold(0.0, f64::max);
        prop_assert!(
            plan.total_calculated_capacity - target < largest + DISCREPANCY_TOLERANCE,
            "overshoot {} not below largest capacity {}",
            plan.total_calculated_capacity - target, largest
        );
        if let Some(message) = &plan.message {
            prop_assert!(!message.starts_with("Warning"), "unexpected warning: {}", message);
        }
    }

    #[test]
    fn integer_targets_reached(fleet in arb_fleet(), frac in 0.0f64..=1.0) {
        let env = capacity_envelope(&fleet);
        let target = (env.min_capacity + frac * env.range()).round();
        let plan = apportion(&fleet, target).unwrap();
        prop_assert!(plan.total_calculated_capacity >= target);
    }

    #[test]
    fn allocation_is_deterministic(fleet in arb_fleet(), frac in 0.0f64..=1.0) {
        let env = capacity_envelope(&fleet);
        let target = env.min_capacity + frac * env.range();
        let a = apportion(&fleet, target);
        let b = apportion(&fleet, target);
        prop_assert_eq!(&a, &b);
        let a = serde_json::to_string(&a.unwrap()).unwrap();
        let b = serde_json::to_string(&b.unwrap()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn partition_coefficient_in_unit_interval(fleet in arb_fleet(), frac in 0.0f64..=1.0) {
        let env = capacity_envelope(&fleet);
        let target = env.min_capacity + frac * env.range();
        let plan = apportion(&fleet, target).unwrap();
        match plan.partition_coefficient {
            Some(p) => prop_assert!((0.0..=1.0).contains(&p)),
            None => prop_assert!(env.is_fixed()),
        }
    }

    #[test]
    fn out_of_range_targets_rejected(fleet in arb_fleet(), excess in 1.0f64..1000.0) {
        let env = capacity_envelope(&fleet);
        let above = apportion(&fleet, env.max_capacity + excess).unwrap_err();
        prop_assert_eq!(above.kind(), ErrorKind::Infeasible);
        if env.min_capacity - excess > 0.0 {
            let below = apportion(&fleet, env.min_capacity - excess).unwrap_err();
            prop_assert_eq!(below.kind(), ErrorKind::Infeasible);
        }
    }

    #[test]
    fn zero_target_is_minimum(fleet in arb_fleet()) {
        let plan = apportion(&fleet, 0.0).unwrap();
        prop_assert_eq!(plan.partition_coefficient, Some(1.0));
        for (r, v) in plan.results.iter().zip(&fleet) {
            prop_assert_eq!(r.calculated_units, v.min_units);
        }
    }

    #[test]
    fn stats_agree_with_engine(fleet in arb_fleet(), frac in 0.0f64..=1.0) {
        let env = capacity_envelope(&fleet);
        let target = env.min_capacity + frac * env.range();
        let plan = apportion(&fleet, target).unwrap();
        let stats = TransportStats::from_allocation(&fleet, &plan);
        prop_assert_eq!(stats.total_units, plan.total_units());
        prop_assert!((stats.total_capacity - plan.total_calculated_capacity).abs() < 1e-9);
        prop_assert!(stats.items.iter().all(|item| item.units > 0));
    }
}
