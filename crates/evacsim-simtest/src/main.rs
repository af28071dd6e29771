//! EvacSim Headless Planning Harness
//!
//! Validates the transport apportionment against the shipped fleet table.
//! Runs entirely in-process — no UI, no store, no networking.
//!
//! Usage:
//!   cargo run -p evacsim-simtest
//!   cargo run -p evacsim-simtest -- --verbose
//!   cargo run -p evacsim-simtest -- --json --people=2000
//!
//! Set `RUST_LOG=evacsim_logic=debug` to trace the repair steps.

use evacsim_logic::apportion::{apportion, ApportionError, ErrorKind, DISCREPANCY_TOLERANCE};
use evacsim_logic::config::{validate_config, PlannerConfig};
use evacsim_logic::fleet::{capacity_envelope, VehicleType};
use evacsim_logic::planner::EvacuationPlanner;
use evacsim_logic::stats::TransportStats;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

// ── Fleet table (same JSON the planner front end ships) ─────────────────
const FLEET_JSON: &str = include_str!("../../../data/evacuation_fleet.json");

/// Targets visited by the sweep, spread across the feasible range.
const SWEEP_STEPS: u32 = 200;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    let people_override = std::env::args()
        .find_map(|a| a.strip_prefix("--people=").map(str::to_string))
        .map(|v| v.parse::<u32>());

    let config = match PlannerConfig::from_json(FLEET_JSON) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("fleet JSON parse error: {e}");
            std::process::exit(2);
        }
    };

    let mut planner = EvacuationPlanner::from_config(&config);
    match people_override {
        Some(Ok(people)) => planner.set_people(people),
        Some(Err(e)) => {
            eprintln!("--people expects a non-negative integer: {e}");
            std::process::exit(2);
        }
        None => {}
    }

    if json {
        print_json(&planner);
        return;
    }

    println!("=== EvacSim Planning Harness ===\n");
    info!("loaded {} vehicle types", config.fleet.len());

    let mut results = Vec::new();

    // 1. Fleet table validation
    results.extend(validate_fleet_table(&config, verbose));

    // 2. Allocation invariants across the feasible range
    results.extend(validate_sweep(&config.fleet, verbose));

    // 3. Rejections at and beyond the envelope
    results.extend(validate_rejections(&config.fleet));

    // 4. Degenerate but valid inputs
    results.extend(validate_degenerate_cases(&config.fleet));

    // 5. Planner step controls
    results.extend(validate_planner(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_json(planner: &EvacuationPlanner) {
    let outcome = planner.calculate();
    let value = match &outcome.result {
        Ok(plan) => serde_json::to_value(plan),
        Err(e) => Ok(serde_json::json!({ "error": e.to_string() })),
    };
    match value.and_then(|v| serde_json::to_string_pretty(&v)) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("failed to encode allocation: {e}");
            std::process::exit(2);
        }
    }
}

// ── 1. Fleet Table ──────────────────────────────────────────────────────

fn validate_fleet_table(config: &PlannerConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Fleet Table ---");
    let mut results = Vec::new();

    let errors = validate_config(config);
    results.push(TestResult {
        name: "fleet_config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("{} vehicle types, step {}", config.fleet.len(), config.people_step)
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let env = capacity_envelope(&config.fleet);
    let target = config.people_target as f64;
    results.push(TestResult {
        name: "fleet_default_target_feasible".into(),
        passed: env.contains(target),
        detail: format!(
            "target {} within [{}, {}]",
            config.people_target, env.min_capacity, env.max_capacity
        ),
    });

    if verbose {
        println!("  Fleet:");
        for v in &config.fleet {
            println!(
                "    {:20} {:>5} seats  units {:>2}..{:<2}",
                v.name, v.capacity, v.min_units, v.max_units
            );
        }
    }

    results
}

// ── 2. Allocation Sweep ─────────────────────────────────────────────────

fn validate_sweep(fleet: &[VehicleType], verbose: bool) -> Vec<TestResult> {
    println!("--- Allocation Sweep ---");
    let mut results = Vec::new();
    let env = capacity_envelope(fleet);

    let mut runs = 0u32;
    let mut failures: Vec<String> = Vec::new();
    let mut worst_overshoot = 0.0f64;
    let mut rounded_up = 0u32;
    let largest = fleet.iter().map(|v| v.capacity).fold(0.0, f64::max);

    for step in 0..=SWEEP_STEPS {
        let target = env.min_capacity + env.range() * step as f64 / SWEEP_STEPS as f64;
        runs += 1;
        let plan = match apportion(fleet, target) {
            Ok(plan) => plan,
            Err(e) => {
                failures.push(format!("target {target}: {e}"));
                continue;
            }
        };

        let in_bounds = plan
            .results
            .iter()
            .zip(fleet)
            .all(|(r, v)| (v.min_units..=v.max_units).contains(&r.calculated_units));
        let same_order = plan
            .results
            .iter()
            .zip(fleet)
            .all(|(r, v)| r.name == v.name)
            && plan.results.len() == fleet.len();
        let repeatable = apportion(fleet, target).as_ref() == Ok(&plan);
        let overshoot = plan.total_calculated_capacity - target;
        let covered = overshoot >= -DISCREPANCY_TOLERANCE;
        let tight = overshoot < largest + DISCREPANCY_TOLERANCE;

        if !(in_bounds && same_order && repeatable && covered && tight) {
            failures.push(format!(
                "target {target}: bounds={in_bounds} order={same_order} repeat={repeatable} covered={covered} tight={tight}"
            ));
        }
        if overshoot > DISCREPANCY_TOLERANCE {
            rounded_up += 1;
        }
        worst_overshoot = worst_overshoot.max(overshoot);
    }

    results.push(TestResult {
        name: "sweep_invariants".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{runs} targets, all within bounds and covered")
        } else {
            failures.join("; ")
        },
    });

    results.push(TestResult {
        name: "sweep_overshoot".into(),
        passed: worst_overshoot < largest,
        detail: format!(
            "{rounded_up}/{runs} rounded up, worst overshoot {worst_overshoot:.1} seats (largest unit {largest})"
        ),
    });

    if verbose {
        for people in [1500.0, 2000.0, 2500.0, 3000.0] {
            if let Ok(plan) = apportion(fleet, people) {
                let stats = TransportStats::from_allocation(fleet, &plan);
                println!(
                    "  {people:>6} people -> {:>3} units, {:>6} seats",
                    stats.total_units, stats.total_capacity
                );
            }
        }
    }

    results
}

// ── 3. Rejections ───────────────────────────────────────────────────────

fn validate_rejections(fleet: &[VehicleType]) -> Vec<TestResult> {
    println!("--- Rejections ---");
    let mut results = Vec::new();
    let env = capacity_envelope(fleet);

    let below = apportion(fleet, env.min_capacity - 1.0);
    results.push(TestResult {
        name: "reject_below_range".into(),
        passed: matches!(&below, Err(e) if e.kind() == ErrorKind::Infeasible),
        detail: describe(&below),
    });

    let above = apportion(fleet, env.max_capacity + 1.0);
    results.push(TestResult {
        name: "reject_above_range".into(),
        passed: matches!(&above, Err(e) if e.kind() == ErrorKind::Infeasible),
        detail: describe(&above),
    });

    let negative = apportion(fleet, -1.0);
    results.push(TestResult {
        name: "reject_negative_target".into(),
        passed: matches!(&negative, Err(e) if e.kind() == ErrorKind::Structural),
        detail: describe(&negative),
    });

    let empty = apportion(&[], 100.0);
    results.push(TestResult {
        name: "reject_empty_fleet".into(),
        passed: matches!(&empty, Err(e) if e.kind() == ErrorKind::Structural),
        detail: describe(&empty),
    });

    let mut broken = fleet.to_vec();
    if let Some(last) = broken.last_mut() {
        last.capacity = 0.0;
    }
    let malformed = apportion(&broken, env.min_capacity);
    results.push(TestResult {
        name: "reject_malformed_vehicle".into(),
        passed: matches!(&malformed, Err(e) if e.kind() == ErrorKind::Structural),
        detail: describe(&malformed),
    });

    results
}

fn describe<T>(result: &Result<T, ApportionError>) -> String {
    match result {
        Ok(_) => "unexpectedly succeeded".into(),
        Err(e) => e.to_string(),
    }
}

// ── 4. Degenerate Cases ─────────────────────────────────────────────────

fn validate_degenerate_cases(fleet: &[VehicleType]) -> Vec<TestResult> {
    println!("--- Degenerate Cases ---");
    let mut results = Vec::new();

    let zero = apportion(fleet, 0.0);
    let zero_ok = zero.as_ref().is_ok_and(|plan| {
        plan.partition_coefficient == Some(1.0)
            && plan
                .results
                .iter()
                .zip(fleet)
                .all(|(r, v)| r.calculated_units == v.min_units)
    });
    results.push(TestResult {
        name: "zero_target_minimum_fleet".into(),
        passed: zero_ok,
        detail: match &zero {
            Ok(plan) => plan.message.clone().unwrap_or_default(),
            Err(e) => e.to_string(),
        },
    });

    let fixed: Vec<VehicleType> = fleet
        .iter()
        .map(|v| VehicleType::new(v.name.clone(), v.capacity, v.max_units, v.max_units))
        .collect();
    let fixed_env = capacity_envelope(&fixed);
    let fixed_plan = apportion(&fixed, fixed_env.max_capacity);
    let fixed_ok = fixed_plan.as_ref().is_ok_and(|plan| {
        plan.partition_coefficient.is_none()
            && plan.total_calculated_capacity == fixed_env.max_capacity
    });
    results.push(TestResult {
        name: "fixed_capacity_fleet".into(),
        passed: fixed_ok,
        detail: format!("fixed capacity {}", fixed_env.max_capacity),
    });

    results
}

// ── 5. Planner ──────────────────────────────────────────────────────────

fn validate_planner(config: &PlannerConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Planner ---");
    let mut results = Vec::new();

    let mut planner = EvacuationPlanner::from_config(config);
    let start = planner.people();
    planner.increment_people();
    planner.decrement_people();
    results.push(TestResult {
        name: "planner_step_roundtrip".into(),
        passed: planner.people() == start,
        detail: format!("{} -> {} (step {})", start, planner.people(), planner.step()),
    });

    planner.set_people(planner.step() / 2);
    planner.decrement_people();
    results.push(TestResult {
        name: "planner_decrement_saturates".into(),
        passed: planner.people() == 0,
        detail: format!("people after underflowing step: {}", planner.people()),
    });

    planner.set_people(config.people_target);
    let outcome = planner.calculate();
    let stats = outcome.stats();
    let agrees = outcome
        .allocation()
        .is_some_and(|plan| plan.total_calculated_capacity == stats.total_capacity);
    results.push(TestResult {
        name: "planner_all_people_placed".into(),
        passed: outcome.all_people_placed() && agrees,
        detail: format!(
            "{} seats for {} people",
            stats.total_capacity, config.people_target
        ),
    });

    if !outcome.all_people_placed() {
        warn!("default target {} not covered", config.people_target);
    }

    if verbose {
        for line in outcome.render_report() {
            println!("  {line}");
        }
    }

    results
}
