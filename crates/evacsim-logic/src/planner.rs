//! Evacuation planner state — the fleet table plus an adjustable people
//! target.
//!
//! The planner holds no allocation between calls. Each [`EvacuationPlanner::calculate`]
//! runs the apportionment from scratch and hands back a [`PlanOutcome`]
//! carrying the structured result.

use log::debug;

use crate::apportion::{apportion, ApportionError, FleetAllocation};
use crate::config::PlannerConfig;
use crate::fleet::VehicleType;
use crate::stats::{all_people_placed, TransportStats};

/// Fleet and people target as edited by the operator.
#[derive(Debug, Clone)]
pub struct EvacuationPlanner {
    fleet: Vec<VehicleType>,
    people: u32,
    step: u32,
}

impl Default for EvacuationPlanner {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

impl EvacuationPlanner {
    pub fn new(fleet: Vec<VehicleType>, people: u32) -> Self {
        Self {
            fleet,
            people,
            step: PlannerConfig::default().people_step,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            fleet: config.fleet.clone(),
            people: config.people_target,
            step: config.people_step,
        }
    }

    pub fn fleet(&self) -> &[VehicleType] {
        &self.fleet
    }

    pub fn people(&self) -> u32 {
        self.people
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn set_people(&mut self, people: u32) {
        self.people = people;
    }

    pub fn increment_people(&mut self) {
        self.people = self.people.saturating_add(self.step);
    }

    /// Lower the target by one step, stopping at zero.
    pub fn decrement_people(&mut self) {
        self.people = self.people.saturating_sub(self.step);
    }

    /// Apportion the fleet for the current target.
    pub fn calculate(&self) -> PlanOutcome {
        let result = apportion(&self.fleet, self.people as f64);
        match &result {
            Ok(plan) => debug!(
                "planner: {} people -> {} units, capacity {}",
                self.people,
                plan.total_units(),
                plan.total_calculated_capacity
            ),
            Err(e) => debug!("planner: {} people -> {e}", self.people),
        }
        PlanOutcome {
            fleet: self.fleet.clone(),
            people: self.people,
            result,
        }
    }
}

/// One planning run: the inputs it used and what the engine returned.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub fleet: Vec<VehicleType>,
    pub people: u32,
    pub result: Result<FleetAllocation, ApportionError>,
}

impl PlanOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn allocation(&self) -> Option<&FleetAllocation> {
        self.result.as_ref().ok()
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats::from_result(&self.fleet, &self.result)
    }

    pub fn all_people_placed(&self) -> bool {
        all_people_placed(&self.stats(), self.people as f64)
    }

    /// Human-readable summary, one line per deployed vehicle type.
    pub fn render_report(&self) -> Vec<String> {
        let plan = match &self.result {
            Ok(plan) => plan,
            Err(e) => return vec![format!("Error: {e}")],
        };

        let stats = self.stats();
        let mut lines: Vec<String> = stats
            .items
            .iter()
            .map(|item| {
                format!(
                    "{}: {} × {} = {}",
                    item.name, item.units, item.unit_capacity, item.total_capacity
                )
            })
            .collect();
        lines.push(format!(
            "Total: {} units, {} seats for {} people",
            stats.total_units, stats.total_capacity, self.people
        ));
        if let Some(message) = &plan.message {
            lines.extend(message.lines().map(str::to_string));
        }
        lines
    }
}
