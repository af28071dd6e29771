//! Planner configuration — fleet table, people target and step size.
//!
//! Configuration is plain data, loadable from JSON. Missing fields fall
//! back to the built-in defaults, so an empty object `{}` is a valid
//! configuration describing the reference fleet.
//!
//! ```
//! use evacsim_logic::config::{validate_config, PlannerConfig};
//!
//! let config = PlannerConfig::from_json(r#"{ "people_target": 1500 }"#).unwrap();
//! assert_eq!(config.people_step, 20);
//! assert!(validate_config(&config).is_empty());
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fleet::{reference_fleet, VehicleType};

/// Default number of people to evacuate.
pub const DEFAULT_PEOPLE_TARGET: u32 = 1090;

/// Default amount the people target moves per step.
pub const DEFAULT_PEOPLE_STEP: u32 = 20;

/// Planner settings before a planner is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub people_target: u32,
    pub people_step: u32,
    pub fleet: Vec<VehicleType>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            people_target: DEFAULT_PEOPLE_TARGET,
            people_step: DEFAULT_PEOPLE_STEP,
            fleet: reference_fleet(),
        }
    }
}

impl PlannerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Fleet table has no entries.
    #[error("fleet has no vehicle types")]
    EmptyFleet,
    /// People step of zero would make the step controls a no-op.
    #[error("people step must be greater than zero")]
    ZeroStep,
    /// Vehicle name empty or whitespace (index of the entry).
    #[error("vehicle type #{0} has a blank name")]
    BlankName(usize),
    /// Vehicle name used by an earlier entry.
    #[error("vehicle type \"{0}\" is listed more than once")]
    DuplicateName(String),
    /// Vehicle with `max_units < min_units` or a non-positive capacity.
    #[error("vehicle type \"{0}\" has invalid bounds or capacity")]
    InvalidVehicle(String),
}

/// Validate a planner configuration, returning all errors found.
pub fn validate_config(config: &PlannerConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.fleet.is_empty() {
        errors.push(ConfigError::EmptyFleet);
    }
    if config.people_step == 0 {
        errors.push(ConfigError::ZeroStep);
    }

    let mut seen = HashSet::new();
    for (index, vehicle) in config.fleet.iter().enumerate() {
        if vehicle.name.trim().is_empty() {
            errors.push(ConfigError::BlankName(index));
        } else if !seen.insert(vehicle.name.as_str()) {
            errors.push(ConfigError::DuplicateName(vehicle.name.clone()));
        }
        if vehicle.validate().is_err() {
            errors.push(ConfigError::InvalidVehicle(vehicle.name.clone()));
        }
    }

    errors
}
