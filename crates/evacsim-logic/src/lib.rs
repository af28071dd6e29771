//! Pure evacuation planning logic for EvacSim.
//!
//! This crate contains the transport planning logic that is independent of
//! any UI, store, or runtime. Functions take plain data and return results,
//! making them unit-testable and usable from the headless harness as well
//! as any front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`apportion`] | Integer unit counts per vehicle type for a people target |
//! | [`config`] | Planner configuration (JSON) and validation |
//! | [`fleet`] | Vehicle types, unit bounds, capacity envelope, reference fleet |
//! | [`planner`] | Adjustable people target and planning runs |
//! | [`stats`] | Display rows and "all people placed" check |

pub mod apportion;
pub mod config;
pub mod fleet;
pub mod planner;
pub mod stats;
