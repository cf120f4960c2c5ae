//! Simulation engine for RAMPART.
//!
//! Owns the hecs ECS world, runs the variable-speed fixed-step scheduler,
//! and produces `GameStateSnapshot`s once per frame. Completely headless,
//! enabling deterministic testing.

pub mod engine;
pub mod systems;
pub mod world_setup;

pub use engine::{sub_step_plan, SimConfig, SimulationEngine};
pub use rampart_core as core;

#[cfg(test)]
mod tests;
