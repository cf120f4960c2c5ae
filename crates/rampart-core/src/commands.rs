//! Player commands sent from the frontend to the simulation.
//!
//! Commands are validated and queued for processing at the next frame
//! boundary; invalid commands are dropped with a diagnostic, never a fault.

use serde::{Deserialize, Serialize};

use crate::content::UnitSpec;
use crate::enums::TargetMode;
use crate::types::TowerId;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Wave flow ---
    /// Begin the current wave.
    StartWave,
    /// Jump the wave selector while no wave is active.
    SelectWave { wave: u32 },
    /// Abandon the attempt: clears every enemy, tower, projectile, and
    /// in-flight timer before the next wave starts.
    RestartWave,
    /// Chain into the next wave automatically on completion.
    ToggleAutoWave,

    // --- Tower management ---
    /// Deploy a unit onto a placement tile.
    DeployUnit { spec: UnitSpec, tile_index: usize },
    /// Remove a deployed tower (and its in-flight projectiles).
    RetireUnit { tower: TowerId },
    /// Change a tower's target-selection policy.
    SetTargetMode { tower: TowerId, mode: TargetMode },

    // --- Simulation control ---
    /// Select a speed multiplier from the allowed set.
    SetSpeedMultiplier { factor: f64 },
    /// Pause the simulation (the scheduler keeps running at zero delta).
    Pause,
    Resume,
}
