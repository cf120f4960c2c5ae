//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D position on the play field (pixels, origin at the top-left corner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// 2D velocity in pixels per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of completed frames (one `advance_frame` call each).
    pub frame: u64,
    /// Elapsed simulation time in seconds (scaled by the speed multiplier).
    pub elapsed_secs: f64,
}

/// Stable identifier for a spawned enemy. Consumers must re-validate the
/// id against the world before use each tick; a removed enemy leaves no
/// dangling alias behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyId(pub u32);

/// Stable identifier for a deployed tower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TowerId(pub u32);

/// Identifier of a deployable unit in the player's collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// Euclidean distance to another position in pixels.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.0.distance(other.0)
    }

    /// Unit heading toward another position, or zero when coincident.
    pub fn heading_to(&self, other: &Position) -> DVec2 {
        let delta = other.0 - self.0;
        if delta.length_squared() > 0.0 {
            delta.normalize()
        } else {
            DVec2::ZERO
        }
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// Speed magnitude in px/s.
    pub fn speed(&self) -> f64 {
        self.0.length()
    }
}

impl SimTime {
    /// Advance by one sub-step of `dt` simulated seconds.
    pub fn advance(&mut self, dt: f64) {
        self.elapsed_secs += dt;
    }

    /// Mark one real frame as completed.
    pub fn complete_frame(&mut self) {
        self.frame += 1;
    }
}
