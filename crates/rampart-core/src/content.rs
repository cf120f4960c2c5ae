//! Authored content supplied by the external content provider: enemy
//! templates, per-route wave tables, waypoint polylines, and deployable
//! unit definitions.
//!
//! The simulation treats this data as read-only configuration. Waves > 100
//! are synthesized from it by the `rampart-waves` generator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::ResistFlags;
use crate::enums::*;
use crate::types::{Position, UnitId};

/// One enemy archetype as authored: identity plus unscaled base stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Stable key, also the identity shown in wave previews.
    pub key: String,
    pub hp: f64,
    pub armor: f64,
    /// Base movement speed (px/s).
    pub speed: f64,
    /// Damage dealt to the player on a leak.
    pub power: f64,
    pub gold: u64,
    /// Hp regenerated per second.
    pub regeneration: f64,
    pub invisible: bool,
    pub resist: ResistFlags,
    pub passive: Option<PassiveKind>,
}

/// One authored wave: indices into the route's template list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoredWave {
    /// Templates shown in the pre-wave preview.
    pub preview: Vec<usize>,
    /// Full spawn list, in authored order.
    pub spawns: Vec<usize>,
    /// Spawn spacing along the approach, in pixels.
    pub spacing: f64,
}

/// A placement tile a tower can occupy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tile {
    pub position: Position,
    pub terrain: Terrain,
}

/// Everything the content provider supplies for one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteData {
    pub route_number: u32,
    pub templates: Vec<EnemyTemplate>,
    /// Waves 1..=100, index 0 holding wave 1.
    pub waves: Vec<AuthoredWave>,
    /// Template index of the route's boss.
    pub boss: usize,
    /// Waypoint polylines enemies may follow.
    pub paths: Vec<Vec<Position>>,
    pub tiles: Vec<Tile>,
}

/// A deployable unit's combat definition, supplied at deploy time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub unit: UnitId,
    pub power: f64,
    pub attack_interval_secs: f64,
    pub range: f64,
    /// Inner radius for donut-shaped ranges.
    pub inner_range: f64,
    pub range_shape: RangeShape,
    pub attack_kind: AttackKind,
    pub target_mode: TargetMode,
    /// Percent chance in [0, 100].
    pub crit_chance: f64,
    pub ricochets: u32,
    pub projectile_speed: f64,
    pub ability: AbilityId,
    pub equipment: Option<EquipmentId>,
    pub allowed_terrain: Vec<Terrain>,
}

/// Content validation failures, surfaced when a route is loaded.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("route {route} has no waypoint paths")]
    NoPaths { route: u32 },
    #[error("route {route} path {path} has fewer than 2 waypoints")]
    DegeneratePath { route: u32, path: usize },
    #[error("route {route} has no enemy templates")]
    NoTemplates { route: u32 },
    #[error("route {route} wave {wave} references template {index} out of bounds")]
    BadTemplateIndex { route: u32, wave: usize, index: usize },
    #[error("route {route} boss index {index} out of bounds")]
    BadBossIndex { route: u32, index: usize },
}

impl RouteData {
    /// Validate referential integrity before the route is handed to the
    /// engine. The simulation itself never fails on content; degenerate
    /// waves degrade to fallback rosters instead.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.paths.is_empty() {
            return Err(ContentError::NoPaths {
                route: self.route_number,
            });
        }
        for (i, path) in self.paths.iter().enumerate() {
            if path.len() < 2 {
                return Err(ContentError::DegeneratePath {
                    route: self.route_number,
                    path: i,
                });
            }
        }
        if self.templates.is_empty() {
            return Err(ContentError::NoTemplates {
                route: self.route_number,
            });
        }
        if self.boss >= self.templates.len() {
            return Err(ContentError::BadBossIndex {
                route: self.route_number,
                index: self.boss,
            });
        }
        for (w, wave) in self.waves.iter().enumerate() {
            for &index in wave.preview.iter().chain(wave.spawns.iter()) {
                if index >= self.templates.len() {
                    return Err(ContentError::BadTemplateIndex {
                        route: self.route_number,
                        wave: w + 1,
                        index,
                    });
                }
            }
        }
        Ok(())
    }
}
