//! Game state snapshot — the complete visible state produced once per frame.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::FxEvent;
use crate::player::PlayerAccount;
use crate::types::{EnemyId, Position, SimTime, TowerId, UnitId};

/// Complete game state handed to the presentation layer after each frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub speed_multiplier: f64,
    pub wave: WaveView,
    pub player: PlayerAccount,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    pub projectiles: Vec<ProjectileView>,
    /// Drained each frame; fire-and-forget.
    pub fx_events: Vec<FxEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    pub number: u32,
    pub active: bool,
    pub auto_wave: bool,
    pub weather: Weather,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub template: String,
    pub position: Position,
    pub hp: f64,
    pub hp_max: f64,
    pub armor: f64,
    pub armor_max: f64,
    pub speed: f64,
    pub invisible: bool,
    pub dying: bool,
    pub fade: f64,
    pub distance_traveled: f64,
    /// Active status kinds with their stack counts.
    pub statuses: Vec<(StatusKind, u32)>,
}

/// Tower status including the derived combat stats, for range rings and
/// stat panels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub id: TowerId,
    pub unit: UnitId,
    pub tile_index: usize,
    pub position: Position,
    pub power: f64,
    pub interval_secs: f64,
    pub range: f64,
    pub inner_range: f64,
    pub range_shape: RangeShape,
    pub crit_chance: f64,
    pub target_mode: TargetMode,
    pub current_target: Option<EnemyId>,
    pub power_aura: bool,
    pub critical_aura: bool,
    pub critical_damage_aura: bool,
    pub triage_aura: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: Position,
    pub tower: TowerId,
    pub target: EnemyId,
    pub power: f64,
}
