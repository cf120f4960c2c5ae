//! ECS components for simulation entities.
//!
//! Components are plain data structs with no game logic; systems own the
//! behavior. Cross-entity references are stable ids (`EnemyId`/`TowerId`),
//! never direct aliases — consumers re-validate them against the world
//! every tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EnemyId, TowerId, UnitId};

/// Marks an entity as an enemy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy;

/// Marks an entity as a tower.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tower;

/// Marks an entity as a projectile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile;

/// Which status kinds can land on an enemy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResistFlags {
    pub can_burn: bool,
    pub can_poison: bool,
    pub can_slow: bool,
    pub can_stun: bool,
}

/// Enemy identity and combat flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyInfo {
    pub id: EnemyId,
    /// Template key for preview/stat display.
    pub template: String,
    pub invisible: bool,
    pub invulnerable: bool,
    pub resist: ResistFlags,
    /// Gold awarded on kill.
    pub gold: u64,
    /// Damage dealt to the player if this enemy leaks off the path end.
    pub power: f64,
}

/// Hit point and armor pools. Invariant: never negative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub hp: f64,
    pub hp_max: f64,
    pub armor: f64,
    pub armor_max: f64,
    /// Hp restored per simulated second.
    pub regeneration: f64,
    pub regen_timer: f64,
}

/// Current movement state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mobility {
    /// Speed before slow effects (px/s).
    pub base_speed: f64,
    /// Effective speed after slow effects (px/s).
    pub speed: f64,
    pub stunned: bool,
}

/// Progress along the wave's waypoint polyline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathFollower {
    pub path_index: usize,
    pub waypoint_index: usize,
    /// Accumulated on-field travel, used by first/last targeting.
    pub distance_traveled: f64,
    pub entered_field: bool,
}

/// Dying/removal lifecycle. Once `dying` is set the enemy fades out and is
/// removed when `fade` reaches 1.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Lifecycle {
    pub dying: bool,
    pub fade: f64,
}

/// One tracked debuff. Duration-based kinds keep a single record per type;
/// poison and nightmare accumulate stacks instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusEffectRecord {
    pub kind: StatusKind,
    /// Remaining seconds for burn/slow/stun. Burn counts ticks, not time:
    /// it loses one second per periodic tick.
    pub remaining_secs: f64,
    pub stacks: u32,
    /// Per-tick damage as a fraction of hp_max (burn/poison).
    pub damage_percent: f64,
    /// Speed multiplier while active (slow).
    pub slow_factor: f64,
    /// Tower that applied the effect, for tick-time stat lookups.
    pub source: Option<TowerId>,
}

/// Per-enemy ledger of active status effects plus the periodic tick timer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusLedger {
    pub effects: Vec<StatusEffectRecord>,
    pub tick_timer: f64,
}

impl StatusLedger {
    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn cursed(&self) -> bool {
        self.has(StatusKind::Curse)
    }
}

/// Enemy passive ability state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PassiveState {
    pub kind: Option<PassiveKind>,
    pub timer: f64,
    /// One-shot passives (SecondWind) flip this when consumed.
    pub used: bool,
    /// SecondWind recovery window in progress.
    pub reviving: bool,
    pub revive_timer: f64,
    /// TimeRewind post-jump speed surge remaining.
    pub surge_timer: f64,
}

/// Tower base configuration and mutable combat state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerState {
    pub id: TowerId,
    pub unit: UnitId,
    pub tile_index: usize,
    pub terrain: Terrain,
    pub ability: AbilityId,
    pub equipment: Option<EquipmentId>,
    pub attack_kind: AttackKind,
    pub range_shape: RangeShape,
    pub target_mode: TargetMode,

    pub base_power: f64,
    pub base_interval_secs: f64,
    pub base_range: f64,
    pub inner_range: f64,
    /// Percent chance in [0, 100].
    pub base_crit_chance: f64,
    pub ricochets: u32,
    pub projectile_speed: f64,

    /// Counts down; firing adds the derived interval back.
    pub cooldown: f64,
    /// Weakly-held current target; cleared when it leaves the valid set.
    pub current_target: Option<EnemyId>,
    /// Last enemy hit, for Focus/FirstImpression tracking.
    pub last_hit: Option<EnemyId>,
    /// Accumulated Focus ramp bonus.
    pub focus_bonus: f64,
    /// Moxie kill stacks, reset at wave boundaries.
    pub kill_stacks: u32,
}

/// Combat stats derived each sub-step from base stats, catalog rules,
/// terrain/weather context, and neighboring auras. Never persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedStats {
    pub power: f64,
    pub interval_secs: f64,
    pub range: f64,
    pub inner_range: f64,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub reveal_invisible: bool,
    pub shots: u32,
    pub ricochets: u32,
    pub splash_radius: Option<f64>,
    pub power_aura: bool,
    pub critical_aura: bool,
    pub critical_damage_aura: bool,
    pub triage_aura: bool,
    /// A FrostAura enemy is near; attack interval is stretched.
    pub frost_slowed: bool,
}

/// Projectile flight state. Power and crit chance are snapshotted at launch;
/// modifiers that depend on the victim are applied once, at impact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectileState {
    pub tower: TowerId,
    pub target: EnemyId,
    /// Flight speed (px/s).
    pub speed: f64,
    pub power: f64,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub ricochets_left: u32,
    pub splash_radius: Option<f64>,
    pub age_secs: f64,
}
