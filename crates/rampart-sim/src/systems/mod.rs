//! ECS systems that operate on the simulation world each sub-step.
//!
//! Systems are free functions over `&mut World` plus the explicit context
//! they need — entity collections, RNG, economy handle, FX buffer. They
//! run in a fixed order (movement, passives, auras, attack, projectiles,
//! status, cleanup) so tests are deterministic.

pub mod attack;
pub mod auras;
pub mod cleanup;
pub mod damage;
pub mod movement;
pub mod passives;
pub mod projectile;
pub mod snapshot;
pub mod status;
pub mod targeting;

use glam::DVec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::{PassiveKind, StatusKind, Weather};
use rampart_core::events::FxEvent;
use rampart_core::player::PlayerAccount;
use rampart_core::types::{EnemyId, Position};

/// Shared mutable context threaded through the combat systems.
pub struct CombatCtx<'a> {
    pub weather: Weather,
    pub rng: &'a mut ChaCha8Rng,
    pub player: &'a mut PlayerAccount,
    pub fx: &'a mut Vec<FxEvent>,
}

/// A per-sub-step snapshot of one enemy, taken before towers and
/// projectiles run so they can search and sort without holding world
/// borrows.
#[derive(Debug, Clone, Copy)]
pub struct EnemySnap {
    pub entity: Entity,
    pub id: EnemyId,
    pub position: Position,
    pub hp: f64,
    pub armor: f64,
    pub speed: f64,
    pub distance_traveled: f64,
    pub invisible: bool,
    pub invulnerable: bool,
    pub dying: bool,
    pub in_field: bool,
    pub passive: Option<PassiveKind>,
    pub burning: bool,
    pub poisoned: bool,
    pub slowed: bool,
    pub stunned: bool,
    pub cursed: bool,
    pub nightmared: bool,
}

impl EnemySnap {
    pub fn has_status(&self, kind: StatusKind) -> bool {
        match kind {
            StatusKind::Burn => self.burning,
            StatusKind::Poison => self.poisoned,
            StatusKind::Slow => self.slowed,
            StatusKind::Stun => self.stunned,
            StatusKind::Curse => self.cursed,
            StatusKind::Nightmare => self.nightmared,
        }
    }

    /// Targetable by towers at all (visibility is the caller's concern).
    pub fn targetable(&self) -> bool {
        self.hp > 0.0 && !self.dying && !self.invulnerable && self.in_field
    }
}

/// Collect the enemy snapshot list for this sub-step.
pub fn collect_enemy_snaps(world: &World) -> Vec<EnemySnap> {
    let mut snaps = Vec::new();
    for (entity, (_enemy, info, health, mobility, path, life, ledger, passive, pos)) in world
        .query::<(
            &Enemy,
            &EnemyInfo,
            &Health,
            &Mobility,
            &PathFollower,
            &Lifecycle,
            &StatusLedger,
            &PassiveState,
            &Position,
        )>()
        .iter()
    {
        snaps.push(EnemySnap {
            entity,
            id: info.id,
            position: *pos,
            hp: health.hp,
            armor: health.armor,
            speed: mobility.speed,
            distance_traveled: path.distance_traveled,
            invisible: info.invisible,
            invulnerable: info.invulnerable,
            dying: life.dying,
            in_field: in_field(pos),
            passive: passive.kind,
            burning: ledger.has(StatusKind::Burn),
            poisoned: ledger.has(StatusKind::Poison),
            slowed: ledger.has(StatusKind::Slow),
            stunned: ledger.has(StatusKind::Stun),
            cursed: ledger.has(StatusKind::Curse),
            nightmared: ledger.has(StatusKind::Nightmare),
        });
    }
    snaps
}

/// Whether a position is inside the visible play field.
pub fn in_field(pos: &Position) -> bool {
    pos.x() >= 0.0 && pos.x() <= FIELD_WIDTH && pos.y() >= 0.0 && pos.y() <= FIELD_HEIGHT
}

/// Nearest living snap to `from` within `max_dist`, skipping `exclude`
/// and, unless `include_invisible`, invisible enemies.
pub fn nearest_snap<'a>(
    snaps: &'a [EnemySnap],
    from: DVec2,
    max_dist: f64,
    exclude: Option<EnemyId>,
    include_invisible: bool,
) -> Option<&'a EnemySnap> {
    let mut best: Option<&EnemySnap> = None;
    let mut best_dist = max_dist;
    for snap in snaps {
        if snap.hp <= 0.0 || snap.dying {
            continue;
        }
        if Some(snap.id) == exclude {
            continue;
        }
        if snap.invisible && !include_invisible {
            continue;
        }
        let d = snap.position.0.distance(from);
        if d < best_dist {
            best_dist = d;
            best = Some(snap);
        }
    }
    best
}
