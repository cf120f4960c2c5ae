//! Presentation events emitted by the simulation.
//!
//! These are fire-and-forget notifications for the audio/visual layer; the
//! core never depends on their delivery or any return value.

use serde::{Deserialize, Serialize};

use crate::enums::StatusKind;
use crate::types::{EnemyId, TowerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FxEvent {
    WaveStarted { wave: u32 },
    WaveCompleted { wave: u32, bonus_gold: u64 },
    /// Fired by the scheduled-task queue when the completion banner expires.
    WaveBannerExpired { wave: u32 },
    ProjectileFired { tower: TowerId },
    AreaPulse { tower: TowerId },
    /// A StaticField enemy consumed the tower's attack cycle.
    AttackJammed { tower: TowerId },
    EnemyKilled { enemy: EnemyId, gold: u64 },
    EnemyLeaked { enemy: EnemyId, power: f64 },
    EnemyRevived { enemy: EnemyId },
    EnemyRewound { enemy: EnemyId },
    StatusApplied { enemy: EnemyId, kind: StatusKind },
    PlayerDefeated,
}
