//! The player/economy account: gold, hearts, and route records.
//!
//! The pipeline only mutates player state through the entry points below,
//! keeping the economy boundary narrow enough to swap for an external
//! service in the full game.

use serde::{Deserialize, Serialize};

/// Aggregate combat statistics, tracked for records and milestones.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub enemies_defeated: u64,
    pub waves_completed: u64,
    pub highest_hit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAccount {
    pub gold: u64,
    pub hearts: u32,
    pub hearts_max: u32,
    /// Best wave reached on the current route.
    pub record_wave: u32,
    pub stats: PlayerStats,
}

impl Default for PlayerAccount {
    fn default() -> Self {
        Self {
            gold: 0,
            hearts: 14,
            hearts_max: 14,
            record_wave: 0,
            stats: PlayerStats::default(),
        }
    }
}

impl PlayerAccount {
    /// Adjust gold, saturating at zero.
    pub fn change_gold(&mut self, delta: i64) {
        if delta >= 0 {
            self.gold = self.gold.saturating_add(delta as u64);
        } else {
            self.gold = self.gold.saturating_sub(delta.unsigned_abs());
        }
    }

    /// Unblocked damage from a leaked enemy. Returns true if this reduced
    /// the player to zero hearts.
    pub fn get_damaged(&mut self, power: f64) -> bool {
        let loss = power.max(0.0).ceil() as u32;
        self.hearts = self.hearts.saturating_sub(loss.max(1));
        self.hearts == 0
    }

    pub fn get_healed(&mut self, hearts: u32) {
        self.hearts = (self.hearts + hearts).min(self.hearts_max);
    }

    /// Record a completed wave; returns true when it is a new best.
    pub fn record_wave_reached(&mut self, wave: u32) -> bool {
        self.stats.waves_completed += 1;
        if wave > self.record_wave {
            self.record_wave = wave;
            true
        } else {
            false
        }
    }
}
