//! Enemy passive ability profiles.
//!
//! Consolidates per-passive tuning so the systems that execute them stay
//! free of magic numbers.

use rampart_core::enums::PassiveKind;

/// Tuning knobs for a passive. Unused fields are zero for a given kind.
#[derive(Debug, Clone, Copy)]
pub struct PassiveProfile {
    /// Timer period (or one-shot window duration) in seconds.
    pub period_secs: f64,
    /// Effect radius in pixels for field passives.
    pub radius: f64,
    /// Kind-specific magnitude (heal amount, factor, cap, ...).
    pub magnitude: f64,
    /// Trigger probability for chance-gated passives.
    pub chance: f64,
}

/// TimeRewind jump distance bounds (pixels).
pub const REWIND_DISTANCE_MIN: f64 = 150.0;
pub const REWIND_DISTANCE_MAX: f64 = 200.0;

/// TimeRewind post-jump speed surge (px/s) and its duration.
pub const REWIND_SURGE_SPEED: f64 = 60.0;
pub const REWIND_SURGE_SECS: f64 = 1.0;

/// Get the profile for a passive kind.
pub fn profile(kind: PassiveKind) -> PassiveProfile {
    match kind {
        // One revive: 5s stunned/invulnerable window with temporary armor.
        PassiveKind::SecondWind => PassiveProfile {
            period_secs: 5.0,
            radius: 0.0,
            magnitude: 50_000.0,
            chance: 1.0,
        },
        // Every 8s, teleport backward along the traveled path and heal.
        PassiveKind::TimeRewind => PassiveProfile {
            period_secs: 8.0,
            radius: 0.0,
            magnitude: 7_000.0,
            chance: 1.0,
        },
        // +3 px/s every second.
        PassiveKind::Frenzy => PassiveProfile {
            period_secs: 1.0,
            radius: 0.0,
            magnitude: 3.0,
            chance: 1.0,
        },
        // 3s after losing cover: re-armor and vanish again.
        PassiveKind::ShadowVeil => PassiveProfile {
            period_secs: 3.0,
            radius: 0.0,
            magnitude: 0.0,
            chance: 1.0,
        },
        // Every 5s, shed all effects except nightmare.
        PassiveKind::Cleanse => PassiveProfile {
            period_secs: 5.0,
            radius: 0.0,
            magnitude: 0.0,
            chance: 1.0,
        },
        // Towers within 115px lose their attack cycle 25% of the time.
        PassiveKind::StaticField => PassiveProfile {
            period_secs: 0.0,
            radius: 115.0,
            magnitude: 0.0,
            chance: 0.25,
        },
        // Physical damage from towers within 120px is halved.
        PassiveKind::EmberShroud => PassiveProfile {
            period_secs: 0.0,
            radius: 120.0,
            magnitude: 0.5,
            chance: 1.0,
        },
        // Immune to physical damage below 30% hp.
        PassiveKind::Sturdy => PassiveProfile {
            period_secs: 0.0,
            radius: 0.0,
            magnitude: 0.3,
            chance: 1.0,
        },
        // Any single hit is capped at 1000.
        PassiveKind::LightFrame => PassiveProfile {
            period_secs: 0.0,
            radius: 0.0,
            magnitude: 1_000.0,
            chance: 1.0,
        },
        // Towers within 160px attack 1.5x slower.
        PassiveKind::FrostAura => PassiveProfile {
            period_secs: 0.0,
            radius: 160.0,
            magnitude: 1.5,
            chance: 1.0,
        },
    }
}
