//! Simulation constants and tuning parameters.

// --- Scheduler ---

/// Duration of one nominal frame at 1x speed (seconds). Sub-steps never
/// exceed this unless the sub-step cap is hit.
pub const NOMINAL_FRAME_SECS: f64 = 1.0 / 60.0;

/// Upper bound on sub-steps per frame, bounding worst-case CPU cost.
pub const MAX_SUB_STEPS: u32 = 100;

/// The speed multipliers the player can select.
pub const SPEED_MULTIPLIERS: [f64; 6] = [1.0, 1.5, 2.0, 3.0, 5.0, 10.0];

// --- Play field ---

/// Field width in pixels.
pub const FIELD_WIDTH: f64 = 720.0;

/// Field height in pixels.
pub const FIELD_HEIGHT: f64 = 624.0;

/// Margin beyond the field edge at which a path-end enemy counts as leaked.
pub const LEAK_MARGIN: f64 = 30.0;

/// Placement tile size in pixels.
pub const TILE_SIZE: f64 = 24.0;

// --- Enemies ---

/// Enemy body radius for collision (pixels).
pub const ENEMY_HIT_RADIUS: f64 = 4.0;

/// Fade-out rate for dying enemies (opacity per second).
pub const FADE_RATE: f64 = 1.8;

// --- Projectiles ---

/// Maximum projectile flight time (seconds).
pub const PROJECTILE_LIFETIME_SECS: f64 = 5.0;

/// Margin beyond the field bounds at which projectiles expire (pixels).
pub const PROJECTILE_BOUNDS_MARGIN: f64 = 50.0;

/// Extra collision margin on top of the enemy radius for swept detection.
pub const SWEPT_HIT_MARGIN: f64 = 4.0;

/// Search radius when a projectile re-acquires a fallback target (pixels).
pub const RETARGET_RADIUS: f64 = 200.0;

/// Search radius for ricochet follow-up targets (pixels).
pub const RICOCHET_SEARCH_RADIUS: f64 = 200.0;

/// Power retained by a ricochet child projectile.
pub const RICOCHET_POWER_FACTOR: f64 = 0.7;

/// Splash pulse radius (pixels).
pub const SPLASH_RADIUS: f64 = 65.0;

/// Fraction of projectile power dealt to splash victims.
pub const SPLASH_POWER_FACTOR: f64 = 0.5;

// --- Attack cycle ---

/// Cap on attack cycles a single tower may resolve in one sub-step.
pub const MAX_ATTACKS_PER_STEP: u32 = 50;

/// Floor on the derived attack interval (seconds).
pub const MIN_ATTACK_INTERVAL_SECS: f64 = 1e-5;

/// Default critical-hit damage multiplier.
pub const CRIT_MULTIPLIER: f64 = 1.5;

/// Critical-hit multiplier under the SuperCritical ability.
pub const SUPER_CRIT_MULTIPLIER: f64 = 2.0;

// --- Auras ---

/// Power multiplier granted by a PowerAura tower.
pub const POWER_AURA_FACTOR: f64 = 1.2;

/// Flat crit-chance bonus (percent) granted by a CriticalAura tower.
pub const CRIT_AURA_BONUS: f64 = 10.0;

/// Crit-damage multiplier granted by a CriticalDamageAura tower.
pub const CRIT_DAMAGE_AURA_FACTOR: f64 = 1.5;

/// Attack-interval factor granted by a TriageAura tower.
pub const TRIAGE_INTERVAL_FACTOR: f64 = 0.85;

// --- Status effects ---

/// Periodic status damage interval (seconds of simulated time).
pub const STATUS_TICK_SECS: f64 = 1.0;

/// Nightmare tick damage as a fraction of the caster's power, per stack.
pub const NIGHTMARE_POWER_FACTOR: f64 = 0.2;

// --- Weather ---

/// Damage multiplier for water-tile towers while it rains.
pub const RAIN_WATER_DAMAGE_FACTOR: f64 = 1.2;

// --- Economy ---

/// Fraction of an enemy's gold value stolen per Greed hit.
pub const GREED_FRACTION: f64 = 0.1;

// --- Wave flow ---

/// Seconds the wave-completed banner stays up before its expiry task fires.
pub const WAVE_BANNER_SECS: f64 = 1.5;
