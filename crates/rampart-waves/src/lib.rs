//! Wave generation for RAMPART.
//!
//! Waves 1-100 come from the route's authored tables with mild bucket
//! scaling; waves past 100 are synthesized on demand by a power-budget
//! algorithm. `generate` is a pure function of `(route, wave)`: it seeds
//! its own RNG from those inputs, so rosters and scaled hp values are
//! reproducible for preview display, with randomness confined to spawn
//! order and waypoint choice.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rampart_core::content::{EnemyTemplate, RouteData};

pub mod authored;
pub mod endless;

#[cfg(test)]
mod tests;

/// One enemy to spawn: the fully resolved (scaled) template plus where it
/// enters relative to the path start.
#[derive(Debug, Clone)]
pub struct SpawnEntry {
    pub template: EnemyTemplate,
    /// Distance behind the path's first waypoint, in pixels.
    pub lead_distance: f64,
    /// Which of the route's waypoint polylines this enemy follows.
    pub path_index: usize,
}

/// A complete generated wave.
#[derive(Debug, Clone)]
pub struct WaveDescriptor {
    pub wave: u32,
    pub entries: Vec<SpawnEntry>,
    /// Identity templates for the pre-wave preview panel.
    pub preview: Vec<EnemyTemplate>,
}

/// Generate the roster for `wave` on `route`.
pub fn generate(route: &RouteData, wave: u32) -> WaveDescriptor {
    let mut rng = wave_rng(route, wave);
    if wave <= 100 {
        authored::generate(route, wave, &mut rng)
    } else if wave % 100 == 0 {
        endless::generate_boss_wave(route, wave, &mut rng)
    } else {
        endless::generate(route, wave, &mut rng)
    }
}

/// The deterministic preview roster for `wave`, identical across calls.
pub fn preview(route: &RouteData, wave: u32) -> Vec<EnemyTemplate> {
    generate(route, wave).preview
}

/// RNG seeded purely from the generator inputs.
fn wave_rng(route: &RouteData, wave: u32) -> ChaCha8Rng {
    let seed = ((route.route_number as u64) << 32) ^ (wave as u64).wrapping_mul(12345);
    ChaCha8Rng::seed_from_u64(seed)
}

/// Fail-safe roster for degenerate wave templates: one copy of the first
/// template the route offers, never a division by zero.
fn fallback_roster(route: &RouteData, wave: u32) -> WaveDescriptor {
    log::warn!("wave {wave}: degenerate template data, using fallback roster");
    let entries = route
        .templates
        .first()
        .map(|template| {
            vec![SpawnEntry {
                template: template.clone(),
                lead_distance: 50.0,
                path_index: 0,
            }]
        })
        .unwrap_or_default();
    let preview = entries.iter().map(|e| e.template.clone()).collect();
    WaveDescriptor {
        wave,
        entries,
        preview,
    }
}
