//! Authored waves (1-100): roster lookup plus wave-bucket scaling.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rampart_core::content::{EnemyTemplate, RouteData};

use crate::{SpawnEntry, WaveDescriptor};

/// Stat bump every 5 waves: +2% hp, +1% armor, +15% gold.
const HP_STEP: f64 = 0.02;
const ARMOR_STEP: f64 = 0.01;
const GOLD_STEP: f64 = 0.15;

/// Wave 100 boss multiplier on hp and armor.
const BOSS_WAVE_FACTOR: f64 = 2.0;

pub fn generate(route: &RouteData, wave: u32, rng: &mut ChaCha8Rng) -> WaveDescriptor {
    debug_assert!((1..=100).contains(&wave));

    let Some(authored) = route.waves.get((wave as usize - 1) % 100) else {
        return crate::fallback_roster(route, wave);
    };
    if authored.spawns.is_empty() {
        return crate::fallback_roster(route, wave);
    }

    let spacing = if authored.spacing > 0.0 {
        authored.spacing
    } else {
        50.0
    };

    let mut entries = Vec::with_capacity(authored.spawns.len());
    for (i, &index) in authored.spawns.iter().enumerate() {
        let Some(template) = route.templates.get(index) else {
            continue;
        };
        entries.push(SpawnEntry {
            template: scale(template, wave),
            lead_distance: (i as f64 + 1.0) * spacing,
            path_index: rng.gen_range(0..route.paths.len().max(1)),
        });
    }
    if entries.is_empty() {
        return crate::fallback_roster(route, wave);
    }

    let preview = authored
        .preview
        .iter()
        .filter_map(|&index| route.templates.get(index))
        .map(|t| scale(t, wave))
        .collect();

    WaveDescriptor {
        wave,
        entries,
        preview,
    }
}

/// Apply the bucket multipliers for `wave` to a template.
pub fn scale(template: &EnemyTemplate, wave: u32) -> EnemyTemplate {
    let steps = ((wave - 1) / 5) as f64;
    let mut hp_mult = 1.0 + HP_STEP * steps;
    let mut armor_mult = 1.0 + ARMOR_STEP * steps;
    let gold_mult = 1.0 + GOLD_STEP * steps;

    if wave == 100 {
        hp_mult *= BOSS_WAVE_FACTOR;
        armor_mult *= BOSS_WAVE_FACTOR;
    }

    let mut scaled = template.clone();
    scaled.hp = (template.hp * hp_mult).floor();
    scaled.armor = (template.armor * armor_mult).floor();
    scaled.gold = (template.gold as f64 * gold_mult).floor() as u64;
    scaled
}
