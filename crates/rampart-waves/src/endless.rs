//! Endless waves (> 100): power-budget synthesis.
//!
//! The budget grows near-linearly up to wave 200 and steeper beyond; the
//! enemy count grows near-linearly throughout. Counts per template are
//! inversely proportional to base hp (many weak, few strong) and each
//! enemy's hp is scaled so the roster's total approximately equals the
//! budget.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rampart_core::content::{EnemyTemplate, RouteData};

use crate::{SpawnEntry, WaveDescriptor};

/// Aggregate hp pool at wave 101's baseline.
const BASE_BUDGET: f64 = 160_000.0;

/// Budget growth per wave past 100 (below wave 200).
const BUDGET_GROWTH: f64 = 0.115;

/// Enemy count baseline and growth per wave past 100.
const BASE_COUNT: f64 = 20.0;
const COUNT_GROWTH: f64 = 1.2;

/// Gold growth per wave past 100.
const GOLD_GROWTH: f64 = 0.11;

/// Extra lead distance so endless packs start fully off-field.
const LEAD_PAD: f64 = 50.0;

/// The target aggregate hp pool for an endless wave.
pub fn power_budget(wave: u32) -> f64 {
    let past = waves_past_100(wave) as f64;
    let mult = if wave < 200 {
        1.0 + past * BUDGET_GROWTH
    } else {
        wave as f64 / 16.0
    };
    (BASE_BUDGET * mult).floor()
}

/// The target total enemy count for an endless wave.
pub fn total_enemy_count(wave: u32) -> usize {
    (BASE_COUNT + waves_past_100(wave) as f64 * COUNT_GROWTH).floor() as usize
}

pub fn waves_past_100(wave: u32) -> u32 {
    wave.saturating_sub(100)
}

pub fn generate(route: &RouteData, wave: u32, rng: &mut ChaCha8Rng) -> WaveDescriptor {
    debug_assert!(wave > 100 && wave % 100 != 0);

    // The template pool is the preview of the wrapped-around authored wave.
    let template_wave = ((wave as usize - 1) % 99) + 1;
    let pool: Vec<&EnemyTemplate> = route
        .waves
        .get(template_wave - 1)
        .map(|w| {
            w.preview
                .iter()
                .filter_map(|&i| route.templates.get(i))
                .collect()
        })
        .unwrap_or_default();

    let pool_hp: f64 = pool.iter().map(|t| t.hp.max(0.0)).sum();
    if pool.is_empty() || pool_hp <= 0.0 {
        return crate::fallback_roster(route, wave);
    }

    let past = waves_past_100(wave) as f64;
    let budget = power_budget(wave);
    let count = total_enemy_count(wave);

    // Counts inversely proportional to base hp, at least one of each type.
    let inverse: Vec<f64> = pool.iter().map(|t| 1.0 / t.hp.max(1.0)).collect();
    let total_inverse: f64 = inverse.iter().sum();
    let mut roster: Vec<&EnemyTemplate> = Vec::with_capacity(count);
    for (template, inv) in pool.iter().zip(&inverse) {
        let copies = ((count as f64 * (inv / total_inverse)).floor() as usize).max(1);
        roster.extend(std::iter::repeat(*template).take(copies));
    }
    roster.shuffle(rng);

    // Scale hp so the roster total lands on the budget (per-enemy floor
    // rounding keeps the sum at or just under it).
    let roster_hp: f64 = roster.iter().map(|t| t.hp.max(1.0)).sum();
    let hp_scale = budget / roster_hp;

    let offset = (30.0 - (past / 15.0).floor()).max(8.0);
    let cluster_size = ((6.0 + (past / 20.0).floor()) as usize).min(25).max(1);
    let cluster_gap = offset.max(10.0);

    let path_index = rng.gen_range(0..route.paths.len().max(1));

    let entries: Vec<SpawnEntry> = roster
        .iter()
        .enumerate()
        .map(|(i, template)| {
            let mut scaled = (*template).clone();
            scaled.hp = (template.hp.max(1.0) * hp_scale).max(template.hp).floor();
            scaled.gold = (template.gold as f64 * (1.0 + past * GOLD_GROWTH)).floor() as u64;

            let cluster = (i / cluster_size) as f64;
            let slot = (i % cluster_size) as f64;
            let lead = cluster * cluster_size as f64 * offset + cluster * cluster_gap + slot * offset;

            SpawnEntry {
                template: scaled,
                lead_distance: lead + LEAD_PAD,
                path_index,
            }
        })
        .collect();

    // Preview shows one scaled copy of each distinct pool template.
    let preview = pool
        .iter()
        .map(|template| {
            let mut t = (*template).clone();
            t.hp = (template.hp.max(1.0) * hp_scale).max(template.hp).floor();
            t.gold = (template.gold as f64 * (1.0 + past * GOLD_GROWTH)).floor() as u64;
            t
        })
        .collect();

    WaveDescriptor {
        wave,
        entries,
        preview,
    }
}

/// Every 100th wave: N copies of the route's boss (N = wave / 100), with
/// escort reinforcements past wave 300.
pub fn generate_boss_wave(route: &RouteData, wave: u32, rng: &mut ChaCha8Rng) -> WaveDescriptor {
    debug_assert!(wave > 100 && wave % 100 == 0);

    let Some(boss) = route.templates.get(route.boss) else {
        return crate::fallback_roster(route, wave);
    };

    let past = waves_past_100(wave) as f64;
    let hp_mult = power_budget(wave) / BASE_BUDGET;
    let boss_count = (wave / 100) as usize;
    let spacing = (150.0 - (wave as f64 / 10.0).floor()).max(80.0);
    let path_index = rng.gen_range(0..route.paths.len().max(1));

    let scale_boss = |template: &EnemyTemplate| {
        let mut t = template.clone();
        t.hp = (template.hp * hp_mult).floor().max(template.hp);
        t.armor = (template.armor * hp_mult).floor().max(template.armor);
        t.gold = (template.gold as f64 * (1.0 + past * GOLD_GROWTH)).floor() as u64;
        t
    };

    let mut entries: Vec<SpawnEntry> = (0..boss_count)
        .map(|i| SpawnEntry {
            template: scale_boss(boss),
            lead_distance: (i as f64 + 1.0) * spacing,
            path_index,
        })
        .collect();

    if wave >= 300 {
        let escort_count = (((wave - 200) / 50) * 5) as usize;
        let escorts: Vec<&EnemyTemplate> = route
            .templates
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != route.boss)
            .map(|(_, t)| t)
            .collect();
        if !escorts.is_empty() {
            for i in 0..escort_count {
                let escort = escorts[rng.gen_range(0..escorts.len())];
                let mut t = escort.clone();
                t.hp = (escort.hp * hp_mult).floor().max(escort.hp);
                t.gold = (escort.gold as f64 * (1.0 + past * GOLD_GROWTH)).floor() as u64;
                entries.push(SpawnEntry {
                    template: t,
                    lead_distance: (boss_count as f64 + 1.0) * spacing + (i as f64 + 1.0) * 25.0,
                    path_index,
                });
            }
        }
    }

    let preview = vec![scale_boss(boss)];

    WaveDescriptor {
        wave,
        entries,
        preview,
    }
}
