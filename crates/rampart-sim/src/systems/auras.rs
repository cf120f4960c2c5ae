//! Derived-stat recomputation.
//!
//! Every sub-step each tower's combat stats are rebuilt from scratch:
//! base stats, catalog rules under the current terrain/weather/player
//! context, then aura buffs from neighboring towers and the FrostAura
//! penalty from nearby enemies. Nothing here is persisted — a tower that
//! loses its aura neighbor loses the buff on the next sub-step.

use glam::DVec2;
use hecs::{Entity, World};

use rampart_catalog::passives;
use rampart_catalog::rules::{self, ModifierCtx};
use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::{AbilityId, PassiveKind, Weather};
use rampart_core::types::Position;

pub fn is_aura_ability(ability: AbilityId) -> bool {
    matches!(
        ability,
        AbilityId::PowerAura
            | AbilityId::CriticalAura
            | AbilityId::CriticalDamageAura
            | AbilityId::TriageAura
    )
}

struct TowerSnap {
    entity: Entity,
    position: DVec2,
    state: TowerState,
}

pub fn run(world: &mut World, weather: Weather, player_hearts: u32) {
    let towers: Vec<TowerSnap> = world
        .query::<(&Tower, &TowerState, &Position)>()
        .iter()
        .map(|(entity, (_t, state, pos))| TowerSnap {
            entity,
            position: pos.0,
            state: state.clone(),
        })
        .collect();

    let frost_sources: Vec<(DVec2, f64)> = world
        .query::<(&Enemy, &EnemyInfo, &Health, &Lifecycle, &PassiveState, &Position)>()
        .iter()
        .filter(|(_, (_, info, health, life, passive, _))| {
            passive.kind == Some(PassiveKind::FrostAura)
                && health.hp > 0.0
                && !life.dying
                && !info.invulnerable
        })
        .map(|(_, (_, _, _, _, passive, pos))| {
            let prof = passives::profile(passive.kind.unwrap());
            (pos.0, prof.radius)
        })
        .collect();

    // Pass 1: per-tower derivation without aura contributions.
    let mut derived: Vec<DerivedStats> = towers
        .iter()
        .map(|snap| base_derive(&snap.state, weather, player_hearts))
        .collect();

    // Pass 2: aura flags from neighboring towers, using the aura tower's
    // own derived range.
    for i in 0..towers.len() {
        for (j, aura) in towers.iter().enumerate() {
            if i == j || !is_aura_ability(aura.state.ability) {
                continue;
            }
            let dist = towers[i].position.distance(aura.position);
            if dist > derived[j].range {
                continue;
            }
            match aura.state.ability {
                AbilityId::PowerAura => derived[i].power_aura = true,
                AbilityId::CriticalAura => derived[i].critical_aura = true,
                AbilityId::CriticalDamageAura => derived[i].critical_damage_aura = true,
                AbilityId::TriageAura => derived[i].triage_aura = true,
                _ => {}
            }
        }
        derived[i].frost_slowed = frost_sources
            .iter()
            .any(|(pos, radius)| towers[i].position.distance(*pos) <= *radius);
    }

    // Pass 3: fold aura and frost contributions into the final numbers.
    for (snap, stats) in towers.iter().zip(derived.iter_mut()) {
        let rules_iter = rules::loadout_rules(snap.state.ability, snap.state.equipment);
        let ctx = ModifierCtx {
            terrain: snap.state.terrain,
            weather,
            player_hearts,
            kill_stacks: snap.state.kill_stacks,
            critical_aura: stats.critical_aura,
            critical_damage_aura: stats.critical_damage_aura,
            ..ModifierCtx::default()
        };

        if stats.power_aura {
            stats.power = (stats.power * POWER_AURA_FACTOR).ceil();
        }
        if stats.triage_aura {
            stats.interval_secs *= TRIAGE_INTERVAL_FACTOR;
        }
        if stats.frost_slowed {
            let frost = passives::profile(PassiveKind::FrostAura);
            stats.interval_secs *= frost.magnitude;
        }
        stats.interval_secs = stats.interval_secs.max(MIN_ATTACK_INTERVAL_SECS);
        stats.crit_chance = rules::crit_chance(snap.state.base_crit_chance, rules_iter.clone(), &ctx);
        stats.crit_multiplier = rules::crit_multiplier(rules_iter, &ctx);
    }

    for (snap, stats) in towers.iter().zip(derived) {
        if let Ok(mut slot) = world.get::<&mut DerivedStats>(snap.entity) {
            *slot = stats;
        }
    }
}

/// Stats from base values and catalog rules only (no aura neighbors).
fn base_derive(state: &TowerState, weather: Weather, player_hearts: u32) -> DerivedStats {
    let rules_iter = rules::loadout_rules(state.ability, state.equipment);
    let ctx = ModifierCtx {
        terrain: state.terrain,
        weather,
        player_hearts,
        kill_stacks: state.kill_stacks,
        ..ModifierCtx::default()
    };

    DerivedStats {
        power: rules::launch_power(state.base_power, rules_iter.clone(), &ctx),
        interval_secs: rules::attack_interval(state.base_interval_secs, rules_iter.clone(), &ctx),
        range: rules::attack_range(state.base_range, rules_iter.clone(), &ctx),
        inner_range: state.inner_range,
        crit_chance: state.base_crit_chance,
        crit_multiplier: CRIT_MULTIPLIER,
        reveal_invisible: rules::reveals_invisible(rules_iter.clone()),
        shots: rules::shots(rules_iter.clone()),
        ricochets: state.ricochets + rules::extra_ricochets(rules_iter.clone()),
        splash_radius: rules::splash_radius(rules_iter),
        power_aura: false,
        critical_aura: false,
        critical_damage_aura: false,
        triage_aura: false,
        frost_slowed: false,
    }
}
