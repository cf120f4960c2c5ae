//! Status effect ledger maintenance: application/merge rules, periodic
//! tick damage, duration decay, and slow/stun bookkeeping.
//!
//! Each enemy accumulates tick time on its own timer; burn and poison
//! deal percent-of-max-hp damage once per simulated second, nightmare
//! scales with the caster's current power, and expired records are
//! dropped before speed is recomputed from the remaining slows.

use std::collections::{HashMap, HashSet};

use hecs::{Entity, World};

use rampart_catalog::rules::StatusApply;
use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::{DamageSource, StatusKind};
use rampart_core::events::FxEvent;
use rampart_core::types::TowerId;

use super::{damage, CombatCtx};

struct TickDamage {
    victim: Entity,
    amount: f64,
    source: DamageSource,
    caster: Option<TowerId>,
}

pub fn run(world: &mut World, dt: f64, ctx: &mut CombatCtx<'_>) {
    if dt <= 0.0 {
        return;
    }

    // Caster power lookup for nightmare ticks. A retired tower simply
    // stops feeding its nightmares.
    let tower_power: HashMap<TowerId, f64> = world
        .query::<(&Tower, &TowerState, &DerivedStats)>()
        .iter()
        .map(|(_, (_, state, derived))| (state.id, derived.power))
        .collect();

    let mut ticks: Vec<TickDamage> = Vec::new();

    for (entity, (_enemy, health, ledger, mobility, passive, life)) in world.query_mut::<(
        &Enemy,
        &Health,
        &mut StatusLedger,
        &mut Mobility,
        &PassiveState,
        &Lifecycle,
    )>() {
        if life.dying {
            continue;
        }
        if ledger.effects.is_empty() {
            ledger.tick_timer = 0.0;
            mobility.stunned = passive.reviving;
            mobility.speed = mobility.base_speed;
            continue;
        }

        // Slow and stun run down continuously.
        for effect in ledger.effects.iter_mut() {
            if matches!(effect.kind, StatusKind::Slow | StatusKind::Stun) {
                effect.remaining_secs -= dt;
            }
        }

        ledger.tick_timer += dt;
        while ledger.tick_timer >= STATUS_TICK_SECS {
            ledger.tick_timer -= STATUS_TICK_SECS;
            for effect in ledger.effects.iter_mut() {
                match effect.kind {
                    StatusKind::Burn => {
                        if effect.remaining_secs > 0.0 {
                            ticks.push(TickDamage {
                                victim: entity,
                                amount: (health.hp_max * effect.damage_percent).ceil(),
                                source: DamageSource::Burn,
                                caster: effect.source,
                            });
                            effect.remaining_secs -= 1.0;
                        }
                    }
                    StatusKind::Poison => {
                        ticks.push(TickDamage {
                            victim: entity,
                            amount: (health.hp_max * effect.damage_percent * effect.stacks as f64)
                                .ceil(),
                            source: DamageSource::Poison,
                            caster: effect.source,
                        });
                    }
                    StatusKind::Nightmare => {
                        let Some(power) = effect.source.and_then(|id| tower_power.get(&id)) else {
                            continue;
                        };
                        ticks.push(TickDamage {
                            victim: entity,
                            amount: (power * NIGHTMARE_POWER_FACTOR * effect.stacks as f64).ceil(),
                            source: DamageSource::Nightmare,
                            caster: effect.source,
                        });
                    }
                    StatusKind::Slow | StatusKind::Stun | StatusKind::Curse => {}
                }
            }
        }

        // Drop expired duration-based records; poison, nightmare, and
        // curse persist until something else clears them.
        ledger.effects.retain(|e| match e.kind {
            StatusKind::Burn | StatusKind::Slow | StatusKind::Stun => e.remaining_secs > 0.0,
            StatusKind::Poison | StatusKind::Nightmare | StatusKind::Curse => true,
        });

        mobility.stunned = ledger.has(StatusKind::Stun) || passive.reviving;
        let slow_factor: f64 = ledger
            .effects
            .iter()
            .filter(|e| e.kind == StatusKind::Slow)
            .map(|e| e.slow_factor)
            .product();
        mobility.speed = mobility.base_speed * slow_factor;
    }

    // Tick damage re-enters the pipeline with the original caster as the
    // attacker; the power and crit phases are already baked in.
    for tick in ticks {
        let mut visited = HashSet::new();
        damage::apply_damage(
            world,
            tick.victim,
            tick.amount,
            tick.source,
            tick.caster,
            None,
            false,
            &mut visited,
            ctx,
        );
    }
}

/// Apply a status effect to an enemy, honoring resistances and the
/// per-type merge rules: burn/slow/stun refresh the single existing
/// record, poison/nightmare accumulate stacks, curse is idempotent.
pub fn apply_to(
    world: &World,
    victim: Entity,
    apply: &StatusApply,
    source: Option<TowerId>,
    fx: &mut Vec<FxEvent>,
) {
    let Ok(info) = world.get::<&EnemyInfo>(victim) else {
        return;
    };
    let allowed = match apply.kind {
        StatusKind::Burn => info.resist.can_burn,
        StatusKind::Poison => info.resist.can_poison,
        StatusKind::Slow => info.resist.can_slow,
        StatusKind::Stun => info.resist.can_stun,
        StatusKind::Curse | StatusKind::Nightmare => true,
    };
    if !allowed {
        return;
    }
    let enemy_id = info.id;
    drop(info);

    let (Ok(mut ledger), Ok(mut mobility), Ok(life)) = (
        world.get::<&mut StatusLedger>(victim),
        world.get::<&mut Mobility>(victim),
        world.get::<&Lifecycle>(victim),
    ) else {
        return;
    };
    if life.dying {
        return;
    }

    if let Some(existing) = ledger.effects.iter_mut().find(|e| e.kind == apply.kind) {
        match apply.kind {
            StatusKind::Poison | StatusKind::Nightmare => {
                existing.stacks += apply.stacks.max(1);
                existing.source = source.or(existing.source);
            }
            StatusKind::Burn | StatusKind::Slow | StatusKind::Stun => {
                existing.remaining_secs = apply.duration_secs;
                existing.damage_percent = apply.damage_percent;
                existing.slow_factor = apply.slow_factor;
                existing.source = source.or(existing.source);
            }
            StatusKind::Curse => {}
        }
    } else {
        ledger.effects.push(StatusEffectRecord {
            kind: apply.kind,
            remaining_secs: apply.duration_secs,
            stacks: apply.stacks.max(1),
            damage_percent: apply.damage_percent,
            slow_factor: apply.slow_factor,
            source,
        });
    }
    fx.push(FxEvent::StatusApplied {
        enemy: enemy_id,
        kind: apply.kind,
    });

    // Stun and slow take hold immediately, not at the next tick.
    if apply.kind == StatusKind::Stun {
        mobility.stunned = true;
    }
    if apply.kind == StatusKind::Slow {
        let slow_factor: f64 = ledger
            .effects
            .iter()
            .filter(|e| e.kind == StatusKind::Slow)
            .map(|e| e.slow_factor)
            .product();
        mobility.speed = mobility.base_speed * slow_factor;
    }
}
