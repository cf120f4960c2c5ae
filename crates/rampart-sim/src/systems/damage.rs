//! The damage pipeline.
//!
//! `strike` resolves one delivered hit end to end, in a fixed order:
//! impact-time power rules (distance, new-target, armor gating), the
//! critical roll, defender passives, armor-then-hp application, the
//! death/revive transition, curse propagation, gold steal, secondary
//! status effects, and the splash pulse. Periodic status damage re-enters
//! through `apply_damage`, skipping the power and crit phases.

use std::collections::HashSet;

use hecs::{Entity, World};
use rand::Rng;

use rampart_catalog::passives;
use rampart_catalog::rules::{self, ModifierCtx};
use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::{DamageSource, PassiveKind};
use rampart_core::events::FxEvent;
use rampart_core::types::{EnemyId, Position, TowerId};

use super::CombatCtx;

/// Everything a delivered hit carries: the power and crit values are
/// snapshots taken at launch, so auras gained or lost mid-flight do not
/// re-evaluate.
#[derive(Debug, Clone, Copy)]
pub struct StrikeSpec {
    pub tower: TowerId,
    pub power: f64,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub splash_radius: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HitOutcome {
    /// Damage that reached hp after armor absorption.
    pub dealt: f64,
    pub absorbed: f64,
    pub critical: bool,
    pub killed: bool,
    pub revived: bool,
}

/// Resolve an enemy id against the world. Stale ids simply return None;
/// the caller recovers locally.
pub fn find_enemy(world: &World, id: EnemyId) -> Option<Entity> {
    world
        .query::<(&Enemy, &EnemyInfo)>()
        .iter()
        .find(|(_, (_, info))| info.id == id)
        .map(|(entity, _)| entity)
}

pub fn find_tower(world: &World, id: TowerId) -> Option<Entity> {
    world
        .query::<(&Tower, &TowerState)>()
        .iter()
        .find(|(_, (_, state))| state.id == id)
        .map(|(entity, _)| entity)
}

/// Resolve a full hit from a tower's loadout against `victim`.
pub fn strike(
    world: &World,
    victim: Entity,
    spec: &StrikeSpec,
    ctx: &mut CombatCtx<'_>,
) -> HitOutcome {
    let Ok(victim_info) = world.get::<&EnemyInfo>(victim) else {
        // Target vanished between collision and resolution.
        return HitOutcome::default();
    };
    let victim_id = victim_info.id;
    let victim_gold = victim_info.gold;
    let victim_armored = world
        .get::<&Health>(victim)
        .map(|h| h.armor > 0.0)
        .unwrap_or(false);
    let victim_pos = world
        .get::<&Position>(victim)
        .map(|p| *p)
        .unwrap_or_default();
    drop(victim_info);

    // Tower-side state: stateful ramps advance now, at impact.
    let tower_entity = find_tower(world, spec.tower);
    let mut mctx = ModifierCtx {
        weather: ctx.weather,
        player_hearts: ctx.player.hearts,
        target_armored: victim_armored,
        ..ModifierCtx::default()
    };
    let mut tower_pos = None;
    let mut loadout = None;
    if let Some(te) = tower_entity {
        if let (Ok(mut state), Ok(pos)) = (
            world.get::<&mut TowerState>(te),
            world.get::<&Position>(te),
        ) {
            let focus_per_hit = rules::loadout_rules(state.ability, state.equipment)
                .find_map(|r| match r.effect {
                    rules::Effect::FocusRamp(per_hit) => Some(per_hit),
                    _ => None,
                });
            let same_target = state.last_hit == Some(victim_id);
            if let Some(per_hit) = focus_per_hit {
                if same_target {
                    state.focus_bonus += per_hit;
                } else {
                    state.focus_bonus = 0.0;
                }
            }
            mctx.new_target = !same_target;
            mctx.focus_bonus = state.focus_bonus;
            mctx.kill_stacks = state.kill_stacks;
            mctx.terrain = state.terrain;
            mctx.distance = pos.distance_to(&victim_pos);
            state.last_hit = Some(victim_id);
            tower_pos = Some(*pos);
            loadout = Some((state.ability, state.equipment));
        }
    }

    // Impact-time power rules, then the critical roll.
    let mut damage = match loadout {
        Some((ability, equipment)) => {
            rules::impact_power(spec.power, rules::loadout_rules(ability, equipment), &mctx)
        }
        None => spec.power,
    };
    let critical = ctx.rng.gen_range(0.0..100.0) < spec.crit_chance;
    if critical {
        damage *= spec.crit_multiplier;
    }
    let damage = damage.ceil();

    let mut visited = HashSet::new();
    let outcome = apply_damage(
        world,
        victim,
        damage,
        DamageSource::Physical,
        Some(spec.tower),
        tower_pos,
        critical,
        &mut visited,
        ctx,
    );

    if let Some((ability, equipment)) = loadout {
        let rules_iter = rules::loadout_rules(ability, equipment);

        if outcome.killed {
            let has_kill_stacks = rules::loadout_rules(ability, equipment)
                .any(|r| matches!(r.effect, rules::Effect::PowerPerKillStack(_)));
            if has_kill_stacks {
                if let Some(te) = tower_entity {
                    if let Ok(mut state) = world.get::<&mut TowerState>(te) {
                        state.kill_stacks += 1;
                    }
                }
            }
        }

        if let Some(fraction) = rules::gold_steal(rules_iter.clone()) {
            let stolen = (victim_gold as f64 * fraction).ceil() as i64;
            ctx.player.change_gold(stolen);
        }

        // Secondary status effects, gated on the victim's resistances.
        for (apply, chance) in rules::on_hit_statuses(rules_iter) {
            if chance >= 1.0 || ctx.rng.gen_bool(chance.clamp(0.0, 1.0)) {
                super::status::apply_to(world, victim, &apply, Some(spec.tower), ctx.fx);
            }
        }
    }

    // Splash pulse: area damage around the impact point.
    if let Some(radius) = spec.splash_radius {
        let splash_damage = (spec.power * SPLASH_POWER_FACTOR).ceil();
        let others: Vec<Entity> = world
            .query::<(&Enemy, &Health, &Lifecycle, &Position)>()
            .iter()
            .filter(|&(entity, (_, health, life, pos))| {
                entity != victim
                    && health.hp > 0.0
                    && !life.dying
                    && pos.distance_to(&victim_pos) <= radius
            })
            .map(|(entity, _)| entity)
            .collect();
        for other in others {
            let mut splash_visited = HashSet::new();
            apply_damage(
                world,
                other,
                splash_damage,
                DamageSource::Physical,
                Some(spec.tower),
                tower_pos,
                critical,
                &mut splash_visited,
                ctx,
            );
        }
    }

    outcome
}

/// Apply a damage amount to an enemy: defender passives, armor-then-hp,
/// death/revive, and curse propagation. Hp and armor never go negative.
#[allow(clippy::too_many_arguments)]
pub fn apply_damage(
    world: &World,
    victim: Entity,
    amount: f64,
    source: DamageSource,
    caster: Option<TowerId>,
    attacker_pos: Option<Position>,
    critical: bool,
    visited: &mut HashSet<EnemyId>,
    ctx: &mut CombatCtx<'_>,
) -> HitOutcome {
    let mut outcome = HitOutcome {
        critical,
        ..HitOutcome::default()
    };
    let mut spread: Option<f64> = None;

    {
        let (Ok(mut info), Ok(mut health), Ok(mut life)) = (
            world.get::<&mut EnemyInfo>(victim),
            world.get::<&mut Health>(victim),
            world.get::<&mut Lifecycle>(victim),
        ) else {
            return outcome;
        };
        let (Ok(mut ledger), Ok(mut passive), Ok(mut mobility)) = (
            world.get::<&mut StatusLedger>(victim),
            world.get::<&mut PassiveState>(victim),
            world.get::<&mut Mobility>(victim),
        ) else {
            return outcome;
        };

        if life.dying || info.invulnerable || health.hp <= 0.0 {
            return outcome;
        }
        visited.insert(info.id);

        let mut amount = amount.max(0.0);
        if source == DamageSource::Physical {
            match passive.kind {
                Some(PassiveKind::EmberShroud) => {
                    let prof = passives::profile(PassiveKind::EmberShroud);
                    if let Some(from) = attacker_pos {
                        if let Ok(pos) = world.get::<&Position>(victim) {
                            if pos.distance_to(&from) <= prof.radius {
                                amount = (amount * prof.magnitude).floor();
                            }
                        }
                    }
                }
                Some(PassiveKind::Sturdy) => {
                    let prof = passives::profile(PassiveKind::Sturdy);
                    if health.hp < health.hp_max * prof.magnitude {
                        amount = 0.0;
                    }
                }
                Some(PassiveKind::LightFrame) => {
                    let prof = passives::profile(PassiveKind::LightFrame);
                    amount = amount.min(prof.magnitude);
                }
                _ => {}
            }
        }

        if ledger.cursed() && source != DamageSource::Curse && amount > 0.0 {
            spread = Some(amount);
        }

        let absorbed = amount.min(health.armor);
        health.armor = (health.armor - absorbed).max(0.0);
        let overflow = amount - absorbed;
        health.hp = (health.hp - overflow).max(0.0);
        outcome.absorbed = absorbed;
        outcome.dealt = overflow;

        if source == DamageSource::Physical {
            if amount > ctx.player.stats.highest_hit {
                ctx.player.stats.highest_hit = amount;
            }
            if info.invisible && amount > 0.0 {
                info.invisible = false;
            }
        }

        if health.hp <= 0.0 && !life.dying {
            if passive.kind == Some(PassiveKind::SecondWind) && !passive.used {
                // The revive intercepts the death exactly once.
                let prof = passives::profile(PassiveKind::SecondWind);
                passive.used = true;
                passive.reviving = true;
                passive.revive_timer = prof.period_secs;
                health.hp = 1.0;
                health.armor = prof.magnitude;
                health.armor_max = prof.magnitude;
                mobility.stunned = true;
                info.invulnerable = true;
                ledger.effects.clear();
                outcome.revived = true;
                ctx.fx.push(FxEvent::EnemyRevived { enemy: info.id });
            } else {
                life.dying = true;
                life.fade = 0.0;
                health.hp = 0.0;
                outcome.killed = true;
                ctx.player.change_gold(info.gold as i64);
                ctx.player.stats.enemies_defeated += 1;
                ctx.fx.push(FxEvent::EnemyKilled {
                    enemy: info.id,
                    gold: info.gold,
                });
            }
        }
    }

    // Curse propagation: the pre-mitigation amount spreads once to every
    // other cursed enemy, guarded by the per-hit visited set.
    if let Some(spread_amount) = spread {
        let others: Vec<Entity> = world
            .query::<(&Enemy, &EnemyInfo, &Health, &Lifecycle, &StatusLedger)>()
            .iter()
            .filter(|&(entity, (_, info, health, life, ledger))| {
                entity != victim
                    && ledger.cursed()
                    && health.hp > 0.0
                    && !life.dying
                    && !visited.contains(&info.id)
            })
            .map(|(entity, _)| entity)
            .collect();
        for other in others {
            apply_damage(
                world,
                other,
                spread_amount,
                DamageSource::Curse,
                caster,
                None,
                false,
                visited,
                ctx,
            );
        }
    }

    outcome
}
