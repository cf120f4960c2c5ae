//! Tower targeting and attack cycle.
//!
//! Per sub-step each non-aura tower counts down its cooldown, rebuilds
//! its valid-target set from the range shape and visibility rules, picks
//! targets in target-mode order, and fires: projectile towers spawn one
//! projectile per shot (stats snapshotted at launch), area towers strike
//! every valid target directly. A catch-up loop allows several cycles in
//! one sub-step at extreme attack speeds, capped to bound the cost.

use hecs::{Entity, World};
use rand::Rng;

use rampart_catalog::passives;
use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::{AttackKind, PassiveKind, TargetMode};
use rampart_core::events::FxEvent;
use rampart_core::types::Position;

use super::auras::is_aura_ability;
use super::damage::{self, StrikeSpec};
use super::targeting;
use super::{collect_enemy_snaps, CombatCtx, EnemySnap};

struct PendingProjectile {
    position: Position,
    state: ProjectileState,
}

struct PendingStrike {
    victim: Entity,
    spec: StrikeSpec,
}

pub fn run(world: &mut World, dt: f64, ctx: &mut CombatCtx<'_>) {
    let snaps = collect_enemy_snaps(world);

    let mut projectiles: Vec<PendingProjectile> = Vec::new();
    let mut strikes: Vec<PendingStrike> = Vec::new();

    for (_entity, (_tower, state, derived, pos)) in
        world.query_mut::<(&Tower, &mut TowerState, &DerivedStats, &Position)>()
    {
        if is_aura_ability(state.ability) {
            continue;
        }

        state.cooldown -= dt;

        // Valid targets: in the range shape, targetable, and visible to
        // this tower.
        let sees_invisible =
            derived.reveal_invisible || state.target_mode == TargetMode::Invisible;
        let mut valid: Vec<&EnemySnap> = snaps
            .iter()
            .filter(|s| {
                s.targetable()
                    && (!s.invisible || sees_invisible)
                    && targeting::in_range(
                        state.range_shape,
                        derived.range,
                        derived.inner_range,
                        s.position.0 - pos.0,
                    )
            })
            .collect();

        targeting::order(state.target_mode, &mut valid, ctx.rng);
        state.current_target = valid.first().map(|s| s.id);

        if valid.is_empty() {
            // Cooldown must not sink without bound while idle.
            state.cooldown = state.cooldown.max(0.0);
            continue;
        }

        // Paused sub-steps keep targeting fresh but never fire.
        if dt <= 0.0 {
            continue;
        }

        let interval = derived.interval_secs.max(MIN_ATTACK_INTERVAL_SECS);
        let mut cycles = 0;

        match state.attack_kind {
            AttackKind::Projectile => {
                while state.cooldown <= 0.0 && cycles < MAX_ATTACKS_PER_STEP {
                    cycles += 1;
                    if static_jam(&valid, pos, ctx) {
                        ctx.fx.push(FxEvent::AttackJammed { tower: state.id });
                        state.cooldown += interval;
                        break;
                    }

                    let mut targets: Vec<&EnemySnap> = Vec::new();
                    for snap in valid.iter() {
                        if targets.len() >= derived.shots as usize {
                            break;
                        }
                        if !targets.iter().any(|t| t.id == snap.id) {
                            targets.push(snap);
                        }
                    }
                    for target in &targets {
                        projectiles.push(PendingProjectile {
                            position: *pos,
                            state: ProjectileState {
                                tower: state.id,
                                target: target.id,
                                speed: state.projectile_speed,
                                power: derived.power,
                                crit_chance: derived.crit_chance,
                                crit_multiplier: derived.crit_multiplier,
                                ricochets_left: derived.ricochets,
                                splash_radius: derived.splash_radius,
                                age_secs: 0.0,
                            },
                        });
                    }
                    ctx.fx.push(FxEvent::ProjectileFired { tower: state.id });
                    state.cooldown += interval;
                }
            }
            AttackKind::Area => {
                while state.cooldown <= 0.0 && cycles < MAX_ATTACKS_PER_STEP {
                    cycles += 1;
                    if static_jam(&valid, pos, ctx) {
                        ctx.fx.push(FxEvent::AttackJammed { tower: state.id });
                        state.cooldown += interval;
                        break;
                    }

                    for snap in valid.iter() {
                        strikes.push(PendingStrike {
                            victim: snap.entity,
                            spec: StrikeSpec {
                                tower: state.id,
                                power: derived.power,
                                crit_chance: derived.crit_chance,
                                crit_multiplier: derived.crit_multiplier,
                                splash_radius: None,
                            },
                        });
                    }
                    ctx.fx.push(FxEvent::AreaPulse { tower: state.id });
                    state.cooldown += interval;
                }
            }
        }

        if cycles >= MAX_ATTACKS_PER_STEP {
            state.cooldown = state.cooldown.max(0.0);
        }
    }

    for pending in projectiles {
        world.spawn((Projectile, pending.position, pending.state));
    }
    for pending in strikes {
        damage::strike(world, pending.victim, &pending.spec, ctx);
    }
}

/// The StaticField check: a charged enemy close enough to the tower has a
/// chance to consume the attack cycle outright.
fn static_jam(valid: &[&EnemySnap], tower_pos: &Position, ctx: &mut CombatCtx<'_>) -> bool {
    for snap in valid {
        if snap.passive != Some(PassiveKind::StaticField) {
            continue;
        }
        let prof = passives::profile(PassiveKind::StaticField);
        if snap.position.distance_to(tower_pos) <= prof.radius && ctx.rng.gen_bool(prof.chance) {
            return true;
        }
    }
    false
}
