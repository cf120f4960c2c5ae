//! Projectile flight, swept collision, ricochet chains, and expiry.

use glam::DVec2;
use hecs::{Entity, World};

use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::events::FxEvent;
use rampart_core::types::{EnemyId, Position, TowerId};

use super::damage::{self, StrikeSpec};
use super::{collect_enemy_snaps, nearest_snap, CombatCtx};

struct PendingHit {
    victim: Entity,
    victim_id: EnemyId,
    victim_pos: Position,
    spec: StrikeSpec,
    speed: f64,
    ricochets_left: u32,
}

pub fn run(world: &mut World, dt: f64, ctx: &mut CombatCtx<'_>, despawn: &mut Vec<Entity>) {
    if dt <= 0.0 {
        return;
    }

    let snaps = collect_enemy_snaps(world);

    // Which towers can see invisible enemies, for retargeting.
    let reveal: Vec<(TowerId, bool)> = world
        .query::<(&Tower, &TowerState, &DerivedStats)>()
        .iter()
        .map(|(_, (_, state, derived))| (state.id, derived.reveal_invisible))
        .collect();

    let mut hits: Vec<PendingHit> = Vec::new();

    for (entity, (_p, proj, pos)) in
        world.query_mut::<(&Projectile, &mut ProjectileState, &mut Position)>()
    {
        proj.age_secs += dt;
        if proj.age_secs >= PROJECTILE_LIFETIME_SECS {
            despawn.push(entity);
            continue;
        }

        let sees_invisible = reveal
            .iter()
            .find(|(id, _)| *id == proj.tower)
            .map(|(_, sees)| *sees)
            .unwrap_or(false);

        // Re-validate the target; a dead, despawned, or re-hidden target
        // is replaced by the nearest fallback or the projectile expires.
        let target = snaps
            .iter()
            .find(|s| {
                s.id == proj.target
                    && s.hp > 0.0
                    && !s.dying
                    && (!s.invisible || sees_invisible)
            })
            .copied();
        let target = match target {
            Some(t) => t,
            None => {
                match nearest_snap(&snaps, pos.0, RETARGET_RADIUS, None, sees_invisible) {
                    Some(next) => {
                        proj.target = next.id;
                        *next
                    }
                    None => {
                        despawn.push(entity);
                        continue;
                    }
                }
            }
        };

        let prev = pos.0;
        let dir = pos.heading_to(&target.position);
        pos.0 += dir * proj.speed * dt;

        if pos.x() < -PROJECTILE_BOUNDS_MARGIN
            || pos.x() > FIELD_WIDTH + PROJECTILE_BOUNDS_MARGIN
            || pos.y() < -PROJECTILE_BOUNDS_MARGIN
            || pos.y() > FIELD_HEIGHT + PROJECTILE_BOUNDS_MARGIN
        {
            despawn.push(entity);
            continue;
        }

        let hit_radius = ENEMY_HIT_RADIUS + SWEPT_HIT_MARGIN;
        if swept_hit(prev, pos.0, target.position.0, hit_radius) {
            hits.push(PendingHit {
                victim: target.entity,
                victim_id: target.id,
                victim_pos: target.position,
                spec: StrikeSpec {
                    tower: proj.tower,
                    power: proj.power,
                    crit_chance: proj.crit_chance,
                    crit_multiplier: proj.crit_multiplier,
                    splash_radius: proj.splash_radius,
                },
                speed: proj.speed,
                ricochets_left: proj.ricochets_left,
            });
            despawn.push(entity);
        }
    }

    for hit in hits {
        damage::strike(world, hit.victim, &hit.spec, ctx);

        // Ricochet: chain to the nearest other enemy at reduced power.
        if hit.ricochets_left > 0 {
            let fresh = collect_enemy_snaps(world);
            if let Some(next) = nearest_snap(
                &fresh,
                hit.victim_pos.0,
                RICOCHET_SEARCH_RADIUS,
                Some(hit.victim_id),
                false,
            ) {
                let child = ProjectileState {
                    tower: hit.spec.tower,
                    target: next.id,
                    speed: hit.speed,
                    power: (hit.spec.power * RICOCHET_POWER_FACTOR).ceil(),
                    crit_chance: hit.spec.crit_chance,
                    crit_multiplier: hit.spec.crit_multiplier,
                    ricochets_left: hit.ricochets_left - 1,
                    splash_radius: hit.spec.splash_radius,
                    age_secs: 0.0,
                };
                world.spawn((Projectile, hit.victim_pos, child));
                ctx.fx.push(FxEvent::ProjectileFired { tower: hit.spec.tower });
            }
        }
    }
}

/// Swept segment-vs-circle collision: true when the segment from `prev`
/// to `new` passes within `radius` of `center`. High sub-step speeds
/// cannot tunnel through a target.
pub fn swept_hit(prev: DVec2, new: DVec2, center: DVec2, radius: f64) -> bool {
    let seg = new - prev;
    let len_sq = seg.length_squared();
    let t = if len_sq > 0.0 {
        ((center - prev).dot(seg) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = prev + seg * t;
    center.distance(closest) < radius
}
