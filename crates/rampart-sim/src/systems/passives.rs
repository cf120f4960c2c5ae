//! Enemy passive ability timers: revive windows, backward time-jumps,
//! speed ramps, cover restoration, and status shedding.
//!
//! Field passives (StaticField, EmberShroud, Sturdy, LightFrame,
//! FrostAura) have no per-tick state; they are checked where they act.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rampart_catalog::passives::{
    profile, REWIND_DISTANCE_MAX, REWIND_DISTANCE_MIN, REWIND_SURGE_SECS, REWIND_SURGE_SPEED,
};
use rampart_core::components::*;
use rampart_core::content::RouteData;
use rampart_core::enums::{PassiveKind, StatusKind};
use rampart_core::events::FxEvent;
use rampart_core::types::Position;

pub fn run(
    world: &mut World,
    dt: f64,
    route: &RouteData,
    rng: &mut ChaCha8Rng,
    fx: &mut Vec<FxEvent>,
) {
    if dt <= 0.0 {
        return;
    }

    for (_entity, (_enemy, info, health, mobility, path, life, ledger, passive, pos)) in world
        .query_mut::<(
            &Enemy,
            &mut EnemyInfo,
            &mut Health,
            &mut Mobility,
            &mut PathFollower,
            &Lifecycle,
            &mut StatusLedger,
            &mut PassiveState,
            &mut Position,
        )>()
    {
        if life.dying {
            continue;
        }
        let Some(kind) = passive.kind else {
            continue;
        };
        let prof = profile(kind);

        match kind {
            PassiveKind::SecondWind => {
                if passive.reviving {
                    passive.revive_timer -= dt;
                    mobility.stunned = true;
                    if passive.revive_timer <= 0.0 {
                        passive.reviving = false;
                        passive.revive_timer = 0.0;
                        mobility.stunned = false;
                        info.invulnerable = false;
                        health.hp = health.hp_max;
                        health.armor = 0.0;
                        health.armor_max = 0.0;
                        ledger.effects.clear();
                        mobility.speed = mobility.base_speed;
                    }
                }
            }
            PassiveKind::TimeRewind => {
                if passive.surge_timer > 0.0 {
                    passive.surge_timer -= dt;
                    if passive.surge_timer <= 0.0 {
                        passive.surge_timer = 0.0;
                        mobility.base_speed -= REWIND_SURGE_SPEED;
                        mobility.speed -= REWIND_SURGE_SPEED;
                    }
                }
                if path.waypoint_index == 0 {
                    continue;
                }
                passive.timer += dt;
                if passive.timer >= prof.period_secs {
                    passive.timer = 0.0;

                    let Some(waypoints) = route.paths.get(path.path_index) else {
                        continue;
                    };
                    let total = rng.gen_range(REWIND_DISTANCE_MIN..REWIND_DISTANCE_MAX);
                    let mut back = total;
                    // Walk backward waypoint-by-waypoint so distance-traveled
                    // accounting stays correct.
                    while back > 0.0 && path.waypoint_index > 0 {
                        let prev = waypoints[path.waypoint_index - 1];
                        let to_prev = pos.distance_to(&prev);
                        if back <= to_prev {
                            let dir = pos.heading_to(&prev);
                            pos.0 += dir * back;
                            back = 0.0;
                        } else {
                            *pos = prev;
                            back -= to_prev;
                            path.waypoint_index -= 1;
                        }
                    }
                    path.distance_traveled = (path.distance_traveled - (total - back)).max(0.0);

                    health.hp = (health.hp + prof.magnitude).min(health.hp_max);
                    ledger.effects.retain(|e| {
                        !matches!(
                            e.kind,
                            StatusKind::Burn | StatusKind::Poison | StatusKind::Nightmare
                        )
                    });

                    mobility.base_speed += REWIND_SURGE_SPEED;
                    mobility.speed += REWIND_SURGE_SPEED;
                    passive.surge_timer = REWIND_SURGE_SECS;
                    fx.push(FxEvent::EnemyRewound { enemy: info.id });
                }
            }
            PassiveKind::Frenzy => {
                passive.timer += dt;
                while passive.timer >= prof.period_secs {
                    passive.timer -= prof.period_secs;
                    mobility.base_speed += prof.magnitude;
                    mobility.speed += prof.magnitude;
                }
            }
            PassiveKind::ShadowVeil => {
                if !info.invisible {
                    passive.timer += dt;
                    if passive.timer >= prof.period_secs {
                        passive.timer = 0.0;
                        health.armor = health.armor_max;
                        info.invisible = true;
                    }
                }
            }
            PassiveKind::Cleanse => {
                passive.timer += dt;
                if passive.timer >= prof.period_secs {
                    passive.timer = 0.0;
                    ledger.effects.retain(|e| e.kind == StatusKind::Nightmare);
                    mobility.stunned = false;
                    mobility.speed = mobility.base_speed;
                }
            }
            PassiveKind::StaticField
            | PassiveKind::EmberShroud
            | PassiveKind::Sturdy
            | PassiveKind::LightFrame
            | PassiveKind::FrostAura => {}
        }
    }
}
