//! Enemy movement: waypoint following, leak damage, regeneration, and the
//! dying fade-out.

use hecs::{Entity, World};

use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::content::RouteData;
use rampart_core::events::FxEvent;
use rampart_core::player::PlayerAccount;
use rampart_core::types::Position;

use super::in_field;

pub fn run(
    world: &mut World,
    dt: f64,
    route: &RouteData,
    player: &mut PlayerAccount,
    fx: &mut Vec<FxEvent>,
    despawn: &mut Vec<Entity>,
) {
    if dt <= 0.0 {
        return;
    }

    for (entity, (_enemy, info, health, mobility, path, life, pos)) in world.query_mut::<(
        &Enemy,
        &EnemyInfo,
        &mut Health,
        &Mobility,
        &mut PathFollower,
        &mut Lifecycle,
        &mut Position,
    )>() {
        if life.dying {
            life.fade += FADE_RATE * dt;
            if life.fade >= 1.0 {
                despawn.push(entity);
            }
            continue;
        }

        if health.regeneration > 0.0 {
            health.regen_timer += dt;
            while health.regen_timer >= STATUS_TICK_SECS {
                health.hp = (health.hp + health.regeneration).min(health.hp_max);
                health.regen_timer -= STATUS_TICK_SECS;
            }
        }

        if mobility.stunned {
            continue;
        }

        let Some(waypoints) = route.paths.get(path.path_index) else {
            continue;
        };
        let Some(waypoint) = waypoints.get(path.waypoint_index).copied() else {
            continue;
        };

        let step = mobility.speed * dt;
        let dir = pos.heading_to(&waypoint);
        pos.0 += dir * step;

        if !path.entered_field && in_field(pos) {
            path.entered_field = true;
        }
        if path.entered_field {
            path.distance_traveled += step;
        }

        let remaining = pos.distance_to(&waypoint);
        if remaining < step && path.waypoint_index < waypoints.len() - 1 {
            path.waypoint_index += 1;
        }

        // Reaching the path end outside the field counts as unblocked
        // damage to the player.
        if path.waypoint_index == waypoints.len() - 1 && !in_field(pos) && path.entered_field {
            life.dying = true;
            life.fade = 1.0;
            despawn.push(entity);
            fx.push(FxEvent::EnemyLeaked {
                enemy: info.id,
                power: info.power,
            });
            if player.get_damaged(info.power) {
                fx.push(FxEvent::PlayerDefeated);
            }
        }
    }
}
