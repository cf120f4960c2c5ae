//! Entity spawn factories and combat-state clearing.

use hecs::{Entity, World};

use rampart_core::components::*;
use rampart_core::constants::TILE_SIZE;
use rampart_core::content::{RouteData, Tile, UnitSpec};
use rampart_core::types::{EnemyId, Position, TowerId};
use rampart_waves::SpawnEntry;

/// Spawn one enemy from a wave descriptor entry. The enemy starts behind
/// the path's first waypoint, approaching along the reverse of the first
/// segment.
pub fn spawn_enemy(
    world: &mut World,
    next_id: &mut u32,
    entry: &SpawnEntry,
    route: &RouteData,
) -> Entity {
    let path_index = entry.path_index.min(route.paths.len().saturating_sub(1));
    let path = &route.paths[path_index];
    let start = path[0];
    let back = if path.len() > 1 {
        path[1].heading_to(&start)
    } else {
        glam::DVec2::new(-1.0, 0.0)
    };
    let position = Position(start.0 + back * entry.lead_distance);

    let template = &entry.template;
    let id = EnemyId(*next_id);
    *next_id += 1;

    world.spawn((
        Enemy,
        EnemyInfo {
            id,
            template: template.key.clone(),
            invisible: template.invisible,
            invulnerable: false,
            resist: template.resist,
            gold: template.gold,
            power: template.power,
        },
        Health {
            hp: template.hp.max(1.0),
            hp_max: template.hp.max(1.0),
            armor: template.armor.max(0.0),
            armor_max: template.armor.max(0.0),
            regeneration: template.regeneration,
            regen_timer: 0.0,
        },
        Mobility {
            base_speed: template.speed,
            speed: template.speed,
            stunned: false,
        },
        PathFollower {
            path_index,
            waypoint_index: 0,
            distance_traveled: 0.0,
            entered_field: false,
        },
        Lifecycle::default(),
        StatusLedger::default(),
        PassiveState {
            kind: template.passive,
            ..PassiveState::default()
        },
        position,
    ))
}

/// Spawn a tower for a deployed unit on a placement tile.
pub fn spawn_tower(
    world: &mut World,
    next_id: &mut u32,
    spec: &UnitSpec,
    tile_index: usize,
    tile: &Tile,
) -> Entity {
    let id = TowerId(*next_id);
    *next_id += 1;

    let center = Position::new(
        tile.position.x() + TILE_SIZE / 2.0,
        tile.position.y() + TILE_SIZE / 2.0,
    );

    world.spawn((
        Tower,
        TowerState {
            id,
            unit: spec.unit,
            tile_index,
            terrain: tile.terrain,
            ability: spec.ability,
            equipment: spec.equipment,
            attack_kind: spec.attack_kind,
            range_shape: spec.range_shape,
            target_mode: spec.target_mode,
            base_power: spec.power,
            base_interval_secs: spec.attack_interval_secs,
            base_range: spec.range,
            inner_range: spec.inner_range,
            base_crit_chance: spec.crit_chance,
            ricochets: spec.ricochets,
            projectile_speed: spec.projectile_speed,
            cooldown: 0.0,
            current_target: None,
            last_hit: None,
            focus_bonus: 0.0,
            kill_stacks: 0,
        },
        DerivedStats::default(),
        center,
    ))
}

/// Remove every enemy, tower, and projectile. Used on wave restarts so
/// no stale timers leak into the next attempt.
pub fn clear_combat_state(world: &mut World) {
    let mut entities: Vec<Entity> = Vec::new();
    entities.extend(world.query::<&Enemy>().iter().map(|(e, _)| e));
    entities.extend(world.query::<&Tower>().iter().map(|(e, _)| e));
    entities.extend(world.query::<&Projectile>().iter().map(|(e, _)| e));
    for entity in entities {
        let _ = world.despawn(entity);
    }
}
