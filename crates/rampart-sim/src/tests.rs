//! Tests for the scheduler, movement, targeting, damage pipeline, status
//! ledger, wave flow, and the endless-wave end-to-end properties.

use std::collections::HashSet;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rampart_catalog::rules::StatusApply;
use rampart_core::commands::PlayerCommand;
use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::content::{AuthoredWave, EnemyTemplate, RouteData, Tile, UnitSpec};
use rampart_core::enums::*;
use rampart_core::events::FxEvent;
use rampart_core::player::PlayerAccount;
use rampart_core::types::{EnemyId, Position, UnitId};

use crate::engine::{sub_step_plan, SimConfig, SimulationEngine};
use crate::systems::{self, damage, projectile, status, CombatCtx};
use crate::world_setup;

const FRAME: f64 = 1.0 / 60.0;

fn template(key: &str, hp: f64, speed: f64) -> EnemyTemplate {
    EnemyTemplate {
        key: key.into(),
        hp,
        armor: 0.0,
        speed,
        power: 1.0,
        gold: 5,
        regeneration: 0.0,
        invisible: false,
        resist: ResistFlags {
            can_burn: true,
            can_poison: true,
            can_slow: true,
            can_stun: true,
        },
        passive: None,
    }
}

/// Route with one straight path that exits the field on the right, the
/// boss at template slot 0, and a single trash spawn per authored wave.
fn route() -> RouteData {
    let waves = (1..=100)
        .map(|_| AuthoredWave {
            preview: vec![1, 2, 3],
            spawns: vec![1],
            spacing: 50.0,
        })
        .collect();
    RouteData {
        route_number: 0,
        templates: vec![
            template("warden", 50_000.0, 30.0),
            template("scuttler", 100.0, 60.0),
            {
                let mut t = template("bulwark", 400.0, 45.0);
                t.armor = 50.0;
                t.gold = 12;
                t
            },
            template("strider", 250.0, 90.0),
        ],
        waves,
        boss: 0,
        paths: vec![vec![Position::new(10.0, 100.0), Position::new(760.0, 100.0)]],
        tiles: vec![Tile {
            position: Position::new(0.0, 88.0),
            terrain: Terrain::Neutral,
        }],
    }
}

fn unit(power: f64, interval_secs: f64, crit: f64) -> UnitSpec {
    UnitSpec {
        unit: UnitId(1),
        power,
        attack_interval_secs: interval_secs,
        range: 200.0,
        inner_range: 0.0,
        range_shape: RangeShape::Circle,
        attack_kind: AttackKind::Projectile,
        target_mode: TargetMode::First,
        crit_chance: crit,
        ricochets: 0,
        projectile_speed: 100_000.0,
        ability: AbilityId::Standard,
        equipment: None,
        allowed_terrain: vec![Terrain::Neutral],
    }
}

fn tile_at(x: f64, y: f64) -> Tile {
    Tile {
        position: Position::new(x, y),
        terrain: Terrain::Neutral,
    }
}

fn engine() -> SimulationEngine {
    SimulationEngine::new(SimConfig {
        seed: 42,
        route: route(),
        starting_wave: 1,
    })
}

fn enemy_hp(engine: &SimulationEngine, id: EnemyId) -> Option<f64> {
    let mut query = engine.world().query::<(&EnemyInfo, &Health)>();
    query
        .iter()
        .find(|(_, (info, _))| info.id == id)
        .map(|(_, (_, health))| health.hp)
}

/// Spawn an enemy into a bare world for pipeline-level tests.
fn spawn_direct(world: &mut World, next: &mut u32, template: &EnemyTemplate) -> hecs::Entity {
    let entry = rampart_waves::SpawnEntry {
        template: template.clone(),
        lead_distance: 0.0,
        path_index: 0,
    };
    world_setup::spawn_enemy(world, next, &entry, &route())
}

// ---- Scheduler ----

#[test]
fn test_sub_step_plan_properties() {
    for &speed in SPEED_MULTIPLIERS.iter() {
        for frame in [FRAME, 0.008, 0.033, 0.1, 0.5] {
            let (count, dt) = sub_step_plan(frame, speed);
            let total = frame * speed;
            assert!(count >= 1 && count <= MAX_SUB_STEPS, "count {count}");
            assert!(
                (count as f64 * dt - total).abs() < 1e-9,
                "sub-steps must cover the scaled delta exactly: {count} x {dt} vs {total}"
            );
            if count < MAX_SUB_STEPS {
                assert!(
                    dt <= NOMINAL_FRAME_SECS + 1e-12,
                    "uncapped sub-steps never exceed one nominal frame: {dt}"
                );
            }
        }
    }

    // Zero or negative deltas degrade to a single empty step.
    assert_eq!(sub_step_plan(0.0, 10.0), (1, 0.0));
    assert_eq!(sub_step_plan(-1.0, 10.0), (1, 0.0));

    // Worst case hits the cap instead of unbounded work.
    let (count, _) = sub_step_plan(10.0, 10.0);
    assert_eq!(count, MAX_SUB_STEPS);
}

#[test]
fn test_speed_multiplier_validation() {
    let mut engine = engine();
    engine.queue_command(PlayerCommand::SetSpeedMultiplier { factor: 4.0 });
    engine.advance_frame(FRAME);
    assert_eq!(engine.speed_multiplier(), 1.0, "4x is not an allowed step");

    engine.queue_command(PlayerCommand::SetSpeedMultiplier { factor: 10.0 });
    engine.advance_frame(FRAME);
    assert_eq!(engine.speed_multiplier(), 10.0);
}

#[test]
fn test_pause_freezes_simulation() {
    let mut engine = engine();
    let id = engine.spawn_enemy_for_test(&template("runner", 100.0, 60.0), 0.0);
    for _ in 0..10 {
        engine.advance_frame(FRAME);
    }
    let elapsed = engine.time().elapsed_secs;
    assert!(elapsed > 0.0);

    engine.queue_command(PlayerCommand::Pause);
    let snap_a = engine.advance_frame(FRAME);
    for _ in 0..20 {
        engine.advance_frame(FRAME);
    }
    let snap_b = engine.advance_frame(FRAME);

    assert_eq!(engine.phase(), GamePhase::Paused);
    assert_eq!(engine.time().elapsed_secs, elapsed, "paused time stands still");
    let pos_a = snap_a.enemies.iter().find(|e| e.id == id).unwrap().position;
    let pos_b = snap_b.enemies.iter().find(|e| e.id == id).unwrap().position;
    assert_eq!(pos_a, pos_b, "paused enemies do not move");

    engine.queue_command(PlayerCommand::Resume);
    engine.advance_frame(FRAME);
    assert!(engine.time().elapsed_secs > elapsed);
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let build = || {
        let mut e = SimulationEngine::new(SimConfig {
            seed: 12345,
            route: route(),
            starting_wave: 1,
        });
        e.spawn_tower_for_test(&unit(10.0, 0.1, 50.0), tile_at(0.0, 88.0));
        e.spawn_enemy_for_test(&template("anchor", 1_000_000.0, 30.0), 0.0);
        e
    };
    let mut engine_a = build();
    let mut engine_b = build();

    for _ in 0..180 {
        let snap_a = engine_a.advance_frame(FRAME);
        let snap_b = engine_b.advance_frame(FRAME);
        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds_diverge() {
    let build = |seed| {
        let mut e = SimulationEngine::new(SimConfig {
            seed,
            route: route(),
            starting_wave: 1,
        });
        e.spawn_tower_for_test(&unit(10.0, 0.1, 50.0), tile_at(0.0, 88.0));
        e.spawn_enemy_for_test(&template("anchor", 1_000_000.0, 0.0), 0.0);
        e
    };
    let mut engine_a = build(111);
    let mut engine_b = build(222);

    let mut diverged = false;
    for _ in 0..300 {
        let snap_a = engine_a.advance_frame(FRAME);
        let snap_b = engine_b.advance_frame(FRAME);
        if serde_json::to_string(&snap_a).unwrap() != serde_json::to_string(&snap_b).unwrap() {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "crit rolls under different seeds should diverge");
}

// ---- Targeting ----

#[test]
fn test_low_hp_target_mode_picks_weakest() {
    let mut engine = engine();
    let mut spec = unit(0.0, 10.0, 0.0);
    spec.target_mode = TargetMode::LowHp;
    let tower = engine.spawn_tower_for_test(&spec, tile_at(0.0, 88.0));

    engine.spawn_enemy_for_test(&template("a", 40.0, 0.0), 0.0);
    let weakest = engine.spawn_enemy_for_test(&template("b", 10.0, 0.0), 0.0);
    engine.spawn_enemy_for_test(&template("c", 25.0, 0.0), 0.0);

    let snap = engine.advance_frame(FRAME);
    let view = snap.towers.iter().find(|t| t.id == tower).unwrap();
    assert_eq!(
        view.current_target,
        Some(weakest),
        "lowHP policy must select the 10-hp enemy"
    );
}

#[test]
fn test_invisible_enemies_excluded_without_reveal() {
    let mut engine = engine();
    let tower = engine.spawn_tower_for_test(&unit(0.0, 10.0, 0.0), tile_at(0.0, 88.0));

    let mut hidden = template("shade", 100.0, 0.0);
    hidden.invisible = true;
    engine.spawn_enemy_for_test(&hidden, 0.0);

    let snap = engine.advance_frame(FRAME);
    let view = snap.towers.iter().find(|t| t.id == tower).unwrap();
    assert_eq!(view.current_target, None, "invisible enemies are not valid");

    // The same enemy is a valid target for a revealing loadout.
    let mut seer = unit(0.0, 10.0, 0.0);
    seer.equipment = Some(EquipmentId::TruthLens);
    let seer_id = engine.spawn_tower_for_test(&seer, tile_at(24.0, 88.0));
    let snap = engine.advance_frame(FRAME);
    let view = snap.towers.iter().find(|t| t.id == seer_id).unwrap();
    assert!(view.current_target.is_some());
}

// ---- Damage pipeline ----

#[test]
fn test_crit_applies_after_flat_bonus() {
    let mut engine = engine();
    let mut spec = unit(100.0, 10.0, 100.0);
    spec.equipment = Some(EquipmentId::PowerGem);
    engine.spawn_tower_for_test(&spec, tile_at(0.0, 88.0));
    let victim = engine.spawn_enemy_for_test(&template("dummy", 1000.0, 0.0), 0.0);

    engine.advance_frame(FRAME);

    // Flat +15 lands before the 1.5x crit: ceil(115 * 1.5) = 173.
    assert_eq!(enemy_hp(&engine, victim), Some(1000.0 - 173.0));
}

#[test]
fn test_hp_and_armor_never_negative_and_death_fires_once() {
    let mut world = World::new();
    let mut next = 0;
    let mut armored = template("husk", 50.0, 0.0);
    armored.armor = 30.0;
    let victim = spawn_direct(&mut world, &mut next, &armored);

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut player = PlayerAccount::default();
    let mut fx = Vec::new();
    let mut ctx = CombatCtx {
        weather: Weather::Clear,
        rng: &mut rng,
        player: &mut player,
        fx: &mut fx,
    };

    for _ in 0..5 {
        let mut visited = HashSet::new();
        damage::apply_damage(
            &world,
            victim,
            10_000.0,
            DamageSource::Physical,
            None,
            None,
            false,
            &mut visited,
            &mut ctx,
        );
    }

    let health = world.get::<&Health>(victim).unwrap();
    assert_eq!(health.hp, 0.0);
    assert_eq!(health.armor, 0.0);
    drop(health);
    assert!(world.get::<&Lifecycle>(victim).unwrap().dying);

    let kills = fx
        .iter()
        .filter(|e| matches!(e, FxEvent::EnemyKilled { .. }))
        .count();
    assert_eq!(kills, 1, "the death transition must fire exactly once");
    assert_eq!(player.gold, 5, "gold is awarded once");
}

#[test]
fn test_armor_absorbs_before_hp() {
    let mut world = World::new();
    let mut next = 0;
    let mut armored = template("husk", 100.0, 0.0);
    armored.armor = 30.0;
    let victim = spawn_direct(&mut world, &mut next, &armored);

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut player = PlayerAccount::default();
    let mut fx = Vec::new();
    let mut ctx = CombatCtx {
        weather: Weather::Clear,
        rng: &mut rng,
        player: &mut player,
        fx: &mut fx,
    };

    let mut visited = HashSet::new();
    let outcome = damage::apply_damage(
        &world,
        victim,
        50.0,
        DamageSource::Physical,
        None,
        None,
        false,
        &mut visited,
        &mut ctx,
    );
    assert_eq!(outcome.absorbed, 30.0);
    assert_eq!(outcome.dealt, 20.0);

    let health = world.get::<&Health>(victim).unwrap();
    assert_eq!(health.armor, 0.0);
    assert_eq!(health.hp, 80.0);
}

#[test]
fn test_second_wind_intercepts_death_once() {
    let mut world = World::new();
    let mut next = 0;
    let mut tough = template("revenant", 100.0, 0.0);
    tough.passive = Some(PassiveKind::SecondWind);
    let victim = spawn_direct(&mut world, &mut next, &tough);

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut player = PlayerAccount::default();
    let mut fx = Vec::new();
    let mut ctx = CombatCtx {
        weather: Weather::Clear,
        rng: &mut rng,
        player: &mut player,
        fx: &mut fx,
    };

    let mut visited = HashSet::new();
    let outcome = damage::apply_damage(
        &world,
        victim,
        500.0,
        DamageSource::Physical,
        None,
        None,
        false,
        &mut visited,
        &mut ctx,
    );
    assert!(outcome.revived);
    assert!(!outcome.killed);
    {
        let health = world.get::<&Health>(victim).unwrap();
        assert_eq!(health.hp, 1.0);
        assert!(health.armor > 0.0, "the revive grants temporary armor");
        let info = world.get::<&EnemyInfo>(victim).unwrap();
        assert!(info.invulnerable);
        let mobility = world.get::<&Mobility>(victim).unwrap();
        assert!(mobility.stunned);
    }
    assert!(fx.iter().any(|e| matches!(e, FxEvent::EnemyRevived { .. })));

    // The recovery window ends: fully healed, armor shed, vulnerable.
    systems::passives::run(&mut world, 6.0, &route(), &mut rng, &mut fx);
    {
        let health = world.get::<&Health>(victim).unwrap();
        assert_eq!(health.hp, 100.0);
        assert_eq!(health.armor, 0.0);
        assert!(!world.get::<&EnemyInfo>(victim).unwrap().invulnerable);
    }

    // The second lethal hit is final.
    let mut ctx = CombatCtx {
        weather: Weather::Clear,
        rng: &mut rng,
        player: &mut player,
        fx: &mut fx,
    };
    let mut visited = HashSet::new();
    let outcome = damage::apply_damage(
        &world,
        victim,
        500.0,
        DamageSource::Physical,
        None,
        None,
        false,
        &mut visited,
        &mut ctx,
    );
    assert!(outcome.killed);
    assert!(!outcome.revived);
}

#[test]
fn test_curse_propagates_once_per_hit() {
    let mut world = World::new();
    let mut next = 0;
    let a = spawn_direct(&mut world, &mut next, &template("a", 1000.0, 0.0));
    let b = spawn_direct(&mut world, &mut next, &template("b", 1000.0, 0.0));
    let clean = spawn_direct(&mut world, &mut next, &template("c", 1000.0, 0.0));

    let mut fx = Vec::new();
    let curse = StatusApply {
        kind: StatusKind::Curse,
        duration_secs: 0.0,
        damage_percent: 0.0,
        slow_factor: 1.0,
        stacks: 1,
    };
    status::apply_to(&world, a, &curse, None, &mut fx);
    status::apply_to(&world, b, &curse, None, &mut fx);

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut player = PlayerAccount::default();
    let mut ctx = CombatCtx {
        weather: Weather::Clear,
        rng: &mut rng,
        player: &mut player,
        fx: &mut fx,
    };
    let mut visited = HashSet::new();
    damage::apply_damage(
        &world,
        a,
        50.0,
        DamageSource::Physical,
        None,
        None,
        false,
        &mut visited,
        &mut ctx,
    );

    assert_eq!(world.get::<&Health>(a).unwrap().hp, 950.0);
    assert_eq!(
        world.get::<&Health>(b).unwrap().hp,
        950.0,
        "the hit spreads once to the other cursed enemy"
    );
    assert_eq!(
        world.get::<&Health>(clean).unwrap().hp,
        1000.0,
        "uncursed enemies are untouched"
    );
}

// ---- Status effects ----

#[test]
fn test_burn_refreshes_poison_stacks() {
    let mut world = World::new();
    let mut next = 0;
    let victim = spawn_direct(&mut world, &mut next, &template("dummy", 1000.0, 0.0));
    let mut fx = Vec::new();

    let burn = StatusApply {
        kind: StatusKind::Burn,
        duration_secs: 10.0,
        damage_percent: 0.005,
        slow_factor: 1.0,
        stacks: 1,
    };
    status::apply_to(&world, victim, &burn, None, &mut fx);
    // Burn some duration down, then re-apply.
    {
        let mut ledger = world.get::<&mut StatusLedger>(victim).unwrap();
        ledger.effects[0].remaining_secs = 4.0;
    }
    status::apply_to(&world, victim, &burn, None, &mut fx);
    {
        let ledger = world.get::<&StatusLedger>(victim).unwrap();
        let burns: Vec<_> = ledger
            .effects
            .iter()
            .filter(|e| e.kind == StatusKind::Burn)
            .collect();
        assert_eq!(burns.len(), 1, "re-applying burn must not duplicate it");
        assert_eq!(burns[0].remaining_secs, 10.0, "burn refreshes its duration");
    }

    let poison = StatusApply {
        kind: StatusKind::Poison,
        duration_secs: 0.0,
        damage_percent: 0.001,
        slow_factor: 1.0,
        stacks: 1,
    };
    status::apply_to(&world, victim, &poison, None, &mut fx);
    status::apply_to(&world, victim, &poison, None, &mut fx);
    let ledger = world.get::<&StatusLedger>(victim).unwrap();
    let poisons: Vec<_> = ledger
        .effects
        .iter()
        .filter(|e| e.kind == StatusKind::Poison)
        .collect();
    assert_eq!(poisons.len(), 1);
    assert_eq!(poisons[0].stacks, 2, "poison accumulates stacks");
}

#[test]
fn test_status_respects_resistances() {
    let mut world = World::new();
    let mut next = 0;
    let mut fireproof = template("golem", 1000.0, 0.0);
    fireproof.resist.can_burn = false;
    let victim = spawn_direct(&mut world, &mut next, &fireproof);
    let mut fx = Vec::new();

    let burn = StatusApply {
        kind: StatusKind::Burn,
        duration_secs: 10.0,
        damage_percent: 0.005,
        slow_factor: 1.0,
        stacks: 1,
    };
    status::apply_to(&world, victim, &burn, None, &mut fx);
    assert!(world.get::<&StatusLedger>(victim).unwrap().effects.is_empty());
}

#[test]
fn test_burn_ticks_percent_of_max_hp_and_expires() {
    let mut world = World::new();
    let mut next = 0;
    let victim = spawn_direct(&mut world, &mut next, &template("dummy", 1000.0, 0.0));
    let mut fx = Vec::new();

    let burn = StatusApply {
        kind: StatusKind::Burn,
        duration_secs: 2.0,
        damage_percent: 0.01,
        slow_factor: 1.0,
        stacks: 1,
    };
    status::apply_to(&world, victim, &burn, None, &mut fx);

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut player = PlayerAccount::default();
    for _ in 0..3 {
        let mut ctx = CombatCtx {
            weather: Weather::Clear,
            rng: &mut rng,
            player: &mut player,
            fx: &mut fx,
        };
        status::run(&mut world, 1.0, &mut ctx);
    }

    // Two ticks of ceil(1000 * 0.01) = 10 each, then the record expires.
    assert_eq!(world.get::<&Health>(victim).unwrap().hp, 980.0);
    assert!(world.get::<&StatusLedger>(victim).unwrap().effects.is_empty());
}

#[test]
fn test_slow_and_stun_lifecycle() {
    let mut world = World::new();
    let mut next = 0;
    let victim = spawn_direct(&mut world, &mut next, &template("dummy", 1000.0, 60.0));
    let mut fx = Vec::new();

    status::apply_to(
        &world,
        victim,
        &StatusApply {
            kind: StatusKind::Slow,
            duration_secs: 1.0,
            damage_percent: 0.0,
            slow_factor: 0.5,
            stacks: 1,
        },
        None,
        &mut fx,
    );
    status::apply_to(
        &world,
        victim,
        &StatusApply {
            kind: StatusKind::Stun,
            duration_secs: 1.0,
            damage_percent: 0.0,
            slow_factor: 1.0,
            stacks: 1,
        },
        None,
        &mut fx,
    );

    {
        let mobility = world.get::<&Mobility>(victim).unwrap();
        assert_eq!(mobility.speed, 30.0, "slow takes hold immediately");
        assert!(mobility.stunned, "stun takes hold immediately");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut player = PlayerAccount::default();
    let mut ctx = CombatCtx {
        weather: Weather::Clear,
        rng: &mut rng,
        player: &mut player,
        fx: &mut fx,
    };
    status::run(&mut world, 1.2, &mut ctx);

    let mobility = world.get::<&Mobility>(victim).unwrap();
    assert_eq!(mobility.speed, 60.0, "expired slow restores base speed");
    assert!(!mobility.stunned, "expired stun releases the enemy");
}

// ---- Projectiles ----

#[test]
fn test_swept_collision_table() {
    use glam::DVec2;

    let cases = [
        // (prev, new, center, radius, expect)
        // Tunneling: both endpoints far outside, path crosses the circle.
        (DVec2::ZERO, DVec2::new(1000.0, 0.0), DVec2::new(500.0, 3.0), 8.0, true),
        // Clear miss above the path.
        (DVec2::ZERO, DVec2::new(1000.0, 0.0), DVec2::new(500.0, 20.0), 8.0, false),
        // Endpoint landing inside the circle.
        (DVec2::ZERO, DVec2::new(10.0, 0.0), DVec2::new(12.0, 0.0), 8.0, true),
        // Stationary projectile adjacent to the target.
        (DVec2::new(5.0, 5.0), DVec2::new(5.0, 5.0), DVec2::new(9.0, 5.0), 8.0, true),
        // Stationary projectile far away.
        (DVec2::new(5.0, 5.0), DVec2::new(5.0, 5.0), DVec2::new(50.0, 5.0), 8.0, false),
        // Diagonal pass within the radius.
        (DVec2::new(-100.0, -100.0), DVec2::new(100.0, 100.0), DVec2::new(3.0, -3.0), 8.0, true),
        // Segment stops just short of the circle.
        (DVec2::ZERO, DVec2::new(100.0, 0.0), DVec2::new(120.0, 0.0), 8.0, false),
    ];
    for (prev, new, center, radius, expect) in cases {
        assert_eq!(
            projectile::swept_hit(prev, new, center, radius),
            expect,
            "prev {prev:?} new {new:?} center {center:?}"
        );
    }
}

#[test]
fn test_ricochet_chains_to_nearest_enemy() {
    let mut engine = engine();
    let mut spec = unit(100.0, 10.0, 0.0);
    spec.ricochets = 1;
    engine.spawn_tower_for_test(&spec, tile_at(0.0, 88.0));

    engine.spawn_enemy_for_test(&template("first", 50.0, 0.0), 0.0);
    let second = engine.spawn_enemy_for_test(&template("second", 500.0, 0.0), -20.0);

    for _ in 0..5 {
        engine.advance_frame(FRAME);
    }

    // The kill shot ricochets at x0.7 power: 500 - ceil(70) = 430.
    assert_eq!(enemy_hp(&engine, second), Some(430.0));
}

#[test]
fn test_projectile_expires_without_fallback_target() {
    let mut engine = engine();
    engine.spawn_tower_for_test(&unit(1000.0, 10.0, 0.0), tile_at(0.0, 88.0));
    engine.spawn_enemy_for_test(&template("lone", 10.0, 0.0), 0.0);

    // Enemy dies to the first shot; any projectile in flight afterwards
    // finds no fallback and removes itself.
    for _ in 0..120 {
        engine.advance_frame(FRAME);
    }
    let snap = engine.advance_frame(FRAME);
    assert!(snap.projectiles.is_empty());
    assert!(snap.enemies.is_empty(), "corpse fades out and despawns");
}

// ---- Auras ----

#[test]
fn test_power_aura_buffs_neighbors() {
    let mut engine = engine();
    let mut aura = unit(0.0, 10.0, 0.0);
    aura.ability = AbilityId::PowerAura;
    aura.range = 100.0;
    engine.spawn_tower_for_test(&aura, tile_at(0.0, 88.0));
    let buffed = engine.spawn_tower_for_test(&unit(100.0, 10.0, 0.0), tile_at(24.0, 88.0));
    let lonely = engine.spawn_tower_for_test(&unit(100.0, 10.0, 0.0), tile_at(600.0, 500.0));

    let snap = engine.advance_frame(FRAME);
    let buffed_view = snap.towers.iter().find(|t| t.id == buffed).unwrap();
    assert!(buffed_view.power_aura);
    assert_eq!(buffed_view.power, (100.0f64 * POWER_AURA_FACTOR).ceil());

    let lonely_view = snap.towers.iter().find(|t| t.id == lonely).unwrap();
    assert!(!lonely_view.power_aura);
    assert_eq!(lonely_view.power, 100.0, "aura buffs are derived, not sticky");
}

// ---- Movement and waves ----

#[test]
fn test_leaked_enemy_damages_player() {
    let mut engine = engine();
    let mut runner = template("runner", 100.0, 1200.0);
    runner.power = 3.0;
    engine.spawn_enemy_for_test(&runner, 0.0);

    let mut leaked = false;
    for _ in 0..90 {
        let snap = engine.advance_frame(FRAME);
        if snap
            .fx_events
            .iter()
            .any(|e| matches!(e, FxEvent::EnemyLeaked { .. }))
        {
            leaked = true;
        }
    }
    assert!(leaked, "the enemy should reach the path end and leak");
    assert_eq!(engine.player().hearts, 11);
    let snap = engine.advance_frame(FRAME);
    assert!(snap.enemies.is_empty());
}

#[test]
fn test_wave_completion_awards_bonus_and_advances() {
    let mut engine = engine();
    engine.spawn_tower_for_test(&unit(1000.0, 0.5, 0.0), tile_at(0.0, 88.0));
    engine.queue_command(PlayerCommand::StartWave);

    let mut fx: Vec<FxEvent> = Vec::new();
    for _ in 0..240 {
        let snap = engine.advance_frame(FRAME);
        fx.extend(snap.fx_events);
        if !engine.wave_active() && engine.wave_number() == 2 {
            break;
        }
    }

    assert!(!engine.wave_active());
    assert_eq!(engine.wave_number(), 2);
    assert_eq!(engine.phase(), GamePhase::Idle);
    assert!(fx.iter().any(|e| matches!(e, FxEvent::WaveStarted { wave: 1 })));
    assert!(fx
        .iter()
        .any(|e| matches!(e, FxEvent::EnemyKilled { gold: 5, .. })));

    // Kill gold (5) plus the completion bonus floor((5*1*1 + 1)/2) = 3.
    assert!(fx
        .iter()
        .any(|e| matches!(e, FxEvent::WaveCompleted { wave: 1, bonus_gold: 3 })));
    assert_eq!(engine.player().gold, 8);
    assert_eq!(engine.player().record_wave, 1);

    // The banner expiry task runs on simulation time.
    let mut banner = false;
    for _ in 0..180 {
        let snap = engine.advance_frame(FRAME);
        if snap
            .fx_events
            .iter()
            .any(|e| matches!(e, FxEvent::WaveBannerExpired { wave: 1 }))
        {
            banner = true;
            break;
        }
    }
    assert!(banner, "scheduled banner expiry should fire");
}

#[test]
fn test_endless_wave_101_budget_end_to_end() {
    let mut engine = engine();
    engine.queue_command(PlayerCommand::SelectWave { wave: 101 });
    engine.queue_command(PlayerCommand::StartWave);
    let snap = engine.advance_frame(FRAME);

    assert_eq!(rampart_waves::endless::waves_past_100(101), 1);
    let budget = rampart_waves::endless::power_budget(101);
    assert_eq!(budget, (160_000.0f64 * 1.115).floor());

    assert!(!snap.enemies.is_empty());
    let total_hp: f64 = snap.enemies.iter().map(|e| e.hp).sum();
    assert!(
        total_hp <= budget && total_hp >= budget - snap.enemies.len() as f64,
        "spawned hp {total_hp} should approximate the power budget {budget}"
    );
}

#[test]
fn test_restart_clears_collections_and_mutates_nothing() {
    let mut engine = engine();
    engine.spawn_tower_for_test(&unit(10.0, 0.2, 0.0), tile_at(0.0, 88.0));
    engine.queue_command(PlayerCommand::SelectWave { wave: 101 });
    engine.queue_command(PlayerCommand::StartWave);
    for _ in 0..30 {
        engine.advance_frame(FRAME);
    }

    engine.queue_command(PlayerCommand::RestartWave);
    let snap_a = engine.advance_frame(FRAME);
    assert!(snap_a.enemies.is_empty());
    assert!(snap_a.towers.is_empty());
    assert!(snap_a.projectiles.is_empty());
    assert!(!engine.wave_active());
    assert_eq!(engine.phase(), GamePhase::Idle);

    // One sub-step with empty collections performs no damage or gold
    // mutation.
    let gold = engine.player().gold;
    let hearts = engine.player().hearts;
    let snap_b = engine.advance_frame(FRAME);
    assert_eq!(engine.player().gold, gold);
    assert_eq!(engine.player().hearts, hearts);
    assert!(snap_b.enemies.is_empty());
}

#[test]
fn test_range_shape_predicates() {
    use crate::systems::targeting::in_range;
    use glam::DVec2;

    // Circle: plain distance check.
    assert!(in_range(RangeShape::Circle, 100.0, 0.0, DVec2::new(60.0, 80.0)));
    assert!(!in_range(RangeShape::Circle, 99.0, 0.0, DVec2::new(60.0, 80.0)));

    // Donut: excludes the inner disc.
    assert!(!in_range(RangeShape::Donut, 100.0, 50.0, DVec2::new(30.0, 0.0)));
    assert!(in_range(RangeShape::Donut, 100.0, 50.0, DVec2::new(70.0, 0.0)));

    // Cross: a bar along either axis.
    assert!(in_range(RangeShape::Cross, 100.0, 0.0, DVec2::new(90.0, 10.0)));
    assert!(in_range(RangeShape::Cross, 100.0, 0.0, DVec2::new(10.0, 90.0)));
    assert!(!in_range(RangeShape::Cross, 100.0, 0.0, DVec2::new(60.0, 60.0)));

    // XShape: only near the diagonals.
    assert!(in_range(RangeShape::XShape, 100.0, 0.0, DVec2::new(50.0, 50.0)));
    assert!(in_range(RangeShape::XShape, 100.0, 0.0, DVec2::new(-50.0, 50.0)));
    assert!(!in_range(RangeShape::XShape, 100.0, 0.0, DVec2::new(90.0, 10.0)));

    // Line variants.
    assert!(in_range(RangeShape::HorizontalLine, 100.0, 0.0, DVec2::new(90.0, 10.0)));
    assert!(!in_range(RangeShape::HorizontalLine, 100.0, 0.0, DVec2::new(10.0, 90.0)));
    assert!(in_range(RangeShape::VerticalLine, 100.0, 0.0, DVec2::new(10.0, 90.0)));
    assert!(!in_range(RangeShape::VerticalLine, 100.0, 0.0, DVec2::new(90.0, 10.0)));
}

#[test]
fn test_area_tower_strikes_every_valid_target() {
    let mut engine = engine();
    let mut spec = unit(50.0, 10.0, 0.0);
    spec.attack_kind = AttackKind::Area;
    engine.spawn_tower_for_test(&spec, tile_at(0.0, 88.0));

    let a = engine.spawn_enemy_for_test(&template("a", 1000.0, 0.0), 0.0);
    let b = engine.spawn_enemy_for_test(&template("b", 1000.0, 0.0), -30.0);

    let snap = engine.advance_frame(FRAME);
    assert!(snap
        .fx_events
        .iter()
        .any(|e| matches!(e, FxEvent::AreaPulse { .. })));
    assert!(snap.projectiles.is_empty(), "area attacks spawn no projectiles");
    assert_eq!(enemy_hp(&engine, a), Some(950.0));
    assert_eq!(enemy_hp(&engine, b), Some(950.0));
}

#[test]
fn test_double_shot_hits_two_unique_targets() {
    let mut engine = engine();
    let mut spec = unit(50.0, 10.0, 0.0);
    spec.ability = AbilityId::DoubleShot;
    engine.spawn_tower_for_test(&spec, tile_at(0.0, 88.0));

    let a = engine.spawn_enemy_for_test(&template("a", 1000.0, 0.0), 0.0);
    let b = engine.spawn_enemy_for_test(&template("b", 1000.0, 0.0), -30.0);

    engine.advance_frame(FRAME);
    assert_eq!(enemy_hp(&engine, a), Some(950.0));
    assert_eq!(enemy_hp(&engine, b), Some(950.0), "the second shot picks a unique target");
}

#[test]
fn test_nightmare_ticks_scale_with_caster_power() {
    let mut engine = engine();
    let tower = engine.spawn_tower_for_test(&unit(100.0, 10.0, 0.0), tile_at(0.0, 88.0));
    let victim = engine.spawn_enemy_for_test(&template("dreamer", 1000.0, 0.0), 0.0);

    // Let one frame derive tower stats, then afflict the enemy.
    engine.advance_frame(FRAME);
    let entity = {
        let mut query = engine.world().query::<(&EnemyInfo, &Enemy)>();
        query
            .iter()
            .find(|(_, (info, _))| info.id == victim)
            .map(|(e, _)| e)
            .unwrap()
    };
    {
        let mut ledger = engine.world().get::<&mut StatusLedger>(entity).unwrap();
        ledger.effects.push(StatusEffectRecord {
            kind: StatusKind::Nightmare,
            remaining_secs: 0.0,
            stacks: 2,
            damage_percent: 0.0,
            slow_factor: 1.0,
            source: Some(tower),
        });
    }

    let hp_before = enemy_hp(&engine, victim).unwrap();
    // Two simulated seconds of ticks at 10x speed.
    engine.queue_command(PlayerCommand::SetSpeedMultiplier { factor: 10.0 });
    for _ in 0..12 {
        engine.advance_frame(FRAME);
    }
    let hp_after = enemy_hp(&engine, victim).unwrap();

    // Each tick: ceil(100 * 0.2 * 2) = 40. The tower also keeps shooting,
    // so assert the nightmare floor, not an exact figure.
    assert!(
        hp_before - hp_after >= 80.0,
        "two nightmare ticks at 2 stacks should deal at least 80: {hp_before} -> {hp_after}"
    );
}

#[test]
fn test_time_rewind_walks_back_along_path() {
    let mut world = World::new();
    let mut next = 0;
    let mut jumper = template("chrono", 10_000.0, 60.0);
    jumper.passive = Some(PassiveKind::TimeRewind);
    let entity = spawn_direct(&mut world, &mut next, &jumper);

    // Place the enemy mid-path with damage taken and travel recorded.
    {
        let mut pos = world.get::<&mut Position>(entity).unwrap();
        *pos = Position::new(310.0, 100.0);
        let mut path = world.get::<&mut PathFollower>(entity).unwrap();
        path.waypoint_index = 1;
        path.distance_traveled = 300.0;
        path.entered_field = true;
        let mut health = world.get::<&mut Health>(entity).unwrap();
        health.hp = 1_000.0;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut fx = Vec::new();
    systems::passives::run(&mut world, 8.0, &route(), &mut rng, &mut fx);

    let pos = *world.get::<&Position>(entity).unwrap();
    assert!(
        pos.x() >= 110.0 && pos.x() <= 160.0,
        "the jump covers 150-200px backward: {}",
        pos.x()
    );
    let path = world.get::<&PathFollower>(entity).unwrap();
    let walked = 310.0 - pos.x();
    assert!(
        (path.distance_traveled - (300.0 - walked)).abs() < 1e-6,
        "distance-traveled accounting follows the walk"
    );
    drop(path);

    let health = world.get::<&Health>(entity).unwrap();
    assert_eq!(health.hp, 8_000.0, "the jump refunds hp");
    drop(health);

    let mobility = world.get::<&Mobility>(entity).unwrap();
    assert_eq!(mobility.speed, 120.0, "a short speed surge follows the jump");
    drop(mobility);
    assert!(fx.iter().any(|e| matches!(e, FxEvent::EnemyRewound { .. })));
}

#[test]
fn test_deploy_validation() {
    let mut engine = engine();
    engine.queue_command(PlayerCommand::DeployUnit {
        spec: unit(100.0, 1.0, 0.0),
        tile_index: 0,
    });
    let snap = engine.advance_frame(FRAME);
    assert_eq!(snap.towers.len(), 1);

    // Occupied tile and missing tile are both rejected.
    engine.queue_command(PlayerCommand::DeployUnit {
        spec: unit(100.0, 1.0, 0.0),
        tile_index: 0,
    });
    engine.queue_command(PlayerCommand::DeployUnit {
        spec: unit(100.0, 1.0, 0.0),
        tile_index: 99,
    });
    let snap = engine.advance_frame(FRAME);
    assert_eq!(snap.towers.len(), 1);

    // Retiring removes the tower again.
    let tower = snap.towers[0].id;
    engine.queue_command(PlayerCommand::RetireUnit { tower });
    let snap = engine.advance_frame(FRAME);
    assert!(snap.towers.is_empty());
}
