//! Simulation engine — the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes player commands,
//! runs the fixed-order systems over a variable number of equal sub-steps
//! per frame, and produces a `GameStateSnapshot` once per frame.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rampart_core::commands::PlayerCommand;
use rampart_core::components::{Enemy, Projectile, ProjectileState, Tower, TowerState};
use rampart_core::constants::*;
use rampart_core::content::{RouteData, UnitSpec};
use rampart_core::enums::{GamePhase, Weather};
use rampart_core::events::FxEvent;
use rampart_core::player::PlayerAccount;
use rampart_core::state::{GameStateSnapshot, WaveView};
use rampart_core::types::{SimTime, TowerId};

use crate::systems::{self, CombatCtx};
use crate::world_setup;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Route content the external provider supplies.
    pub route: RouteData,
    /// Wave the attempt begins at (1-based).
    pub starting_wave: u32,
}

/// A deferred side effect consumed by the scheduler's own clock, so it
/// pauses and speed-scales with the simulation.
#[derive(Debug, Clone)]
struct ScheduledTask {
    fire_at_secs: f64,
    event: FxEvent,
}

/// Split one real frame into equal sub-steps: the scaled delta is divided
/// into `n` slices no larger than a nominal 1x frame, with `n` capped to
/// bound worst-case cost. `n * dt` always equals the scaled delta.
pub fn sub_step_plan(frame_delta_secs: f64, speed_multiplier: f64) -> (u32, f64) {
    let total = frame_delta_secs.max(0.0) * speed_multiplier;
    if total <= 0.0 {
        return (1, 0.0);
    }
    let count = ((total / NOMINAL_FRAME_SECS).ceil() as u32).clamp(1, MAX_SUB_STEPS);
    (count, total / count as f64)
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    speed_multiplier: f64,
    rng: ChaCha8Rng,
    route: RouteData,
    weather: Weather,

    wave_number: u32,
    wave_active: bool,
    auto_wave: bool,
    player: PlayerAccount,

    next_enemy_id: u32,
    next_tower_id: u32,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    fx_events: Vec<FxEvent>,
    scheduled: Vec<ScheduledTask>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::Idle,
            speed_multiplier: 1.0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            route: config.route,
            weather: Weather::Clear,
            wave_number: config.starting_wave.max(1),
            wave_active: false,
            auto_wave: false,
            player: PlayerAccount::default(),
            next_enemy_id: 0,
            next_tower_id: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            fx_events: Vec::new(),
            scheduled: Vec::new(),
        }
    }

    /// Queue a player command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one real frame and return the snapshot.
    ///
    /// Gameplay mutation happens on every sub-step; the snapshot is built
    /// once, after the final sub-step. While paused (or defeated) the
    /// scheduler still runs one zero-delta sub-step so targeting and
    /// derived state stay fresh for the UI.
    pub fn advance_frame(&mut self, frame_delta_secs: f64) -> GameStateSnapshot {
        self.process_commands();

        let (count, dt) = if matches!(self.phase, GamePhase::Paused | GamePhase::Defeat) {
            (1, 0.0)
        } else {
            sub_step_plan(frame_delta_secs, self.speed_multiplier)
        };

        for _ in 0..count {
            self.step(dt);
        }
        self.time.complete_frame();
        self.fire_due_tasks();

        let fx = std::mem::take(&mut self.fx_events);
        systems::snapshot::build(
            &self.world,
            self.time,
            self.phase,
            self.speed_multiplier,
            WaveView {
                number: self.wave_number,
                active: self.wave_active,
                auto_wave: self.auto_wave,
                weather: self.weather,
            },
            &self.player,
            fx,
        )
    }

    /// Run all systems for one sub-step. Within a sub-step, enemies move
    /// before towers act, towers act before their projectiles, and the
    /// wave-completion check comes after all entity updates.
    fn step(&mut self, dt: f64) {
        // A mid-frame defeat freezes the remaining sub-steps.
        let dt = if self.phase == GamePhase::Defeat { 0.0 } else { dt };
        systems::movement::run(
            &mut self.world,
            dt,
            &self.route,
            &mut self.player,
            &mut self.fx_events,
            &mut self.despawn_buffer,
        );
        systems::passives::run(
            &mut self.world,
            dt,
            &self.route,
            &mut self.rng,
            &mut self.fx_events,
        );
        systems::auras::run(&mut self.world, self.weather, self.player.hearts);
        {
            let mut ctx = CombatCtx {
                weather: self.weather,
                rng: &mut self.rng,
                player: &mut self.player,
                fx: &mut self.fx_events,
            };
            systems::attack::run(&mut self.world, dt, &mut ctx);
            systems::projectile::run(&mut self.world, dt, &mut ctx, &mut self.despawn_buffer);
            systems::status::run(&mut self.world, dt, &mut ctx);
        }
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);

        if dt > 0.0 {
            self.time.advance(dt);
        }

        if self.player.hearts == 0 && self.phase == GamePhase::Running {
            self.phase = GamePhase::Defeat;
            return;
        }

        if self.wave_active && self.phase == GamePhase::Running && self.enemy_count() == 0 {
            self.end_wave();
        }
    }

    // --- Accessors ---

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn wave_active(&self) -> bool {
        self.wave_active
    }

    pub fn player(&self) -> &PlayerAccount {
        &self.player
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The external weather collaborator pushes changes through here.
    pub fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    fn enemy_count(&self) -> usize {
        let mut query = self.world.query::<&Enemy>();
        query.iter().count()
    }

    // --- Commands ---

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartWave => {
                if !self.wave_active && self.phase == GamePhase::Idle {
                    self.start_wave();
                }
            }
            PlayerCommand::SelectWave { wave } => {
                if !self.wave_active && wave >= 1 {
                    self.wave_number = wave;
                }
            }
            PlayerCommand::RestartWave => {
                world_setup::clear_combat_state(&mut self.world);
                self.despawn_buffer.clear();
                self.scheduled.clear();
                self.wave_active = false;
                self.player.hearts = self.player.hearts_max;
                self.phase = GamePhase::Idle;
            }
            PlayerCommand::ToggleAutoWave => {
                self.auto_wave = !self.auto_wave;
                if self.auto_wave && !self.wave_active && self.phase == GamePhase::Idle {
                    self.start_wave();
                }
            }
            PlayerCommand::DeployUnit { spec, tile_index } => {
                self.deploy_unit(spec, tile_index);
            }
            PlayerCommand::RetireUnit { tower } => {
                self.retire_unit(tower);
            }
            PlayerCommand::SetTargetMode { tower, mode } => {
                for (_entity, (_t, state)) in self.world.query_mut::<(&Tower, &mut TowerState)>() {
                    if state.id == tower {
                        state.target_mode = mode;
                        state.current_target = None;
                    }
                }
            }
            PlayerCommand::SetSpeedMultiplier { factor } => {
                if SPEED_MULTIPLIERS.iter().any(|&m| (m - factor).abs() < 1e-9) {
                    self.speed_multiplier = factor;
                } else {
                    log::warn!("rejected speed multiplier {factor}");
                }
            }
            PlayerCommand::Pause => {
                if matches!(self.phase, GamePhase::Idle | GamePhase::Running) {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = if self.wave_active {
                        GamePhase::Running
                    } else {
                        GamePhase::Idle
                    };
                }
            }
        }
    }

    fn deploy_unit(&mut self, spec: UnitSpec, tile_index: usize) {
        let Some(tile) = self.route.tiles.get(tile_index).copied() else {
            log::warn!("deploy rejected: tile {tile_index} does not exist");
            return;
        };
        if !spec.allowed_terrain.contains(&tile.terrain) {
            log::warn!("deploy rejected: unit {:?} cannot stand on {:?}", spec.unit, tile.terrain);
            return;
        }
        let occupied = {
            let mut query = self.world.query::<(&Tower, &TowerState)>();
            query.iter().any(|(_, (_, state))| state.tile_index == tile_index)
        };
        if occupied {
            log::warn!("deploy rejected: tile {tile_index} is occupied");
            return;
        }
        world_setup::spawn_tower(
            &mut self.world,
            &mut self.next_tower_id,
            &spec,
            tile_index,
            &tile,
        );
    }

    fn retire_unit(&mut self, tower: TowerId) {
        let Some(entity) = crate::systems::damage::find_tower(&self.world, tower) else {
            log::warn!("retire rejected: tower {tower:?} not found");
            return;
        };
        // A retired tower takes its in-flight projectiles with it.
        let orphans: Vec<Entity> = {
            let mut query = self.world.query::<(&Projectile, &ProjectileState)>();
            query
                .iter()
                .filter(|(_, (_, p))| p.tower == tower)
                .map(|(e, _)| e)
                .collect()
        };
        for orphan in orphans {
            let _ = self.world.despawn(orphan);
        }
        let _ = self.world.despawn(entity);
    }

    // --- Wave flow ---

    fn start_wave(&mut self) {
        let descriptor = rampart_waves::generate(&self.route, self.wave_number);
        if descriptor.entries.is_empty() {
            log::warn!("wave {} generated no enemies", self.wave_number);
            return;
        }
        for entry in &descriptor.entries {
            world_setup::spawn_enemy(&mut self.world, &mut self.next_enemy_id, entry, &self.route);
        }
        // Per-wave tower state starts clean.
        for (_entity, (_t, state)) in self.world.query_mut::<(&Tower, &mut TowerState)>() {
            state.kill_stacks = 0;
            state.focus_bonus = 0.0;
            state.last_hit = None;
        }
        self.wave_active = true;
        self.phase = GamePhase::Running;
        self.fx_events.push(FxEvent::WaveStarted {
            wave: self.wave_number,
        });
    }

    fn end_wave(&mut self) {
        let wave = self.wave_number;
        self.wave_active = false;

        let route_factor = (self.route.route_number + 1) as f64;
        let bonus_gold =
            ((5.0 * route_factor * wave as f64 + (wave as f64).powf(1.4)) / 2.0).floor() as u64;
        self.player.change_gold(bonus_gold as i64);
        self.player.record_wave_reached(wave);

        self.fx_events.push(FxEvent::WaveCompleted { wave, bonus_gold });
        self.scheduled.push(ScheduledTask {
            fire_at_secs: self.time.elapsed_secs + WAVE_BANNER_SECS,
            event: FxEvent::WaveBannerExpired { wave },
        });

        self.wave_number += 1;
        for (_entity, (_t, state)) in self.world.query_mut::<(&Tower, &mut TowerState)>() {
            state.kill_stacks = 0;
            state.focus_bonus = 0.0;
            state.last_hit = None;
            state.current_target = None;
        }

        if self.auto_wave {
            self.start_wave();
        } else {
            self.phase = GamePhase::Idle;
        }
    }

    /// Fire scheduled tasks whose time has come. They run on simulation
    /// time, so pausing and speed scaling affect them consistently.
    fn fire_due_tasks(&mut self) {
        let now = self.time.elapsed_secs;
        let mut due: Vec<FxEvent> = Vec::new();
        self.scheduled.retain(|task| {
            if task.fire_at_secs <= now {
                due.push(task.event.clone());
                false
            } else {
                true
            }
        });
        self.fx_events.extend(due);
    }

    // --- Test support ---

    /// Deploy a tower directly, bypassing tile validation.
    #[cfg(test)]
    pub fn spawn_tower_for_test(
        &mut self,
        spec: &UnitSpec,
        tile: rampart_core::content::Tile,
    ) -> TowerId {
        let id = TowerId(self.next_tower_id);
        world_setup::spawn_tower(&mut self.world, &mut self.next_tower_id, spec, usize::MAX, &tile);
        id
    }

    /// Spawn a single enemy on path 0 without going through a wave.
    #[cfg(test)]
    pub fn spawn_enemy_for_test(
        &mut self,
        template: &rampart_core::content::EnemyTemplate,
        lead_distance: f64,
    ) -> rampart_core::types::EnemyId {
        let id = rampart_core::types::EnemyId(self.next_enemy_id);
        let entry = rampart_waves::SpawnEntry {
            template: template.clone(),
            lead_distance,
            path_index: 0,
        };
        world_setup::spawn_enemy(&mut self.world, &mut self.next_enemy_id, &entry, &self.route);
        id
    }
}
