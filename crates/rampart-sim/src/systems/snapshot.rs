//! Snapshot builder — the render-facing side effect, produced once per
//! frame after the final sub-step.

use hecs::World;

use rampart_core::components::*;
use rampart_core::enums::GamePhase;
use rampart_core::events::FxEvent;
use rampart_core::player::PlayerAccount;
use rampart_core::state::*;
use rampart_core::types::{Position, SimTime};

#[allow(clippy::too_many_arguments)]
pub fn build(
    world: &World,
    time: SimTime,
    phase: GamePhase,
    speed_multiplier: f64,
    wave: WaveView,
    player: &PlayerAccount,
    fx_events: Vec<FxEvent>,
) -> GameStateSnapshot {
    let mut enemies: Vec<EnemyView> = world
        .query::<(
            &Enemy,
            &EnemyInfo,
            &Health,
            &Mobility,
            &PathFollower,
            &Lifecycle,
            &StatusLedger,
            &Position,
        )>()
        .iter()
        .map(
            |(_, (_, info, health, mobility, path, life, ledger, pos))| EnemyView {
                id: info.id,
                template: info.template.clone(),
                position: *pos,
                hp: health.hp,
                hp_max: health.hp_max,
                armor: health.armor,
                armor_max: health.armor_max,
                speed: mobility.speed,
                invisible: info.invisible,
                dying: life.dying,
                fade: life.fade,
                distance_traveled: path.distance_traveled,
                statuses: ledger.effects.iter().map(|e| (e.kind, e.stacks)).collect(),
            },
        )
        .collect();
    enemies.sort_by_key(|e| e.id);

    let mut towers: Vec<TowerView> = world
        .query::<(&Tower, &TowerState, &DerivedStats, &Position)>()
        .iter()
        .map(|(_, (_, state, derived, pos))| TowerView {
            id: state.id,
            unit: state.unit,
            tile_index: state.tile_index,
            position: *pos,
            power: derived.power,
            interval_secs: derived.interval_secs,
            range: derived.range,
            inner_range: derived.inner_range,
            range_shape: state.range_shape,
            crit_chance: derived.crit_chance,
            target_mode: state.target_mode,
            current_target: state.current_target,
            power_aura: derived.power_aura,
            critical_aura: derived.critical_aura,
            critical_damage_aura: derived.critical_damage_aura,
            triage_aura: derived.triage_aura,
        })
        .collect();
    towers.sort_by_key(|t| t.id);

    let mut projectiles: Vec<ProjectileView> = world
        .query::<(&Projectile, &ProjectileState, &Position)>()
        .iter()
        .map(|(_, (_, state, pos))| ProjectileView {
            position: *pos,
            tower: state.tower,
            target: state.target,
            power: state.power,
        })
        .collect();
    projectiles.sort_by_key(|p| (p.tower, p.target));

    GameStateSnapshot {
        time,
        phase,
        speed_multiplier,
        wave,
        player: player.clone(),
        enemies,
        towers,
        projectiles,
        fx_events,
    }
}
