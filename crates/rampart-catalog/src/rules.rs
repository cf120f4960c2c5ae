//! The equipment/ability modifier-rule table and its application helpers.
//!
//! Rules are applied in a fixed phase order:
//!   Interval -> Range -> Fire (at derive time)
//!   Power (launch) -> Power (impact) -> Crit (at hit time)
//!   OnHit (after damage lands)
//!
//! Within the power phase, flat bonuses apply before multiplicative
//! scalers, scalers before conditional terrain/weather scalers, and
//! stack ramps last; the critical roll always comes after all of them.

use rampart_core::constants::*;
use rampart_core::enums::*;

/// Which computation consumes a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Attack-interval derivation.
    Interval,
    /// Range derivation.
    Range,
    /// Shot count / ricochet / splash / reveal configuration at fire time.
    Fire,
    /// Damage computation, launch- and impact-time.
    Power,
    /// Critical chance and multiplier.
    Crit,
    /// Secondary effects applied after a hit lands.
    OnHit,
}

/// A status application granted by an on-hit rule.
#[derive(Debug, Clone, Copy)]
pub struct StatusApply {
    pub kind: StatusKind,
    pub duration_secs: f64,
    pub damage_percent: f64,
    pub slow_factor: f64,
    pub stacks: u32,
}

/// One independently testable modifier effect.
#[derive(Debug, Clone, Copy)]
pub enum Effect {
    // --- Power phase, launch time ---
    PowerFlat(f64),
    PowerScale(f64),
    PowerScaleOnTerrain(Terrain, f64),
    PowerScaleInWeatherOnTerrain(Weather, Terrain, f64),
    /// Multiplier grows with kill stacks: x(1 + per_stack * stacks).
    PowerPerKillStack(f64),

    // --- Power phase, impact time (needs the victim) ---
    /// x(1 + focus_bonus); the ramp itself is tracked on the tower.
    FocusRamp(f64),
    /// x2 on the first hit against a new target.
    DoubleOnNewTarget,
    /// Distance-gated multiplier.
    DistanceScale {
        threshold: f64,
        beyond: f64,
        within: f64,
    },
    /// Multiplier against armored targets.
    ArmorBreak(f64),

    // --- Interval phase ---
    IntervalScale(f64),
    IntervalScaleInWeatherOnTerrain(Weather, Terrain, f64),

    // --- Range phase ---
    RangeFlat(f64),
    RangeScale(f64),
    RangeScaleOnTerrain(Terrain, f64),

    // --- Crit phase ---
    CritFlat(f64),
    CritDamageScale(f64),
    /// Replaces the default 1.5x critical multiplier.
    CritMultiplier(f64),

    // --- Fire configuration ---
    ExtraShots(u32),
    ExtraRicochets(u32),
    Splash,
    SplashRadiusScale(f64),
    RevealInvisible,

    // --- On hit ---
    OnHitStatus { apply: StatusApply, chance: f64 },
    /// Steal this fraction of the victim's gold value per hit.
    GoldSteal(f64),
}

/// A rule entry: the phase that consumes it plus the effect.
#[derive(Debug, Clone, Copy)]
pub struct ModifierRule {
    pub phase: Phase,
    pub effect: Effect,
}

/// Board context a rule may condition on.
#[derive(Debug, Clone, Copy)]
pub struct ModifierCtx {
    pub terrain: Terrain,
    pub weather: Weather,
    pub player_hearts: u32,
    pub kill_stacks: u32,
    pub focus_bonus: f64,
    pub new_target: bool,
    pub distance: f64,
    pub target_armored: bool,
    pub critical_aura: bool,
    pub critical_damage_aura: bool,
}

impl Default for ModifierCtx {
    fn default() -> Self {
        Self {
            terrain: Terrain::Neutral,
            weather: Weather::Clear,
            player_hearts: 14,
            kill_stacks: 0,
            focus_bonus: 0.0,
            new_target: false,
            distance: 0.0,
            target_armored: false,
            critical_aura: false,
            critical_damage_aura: false,
        }
    }
}

const fn rule(phase: Phase, effect: Effect) -> ModifierRule {
    ModifierRule { phase, effect }
}

const fn on_hit(apply: StatusApply, chance: f64) -> ModifierRule {
    ModifierRule {
        phase: Phase::OnHit,
        effect: Effect::OnHitStatus { apply, chance },
    }
}

const BURN_APPLY: StatusApply = StatusApply {
    kind: StatusKind::Burn,
    duration_secs: 10.0,
    damage_percent: 0.005,
    slow_factor: 1.0,
    stacks: 1,
};

const POISON_APPLY: StatusApply = StatusApply {
    kind: StatusKind::Poison,
    duration_secs: 0.0,
    damage_percent: 0.001,
    slow_factor: 1.0,
    stacks: 1,
};

const SLOW_APPLY: StatusApply = StatusApply {
    kind: StatusKind::Slow,
    duration_secs: 2.0,
    damage_percent: 0.0,
    slow_factor: 0.5,
    stacks: 1,
};

const STUN_APPLY: StatusApply = StatusApply {
    kind: StatusKind::Stun,
    duration_secs: 1.5,
    damage_percent: 0.0,
    slow_factor: 1.0,
    stacks: 1,
};

const CURSE_APPLY: StatusApply = StatusApply {
    kind: StatusKind::Curse,
    duration_secs: 0.0,
    damage_percent: 0.0,
    slow_factor: 1.0,
    stacks: 1,
};

const NIGHTMARE_APPLY: StatusApply = StatusApply {
    kind: StatusKind::Nightmare,
    duration_secs: 0.0,
    damage_percent: 0.0,
    slow_factor: 1.0,
    stacks: 1,
};

const BRIEF_SLOW_APPLY: StatusApply = StatusApply {
    kind: StatusKind::Slow,
    duration_secs: 1.0,
    damage_percent: 0.0,
    slow_factor: 0.5,
    stacks: 1,
};

/// Rules that apply to every tower regardless of loadout.
pub const GLOBAL_RULES: &[ModifierRule] = &[rule(
    Phase::Power,
    Effect::PowerScaleInWeatherOnTerrain(Weather::Rain, Terrain::Water, RAIN_WATER_DAMAGE_FACTOR),
)];

const NO_RULES: &[ModifierRule] = &[];
const DOUBLE_SHOT: &[ModifierRule] = &[rule(Phase::Fire, Effect::ExtraShots(1))];
const TRIPLE_SHOT: &[ModifierRule] = &[rule(Phase::Fire, Effect::ExtraShots(2))];
const QUADRA_SHOT: &[ModifierRule] = &[rule(Phase::Fire, Effect::ExtraShots(3))];
const SUPER_CRITICAL: &[ModifierRule] = &[rule(
    Phase::Crit,
    Effect::CritMultiplier(SUPER_CRIT_MULTIPLIER),
)];
const SPLASH: &[ModifierRule] = &[rule(Phase::Fire, Effect::Splash)];
const BURN_TOUCH: &[ModifierRule] = &[on_hit(BURN_APPLY, 1.0)];
const POISON_TOUCH: &[ModifierRule] = &[on_hit(POISON_APPLY, 1.0)];
const SLOW_TOUCH: &[ModifierRule] = &[on_hit(SLOW_APPLY, 1.0)];
const STUN_TOUCH: &[ModifierRule] = &[on_hit(STUN_APPLY, 0.3)];
const CURSE_TOUCH: &[ModifierRule] = &[on_hit(CURSE_APPLY, 1.0)];
const NIGHTMARE_TOUCH: &[ModifierRule] = &[on_hit(NIGHTMARE_APPLY, 1.0)];
const FOCUS: &[ModifierRule] = &[rule(Phase::Power, Effect::FocusRamp(0.075))];
const FIRST_IMPRESSION: &[ModifierRule] = &[rule(Phase::Power, Effect::DoubleOnNewTarget)];
const SNIPER: &[ModifierRule] = &[rule(
    Phase::Power,
    Effect::DistanceScale {
        threshold: 150.0,
        beyond: 1.25,
        within: 0.8,
    },
)];
const MOXIE: &[ModifierRule] = &[rule(Phase::Power, Effect::PowerPerKillStack(0.03))];
const GREED: &[ModifierRule] = &[rule(Phase::OnHit, Effect::GoldSteal(GREED_FRACTION))];
const ARMOR_BREAK: &[ModifierRule] = &[rule(Phase::Power, Effect::ArmorBreak(2.0))];

/// Rules granted by a tower ability. Aura abilities carry no rules; the
/// aura scan grants their buffs to neighbors instead.
pub fn ability_rules(id: AbilityId) -> &'static [ModifierRule] {
    match id {
        AbilityId::Standard
        | AbilityId::PowerAura
        | AbilityId::CriticalAura
        | AbilityId::CriticalDamageAura
        | AbilityId::TriageAura => NO_RULES,
        AbilityId::DoubleShot => DOUBLE_SHOT,
        AbilityId::TripleShot => TRIPLE_SHOT,
        AbilityId::QuadraShot => QUADRA_SHOT,
        AbilityId::SuperCritical => SUPER_CRITICAL,
        AbilityId::Splash => SPLASH,
        AbilityId::BurnTouch => BURN_TOUCH,
        AbilityId::PoisonTouch => POISON_TOUCH,
        AbilityId::SlowTouch => SLOW_TOUCH,
        AbilityId::StunTouch => STUN_TOUCH,
        AbilityId::CurseTouch => CURSE_TOUCH,
        AbilityId::NightmareTouch => NIGHTMARE_TOUCH,
        AbilityId::Focus => FOCUS,
        AbilityId::FirstImpression => FIRST_IMPRESSION,
        AbilityId::Sniper => SNIPER,
        AbilityId::Moxie => MOXIE,
        AbilityId::Greed => GREED,
        AbilityId::ArmorBreak => ARMOR_BREAK,
    }
}

const POWER_GEM: &[ModifierRule] = &[rule(Phase::Power, Effect::PowerFlat(15.0))];
const WAR_HORN: &[ModifierRule] = &[rule(Phase::Power, Effect::PowerFlat(50.0))];
const VERDANT_SIGIL: &[ModifierRule] = &[rule(
    Phase::Power,
    Effect::PowerScaleOnTerrain(Terrain::Grass, 1.5),
)];
const GRANITE_BAND: &[ModifierRule] = &[rule(Phase::Power, Effect::PowerScale(1.25))];
const SWIFT_FEATHER: &[ModifierRule] = &[rule(Phase::Interval, Effect::IntervalScale(0.75))];
const QUICKENED_COIL: &[ModifierRule] = &[
    rule(Phase::Interval, Effect::IntervalScale(0.5)),
    rule(Phase::Power, Effect::PowerScale(0.5)),
];
const LEAD_PLATING: &[ModifierRule] = &[
    rule(Phase::Interval, Effect::IntervalScale(1.25)),
    rule(Phase::Power, Effect::PowerScale(1.5)),
];
const EAGLE_EYE: &[ModifierRule] = &[rule(Phase::Range, Effect::RangeFlat(75.0))];
const FARSIGHT_LENS: &[ModifierRule] = &[rule(Phase::Range, Effect::RangeScale(1.25))];
const LUCKY_CLOVER: &[ModifierRule] = &[rule(Phase::Crit, Effect::CritDamageScale(1.3))];
const SCOPE_LENS: &[ModifierRule] = &[rule(Phase::Crit, Effect::CritFlat(10.0))];
const SIEGE_ROUNDS: &[ModifierRule] = &[
    rule(Phase::Power, Effect::ArmorBreak(2.0)),
    rule(Phase::Interval, Effect::IntervalScale(1.2)),
];
const EMBER_VIAL: &[ModifierRule] = &[on_hit(BURN_APPLY, 0.1)];
const VENOM_BARB: &[ModifierRule] = &[
    rule(Phase::Interval, Effect::IntervalScale(0.8)),
    on_hit(POISON_APPLY, 0.5),
];
const FROST_CHARM: &[ModifierRule] = &[on_hit(BRIEF_SLOW_APPLY, 0.25)];
const SPRING_COIL: &[ModifierRule] = &[rule(Phase::Fire, Effect::ExtraRicochets(1))];
const TRUTH_LENS: &[ModifierRule] = &[
    rule(Phase::Fire, Effect::RevealInvisible),
    rule(Phase::Range, Effect::RangeFlat(15.0)),
];
const DRAGON_FANG: &[ModifierRule] = &[rule(Phase::Fire, Effect::SplashRadiusScale(2.0))];
const ZOOM_LENS: &[ModifierRule] = &[
    rule(Phase::Fire, Effect::ExtraShots(1)),
    rule(Phase::Power, Effect::PowerScale(0.5)),
];

/// Rules granted by an equipped item.
pub fn equipment_rules(id: EquipmentId) -> &'static [ModifierRule] {
    match id {
        EquipmentId::PowerGem => POWER_GEM,
        EquipmentId::WarHorn => WAR_HORN,
        EquipmentId::VerdantSigil => VERDANT_SIGIL,
        EquipmentId::GraniteBand => GRANITE_BAND,
        EquipmentId::SwiftFeather => SWIFT_FEATHER,
        EquipmentId::QuickenedCoil => QUICKENED_COIL,
        EquipmentId::LeadPlating => LEAD_PLATING,
        EquipmentId::EagleEye => EAGLE_EYE,
        EquipmentId::FarsightLens => FARSIGHT_LENS,
        EquipmentId::LuckyClover => LUCKY_CLOVER,
        EquipmentId::ScopeLens => SCOPE_LENS,
        EquipmentId::SiegeRounds => SIEGE_ROUNDS,
        EquipmentId::EmberVial => EMBER_VIAL,
        EquipmentId::VenomBarb => VENOM_BARB,
        EquipmentId::FrostCharm => FROST_CHARM,
        EquipmentId::SpringCoil => SPRING_COIL,
        EquipmentId::TruthLens => TRUTH_LENS,
        EquipmentId::DragonFang => DRAGON_FANG,
        EquipmentId::ZoomLens => ZOOM_LENS,
    }
}

/// Iterate a tower loadout's full rule set in catalog order:
/// ability rules, then equipment rules, then globals.
pub fn loadout_rules(
    ability: AbilityId,
    equipment: Option<EquipmentId>,
) -> impl Iterator<Item = &'static ModifierRule> + Clone {
    ability_rules(ability)
        .iter()
        .chain(equipment.map(equipment_rules).unwrap_or(NO_RULES).iter())
        .chain(GLOBAL_RULES.iter())
}

/// Launch-time power: flats, then scalers, then conditional scalers, then
/// the kill-stack ramp. Impact-time rules are deliberately skipped here.
pub fn launch_power(
    base: f64,
    rules: impl Iterator<Item = &'static ModifierRule> + Clone,
    ctx: &ModifierCtx,
) -> f64 {
    let power_rules = rules.filter(|r| r.phase == Phase::Power);

    let mut power = base;
    for r in power_rules.clone() {
        if let Effect::PowerFlat(amount) = r.effect {
            power += amount;
        }
    }
    for r in power_rules.clone() {
        if let Effect::PowerScale(factor) = r.effect {
            power *= factor;
        }
    }
    for r in power_rules.clone() {
        match r.effect {
            Effect::PowerScaleOnTerrain(terrain, factor) if ctx.terrain == terrain => {
                power *= factor;
            }
            Effect::PowerScaleInWeatherOnTerrain(weather, terrain, factor)
                if ctx.weather == weather && ctx.terrain == terrain =>
            {
                power *= factor;
            }
            _ => {}
        }
    }
    for r in power_rules {
        if let Effect::PowerPerKillStack(per_stack) = r.effect {
            power *= 1.0 + per_stack * ctx.kill_stacks as f64;
        }
    }
    power
}

/// Impact-time power: rules that need the actual victim (distance, armor,
/// first-hit state). Applied exactly once, when the hit lands.
pub fn impact_power(
    launch: f64,
    rules: impl Iterator<Item = &'static ModifierRule>,
    ctx: &ModifierCtx,
) -> f64 {
    let mut power = launch;
    for r in rules.filter(|r| r.phase == Phase::Power) {
        match r.effect {
            Effect::FocusRamp(_) => power *= 1.0 + ctx.focus_bonus,
            Effect::DoubleOnNewTarget if ctx.new_target => power *= 2.0,
            Effect::DistanceScale {
                threshold,
                beyond,
                within,
            } => {
                power *= if ctx.distance > threshold { beyond } else { within };
            }
            Effect::ArmorBreak(factor) if ctx.target_armored => power *= factor,
            _ => {}
        }
    }
    power
}

/// Critical chance in percent: base plus flat rule bonuses plus the
/// CriticalAura contribution.
pub fn crit_chance(
    base: f64,
    rules: impl Iterator<Item = &'static ModifierRule>,
    ctx: &ModifierCtx,
) -> f64 {
    let mut chance = base;
    for r in rules.filter(|r| r.phase == Phase::Crit) {
        if let Effect::CritFlat(amount) = r.effect {
            chance += amount;
        }
    }
    if ctx.critical_aura {
        chance += CRIT_AURA_BONUS;
    }
    chance.clamp(0.0, 100.0)
}

/// Critical multiplier: ability override (default 1.5), equipment
/// crit-damage scalers, and the CriticalDamageAura factor.
pub fn crit_multiplier(
    rules: impl Iterator<Item = &'static ModifierRule> + Clone,
    ctx: &ModifierCtx,
) -> f64 {
    let mut multiplier = CRIT_MULTIPLIER;
    for r in rules.clone().filter(|r| r.phase == Phase::Crit) {
        if let Effect::CritMultiplier(base) = r.effect {
            multiplier = base;
        }
    }
    for r in rules.filter(|r| r.phase == Phase::Crit) {
        if let Effect::CritDamageScale(factor) = r.effect {
            multiplier *= factor;
        }
    }
    if ctx.critical_damage_aura {
        multiplier *= CRIT_DAMAGE_AURA_FACTOR;
    }
    multiplier
}

/// Derived attack interval: multiplicative rule scalers, then
/// weather/terrain conditionals, clamped to the engine floor.
pub fn attack_interval(
    base: f64,
    rules: impl Iterator<Item = &'static ModifierRule>,
    ctx: &ModifierCtx,
) -> f64 {
    let mut interval = base;
    for r in rules.filter(|r| r.phase == Phase::Interval) {
        match r.effect {
            Effect::IntervalScale(factor) => interval *= factor,
            Effect::IntervalScaleInWeatherOnTerrain(weather, terrain, factor)
                if ctx.weather == weather && ctx.terrain == terrain =>
            {
                interval *= factor;
            }
            _ => {}
        }
    }
    interval.max(MIN_ATTACK_INTERVAL_SECS)
}

/// Derived range: flat bonuses, then scalers, then terrain conditionals.
pub fn attack_range(
    base: f64,
    rules: impl Iterator<Item = &'static ModifierRule> + Clone,
    ctx: &ModifierCtx,
) -> f64 {
    let range_rules = rules.filter(|r| r.phase == Phase::Range);

    let mut range = base;
    for r in range_rules.clone() {
        if let Effect::RangeFlat(amount) = r.effect {
            range += amount;
        }
    }
    for r in range_rules.clone() {
        if let Effect::RangeScale(factor) = r.effect {
            range *= factor;
        }
    }
    for r in range_rules {
        if let Effect::RangeScaleOnTerrain(terrain, factor) = r.effect {
            if ctx.terrain == terrain {
                range *= factor;
            }
        }
    }
    range.max(0.0)
}

/// Total shots per attack cycle (1 + extras).
pub fn shots(rules: impl Iterator<Item = &'static ModifierRule>) -> u32 {
    let mut shots = 1;
    for r in rules.filter(|r| r.phase == Phase::Fire) {
        if let Effect::ExtraShots(n) = r.effect {
            shots += n;
        }
    }
    shots
}

/// Extra ricochets on top of the unit's base count.
pub fn extra_ricochets(rules: impl Iterator<Item = &'static ModifierRule>) -> u32 {
    let mut extra = 0;
    for r in rules.filter(|r| r.phase == Phase::Fire) {
        if let Effect::ExtraRicochets(n) = r.effect {
            extra += n;
        }
    }
    extra
}

pub fn reveals_invisible(mut rules: impl Iterator<Item = &'static ModifierRule>) -> bool {
    rules.any(|r| matches!(r.effect, Effect::RevealInvisible))
}

/// Splash radius, if the loadout splashes at all.
pub fn splash_radius(
    rules: impl Iterator<Item = &'static ModifierRule> + Clone,
) -> Option<f64> {
    let has_splash = rules.clone().any(|r| matches!(r.effect, Effect::Splash));
    if !has_splash {
        return None;
    }
    let mut radius = SPLASH_RADIUS;
    for r in rules.filter(|r| r.phase == Phase::Fire) {
        if let Effect::SplashRadiusScale(factor) = r.effect {
            radius *= factor;
        }
    }
    Some(radius)
}

pub fn gold_steal(rules: impl Iterator<Item = &'static ModifierRule>) -> Option<f64> {
    for r in rules.filter(|r| r.phase == Phase::OnHit) {
        if let Effect::GoldSteal(fraction) = r.effect {
            return Some(fraction);
        }
    }
    None
}

/// All on-hit status applications with their trigger chances.
pub fn on_hit_statuses(
    rules: impl Iterator<Item = &'static ModifierRule>,
) -> impl Iterator<Item = (StatusApply, f64)> {
    rules.filter_map(|r| match r.effect {
        Effect::OnHitStatus { apply, chance } if r.phase == Phase::OnHit => Some((apply, chance)),
        _ => None,
    })
}
