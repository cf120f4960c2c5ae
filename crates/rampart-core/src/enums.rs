//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Geometric shape of a tower's firing range. Each variant is a pure
/// predicate over the vector between tower and enemy centers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeShape {
    #[default]
    Circle,
    /// Ring between an inner and outer radius.
    Donut,
    /// Two axis-aligned bars through the tower.
    Cross,
    /// Two diagonal bars through the tower.
    XShape,
    HorizontalLine,
    VerticalLine,
}

/// Target-selection policy, applied as a total order over valid enemies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "status")]
pub enum TargetMode {
    /// Most distance traveled first.
    #[default]
    First,
    /// Least distance traveled first.
    Last,
    HighHp,
    LowHp,
    HighArmor,
    /// Unarmored enemies first.
    NoArmor,
    Faster,
    Slower,
    /// Enemies carrying the given status first.
    Afflicted(StatusKind),
    /// Enemies free of the given status first.
    Unafflicted(StatusKind),
    /// Invisible enemies first (only meaningful with invisibility reveal).
    Invisible,
    Random,
}

/// Timed or stacking debuff kinds tracked per enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Burn,
    Poison,
    Slow,
    Stun,
    Curse,
    Nightmare,
}

/// How a tower delivers its damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Spawns projectiles that travel to their target.
    #[default]
    Projectile,
    /// Applies damage directly to every valid target once per cycle.
    Area,
}

/// Terrain type of a placement tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Neutral,
    Grass,
    Water,
    Mountain,
}

/// Current weather over the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    HarshSunlight,
}

/// Where a damage application originated. Periodic status damage re-enters
/// the pipeline with its own source so on-hit rules do not retrigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Physical,
    Burn,
    Poison,
    Nightmare,
    /// Damage propagated between cursed enemies.
    Curse,
}

/// Top-level engine phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Between waves; towers may be placed, nothing is spawned.
    #[default]
    Idle,
    /// A wave is in progress.
    Running,
    /// Frozen; the scheduler still runs with a zero delta.
    Paused,
    /// Player hearts exhausted; waiting for a restart.
    Defeat,
}

/// Tower ability identifiers. The damage pipeline never branches on these
/// directly; each maps to modifier rules in the catalog crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityId {
    Standard,
    DoubleShot,
    TripleShot,
    QuadraShot,
    SuperCritical,
    Splash,
    BurnTouch,
    PoisonTouch,
    SlowTouch,
    StunTouch,
    CurseTouch,
    NightmareTouch,
    /// Ramping bonus for consecutive hits on the same target.
    Focus,
    /// Double damage on the first hit against a new target.
    FirstImpression,
    /// Distance-scaled damage.
    Sniper,
    /// Stacking power bonus per kill, reset each wave.
    Moxie,
    /// Steals a fraction of the victim's gold value per hit.
    Greed,
    ArmorBreak,
    PowerAura,
    CriticalAura,
    CriticalDamageAura,
    TriageAura,
}

/// Equipment identifiers, likewise resolved through the catalog rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentId {
    PowerGem,
    WarHorn,
    VerdantSigil,
    GraniteBand,
    SwiftFeather,
    QuickenedCoil,
    LeadPlating,
    EagleEye,
    FarsightLens,
    LuckyClover,
    ScopeLens,
    SiegeRounds,
    EmberVial,
    VenomBarb,
    FrostCharm,
    SpringCoil,
    TruthLens,
    DragonFang,
    ZoomLens,
}

/// Enemy passive abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassiveKind {
    /// One-time revive with a stunned/invulnerable recovery window.
    SecondWind,
    /// Periodically teleports backward along the traveled path.
    TimeRewind,
    /// Gains speed every second.
    Frenzy,
    /// Re-armors and turns invisible shortly after losing cover.
    ShadowVeil,
    /// Periodically sheds status effects.
    Cleanse,
    /// Nearby towers may lose their attack cycle.
    StaticField,
    /// Halves physical damage from nearby towers.
    EmberShroud,
    /// Immune to physical damage at low hp.
    Sturdy,
    /// Caps any single hit.
    LightFrame,
    /// Nearby towers attack slower.
    FrostAura,
}
