//! Modifier-rule catalog for RAMPART.
//!
//! Every equipment and ability identifier maps to a static list of
//! `(phase, effect)` rules. The damage pipeline and attack-speed
//! computation iterate these rules in a fixed phase order instead of
//! branching on identifiers, so new content is added here without
//! touching the pipeline. Enemy passive abilities get the same
//! treatment through a profile table.

pub mod passives;
pub mod rules;

pub use rampart_core as core;
pub use rules::{ModifierCtx, ModifierRule};
