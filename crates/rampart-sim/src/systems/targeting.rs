//! Range-shape predicates and target ordering.
//!
//! `in_range` is a pure geometric predicate over the vector between tower
//! and enemy centers. `order` sorts candidates into the total order a
//! tower's target mode defines; ties keep default iteration order (the
//! sorts are stable), and the head of the list is the primary target.

use glam::DVec2;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use rampart_core::constants::TILE_SIZE;
use rampart_core::enums::{RangeShape, TargetMode};

use super::EnemySnap;

/// Is an enemy at `delta` (enemy center minus tower center) inside the
/// given range shape?
pub fn in_range(shape: RangeShape, range: f64, inner_range: f64, delta: DVec2) -> bool {
    let distance = delta.length();
    let arm = TILE_SIZE;
    match shape {
        RangeShape::Circle => distance <= range,
        RangeShape::Donut => distance >= inner_range && distance <= range,
        RangeShape::Cross => {
            (delta.x.abs() <= arm && delta.y.abs() <= range)
                || (delta.y.abs() <= arm && delta.x.abs() <= range)
        }
        RangeShape::XShape => (delta.x.abs() - delta.y.abs()).abs() < arm && distance <= range,
        RangeShape::HorizontalLine => delta.y.abs() <= arm && delta.x.abs() <= range,
        RangeShape::VerticalLine => delta.x.abs() <= arm && delta.y.abs() <= range,
    }
}

fn sort_desc_by(candidates: &mut [&EnemySnap], key: impl Fn(&EnemySnap) -> f64) {
    candidates.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn sort_asc_by(candidates: &mut [&EnemySnap], key: impl Fn(&EnemySnap) -> f64) {
    candidates.sort_by(|a, b| {
        key(a)
            .partial_cmp(&key(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Enemies matching the predicate sort ahead of the rest.
fn sort_matching_first(candidates: &mut [&EnemySnap], matches: impl Fn(&EnemySnap) -> bool) {
    candidates.sort_by_key(|snap| !matches(snap));
}

/// Order candidates per the target mode. The head becomes the primary
/// target; multi-shot towers take additional unique targets in order.
pub fn order(mode: TargetMode, candidates: &mut Vec<&EnemySnap>, rng: &mut ChaCha8Rng) {
    match mode {
        TargetMode::First => sort_desc_by(candidates, |s| s.distance_traveled),
        TargetMode::Last => sort_asc_by(candidates, |s| s.distance_traveled),
        TargetMode::HighHp => sort_desc_by(candidates, |s| s.hp),
        TargetMode::LowHp => sort_asc_by(candidates, |s| s.hp),
        TargetMode::HighArmor => sort_desc_by(candidates, |s| s.armor),
        TargetMode::NoArmor => sort_matching_first(candidates, |s| s.armor <= 0.0),
        TargetMode::Faster => sort_desc_by(candidates, |s| s.speed),
        TargetMode::Slower => sort_asc_by(candidates, |s| s.speed),
        TargetMode::Afflicted(kind) => sort_matching_first(candidates, |s| s.has_status(kind)),
        TargetMode::Unafflicted(kind) => sort_matching_first(candidates, |s| !s.has_status(kind)),
        TargetMode::Invisible => sort_matching_first(candidates, |s| s.invisible),
        TargetMode::Random => candidates.shuffle(rng),
    }
}
