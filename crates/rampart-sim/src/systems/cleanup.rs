//! Cleanup system: drains the despawn buffer collected by the other
//! systems. Removal happens here, after all iteration for the sub-step
//! is done, so systems never despawn entities they are iterating.

use hecs::{Entity, World};

pub fn run(world: &mut World, despawn: &mut Vec<Entity>) {
    for entity in despawn.drain(..) {
        // Double-pushes are harmless; a missing entity is already gone.
        let _ = world.despawn(entity);
    }
}
