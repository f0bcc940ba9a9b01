//! Velocity integration
//!
//! Consumes the movement intents written by decision trees: clamps each to
//! its max speed, advances the position and turns the agent to face its
//! horizontal direction of travel.

use crate::core::types::EntityId;
use crate::ecs::World;
use crate::entity::components::{Facing, Transform, Velocity};

/// Speeds at or below this are treated as standing still
pub const MIN_MOVING_SPEED: f32 = 0.001;

/// Move every agent with an enabled transform and velocity by `dt` seconds
///
/// Returns the agents that actually moved, ascending. The caller is
/// responsible for marking the spatial index dirty when this is non-empty.
pub fn integrate(world: &mut World, dt: f32) -> Vec<EntityId> {
    let mut moved = Vec::new();

    for id in world.entities_with::<Velocity>() {
        let Some(velocity) = world.get_mut::<Velocity>(id) else {
            continue;
        };
        if !velocity.enabled {
            continue;
        }
        velocity.linear = velocity.clamped();
        let step = velocity.linear;

        let Some(transform) = world.get_mut::<Transform>(id) else {
            continue;
        };
        if !transform.enabled || step.length() <= MIN_MOVING_SPEED {
            continue;
        }
        transform.position += step * dt;
        moved.push(id);

        if let Some(facing) = world.get_mut::<Facing>(id) {
            facing.follow(step.x);
        }
    }

    moved
}
