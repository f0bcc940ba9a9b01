//! Per-tick enemy list refresh
//!
//! Runs after the spatial index rebuild and before any tree is evaluated.
//! The grid answers with a coarse candidate set; this pass narrows it to
//! live hostile agents within the true search radius.

use crate::ai::blackboard::{keys, BlackboardValue};
use crate::ai::brain::Brain;
use crate::combat::CombatProfile;
use crate::core::config::ArenaConfig;
use crate::core::types::{planar_distance, EntityId};
use crate::ecs::World;
use crate::entity::components::Transform;
use crate::entity::faction::{FactionMember, FactionTable, Relation};
use crate::spatial::SpatialGridIndex;

/// Refresh `enemies` on every brain; returns how many were refreshed
pub fn refresh_blackboards(
    world: &mut World,
    grid: &SpatialGridIndex,
    factions: &FactionTable,
    config: &ArenaConfig,
) -> usize {
    let agents = world.entities_with::<Brain>();
    for &id in &agents {
        let enemies = nearby_enemies(world, grid, factions, config, id);
        if let Some(brain) = world.get_mut::<Brain>(id) {
            brain
                .blackboard
                .set(keys::ENEMIES, BlackboardValue::Entities(enemies));
        }
    }
    agents.len()
}

/// Hostile agents within the brain's search radius, ascending
///
/// Agents without a transform, faction or brain get an empty list.
pub fn nearby_enemies(
    world: &World,
    grid: &SpatialGridIndex,
    factions: &FactionTable,
    config: &ArenaConfig,
    id: EntityId,
) -> Vec<EntityId> {
    let (Some(transform), Some(brain)) = (world.get::<Transform>(id), world.get::<Brain>(id)) else {
        return Vec::new();
    };
    let Some(own_faction) = world.get::<FactionMember>(id).and_then(|m| m.faction) else {
        tracing::trace!(entity = %id, "no faction; enemy list left empty");
        return Vec::new();
    };

    let fallback_range = world
        .get::<CombatProfile>(id)
        .map_or(config.ai.attack_range, |profile| profile.attack_range);
    let radius = brain.search_radius(fallback_range);
    let origin = transform.position;

    grid.query(origin.x, origin.y, radius)
        .into_iter()
        .filter(|&other| other != id)
        .filter(|&other| {
            world
                .get::<FactionMember>(other)
                .and_then(|m| m.faction)
                .is_some_and(|faction| factions.relation_of(own_faction, faction) == Relation::Enemy)
        })
        .filter(|&other| {
            world
                .get::<Transform>(other)
                .is_some_and(|t| planar_distance(origin, t.position) <= radius)
        })
        .collect()
}
