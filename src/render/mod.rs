//! Presentation boundary
//!
//! Nothing in here modifies simulation state except through the view bridge
//! handles the simulation itself hands out.

pub mod view;

pub use view::{DelayedView, EffectTicket, NullView, RenderHandle, ViewBridge, ViewHandle};

use glam::Vec3;
use serde::Serialize;

use crate::combat::Health;
use crate::core::types::EntityId;
use crate::ecs::World;
use crate::entity::components::{Facing, Transform};
use crate::entity::faction::{Faction, FactionMember};

/// Lightweight snapshot of an agent for drawing or reporting
#[derive(Debug, Clone, Serialize)]
pub struct RenderEntity {
    pub id: EntityId,
    pub kind: String,
    #[serde(serialize_with = "serialize_planar")]
    pub position: Vec3,
    pub facing: i8,
    pub faction: Option<Faction>,
    pub health: f32,
}

fn serialize_planar<S: serde::Serializer>(position: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
    [position.x, position.y].serialize(serializer)
}

/// Collect every positioned, enabled agent into a reusable buffer, ascending
pub fn collect_render_entities(world: &World, buffer: &mut Vec<RenderEntity>) {
    buffer.clear();

    for id in world.entities_with::<Transform>() {
        let Some(transform) = world.get::<Transform>(id) else {
            continue;
        };
        if !transform.enabled {
            continue;
        }
        buffer.push(RenderEntity {
            id,
            kind: world.kind_of(id).unwrap_or_default().to_string(),
            position: transform.position,
            facing: world.get::<Facing>(id).map_or(1, |facing| facing.0),
            faction: world.get::<FactionMember>(id).and_then(|member| member.faction),
            health: world.get::<Health>(id).map_or(0.0, |health| health.fraction()),
        });
    }
}
