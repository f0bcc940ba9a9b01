//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for agents
///
/// Opaque integer handed out by the [`World`](crate::ecs::world::World).
/// Ids are never reused within one world, so a stale id simply stops
/// resolving once its agent is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// Simulation clock reading in milliseconds
pub type Millis = u64;

/// Integer cell coordinate in the spatial grid
pub type CellKey = (i32, i32);

/// Planar distance between two positions (z is ignored)
#[inline]
pub fn planar_distance(a: glam::Vec3, b: glam::Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}
