//! Skirmish - tick-based arena simulation core
//!
//! Agents live in a component [`ecs::World`], find enemies through a uniform
//! [`spatial::SpatialGridIndex`], decide with data-only behavior trees and
//! fight with cooldown-gated attacks. Destruction is deferred to the end of
//! each tick. Presentation sits behind [`render::ViewBridge`].

pub mod ai;
pub mod combat;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod render;
pub mod simulation;
pub mod spatial;

pub use crate::core::{ArenaConfig, ArenaError, EntityId, Result};
pub use crate::entity::SpawnOptions;
pub use crate::simulation::{Simulation, SimulationBuilder, TickReport};
