//! Agent components, factions and construction

pub mod catalog;
pub mod components;
pub mod factory;
pub mod faction;
pub mod recipes;

pub use catalog::{EntityCatalog, EntityTypeRecord};
pub use components::{Facing, Tags, Transform, Velocity};
pub use factory::EntityFactory;
pub use faction::{Faction, FactionMember, FactionTable, Relation};
pub use recipes::{ComponentKind, EntityRecipe, RecipeBook, SpawnOptions};
