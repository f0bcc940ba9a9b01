//! Creates agents from recipes

use crate::ai::blackboard::{keys, BlackboardValue};
use crate::ai::brain::{attach_brain, Brain};
use crate::core::config::ArenaConfig;
use crate::core::error::Result;
use crate::core::types::EntityId;
use crate::ecs::World;
use crate::entity::catalog::EntityCatalog;
use crate::entity::components::{Tags, Transform};
use crate::entity::faction::FactionMember;
use crate::entity::recipes::{ComponentKind, EntityRecipe, RecipeBook, SpawnOptions};
use crate::render::{RenderHandle, ViewBridge};
use crate::simulation::lifecycle::destroy_agent;
use crate::spatial::SpatialGridIndex;

#[derive(Debug, Default)]
pub struct EntityFactory {
    recipes: RecipeBook,
    catalog: EntityCatalog,
}

impl EntityFactory {
    pub fn new(recipes: RecipeBook, catalog: EntityCatalog) -> Self {
        Self { recipes, catalog }
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Build an agent of type `kind`
    ///
    /// Unknown types fail before anything is allocated. If the recipe's init
    /// step fails the half-built agent is torn down again.
    pub fn spawn(
        &self,
        world: &mut World,
        view: &mut dyn ViewBridge,
        grid: &mut SpatialGridIndex,
        config: &ArenaConfig,
        kind: &str,
        options: &SpawnOptions,
    ) -> Result<EntityId> {
        let recipe = self.recipes.get(kind)?;
        let id = world.spawn(kind);

        if let Err(err) = self.assemble(recipe, world, view, config, id, options) {
            destroy_agent(world, view, id);
            return Err(err);
        }

        grid.mark_dirty();
        tracing::debug!(entity = %id, kind, tree = ?recipe.tree, "agent spawned");
        Ok(id)
    }

    fn assemble(
        &self,
        recipe: &EntityRecipe,
        world: &mut World,
        view: &mut dyn ViewBridge,
        config: &ArenaConfig,
        id: EntityId,
        options: &SpawnOptions,
    ) -> Result<()> {
        let kind = recipe.name.as_str();

        for component in &recipe.components {
            component.attach(world, id, config)?;
        }

        if let (Some(position), Some(transform)) = (options.position, world.get_mut::<Transform>(id)) {
            transform.position = position;
        }

        if recipe.wants(ComponentKind::Render) {
            if let Some(handle) = view.acquire(kind, self.catalog.asset_path(kind)) {
                world.insert(
                    id,
                    RenderHandle {
                        handle,
                        type_name: kind.to_string(),
                    },
                )?;
            }
        }

        if let Some(faction) = options.faction {
            world.insert(id, FactionMember::of(faction))?;
        }
        if let Some(tag) = &options.tag {
            if !world.has::<Tags>(id) {
                world.insert(id, Tags::default())?;
            }
            world.require_mut::<Tags>(id)?.add(tag.clone());
        }

        if let Some(init) = &recipe.init {
            init(world, id, options, config)?;
        }

        if let Some(tree) = recipe.tree {
            attach_brain(world, id, tree, config)?;
            if let Some(patrol) = options.patrol_velocity {
                world
                    .require_mut::<Brain>(id)?
                    .blackboard
                    .set(keys::PATROL_VELOCITY, BlackboardValue::Vector(patrol));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{CombatProfile, Health};
    use crate::core::error::ArenaError;
    use crate::entity::faction::Faction;
    use crate::render::{DelayedView, NullView};
    use glam::Vec3;

    fn factory() -> EntityFactory {
        let catalog = EntityCatalog::from_json_str(
            r#"[{"name": "chaser", "assetPath": "prefabs/chaser"}]"#,
        )
        .unwrap();
        EntityFactory::new(RecipeBook::standard(), catalog)
    }

    #[test]
    fn test_spawn_chaser() {
        let config = ArenaConfig::default();
        let mut world = World::new();
        let mut view = DelayedView::new(1);
        let mut grid = SpatialGridIndex::new(100.0).unwrap();
        grid.rebuild(&world);

        let options = SpawnOptions::at(-800.0, 120.0)
            .faction(Faction::Player1)
            .tag("player_1")
            .patrol(Vec3::new(10.0, 0.0, 0.0));
        let id = factory()
            .spawn(&mut world, &mut view, &mut grid, &config, "chaser", &options)
            .unwrap();

        assert!(grid.is_dirty());
        assert_eq!(world.get::<Transform>(id).unwrap().position, Vec3::new(-800.0, 120.0, 0.0));
        assert_eq!(world.get::<FactionMember>(id).unwrap().faction, Some(Faction::Player1));
        assert!(world.get::<Tags>(id).unwrap().has("player_1"));
        assert!(world.has::<RenderHandle>(id));
        assert_eq!(view.live_handles(), 1);

        let brain = world.get::<Brain>(id).unwrap();
        assert_eq!(
            brain.blackboard.vector(keys::PATROL_VELOCITY),
            Some(Vec3::new(10.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_outpost_init_runs_before_tree() {
        let config = ArenaConfig::default();
        let mut world = World::new();
        let mut grid = SpatialGridIndex::new(100.0).unwrap();

        let id = factory()
            .spawn(&mut world, &mut NullView, &mut grid, &config, "outpost", &SpawnOptions::default())
            .unwrap();

        assert_eq!(world.get::<CombatProfile>(id).unwrap().attack_range, 100.0);
        assert_eq!(world.get::<Health>(id).unwrap().max, 500.0);
        let brain = world.get::<Brain>(id).unwrap();
        assert_eq!(brain.blackboard.number(keys::ATTACK_RANGE), Some(100.0));
        // Headless view hands out no node
        assert!(!world.has::<RenderHandle>(id));
    }

    #[test]
    fn test_unknown_type_allocates_nothing() {
        let config = ArenaConfig::default();
        let mut world = World::new();
        let mut grid = SpatialGridIndex::new(100.0).unwrap();
        grid.rebuild(&world);

        let result = factory().spawn(&mut world, &mut NullView, &mut grid, &config, "dragon", &SpawnOptions::default());
        assert!(matches!(result, Err(ArenaError::UnknownEntityType(name)) if name == "dragon"));
        assert!(world.is_empty());
        assert!(!grid.is_dirty());
    }
}
