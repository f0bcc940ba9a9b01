//! Entity recipes: which components an entity type gets and how to set them up
//!
//! A recipe is looked up by type tag at spawn time. It lists the components
//! to attach (each built from the arena config), the decision tree to run,
//! and an optional init closure for anything type-specific.

use ahash::AHashMap;
use glam::Vec3;

use crate::ai::presets::TreeKind;
use crate::combat::{CombatProfile, Health};
use crate::core::config::ArenaConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::EntityId;
use crate::ecs::World;
use crate::entity::components::{Facing, Tags, Transform, Velocity};
use crate::entity::faction::{Faction, FactionMember};

/// Caller-supplied spawn parameters
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    pub position: Option<Vec3>,
    pub faction: Option<Faction>,
    pub tag: Option<String>,
    /// Velocity the agent drifts with while idle
    pub patrol_velocity: Option<Vec3>,
}

impl SpawnOptions {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Some(Vec3::new(x, y, 0.0)),
            ..Self::default()
        }
    }

    pub fn faction(mut self, faction: Faction) -> Self {
        self.faction = Some(faction);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn patrol(mut self, velocity: Vec3) -> Self {
        self.patrol_velocity = Some(velocity);
        self
    }
}

/// Components a recipe can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Transform,
    Velocity,
    Facing,
    Health,
    Faction,
    Combat,
    Tags,
    /// Ask the view for a visual node
    Render,
}

impl ComponentKind {
    /// Attach the config-default component; `Render` is handled by the factory
    pub fn attach(&self, world: &mut World, id: EntityId, config: &ArenaConfig) -> Result<()> {
        match self {
            ComponentKind::Transform => {
                world.insert(id, Transform::default())?;
            }
            ComponentKind::Velocity => {
                world.insert(id, Velocity::with_max_speed(config.movement.max_speed))?;
            }
            ComponentKind::Facing => {
                world.insert(id, Facing::default())?;
            }
            ComponentKind::Health => {
                world.insert(id, Health::new(config.defense.max_health))?;
            }
            ComponentKind::Faction => {
                world.insert(id, FactionMember::default())?;
            }
            ComponentKind::Combat => {
                world.insert(id, CombatProfile::from_config(config))?;
            }
            ComponentKind::Tags => {
                world.insert(id, Tags::default())?;
            }
            ComponentKind::Render => {}
        }
        Ok(())
    }
}

pub type InitFn = Box<dyn Fn(&mut World, EntityId, &SpawnOptions, &ArenaConfig) -> Result<()>>;

pub struct EntityRecipe {
    pub name: String,
    pub components: Vec<ComponentKind>,
    /// Tree attached at spawn, if any
    pub tree: Option<TreeKind>,
    pub init: Option<InitFn>,
}

impl EntityRecipe {
    pub fn new(name: impl Into<String>, components: &[ComponentKind]) -> Self {
        Self {
            name: name.into(),
            components: components.to_vec(),
            tree: None,
            init: None,
        }
    }

    pub fn with_tree(mut self, kind: TreeKind) -> Self {
        self.tree = Some(kind);
        self
    }

    pub fn with_init(
        mut self,
        init: impl Fn(&mut World, EntityId, &SpawnOptions, &ArenaConfig) -> Result<()> + 'static,
    ) -> Self {
        self.init = Some(Box::new(init));
        self
    }

    pub fn wants(&self, kind: ComponentKind) -> bool {
        self.components.contains(&kind)
    }
}

impl std::fmt::Debug for EntityRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRecipe")
            .field("name", &self.name)
            .field("components", &self.components)
            .field("tree", &self.tree)
            .field("init", &self.init.is_some())
            .finish()
    }
}

/// Recipes indexed by type tag
#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: AHashMap<String, EntityRecipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// `chaser`, `outpost` and `base`
    pub fn standard() -> Self {
        let recipes = [chaser_recipe(), outpost_recipe(), base_recipe()]
            .into_iter()
            .map(|recipe| (recipe.name.clone(), recipe))
            .collect();
        Self { recipes }
    }

    pub fn register(&mut self, recipe: EntityRecipe) -> Result<()> {
        if self.recipes.contains_key(&recipe.name) {
            return Err(ArenaError::DuplicateEntityType(recipe.name));
        }
        self.recipes.insert(recipe.name.clone(), recipe);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&EntityRecipe> {
        self.recipes
            .get(name)
            .ok_or_else(|| ArenaError::UnknownEntityType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    /// Tree preset for a type tag, if the type has one
    pub fn tree_kind(&self, name: &str) -> Option<TreeKind> {
        self.recipes.get(name).and_then(|recipe| recipe.tree)
    }

    /// Registered type tags, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.recipes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

pub fn chaser_recipe() -> EntityRecipe {
    EntityRecipe::new(
        "chaser",
        &[
            ComponentKind::Transform,
            ComponentKind::Velocity,
            ComponentKind::Facing,
            ComponentKind::Render,
            ComponentKind::Faction,
            ComponentKind::Health,
            ComponentKind::Combat,
        ],
    )
    .with_tree(TreeKind::Chaser)
}

/// Static tower: twice the configured range, sturdier than a chaser
pub fn outpost_recipe() -> EntityRecipe {
    EntityRecipe::new(
        "outpost",
        &[
            ComponentKind::Transform,
            ComponentKind::Render,
            ComponentKind::Faction,
            ComponentKind::Health,
            ComponentKind::Combat,
        ],
    )
    .with_tree(TreeKind::Defense)
    .with_init(|world, id, _options, config| {
        world.require_mut::<CombatProfile>(id)?.attack_range = config.ai.attack_range * 2.0;
        *world.require_mut::<Health>(id)? = Health::new(config.defense.max_health * 5.0);
        Ok(())
    })
}

/// Passive headquarters: something to defend, never acts
pub fn base_recipe() -> EntityRecipe {
    EntityRecipe::new(
        "base",
        &[
            ComponentKind::Transform,
            ComponentKind::Render,
            ComponentKind::Health,
            ComponentKind::Faction,
        ],
    )
    .with_init(|world, id, _options, config| {
        *world.require_mut::<Health>(id)? = Health::new(config.defense.max_health * 10.0);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_book() {
        let book = RecipeBook::standard();
        assert_eq!(book.names(), vec!["base", "chaser", "outpost"]);
        assert_eq!(book.tree_kind("chaser"), Some(TreeKind::Chaser));
        assert_eq!(book.tree_kind("outpost"), Some(TreeKind::Defense));
        assert_eq!(book.tree_kind("base"), None);
        assert!(book.get("chaser").unwrap().wants(ComponentKind::Velocity));
        assert!(!book.get("outpost").unwrap().wants(ComponentKind::Velocity));
        for name in book.names() {
            assert_eq!(book.get(name).unwrap().name, name);
        }
    }

    #[test]
    fn test_duplicate_recipe_rejected() {
        let mut book = RecipeBook::standard();
        let result = book.register(EntityRecipe::new("chaser", &[ComponentKind::Transform]));
        assert!(matches!(result, Err(ArenaError::DuplicateEntityType(name)) if name == "chaser"));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let book = RecipeBook::standard();
        assert!(matches!(book.get("dragon"), Err(ArenaError::UnknownEntityType(_))));
    }

    #[test]
    fn test_component_attach_uses_config() {
        let mut config = ArenaConfig::default();
        config.movement.max_speed = 25.0;
        let mut world = World::new();
        let id = world.spawn("chaser");

        ComponentKind::Velocity.attach(&mut world, id, &config).unwrap();
        ComponentKind::Combat.attach(&mut world, id, &config).unwrap();
        ComponentKind::Render.attach(&mut world, id, &config).unwrap();

        assert_eq!(world.get::<Velocity>(id).unwrap().max_speed, 25.0);
        assert_eq!(world.get::<CombatProfile>(id).unwrap().attack_range, 50.0);
    }
}
