use thiserror::Error;

use crate::core::types::EntityId;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Entity {entity} is missing component {component}")]
    ComponentNotFound {
        entity: EntityId,
        component: &'static str,
    },

    #[error("Entity {0} has no faction assigned")]
    NoFaction(EntityId),

    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Entity type already registered: {0}")]
    DuplicateEntityType(String),

    #[error("Invalid grid cell size {0}: must be finite and greater than zero")]
    InvalidCellSize(f32),

    #[error("Faction table is not symmetric for {0} / {1}")]
    AsymmetricFactions(String, String),

    #[error("Faction table has no relation for {0} / {1}")]
    MissingRelation(String, String),

    #[error("Faction {0} cannot be hostile to itself")]
    SelfHostileFaction(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
