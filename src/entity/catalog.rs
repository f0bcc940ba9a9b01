//! Entity type catalog loaded from JSON
//!
//! Each record names an entity type, the asset the view should build its
//! node from, and the pooling hints the view may use. The simulation only
//! forwards the asset path; pooling is entirely the view's concern.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::error::{ArenaError, Result};

pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_SHRINK_THRESHOLD: u32 = 10;

fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

fn default_shrink_threshold() -> u32 {
    DEFAULT_SHRINK_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeRecord {
    pub name: String,
    pub asset_path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_shrink_threshold")]
    pub shrink_threshold: u32,
}

#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    records: BTreeMap<String, EntityTypeRecord>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index records by name; a repeated name is an error
    pub fn from_records(records: Vec<EntityTypeRecord>) -> Result<Self> {
        let mut catalog = Self::new();
        for record in records {
            if catalog.records.contains_key(&record.name) {
                return Err(ArenaError::DuplicateEntityType(record.name));
            }
            catalog.records.insert(record.name.clone(), record);
        }
        Ok(catalog)
    }

    /// Parse a JSON array of records
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<EntityTypeRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), types = catalog.len(), "entity catalog loaded");
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&EntityTypeRecord> {
        self.records.get(name)
    }

    pub fn asset_path(&self, name: &str) -> Option<&str> {
        self.get(name).map(|record| record.asset_path.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &EntityTypeRecord> {
        self.records.values()
    }
}
