//! Arena configuration with documented defaults
//!
//! All tunable numbers live here. The config is loaded from TOML (every
//! section and field is optional) and handed to the simulation explicitly;
//! there is no global config.
//!
//! Validation never blocks startup: out-of-range values are reported as
//! errors, merely unusual values as warnings, and both are logged.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;

/// Combat and decision-tree defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Default attack range (world units)
    pub attack_range: f32,
    /// Default damage per landed hit
    pub attack_damage: f32,
    /// Default cooldown between attack attempts (milliseconds)
    ///
    /// Signed so that a negative value in a config file can be reported
    /// instead of failing to parse.
    pub attack_cooldown_ms: i64,
    /// Radius roaming agents search for enemies in (world units)
    pub search_radius: f32,
    /// Name of the one-shot animation that gates an attack
    pub attack_animation: String,
    /// Velocity written by the idle branch when no patrol vector is set
    pub idle_velocity: [f32; 2],
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            attack_range: 50.0,
            attack_damage: 10.0,
            attack_cooldown_ms: 1000,
            search_radius: 400.0,
            attack_animation: "attack".to_string(),
            idle_velocity: [0.0, 0.0],
        }
    }
}

/// Spatial index tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialIndexConfig {
    /// Side length of one grid cell (world units)
    ///
    /// Smaller = more cells, fewer agents to filter per query.
    /// Larger = fewer cells, more false positives per query.
    pub cell_size: f32,
}

impl Default for SpatialIndexConfig {
    fn default() -> Self {
        Self { cell_size: 100.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Default maximum speed (world units per second)
    pub max_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { max_speed: 10.0 }
    }
}

/// Static defensive structure tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseConfig {
    /// Search radius as a multiple of the structure's attack range
    pub search_factor: f32,
    /// Health restored per repair
    pub repair_amount: f32,
    /// Minimum time between repairs (milliseconds)
    pub repair_cooldown_ms: u64,
    /// Max health given to freshly spawned agents
    pub max_health: f32,
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            search_factor: 2.0,
            repair_amount: 1.0,
            repair_cooldown_ms: 1000,
            max_health: 100.0,
        }
    }
}

/// Complete arena configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub ai: AiConfig,
    pub spatial_index: SpatialIndexConfig,
    pub movement: MovementConfig,
    pub defense: DefenseConfig,
}

/// Outcome of validating an [`ArenaConfig`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Emit every finding through `tracing`
    pub fn log(&self) {
        for error in &self.errors {
            tracing::error!(target: "skirmish::config", "{}", error);
        }
        for warning in &self.warnings {
            tracing::warn!(target: "skirmish::config", "{}", warning);
        }
        if self.errors.is_empty() && self.warnings.is_empty() {
            tracing::info!(target: "skirmish::config", "configuration validated");
        }
    }
}

impl ArenaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Default cooldown, with negative config values read as zero
    pub fn attack_cooldown_ms(&self) -> u64 {
        self.ai.attack_cooldown_ms.max(0) as u64
    }

    /// Check every value; nothing here rejects the config
    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();
        let ai = &self.ai;

        if ai.attack_range <= 0.0 {
            report.errors.push(format!("ai.attack_range ({}) must be > 0", ai.attack_range));
        } else if ai.attack_range > 1000.0 {
            report.warnings.push(format!(
                "ai.attack_range ({}) is large and may hurt query performance",
                ai.attack_range
            ));
        }

        if ai.attack_damage <= 0.0 {
            report.errors.push(format!("ai.attack_damage ({}) must be > 0", ai.attack_damage));
        }

        if ai.attack_cooldown_ms <= 0 {
            report.errors.push(format!(
                "ai.attack_cooldown_ms ({}) must be > 0",
                ai.attack_cooldown_ms
            ));
        } else if ai.attack_cooldown_ms < 100 {
            report.warnings.push(format!(
                "ai.attack_cooldown_ms ({}) is very short; agents will attack almost every tick",
                ai.attack_cooldown_ms
            ));
        }

        let cell_size = self.spatial_index.cell_size;
        if ai.search_radius <= 0.0 {
            report.errors.push(format!("ai.search_radius ({}) must be > 0", ai.search_radius));
        } else if cell_size > 0.0 && ai.search_radius / cell_size > 20.0 {
            report.warnings.push(format!(
                "ai.search_radius ({}) spans more than 20 cells of size {}",
                ai.search_radius, cell_size
            ));
        }

        if cell_size <= 0.0 {
            report.errors.push(format!("spatial_index.cell_size ({}) must be > 0", cell_size));
        } else if cell_size < 10.0 {
            report.warnings.push(format!(
                "spatial_index.cell_size ({}) is small; the grid will have many cells",
                cell_size
            ));
        } else if cell_size > 500.0 {
            report.warnings.push(format!(
                "spatial_index.cell_size ({}) is large; queries will return many false positives",
                cell_size
            ));
        }

        let max_speed = self.movement.max_speed;
        if max_speed <= 0.0 {
            report.errors.push(format!("movement.max_speed ({}) must be > 0", max_speed));
        } else if max_speed > 1000.0 {
            report.warnings.push(format!("movement.max_speed ({}) is very fast", max_speed));
        }

        report
    }
}
