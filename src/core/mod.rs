pub mod config;
pub mod error;
pub mod types;

pub use config::{ArenaConfig, ConfigReport};
pub use error::{ArenaError, Result};
pub use types::{EntityId, Millis, Tick};
