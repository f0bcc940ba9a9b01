//! Per-tick orchestration and the passes it runs

pub mod effects;
pub mod lifecycle;
pub mod movement;
pub mod tick;

pub use effects::{EffectTracker, PendingEffect};
pub use lifecycle::{FlushReport, ImmediateDestroy, LifecycleManager};
pub use tick::{EffectCompletion, Pass, Simulation, SimulationBuilder, TickReport};
