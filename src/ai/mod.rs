//! Agent decision making
//!
//! Architecture: data-only behavior trees
//! - `Node` is a tagged tree of selectors, sequences and leaves
//! - `Blackboard` holds everything a tree remembers between ticks
//! - `Brain` bundles both into one component per agent
//! - `refresh` fills each blackboard's enemy list from the spatial index

pub mod blackboard;
pub mod brain;
pub mod builder;
pub mod leaves;
pub mod presets;
pub mod refresh;
pub mod tree;

pub use blackboard::{keys, AgentState, Blackboard, BlackboardValue};
pub use brain::{attach_brain, evaluate_brain, Brain, SearchScope};
pub use builder::TreeBuilder;
pub use leaves::{Action, Condition};
pub use presets::{chaser_tree, defense_tree, TreeKind};
pub use refresh::{nearby_enemies, refresh_blackboards};
pub use tree::{Node, Status, TreeContext};
