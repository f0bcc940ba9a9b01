//! Ready-made trees for the two agent kinds

use serde::{Deserialize, Serialize};

use crate::ai::builder::TreeBuilder;
use crate::ai::leaves::{Action, Condition};
use crate::ai::tree::Node;

/// Which preset an agent runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    /// Roaming melee unit: attack, chase, search, patrol
    Chaser,
    /// Static structure: attack, search in range, repair, hold
    Defense,
}

impl TreeKind {
    pub fn tree(&self) -> Node {
        match self {
            TreeKind::Chaser => chaser_tree(),
            TreeKind::Defense => defense_tree(),
        }
    }
}

/// Shared top branch: keep an in-flight attack going, or start a new one
/// when a live target is in range and the cooldown is over
#[rustfmt::skip]
fn attack_branch() -> Node {
    TreeBuilder::root_sequence("attack")
        .selector("attack_guard")
            .condition(Condition::AttackPending)
            .sequence("attack_ready")
                .condition(Condition::HasLiveTarget)
                .condition(Condition::TargetInAttackRange)
                .condition(Condition::AttackReady)
            .end()
        .end()
        .action(Action::Attack)
        .build()
}

#[rustfmt::skip]
pub fn chaser_tree() -> Node {
    TreeBuilder::root_selector("chaser")
        .node(attack_branch())
        .sequence("chase")
            .condition(Condition::HasLiveTarget)
            .action(Action::Chase)
        .end()
        .sequence("search")
            .condition(Condition::HasEnemies)
            .action(Action::SearchNearest)
        .end()
        .action(Action::Patrol)
        .build()
}

#[rustfmt::skip]
pub fn defense_tree() -> Node {
    TreeBuilder::root_selector("defense")
        .node(attack_branch())
        .action(Action::SearchInRange)
        .sequence("repair")
            .condition(Condition::NeedsRepair)
            .condition(Condition::RepairReady)
            .action(Action::Repair)
        .end()
        .action(Action::Hold)
        .build()
}
