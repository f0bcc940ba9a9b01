//! Behavior tree nodes and their evaluation
//!
//! A tree is a plain value: composites own their children and leaves are
//! data-only enums. One recursive visitor ([`Node::evaluate`]) walks it
//! against the agent's blackboard and the shared [`TreeContext`].

use crate::ai::blackboard::Blackboard;
use crate::ai::leaves::{Action, Condition};
use crate::combat::DestroyRequester;
use crate::core::config::ArenaConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Millis};
use crate::ecs::World;
use crate::render::ViewBridge;
use crate::simulation::effects::EffectTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Failure,
    Running,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// First child that does not fail wins
    Selector { name: String, children: Vec<Node> },
    /// First child that does not succeed stops the run
    Sequence { name: String, children: Vec<Node> },
    Condition(Condition),
    Action(Action),
}

/// Everything a leaf may touch besides its own blackboard
pub struct TreeContext<'a> {
    pub world: &'a mut World,
    pub destroyer: &'a mut dyn DestroyRequester,
    pub view: &'a mut dyn ViewBridge,
    pub effects: &'a mut EffectTracker,
    pub config: &'a ArenaConfig,
    pub now: Millis,
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Selector { name, .. } | Node::Sequence { name, .. } => name,
            Node::Condition(condition) => condition.name(),
            Node::Action(action) => action.name(),
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Selector { children, .. } | Node::Sequence { children, .. } => children,
            Node::Condition(_) | Node::Action(_) => &[],
        }
    }

    /// Total nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }

    /// Run the subtree once
    ///
    /// An error means a leaf found a required component missing; the caller
    /// decides what to do with the agent for this tick.
    pub fn evaluate(
        &self,
        agent: EntityId,
        blackboard: &mut Blackboard,
        ctx: &mut TreeContext<'_>,
    ) -> Result<Status> {
        match self {
            Node::Selector { children, .. } => {
                for child in children {
                    let status = child.evaluate(agent, blackboard, ctx)?;
                    if status != Status::Failure {
                        return Ok(status);
                    }
                }
                Ok(Status::Failure)
            }
            Node::Sequence { children, .. } => {
                for child in children {
                    let status = child.evaluate(agent, blackboard, ctx)?;
                    if status != Status::Success {
                        return Ok(status);
                    }
                }
                Ok(Status::Success)
            }
            Node::Condition(condition) => {
                if condition.check(agent, blackboard, ctx)? {
                    Ok(Status::Success)
                } else {
                    Ok(Status::Failure)
                }
            }
            Node::Action(action) => action.run(agent, blackboard, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::blackboard::keys;
    use crate::render::NullView;
    use crate::simulation::lifecycle::LifecycleManager;

    fn run(node: &Node, blackboard: &mut Blackboard) -> Status {
        let mut world = World::new();
        let agent = world.spawn("dummy");
        let mut destroyer = LifecycleManager::new();
        let mut view = NullView;
        let mut effects = EffectTracker::new();
        let config = ArenaConfig::default();
        let mut ctx = TreeContext {
            world: &mut world,
            destroyer: &mut destroyer,
            view: &mut view,
            effects: &mut effects,
            config: &config,
            now: 0,
        };
        node.evaluate(agent, blackboard, &mut ctx).unwrap()
    }

    fn enemies_present() -> Node {
        Node::Condition(Condition::HasEnemies)
    }

    #[test]
    fn test_empty_composites() {
        let mut bb = Blackboard::new();
        let selector = Node::Selector { name: "s".into(), children: vec![] };
        let sequence = Node::Sequence { name: "q".into(), children: vec![] };
        assert_eq!(run(&selector, &mut bb), Status::Failure);
        assert_eq!(run(&sequence, &mut bb), Status::Success);
    }

    #[test]
    fn test_selector_falls_through_failures() {
        let mut bb = Blackboard::new();
        let node = Node::Selector {
            name: "root".into(),
            children: vec![enemies_present(), Node::Action(Action::Hold)],
        };
        assert_eq!(run(&node, &mut bb), Status::Success);
        assert_eq!(node.node_count(), 3);
    }

    #[test]
    fn test_sequence_stops_at_failure() {
        let mut bb = Blackboard::new();
        let node = Node::Sequence {
            name: "search".into(),
            children: vec![enemies_present(), Node::Action(Action::Hold)],
        };
        assert_eq!(run(&node, &mut bb), Status::Failure);
        // Hold never ran, so no state was recorded
        assert!(!bb.contains(keys::STATE));
    }
}
