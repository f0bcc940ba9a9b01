//! Fluent construction of behavior trees
//!
//! ```
//! use skirmish::ai::{Action, Condition, TreeBuilder};
//!
//! let tree = TreeBuilder::root_selector("root")
//!     .sequence("search")
//!         .condition(Condition::HasEnemies)
//!         .action(Action::SearchNearest)
//!     .end()
//!     .action(Action::Patrol)
//!     .build();
//! assert_eq!(tree.node_count(), 5);
//! ```

use crate::ai::leaves::{Action, Condition};
use crate::ai::tree::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompositeKind {
    Selector,
    Sequence,
}

#[derive(Debug)]
struct Frame {
    kind: CompositeKind,
    name: String,
    children: Vec<Node>,
}

impl Frame {
    fn into_node(self) -> Node {
        match self.kind {
            CompositeKind::Selector => Node::Selector {
                name: self.name,
                children: self.children,
            },
            CompositeKind::Sequence => Node::Sequence {
                name: self.name,
                children: self.children,
            },
        }
    }
}

/// Stack-based builder: `selector`/`sequence` open a composite, `end` closes it
#[derive(Debug)]
pub struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    pub fn root_selector(name: impl Into<String>) -> Self {
        Self::root(CompositeKind::Selector, name.into())
    }

    pub fn root_sequence(name: impl Into<String>) -> Self {
        Self::root(CompositeKind::Sequence, name.into())
    }

    fn root(kind: CompositeKind, name: String) -> Self {
        Self {
            stack: vec![Frame {
                kind,
                name,
                children: Vec::new(),
            }],
        }
    }

    pub fn selector(self, name: impl Into<String>) -> Self {
        self.open(CompositeKind::Selector, name.into())
    }

    pub fn sequence(self, name: impl Into<String>) -> Self {
        self.open(CompositeKind::Sequence, name.into())
    }

    fn open(mut self, kind: CompositeKind, name: String) -> Self {
        self.stack.push(Frame {
            kind,
            name,
            children: Vec::new(),
        });
        self
    }

    pub fn condition(self, condition: Condition) -> Self {
        self.node(Node::Condition(condition))
    }

    pub fn action(self, action: Action) -> Self {
        self.node(Node::Action(action))
    }

    /// Attach an already built subtree
    pub fn node(mut self, node: Node) -> Self {
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(node);
        }
        self
    }

    /// Close the innermost open composite; closing the root is a no-op
    pub fn end(mut self) -> Self {
        if self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                let node = frame.into_node();
                return self.node(node);
            }
        }
        self
    }

    /// Close everything still open and return the root
    pub fn build(mut self) -> Node {
        while self.stack.len() > 1 {
            self = self.end();
        }
        match self.stack.pop() {
            Some(root) => root.into_node(),
            None => Node::Selector {
                name: String::new(),
                children: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_structure() {
        let tree = TreeBuilder::root_selector("root")
            .sequence("attack")
            .selector("guard")
            .condition(Condition::AttackPending)
            .end()
            .action(Action::Attack)
            .end()
            .action(Action::Hold)
            .build();

        assert_eq!(tree.name(), "root");
        assert_eq!(tree.children().len(), 2);
        let attack = &tree.children()[0];
        assert!(matches!(attack, Node::Sequence { .. }));
        assert_eq!(attack.children()[0].name(), "guard");
        assert_eq!(attack.children()[1], Node::Action(Action::Attack));
    }

    #[test]
    fn test_build_closes_open_frames() {
        let tree = TreeBuilder::root_sequence("root")
            .selector("dangling")
            .action(Action::Hold)
            .build();
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_extra_end_keeps_root() {
        let tree = TreeBuilder::root_selector("root")
            .end()
            .end()
            .action(Action::Patrol)
            .build();
        assert_eq!(tree.children(), &[Node::Action(Action::Patrol)]);
    }
}
