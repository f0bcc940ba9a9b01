//! The per-agent decision tree component

use crate::ai::blackboard::{keys, Blackboard, BlackboardValue};
use crate::ai::presets::TreeKind;
use crate::ai::tree::{Node, Status, TreeContext};
use crate::combat::CombatProfile;
use crate::core::config::ArenaConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::EntityId;
use crate::ecs::{Component, World};

/// How far an agent looks for enemies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchScope {
    /// Fixed radius in world units
    Radius(f32),
    /// Multiple of the agent's attack range
    AttackRangeFactor(f32),
}

impl SearchScope {
    pub fn radius(&self, attack_range: f32) -> f32 {
        match self {
            SearchScope::Radius(radius) => *radius,
            SearchScope::AttackRangeFactor(factor) => attack_range * factor,
        }
    }
}

/// A decision tree plus the blackboard only it writes to
#[derive(Debug, Clone)]
pub struct Brain {
    pub kind: TreeKind,
    pub root: Node,
    pub blackboard: Blackboard,
    pub search: SearchScope,
}

impl Component for Brain {
    const NAME: &'static str = "Brain";
}

impl Brain {
    /// Build the preset for `kind` with a freshly seeded blackboard
    pub fn new(kind: TreeKind, config: &ArenaConfig, profile: Option<&CombatProfile>) -> Self {
        let mut blackboard = Blackboard::new();
        let attack_range = profile.map_or(config.ai.attack_range, |p| p.attack_range);
        blackboard.set(keys::ATTACK_RANGE, BlackboardValue::Number(attack_range));

        let search = match kind {
            TreeKind::Chaser => SearchScope::Radius(config.ai.search_radius),
            TreeKind::Defense => {
                blackboard.set(
                    keys::REPAIR_COOLDOWN_MS,
                    BlackboardValue::Timestamp(config.defense.repair_cooldown_ms),
                );
                blackboard.set(
                    keys::REPAIR_AMOUNT,
                    BlackboardValue::Number(config.defense.repair_amount),
                );
                SearchScope::AttackRangeFactor(config.defense.search_factor)
            }
        };

        Self {
            kind,
            root: kind.tree(),
            blackboard,
            search,
        }
    }

    /// Radius the blackboard refresh should query with
    pub fn search_radius(&self, fallback_range: f32) -> f32 {
        let range = self
            .blackboard
            .number(keys::ATTACK_RANGE)
            .unwrap_or(fallback_range);
        self.search.radius(range)
    }
}

/// Attach a fresh brain unless the agent already has one
///
/// Returns whether a brain was attached.
pub fn attach_brain(world: &mut World, id: EntityId, kind: TreeKind, config: &ArenaConfig) -> Result<bool> {
    if !world.contains(id) {
        return Err(ArenaError::EntityNotFound(id));
    }
    if world.has::<Brain>(id) {
        return Ok(false);
    }
    let brain = Brain::new(kind, config, world.get::<CombatProfile>(id));
    world.insert(id, brain)?;
    tracing::debug!(entity = %id, ?kind, "decision tree attached");
    Ok(true)
}

/// Run one agent's tree
///
/// The brain is lifted out of the world for the duration so leaves can
/// borrow the world mutably. `Ok(None)` means the agent has no brain.
pub fn evaluate_brain(agent: EntityId, ctx: &mut TreeContext<'_>) -> Result<Option<Status>> {
    let Some(mut brain) = ctx.world.remove::<Brain>(agent) else {
        return Ok(None);
    };
    let result = brain.root.evaluate(agent, &mut brain.blackboard, ctx);
    if ctx.world.contains(agent) {
        ctx.world.insert(agent, brain)?;
    }
    result.map(Some)
}
