//! Per-agent key/value memory shared by the nodes of one decision tree

use ahash::AHashMap;
use glam::Vec3;
use std::fmt;

use crate::core::types::{EntityId, Millis};

/// Well-known blackboard keys
pub mod keys {
    /// `Entity`: current attack/chase target
    pub const TARGET: &str = "target";
    /// `Entities`: hostile agents near this one, refreshed every tick
    pub const ENEMIES: &str = "enemies";
    /// `Number`: range used by chase and attack checks
    pub const ATTACK_RANGE: &str = "attack_range";
    /// `Bool`: an animation-gated attack is waiting for its effect
    pub const ATTACK_IN_PROGRESS: &str = "attack_in_progress";
    /// `Bool`: the pending effect completed and has not been acknowledged
    pub const ATTACK_FINISHED: &str = "attack_finished";
    /// `Vector`: velocity written while idle
    pub const PATROL_VELOCITY: &str = "patrol_velocity";
    /// `Timestamp`: clock reading of the last repair
    pub const LAST_REPAIR_MS: &str = "last_repair_ms";
    /// `Timestamp`: minimum time between repairs
    pub const REPAIR_COOLDOWN_MS: &str = "repair_cooldown_ms";
    /// `Number`: health restored per repair
    pub const REPAIR_AMOUNT: &str = "repair_amount";
    /// `State`: what the agent did last tick
    pub const STATE: &str = "state";
}

/// Coarse description of what an agent is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentState {
    Idle,
    Searching,
    Chasing,
    Attacking,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Idle => "idle",
            AgentState::Searching => "searching",
            AgentState::Chasing => "chasing",
            AgentState::Attacking => "attacking",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlackboardValue {
    Bool(bool),
    Number(f32),
    Entity(EntityId),
    Entities(Vec<EntityId>),
    Vector(Vec3),
    Timestamp(Millis),
    State(AgentState),
}

#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    values: AHashMap<String, BlackboardValue>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: BlackboardValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&BlackboardValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<BlackboardValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Missing or non-bool entries read as `false`
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(BlackboardValue::Bool(true)))
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.set(key, BlackboardValue::Bool(value));
    }

    pub fn number(&self, key: &str) -> Option<f32> {
        match self.get(key) {
            Some(BlackboardValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn entity(&self, key: &str) -> Option<EntityId> {
        match self.get(key) {
            Some(BlackboardValue::Entity(id)) => Some(*id),
            _ => None,
        }
    }

    /// Empty slice when missing
    pub fn entities(&self, key: &str) -> &[EntityId] {
        match self.get(key) {
            Some(BlackboardValue::Entities(ids)) => ids,
            _ => &[],
        }
    }

    pub fn vector(&self, key: &str) -> Option<Vec3> {
        match self.get(key) {
            Some(BlackboardValue::Vector(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn timestamp(&self, key: &str) -> Option<Millis> {
        match self.get(key) {
            Some(BlackboardValue::Timestamp(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<EntityId> {
        self.entity(keys::TARGET)
    }

    pub fn set_target(&mut self, id: EntityId) {
        self.set(keys::TARGET, BlackboardValue::Entity(id));
    }

    pub fn clear_target(&mut self) {
        self.remove(keys::TARGET);
    }

    pub fn state(&self) -> Option<AgentState> {
        match self.get(keys::STATE) {
            Some(BlackboardValue::State(state)) => Some(*state),
            _ => None,
        }
    }

    pub fn set_state(&mut self, state: AgentState) {
        self.set(keys::STATE, BlackboardValue::State(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads_reject_wrong_variant() {
        let mut bb = Blackboard::new();
        bb.set(keys::ATTACK_RANGE, BlackboardValue::Bool(true));
        assert_eq!(bb.number(keys::ATTACK_RANGE), None);
        assert!(bb.flag(keys::ATTACK_RANGE));

        bb.set(keys::ATTACK_RANGE, BlackboardValue::Number(75.0));
        assert_eq!(bb.number(keys::ATTACK_RANGE), Some(75.0));
        assert!(!bb.flag(keys::ATTACK_RANGE));
    }

    #[test]
    fn test_missing_entities_is_empty() {
        let bb = Blackboard::new();
        assert!(bb.entities(keys::ENEMIES).is_empty());
        assert!(!bb.flag(keys::ATTACK_IN_PROGRESS));
    }

    #[test]
    fn test_target_helpers() {
        let mut bb = Blackboard::new();
        bb.set_target(EntityId(3));
        assert_eq!(bb.target(), Some(EntityId(3)));
        bb.clear_target();
        assert_eq!(bb.target(), None);
        assert!(bb.is_empty());
    }

    #[test]
    fn test_state_round_trip() {
        let mut bb = Blackboard::new();
        assert_eq!(bb.state(), None);
        bb.set_state(AgentState::Chasing);
        assert_eq!(bb.state(), Some(AgentState::Chasing));
        assert_eq!(AgentState::Chasing.to_string(), "chasing");
    }
}
