//! Pending animation-gated attacks
//!
//! When an attack is handed to the view as an animation, the hit is parked
//! here under a fresh ticket until the view reports the animation done.

use std::collections::BTreeMap;

use crate::core::types::EntityId;
use crate::render::EffectTicket;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingEffect {
    pub attacker: EntityId,
    pub target: EntityId,
    pub damage: f32,
}

#[derive(Debug, Default)]
pub struct EffectTracker {
    next_ticket: u64,
    pending: BTreeMap<EffectTicket, PendingEffect>,
}

impl EffectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a hit and hand out its ticket
    pub fn issue(&mut self, attacker: EntityId, target: EntityId, damage: f32) -> EffectTicket {
        self.next_ticket += 1;
        let ticket = EffectTicket(self.next_ticket);
        self.pending.insert(
            ticket,
            PendingEffect {
                attacker,
                target,
                damage,
            },
        );
        ticket
    }

    /// Claim a parked hit; `None` if unknown or already claimed
    pub fn take(&mut self, ticket: EffectTicket) -> Option<PendingEffect> {
        self.pending.remove(&ticket)
    }

    /// Drop a ticket whose animation never started
    pub fn cancel(&mut self, ticket: EffectTicket) {
        self.pending.remove(&ticket);
    }

    /// Forget every hit `attacker` still has in flight
    pub fn drop_attacker(&mut self, attacker: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, effect| effect.attacker != attacker);
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
