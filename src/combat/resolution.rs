//! Cooldown-gated attack resolution
//!
//! An attack is split in two halves so that the hit can land later than the
//! attempt (e.g. when an attack animation finishes):
//! - [`begin_attack`] checks the cooldown and target, and records the attempt
//! - [`apply_hit`] subtracts health and requests destruction on death
//!
//! [`attempt_attack`] runs both back to back. Nothing here destroys an agent;
//! deaths are handed to a [`DestroyRequester`].

use crate::combat::state::{CombatProfile, Health};
use crate::core::error::Result;
use crate::core::types::{EntityId, Millis};
use crate::ecs::World;

/// Anything that accepts deferred destroy requests
pub trait DestroyRequester {
    /// Queue `id` for destruction. Returns `true` if it was not queued yet.
    fn request_destroy(&mut self, id: EntityId) -> bool;
}

/// What happened when a hit landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    Damaged { remaining: f32 },
    /// Target is invincible
    Blocked,
    /// Target reached zero health and was queued for destruction
    Killed,
    /// Target no longer exists, has no health or was already dead
    TargetGone,
}

impl HitOutcome {
    /// Whether the attacker should drop its reference to the target
    pub fn target_cleared(&self) -> bool {
        matches!(self, HitOutcome::Killed | HitOutcome::TargetGone)
    }
}

/// Result of the first half of an attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackStart {
    /// Attempt recorded; `damage` should be applied to the target
    Ready { damage: f32 },
    OnCooldown,
    /// Target missing or not alive; nothing was recorded
    TargetInvalid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    OnCooldown,
    TargetInvalid,
    Hit(HitOutcome),
}

impl AttackOutcome {
    pub fn target_cleared(&self) -> bool {
        match self {
            AttackOutcome::Hit(hit) => hit.target_cleared(),
            AttackOutcome::TargetInvalid => true,
            AttackOutcome::OnCooldown => false,
        }
    }
}

/// Has the cooldown elapsed since the last attempt?
#[inline]
pub fn can_attack(profile: &CombatProfile, now: Millis) -> bool {
    match profile.last_attack_ms {
        None => true,
        Some(last) => now.saturating_sub(last) >= profile.attack_cooldown_ms,
    }
}

pub fn is_alive(world: &World, id: EntityId) -> bool {
    world.get::<Health>(id).is_some_and(|health| health.is_alive())
}

/// Validate and record an attack attempt
///
/// Errors only when the attacker has no `CombatProfile`.
pub fn begin_attack(
    world: &mut World,
    attacker: EntityId,
    target: EntityId,
    now: Millis,
) -> Result<AttackStart> {
    let profile = *world.require::<CombatProfile>(attacker)?;
    if !can_attack(&profile, now) {
        return Ok(AttackStart::OnCooldown);
    }
    if !is_alive(world, target) {
        return Ok(AttackStart::TargetInvalid);
    }

    world.require_mut::<CombatProfile>(attacker)?.last_attack_ms = Some(now);
    Ok(AttackStart::Ready {
        damage: profile.attack_damage,
    })
}

/// Land `damage` on `target`
pub fn apply_hit(
    world: &mut World,
    requester: &mut dyn DestroyRequester,
    target: EntityId,
    damage: f32,
) -> HitOutcome {
    let Some(health) = world.get_mut::<Health>(target) else {
        return HitOutcome::TargetGone;
    };
    if !health.is_alive() {
        return HitOutcome::TargetGone;
    }
    if health.invincible {
        return HitOutcome::Blocked;
    }

    health.take_damage(damage);
    if health.is_alive() {
        return HitOutcome::Damaged {
            remaining: health.current,
        };
    }

    tracing::debug!(target = %target, "target killed");
    requester.request_destroy(target);
    HitOutcome::Killed
}

/// Attempt and land an attack immediately
pub fn attempt_attack(
    world: &mut World,
    requester: &mut dyn DestroyRequester,
    attacker: EntityId,
    target: EntityId,
    now: Millis,
) -> Result<AttackOutcome> {
    match begin_attack(world, attacker, target, now)? {
        AttackStart::OnCooldown => Ok(AttackOutcome::OnCooldown),
        AttackStart::TargetInvalid => Ok(AttackOutcome::TargetInvalid),
        AttackStart::Ready { damage } => {
            Ok(AttackOutcome::Hit(apply_hit(world, requester, target, damage)))
        }
    }
}
