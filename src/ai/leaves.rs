//! Condition and action leaves
//!
//! Leaves read and write the agent's blackboard and components through the
//! [`TreeContext`]. A leaf that needs a component the agent does not have
//! returns an error instead of guessing.

use glam::Vec3;

use crate::ai::blackboard::{keys, AgentState, Blackboard, BlackboardValue};
use crate::ai::tree::{Status, TreeContext};
use crate::combat::{apply_hit, begin_attack, can_attack, is_alive, AttackStart, CombatProfile, Health};
use crate::core::error::Result;
use crate::core::types::{planar_distance, EntityId};
use crate::entity::components::{Transform, Velocity};
use crate::render::RenderHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// An animation-gated attack is in flight or finished but unacknowledged
    AttackPending,
    /// A target is recorded and alive; a dead or missing one is forgotten
    HasLiveTarget,
    TargetInAttackRange,
    /// Attack cooldown has elapsed
    AttackReady,
    HasEnemies,
    /// Alive and below max health
    NeedsRepair,
    RepairReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Attack,
    /// Move straight at the target until inside attack range
    Chase,
    /// Target the nearest live enemy
    SearchNearest,
    /// Target the nearest live enemy inside attack range, else drop the target
    SearchInRange,
    Repair,
    /// Idle while applying the patrol (or configured idle) velocity
    Patrol,
    /// Idle without touching velocity
    Hold,
}

impl Condition {
    pub fn name(&self) -> &'static str {
        match self {
            Condition::AttackPending => "attack_pending",
            Condition::HasLiveTarget => "has_live_target",
            Condition::TargetInAttackRange => "target_in_attack_range",
            Condition::AttackReady => "attack_ready",
            Condition::HasEnemies => "has_enemies",
            Condition::NeedsRepair => "needs_repair",
            Condition::RepairReady => "repair_ready",
        }
    }

    pub fn check(
        &self,
        agent: EntityId,
        blackboard: &mut Blackboard,
        ctx: &mut TreeContext<'_>,
    ) -> Result<bool> {
        match self {
            Condition::AttackPending => Ok(blackboard.flag(keys::ATTACK_IN_PROGRESS)
                || blackboard.flag(keys::ATTACK_FINISHED)),

            Condition::HasLiveTarget => match blackboard.target() {
                None => Ok(false),
                Some(target) if is_alive(ctx.world, target) => Ok(true),
                Some(_) => {
                    blackboard.clear_target();
                    Ok(false)
                }
            },

            Condition::TargetInAttackRange => {
                let Some(target) = blackboard.target() else {
                    return Ok(false);
                };
                let Some(target_pos) = ctx.world.get::<Transform>(target).map(|t| t.position) else {
                    return Ok(false);
                };
                let own = ctx.world.require::<Transform>(agent)?.position;
                Ok(planar_distance(own, target_pos) <= attack_range(blackboard, ctx))
            }

            Condition::AttackReady => {
                let profile = ctx.world.require::<CombatProfile>(agent)?;
                Ok(can_attack(profile, ctx.now))
            }

            Condition::HasEnemies => Ok(!blackboard.entities(keys::ENEMIES).is_empty()),

            Condition::NeedsRepair => {
                let health = ctx.world.require::<Health>(agent)?;
                Ok(health.is_alive() && health.current < health.max)
            }

            Condition::RepairReady => {
                let cooldown = blackboard
                    .timestamp(keys::REPAIR_COOLDOWN_MS)
                    .unwrap_or(ctx.config.defense.repair_cooldown_ms);
                Ok(match blackboard.timestamp(keys::LAST_REPAIR_MS) {
                    None => true,
                    Some(last) => ctx.now.saturating_sub(last) >= cooldown,
                })
            }
        }
    }
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Attack => "attack",
            Action::Chase => "chase",
            Action::SearchNearest => "search_nearest",
            Action::SearchInRange => "search_in_range",
            Action::Repair => "repair",
            Action::Patrol => "patrol",
            Action::Hold => "hold",
        }
    }

    pub fn run(
        &self,
        agent: EntityId,
        blackboard: &mut Blackboard,
        ctx: &mut TreeContext<'_>,
    ) -> Result<Status> {
        match self {
            Action::Attack => attack(agent, blackboard, ctx),
            Action::Chase => chase(agent, blackboard, ctx),
            Action::SearchNearest => search(agent, blackboard, ctx, None),
            Action::SearchInRange => {
                let range = attack_range(blackboard, ctx);
                search(agent, blackboard, ctx, Some(range))
            }
            Action::Repair => repair(agent, blackboard, ctx),
            Action::Patrol => {
                let patrol = blackboard.vector(keys::PATROL_VELOCITY).unwrap_or_else(|| {
                    let [x, y] = ctx.config.ai.idle_velocity;
                    Vec3::new(x, y, 0.0)
                });
                if let Some(velocity) = ctx.world.get_mut::<Velocity>(agent) {
                    velocity.linear = patrol;
                }
                blackboard.set_state(AgentState::Idle);
                Ok(Status::Success)
            }
            Action::Hold => {
                blackboard.set_state(AgentState::Idle);
                Ok(Status::Success)
            }
        }
    }
}

/// Range from the blackboard, falling back to the configured default
fn attack_range(blackboard: &Blackboard, ctx: &TreeContext<'_>) -> f32 {
    blackboard
        .number(keys::ATTACK_RANGE)
        .unwrap_or(ctx.config.ai.attack_range)
}

fn attack(agent: EntityId, blackboard: &mut Blackboard, ctx: &mut TreeContext<'_>) -> Result<Status> {
    blackboard.set_state(AgentState::Attacking);

    if blackboard.flag(keys::ATTACK_FINISHED) {
        blackboard.set_flag(keys::ATTACK_FINISHED, false);
        return Ok(Status::Success);
    }
    if blackboard.flag(keys::ATTACK_IN_PROGRESS) {
        return Ok(Status::Running);
    }

    let Some(target) = blackboard.target() else {
        return Ok(Status::Failure);
    };
    let damage = match begin_attack(ctx.world, agent, target, ctx.now)? {
        AttackStart::Ready { damage } => damage,
        AttackStart::OnCooldown => return Ok(Status::Failure),
        AttackStart::TargetInvalid => {
            blackboard.clear_target();
            return Ok(Status::Failure);
        }
    };

    if let Some(velocity) = ctx.world.get_mut::<Velocity>(agent) {
        velocity.stop();
    }

    if let Some(handle) = ctx.world.get::<RenderHandle>(agent).map(|render| render.handle) {
        let ticket = ctx.effects.issue(agent, target, damage);
        if ctx.view.play_animation(handle, &ctx.config.ai.attack_animation, ticket) {
            blackboard.set_flag(keys::ATTACK_IN_PROGRESS, true);
            tracing::debug!(agent = %agent, target = %target, %ticket, "attack animation started");
            return Ok(Status::Running);
        }
        ctx.effects.cancel(ticket);
    }

    let hit = apply_hit(ctx.world, ctx.destroyer, target, damage);
    tracing::debug!(agent = %agent, target = %target, ?hit, "attack landed");
    if hit.target_cleared() {
        blackboard.clear_target();
    }
    Ok(Status::Success)
}

fn chase(agent: EntityId, blackboard: &mut Blackboard, ctx: &mut TreeContext<'_>) -> Result<Status> {
    let Some(target) = blackboard.target() else {
        return Ok(Status::Failure);
    };
    let Some(target_pos) = ctx.world.get::<Transform>(target).map(|t| t.position) else {
        blackboard.clear_target();
        return Ok(Status::Failure);
    };
    let own = ctx.world.require::<Transform>(agent)?.position;
    let range = attack_range(blackboard, ctx);

    let offset = (target_pos - own).truncate();
    let velocity = ctx.world.require_mut::<Velocity>(agent)?;
    if offset.length() > range {
        velocity.linear = offset.normalize_or_zero().extend(0.0) * velocity.max_speed;
        blackboard.set_state(AgentState::Chasing);
        Ok(Status::Running)
    } else {
        velocity.stop();
        Ok(Status::Success)
    }
}

/// Pick the closest live enemy; ties keep the lowest id
fn search(
    agent: EntityId,
    blackboard: &mut Blackboard,
    ctx: &mut TreeContext<'_>,
    within: Option<f32>,
) -> Result<Status> {
    blackboard.set_state(AgentState::Searching);
    let own = ctx.world.require::<Transform>(agent)?.position;

    let mut best: Option<(EntityId, f32)> = None;
    for &enemy in blackboard.entities(keys::ENEMIES) {
        if !is_alive(ctx.world, enemy) {
            continue;
        }
        let Some(transform) = ctx.world.get::<Transform>(enemy) else {
            continue;
        };
        let distance = planar_distance(own, transform.position);
        if within.is_some_and(|range| distance > range) {
            continue;
        }
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((enemy, distance));
        }
    }

    match best {
        Some((enemy, distance)) => {
            tracing::debug!(agent = %agent, target = %enemy, distance, "target acquired");
            blackboard.set_target(enemy);
            Ok(Status::Success)
        }
        None => {
            if within.is_some() {
                blackboard.clear_target();
            }
            Ok(Status::Failure)
        }
    }
}

fn repair(agent: EntityId, blackboard: &mut Blackboard, ctx: &mut TreeContext<'_>) -> Result<Status> {
    let amount = blackboard
        .number(keys::REPAIR_AMOUNT)
        .unwrap_or(ctx.config.defense.repair_amount);
    let health = ctx.world.require_mut::<Health>(agent)?;
    let healed = health.heal(amount);

    blackboard.set(keys::LAST_REPAIR_MS, BlackboardValue::Timestamp(ctx.now));
    blackboard.set_state(AgentState::Idle);
    tracing::debug!(agent = %agent, healed, "auto-repair");
    Ok(Status::Success)
}
