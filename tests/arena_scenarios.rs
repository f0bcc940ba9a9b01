//! End-to-end arena scenarios
//!
//! Each test drives a full `Simulation` through `tick` and checks what the
//! agents ended up doing.

use glam::Vec3;

use skirmish::ai::{keys, AgentState, Brain};
use skirmish::combat::{Health, HitOutcome};
use skirmish::core::{ArenaConfig, ArenaError, EntityId};
use skirmish::entity::{Faction, SpawnOptions, Transform, Velocity};
use skirmish::render::{DelayedView, EffectTicket, ViewBridge};
use skirmish::simulation::{EffectCompletion, Simulation, SimulationBuilder};

fn arena() -> Simulation {
    SimulationBuilder::new(ArenaConfig::default()).build().unwrap()
}

fn animated_arena(delay: u32) -> Simulation<DelayedView> {
    SimulationBuilder::new(ArenaConfig::default())
        .view(DelayedView::new(delay))
        .build()
        .unwrap()
}

fn spawn<V: ViewBridge>(sim: &mut Simulation<V>, kind: &str, x: f32, faction: Faction) -> EntityId {
    sim.spawn(kind, &SpawnOptions::at(x, 0.0).faction(faction)).unwrap()
}

fn state_of<V: ViewBridge>(sim: &Simulation<V>, id: EntityId) -> Option<AgentState> {
    sim.world().get::<Brain>(id).and_then(|brain| brain.blackboard.state())
}

fn health_of<V: ViewBridge>(sim: &Simulation<V>, id: EntityId) -> f32 {
    sim.world().get::<Health>(id).unwrap().current
}

#[test]
fn test_duel_to_the_death() {
    let mut sim = arena();
    let a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    let b = spawn(&mut sim, "chaser", 30.0, Faction::Player2);
    sim.world_mut().get_mut::<Health>(b).unwrap().current = 15.0;

    // First tick: both pick a target
    sim.tick(1.0);
    let target = sim.world().get::<Brain>(a).unwrap().blackboard.target();
    assert_eq!(target, Some(b));

    // Second tick: both swing
    let report = sim.tick(1.0);
    assert!(report.destroyed.is_empty());
    assert_eq!(health_of(&sim, b), 5.0);
    assert_eq!(health_of(&sim, a), 90.0);

    // Third tick: a lands the killing blow; b is dead and never swings back
    let report = sim.tick(1.0);
    assert_eq!(report.destroyed, vec![b]);
    assert!(!sim.world().contains(b));
    assert_eq!(health_of(&sim, a), 90.0);
    assert_eq!(sim.world().get::<Brain>(a).unwrap().blackboard.target(), None);

    // Nobody left to fight
    sim.tick(1.0);
    assert_eq!(state_of(&sim, a), Some(AgentState::Idle));
}

#[test]
fn test_cooldown_limits_attack_rate() {
    let mut sim = arena();
    let a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    let base = spawn(&mut sim, "base", 30.0, Faction::Player2);

    // 100 ms ticks for two simulated seconds: target, then one swing per second
    for _ in 0..20 {
        sim.tick(0.1);
    }
    let max = sim.world().get::<Health>(base).unwrap().max;
    assert_eq!(health_of(&sim, base), max - 20.0);
    assert_eq!(state_of(&sim, a), Some(AgentState::Attacking));
}

#[test]
fn test_lone_agent_idles_with_configured_velocity() {
    let mut config = ArenaConfig::default();
    config.ai.idle_velocity = [2.0, -1.0];
    let mut sim = SimulationBuilder::new(config).build().unwrap();

    let a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    // Far outside the search radius
    let _far = spawn(&mut sim, "chaser", 1000.0, Faction::Player2);

    sim.tick(0.1);
    assert_eq!(state_of(&sim, a), Some(AgentState::Idle));
    assert_eq!(sim.world().get::<Velocity>(a).unwrap().linear, Vec3::new(2.0, -1.0, 0.0));
}

#[test]
fn test_patrol_velocity_overrides_idle_default() {
    let mut sim = arena();
    let options = SpawnOptions::at(-500.0, 0.0)
        .faction(Faction::Player1)
        .patrol(Vec3::new(10.0, 0.0, 0.0));
    let a = sim.spawn("chaser", &options).unwrap();

    sim.tick(1.0);
    assert_eq!(sim.world().get::<Velocity>(a).unwrap().linear, Vec3::new(10.0, 0.0, 0.0));
    let position = sim.world().get::<Transform>(a).unwrap().position;
    assert_eq!(position, Vec3::new(-490.0, 0.0, 0.0));
}

#[test]
fn test_chase_hands_off_to_attack() {
    let mut sim = arena();
    let a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    let base = spawn(&mut sim, "base", 100.0, Faction::Player2);
    let max = sim.world().get::<Health>(base).unwrap().max;

    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(state_of(&sim, a), Some(AgentState::Chasing));
    assert_eq!(sim.world().get::<Velocity>(a).unwrap().linear, Vec3::new(10.0, 0.0, 0.0));

    let mut ticks = 0;
    while state_of(&sim, a) != Some(AgentState::Attacking) {
        sim.tick(1.0);
        ticks += 1;
        assert!(ticks < 20, "chaser never reached its target");
    }

    // Stopped at the edge of attack range and swung once
    let position = sim.world().get::<Transform>(a).unwrap().position;
    assert!((position.x - 50.0).abs() < 1e-3, "stopped at {}", position.x);
    assert_eq!(sim.world().get::<Velocity>(a).unwrap().linear, Vec3::ZERO);
    assert_eq!(health_of(&sim, base), max - 10.0);
}

#[test]
fn test_animation_gates_the_hit() {
    let mut sim = animated_arena(2);
    let a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    let base = spawn(&mut sim, "base", 30.0, Faction::Player2);
    let max = sim.world().get::<Health>(base).unwrap().max;

    sim.tick(1.0);
    assert_eq!(sim.pump_view_effects(), 0);

    // Animation starts; no damage yet
    let report = sim.tick(1.0);
    assert_eq!(report.trees_running, 1);
    assert_eq!(sim.pending_effects(), 1);
    assert_eq!(sim.view().in_flight(), 1);
    assert_eq!(sim.pump_view_effects(), 0);
    assert_eq!(health_of(&sim, base), max);

    // Still playing: the tree waits instead of swinging again
    sim.tick(1.0);
    assert_eq!(sim.view().played(), 1);
    assert_eq!(sim.pump_view_effects(), 1);
    assert_eq!(health_of(&sim, base), max - 10.0);
    assert_eq!(sim.pending_effects(), 0);
    let blackboard = &sim.world().get::<Brain>(a).unwrap().blackboard;
    assert!(blackboard.flag(keys::ATTACK_FINISHED));
    assert!(!blackboard.flag(keys::ATTACK_IN_PROGRESS));

    // Completion acknowledged, then the next swing once the cooldown allows
    sim.tick(1.0);
    assert!(!sim.world().get::<Brain>(a).unwrap().blackboard.flag(keys::ATTACK_FINISHED));
    sim.tick(1.0);
    assert_eq!(sim.view().played(), 2);
}

#[test]
fn test_effect_for_vanished_attacker_does_nothing() {
    let mut sim = animated_arena(5);
    let a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    let base = spawn(&mut sim, "base", 30.0, Faction::Player2);
    let max = sim.world().get::<Health>(base).unwrap().max;

    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(sim.pending_effects(), 1);

    // Removed behind the lifecycle manager's back
    assert!(sim.world_mut().despawn(a));
    assert_eq!(sim.complete_effect(EffectTicket(1)), EffectCompletion::AttackerGone);
    assert_eq!(health_of(&sim, base), max);
    assert_eq!(sim.complete_effect(EffectTicket(1)), EffectCompletion::Ignored);
}

#[test]
fn test_destroyed_attacker_drops_its_effects() {
    let mut sim = animated_arena(3);
    let a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    let base = spawn(&mut sim, "base", 30.0, Faction::Player2);
    let max = sim.world().get::<Health>(base).unwrap().max;

    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(sim.pending_effects(), 1);

    assert!(sim.request_destroy(a));
    let report = sim.tick(1.0);
    assert_eq!(report.destroyed, vec![a]);
    assert_eq!(sim.pending_effects(), 0);
    assert_eq!(sim.view().released().len(), 1);

    for _ in 0..5 {
        sim.pump_view_effects();
    }
    assert_eq!(health_of(&sim, base), max);
}

#[test]
fn test_completed_effect_can_kill() {
    let mut sim = animated_arena(1);
    let _a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    let b = spawn(&mut sim, "base", 30.0, Faction::Player2);
    sim.world_mut().get_mut::<Health>(b).unwrap().current = 5.0;

    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(sim.pending_effects(), 1);
    assert_eq!(sim.complete_effect(EffectTicket(1)), EffectCompletion::Landed(HitOutcome::Killed));
    assert!(sim.lifecycle().unwrap().is_pending(b));

    let report = sim.tick(1.0);
    assert_eq!(report.destroyed, vec![b]);
}

#[test]
fn test_outpost_repairs_on_cooldown() {
    let mut sim = arena();
    let outpost = spawn(&mut sim, "outpost", 0.0, Faction::Player1);
    let max = sim.world().get::<Health>(outpost).unwrap().max;
    sim.world_mut().get_mut::<Health>(outpost).unwrap().current = max - 10.0;

    sim.tick(1.0);
    assert_eq!(health_of(&sim, outpost), max - 9.0);

    // Half the repair cooldown: nothing
    sim.tick(0.5);
    assert_eq!(health_of(&sim, outpost), max - 9.0);
    assert_eq!(state_of(&sim, outpost), Some(AgentState::Idle));

    sim.tick(0.5);
    assert_eq!(health_of(&sim, outpost), max - 8.0);
}

#[test]
fn test_outpost_holds_position_and_fires_in_range() {
    let mut sim = arena();
    let outpost = spawn(&mut sim, "outpost", 0.0, Faction::Player1);
    let base = spawn(&mut sim, "base", 90.0, Faction::Player2);
    let far_base = spawn(&mut sim, "base", 150.0, Faction::Player2);
    let max = sim.world().get::<Health>(base).unwrap().max;

    sim.tick(1.0);
    sim.tick(1.0);

    // Range 100: the near base is hit, the far one is searched for but ignored
    assert_eq!(health_of(&sim, base), max - 10.0);
    assert_eq!(health_of(&sim, far_base), max);
    assert_eq!(sim.world().get::<Transform>(outpost).unwrap().position, Vec3::ZERO);
}

#[test]
fn test_allies_are_never_targeted() {
    let mut sim = arena();
    let a = spawn(&mut sim, "chaser", 0.0, Faction::Player1);
    let friend = spawn(&mut sim, "chaser", 20.0, Faction::Player1);

    for _ in 0..5 {
        sim.tick(1.0);
    }
    assert_eq!(sim.world().get::<Brain>(a).unwrap().blackboard.target(), None);
    assert_eq!(health_of(&sim, friend), 100.0);
    assert_eq!(health_of(&sim, a), 100.0);
}

#[test]
fn test_unknown_type_is_rejected() {
    let mut sim = arena();
    let result = sim.spawn("dragon", &SpawnOptions::at(0.0, 0.0));
    assert!(matches!(result, Err(ArenaError::UnknownEntityType(name)) if name == "dragon"));
    assert!(sim.world().is_empty());
}
