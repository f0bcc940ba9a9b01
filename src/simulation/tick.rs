//! Tick scheduler - owns the world and runs every pass in a fixed order
//!
//! attach trees -> spatial index -> blackboard refresh -> decision trees
//! -> movement -> lifecycle flush
//!
//! Passes never interleave and agents are always visited in ascending id
//! order, so a run is fully determined by its inputs.

use serde::Serialize;

use crate::ai::blackboard::keys;
use crate::ai::brain::{attach_brain, evaluate_brain, Brain};
use crate::ai::presets::TreeKind;
use crate::ai::refresh::refresh_blackboards;
use crate::ai::tree::{Status, TreeContext};
use crate::combat::{apply_hit, CombatProfile, DestroyRequester, Health, HitOutcome};
use crate::core::config::ArenaConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Millis, Tick};
use crate::ecs::World;
use crate::entity::catalog::EntityCatalog;
use crate::entity::factory::EntityFactory;
use crate::entity::faction::FactionTable;
use crate::entity::recipes::{RecipeBook, SpawnOptions};
use crate::render::{EffectTicket, NullView, ViewBridge};
use crate::simulation::effects::EffectTracker;
use crate::simulation::lifecycle::{destroy_agent, ImmediateDestroy, LifecycleManager};
use crate::simulation::movement;
use crate::spatial::SpatialGridIndex;

/// The passes of one tick, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Pass {
    AttachTrees,
    SpatialIndex,
    BlackboardRefresh,
    DecisionTrees,
    Movement,
    Lifecycle,
}

impl Pass {
    pub const ORDER: [Pass; 6] = [
        Pass::AttachTrees,
        Pass::SpatialIndex,
        Pass::BlackboardRefresh,
        Pass::DecisionTrees,
        Pass::Movement,
        Pass::Lifecycle,
    ];
}

/// What happened during one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub now_ms: Millis,
    pub passes: Vec<Pass>,
    pub trees_attached: usize,
    pub index_rebuilt: bool,
    pub blackboards_refreshed: usize,
    pub trees_evaluated: usize,
    pub trees_running: usize,
    /// Agents whose tree hit a missing component this tick
    pub skipped: Vec<EntityId>,
    pub moved: usize,
    pub destroyed: Vec<EntityId>,
    /// Destroy requests for agents that were already gone
    pub stale_destroys: Vec<EntityId>,
}

/// Result of completing an effect ticket
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectCompletion {
    /// Unknown ticket, or one that already completed
    Ignored,
    /// The attacker is gone; nothing happened
    AttackerGone,
    Landed(HitOutcome),
}

type ReadyCallback = Box<dyn FnOnce(&World)>;

/// Assembles a [`Simulation`]
pub struct SimulationBuilder<V: ViewBridge = NullView> {
    config: ArenaConfig,
    factions: FactionTable,
    recipes: RecipeBook,
    catalog: EntityCatalog,
    view: V,
    with_lifecycle: bool,
    on_ready: Vec<ReadyCallback>,
}

impl SimulationBuilder<NullView> {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config,
            factions: FactionTable::standard(),
            recipes: RecipeBook::standard(),
            catalog: EntityCatalog::new(),
            view: NullView,
            with_lifecycle: true,
            on_ready: Vec::new(),
        }
    }
}

impl<V: ViewBridge> SimulationBuilder<V> {
    /// Swap the presentation bridge
    pub fn view<W: ViewBridge>(self, view: W) -> SimulationBuilder<W> {
        SimulationBuilder {
            config: self.config,
            factions: self.factions,
            recipes: self.recipes,
            catalog: self.catalog,
            view,
            with_lifecycle: self.with_lifecycle,
            on_ready: self.on_ready,
        }
    }

    pub fn factions(mut self, factions: FactionTable) -> Self {
        self.factions = factions;
        self
    }

    pub fn recipes(mut self, recipes: RecipeBook) -> Self {
        self.recipes = recipes;
        self
    }

    pub fn catalog(mut self, catalog: EntityCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Run without a lifecycle manager: destroy requests take effect at once
    pub fn without_lifecycle(mut self) -> Self {
        self.with_lifecycle = false;
        self
    }

    /// Called exactly once, when `build` succeeds
    pub fn on_ready(mut self, callback: impl FnOnce(&World) + 'static) -> Self {
        self.on_ready.push(Box::new(callback));
        self
    }

    /// Validate the config (non-fatal) and assemble the simulation
    ///
    /// Fails only on an unusable grid cell size.
    pub fn build(self) -> Result<Simulation<V>> {
        let report = self.config.validate();
        report.log();

        let grid = SpatialGridIndex::new(self.config.spatial_index.cell_size)?;
        let simulation = Simulation {
            world: World::new(),
            grid,
            lifecycle: self.with_lifecycle.then(LifecycleManager::new),
            factions: self.factions,
            factory: EntityFactory::new(self.recipes, self.catalog),
            effects: EffectTracker::new(),
            view: self.view,
            config: self.config,
            tick: 0,
            now_ms: 0,
        };

        for callback in self.on_ready {
            callback(&simulation.world);
        }
        tracing::info!(
            cell_size = simulation.grid.cell_size(),
            lifecycle = simulation.lifecycle.is_some(),
            "simulation ready"
        );
        Ok(simulation)
    }
}

pub struct Simulation<V: ViewBridge = NullView> {
    world: World,
    grid: SpatialGridIndex,
    lifecycle: Option<LifecycleManager>,
    factions: FactionTable,
    factory: EntityFactory,
    effects: EffectTracker,
    view: V,
    config: ArenaConfig,
    tick: Tick,
    now_ms: Millis,
}

impl<V: ViewBridge> Simulation<V> {
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn grid(&self) -> &SpatialGridIndex {
        &self.grid
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn factions(&self) -> &FactionTable {
        &self.factions
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn lifecycle(&self) -> Option<&LifecycleManager> {
        self.lifecycle.as_ref()
    }

    pub fn now_ms(&self) -> Millis {
        self.now_ms
    }

    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    pub fn pending_effects(&self) -> usize {
        self.effects.len()
    }

    /// Create an agent from its recipe
    pub fn spawn(&mut self, kind: &str, options: &SpawnOptions) -> Result<EntityId> {
        self.factory.spawn(
            &mut self.world,
            &mut self.view,
            &mut self.grid,
            &self.config,
            kind,
            options,
        )
    }

    /// Attach the agent's preset tree now instead of waiting for the next tick
    ///
    /// Returns `false` if it already had one.
    pub fn create_decision_tree(&mut self, agent: EntityId) -> Result<bool> {
        let kind = self.tree_kind_of(agent);
        attach_brain(&mut self.world, agent, kind, &self.config)
    }

    /// Queue an agent for destruction at the end of the tick
    ///
    /// Without a lifecycle manager the agent is destroyed right away.
    /// Returns whether the request had any effect.
    pub fn request_destroy(&mut self, id: EntityId) -> bool {
        if let Some(lifecycle) = self.lifecycle.as_mut() {
            return lifecycle.request_destroy(id);
        }
        tracing::warn!(entity = %id, "no lifecycle manager; destroying immediately");
        let destroyed = destroy_agent(&mut self.world, &mut self.view, id);
        if destroyed {
            self.effects.drop_attacker(id);
            self.grid.mark_dirty();
        }
        destroyed
    }

    pub fn mark_spatial_index_dirty(&mut self) {
        self.grid.mark_dirty();
    }

    /// Broad-phase neighbour query, rebuilding the index first if stale
    pub fn query_nearby(&mut self, x: f32, y: f32, radius: f32) -> Vec<EntityId> {
        self.grid.rebuild(&self.world);
        self.grid.query(x, y, radius)
    }

    /// Land the hit parked under `ticket`
    ///
    /// Meant to be called between ticks by whoever drives the view.
    pub fn complete_effect(&mut self, ticket: EffectTicket) -> EffectCompletion {
        let Some(effect) = self.effects.take(ticket) else {
            tracing::warn!(%ticket, "unknown or already completed effect ticket ignored");
            return EffectCompletion::Ignored;
        };
        if !self.world.contains(effect.attacker) {
            tracing::debug!(%ticket, attacker = %effect.attacker, "attacker gone; effect dropped");
            return EffectCompletion::AttackerGone;
        }

        let mut fallback = ImmediateDestroy::new();
        let hit = {
            let requester: &mut dyn DestroyRequester = match self.lifecycle.as_mut() {
                Some(lifecycle) => lifecycle,
                None => &mut fallback,
            };
            apply_hit(&mut self.world, requester, effect.target, effect.damage)
        };
        for id in fallback.apply(&mut self.world, &mut self.view, &mut self.grid) {
            self.effects.drop_attacker(id);
        }

        if let Some(brain) = self.world.get_mut::<Brain>(effect.attacker) {
            let blackboard = &mut brain.blackboard;
            blackboard.set_flag(keys::ATTACK_IN_PROGRESS, false);
            blackboard.set_flag(keys::ATTACK_FINISHED, true);
            if hit.target_cleared() && blackboard.target() == Some(effect.target) {
                blackboard.clear_target();
            }
        }
        tracing::debug!(%ticket, attacker = %effect.attacker, target = %effect.target, ?hit, "effect completed");
        EffectCompletion::Landed(hit)
    }

    /// Complete every effect the view reports as finished
    pub fn pump_view_effects(&mut self) -> usize {
        let finished = self.view.poll_completed();
        let count = finished.len();
        for ticket in finished {
            self.complete_effect(ticket);
        }
        count
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.tick += 1;
        self.now_ms = self
            .now_ms
            .saturating_add((dt.max(0.0) * 1000.0).round() as Millis);

        let mut report = TickReport {
            tick: self.tick,
            now_ms: self.now_ms,
            ..TickReport::default()
        };
        for pass in Pass::ORDER {
            self.run_pass(pass, dt, &mut report);
            report.passes.push(pass);
        }

        tracing::trace!(
            tick = report.tick,
            evaluated = report.trees_evaluated,
            destroyed = report.destroyed.len(),
            "tick complete"
        );
        report
    }

    fn run_pass(&mut self, pass: Pass, dt: f32, report: &mut TickReport) {
        match pass {
            Pass::AttachTrees => {
                let orphans = self
                    .world
                    .entities_matching(|world, id| world.has::<CombatProfile>(id) && !world.has::<Brain>(id));
                for id in orphans {
                    let kind = self.tree_kind_of(id);
                    match attach_brain(&mut self.world, id, kind, &self.config) {
                        Ok(true) => report.trees_attached += 1,
                        Ok(false) => {}
                        Err(err) => tracing::warn!(entity = %id, %err, "could not attach tree"),
                    }
                }
            }
            Pass::SpatialIndex => {
                report.index_rebuilt = self.grid.rebuild(&self.world);
            }
            Pass::BlackboardRefresh => {
                report.blackboards_refreshed =
                    refresh_blackboards(&mut self.world, &self.grid, &self.factions, &self.config);
            }
            Pass::DecisionTrees => self.run_decision_trees(report),
            Pass::Movement => {
                let moved = movement::integrate(&mut self.world, dt);
                if !moved.is_empty() {
                    self.grid.mark_dirty();
                }
                report.moved = moved.len();
            }
            Pass::Lifecycle => {
                if let Some(lifecycle) = self.lifecycle.as_mut() {
                    let flush = lifecycle.flush(&mut self.world, &mut self.view, &mut self.grid);
                    for id in &flush.destroyed {
                        self.effects.drop_attacker(*id);
                    }
                    report.destroyed.extend(flush.destroyed);
                    report.stale_destroys.extend(flush.skipped);
                }
            }
        }
    }

    fn run_decision_trees(&mut self, report: &mut TickReport) {
        let now = self.now_ms;
        for agent in self.world.entities_with::<Brain>() {
            // May have been destroyed earlier in this pass without a lifecycle manager
            if !self.world.contains(agent) {
                continue;
            }
            // Killed earlier this tick and waiting for the lifecycle flush
            if self.world.get::<Health>(agent).is_some_and(|health| !health.is_alive()) {
                continue;
            }

            let mut fallback = ImmediateDestroy::new();
            let result = {
                let destroyer: &mut dyn DestroyRequester = match self.lifecycle.as_mut() {
                    Some(lifecycle) => lifecycle,
                    None => &mut fallback,
                };
                let mut ctx = TreeContext {
                    world: &mut self.world,
                    destroyer,
                    view: &mut self.view,
                    effects: &mut self.effects,
                    config: &self.config,
                    now,
                };
                evaluate_brain(agent, &mut ctx)
            };

            match result {
                Ok(Some(status)) => {
                    report.trees_evaluated += 1;
                    if status == Status::Running {
                        report.trees_running += 1;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(entity = %agent, %err, "decision tree skipped this tick");
                    report.skipped.push(agent);
                }
            }

            let destroyed = fallback.apply(&mut self.world, &mut self.view, &mut self.grid);
            for id in destroyed {
                self.effects.drop_attacker(id);
                report.destroyed.push(id);
            }
        }
    }

    fn tree_kind_of(&self, id: EntityId) -> TreeKind {
        self.world
            .kind_of(id)
            .and_then(|kind| self.factory.recipes().tree_kind(kind))
            .unwrap_or(TreeKind::Chaser)
    }
}
