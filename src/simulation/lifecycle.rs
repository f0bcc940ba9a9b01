//! Deferred agent destruction
//!
//! Nothing is destroyed while a pass is iterating. Requests are queued in an
//! ordered set (so repeated requests collapse) and flushed once at the end of
//! the tick.

use std::collections::BTreeSet;

use crate::combat::DestroyRequester;
use crate::core::types::EntityId;
use crate::ecs::World;
use crate::render::{RenderHandle, ViewBridge};
use crate::spatial::SpatialGridIndex;

/// Outcome of one flush
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Agents actually removed, ascending
    pub destroyed: Vec<EntityId>,
    /// Queued ids that no longer existed
    pub skipped: Vec<EntityId>,
}

#[derive(Debug, Default)]
pub struct LifecycleManager {
    pending: BTreeSet<EntityId>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, id: EntityId) -> bool {
        self.pending.contains(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Destroy everything queued, then mark the grid dirty
    pub fn flush(
        &mut self,
        world: &mut World,
        view: &mut dyn ViewBridge,
        grid: &mut SpatialGridIndex,
    ) -> FlushReport {
        let mut report = FlushReport::default();
        if self.pending.is_empty() {
            return report;
        }

        for id in std::mem::take(&mut self.pending) {
            if destroy_agent(world, view, id) {
                report.destroyed.push(id);
            } else {
                tracing::warn!(entity = %id, "destroy requested for missing agent; skipped");
                report.skipped.push(id);
            }
        }

        grid.mark_dirty();
        tracing::debug!(
            destroyed = report.destroyed.len(),
            skipped = report.skipped.len(),
            "lifecycle flush"
        );
        report
    }
}

impl DestroyRequester for LifecycleManager {
    fn request_destroy(&mut self, id: EntityId) -> bool {
        self.pending.insert(id)
    }
}

/// Release the agent's view node and remove it from the world
pub fn destroy_agent(world: &mut World, view: &mut dyn ViewBridge, id: EntityId) -> bool {
    if !world.contains(id) {
        return false;
    }
    if let Some(render) = world.remove::<RenderHandle>(id) {
        view.release(render.handle, &render.type_name);
    }
    world.despawn(id)
}

/// Stand-in requester used when no lifecycle manager is configured
///
/// Collects requests so the caller can destroy them straight after the
/// current agent finishes acting.
#[derive(Debug, Default)]
pub struct ImmediateDestroy {
    requested: Vec<EntityId>,
}

impl ImmediateDestroy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy everything requested so far; returns the ids removed
    pub fn apply(
        &mut self,
        world: &mut World,
        view: &mut dyn ViewBridge,
        grid: &mut SpatialGridIndex,
    ) -> Vec<EntityId> {
        let mut destroyed = Vec::new();
        for id in self.requested.drain(..) {
            if destroy_agent(world, view, id) {
                destroyed.push(id);
            }
        }
        if !destroyed.is_empty() {
            grid.mark_dirty();
        }
        destroyed
    }
}

impl DestroyRequester for ImmediateDestroy {
    fn request_destroy(&mut self, id: EntityId) -> bool {
        if self.requested.contains(&id) {
            return false;
        }
        tracing::warn!(entity = %id, "no lifecycle manager; destroying immediately");
        self.requested.push(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DelayedView;

    fn grid() -> SpatialGridIndex {
        SpatialGridIndex::new(100.0).unwrap()
    }

    #[test]
    fn test_request_is_idempotent() {
        let mut lifecycle = LifecycleManager::new();
        assert!(lifecycle.request_destroy(EntityId(3)));
        assert!(!lifecycle.request_destroy(EntityId(3)));
        assert_eq!(lifecycle.pending_count(), 1);
    }

    #[test]
    fn test_flush_destroys_once_and_releases_handle() {
        let mut world = World::new();
        let mut view = DelayedView::new(1);
        let mut grid = grid();
        let id = world.spawn("chaser");
        let handle = view.acquire("chaser", None).unwrap();
        world
            .insert(id, RenderHandle { handle, type_name: "chaser".into() })
            .unwrap();
        grid.rebuild(&world);

        let mut lifecycle = LifecycleManager::new();
        lifecycle.request_destroy(id);
        lifecycle.request_destroy(id);
        let report = lifecycle.flush(&mut world, &mut view, &mut grid);

        assert_eq!(report.destroyed, vec![id]);
        assert!(report.skipped.is_empty());
        assert!(!world.contains(id));
        assert_eq!(view.released(), &[handle]);
        assert!(grid.is_dirty());
        assert_eq!(lifecycle.pending_count(), 0);

        let again = lifecycle.flush(&mut world, &mut view, &mut grid);
        assert!(again.destroyed.is_empty());
    }

    #[test]
    fn test_flush_skips_missing_ids() {
        let mut world = World::new();
        let alive = world.spawn("chaser");
        let mut lifecycle = LifecycleManager::new();
        lifecycle.request_destroy(EntityId(77));
        lifecycle.request_destroy(alive);

        let report = lifecycle.flush(&mut world, &mut crate::render::NullView, &mut grid());
        assert_eq!(report.destroyed, vec![alive]);
        assert_eq!(report.skipped, vec![EntityId(77)]);
    }

    #[test]
    fn test_immediate_destroy_applies_once() {
        let mut world = World::new();
        let id = world.spawn("chaser");
        let mut fallback = ImmediateDestroy::new();
        assert!(fallback.request_destroy(id));
        assert!(!fallback.request_destroy(id));

        let mut grid = grid();
        grid.rebuild(&world);
        let destroyed = fallback.apply(&mut world, &mut crate::render::NullView, &mut grid);
        assert_eq!(destroyed, vec![id]);
        assert!(grid.is_dirty());
        assert!(fallback.apply(&mut world, &mut crate::render::NullView, &mut grid).is_empty());
    }
}
