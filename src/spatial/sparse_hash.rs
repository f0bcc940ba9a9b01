//! Sparse hash grid for broad-phase neighbour queries
//!
//! Agents are bucketed by `floor(position / cell_size)`. The grid is rebuilt
//! wholesale, and only when something marked it dirty or the number of
//! positioned agents changed since the last rebuild. Queries return a
//! superset of the agents within the radius; callers filter by real distance.

use ahash::{AHashMap, AHashSet};
use glam::Vec3;

use crate::core::error::{ArenaError, Result};
use crate::core::types::{CellKey, EntityId};
use crate::ecs::World;
use crate::entity::components::Transform;

/// Sparse hash grid keyed by integer cell coordinates
#[derive(Debug)]
pub struct SpatialGridIndex {
    cell_size: f32,
    cells: AHashMap<CellKey, AHashSet<EntityId>>,
    dirty: bool,
    tracked_count: usize,
    rebuild_count: u64,
}

impl SpatialGridIndex {
    /// Create an empty grid; starts dirty so the first rebuild always runs
    pub fn new(cell_size: f32) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ArenaError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            cells: AHashMap::new(),
            dirty: true,
            tracked_count: 0,
            rebuild_count: 0,
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn cell_coord(&self, x: f32, y: f32) -> CellKey {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many full rebuilds have run
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Number of non-empty cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Rebuild from every agent with an enabled transform
    ///
    /// No-op unless dirty or the positioned-agent count moved since the last
    /// rebuild. Returns whether a rebuild happened.
    pub fn rebuild(&mut self, world: &World) -> bool {
        let live = world.count_with::<Transform>();
        if !self.dirty && live == self.tracked_count {
            return false;
        }

        let positions = world.store::<Transform>().into_iter().flat_map(|store| {
            store
                .iter()
                .filter(|(_, transform)| transform.enabled)
                .map(|(id, transform)| (id, transform.position))
        });
        self.rebuild_from(positions);
        self.tracked_count = live;
        true
    }

    /// Clear and refill from explicit positions, then clear the dirty flag
    pub fn rebuild_from(&mut self, positions: impl IntoIterator<Item = (EntityId, Vec3)>) {
        self.cells.clear();
        for (id, position) in positions {
            let key = self.cell_coord(position.x, position.y);
            self.cells.entry(key).or_default().insert(id);
        }
        self.dirty = false;
        self.rebuild_count += 1;
        tracing::trace!(cells = self.cells.len(), "spatial grid rebuilt");
    }

    /// Agents in every cell overlapping the square around the radius, ascending
    ///
    /// Negative radii are treated as zero, which still returns the centre cell.
    pub fn query(&self, x: f32, y: f32, radius: f32) -> Vec<EntityId> {
        if self.cells.is_empty() {
            return Vec::new();
        }

        let cell_radius = (radius.max(0.0) / self.cell_size).ceil() as i32;
        let (cx, cy) = self.cell_coord(x, y);

        let mut found: Vec<EntityId> = Vec::new();
        let span = 2 * cell_radius as u64 + 1;
        if span.saturating_mul(span) > self.cells.len() as u64 {
            // Fewer occupied cells than cells in the square: filter those instead
            let reach = i64::from(cell_radius);
            for (&(kx, ky), cell) in &self.cells {
                if (i64::from(kx) - i64::from(cx)).abs() <= reach
                    && (i64::from(ky) - i64::from(cy)).abs() <= reach
                {
                    found.extend(cell.iter().copied());
                }
            }
        } else {
            for dx in -cell_radius..=cell_radius {
                for dy in -cell_radius..=cell_radius {
                    let (Some(kx), Some(ky)) = (cx.checked_add(dx), cy.checked_add(dy)) else {
                        continue;
                    };
                    if let Some(cell) = self.cells.get(&(kx, ky)) {
                        found.extend(cell.iter().copied());
                    }
                }
            }
        }
        // An agent lives in exactly one cell, so there is nothing to dedup
        found.sort_unstable();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(points: &[(u32, f32, f32)]) -> SpatialGridIndex {
        let mut grid = SpatialGridIndex::new(100.0).unwrap();
        grid.rebuild_from(
            points
                .iter()
                .map(|&(id, x, y)| (EntityId(id), Vec3::new(x, y, 0.0))),
        );
        grid
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        assert!(matches!(SpatialGridIndex::new(0.0), Err(ArenaError::InvalidCellSize(_))));
        assert!(SpatialGridIndex::new(-10.0).is_err());
        assert!(SpatialGridIndex::new(f32::NAN).is_err());
        assert!(SpatialGridIndex::new(f32::INFINITY).is_err());
    }

    #[test]
    fn test_cell_coord_floors_negatives() {
        let grid = SpatialGridIndex::new(100.0).unwrap();
        assert_eq!(grid.cell_coord(0.0, 0.0), (0, 0));
        assert_eq!(grid.cell_coord(99.9, 150.0), (0, 1));
        assert_eq!(grid.cell_coord(-0.1, -100.0), (-1, -1));
        assert_eq!(grid.cell_coord(-100.1, 0.0), (-2, 0));
    }

    #[test]
    fn test_query_empty_grid() {
        let grid = SpatialGridIndex::new(50.0).unwrap();
        assert!(grid.query(0.0, 0.0, 1000.0).is_empty());
    }

    #[test]
    fn test_query_neighbourhood_is_sorted() {
        let grid = grid_with(&[(5, 10.0, 10.0), (2, 150.0, 10.0), (9, 450.0, 10.0), (1, -40.0, -40.0)]);
        let found = grid.query(10.0, 10.0, 100.0);
        assert_eq!(found, vec![EntityId(1), EntityId(2), EntityId(5)]);
    }

    #[test]
    fn test_negative_radius_reads_centre_cell() {
        let grid = grid_with(&[(1, 10.0, 10.0), (2, 150.0, 10.0)]);
        assert_eq!(grid.query(20.0, 20.0, -5.0), vec![EntityId(1)]);
    }

    #[test]
    fn test_rebuild_skips_when_clean() {
        let mut world = World::new();
        let id = world.spawn("chaser");
        world.insert(id, Transform::at(10.0, 10.0)).unwrap();

        let mut grid = SpatialGridIndex::new(100.0).unwrap();
        assert!(grid.rebuild(&world));
        assert!(!grid.rebuild(&world));
        assert_eq!(grid.rebuild_count(), 1);

        grid.mark_dirty();
        assert!(grid.rebuild(&world));
        assert_eq!(grid.rebuild_count(), 2);
    }

    #[test]
    fn test_count_change_forces_rebuild() {
        let mut world = World::new();
        let a = world.spawn("chaser");
        world.insert(a, Transform::at(10.0, 10.0)).unwrap();

        let mut grid = SpatialGridIndex::new(100.0).unwrap();
        grid.rebuild(&world);

        // Nobody marked the grid dirty, yet the new agent must show up
        let b = world.spawn("chaser");
        world.insert(b, Transform::at(20.0, 20.0)).unwrap();
        assert!(grid.rebuild(&world));
        assert_eq!(grid.query(0.0, 0.0, 50.0), vec![a, b]);
    }

    #[test]
    fn test_huge_radius_does_not_overflow() {
        let grid = grid_with(&[(1, 10.0, 10.0)]);
        assert_eq!(grid.query(-150.0, 0.0, 1.0e12), vec![EntityId(1)]);
        assert_eq!(grid.query(0.0, 0.0, f32::MAX), vec![EntityId(1)]);
        assert_eq!(grid.query(0.0, 0.0, f32::INFINITY), vec![EntityId(1)]);
    }

    #[test]
    fn test_radius_beyond_populated_area() {
        let mut grid = SpatialGridIndex::new(10.0).unwrap();
        grid.rebuild_from([
            (EntityId(3), Vec3::new(5.0, 5.0, 0.0)),
            (EntityId(1), Vec3::new(-40_000.0, 20_000.0, 0.0)),
            (EntityId(2), Vec3::new(60_000.0, 0.0, 0.0)),
        ]);
        // Square reaches 50_000 units from the origin in each axis
        assert_eq!(grid.query(0.0, 0.0, 50_000.0), vec![EntityId(1), EntityId(3)]);
        assert_eq!(grid.query(0.0, 0.0, 70_000.0), vec![EntityId(1), EntityId(2), EntityId(3)]);
    }

    #[test]
    fn test_small_and_large_queries_agree() {
        let points: Vec<_> = (0..40u32)
            .map(|i| (i, (i as f32 * 37.0) % 900.0 - 450.0, (i as f32 * 53.0) % 700.0 - 350.0))
            .collect();
        let grid = grid_with(&points);
        // Radius 100 walks the 3x3 square, radius 1000 filters occupied cells
        let near = grid.query(0.0, 0.0, 100.0);
        let far = grid.query(0.0, 0.0, 1000.0);
        assert!(near.iter().all(|id| far.contains(id)));
        assert_eq!(far.len(), points.len());
        for &(id, x, y) in &points {
            if x.abs() < 100.0 && y.abs() < 100.0 {
                assert!(near.contains(&EntityId(id)));
            }
        }
    }

    #[test]
    fn test_disabled_transforms_are_not_indexed() {
        let mut world = World::new();
        let a = world.spawn("chaser");
        let b = world.spawn("chaser");
        world.insert(a, Transform::at(10.0, 10.0)).unwrap();
        let mut hidden = Transform::at(12.0, 12.0);
        hidden.enabled = false;
        world.insert(b, hidden).unwrap();

        let mut grid = SpatialGridIndex::new(100.0).unwrap();
        grid.rebuild(&world);
        assert_eq!(grid.query(10.0, 10.0, 10.0), vec![a]);
    }
}
