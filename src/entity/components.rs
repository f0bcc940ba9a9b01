//! Spatial and bookkeeping components shared by every agent kind

use ahash::AHashSet;
use glam::Vec3;

use crate::ecs::Component;

/// Authoritative location of an agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Disabled transforms are neither indexed nor moved
    pub enabled: bool,
}

impl Transform {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec3::new(x, y, 0.0),
            enabled: true,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            enabled: true,
        }
    }
}

impl Component for Transform {
    const NAME: &'static str = "Transform";
}

/// Movement intent written by decision trees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
    pub max_speed: f32,
    pub enabled: bool,
}

impl Velocity {
    pub fn with_max_speed(max_speed: f32) -> Self {
        Self {
            linear: Vec3::ZERO,
            max_speed,
            enabled: true,
        }
    }

    /// Intent clamped to `max_speed`
    pub fn clamped(&self) -> Vec3 {
        self.linear.clamp_length_max(self.max_speed.max(0.0))
    }

    pub fn stop(&mut self) {
        self.linear = Vec3::ZERO;
    }
}

impl Component for Velocity {
    const NAME: &'static str = "Velocity";
}

/// Horizontal facing derived from movement (1 = right, -1 = left)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facing(pub i8);

impl Default for Facing {
    fn default() -> Self {
        Facing(1)
    }
}

impl Facing {
    /// Turn towards the sign of `dx`; zero keeps the current facing
    pub fn follow(&mut self, dx: f32) {
        if dx < 0.0 {
            self.0 = -1;
        } else if dx > 0.0 {
            self.0 = 1;
        }
    }
}

impl Component for Facing {
    const NAME: &'static str = "Facing";
}

/// Free-form string labels (e.g. which player owns the agent)
#[derive(Debug, Clone, Default)]
pub struct Tags {
    tags: AHashSet<String>,
}

impl Tags {
    pub fn add(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn has(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Sorted copy of every tag
    pub fn all(&self) -> Vec<String> {
        let mut tags: Vec<_> = self.tags.iter().cloned().collect();
        tags.sort();
        tags
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

impl Component for Tags {
    const NAME: &'static str = "Tags";
}

pub mod tag {
    pub const PLAYER_1: &str = "player_1";
    pub const PLAYER_2: &str = "player_2";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_clamp() {
        let mut velocity = Velocity::with_max_speed(10.0);
        velocity.linear = Vec3::new(30.0, 40.0, 0.0);
        let clamped = velocity.clamped();
        assert!((clamped.length() - 10.0).abs() < 1e-4);
        assert!((clamped.x - 6.0).abs() < 1e-4);

        velocity.linear = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(velocity.clamped(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_facing_keeps_direction_when_still() {
        let mut facing = Facing::default();
        facing.follow(-3.0);
        assert_eq!(facing, Facing(-1));
        facing.follow(0.0);
        assert_eq!(facing, Facing(-1));
        facing.follow(0.5);
        assert_eq!(facing, Facing(1));
    }

    #[test]
    fn test_tags() {
        let mut tags = Tags::default();
        tags.add(tag::PLAYER_2);
        tags.add("elite");
        assert!(tags.has(tag::PLAYER_2));
        assert_eq!(tags.all(), vec!["elite".to_string(), "player_2".to_string()]);
        assert!(tags.remove("elite"));
        assert!(!tags.has("elite"));
    }
}
