//! Health and combat profile components
//!
//! Agents that can be hurt carry `Health`; agents that can attack also carry
//! a `CombatProfile`. Static structures have health but may also attack.

use crate::core::config::ArenaConfig;
use crate::core::types::Millis;
use crate::ecs::Component;

/// Hit points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    /// Always within `[0, max]`
    pub current: f32,
    pub max: f32,
    /// Suppresses all damage while set
    pub invincible: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            invincible: false,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Remaining health as a fraction of max (0 when max is 0)
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Subtract damage, clamped at zero. Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if self.invincible {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    /// Restore health, clamped at max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Component for Health {
    const NAME: &'static str = "Health";
}

/// Attack parameters plus cooldown bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatProfile {
    pub attack_range: f32,
    pub attack_damage: f32,
    pub attack_cooldown_ms: Millis,
    /// Time of the last attack attempt; `None` until the first one
    pub last_attack_ms: Option<Millis>,
}

impl CombatProfile {
    pub fn new(attack_range: f32, attack_damage: f32, attack_cooldown_ms: Millis) -> Self {
        Self {
            attack_range,
            attack_damage,
            attack_cooldown_ms,
            last_attack_ms: None,
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(
            config.ai.attack_range,
            config.ai.attack_damage,
            config.attack_cooldown_ms(),
        )
    }
}

impl Component for CombatProfile {
    const NAME: &'static str = "CombatProfile";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_floor() {
        let mut health = Health::new(100.0);
        health.current = 5.0;
        let dealt = health.take_damage(10.0);
        assert_eq!(dealt, 5.0);
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());

        health.take_damage(10.0);
        assert_eq!(health.current, 0.0);
    }

    #[test]
    fn test_invincible_takes_nothing() {
        let mut health = Health::new(50.0);
        health.invincible = true;
        assert_eq!(health.take_damage(49.0), 0.0);
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn test_heal_clamped() {
        let mut health = Health::new(20.0);
        health.current = 15.0;
        assert_eq!(health.heal(10.0), 5.0);
        assert_eq!(health.current, 20.0);
        assert_eq!(health.fraction(), 1.0);
    }

    #[test]
    fn test_zero_max_fraction() {
        let health = Health {
            current: 0.0,
            max: 0.0,
            invincible: false,
        };
        assert_eq!(health.fraction(), 0.0);
    }

    #[test]
    fn test_profile_from_config() {
        let profile = CombatProfile::from_config(&ArenaConfig::default());
        assert_eq!(profile.attack_range, 50.0);
        assert_eq!(profile.attack_damage, 10.0);
        assert_eq!(profile.attack_cooldown_ms, 1000);
        assert!(profile.last_attack_ms.is_none());
    }
}
