pub mod resolution;
pub mod state;

pub use resolution::{
    apply_hit, attempt_attack, begin_attack, can_attack, is_alive, AttackOutcome, AttackStart,
    DestroyRequester, HitOutcome,
};
pub use state::{CombatProfile, Health};
