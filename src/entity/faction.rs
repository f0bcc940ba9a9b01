//! Faction membership and the static relation table

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{ArenaError, Result};
use crate::core::types::EntityId;
use crate::ecs::{Component, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    Player1,
    Player2,
}

impl Faction {
    /// Every declared faction
    pub const ALL: [Faction; 2] = [Faction::Player1, Faction::Player2];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Faction::Player1 => write!(f, "player_1"),
            Faction::Player2 => write!(f, "player_2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Ally,
    Enemy,
}

const N: usize = Faction::ALL.len();

/// Relation of every ordered faction pair
///
/// Symmetric, and every faction is its own ally. Both constructors enforce
/// this; lookups never compute or default anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactionTable {
    relations: [[Relation; N]; N],
}

impl FactionTable {
    /// Every faction allied with itself and hostile to everyone else
    pub fn standard() -> Self {
        let mut relations = [[Relation::Enemy; N]; N];
        for faction in Faction::ALL {
            relations[faction.index()][faction.index()] = Relation::Ally;
        }
        Self { relations }
    }

    /// Build from an explicit list of ordered pairs
    ///
    /// Every ordered pair must be present, mirrored pairs must agree and
    /// same-faction pairs must be allies.
    pub fn from_pairs(pairs: &[(Faction, Faction, Relation)]) -> Result<Self> {
        let mut cells: [[Option<Relation>; N]; N] = [[None; N]; N];
        for &(a, b, relation) in pairs {
            cells[a.index()][b.index()] = Some(relation);
        }

        let mut relations = [[Relation::Ally; N]; N];
        for a in Faction::ALL {
            for b in Faction::ALL {
                let forward = cells[a.index()][b.index()]
                    .ok_or_else(|| ArenaError::MissingRelation(a.to_string(), b.to_string()))?;
                let backward = cells[b.index()][a.index()]
                    .ok_or_else(|| ArenaError::MissingRelation(b.to_string(), a.to_string()))?;
                if forward != backward {
                    return Err(ArenaError::AsymmetricFactions(a.to_string(), b.to_string()));
                }
                if a == b && forward == Relation::Enemy {
                    return Err(ArenaError::SelfHostileFaction(a.to_string()));
                }
                relations[a.index()][b.index()] = forward;
            }
        }
        Ok(Self { relations })
    }

    /// Make two factions allies, in both directions
    pub fn with_alliance(mut self, a: Faction, b: Faction) -> Self {
        self.relations[a.index()][b.index()] = Relation::Ally;
        self.relations[b.index()][a.index()] = Relation::Ally;
        self
    }

    #[inline]
    pub fn relation_of(&self, a: Faction, b: Faction) -> Relation {
        self.relations[a.index()][b.index()]
    }

    /// Relation between two agents' factions
    ///
    /// Errors if either agent has no faction assigned.
    pub fn relation_between(&self, world: &World, a: EntityId, b: EntityId) -> Result<Relation> {
        let faction_a = faction_of(world, a)?;
        let faction_b = faction_of(world, b)?;
        Ok(self.relation_of(faction_a, faction_b))
    }
}

impl Default for FactionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn faction_of(world: &World, id: EntityId) -> Result<Faction> {
    world
        .get::<FactionMember>(id)
        .and_then(|member| member.faction)
        .ok_or(ArenaError::NoFaction(id))
}

/// Which faction an agent fights for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactionMember {
    pub faction: Option<Faction>,
}

impl FactionMember {
    pub fn of(faction: Faction) -> Self {
        Self {
            faction: Some(faction),
        }
    }
}

impl Component for FactionMember {
    const NAME: &'static str = "FactionMember";
}
