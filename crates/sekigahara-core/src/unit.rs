//! Units - the warlord contingents fighting on the field.

use crate::combat::ATTACK_REACH;
use crate::hex::{Facing, HexCoord};
use crate::order::Order;
use crate::pathfinding::MOVEMENT_POINTS;
use crate::roster::WarlordSpec;
use crate::types::{Side, SizeClass, UnitId};
use serde::{Deserialize, Serialize};

/// A unit on the battlefield.
///
/// Units are created once from the roster and never removed; death is the
/// `dead` flag so ids stay valid for the UI and the planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Commander's display name.
    pub name: String,
    /// Owning army. Never changes.
    pub side: Side,
    /// Soldiers still in the ranks.
    pub soldiers: u32,
    /// Soldiers at the start of the battle.
    pub max_soldiers: u32,
    /// Attack stat.
    pub atk: u32,
    /// Defense stat.
    pub def: u32,
    /// Current position on the map.
    pub position: HexCoord,
    /// Heading, updated on movement.
    pub facing: Facing,
    /// Footprint class.
    pub size_class: SizeClass,
    /// Pending order for the next action phase.
    pub order: Option<Order>,
    /// Set once the unit is wiped out. Never reverts.
    pub dead: bool,
    /// Commander-in-chief of its side.
    pub is_leader: bool,
}

impl Unit {
    /// Create a fresh unit from a roster entry.
    pub fn from_spec(id: UnitId, spec: &WarlordSpec) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            side: spec.side,
            soldiers: spec.soldiers,
            max_soldiers: spec.soldiers,
            atk: spec.atk,
            def: spec.def,
            position: spec.position,
            facing: match spec.side {
                Side::East => Facing::WEST,
                Side::West => Facing::EAST,
            },
            size_class: spec.size,
            order: None,
            dead: false,
            is_leader: spec.leader,
        }
    }

    /// Check if the unit is still fighting.
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Footprint radius for hit-testing.
    pub fn radius(&self) -> f64 {
        self.size_class.radius()
    }

    /// Engagement reach in hex steps. The same for every unit.
    pub fn reach(&self) -> u32 {
        ATTACK_REACH
    }

    /// Movement points per action phase. The same for every unit.
    pub fn movement(&self) -> u32 {
        MOVEMENT_POINTS
    }

    /// Check if `other` is a living enemy.
    pub fn is_enemy_of(&self, other: &Unit) -> bool {
        other.is_alive() && other.side != self.side
    }

    /// Remove soldiers; marks the unit dead (and drops its order) at zero.
    ///
    /// Returns the number of soldiers actually lost.
    pub fn take_losses(&mut self, losses: u32) -> u32 {
        let lost = losses.min(self.soldiers);
        self.soldiers -= lost;
        if self.soldiers == 0 {
            self.dead = true;
            self.order = None;
        }
        lost
    }

    /// Fraction of the starting strength still present.
    pub fn strength_ratio(&self) -> f32 {
        if self.max_soldiers == 0 {
            return 0.0;
        }
        self.soldiers as f32 / self.max_soldiers as f32
    }
}
