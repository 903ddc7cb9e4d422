//! Orders and the board that writes them onto units.

use crate::hex::HexCoord;
use crate::types::UnitId;
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

/// A unit's stated intent for the next action phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "UPPERCASE")]
pub enum Order {
    /// March towards a hex.
    Move(HexCoord),
    /// Engage an enemy unit.
    Attack(UnitId),
    /// Try to sway an enemy unit.
    Plot(UnitId),
}

/// Order kinds without their target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Move,
    Attack,
    Plot,
}

impl Order {
    pub const fn kind(&self) -> OrderKind {
        match self {
            Order::Move(_) => OrderKind::Move,
            Order::Attack(_) => OrderKind::Attack,
            Order::Plot(_) => OrderKind::Plot,
        }
    }

    /// Targeted unit for Attack and Plot orders.
    pub const fn target_unit(&self) -> Option<UnitId> {
        match self {
            Order::Move(_) => None,
            Order::Attack(id) | Order::Plot(id) => Some(*id),
        }
    }

    /// Target hex for Move orders.
    pub const fn target_hex(&self) -> Option<HexCoord> {
        match self {
            Order::Move(hex) => Some(*hex),
            _ => None,
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Move(hex) => write!(f, "move to {}", hex),
            Order::Attack(id) => write!(f, "attack #{}", id),
            Order::Plot(id) => write!(f, "plot against #{}", id),
        }
    }
}

/// Why an order could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("No units selected")]
    EmptySelection,
    #[error("Unknown unit #{0}")]
    UnknownUnit(UnitId),
}

/// Thin mutation surface over `Unit::order`.
///
/// Phase discipline (orders only during the command phase) is enforced by
/// the session, not here.
pub struct OrderBoard<'a> {
    units: &'a mut [Unit],
}

impl<'a> OrderBoard<'a> {
    pub fn new(units: &'a mut [Unit]) -> Self {
        Self { units }
    }

    /// Give every listed unit the same order; dead units are skipped.
    ///
    /// Nothing changes unless every id is known and at least one is given.
    /// Returns how many units received the order.
    pub fn assign(&mut self, ids: &[UnitId], order: Order) -> Result<usize, OrderError> {
        self.check(ids)?;
        let mut assigned = 0;
        for unit in self.units.iter_mut() {
            if unit.is_alive() && ids.contains(&unit.id) {
                unit.order = Some(order);
                assigned += 1;
            }
        }
        Ok(assigned)
    }

    /// Remove the orders of the listed units. Returns how many were cleared.
    pub fn clear(&mut self, ids: &[UnitId]) -> Result<usize, OrderError> {
        self.check(ids)?;
        let mut cleared = 0;
        for unit in self.units.iter_mut() {
            if ids.contains(&unit.id) && unit.order.take().is_some() {
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    /// Current order of a unit.
    pub fn get(&self, id: UnitId) -> Option<Order> {
        self.units.iter().find(|u| u.id == id).and_then(|u| u.order)
    }

    /// All pending orders in roster order.
    pub fn pending(&self) -> Vec<(UnitId, Order)> {
        self.units
            .iter()
            .filter_map(|u| u.order.map(|o| (u.id, o)))
            .collect()
    }

    fn check(&self, ids: &[UnitId]) -> Result<(), OrderError> {
        if ids.is_empty() {
            return Err(OrderError::EmptySelection);
        }
        match ids.iter().find(|id| !self.units.iter().any(|u| u.id == **id)) {
            Some(id) => Err(OrderError::UnknownUnit(*id)),
            None => Ok(()),
        }
    }
}
