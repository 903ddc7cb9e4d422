//! Order planning for computer-controlled units.

use crate::combat::PLOT_RANGE;
use crate::map::Map;
use crate::order::Order;
use crate::unit::Unit;

/// Chooses an order for one unit.
///
/// Implementations are pure: they read the field and return an intent, never
/// mutate anything, and never name a dead unit or an off-map hex.
pub trait Planner {
    fn decide_action(&self, unit: &Unit, units: &[Unit], map: &Map) -> Option<Order>;
}

/// A planner that never issues orders.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoldPlanner;

impl Planner for HoldPlanner {
    fn decide_action(&self, _unit: &Unit, _units: &[Unit], _map: &Map) -> Option<Order> {
        None
    }
}

/// The reference battlefield policy.
///
/// In order of preference: strike the weakest enemy in reach, let leaders
/// hold their ground, sway a much larger non-leader enemy nearby, or close in
/// on the nearest enemy.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPlanner;

impl Planner for DefaultPlanner {
    fn decide_action(&self, unit: &Unit, units: &[Unit], map: &Map) -> Option<Order> {
        if !unit.is_alive() {
            return None;
        }
        let enemies: Vec<&Unit> = units.iter().filter(|u| unit.is_enemy_of(u)).collect();

        let weakest_in_reach = enemies
            .iter()
            .filter(|e| unit.position.distance(&e.position) <= unit.reach())
            .min_by_key(|e| (e.soldiers, e.id));
        if let Some(target) = weakest_in_reach {
            return Some(Order::Attack(target.id));
        }

        if unit.is_leader {
            return None;
        }

        let nearest = enemies
            .iter()
            .min_by_key(|e| (unit.position.distance(&e.position), e.id))?;
        let distance = unit.position.distance(&nearest.position);

        if !nearest.is_leader
            && distance <= PLOT_RANGE
            && nearest.soldiers > unit.soldiers.saturating_mul(2)
        {
            return Some(Order::Plot(nearest.id));
        }

        let approach = nearest
            .position
            .neighbors()
            .into_iter()
            .filter(|hex| {
                map.get(hex).is_some_and(|tile| tile.is_passable())
                    && !units
                        .iter()
                        .any(|u| u.is_alive() && u.id != unit.id && u.position == *hex)
            })
            .min_by_key(|hex| (unit.position.distance(hex), *hex));

        match approach {
            Some(hex) => Some(Order::Move(hex)),
            // Surrounded: an attack order still charges as close as it can
            None => Some(Order::Attack(nearest.id)),
        }
    }
}
