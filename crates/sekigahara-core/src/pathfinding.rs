//! A* pathfinding on the battlefield.
//!
//! Terrain only changes what a step costs; every tile is enterable unless
//! another living unit stands on it.

use crate::hex::HexCoord;
use crate::map::Map;
use crate::types::UnitId;
use crate::unit::Unit;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Movement points every unit gets per action phase. Enough to wade a river.
pub const MOVEMENT_POINTS: u32 = 3;

/// Result of a pathfinding operation.
#[derive(Clone, Debug)]
pub struct PathResult {
    /// The path from start to goal (inclusive).
    pub path: Vec<HexCoord>,
    /// Total movement cost of the path.
    pub total_cost: u32,
}

/// Configuration for pathfinding.
#[derive(Clone, Debug)]
pub struct PathConfig {
    /// Movement points available this phase.
    pub max_movement: u32,
    /// Tiles held by other units.
    pub blocked: HashSet<HexCoord>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_movement: MOVEMENT_POINTS,
            blocked: HashSet::new(),
        }
    }
}

impl PathConfig {
    /// Config for `mover`, blocking every tile held by another living unit.
    pub fn for_unit(mover: &Unit, units: &[Unit]) -> Self {
        Self {
            max_movement: mover.movement(),
            blocked: occupied_tiles(units, Some(mover.id)),
        }
    }
}

/// Positions of living units, optionally leaving one unit out.
pub fn occupied_tiles(units: &[Unit], except: Option<UnitId>) -> HashSet<HexCoord> {
    units
        .iter()
        .filter(|u| u.is_alive() && Some(u.id) != except)
        .map(|u| u.position)
        .collect()
}

/// Node in the A* priority queue.
#[derive(Clone, Eq, PartialEq)]
struct PathNode {
    coord: HexCoord,
    g_cost: u32, // Cost from start
    f_cost: u32, // g_cost + heuristic
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (lowest f_cost first)
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest path between two hexes using A*.
///
/// The goal itself may be occupied (paths towards an enemy end on its tile);
/// every other blocked tile is avoided. Returns None if no path exists.
pub fn find_path(
    map: &Map,
    start: HexCoord,
    goal: HexCoord,
    config: &PathConfig,
) -> Option<PathResult> {
    if !map.in_bounds(&goal) {
        return None;
    }
    if start == goal {
        return Some(PathResult {
            path: vec![start],
            total_cost: 0,
        });
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut g_scores: HashMap<HexCoord, u32> = HashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        g_cost: 0,
        f_cost: heuristic(&start, &goal),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            let path = reconstruct_path(&came_from, goal, start);
            return Some(PathResult {
                path,
                total_cost: current.g_cost,
            });
        }

        let current_g = *g_scores.get(&current.coord).unwrap_or(&u32::MAX);
        if current.g_cost > current_g {
            continue; // Stale entry
        }

        for neighbor in map.neighbors(&current.coord) {
            if neighbor != goal && config.blocked.contains(&neighbor) {
                continue;
            }
            let move_cost = get_movement_cost(map, &neighbor);
            if move_cost == u32::MAX {
                continue;
            }

            let tentative_g = current_g.saturating_add(move_cost);
            if tentative_g >= *g_scores.get(&neighbor).unwrap_or(&u32::MAX) {
                continue;
            }

            came_from.insert(neighbor, current.coord);
            g_scores.insert(neighbor, tentative_g);

            open_set.push(PathNode {
                coord: neighbor,
                g_cost: tentative_g,
                f_cost: tentative_g + heuristic(&neighbor, &goal),
            });
        }
    }

    None
}

/// Find all tiles reachable within the movement budget.
///
/// Returns a map of coordinates to their movement cost from the start.
pub fn find_reachable(map: &Map, start: HexCoord, config: &PathConfig) -> HashMap<HexCoord, u32> {
    let mut reachable: HashMap<HexCoord, u32> = HashMap::new();
    let mut frontier: BinaryHeap<PathNode> = BinaryHeap::new();

    reachable.insert(start, 0);
    frontier.push(PathNode {
        coord: start,
        g_cost: 0,
        f_cost: 0,
    });

    while let Some(current) = frontier.pop() {
        let current_cost = *reachable.get(&current.coord).unwrap_or(&u32::MAX);

        for neighbor in map.neighbors(&current.coord) {
            if config.blocked.contains(&neighbor) {
                continue;
            }
            let move_cost = get_movement_cost(map, &neighbor);
            if move_cost == u32::MAX {
                continue;
            }

            let total_cost = current_cost.saturating_add(move_cost);
            if total_cost > config.max_movement {
                continue;
            }

            if total_cost < *reachable.get(&neighbor).unwrap_or(&u32::MAX) {
                reachable.insert(neighbor, total_cost);
                frontier.push(PathNode {
                    coord: neighbor,
                    g_cost: total_cost,
                    f_cost: total_cost,
                });
            }
        }
    }

    reachable
}

/// The reachable tile that gets closest to `goal` this phase.
///
/// For goals no path leads to, such as an enemy hemmed in by other units.
/// Ties go to the cheaper tile, then the lower coordinate. Returns None when
/// no reachable tile is closer than `start`.
pub fn closest_reachable(
    map: &Map,
    start: HexCoord,
    goal: HexCoord,
    config: &PathConfig,
) -> Option<HexCoord> {
    let (best, _) = find_reachable(map, start, config)
        .into_iter()
        .min_by_key(|(coord, cost)| (coord.distance(&goal), *cost, *coord))?;
    (best.distance(&goal) < start.distance(&goal)).then_some(best)
}

/// Walk a path as far as the budget allows.
///
/// Stops before the first occupied tile or the first step that cannot be
/// paid for. Returns the tiles actually entered (start excluded).
pub fn advance_along(map: &Map, path: &[HexCoord], config: &PathConfig) -> Vec<HexCoord> {
    let mut spent = 0u32;
    let mut steps: Vec<HexCoord> = Vec::new();
    for coord in path.iter().skip(1) {
        if config.blocked.contains(coord) {
            break;
        }
        let cost = get_movement_cost(map, coord);
        if cost == u32::MAX {
            break;
        }
        if spent.saturating_add(cost) > config.max_movement {
            break;
        }
        spent += cost;
        steps.push(*coord);
    }
    steps
}

/// Get the movement cost to enter a tile.
fn get_movement_cost(map: &Map, coord: &HexCoord) -> u32 {
    match map.get(coord) {
        Some(tile) if tile.is_passable() => tile.movement_cost(),
        _ => u32::MAX,
    }
}

/// Heuristic for A* (hex distance * minimum cost).
fn heuristic(a: &HexCoord, b: &HexCoord) -> u32 {
    a.distance(b)
}

/// Reconstruct the path from came_from map.
fn reconstruct_path(
    came_from: &HashMap<HexCoord, HexCoord>,
    goal: HexCoord,
    start: HexCoord,
) -> Vec<HexCoord> {
    let mut path = vec![goal];
    let mut current = goal;

    while current != start {
        if let Some(&prev) = came_from.get(&current) {
            path.push(prev);
            current = prev;
        } else {
            break;
        }
    }

    path.reverse();
    path
}
