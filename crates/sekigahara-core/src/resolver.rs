//! Per-unit order resolution for the action phase.
//!
//! A resolver turns one unit's pending order into state changes. The
//! [`CombatResolver`] stages the whole outcome first, plays the visual beats
//! (pushing effects and optionally pausing between them), and only then
//! applies every change in one step.

use crate::combat::{self, CombatContext, PLOT_RANGE};
use crate::effects::{Effect, EffectBus, CASUALTY_COLOR, CLASH_COLOR, PLOT_COLOR};
use crate::hex::{Facing, HexCoord};
use crate::map::Map;
use crate::mapgen::SeededRng;
use crate::order::Order;
use crate::pathfinding::{advance_along, closest_reachable, find_path, PathConfig};
use crate::types::{Seed, UnitId};
use crate::unit::Unit;
use std::time::Duration;

/// Shouted by attacking commanders.
const WAR_CRIES: [&str; 4] = ["Charge!", "Forward!", "Break their line!", "For our lord!"];

/// Why a unit could not be resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("Unit #{0} does not exist")]
    UnknownUnit(UnitId),
    #[error("Unit #{unit_id} stands off the map at {position}")]
    OffMap { unit_id: UnitId, position: HexCoord },
    #[error("{0}")]
    Fault(String),
}

/// What resolving a unit did.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// No order, or the unit is dead. Nothing changed.
    Idle,
    /// The order could not be carried out and was dropped.
    Ignored { reason: &'static str },
    /// The unit marched.
    Moved { from: HexCoord, to: HexCoord },
    /// The unit closed in on its target without reaching it.
    Advanced { to: HexCoord },
    /// The unit fought.
    Engaged {
        target: UnitId,
        defender_losses: u32,
        attacker_losses: u32,
    },
    /// The unit attempted a plot.
    Plotted { target: UnitId, deserters: u32 },
}

/// Carries out one unit's order.
///
/// Implementations must leave a dead or order-less unit untouched and must
/// clear the acting unit's order once it has been consumed.
#[allow(async_fn_in_trait)]
pub trait Resolver {
    async fn process_unit(
        &mut self,
        unit_id: UnitId,
        units: &mut [Unit],
        map: &Map,
        effects: &mut EffectBus,
    ) -> Result<Resolution, ResolveError>;
}

/// A single state change, applied after all beats have played.
#[derive(Clone, Debug)]
enum Change {
    Relocate {
        id: UnitId,
        position: HexCoord,
        facing: Facing,
    },
    Face {
        id: UnitId,
        facing: Facing,
    },
    Losses {
        id: UnitId,
        amount: u32,
    },
    ClearOrder {
        id: UnitId,
    },
}

/// The full outcome of an order, computed before anything is touched.
#[derive(Debug)]
struct Staged {
    beats: Vec<Vec<Effect>>,
    changes: Vec<Change>,
    resolution: Resolution,
}

impl Staged {
    fn ignored(reason: &'static str) -> Self {
        Self {
            beats: Vec::new(),
            changes: Vec::new(),
            resolution: Resolution::Ignored { reason },
        }
    }
}

/// Default resolver: A* movement, engagements and plots.
pub struct CombatResolver {
    rng: SeededRng,
    beat: Duration,
}

impl CombatResolver {
    /// Create a resolver that plays its beats without pausing.
    pub fn new(seed: Seed) -> Self {
        Self {
            rng: SeededRng::new(seed),
            beat: Duration::ZERO,
        }
    }

    /// Pause for `beat` between visual beats.
    pub fn with_beat(mut self, beat: Duration) -> Self {
        self.beat = beat;
        self
    }

    fn stage(&mut self, unit: &Unit, order: Order, units: &[Unit], map: &Map) -> Result<Staged, ResolveError> {
        match order {
            Order::Move(target) => Ok(self.stage_move(unit, target, units, map)),
            Order::Attack(target) => self.stage_attack(unit, target, units, map),
            Order::Plot(target) => Ok(self.stage_plot(unit, target, units)),
        }
    }

    fn stage_move(&mut self, unit: &Unit, target: HexCoord, units: &[Unit], map: &Map) -> Staged {
        if !map.in_bounds(&target) {
            tracing::warn!(unit = unit.id, %target, "move target off the map");
            return Staged::ignored("target off the map");
        }
        let Some((to, facing)) = march(unit, target, units, map) else {
            return Staged::ignored("no way forward");
        };
        Staged {
            beats: vec![vec![Effect::dust(to)]],
            changes: vec![Change::Relocate {
                id: unit.id,
                position: to,
                facing,
            }],
            resolution: Resolution::Moved {
                from: unit.position,
                to,
            },
        }
    }

    fn stage_attack(
        &mut self,
        unit: &Unit,
        target_id: UnitId,
        units: &[Unit],
        map: &Map,
    ) -> Result<Staged, ResolveError> {
        let Some(target) = units.iter().find(|u| u.id == target_id) else {
            tracing::warn!(unit = unit.id, target = target_id, "attack on unknown unit");
            return Ok(Staged::ignored("unknown target"));
        };
        if !unit.is_enemy_of(target) {
            tracing::debug!(unit = unit.id, target = target_id, "attack target not a living enemy");
            return Ok(Staged::ignored("target not a living enemy"));
        }

        let mut staged = Staged {
            beats: Vec::new(),
            changes: Vec::new(),
            resolution: Resolution::Idle,
        };
        let mut position = unit.position;

        if position.distance(&target.position) > unit.reach() {
            match march(unit, target.position, units, map) {
                Some((to, facing)) => {
                    position = to;
                    staged.beats.push(vec![Effect::dust(to)]);
                    staged.changes.push(Change::Relocate {
                        id: unit.id,
                        position: to,
                        facing,
                    });
                    staged.resolution = Resolution::Advanced { to };
                }
                None => return Ok(Staged::ignored("no way forward")),
            }
        }

        if position.distance(&target.position) > unit.reach() {
            return Ok(staged);
        }

        let attacker_tile = map.get(&position).ok_or(ResolveError::OffMap {
            unit_id: unit.id,
            position,
        })?;
        let defender_tile = map.get(&target.position).ok_or(ResolveError::OffMap {
            unit_id: target.id,
            position: target.position,
        })?;

        let random = self.rng.next_f32();
        let result = combat::resolve_combat(&CombatContext {
            attacker: unit,
            defender: target,
            attacker_tile,
            defender_tile,
            random,
        });
        tracing::debug!(
            attacker = %unit.name,
            defender = %target.name,
            defender_losses = result.defender_losses,
            attacker_losses = result.attacker_losses,
            random,
            "engagement"
        );

        if let Some(facing) = Facing::from_step(position, target.position) {
            staged.changes.push(Change::Face {
                id: unit.id,
                facing,
            });
        }

        let mut charge = vec![Effect::beam(position, target.position, unit.side.color())];
        if self.rng.chance(0.5) {
            let cry = WAR_CRIES[self.rng.next_u32() as usize % WAR_CRIES.len()];
            charge.push(Effect::speech_bubble(position, cry, unit.side.color()));
        }
        staged.beats.push(charge);
        staged.beats.push(vec![
            Effect::shockwave(target.position, CLASH_COLOR),
            Effect::floating_text(
                target.position,
                format!("-{}", result.defender_losses),
                CASUALTY_COLOR,
            ),
            Effect::floating_text(position, format!("-{}", result.attacker_losses), CASUALTY_COLOR),
        ]);
        staged.changes.push(Change::Losses {
            id: target.id,
            amount: result.defender_losses,
        });
        staged.changes.push(Change::Losses {
            id: unit.id,
            amount: result.attacker_losses,
        });
        staged.resolution = Resolution::Engaged {
            target: target.id,
            defender_losses: result.defender_losses,
            attacker_losses: result.attacker_losses,
        };
        Ok(staged)
    }

    fn stage_plot(&mut self, unit: &Unit, target_id: UnitId, units: &[Unit]) -> Staged {
        let Some(target) = units.iter().find(|u| u.id == target_id) else {
            tracing::warn!(unit = unit.id, target = target_id, "plot against unknown unit");
            return Staged::ignored("unknown target");
        };
        if !unit.is_enemy_of(target) {
            return Staged::ignored("target not a living enemy");
        }
        if unit.position.distance(&target.position) > PLOT_RANGE {
            tracing::debug!(unit = unit.id, target = target_id, "plot target out of range");
            return Staged::ignored("target out of range");
        }

        let chance = combat::plot_chance(unit, target);
        let success = chance > 0.0 && self.rng.chance(chance);
        tracing::debug!(plotter = %unit.name, target = %target.name, chance, success, "plot");

        if !success {
            return Staged {
                beats: vec![vec![Effect::speech_bubble(
                    target.position,
                    "We stand firm!",
                    PLOT_COLOR,
                )]],
                changes: Vec::new(),
                resolution: Resolution::Plotted {
                    target: target.id,
                    deserters: 0,
                },
            };
        }

        let deserters = combat::desertion(target);
        Staged {
            beats: vec![vec![
                Effect::shockwave(target.position, PLOT_COLOR),
                Effect::speech_bubble(target.position, "Betrayal!", PLOT_COLOR),
                Effect::floating_text(target.position, format!("-{}", deserters), PLOT_COLOR),
            ]],
            changes: vec![
                Change::Losses {
                    id: target.id,
                    amount: deserters,
                },
                Change::ClearOrder { id: target.id },
            ],
            resolution: Resolution::Plotted {
                target: target.id,
                deserters,
            },
        }
    }

    async fn pause(&self) {
        if !self.beat.is_zero() {
            tokio::time::sleep(self.beat).await;
        }
    }
}

impl Resolver for CombatResolver {
    async fn process_unit(
        &mut self,
        unit_id: UnitId,
        units: &mut [Unit],
        map: &Map,
        effects: &mut EffectBus,
    ) -> Result<Resolution, ResolveError> {
        let unit = units
            .iter()
            .find(|u| u.id == unit_id)
            .ok_or(ResolveError::UnknownUnit(unit_id))?;
        let order = match unit.order {
            Some(order) if unit.is_alive() => order,
            _ => return Ok(Resolution::Idle),
        };

        let staged = self.stage(unit, order, units, map)?;

        for beat in staged.beats {
            for effect in beat {
                effects.push(effect);
            }
            self.pause().await;
        }

        for change in &staged.changes {
            apply(units, change);
        }
        if let Some(unit) = units.iter_mut().find(|u| u.id == unit_id) {
            unit.order = None;
        }

        tracing::debug!(unit = unit_id, resolution = ?staged.resolution, "resolved");
        Ok(staged.resolution)
    }
}

/// Step towards `target` as far as this phase's movement allows.
///
/// When no path reaches `target` (its approaches are all held), the unit
/// heads for the reachable tile closest to it instead. Returns the final tile
/// and facing, or `None` if the unit cannot get any closer.
fn march(unit: &Unit, target: HexCoord, units: &[Unit], map: &Map) -> Option<(HexCoord, Facing)> {
    let config = PathConfig::for_unit(unit, units);
    let path = match find_path(map, unit.position, target, &config) {
        Some(path) => path,
        None => {
            let stop = closest_reachable(map, unit.position, target, &config)?;
            tracing::debug!(unit = unit.id, %target, %stop, "target cut off, closing in");
            find_path(map, unit.position, stop, &config)?
        }
    };
    let steps = advance_along(map, &path.path, &config);
    let to = *steps.last()?;
    let from = if steps.len() >= 2 {
        steps[steps.len() - 2]
    } else {
        unit.position
    };
    let facing = Facing::from_step(from, to).unwrap_or(unit.facing);
    Some((to, facing))
}

fn apply(units: &mut [Unit], change: &Change) {
    let id = match change {
        Change::Relocate { id, .. }
        | Change::Face { id, .. }
        | Change::Losses { id, .. }
        | Change::ClearOrder { id } => *id,
    };
    let Some(unit) = units.iter_mut().find(|u| u.id == id) else {
        return;
    };
    match change {
        Change::Relocate {
            position, facing, ..
        } => {
            unit.position = *position;
            unit.facing = *facing;
        }
        Change::Face { facing, .. } => unit.facing = *facing,
        Change::Losses { amount, .. } => {
            unit.take_losses(*amount);
        }
        Change::ClearOrder { .. } => unit.order = None,
    }
}
