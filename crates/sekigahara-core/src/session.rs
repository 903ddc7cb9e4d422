//! Root session state: the phase machine, the field, and the input surface.

use crate::effects::{Effect, EffectBus};
use crate::events::{EventLog, EventRecord, SessionEvent};
use crate::hex::{pixel_to_hex, raw_distance, Camera, Point};
use crate::map::Map;
use crate::mapgen::MapGenerator;
use crate::order::{Order, OrderBoard, OrderError};
use crate::settings::{SessionConfig, SettingsError};
use crate::types::{Side, UnitId};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

/// Phases of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    /// Roster and map built, battle not yet begun.
    #[default]
    Init,
    /// The player gives orders.
    Order,
    /// Orders are being carried out.
    Action,
    /// A leader has fallen. Terminal.
    End,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Init => write!(f, "INIT"),
            Phase::Order => write!(f, "ORDER"),
            Phase::Action => write!(f, "ACTION"),
            Phase::End => write!(f, "END"),
        }
    }
}

/// What a click on the field did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Clicked outside the field.
    Nothing,
    /// One of the player's units is now the selection.
    Selected(UnitId),
    /// An enemy was marked as the target for the current selection.
    Targeted(UnitId),
    /// An enemy was clicked with nothing selected.
    Inspected(UnitId),
    /// The selection was sent to the clicked hex.
    Ordered { count: usize },
    /// Empty ground clicked; the selection was dropped.
    Cleared,
}

/// Serializable view of the session for front ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub name: String,
    pub turn: u32,
    pub phase: Phase,
    pub player_side: Side,
    pub units: Vec<Unit>,
    pub east_strength: u32,
    pub west_strength: u32,
    pub winner: Option<Side>,
    pub loser_name: Option<String>,
}

impl SessionSnapshot {
    /// Pretty-printed JSON for front ends and logs.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A single battle from deployment to the fall of a leader.
///
/// All mutation during the action phase goes through the scheduler, which
/// holds the only `&mut Session` while a turn resolves.
#[derive(Clone, Debug)]
pub struct Session {
    name: String,
    phase: Phase,
    /// Completed or running turn (0 before the first commit).
    turn: u32,
    units: Vec<Unit>,
    map: Map,
    effects: EffectBus,
    events: EventLog,
    player_side: Side,
    east_leader: UnitId,
    west_leader: UnitId,
    winner: Option<Side>,
    loser_name: Option<String>,
    selection: Vec<UnitId>,
    target: Option<UnitId>,
}

impl Session {
    /// Build a session with a generated battlefield.
    ///
    /// The config is checked before any terrain is generated.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        validate(&config)?;
        let map = MapGenerator::generate_with(config.map_width, config.map_height, config.map_seed);
        Self::with_map(config, map)
    }

    /// Build a session on a prepared map (its size overrides the config).
    pub fn with_map(mut config: SessionConfig, map: Map) -> Result<Self, SessionError> {
        config.map_width = map.width;
        config.map_height = map.height;
        validate(&config)?;

        let units: Vec<Unit> = config
            .roster
            .iter()
            .enumerate()
            .map(|(i, spec)| Unit::from_spec(i as UnitId, spec))
            .collect();
        let leader_of = |side: Side| {
            units
                .iter()
                .find(|u| u.side == side && u.is_leader)
                .map(|u| u.id)
                .ok_or(SessionError::MissingLeader(side))
        };
        let east_leader = leader_of(Side::East)?;
        let west_leader = leader_of(Side::West)?;

        tracing::info!(
            name = %config.name,
            units = units.len(),
            width = map.width,
            height = map.height,
            player = %config.player_side,
            "session created"
        );

        Ok(Self {
            name: config.name,
            phase: Phase::Init,
            turn: 0,
            units,
            map,
            effects: EffectBus::new(),
            events: EventLog::new(),
            player_side: config.player_side,
            east_leader,
            west_leader,
            winner: None,
            loser_name: None,
            selection: Vec::new(),
            target: None,
        })
    }

    /// Open the first command phase.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.ensure_phase(Phase::Init)?;
        self.events.record(SessionEvent::SessionStarted {
            player_side: self.player_side,
        });
        self.set_phase(Phase::Order);
        Ok(())
    }

    // --- input surface ---

    /// Replace the selection with the listed player units (dead ones are dropped).
    pub fn select_units(&mut self, ids: &[UnitId]) -> Result<usize, SessionError> {
        for id in ids {
            let unit = self.unit(*id).ok_or(SessionError::UnknownUnit(*id))?;
            if unit.side != self.player_side {
                return Err(SessionError::NotYourUnit(*id));
            }
        }
        self.selection = ids
            .iter()
            .copied()
            .filter(|id| self.unit(*id).is_some_and(|u| u.is_alive()))
            .collect();
        self.target = None;
        Ok(self.selection.len())
    }

    /// Drop the selection and any marked target.
    pub fn deselect(&mut self) {
        self.selection.clear();
        self.target = None;
    }

    /// Currently selected unit ids.
    pub fn selection(&self) -> &[UnitId] {
        &self.selection
    }

    /// Enemy marked by the last click, awaiting an attack or plot command.
    pub fn target(&self) -> Option<UnitId> {
        self.target
    }

    /// Handle a click at a screen point.
    ///
    /// A unit is hit when the raw coordinate distance between its tile and
    /// the clicked tile is below its footprint radius.
    pub fn select_at(&mut self, screen: Point, camera: &Camera) -> ClickOutcome {
        let hex = pixel_to_hex(screen, camera);
        if !self.map.in_bounds(&hex) {
            return ClickOutcome::Nothing;
        }

        let hit = self
            .units
            .iter()
            .find(|u| u.is_alive() && raw_distance(u.position, hex) < u.radius())
            .map(|u| (u.id, u.side));

        match hit {
            Some((id, side)) if side == self.player_side => {
                self.selection = vec![id];
                self.target = None;
                ClickOutcome::Selected(id)
            }
            Some((id, _)) if !self.selection.is_empty() => {
                self.target = Some(id);
                ClickOutcome::Targeted(id)
            }
            Some((id, _)) => {
                self.deselect();
                ClickOutcome::Inspected(id)
            }
            None if !self.selection.is_empty() && self.phase == Phase::Order => {
                match self.issue_order(Order::Move(hex)) {
                    Ok(count) => ClickOutcome::Ordered { count },
                    Err(_) => ClickOutcome::Cleared,
                }
            }
            None => {
                self.deselect();
                ClickOutcome::Cleared
            }
        }
    }

    /// Order the selection to attack the marked target.
    pub fn attack_target(&mut self) -> Result<usize, SessionError> {
        let target = self.target.ok_or(SessionError::NoTarget)?;
        self.issue_order(Order::Attack(target))
    }

    /// Order the selection to plot against the marked target.
    pub fn plot_target(&mut self) -> Result<usize, SessionError> {
        let target = self.target.ok_or(SessionError::NoTarget)?;
        self.issue_order(Order::Plot(target))
    }

    /// Give the selection an order, then drop the selection.
    pub fn issue_order(&mut self, order: Order) -> Result<usize, SessionError> {
        let selection = self.selection.clone();
        let count = self.assign_orders(&selection, order)?;
        self.deselect();
        Ok(count)
    }

    /// Give the listed player units the same order.
    pub fn assign_orders(&mut self, ids: &[UnitId], order: Order) -> Result<usize, SessionError> {
        self.ensure_phase(Phase::Order)?;
        self.ensure_own_units(ids)?;
        let count = OrderBoard::new(&mut self.units).assign(ids, order)?;
        tracing::debug!(count, %order, "orders assigned");
        Ok(count)
    }

    /// Withdraw the orders of the listed player units.
    pub fn clear_orders(&mut self, ids: &[UnitId]) -> Result<usize, SessionError> {
        self.ensure_phase(Phase::Order)?;
        self.ensure_own_units(ids)?;
        Ok(OrderBoard::new(&mut self.units).clear(ids)?)
    }

    // --- read side ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn player_side(&self) -> Side {
        self.player_side
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Commander-in-chief of a side.
    pub fn leader(&self, side: Side) -> Option<&Unit> {
        let id = match side {
            Side::East => self.east_leader,
            Side::West => self.west_leader,
        };
        self.unit(id)
    }

    /// Soldiers still fighting for a side.
    pub fn side_strength(&self, side: Side) -> u32 {
        self.units
            .iter()
            .filter(|u| u.side == side && u.is_alive())
            .map(|u| u.soldiers)
            .sum()
    }

    pub fn effects(&self) -> &EffectBus {
        &self.effects
    }

    /// Hand all pending effects to the renderer.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.effects.drain()
    }

    /// Pending events, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    /// Take all pending events.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Name of the leader whose fall ended the battle.
    pub fn loser_name(&self) -> Option<&str> {
        self.loser_name.as_deref()
    }

    /// Check if the session has ended.
    pub fn is_ended(&self) -> bool {
        self.phase == Phase::End
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            name: self.name.clone(),
            turn: self.turn,
            phase: self.phase,
            player_side: self.player_side,
            units: self.units.clone(),
            east_strength: self.side_strength(Side::East),
            west_strength: self.side_strength(Side::West),
            winner: self.winner,
            loser_name: self.loser_name.clone(),
        }
    }

    // --- scheduler hooks ---

    pub(crate) fn ensure_phase(&self, expected: Phase) -> Result<(), SessionError> {
        if self.phase != expected {
            return Err(SessionError::InvalidPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    pub(crate) fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        tracing::info!(turn = self.turn, %from, %to, "phase changed");
        self.events.record(SessionEvent::PhaseChanged { from, to });
    }

    pub(crate) fn begin_turn(&mut self) {
        self.turn += 1;
        self.events.set_turn(self.turn);
        self.deselect();
    }

    pub(crate) fn record(&mut self, event: SessionEvent) {
        self.events.record(event);
    }

    /// Split borrow handed to the resolver.
    pub(crate) fn battlefield(&mut self) -> (&mut [Unit], &Map, &mut EffectBus) {
        (&mut self.units, &self.map, &mut self.effects)
    }

    /// End the session if a leader has fallen. East is checked first.
    pub(crate) fn check_victory(&mut self) -> bool {
        let fallen = |side: Side| self.leader(side).map_or(true, |u| !u.is_alive());
        let (winner, loser) = if fallen(Side::East) {
            (Side::West, Side::East)
        } else if fallen(Side::West) {
            (Side::East, Side::West)
        } else {
            return false;
        };

        let loser_name = self
            .leader(loser)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("{} leader", loser));
        tracing::info!(%winner, loser = %loser_name, turn = self.turn, "leader fallen");

        self.winner = Some(winner);
        self.loser_name = Some(loser_name.clone());
        self.set_phase(Phase::End);
        self.events.record(SessionEvent::SessionEnded {
            winner,
            loser_name,
            player_victory: winner == self.player_side,
        });
        true
    }

    fn ensure_own_units(&self, ids: &[UnitId]) -> Result<(), SessionError> {
        for id in ids {
            let unit = self.unit(*id).ok_or(SessionError::UnknownUnit(*id))?;
            if unit.side != self.player_side {
                return Err(SessionError::NotYourUnit(*id));
            }
        }
        Ok(())
    }
}

fn validate(config: &SessionConfig) -> Result<(), SessionError> {
    config.validate().map_err(|e| match e {
        SettingsError::MissingLeader(side) => SessionError::MissingLeader(side),
        other => SessionError::Settings(other),
    })
}

/// Errors that can occur during session operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Operation needs the {expected} phase, session is in {actual}")]
    InvalidPhase { expected: Phase, actual: Phase },
    #[error("No units selected")]
    EmptySelection,
    #[error("Unknown unit #{0}")]
    UnknownUnit(UnitId),
    #[error("Unit #{0} belongs to the enemy")]
    NotYourUnit(UnitId),
    #[error("No enemy targeted")]
    NoTarget,
    #[error("The {0} army has no leader")]
    MissingLeader(Side),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl From<OrderError> for SessionError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptySelection => SessionError::EmptySelection,
            OrderError::UnknownUnit(id) => SessionError::UnknownUnit(id),
        }
    }
}
