//! Session events for presentation and audio collaborators.
//!
//! The engine never touches a screen or a speaker. Instead every observable
//! change is recorded here and drained by whoever draws or plays it:
//! - phase changes drive the HUD
//! - appended effects feed the renderer
//! - the end event carries `player_victory` so audio can pick fanfare or lament

use crate::effects::Effect;
use crate::session::Phase;
use crate::types::{Side, UnitId};
use serde::{Deserialize, Serialize};

/// Something observers should know about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The command phase opened for the first time.
    SessionStarted { player_side: Side },
    /// The phase machine moved.
    PhaseChanged { from: Phase, to: Phase },
    /// A unit's resolution produced visual feedback.
    EffectsAppended {
        unit_id: UnitId,
        effects: Vec<Effect>,
    },
    /// A unit's resolution failed; the turn carried on without it.
    ResolutionFault { unit_id: UnitId, message: String },
    /// A leader fell.
    SessionEnded {
        winner: Side,
        loser_name: String,
        player_victory: bool,
    },
}

impl SessionEvent {
    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            SessionEvent::SessionStarted { player_side } => {
                format!("Battle begins, commanding the {} army", player_side)
            }
            SessionEvent::PhaseChanged { from, to } => format!("{} -> {}", from, to),
            SessionEvent::EffectsAppended { unit_id, effects } => {
                format!("Unit {} produced {} effects", unit_id, effects.len())
            }
            SessionEvent::ResolutionFault { unit_id, message } => {
                format!("Unit {} failed to resolve: {}", unit_id, message)
            }
            SessionEvent::SessionEnded {
                winner, loser_name, ..
            } => format!("{} has fallen, the {} army wins", loser_name, winner),
        }
    }
}

/// An event stamped with the turn it happened in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Turn number (0 before the first commit).
    pub turn: u32,
    /// Sequence number within the turn, starting at 1.
    pub sequence: u32,
    pub event: SessionEvent,
}

/// Ordered buffer of events waiting to be drained.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    turn: u32,
    sequence: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to a later turn. Earlier turns are ignored.
    pub fn set_turn(&mut self, turn: u32) {
        if turn > self.turn {
            self.turn = turn;
            self.sequence = 0;
        }
    }

    /// Stamp and store an event.
    pub fn record(&mut self, event: SessionEvent) {
        self.sequence += 1;
        tracing::trace!(turn = self.turn, sequence = self.sequence, "{}", event.description());
        self.records.push(EventRecord {
            turn: self.turn,
            sequence: self.sequence,
            event,
        });
    }

    /// Get all pending records.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take every pending record, oldest first.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_resets_per_turn() {
        let mut log = EventLog::new();
        log.record(SessionEvent::SessionStarted {
            player_side: Side::East,
        });
        log.set_turn(1);
        log.record(SessionEvent::PhaseChanged {
            from: Phase::Order,
            to: Phase::Action,
        });
        log.record(SessionEvent::PhaseChanged {
            from: Phase::Action,
            to: Phase::Order,
        });

        let stamps: Vec<(u32, u32)> = log.records().iter().map(|r| (r.turn, r.sequence)).collect();
        assert_eq!(stamps, vec![(0, 1), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_set_turn_never_goes_back() {
        let mut log = EventLog::new();
        log.set_turn(3);
        log.set_turn(2);
        log.record(SessionEvent::ResolutionFault {
            unit_id: 4,
            message: "boom".to_string(),
        });
        assert_eq!(log.records()[0].turn, 3);
    }

    #[test]
    fn test_drain_empties_log() {
        let mut log = EventLog::new();
        log.record(SessionEvent::SessionStarted {
            player_side: Side::West,
        });
        assert_eq!(log.drain().len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_json_shape() {
        let event = SessionEvent::SessionEnded {
            winner: Side::West,
            loser_name: "Tokugawa Ieyasu".to_string(),
            player_victory: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "session_ended");
        assert_eq!(json["winner"], "west");
        assert_eq!(json["player_victory"], true);
        assert!(event.description().contains("Tokugawa Ieyasu"));
    }
}
