//! Turn orchestration: planning, the resolution queue and the victory check.

use crate::ai::Planner;
use crate::events::SessionEvent;
use crate::order::{Order, OrderBoard};
use crate::resolver::{Resolution, Resolver};
use crate::session::{Phase, Session, SessionError};
use crate::types::UnitId;
use crate::unit::Unit;

/// What happened during one committed turn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnReport {
    /// Turn number.
    pub turn: u32,
    /// Units resolved, in queue order.
    pub resolved: Vec<(UnitId, Resolution)>,
    /// Units whose resolution failed.
    pub faults: Vec<UnitId>,
    /// Queued units that died before their slot came up.
    pub skipped: Vec<UnitId>,
    /// Queued units never reached because the battle ended.
    pub unprocessed: Vec<UnitId>,
}

/// Resolution order for a turn: every living unit, fewest soldiers first.
///
/// The sort is stable, so equal strengths keep roster order.
pub fn resolution_queue(units: &[Unit]) -> Vec<UnitId> {
    let mut queue: Vec<&Unit> = units.iter().filter(|u| u.is_alive()).collect();
    queue.sort_by_key(|u| u.soldiers);
    queue.into_iter().map(|u| u.id).collect()
}

/// Drives a session through command and action phases.
pub struct TurnScheduler<P, R> {
    planner: P,
    resolver: R,
}

impl<P: Planner, R: Resolver> TurnScheduler<P, R> {
    pub fn new(planner: P, resolver: R) -> Self {
        Self { planner, resolver }
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Close the command phase and resolve the turn.
    ///
    /// Only valid in the `Order` phase. Resolution faults are logged and
    /// reported as events; the phase always ends back in `Order` unless a
    /// leader fell.
    pub async fn commit(&mut self, session: &mut Session) -> Result<TurnReport, SessionError> {
        session.ensure_phase(Phase::Order)?;
        session.begin_turn();
        self.plan(session);
        session.set_phase(Phase::Action);

        let mut report = TurnReport {
            turn: session.turn(),
            ..Default::default()
        };
        let queue = resolution_queue(session.units());
        tracing::debug!(turn = report.turn, queued = queue.len(), "resolving turn");

        for (slot, &unit_id) in queue.iter().enumerate() {
            if !session.unit(unit_id).is_some_and(|u| u.is_alive()) {
                report.skipped.push(unit_id);
                continue;
            }

            let mark = session.effects().len();
            let (units, map, effects) = session.battlefield();
            match self.resolver.process_unit(unit_id, units, map, effects).await {
                Ok(resolution) => report.resolved.push((unit_id, resolution)),
                Err(err) => {
                    tracing::error!(unit = unit_id, error = %err, "resolution failed");
                    // The order is spent even when carrying it out failed
                    let (units, _, _) = session.battlefield();
                    if let Err(clear_err) = OrderBoard::new(units).clear(&[unit_id]) {
                        tracing::warn!(unit = unit_id, error = %clear_err, "could not drop order");
                    }
                    session.record(SessionEvent::ResolutionFault {
                        unit_id,
                        message: err.to_string(),
                    });
                    report.faults.push(unit_id);
                }
            }

            let appended = session.effects().since(mark).to_vec();
            if !appended.is_empty() {
                session.record(SessionEvent::EffectsAppended {
                    unit_id,
                    effects: appended,
                });
            }

            if session.check_victory() {
                report.unprocessed = queue[slot + 1..].to_vec();
                break;
            }
        }

        if session.phase() != Phase::End {
            session.set_phase(Phase::Order);
        }
        Ok(report)
    }

    /// Let the planner fill orders for every living computer-side unit.
    ///
    /// A unit the planner has nothing for keeps whatever order it had.
    fn plan(&self, session: &mut Session) {
        let player = session.player_side();
        let decisions: Vec<(UnitId, Order)> = session
            .units()
            .iter()
            .filter(|u| u.side != player && u.is_alive())
            .filter_map(|u| {
                self.planner
                    .decide_action(u, session.units(), session.map())
                    .map(|order| (u.id, order))
            })
            .collect();

        let (units, _, _) = session.battlefield();
        let mut board = OrderBoard::new(units);
        for (unit_id, order) in decisions {
            if let Err(err) = board.assign(&[unit_id], order) {
                tracing::warn!(unit = unit_id, error = %err, "planned order dropped");
            }
        }
    }
}
