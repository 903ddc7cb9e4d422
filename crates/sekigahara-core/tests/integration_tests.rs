//! Integration tests for complete Sekigahara battle flows.
//!
//! These tests verify end-to-end scenarios including:
//! - Screen/hex geometry round trips
//! - Resolution ordering and the victory check
//! - Order placement rules
//! - Fault handling in the action phase
//! - Invariants over long randomized battles

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sekigahara_core::{
    hex_to_pixel, pixel_to_hex, resolution_queue, Camera, CombatResolver, DefaultPlanner,
    EffectBus, HexCoord, HoldPlanner, Map, Order, Planner, Phase, Resolution, ResolveError, Resolver,
    Session, SessionConfig, SessionError, SessionEvent, Side, SizeClass, TerrainKind,
    TurnScheduler, Unit, UnitId, WarlordSpec,
};
use std::collections::HashSet;

// =============================================================================
// Test Helpers
// =============================================================================

fn warlord(name: &str, side: Side, soldiers: u32, q: i32, r: i32, leader: bool) -> WarlordSpec {
    WarlordSpec {
        name: name.to_string(),
        side,
        soldiers,
        atk: 70,
        def: 70,
        position: HexCoord::new(q, r),
        size: if leader {
            SizeClass::Large
        } else {
            SizeClass::Small
        },
        leader,
    }
}

fn config(player_side: Side, roster: Vec<WarlordSpec>) -> SessionConfig {
    SessionConfig {
        player_side,
        roster,
        ..SessionConfig::skirmish("Integration".to_string())
    }
}

/// Start a session on a flat 20x20 plain.
fn start_flat(config: SessionConfig) -> Session {
    let mut session = Session::with_map(config, Map::filled(20, 20, TerrainKind::Plain)).unwrap();
    session.start().unwrap();
    session.drain_events();
    session
}

/// Resolver wrapper that remembers which units it was asked to resolve.
struct Recording<R> {
    inner: R,
    seen: Vec<UnitId>,
}

impl<R> Recording<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            seen: Vec::new(),
        }
    }
}

impl<R: Resolver> Resolver for Recording<R> {
    async fn process_unit(
        &mut self,
        unit_id: UnitId,
        units: &mut [Unit],
        map: &Map,
        effects: &mut EffectBus,
    ) -> Result<Resolution, ResolveError> {
        self.seen.push(unit_id);
        self.inner.process_unit(unit_id, units, map, effects).await
    }
}

/// Resolver that fails for one unit and behaves normally for the rest.
struct Faulty {
    inner: CombatResolver,
    broken: UnitId,
}

impl Resolver for Faulty {
    async fn process_unit(
        &mut self,
        unit_id: UnitId,
        units: &mut [Unit],
        map: &Map,
        effects: &mut EffectBus,
    ) -> Result<Resolution, ResolveError> {
        if unit_id == self.broken {
            return Err(ResolveError::Fault("wheel came off".to_string()));
        }
        self.inner.process_unit(unit_id, units, map, effects).await
    }
}

/// Resolver that wipes out one unit when another unit's slot comes up.
struct Assassin {
    inner: CombatResolver,
    actor: UnitId,
    victim: UnitId,
}

impl Resolver for Assassin {
    async fn process_unit(
        &mut self,
        unit_id: UnitId,
        units: &mut [Unit],
        map: &Map,
        effects: &mut EffectBus,
    ) -> Result<Resolution, ResolveError> {
        if unit_id == self.actor {
            if let Some(victim) = units.iter_mut().find(|u| u.id == self.victim) {
                let soldiers = victim.soldiers;
                victim.take_losses(soldiers);
            }
        }
        self.inner.process_unit(unit_id, units, map, effects).await
    }
}

/// The leader duel: West (player) leader right next to a nearly empty East leader,
/// with two big contingents far away that come later in the queue.
fn leader_duel() -> SessionConfig {
    let mut west_leader = warlord("Ishida Mitsunari", Side::West, 30000, 9, 10, true);
    west_leader.atk = 95;
    config(
        Side::West,
        vec![
            warlord("Tokugawa Ieyasu", Side::East, 10, 10, 10, true),
            west_leader,
            warlord("Eastern Host", Side::East, 40000, 18, 18, false),
            warlord("Western Host", Side::West, 50000, 1, 1, false),
        ],
    )
}

fn assert_invariants(session: &Session, ever_dead: &mut HashSet<UnitId>) {
    let (width, height) = (session.map().width, session.map().height);
    let mut occupied = HashSet::new();

    for unit in session.units() {
        assert!(unit.soldiers <= unit.max_soldiers, "{} over strength", unit.name);
        assert_eq!(unit.soldiers == 0, unit.dead, "{} death flag out of sync", unit.name);
        if ever_dead.contains(&unit.id) {
            assert!(unit.dead, "{} came back to life", unit.name);
        }
        if unit.dead {
            ever_dead.insert(unit.id);
            assert!(unit.order.is_none(), "{} is dead but holds an order", unit.name);
            continue;
        }
        assert!(unit.position.in_bounds(width, height), "{} off the map", unit.name);
        assert!(occupied.insert(unit.position), "two units share {}", unit.position);
    }

    for side in Side::all() {
        let leaders = session
            .units()
            .iter()
            .filter(|u| u.side == *side && u.is_leader)
            .count();
        assert_eq!(leaders, 1);
    }
}

// =============================================================================
// 1. Geometry
// =============================================================================

mod geometry {
    use super::*;

    #[test]
    fn test_screen_round_trip_whole_field() {
        let cameras = [
            Camera::default(),
            Camera {
                x: -320.0,
                y: 145.5,
                zoom: 0.3,
            },
            Camera {
                x: 812.0,
                y: -40.0,
                zoom: 2.0,
            },
        ];
        for camera in cameras {
            for r in 0..60 {
                for q in 0..60 {
                    let hex = HexCoord::new(q, r);
                    let screen = camera.to_screen(hex_to_pixel(hex));
                    assert_eq!(pixel_to_hex(screen, &camera), hex);
                }
            }
        }
    }
}

// =============================================================================
// 2. Resolution Ordering
// =============================================================================

mod resolution_order {
    use super::*;

    #[test]
    fn test_queue_ascending_by_soldiers() {
        let units: Vec<Unit> = [500, 800, 120]
            .iter()
            .enumerate()
            .map(|(i, &soldiers)| {
                Unit::from_spec(
                    i as UnitId,
                    &warlord("Unit", Side::East, soldiers, i as i32, 0, false),
                )
            })
            .collect();
        let soldiers: Vec<u32> = resolution_queue(&units)
            .into_iter()
            .map(|id| units[id as usize].soldiers)
            .collect();
        assert_eq!(soldiers, vec![120, 500, 800]);
    }

    #[tokio::test]
    async fn test_scheduler_follows_queue_with_stable_ties() {
        let mut session = start_flat(config(
            Side::East,
            vec![
                warlord("East Lord", Side::East, 500, 2, 2, true),
                warlord("West Lord", Side::West, 800, 17, 17, true),
                warlord("Scouts", Side::East, 120, 4, 2, false),
                warlord("Spears", Side::West, 800, 15, 17, false),
            ],
        ));
        let mut scheduler = TurnScheduler::new(HoldPlanner, Recording::new(CombatResolver::new(3)));

        scheduler.commit(&mut session).await.unwrap();
        assert_eq!(scheduler.resolver().seen, vec![2, 0, 1, 3]);
        assert_eq!(session.phase(), Phase::Order);
    }

    #[tokio::test]
    async fn test_units_killed_mid_turn_are_skipped() {
        let mut session = start_flat(config(
            Side::East,
            vec![
                warlord("East Lord", Side::East, 9000, 2, 2, true),
                warlord("West Lord", Side::West, 9000, 17, 17, true),
                warlord("Raiders", Side::East, 100, 10, 10, false),
                warlord("Picket", Side::West, 150, 11, 10, false),
            ],
        ));
        let mut scheduler = TurnScheduler::new(
            HoldPlanner,
            Recording::new(Assassin {
                inner: CombatResolver::new(5),
                actor: 2,
                victim: 3,
            }),
        );

        let report = scheduler.commit(&mut session).await.unwrap();
        assert_eq!(report.skipped, vec![3]);
        assert_eq!(scheduler.resolver().seen, vec![2, 0, 1]);
        assert!(session.unit(3).map(|u| u.dead).unwrap_or(false));
        assert_eq!(session.phase(), Phase::Order);
    }
}

// =============================================================================
// 3. Victory
// =============================================================================

mod victory {
    use super::*;

    #[tokio::test]
    async fn test_west_leader_attacks_east_leader() {
        let mut session = start_flat(leader_duel());
        let east_leader = session.leader(Side::East).map(|u| u.id).unwrap();
        let west_leader = session.leader(Side::West).map(|u| u.id).unwrap();

        session.select_units(&[west_leader]).unwrap();
        assert_eq!(session.issue_order(Order::Attack(east_leader)), Ok(1));

        let mut scheduler = TurnScheduler::new(HoldPlanner, Recording::new(CombatResolver::new(1600)));
        let report = scheduler.commit(&mut session).await.unwrap();

        assert_eq!(session.phase(), Phase::End);
        assert_eq!(session.winner(), Some(Side::West));
        assert_eq!(session.loser_name(), Some("Tokugawa Ieyasu"));
        assert!(session.unit(east_leader).map(|u| u.dead).unwrap_or(false));

        // The hosts come later in the queue and are never touched
        assert_eq!(scheduler.resolver().seen, vec![east_leader, west_leader]);
        assert_eq!(report.unprocessed, vec![2, 3]);

        let events: Vec<SessionEvent> = session.drain_events().into_iter().map(|r| r.event).collect();
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::EffectsAppended { unit_id, .. } if *unit_id == west_leader
        )));
        assert_eq!(
            events.last(),
            Some(&SessionEvent::SessionEnded {
                winner: Side::West,
                loser_name: "Tokugawa Ieyasu".to_string(),
                player_victory: true,
            })
        );
    }

    #[tokio::test]
    async fn test_end_is_terminal() {
        let mut session = start_flat(leader_duel());
        session.assign_orders(&[1], Order::Attack(0)).unwrap();
        let mut scheduler = TurnScheduler::new(HoldPlanner, CombatResolver::new(1600));
        scheduler.commit(&mut session).await.unwrap();
        assert_eq!(session.phase(), Phase::End);

        let snapshot = session.snapshot();
        assert!(matches!(
            scheduler.commit(&mut session).await,
            Err(SessionError::InvalidPhase {
                expected: Phase::Order,
                actual: Phase::End
            })
        ));
        assert!(matches!(
            session.assign_orders(&[3], Order::Move(HexCoord::new(2, 2))),
            Err(SessionError::InvalidPhase { .. })
        ));
        assert_eq!(session.snapshot(), snapshot);
    }

    #[tokio::test]
    async fn test_computer_loss_reports_player_victory_false() {
        // Player is East this time; the West leader marches into the East leader
        let mut session = start_flat(config(
            Side::East,
            vec![
                warlord("Tokugawa Ieyasu", Side::East, 10, 10, 10, true),
                warlord("Ishida Mitsunari", Side::West, 30000, 9, 10, true),
            ],
        ));
        let mut scheduler = TurnScheduler::new(DefaultPlanner, CombatResolver::new(1600));
        scheduler.commit(&mut session).await.unwrap();

        assert_eq!(session.winner(), Some(Side::West));
        let ended = session
            .events()
            .iter()
            .find_map(|r| match &r.event {
                SessionEvent::SessionEnded { player_victory, .. } => Some(*player_victory),
                _ => None,
            });
        assert_eq!(ended, Some(false));
    }
}

// =============================================================================
// 4. Orders and Phases
// =============================================================================

mod orders {
    use super::*;

    #[test]
    fn test_empty_selection_move_rejected() {
        let mut session = start_flat(leader_duel());
        let before = session.snapshot();

        assert!(session.selection().is_empty());
        assert_eq!(
            session.issue_order(Order::Move(HexCoord::new(5, 5))),
            Err(SessionError::EmptySelection)
        );
        assert_eq!(
            session.assign_orders(&[], Order::Move(HexCoord::new(5, 5))),
            Err(SessionError::EmptySelection)
        );
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test]
    async fn test_commit_rejected_before_start() {
        let mut session = Session::with_map(leader_duel(), Map::filled(20, 20, TerrainKind::Plain)).unwrap();
        let mut scheduler = TurnScheduler::new(HoldPlanner, CombatResolver::new(1));
        assert!(matches!(
            scheduler.commit(&mut session).await,
            Err(SessionError::InvalidPhase {
                actual: Phase::Init,
                ..
            })
        ));
        assert_eq!(session.phase(), Phase::Init);
    }

    #[tokio::test]
    async fn test_hold_planner_leaves_everyone_idle() {
        let mut session = start_flat(config(
            Side::West,
            vec![
                warlord("East Lord", Side::East, 5000, 15, 15, true),
                warlord("West Lord", Side::West, 5000, 2, 2, true),
            ],
        ));
        let mut scheduler = TurnScheduler::new(HoldPlanner, Recording::new(CombatResolver::new(1)));
        let report = scheduler.commit(&mut session).await.unwrap();
        assert!(report
            .resolved
            .iter()
            .all(|(_, resolution)| *resolution == Resolution::Idle));
    }
}

// =============================================================================
// 5. Idempotence and Faults
// =============================================================================

mod resolution {
    use super::*;

    #[tokio::test]
    async fn test_noop_resolution_is_idempotent() {
        let mut session = start_flat(leader_duel());
        let before = session.snapshot();
        let mut scheduler = TurnScheduler::new(HoldPlanner, CombatResolver::new(9));

        scheduler.commit(&mut session).await.unwrap();
        scheduler.commit(&mut session).await.unwrap();

        let after = session.snapshot();
        assert_eq!(after.units, before.units);
        assert_eq!(after.turn, 2);
        assert!(session.effects().is_empty());

        let mut units = after.units.clone();
        let mut effects = EffectBus::new();
        let mut resolver = CombatResolver::new(9);
        for _ in 0..2 {
            let result = resolver
                .process_unit(0, &mut units, session.map(), &mut effects)
                .await;
            assert_eq!(result, Ok(Resolution::Idle));
        }
        assert_eq!(units, after.units);
        assert!(effects.is_empty());
    }

    #[tokio::test]
    async fn test_fault_still_returns_to_order() {
        let mut session = start_flat(config(
            Side::East,
            vec![
                warlord("East Lord", Side::East, 5000, 2, 2, true),
                warlord("West Lord", Side::West, 5000, 17, 17, true),
                warlord("Runners", Side::East, 300, 4, 4, false),
            ],
        ));
        session.assign_orders(&[2], Order::Move(HexCoord::new(8, 4))).unwrap();
        session.assign_orders(&[0], Order::Move(HexCoord::new(2, 6))).unwrap();

        let mut scheduler = TurnScheduler::new(
            HoldPlanner,
            Faulty {
                inner: CombatResolver::new(2),
                broken: 2,
            },
        );
        let report = scheduler.commit(&mut session).await.unwrap();

        assert_eq!(session.phase(), Phase::Order);
        assert_eq!(report.faults, vec![2]);
        // The rest of the queue still ran
        assert_ne!(session.unit(0).map(|u| u.position), Some(HexCoord::new(2, 2)));
        let fault = session.events().iter().find_map(|r| match &r.event {
            SessionEvent::ResolutionFault { unit_id, message } => Some((*unit_id, message.clone())),
            _ => None,
        });
        assert_eq!(fault, Some((2, "wheel came off".to_string())));

        // The failed order is spent; the unit stays put
        let runners = session.unit(2).unwrap();
        assert!(runners.order.is_none());
        assert_eq!(runners.position, HexCoord::new(4, 4));
    }

    #[tokio::test]
    async fn test_cut_off_target_still_draws_attacker() {
        // The East leader's only approaches are held by western guards,
        // so the raider cannot reach it but should still march on it
        let mut session = start_flat(config(
            Side::East,
            vec![
                warlord("Tokugawa Ieyasu", Side::East, 5000, 0, 0, true),
                warlord("Ishida Mitsunari", Side::West, 5000, 19, 19, true),
                warlord("North Guard", Side::West, 3000, 1, 0, false),
                warlord("South Guard", Side::West, 3000, 0, 1, false),
                warlord("Raiders", Side::West, 1000, 10, 10, false),
            ],
        ));
        let start = HexCoord::new(10, 10);
        let mut scheduler = TurnScheduler::new(DefaultPlanner, CombatResolver::new(4));

        let report = scheduler.commit(&mut session).await.unwrap();
        let (first_id, first) = &report.resolved[0];
        assert_eq!(*first_id, 4);
        let Resolution::Advanced { to } = first else {
            panic!("raiders should close in, got {:?}", first);
        };
        assert_eq!(session.unit(4).map(|u| u.position), Some(*to));
        assert!(to.distance(&HexCoord::new(0, 0)) < start.distance(&HexCoord::new(0, 0)));
    }
}

// =============================================================================
// 6. Long Battles
// =============================================================================

mod long_battles {
    use super::*;

    fn random_orders(session: &mut Session, rng: &mut StdRng) {
        let player = session.player_side();
        let (width, height) = (session.map().width as i32, session.map().height as i32);
        let mine: Vec<UnitId> = session
            .units()
            .iter()
            .filter(|u| u.side == player && u.is_alive())
            .map(|u| u.id)
            .collect();
        let enemies: Vec<UnitId> = session
            .units()
            .iter()
            .filter(|u| u.side != player && u.is_alive())
            .map(|u| u.id)
            .collect();

        for id in mine {
            let enemy = enemies[rng.gen_range(0..enemies.len())];
            let order = match rng.gen_range(0..4) {
                0 => Order::Move(HexCoord::new(rng.gen_range(0..width), rng.gen_range(0..height))),
                1 => Order::Attack(enemy),
                2 => Order::Plot(enemy),
                _ => continue,
            };
            session.assign_orders(&[id], order).unwrap();
        }
    }

    #[tokio::test]
    async fn test_invariants_hold_over_many_turns() {
        for seed in [1u64, 2, 3] {
            let mut rng = StdRng::seed_from_u64(seed);
            let side = if rng.gen_bool(0.5) { Side::East } else { Side::West };
            let config = SessionConfig {
                player_side: side,
                map_seed: seed,
                combat_seed: seed * 31,
                ..SessionConfig::default()
            };
            let mut session = Session::new(config).unwrap();
            session.start().unwrap();
            let mut scheduler = TurnScheduler::new(DefaultPlanner, CombatResolver::new(seed));
            let mut ever_dead = HashSet::new();

            for _ in 0..40 {
                if session.is_ended() {
                    break;
                }
                random_orders(&mut session, &mut rng);
                scheduler.commit(&mut session).await.unwrap();
                assert_invariants(&session, &mut ever_dead);
                match session.phase() {
                    Phase::Order => {
                        assert!(session.units().iter().all(|u| u.order.is_none()));
                        assert!(session.winner().is_none());
                    }
                    Phase::End => assert!(session.winner().is_some()),
                    other => panic!("commit left the session in {}", other),
                }
                session.drain_effects();
                session.drain_events();
            }
        }
    }

    #[tokio::test]
    async fn test_same_seeds_same_battle() {
        async fn play() -> String {
            let mut session = Session::new(SessionConfig::skirmish("Replay".to_string())).unwrap();
            session.start().unwrap();
            let mut scheduler = TurnScheduler::new(DefaultPlanner, CombatResolver::new(77));
            for _ in 0..15 {
                if session.is_ended() {
                    break;
                }
                let mine: Vec<UnitId> = session
                    .units()
                    .iter()
                    .filter(|u| u.side == session.player_side() && u.is_alive())
                    .map(|u| u.id)
                    .collect();
                for id in mine {
                    let order = session
                        .unit(id)
                        .and_then(|u| DefaultPlanner.decide_action(u, session.units(), session.map()));
                    if let Some(order) = order {
                        session.assign_orders(&[id], order).unwrap();
                    }
                }
                scheduler.commit(&mut session).await.unwrap();
            }
            session.snapshot().to_json().unwrap()
        }

        assert_eq!(play().await, play().await);
    }
}
