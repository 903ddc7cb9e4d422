//! Headless Battle Runner
//!
//! Plays a full battle with the built-in planner commanding both armies and
//! prints the final state. Useful for balancing rosters and replaying seeds.

use clap::Parser;
use sekigahara_core::{
    CombatResolver, DefaultPlanner, Order, Planner, Seed, Session, SessionConfig, SessionError,
    SettingsError, Side, TurnScheduler, UnitId,
};
use std::path::PathBuf;

/// Headless battle runner - both armies commanded by the default planner
#[derive(Parser, Debug)]
#[command(name = "sekigahara-sim")]
#[command(about = "Run a Sekigahara battle to completion and report the outcome")]
struct Args {
    /// TOML session config (defaults to the historical battle)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the small six-unit skirmish instead of the historical roster
    #[arg(long, conflicts_with = "config")]
    skirmish: bool,

    /// Override both the map and combat seeds
    #[arg(long)]
    seed: Option<Seed>,

    /// Side treated as the player's army (east or west)
    #[arg(long)]
    side: Option<Side>,

    /// Turn limit before the battle is called a stalemate (0 = unlimited)
    #[arg(long)]
    max_turns: Option<u32>,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
enum SimError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Hard stop for configs that ask for an unlimited battle.
const TURN_CEILING: u32 = 10_000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        tracing::error!(error = %err, "battle aborted");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), SimError> {
    let config = load_config(&args).await?;
    let limit = match config.max_turns {
        0 => TURN_CEILING,
        n => n,
    };
    let resolver = CombatResolver::new(config.combat_seed).with_beat(config.beat());

    let mut session = Session::new(config)?;
    session.start()?;
    tracing::info!(
        name = session.name(),
        player = %session.player_side(),
        units = session.units().len(),
        "Starting battle"
    );

    let mut scheduler = TurnScheduler::new(DefaultPlanner, resolver);
    while !session.is_ended() && session.turn() < limit {
        command_player_army(&mut session)?;
        let report = scheduler.commit(&mut session).await?;
        tracing::info!(
            turn = report.turn,
            resolved = report.resolved.len(),
            faults = report.faults.len(),
            east = session.side_strength(Side::East),
            west = session.side_strength(Side::West),
            "turn resolved"
        );
        // Nothing renders the effects; keep the buffers from growing.
        session.drain_effects();
        session.drain_events();
    }

    if args.json {
        println!("{}", session.snapshot().to_json()?);
    } else {
        print_summary(&session);
    }
    Ok(())
}

async fn load_config(args: &Args) -> Result<SessionConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => {
            let source = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| SimError::Read {
                    path: path.clone(),
                    source,
                })?;
            SessionConfig::from_toml_str(&source)?
        }
        None if args.skirmish => SessionConfig::skirmish("Skirmish".to_string()),
        None => SessionConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.map_seed = seed;
        config.combat_seed = seed;
    }
    if let Some(side) = args.side {
        config.player_side = side;
    }
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    // No one is watching, so never pause between beats.
    config.beat_ms = 0;
    Ok(config)
}

/// Stand in for the human: give the player's army the planner's orders.
fn command_player_army(session: &mut Session) -> Result<(), SessionError> {
    let planner = DefaultPlanner;
    let player = session.player_side();
    let orders: Vec<(UnitId, Order)> = session
        .units()
        .iter()
        .filter(|u| u.side == player && u.is_alive())
        .filter_map(|u| {
            planner
                .decide_action(u, session.units(), session.map())
                .map(|order| (u.id, order))
        })
        .collect();

    for (unit_id, order) in orders {
        session.assign_orders(&[unit_id], order)?;
    }
    Ok(())
}

fn print_summary(session: &Session) {
    println!("{} - turn {}", session.name(), session.turn());
    for side in Side::all() {
        let alive = session
            .units()
            .iter()
            .filter(|u| u.side == *side && u.is_alive())
            .count();
        println!(
            "  {:<4} {:>6} soldiers in {} units",
            side.to_string(),
            session.side_strength(*side),
            alive
        );
    }
    match (session.winner(), session.loser_name()) {
        (Some(winner), Some(loser)) => println!("{} wins: {} has fallen", winner, loser),
        _ => println!("Stalemate: both leaders still stand"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["sekigahara-sim"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[tokio::test]
    async fn test_overrides_apply_to_preset() {
        let config = load_config(&args(&[
            "--skirmish",
            "--seed",
            "99",
            "--side",
            "west",
            "--max-turns",
            "12",
        ]))
        .await
        .unwrap();

        assert_eq!(config.roster.len(), 6);
        assert_eq!(config.map_seed, 99);
        assert_eq!(config.combat_seed, 99);
        assert_eq!(config.player_side, Side::West);
        assert_eq!(config.max_turns, 12);
        assert_eq!(config.beat_ms, 0);
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let err = load_config(&args(&["--config", "/nonexistent/battle.toml"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SimError::Read { .. }));
    }

    #[tokio::test]
    async fn test_bundled_skirmish_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/skirmish.toml");
        let config = load_config(&args(&["--config", path])).await.unwrap();

        assert_eq!(config.name, "Skirmish at Nangu-san");
        assert_eq!(config.roster.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_player_army_gets_orders() {
        let mut session = Session::new(SessionConfig::skirmish("Test".to_string())).unwrap();
        session.start().unwrap();
        command_player_army(&mut session).unwrap();

        let player = session.player_side();
        // Leaders hold; everyone else in the player's army marches
        assert!(session
            .units()
            .iter()
            .filter(|u| u.side == player && !u.is_leader)
            .all(|u| u.order.is_some()));
        assert!(session
            .units()
            .iter()
            .filter(|u| u.side != player)
            .all(|u| u.order.is_none()));
    }

    #[tokio::test]
    async fn test_skirmish_runs_to_limit_or_victory() {
        let args = args(&["--skirmish", "--max-turns", "30", "--json"]);
        assert!(run(args).await.is_ok());
    }
}
