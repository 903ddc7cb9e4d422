//! Sekigahara Core Library
//!
//! This crate contains the turn engine for Sekigahara, a hex-grid tactical
//! recreation of the battle of 1600. Players give orders during a command
//! phase; the engine then resolves every unit in a fixed order, reports what
//! happened as effects and events, and ends the battle when a leader falls.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: drawing, sound and input devices live elsewhere
//! - **Deterministic**: the same seeds always produce the same battle
//! - **Serializable**: snapshots, effects and events are serde types
//! - **One owner**: a single `Session` value, mutated only by `&mut`

// Core modules
pub mod hex;
pub mod map;
pub mod terrain;
pub mod types;

// Session state
pub mod session;
pub mod settings;

// Map generation
pub mod mapgen;

// Units and orders
pub mod order;
pub mod roster;
pub mod unit;

// Resolution
pub mod combat;
pub mod pathfinding;
pub mod resolver;

// Turn orchestration
pub mod ai;
pub mod scheduler;

// Feedback for presentation
pub mod effects;
pub mod events;

// Re-exports for convenience
pub use ai::{DefaultPlanner, HoldPlanner, Planner};
pub use combat::{resolve_combat, CombatContext, CombatResult};
pub use effects::{Effect, EffectBus, EffectKind};
pub use events::{EventRecord, SessionEvent};
pub use hex::{hex_to_pixel, is_valid_hex, pixel_to_hex, raw_distance, Camera, Facing, HexCoord, Point};
pub use map::{Map, Tile};
pub use mapgen::{MapGenConfig, MapGenerator, SeededRng};
pub use order::{Order, OrderBoard, OrderError, OrderKind};
pub use pathfinding::{closest_reachable, find_path, find_reachable, PathConfig, PathResult};
pub use resolver::{CombatResolver, Resolution, ResolveError, Resolver};
pub use roster::WarlordSpec;
pub use scheduler::{resolution_queue, TurnReport, TurnScheduler};
pub use session::{ClickOutcome, Phase, Session, SessionError, SessionSnapshot};
pub use settings::{SessionConfig, SettingsError};
pub use terrain::TerrainKind;
pub use types::*;
pub use unit::Unit;
