//! Session settings and configuration.

use crate::hex::HexCoord;
use crate::roster::{self, WarlordSpec};
use crate::types::{Seed, Side, SizeClass};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest field a battle can be fought on.
pub const MIN_MAP_SIDE: u32 = 8;
/// Largest field a battle can be fought on.
pub const MAX_MAP_SIDE: u32 = 512;

/// Configuration for a battle session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Display name for the battle.
    pub name: String,
    /// Map width in tiles.
    pub map_width: u32,
    /// Map height in tiles.
    pub map_height: u32,
    /// Seed for terrain generation.
    pub map_seed: Seed,
    /// Seed for engagement and plot rolls.
    pub combat_seed: Seed,
    /// Army commanded by the human player.
    pub player_side: Side,
    /// Pause between visual beats in milliseconds (0 = no pause).
    pub beat_ms: u64,
    /// Maximum number of turns (0 = unlimited).
    pub max_turns: u32,
    /// Warlords taking the field.
    pub roster: Vec<WarlordSpec>,
}

impl SessionConfig {
    /// Create the historical battle.
    pub fn new(name: String) -> Self {
        Self {
            name,
            map_width: 60,
            map_height: 60,
            map_seed: 1600,
            combat_seed: 1021,
            player_side: Side::East,
            beat_ms: 0,
            max_turns: 0,
            roster: roster::sekigahara(),
        }
    }

    /// Create a quick three-against-three clash on a small field.
    pub fn skirmish(name: String) -> Self {
        let spec = |name: &str, side, soldiers, q, r, leader| WarlordSpec {
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
        };
        Self {
            name,
            map_width: 20,
            map_height: 20,
            map_seed: 7,
            combat_seed: 7,
            player_side: Side::East,
            beat_ms: 0,
            max_turns: 100,
            roster: vec![
                spec("Eastern Lord", Side::East, 4000, 16, 4, true),
                spec("Eastern Vanguard", Side::East, 1500, 13, 3, false),
                spec("Eastern Rearguard", Side::East, 1500, 14, 6, false),
                spec("Western Lord", Side::West, 4000, 4, 15, true),
                spec("Western Vanguard", Side::West, 1500, 6, 13, false),
                spec("Western Rearguard", Side::West, 1500, 3, 12, false),
            ],
        }
    }

    /// Parse a config from TOML. Missing fields fall back to the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        toml::from_str(source).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Validate settings and return the first problem found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.name.is_empty() {
            return Err(SettingsError::EmptyName);
        }
        if self.name.len() > 64 {
            return Err(SettingsError::NameTooLong);
        }
        if self.map_width < MIN_MAP_SIDE || self.map_height < MIN_MAP_SIDE {
            return Err(SettingsError::MapTooSmall {
                width: self.map_width,
                height: self.map_height,
            });
        }
        if self.map_width > MAX_MAP_SIDE || self.map_height > MAX_MAP_SIDE {
            return Err(SettingsError::MapTooLarge {
                width: self.map_width,
                height: self.map_height,
            });
        }

        for (index, warlord) in self.roster.iter().enumerate() {
            if warlord.name.trim().is_empty() {
                return Err(SettingsError::UnnamedWarlord(index));
            }
            if warlord.soldiers == 0 {
                return Err(SettingsError::NoSoldiers(warlord.name.clone()));
            }
            if !warlord.position.in_bounds(self.map_width, self.map_height) {
                return Err(SettingsError::OutOfBounds {
                    name: warlord.name.clone(),
                    position: warlord.position,
                });
            }
            if let Some(other) = self.roster[..index]
                .iter()
                .find(|w| w.position == warlord.position)
            {
                return Err(SettingsError::Overlap {
                    first: other.name.clone(),
                    second: warlord.name.clone(),
                    position: warlord.position,
                });
            }
        }

        for side in Side::all() {
            match self
                .roster
                .iter()
                .filter(|w| w.side == *side && w.leader)
                .count()
            {
                0 => return Err(SettingsError::MissingLeader(*side)),
                1 => {}
                _ => return Err(SettingsError::DuplicateLeader(*side)),
            }
        }
        Ok(())
    }

    /// Pause between visual beats.
    pub fn beat(&self) -> Duration {
        Duration::from_millis(self.beat_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("Sekigahara".to_string())
    }
}

/// Errors from invalid session settings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Battle name cannot be empty")]
    EmptyName,
    #[error("Battle name must be 64 characters or less")]
    NameTooLong,
    #[error("Map {width}x{height} is too small")]
    MapTooSmall { width: u32, height: u32 },
    #[error("Map {width}x{height} is too large")]
    MapTooLarge { width: u32, height: u32 },
    #[error("Roster entry {0} has no name")]
    UnnamedWarlord(usize),
    #[error("{0} has no soldiers")]
    NoSoldiers(String),
    #[error("{name} is placed off the map at {position}")]
    OutOfBounds { name: String, position: HexCoord },
    #[error("{first} and {second} both stand at {position}")]
    Overlap {
        first: String,
        second: String,
        position: HexCoord,
    },
    #[error("The {0} army has no leader")]
    MissingLeader(Side),
    #[error("The {0} army has more than one leader")]
    DuplicateLeader(Side),
    #[error("Invalid config: {0}")]
    Parse(String),
}
