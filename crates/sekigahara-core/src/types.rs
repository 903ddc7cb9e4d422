//! Core type aliases and small enums used throughout the crate.

use serde::{Deserialize, Serialize};

/// Unique identifier for a unit (roster index, never reused).
pub type UnitId = u64;

/// Seed for the deterministic generators.
pub type Seed = u64;

/// The two armies on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Tokugawa's eastern army.
    East,
    /// Ishida's western army.
    West,
}

impl Side {
    /// Get the opposing side.
    pub const fn opponent(&self) -> Side {
        match self {
            Side::East => Side::West,
            Side::West => Side::East,
        }
    }

    /// Get both sides in a fixed order (East first).
    pub const fn all() -> &'static [Side] {
        &[Side::East, Side::West]
    }

    /// Display color used for effects tied to this side.
    pub const fn color(&self) -> &'static str {
        match self {
            Side::East => "#3366FF",
            Side::West => "#FF3333",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::East => write!(f, "East"),
            Side::West => write!(f, "West"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "east" => Ok(Side::East),
            "west" => Ok(Side::West),
            other => Err(format!("unknown side '{}'", other)),
        }
    }
}

/// Footprint class of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    #[default]
    Small,
    Large,
}

impl SizeClass {
    /// Footprint radius in raw coordinate units (used for hit-testing).
    pub const fn radius(&self) -> f64 {
        match self {
            SizeClass::Small => 0.45,
            SizeClass::Large => 0.95,
        }
    }
}
