//! Terrain kinds for the battlefield and the rules attached to them.

use serde::{Deserialize, Serialize};

/// Height above which a tile counts as high ground.
pub const MOUNTAIN_HEIGHT: f32 = 4.0;

/// Highest ground the river band can cut through.
pub const RIVER_MAX_HEIGHT: f32 = 3.0;

/// Height assigned to river tiles.
pub const RIVER_HEIGHT: f32 = -1.0;

/// Terrain kind of a tile, derived from its height during generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TerrainKind {
    #[default]
    Plain,
    Mountain,
    River,
}

impl TerrainKind {
    /// Classify a tile from its height and whether it lies in the river band.
    pub fn classify(height: f32, in_river_band: bool) -> (TerrainKind, f32) {
        if in_river_band && height < RIVER_MAX_HEIGHT {
            return (TerrainKind::River, RIVER_HEIGHT);
        }
        if height > MOUNTAIN_HEIGHT {
            (TerrainKind::Mountain, height)
        } else {
            (TerrainKind::Plain, height)
        }
    }

    /// Movement points needed to enter a tile of this kind.
    pub const fn movement_cost(&self) -> u32 {
        match self {
            TerrainKind::Plain => 1,
            TerrainKind::Mountain => 2,
            TerrainKind::River => 3,
        }
    }

    /// Defense modifier (percent) for troops standing on this terrain.
    pub const fn defense_bonus(&self) -> i32 {
        match self {
            TerrainKind::Plain => 0,
            TerrainKind::Mountain => 25,
            TerrainKind::River => -20,
        }
    }

    /// Every kind can be entered; cost limits how far a unit gets.
    pub const fn is_passable(&self) -> bool {
        true
    }
}

impl std::fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerrainKind::Plain => write!(f, "Plain"),
            TerrainKind::Mountain => write!(f, "Mountain"),
            TerrainKind::River => write!(f, "River"),
        }
    }
}
