//! Battlefield map structure with tiles and spatial queries.

use crate::hex::HexCoord;
use crate::terrain::TerrainKind;
use serde::{Deserialize, Serialize};

/// The battlefield containing all tiles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// All tiles in row-major order.
    tiles: Vec<Tile>,
}

impl Map {
    /// Create a flat plain map with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TerrainKind::Plain)
    }

    /// Create a map filled with a single terrain kind (useful for testing).
    pub fn filled(width: u32, height: u32, terrain: TerrainKind) -> Self {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for r in 0..height as i32 {
            for q in 0..width as i32 {
                tiles.push(Tile::new(HexCoord::new(q, r), 0.0, terrain));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    fn index(&self, coord: &HexCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.r as usize * self.width as usize + coord.q as usize)
        } else {
            None
        }
    }

    /// Get the tile at the given coordinate.
    ///
    /// `None` means the coordinate lies outside the field.
    pub fn get(&self, coord: &HexCoord) -> Option<&Tile> {
        self.index(coord).and_then(|i| self.tiles.get(i))
    }

    /// Replace a tile. Out-of-bounds tiles are ignored.
    pub fn set(&mut self, tile: Tile) {
        if let Some(i) = self.index(&tile.coord) {
            self.tiles[i] = tile;
        }
    }

    /// Check if a coordinate is within the map bounds.
    pub fn in_bounds(&self, coord: &HexCoord) -> bool {
        coord.in_bounds(self.width, self.height)
    }

    /// Get valid neighbors of a hex (respecting map boundaries).
    pub fn neighbors(&self, coord: &HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.in_bounds(c))
            .collect()
    }

    /// Terrain kind at a coordinate, if on the map.
    pub fn terrain_at(&self, coord: &HexCoord) -> Option<TerrainKind> {
        self.get(coord).map(|t| t.terrain)
    }

    /// Count total tiles in the map.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate over all tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new(60, 60)
    }
}

/// A single cell of the battlefield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the map.
    pub coord: HexCoord,
    /// Elevation; negative for the river bed.
    pub height: f32,
    /// Terrain kind derived from the height.
    pub terrain: TerrainKind,
}

impl Tile {
    /// Create a new tile.
    pub fn new(coord: HexCoord, height: f32, terrain: TerrainKind) -> Self {
        Self {
            coord,
            height,
            terrain,
        }
    }

    /// Get the movement cost to enter this tile.
    pub fn movement_cost(&self) -> u32 {
        self.terrain.movement_cost()
    }

    /// Get the defense bonus for units on this tile.
    pub fn defense_bonus(&self) -> i32 {
        self.terrain.defense_bonus()
    }

    /// Check if this tile can be entered.
    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::new(HexCoord::default(), 0.0, TerrainKind::default())
    }
}
