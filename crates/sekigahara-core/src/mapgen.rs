//! Procedural battlefield generation.
//!
//! The generator is seeded so the same seed always yields the same field,
//! which keeps sessions reproducible in tests. The layout follows the
//! Sekigahara basin: two wooded peaks to the south, the Ibuki highland in the
//! north-west corner, and a river band running diagonally across the field.

use crate::hex::HexCoord;
use crate::map::{Map, Tile};
use crate::terrain::TerrainKind;
use crate::types::Seed;
use serde::{Deserialize, Serialize};

/// Tiles with `|q - r|` below this value lie in the river band.
pub const RIVER_BAND_WIDTH: i32 = 2;

/// Configuration for map generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapGenConfig {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Seed for the terrain noise.
    pub seed: Seed,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 60,
            seed: 1600,
        }
    }
}

/// A deterministic random number generator using xorshift.
///
/// This simple PRNG ensures that the same seed always produces
/// the same sequence of random numbers across all platforms.
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a seed.
    pub fn new(seed: Seed) -> Self {
        // Mix the seed bytes so nearby seeds diverge quickly
        let mut state: u64 = 0xcbf29ce484222325; // FNV offset basis
        for byte in seed.to_le_bytes() {
            state ^= byte as u64;
            state = state.wrapping_mul(0x100000001b3); // FNV prime
        }
        // Ensure non-zero state
        if state == 0 {
            state = 0x853c49e6748fea9b;
        }
        Self { state }
    }

    /// Generate next random u64.
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate a random u32.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Generate a random float in range [0.0, 1.0).
    pub fn next_f32(&mut self) -> f32 {
        // 24 bits keeps the result strictly below 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Generate a boolean with given probability of true.
    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

/// Shape of a named high-ground region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RegionShape {
    /// Every tile closer than `radius` (raw coordinates) to the center.
    Circle { center: HexCoord, radius: f32 },
    /// Every tile with `q < max_q` and `r < max_r`.
    Corner { max_q: i32, max_r: i32 },
}

/// A named region of raised ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighGround {
    pub name: &'static str,
    pub shape: RegionShape,
    /// Minimum height inside the region.
    pub base: f32,
    /// Random height added on top of `base`.
    pub spread: f32,
}

impl HighGround {
    fn contains(&self, coord: HexCoord) -> bool {
        match self.shape {
            RegionShape::Circle { center, radius } => {
                let dq = (coord.q - center.q) as f32;
                let dr = (coord.r - center.r) as f32;
                dq.hypot(dr) < radius
            }
            RegionShape::Corner { max_q, max_r } => coord.q < max_q && coord.r < max_r,
        }
    }
}

/// High ground of the battlefield, checked in order (first match wins).
pub const HIGH_GROUND: [HighGround; 3] = [
    HighGround {
        name: "Matsuo-yama",
        shape: RegionShape::Circle {
            center: HexCoord::new(5, 50),
            radius: 8.0,
        },
        base: 4.0,
        spread: 5.0,
    },
    HighGround {
        name: "Nangu-san",
        shape: RegionShape::Circle {
            center: HexCoord::new(50, 50),
            radius: 8.0,
        },
        base: 4.0,
        spread: 5.0,
    },
    HighGround {
        name: "Ibuki-yama",
        shape: RegionShape::Corner { max_q: 10, max_r: 20 },
        base: 6.0,
        spread: 4.0,
    },
];

/// Generates battlefields from a seed.
pub struct MapGenerator {
    rng: SeededRng,
    config: MapGenConfig,
}

impl MapGenerator {
    /// Create a new map generator with the given config.
    pub fn new(config: MapGenConfig) -> Self {
        Self {
            rng: SeededRng::new(config.seed),
            config,
        }
    }

    /// Convenience wrapper: generate a `width x height` field from `seed`.
    pub fn generate_with(width: u32, height: u32, seed: Seed) -> Map {
        Self::new(MapGenConfig {
            width,
            height,
            seed,
        })
        .generate()
    }

    /// Generate a complete map.
    pub fn generate(&mut self) -> Map {
        let mut map = Map::new(self.config.width, self.config.height);

        for r in 0..self.config.height as i32 {
            for q in 0..self.config.width as i32 {
                let coord = HexCoord::new(q, r);
                let height = self.height_at(coord);
                let in_band = (q - r).abs() < RIVER_BAND_WIDTH;
                let (terrain, height) = TerrainKind::classify(height, in_band);
                map.set(Tile::new(coord, height, terrain));
            }
        }

        tracing::debug!(
            width = self.config.width,
            height = self.config.height,
            seed = self.config.seed,
            "generated battlefield"
        );
        map
    }

    fn height_at(&mut self, coord: HexCoord) -> f32 {
        match HIGH_GROUND.iter().find(|region| region.contains(coord)) {
            Some(region) => region.base + self.rng.next_f32() * region.spread,
            None => 0.0,
        }
    }
}
