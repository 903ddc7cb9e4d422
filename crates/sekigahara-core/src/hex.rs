//! Hex coordinate system and screen projection for the battlefield.
//!
//! Uses offset "odd-r" coordinates where odd rows are shifted right, drawn as
//! pointy-top hexagons so the six neighbour directions line up with the six
//! unit facings. Two distance metrics exist and both are part of the contract:
//!
//! - [`HexCoord::distance`] counts hex steps and is used for every adjacency
//!   decision (attack reach, plot range, paths, AI targeting).
//! - [`raw_distance`] is the Euclidean length of the raw `(q, r)` difference
//!   and is only used for click hit-testing against a unit footprint.

use serde::{Deserialize, Serialize};

/// Edge length of one hex cell in world pixels.
pub const HEX_SIZE: f64 = 24.0;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Offset coordinates for the hex grid (odd-r).
///
/// In this coordinate system:
/// - `q` is the column (x-axis)
/// - `r` is the row (y-axis)
/// - Odd rows are shifted right by half a hex
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column coordinate
    pub q: i32,
    /// Row coordinate
    pub r: i32,
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

impl HexCoord {
    /// Create a new hex coordinate.
    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Get all 6 neighboring hexes in clockwise order starting from east.
    ///
    /// Returns neighbors in order: E, SE, SW, W, NW, NE, so index `k` lies in
    /// the direction of `Facing::new(k)`.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let (x, y, z) = self.to_cube();
        [
            HexCoord::from_cube(x + 1, y - 1, z),
            HexCoord::from_cube(x, y - 1, z + 1),
            HexCoord::from_cube(x - 1, y, z + 1),
            HexCoord::from_cube(x - 1, y + 1, z),
            HexCoord::from_cube(x, y + 1, z - 1),
            HexCoord::from_cube(x + 1, y, z - 1),
        ]
    }

    /// Calculate the distance to another hex (in hex steps).
    ///
    /// Uses cube coordinate conversion for accurate distance calculation.
    pub fn distance(&self, other: &HexCoord) -> u32 {
        let (x1, y1, z1) = self.to_cube();
        let (x2, y2, z2) = other.to_cube();

        let dx = (x1 - x2).abs();
        let dy = (y1 - y2).abs();
        let dz = (z1 - z2).abs();

        dx.max(dy).max(dz) as u32
    }

    /// Convert offset coordinates to cube coordinates.
    ///
    /// Cube coordinates satisfy x + y + z = 0 and are useful for
    /// distance calculations and rounding.
    pub fn to_cube(&self) -> (i32, i32, i32) {
        let x = self.q - (self.r - (self.r & 1)) / 2;
        let z = self.r;
        let y = -x - z;
        (x, y, z)
    }

    /// Create a HexCoord from cube coordinates.
    ///
    /// Note: Input must satisfy x + y + z = 0
    pub fn from_cube(x: i32, _y: i32, z: i32) -> Self {
        let q = x + (z - (z & 1)) / 2;
        let r = z;
        Self { q, r }
    }

    /// Check if this coordinate is within bounds of a rectangular map.
    pub fn in_bounds(&self, width: u32, height: u32) -> bool {
        self.q >= 0 && self.r >= 0 && (self.q as u32) < width && (self.r as u32) < height
    }

    /// Get all hexes within a given radius (inclusive).
    pub fn hexes_in_radius(&self, radius: u32) -> Vec<HexCoord> {
        let mut result = Vec::new();
        let r = radius as i32;

        for dq in -r..=r {
            for dr in -r..=r {
                let candidate = HexCoord::new(self.q + dq, self.r + dr);
                if self.distance(&candidate) <= radius {
                    result.push(candidate);
                }
            }
        }

        result
    }

    /// Round fractional cube coordinates to the containing hex.
    fn round_cube(x: f64, y: f64, z: f64) -> Self {
        let mut rx = x.round();
        let ry = y.round();
        let mut rz = z.round();

        let dx = (rx - x).abs();
        let dy = (ry - y).abs();
        let dz = (rz - z).abs();

        if dx > dy && dx > dz {
            rx = -ry - rz;
        } else if dy <= dz {
            rz = -rx - ry;
        }

        HexCoord::from_cube(rx as i32, ry as i32, rz as i32)
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// A point in world or screen pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pan/zoom transform between world pixels and screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen-space offset of the world origin.
    pub x: f64,
    pub y: f64,
    /// Scale factor applied before the offset.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Project a world point to the screen.
    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.x, world.y * self.zoom + self.y)
    }

    /// Undo the camera transform.
    pub fn to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.zoom, (screen.y - self.y) / self.zoom)
    }
}

/// World-pixel center of a hex.
pub fn hex_to_pixel(coord: HexCoord) -> Point {
    let x = HEX_SIZE * SQRT_3 * (coord.q as f64 + 0.5 * (coord.r & 1) as f64);
    let y = HEX_SIZE * 1.5 * coord.r as f64;
    Point::new(x, y)
}

/// Hex containing a screen point seen through `camera`.
pub fn pixel_to_hex(screen: Point, camera: &Camera) -> HexCoord {
    let world = camera.to_world(screen);
    let x = (SQRT_3 / 3.0 * world.x - 1.0 / 3.0 * world.y) / HEX_SIZE;
    let z = (2.0 / 3.0 * world.y) / HEX_SIZE;
    HexCoord::round_cube(x, -x - z, z)
}

/// Bounds check against the grid dimensions.
pub fn is_valid_hex(coord: HexCoord, width: u32, height: u32) -> bool {
    coord.in_bounds(width, height)
}

/// Euclidean length of the raw coordinate difference.
///
/// Not a hex metric: diagonal neighbours sit at `sqrt(2)`. Kept for footprint
/// hit-testing only.
pub fn raw_distance(a: HexCoord, b: HexCoord) -> f64 {
    let dq = (a.q - b.q) as f64;
    let dr = (a.r - b.r) as f64;
    dq.hypot(dr)
}

/// One of six discrete headings, 60 degrees apart, clockwise from +x.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facing(u8);

impl Facing {
    /// Pointing along +x (towards the eastern edge of the field).
    pub const EAST: Facing = Facing(0);
    /// Pointing along -x.
    pub const WEST: Facing = Facing(3);

    pub const fn new(direction: u8) -> Self {
        Facing(direction % 6)
    }

    pub const fn index(&self) -> u8 {
        self.0
    }

    /// Rotation in degrees for the renderer.
    pub fn degrees(&self) -> f64 {
        self.0 as f64 * 60.0
    }

    /// Heading of a step between two hexes, or `None` for a zero-length step.
    pub fn from_step(from: HexCoord, to: HexCoord) -> Option<Self> {
        if from == to {
            return None;
        }
        let a = hex_to_pixel(from);
        let b = hex_to_pixel(to);
        let angle = (b.y - a.y).atan2(b.x - a.x).to_degrees();
        let sector = (angle / 60.0).round() as i32;
        Some(Facing(sector.rem_euclid(6) as u8))
    }
}
