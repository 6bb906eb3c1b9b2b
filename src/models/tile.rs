//! Grid coordinates, sub-tile lepton offsets, and pixel rectangles.

use std::ops::Add;

/// Number of leptons along one tile edge.
pub const LEPTONS_PER_TILE: i32 = 256;

/// Integer grid coordinate of one map tile.
///
/// This is the only key used by tile containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Step one tile in the given direction.
    pub fn step(self, direction: Direction) -> TilePos {
        let (dx, dy) = direction.delta();
        TilePos::new(self.x + dx, self.y + dy)
    }

    /// Offset by whole tiles.
    pub fn offset(self, dx: i32, dy: i32) -> TilePos {
        TilePos::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for TilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fine position inside (or relative to) a tile, 256 units per tile edge.
///
/// Only used for draw-priority math and visual offsets, never as a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lepton {
    pub x: i32,
    pub y: i32,
}

impl Lepton {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center of a single tile.
    pub const CENTER: Lepton = Lepton::new(LEPTONS_PER_TILE / 2, LEPTONS_PER_TILE / 2);

    /// Sort point for a multi-tile footprint: horizontally centered, half a
    /// tile above the bottom edge.
    pub fn footprint_center(width: u32, height: u32) -> Lepton {
        Lepton::new(
            width as i32 * LEPTONS_PER_TILE / 2,
            height as i32 * LEPTONS_PER_TILE - LEPTONS_PER_TILE / 2,
        )
    }
}

impl Add for Lepton {
    type Output = Lepton;

    fn add(self, rhs: Lepton) -> Lepton {
        Lepton::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// One of the four grid neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Pixel rectangle with an exclusive far edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

/// The visible part of the map grid, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl MapBounds {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width as i32
            && pos.y < self.y + self.height as i32
    }

    /// Pixel size of the rendered area for the given tile size.
    pub fn pixel_size(&self, tile_size: u32) -> (u32, u32) {
        (self.width * tile_size, self.height * tile_size)
    }
}
