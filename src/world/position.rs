//! Grid coordinates and distance helpers

use serde::{Deserialize, Serialize};

/// The eight neighbour offsets as `(dx, dy)`, orthogonals first:
/// south, north, east, west, then south-east, south-west, north-east,
/// north-west.
pub const NEIGHBORS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Orthogonal offsets as `(dx, dy)`: south, north, east, west.
pub const CARDINALS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Diagonal offsets as `(dx, dy)`: south-east, south-west, north-east, north-west.
pub const DIAGONALS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

/// Position of a cell on the dungeon grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position shifted by `(dx, dy)`
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Approximate Euclidean distance, see [`distance`]
    pub fn distance(&self, other: &Position) -> i32 {
        distance(*self, *other)
    }
}

/// Integer approximation of the Euclidean distance between two cells.
///
/// Starts from `max + min / 2` and refines with Newton steps against the
/// squared distance until the correction rounds to zero. Straight lines
/// return the exact distance without refinement.
pub fn distance(a: Position, b: Position) -> i32 {
    let dy = (a.y - b.y).abs();
    let dx = (a.x - b.x).abs();

    let mut d = if dy > dx { dy + (dx >> 1) } else { dx + (dy >> 1) };
    if dy == 0 || dx == 0 {
        return d;
    }

    let target = dy * dy + dx * dx;
    loop {
        let err = (target - d * d) / (2 * d);
        if err == 0 {
            break;
        }
        d += err;
    }
    d
}
