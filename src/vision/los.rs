//! Line-of-sight oracle
//!
//! Decides whether a straight sightline joins two cell centres, using only
//! the terrain. The view field calls this only for cells its cheap rules
//! cannot settle.

use crate::world::{Map, Position};

/// True if a sightline from the centre of `from` to the centre of `to`
/// crosses only sight-transmitting cells, endpoints excluded.
///
/// Adjacent and identical cells always see each other. The sweep runs
/// along the major axis with the fractional offset scaled by `2 * dx * dy`.
/// A line passing exactly through a tile corner is not blocked by the two
/// tiles meeting at that corner. Knight's moves only consult the orthogonal
/// cell next to `from`, which makes them asymmetric.
pub fn los(map: &Map, from: Position, to: Position) -> bool {
    if !map.in_bounds(from) || !map.in_bounds(to) {
        return false;
    }

    let dy = to.y - from.y;
    let dx = to.x - from.x;
    let ay = dy.abs();
    let ax = dx.abs();

    if ax < 2 && ay < 2 {
        return true;
    }

    let clear = |x: i32, y: i32| map.cave_los(Position::new(x, y));

    // Straight north/south
    if dx == 0 {
        let sy = dy.signum();
        let mut ty = from.y + sy;
        while ty != to.y {
            if !clear(from.x, ty) {
                return false;
            }
            ty += sy;
        }
        return true;
    }

    // Straight east/west
    if dy == 0 {
        let sx = dx.signum();
        let mut tx = from.x + sx;
        while tx != to.x {
            if !clear(tx, from.y) {
                return false;
            }
            tx += sx;
        }
        return true;
    }

    let sx = dx.signum();
    let sy = dy.signum();

    // Knight's moves
    if ax == 1 {
        if ay == 2 && clear(from.x, from.y + sy) {
            return true;
        }
    } else if ay == 1 && ax == 2 && clear(from.x + sx, from.y) {
        return true;
    }

    let f2 = ax * ay;
    let f1 = f2 << 1;

    if ax >= ay {
        // Travel horizontally; qy tracks the vertical offset scaled by f1
        let mut qy = ay * ay;
        let m = qy << 1;
        let mut tx = from.x + sx;
        let mut ty = from.y;

        // Slope of exactly one
        if qy == f2 {
            ty += sy;
            qy -= f1;
        }

        while tx != to.x {
            if !clear(tx, ty) {
                return false;
            }
            qy += m;
            if qy < f2 {
                tx += sx;
            } else if qy > f2 {
                ty += sy;
                if !clear(tx, ty) {
                    return false;
                }
                qy -= f1;
                tx += sx;
            } else {
                // Exactly on a corner
                ty += sy;
                qy -= f1;
                tx += sx;
            }
        }
    } else {
        // Travel vertically
        let mut qx = ax * ax;
        let m = qx << 1;
        let mut ty = from.y + sy;
        let mut tx = from.x;

        if qx == f2 {
            tx += sx;
            qx -= f1;
        }

        while ty != to.y {
            if !clear(tx, ty) {
                return false;
            }
            qx += m;
            if qx < f2 {
                ty += sy;
            } else if qx > f2 {
                tx += sx;
                if !clear(tx, ty) {
                    return false;
                }
                qx -= f1;
                ty += sy;
            } else {
                tx += sx;
                qx -= f1;
                ty += sy;
            }
        }
    }

    true
}
