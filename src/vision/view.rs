//! View field calculator
//!
//! Rebuilds the player's line-of-sight field without calling the LOS
//! oracle for every cell. Diagonals and axes are walked directly, then
//! eight octant strips grow outward where each cell is settled from its two
//! nearer neighbours. Only the ambiguous cases fall back to [`los`].
//!
//! Strips never scan further than the previous strip's last open cell, and
//! the octagon bound `max + min / 2 <= full` replaces a square root.

use super::context::VisionContext;
use super::los::los;
use super::memory::queue_redraw;
use super::scratch::CellSet;
use crate::data::VisionConfig;
use crate::entities::PlayerState;
use crate::world::{CellFlags, Map, Position};

/// Working state of one view rebuild
struct ViewPass<'a> {
    map: &'a mut Map,
    view: &'a mut Vec<Position>,
    easy: &'a mut CellSet,
    origin: Position,
}

impl ViewPass<'_> {
    fn add(&mut self, pos: Position) {
        if let Some(tile) = self.map.tile_mut(pos) {
            if tile.set_flag(CellFlags::VIEW) {
                self.view.push(pos);
            }
        }
    }

    /// Add a cell that is trivially visible
    fn add_easy(&mut self, pos: Position) {
        self.easy.insert(pos);
        self.add(pos);
    }

    fn in_view(&self, pos: Position) -> bool {
        self.map.has_info(pos, CellFlags::VIEW)
    }

    /// Walk a straight ray, stopping after the first cell that blocks sight.
    /// Returns the distance the walk stopped at, `limit + 1` if it never did.
    fn scan_ray(&mut self, (dx, dy): (i32, i32), limit: i32) -> i32 {
        let mut d = 1;
        while d <= limit {
            let pos = self.origin.offset(dx * d, dy * d);
            if !self.map.in_bounds(pos) {
                break;
            }
            self.add_easy(pos);
            if !self.map.cave_los(pos) {
                break;
            }
            d += 1;
        }
        d
    }

    /// Decide one strip cell from its diagonal and straight predecessors.
    /// Returns true if the cell blocks the strip.
    fn aux(&mut self, pos: Position, diagonal: Position, straight: Position) -> bool {
        let f1 = self.map.cave_los(diagonal);
        let f2 = self.map.cave_los(straight);
        if !f1 && !f2 {
            return true;
        }

        let v1 = f1 && self.in_view(diagonal);
        let v2 = f2 && self.in_view(straight);
        if !v1 && !v2 {
            return true;
        }

        let wall = !self.map.cave_los(pos);
        let z1 = v1 && self.easy.contains(diagonal);
        let z2 = v2 && self.easy.contains(straight);

        if z1 && z2 {
            self.add_easy(pos);
        } else if z1 || (v1 && v2) || wall || los(self.map, self.origin, pos) {
            self.add(pos);
        } else {
            return true;
        }

        wall
    }

    /// Scan strip `n` from `start` (the diagonal cell at distance `n`)
    /// along `step`, `side` pointing away from the axis. Returns the new
    /// blockage limit for the next strip.
    fn scan_strip(&mut self, n: i32, start: Position, step: (i32, i32), side: (i32, i32), m: i32, limit: i32) -> i32 {
        let mut k = n;
        for d in 1..=m {
            let pos = start.offset(step.0 * d, step.1 * d);
            let straight = pos.offset(-step.0, -step.1);
            let diagonal = straight.offset(-side.0, -side.1);
            if self.aux(pos, diagonal, straight) {
                if n + d >= limit {
                    break;
                }
            } else {
                k = n + d;
            }
        }
        k + 1
    }
}

/// Recompute the view field around the player.
///
/// Cells entering the view are noted and queued for redraw, cells leaving
/// it are queued for redraw. Running it twice with nothing changed queues
/// nothing the second time.
pub fn update_view(ctx: &mut VisionContext, map: &mut Map, player: &PlayerState, config: &VisionConfig) {
    let (full, over) = config.sight_bounds(map.is_town());
    let VisionContext {
        view,
        view_scratch,
        redraw,
        ..
    } = ctx;

    for pos in view.drain(..) {
        if let Some(tile) = map.tile_mut(pos) {
            tile.info.remove(CellFlags::VIEW);
        }
        view_scratch.seen.insert(pos);
    }

    let origin = player.pos;
    if map.in_bounds(origin) {
        let x_max = map.width - 1;
        let y_max = map.height - 1;
        let mut pass = ViewPass {
            map: &mut *map,
            view: &mut *view,
            easy: &mut view_scratch.easy,
            origin,
        };

        pass.add_easy(origin);

        let diag = full * 2 / 3;
        for dir in [(1, 1), (-1, 1), (1, -1), (-1, -1)] {
            pass.scan_ray(dir, diag);
        }

        let south = pass.scan_ray((0, 1), full);
        let north = pass.scan_ray((0, -1), full);
        let east = pass.scan_ray((1, 0), full);
        let west = pass.scan_ray((-1, 0), full);

        let (mut se, mut sw) = (south, south);
        let (mut ne, mut nw) = (north, north);
        let (mut es, mut en) = (east, east);
        let (mut ws, mut wn) = (west, west);

        for n in 1..=over / 2 {
            let mut z = (over - n - n).min(full - n);
            while z + n + (n >> 1) > full {
                z -= 1;
            }

            let ypn = origin.y + n;
            let ymn = origin.y - n;
            let xpn = origin.x + n;
            let xmn = origin.x - n;

            if ypn < y_max {
                let m = z.min(y_max - ypn);
                if xpn <= x_max && n < se {
                    se = pass.scan_strip(n, Position::new(xpn, ypn), (0, 1), (1, 0), m, se);
                }
                if xmn >= 0 && n < sw {
                    sw = pass.scan_strip(n, Position::new(xmn, ypn), (0, 1), (-1, 0), m, sw);
                }
            }

            if ymn > 0 {
                let m = z.min(ymn);
                if xpn <= x_max && n < ne {
                    ne = pass.scan_strip(n, Position::new(xpn, ymn), (0, -1), (1, 0), m, ne);
                }
                if xmn >= 0 && n < nw {
                    nw = pass.scan_strip(n, Position::new(xmn, ymn), (0, -1), (-1, 0), m, nw);
                }
            }

            if xpn < x_max {
                let m = z.min(x_max - xpn);
                if ypn <= y_max && n < es {
                    es = pass.scan_strip(n, Position::new(xpn, ypn), (1, 0), (0, 1), m, es);
                }
                if ymn >= 0 && n < en {
                    en = pass.scan_strip(n, Position::new(xpn, ymn), (1, 0), (0, -1), m, en);
                }
            }

            if xmn > 0 {
                let m = z.min(xmn);
                if ypn <= y_max && n < ws {
                    ws = pass.scan_strip(n, Position::new(xmn, ypn), (-1, 0), (0, 1), m, ws);
                }
                if ymn >= 0 && n < wn {
                    wn = pass.scan_strip(n, Position::new(xmn, ymn), (-1, 0), (0, -1), m, wn);
                }
            }
        }
    }

    view_scratch.easy.clear();

    for &pos in view.iter() {
        if !view_scratch.seen.contains(pos) {
            queue_redraw(redraw, map, pos, true);
        }
    }
    for pos in view_scratch.seen.iter() {
        if !map.has_info(pos, CellFlags::VIEW) {
            queue_redraw(redraw, map, pos, false);
        }
    }
    view_scratch.seen.clear();

    log::debug!("view rebuilt around {:?}: {} cells", origin, view.len());
}

/// Drop the whole view field without scheduling any redraws
pub fn forget_view(ctx: &mut VisionContext, map: &mut Map) {
    for pos in ctx.view.drain(..) {
        if let Some(tile) = map.tile_mut(pos) {
            tile.info.remove(CellFlags::VIEW);
        }
    }
}
