//! Torch light field
//!
//! The cells lit by the player's own light source. Small radii use fixed
//! templates gated on the cells next to the player; larger radii scan the
//! bounding box with the `max + min / 2` distance estimate. Only cells in
//! the view field are ever lit.

use super::context::VisionContext;
use super::memory::queue_redraw;
use crate::entities::{PlayerState, MAX_LITE};
use crate::world::position::{CARDINALS, DIAGONALS, NEIGHBORS};
use crate::world::{CellFlags, Map, Position};

fn lite_add(map: &mut Map, lite: &mut Vec<Position>, pos: Position) {
    let Some(tile) = map.tile_mut(pos) else {
        return;
    };
    if !tile.info.contains(CellFlags::VIEW) {
        return;
    }
    if tile.set_flag(CellFlags::LITE) {
        lite.push(pos);
    }
}

/// Recompute the torch light field for the player's current radius
pub fn update_lite(ctx: &mut VisionContext, map: &mut Map, player: &PlayerState) {
    let VisionContext {
        lite,
        lite_scratch: was_lit,
        redraw,
        ..
    } = ctx;

    for pos in lite.drain(..) {
        if let Some(tile) = map.tile_mut(pos) {
            tile.info.remove(CellFlags::LITE);
        }
        was_lit.insert(pos);
    }

    let origin = player.pos;
    let radius = player.cur_lite.min(MAX_LITE);

    if radius >= 1 {
        lite_add(map, lite, origin);
        for (dx, dy) in NEIGHBORS {
            lite_add(map, lite, origin.offset(dx, dy));
        }
    }

    if radius >= 2 {
        for (dx, dy) in CARDINALS {
            if !map.cave_los(origin.offset(dx, dy)) {
                continue;
            }
            // Perpendicular unit, to fan out into a row of three
            let (px, py) = (dy.abs(), dx.abs());
            for s in -1..=1 {
                lite_add(map, lite, origin.offset(2 * dx + s * px, 2 * dy + s * py));
            }
        }
    }

    if radius >= 3 {
        for (dx, dy) in DIAGONALS {
            if map.cave_los(origin.offset(dx, dy)) {
                lite_add(map, lite, origin.offset(2 * dx, 2 * dy));
            }
        }

        let min_y = (origin.y - radius).max(0);
        let max_y = (origin.y + radius).min(map.height - 1);
        let min_x = (origin.x - radius).max(0);
        let max_x = (origin.x + radius).min(map.width - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dy = (origin.y - y).abs();
                let dx = (origin.x - x).abs();
                // The central 5x5 is settled by the templates
                if dy <= 2 && dx <= 2 {
                    continue;
                }
                let d = if dy > dx { dy + (dx >> 1) } else { dx + (dy >> 1) };
                if d > radius {
                    continue;
                }
                lite_add(map, lite, Position::new(x, y));
            }
        }
    }

    for &pos in lite.iter() {
        if !was_lit.contains(pos) {
            queue_redraw(redraw, map, pos, true);
        }
    }
    for pos in was_lit.iter() {
        if !map.has_info(pos, CellFlags::LITE) {
            queue_redraw(redraw, map, pos, false);
        }
    }
    was_lit.clear();

    log::debug!("torch radius {} lit {} cells", radius, lite.len());
}

/// Drop the whole torch field without scheduling any redraws
pub fn forget_lite(ctx: &mut VisionContext, map: &mut Map) {
    for pos in ctx.lite.drain(..) {
        if let Some(tile) = map.tile_mut(pos) {
            tile.info.remove(CellFlags::LITE);
        }
    }
}
