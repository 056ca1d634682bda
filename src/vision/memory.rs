//! Memorization and the deferred redraw queue
//!
//! Stages never redraw a cell directly. They queue it with `REDRAW`, and
//! optionally `NOTE` it for memorization; the delayed visual update drains
//! the queue once per dispatch.

use hecs::World;

use super::context::VisionContext;
use super::illumination::check_local_illumination;
use crate::data::VisionConfig;
use crate::entities::objects::mark_found;
use crate::entities::PlayerState;
use crate::world::{CellFlags, Map, Position, TerrainFlags};

/// One drained redraw request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redraw {
    pub pos: Position,
    /// The cell was considered for memorization before being handed out
    pub noted: bool,
}

/// Queue a cell, deduplicated through its `REDRAW` flag
pub(crate) fn queue_redraw(queue: &mut Vec<Position>, map: &mut Map, pos: Position, note: bool) {
    let Some(tile) = map.tile_mut(pos) else {
        return;
    };
    if note {
        tile.info.insert(CellFlags::NOTE);
    }
    if tile.set_flag(CellFlags::REDRAW) {
        queue.push(pos);
    }
}

/// Schedule a redraw of one cell
pub fn redraw_later(ctx: &mut VisionContext, map: &mut Map, pos: Position) {
    queue_redraw(&mut ctx.redraw, map, pos, false);
}

/// Schedule a redraw of one cell and consider it for memorization first
pub fn note_and_redraw_later(ctx: &mut VisionContext, map: &mut Map, pos: Position) {
    queue_redraw(&mut ctx.redraw, map, pos, true);
}

/// Empty the redraw queue without handing anything out
pub fn discard_redraws(ctx: &mut VisionContext, map: &mut Map) {
    for pos in ctx.redraw.drain(..) {
        if let Some(tile) = map.tile_mut(pos) {
            tile.info.remove(CellFlags::REDRAW | CellFlags::NOTE);
        }
    }
}

/// Memorize what the player can make out at `pos`.
///
/// Objects on a perceivable cell are marked found whether or not the
/// terrain itself gets `MARK`. Boring terrain is only memorized when the
/// matching option is set; anything else is memorized when it is open, lit
/// by a torch or monster, seen with dark vision, or lit from the player's
/// side. `KNOWN` is set on every perceivable cell.
pub fn note_spot(world: &World, map: &mut Map, player: &PlayerState, config: &VisionConfig, pos: Position) {
    if player.blind {
        return;
    }
    let Some(tile) = map.tile(pos) else {
        return;
    };
    let info = tile.info;

    if !info.is_torch_lit() {
        if !info.contains(CellFlags::VIEW) {
            return;
        }
        if !info.is_ambient_lit() && !player.dark_vision {
            return;
        }
    }

    mark_found(world, map, pos);

    if !info.contains(CellFlags::MARK) {
        let perceived = map.mimic_flags(pos);
        let mark = if !perceived.contains(TerrainFlags::REMEMBER) {
            (config.view_torch_grids && (info.is_torch_lit() || player.dark_vision))
                || (config.view_perma_grids && info.is_ambient_lit())
        } else {
            perceived.contains(TerrainFlags::LOS)
                || info.is_torch_lit()
                || player.dark_vision
                || check_local_illumination(map, player.pos, pos)
        };
        if mark {
            if let Some(tile) = map.tile_mut(pos) {
                tile.info.insert(CellFlags::MARK);
            }
        }
    }

    if let Some(tile) = map.tile_mut(pos) {
        tile.info.insert(CellFlags::KNOWN);
    }
}

/// Drain the redraw queue.
///
/// Every queued cell that still carries `REDRAW` is handed out exactly
/// once; cells flagged `NOTE` pass through [`note_spot`] first. Both flags
/// are cleared, so the queue is empty afterwards.
pub fn delayed_visual_update(
    ctx: &mut VisionContext,
    world: &World,
    map: &mut Map,
    player: &PlayerState,
    config: &VisionConfig,
) -> Vec<Redraw> {
    let queue = std::mem::take(&mut ctx.redraw);
    let mut drawn = Vec::with_capacity(queue.len());

    for pos in queue {
        let info = map.info(pos);
        if !info.contains(CellFlags::REDRAW) {
            continue;
        }
        let noted = info.contains(CellFlags::NOTE);
        if noted {
            note_spot(world, map, player, config, pos);
        }
        if let Some(tile) = map.tile_mut(pos) {
            tile.info.remove(CellFlags::NOTE | CellFlags::REDRAW);
        }
        drawn.push(Redraw { pos, noted });
    }

    drawn
}
