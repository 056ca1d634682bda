//! Illumination classifier
//!
//! Whether the player can make out a cell right now, given the view field,
//! torch and monster light, ambient glow and the player's own senses.

use super::context::VisionContext;
use super::memory::note_and_redraw_later;
use crate::entities::PlayerState;
use crate::world::position::NEIGHBORS;
use crate::world::{CellFlags, Map, Position};

/// The cell is in the player's view field
#[inline]
pub fn player_has_los(map: &Map, pos: Position) -> bool {
    map.has_info(pos, CellFlags::VIEW)
}

/// Perceived-open and ambient-lit: light that reaches the player's side of
/// a wall
fn lit_opening(map: &Map, pos: Position) -> bool {
    map.looks_open(pos) && map.info(pos).is_ambient_lit()
}

/// Is the wall at `pos` lit from the side facing the player?
///
/// Looks at the up to three cells one step from `pos` towards the player.
/// A glowing room's wall seen from a dark corridor fails this test.
pub fn check_local_illumination(map: &Map, player_pos: Position, pos: Position) -> bool {
    let yy = pos.y - (pos.y - player_pos.y).signum();
    let xx = pos.x - (pos.x - player_pos.x).signum();

    lit_opening(map, Position::new(xx, yy))
        || lit_opening(map, Position::new(xx, pos.y))
        || lit_opening(map, Position::new(pos.x, yy))
}

/// Can the player currently perceive `pos` in detail
pub fn player_can_see(map: &Map, player: &PlayerState, pos: Position) -> bool {
    if player.blind {
        return false;
    }

    let info = map.info(pos);
    if info.is_torch_lit() {
        return true;
    }
    if !info.contains(CellFlags::VIEW) {
        return false;
    }
    if player.dark_vision {
        return true;
    }
    if !info.is_ambient_lit() {
        return false;
    }
    if map.looks_open(pos) {
        return true;
    }

    check_local_illumination(map, player.pos, pos)
}

/// The player stands in darkness
pub fn no_light(map: &Map, player: &PlayerState) -> bool {
    !player_can_see(map, player, player.pos)
}

/// Re-examine the cells whose wall lighting may depend on `pos`.
///
/// Called after the terrain or glow of `pos` changed. Only cells in view
/// are queued; they are noted and redrawn on the next delayed update.
pub fn update_local_illumination(ctx: &mut VisionContext, map: &mut Map, player_pos: Position, pos: Position) {
    if !map.in_bounds(pos) {
        return;
    }

    let mut touch = |map: &mut Map, x: i32, y: i32| {
        let cell = Position::new(x, y);
        if player_has_los(map, cell) {
            note_and_redraw_later(ctx, map, cell);
        }
    };

    let (x, y) = (pos.x, pos.y);
    let away_x = x + (x - player_pos.x).signum();
    let away_y = y + (y - player_pos.y).signum();

    if y != player_pos.y && x != player_pos.x {
        touch(map, away_x, away_y);
        touch(map, away_x, y);
        touch(map, x, away_y);
    } else if x != player_pos.x {
        for dy in -1..=1 {
            touch(map, away_x, y + dy);
        }
        touch(map, x, y - 1);
        touch(map, x, y + 1);
    } else if y != player_pos.y {
        for dx in -1..=1 {
            touch(map, x + dx, away_y);
        }
        touch(map, x - 1, y);
        touch(map, x + 1, y);
    } else {
        for (dx, dy) in NEIGHBORS {
            touch(map, x + dx, y + dy);
        }
    }
}
