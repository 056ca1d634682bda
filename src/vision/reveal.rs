//! Map reveal and terrain changes
//!
//! Magic mapping, enlightenment and amnesia, plus the single-cell terrain
//! and glow changes that have to keep the vision state coherent.

use hecs::World;

use super::context::VisionContext;
use super::illumination::{player_has_los, update_local_illumination};
use super::memory::{note_and_redraw_later, redraw_later};
use crate::data::VisionConfig;
use crate::entities::objects::{find_all_objects, forget_objects};
use crate::world::position::NEIGHBORS;
use crate::world::{distance, CellFlags, Map, Position, TerrainFlags, TerrainId};

/// Memorize a cell if its perceived terrain is worth remembering
fn remember(map: &mut Map, pos: Position) -> bool {
    if !map.mimic_flags(pos).contains(TerrainFlags::REMEMBER) {
        return false;
    }
    map.tile_mut(pos).map_or(false, |tile| tile.set_flag(CellFlags::MARK))
}

/// Magic mapping: learn the layout within `range` of `center`.
///
/// Every cell in range becomes `KNOWN`. Open cells also memorize the
/// interesting terrain around them, which outlines rooms and corridors.
/// On permanently dark levels the range is cut to a third.
pub fn map_area(ctx: &mut VisionContext, map: &mut Map, center: Position, range: i32) {
    let range = if map.darkness { range / 3 } else { range };

    for idx in 0..map.len() {
        let pos = map.pos_of(idx);
        if distance(center, pos) > range {
            continue;
        }
        map.tiles[idx].info.insert(CellFlags::KNOWN);

        if map.mimic_flags(pos).contains(TerrainFlags::WALL) {
            continue;
        }
        if remember(map, pos) {
            redraw_later(ctx, map, pos);
        }
        for (dx, dy) in NEIGHBORS {
            let nb = pos.offset(dx, dy);
            if remember(map, nb) {
                redraw_later(ctx, map, nb);
            }
        }
    }
}

/// Enlightenment: light and learn the whole level.
///
/// Every floor object is found. Each open cell and its neighbours become
/// `KNOWN` and glowing (unless the level is permanently dark) and are
/// memorized when interesting, or when glowing and glowing floors are
/// remembered.
pub fn wiz_lite(ctx: &mut VisionContext, world: &mut World, map: &mut Map, config: &VisionConfig) {
    find_all_objects(world);

    let glow = !map.darkness;
    let remember_glow = config.view_perma_grids && !config.view_torch_grids;

    for idx in 0..map.len() {
        let center = map.pos_of(idx);
        if map.mimic_flags(center).contains(TerrainFlags::WALL) {
            continue;
        }

        for (dx, dy) in NEIGHBORS.iter().copied().chain(std::iter::once((0, 0))) {
            let pos = center.offset(dx, dy);
            let interesting = map.mimic_flags(pos).contains(TerrainFlags::REMEMBER);
            let Some(tile) = map.tile_mut(pos) else {
                continue;
            };
            let before = tile.info;

            tile.info.insert(CellFlags::KNOWN);
            if glow {
                tile.info.insert(CellFlags::GLOW);
            }
            if interesting || (remember_glow && tile.info.contains(CellFlags::GLOW)) {
                tile.info.insert(CellFlags::MARK);
            }

            if tile.info != before {
                redraw_later(ctx, map, pos);
            }
        }
    }

    log::debug!("level enlightened");
}

/// Amnesia: forget the layout and every found object
pub fn wiz_dark(ctx: &mut VisionContext, world: &mut World, map: &mut Map) {
    for idx in 0..map.len() {
        let tile = &mut map.tiles[idx];
        let had_mark = tile.info.contains(CellFlags::MARK);
        tile.info.remove(CellFlags::MARK | CellFlags::KNOWN);
        if had_mark {
            let pos = map.pos_of(idx);
            redraw_later(ctx, map, pos);
        }
    }
    forget_objects(world);
}

/// Change the terrain of one cell.
///
/// Clears any mimic, forgets boring terrain, and queues the cell for a
/// note and redraw. Glowing terrain lights its 3x3 block unless the level
/// is permanently dark. Returns true when sight transmission changed, in
/// which case the caller must recompute the view, torch and monster light.
pub fn set_terrain(
    ctx: &mut VisionContext,
    map: &mut Map,
    player_pos: Position,
    pos: Position,
    terrain: TerrainId,
) -> bool {
    if !map.in_bounds(pos) {
        return false;
    }

    let old_los = map.cave_los(pos);
    let flags = map.terrain.flags(terrain);
    map.set_tile(pos, terrain);

    if !flags.contains(TerrainFlags::REMEMBER) {
        if let Some(tile) = map.tile_mut(pos) {
            tile.info.remove(CellFlags::MARK);
        }
    }
    note_and_redraw_later(ctx, map, pos);

    let los_changed = old_los != flags.contains(TerrainFlags::LOS);
    if los_changed {
        update_local_illumination(ctx, map, player_pos, pos);
    }

    if flags.contains(TerrainFlags::GLOW) && !map.darkness {
        for (dx, dy) in NEIGHBORS.iter().copied().chain(std::iter::once((0, 0))) {
            let cell = pos.offset(dx, dy);
            let Some(tile) = map.tile_mut(cell) else {
                continue;
            };
            tile.info.insert(CellFlags::GLOW);
            if player_has_los(map, cell) {
                note_and_redraw_later(ctx, map, cell);
            }
            update_local_illumination(ctx, map, player_pos, cell);
        }
    }

    los_changed
}

/// Turn ambient glow on or off at one cell.
///
/// A cell losing its glow forgets boring terrain unless torch-lit floors
/// are remembered anyway.
pub fn set_glow(
    ctx: &mut VisionContext,
    map: &mut Map,
    config: &VisionConfig,
    player_pos: Position,
    pos: Position,
    glow: bool,
) {
    let boring = !map.mimic_flags(pos).contains(TerrainFlags::REMEMBER);
    let Some(tile) = map.tile_mut(pos) else {
        return;
    };
    if glow {
        tile.info.insert(CellFlags::GLOW);
    } else {
        tile.info.remove(CellFlags::GLOW);
        if boring && !config.view_torch_grids {
            tile.info.remove(CellFlags::MARK);
        }
    }
    note_and_redraw_later(ctx, map, pos);
    update_local_illumination(ctx, map, player_pos, pos);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feat;
    use crate::entities::objects::drop_object;
    use crate::entities::FloorObject;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn room() -> Map {
        Map::from_ascii(&[
            "##########",
            "#........#",
            "#...@....#",
            "#........#",
            "####+#####",
            "#........#",
            "##########",
        ])
    }

    #[test]
    fn test_map_area_outlines_rooms() {
        let mut map = room();
        let mut ctx = VisionContext::new(map.width, map.height);
        map_area(&mut ctx, &mut map, p(4, 2), 30);

        assert!(map.has_info(p(0, 0), CellFlags::KNOWN));
        assert!(map.has_info(p(0, 1), CellFlags::MARK));
        assert!(map.has_info(p(4, 4), CellFlags::MARK));
        // Boring floor is known but not memorized
        assert!(map.has_info(p(2, 2), CellFlags::KNOWN));
        assert!(!map.has_info(p(2, 2), CellFlags::MARK));
        assert!(!ctx.pending_redraws().is_empty());
    }

    #[test]
    fn test_map_area_range() {
        let mut map = Map::open(40, 3);
        map.set_tile(p(30, 0), feat::WALL);
        map.set_tile(p(5, 0), feat::WALL);
        let mut ctx = VisionContext::new(40, 3);
        map_area(&mut ctx, &mut map, p(0, 1), 10);
        assert!(map.has_info(p(5, 0), CellFlags::MARK));
        assert!(!map.has_info(p(30, 0), CellFlags::MARK));
        assert!(!map.has_info(p(30, 0), CellFlags::KNOWN));

        let mut dark = Map::open(40, 3);
        dark.darkness = true;
        dark.set_tile(p(5, 0), feat::WALL);
        map_area(&mut ctx, &mut dark, p(0, 1), 10);
        assert!(!dark.has_info(p(5, 0), CellFlags::MARK));
        assert!(dark.has_info(p(3, 1), CellFlags::KNOWN));
    }

    #[test]
    fn test_wiz_lite_and_wiz_dark() {
        let mut map = room();
        let mut world = World::new();
        let mut ctx = VisionContext::new(map.width, map.height);
        let gem = drop_object(&mut world, &mut map, p(2, 5), FloorObject::new("gem")).unwrap();

        wiz_lite(&mut ctx, &mut world, &mut map, &VisionConfig::default());
        assert!(world.get::<&FloorObject>(gem).unwrap().found);
        for pos in [p(0, 0), p(2, 2), p(4, 4), p(8, 5)] {
            let info = map.info(pos);
            assert!(info.contains(CellFlags::KNOWN | CellFlags::GLOW | CellFlags::MARK), "{:?}", pos);
        }

        wiz_dark(&mut ctx, &mut world, &mut map);
        assert!(!world.get::<&FloorObject>(gem).unwrap().found);
        assert!(map.tiles.iter().all(|t| !t.info.intersects(CellFlags::MARK | CellFlags::KNOWN)));
        // Glow survives amnesia
        assert!(map.has_info(p(2, 2), CellFlags::GLOW));
    }

    #[test]
    fn test_wiz_lite_on_dark_level() {
        let mut map = room();
        map.darkness = true;
        let mut world = World::new();
        let mut ctx = VisionContext::new(map.width, map.height);
        wiz_lite(&mut ctx, &mut world, &mut map, &VisionConfig::default());
        assert!(!map.has_info(p(2, 2), CellFlags::GLOW));
        assert!(!map.has_info(p(2, 2), CellFlags::MARK));
        assert!(map.has_info(p(0, 0), CellFlags::MARK));
    }

    #[test]
    fn test_set_terrain_reports_sight_changes() {
        let mut map = room();
        let mut ctx = VisionContext::new(map.width, map.height);
        let door = p(4, 4);
        map.tile_mut(door).unwrap().info.insert(CellFlags::MARK);

        assert!(set_terrain(&mut ctx, &mut map, p(4, 2), door, feat::DOOR_OPEN));
        assert!(map.cave_los(door));
        assert!(map.has_info(door, CellFlags::MARK));
        assert!(map.has_info(door, CellFlags::NOTE));

        // Same transparency, no recompute needed
        assert!(!set_terrain(&mut ctx, &mut map, p(4, 2), door, feat::FLOOR));
        assert!(!map.has_info(door, CellFlags::MARK));

        assert!(!set_terrain(&mut ctx, &mut map, p(4, 2), p(-1, 0), feat::FLOOR));
    }

    #[test]
    fn test_set_terrain_clears_mimic() {
        let mut map = Map::from_ascii(&["#S#"]);
        let mut ctx = VisionContext::new(3, 1);
        set_terrain(&mut ctx, &mut map, p(0, 0), p(1, 0), feat::DOOR_CLOSED);
        assert_eq!(map.tile(p(1, 0)).unwrap().mimic, None);
    }

    #[test]
    fn test_glowing_terrain_lights_block() {
        let mut map = Map::open(7, 7);
        let mut ctx = VisionContext::new(7, 7);
        set_terrain(&mut ctx, &mut map, p(0, 0), p(3, 3), feat::LAVA);
        assert!(map.has_info(p(2, 2), CellFlags::GLOW));
        assert!(map.has_info(p(4, 4), CellFlags::GLOW));
        assert!(!map.has_info(p(5, 3), CellFlags::GLOW));
    }

    #[test]
    fn test_set_glow() {
        let mut map = Map::open(5, 5);
        let mut ctx = VisionContext::new(5, 5);
        let config = VisionConfig::default();
        let pos = p(3, 3);

        set_glow(&mut ctx, &mut map, &config, p(0, 0), pos, true);
        assert!(map.has_info(pos, CellFlags::GLOW));
        map.tile_mut(pos).unwrap().info.insert(CellFlags::MARK);

        set_glow(&mut ctx, &mut map, &config, p(0, 0), pos, false);
        assert!(!map.has_info(pos, CellFlags::GLOW));
        assert!(!map.has_info(pos, CellFlags::MARK));
        assert!(ctx.pending_redraws().contains(&pos));
    }
}
