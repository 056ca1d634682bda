//! Monster light and darkness
//!
//! Monsters with a light aura brighten a small template around themselves,
//! monsters with a dark aura smother ambient glow. Both only ever touch
//! cells in the player's view, and walls are only lit on the face the
//! player can actually see.

use hecs::World;

use super::context::VisionContext;
use super::memory::queue_redraw;
use crate::data::VisionConfig;
use crate::entities::{Monster, PlayerState};
use crate::world::position::{CARDINALS, DIAGONALS, NEIGHBORS};
use crate::world::{distance, CellFlags, Map, Position};

/// Shown when a shadow cloak's wearer steps into monster light
pub const CLOAK_THIN: &str = "Your mantle of shadow becomes thin.";
/// Shown when a shadow cloak's wearer leaves monster light
pub const CLOAK_RESTORED: &str = "Your mantle of shadow is restored to its original darkness.";

/// Spreads one monster's aura
struct AuraPass<'a> {
    map: &'a mut Map,
    fresh: &'a mut Vec<Position>,
    player: Position,
    monster: Position,
    /// The monster itself is outside the view field
    monster_unseen: bool,
    dark: bool,
}

impl AuraPass<'_> {
    /// Does the aura carry through this cell
    fn passes(&self, pos: Position) -> bool {
        if self.dark {
            self.map.cave_los(pos) || self.map.cave_project(pos)
        } else {
            self.map.cave_los(pos)
        }
    }

    /// Keep an aura from leaking onto the far face of a wall: between the
    /// player and the monster only the wall cell nearest the line joining
    /// them takes the aura.
    fn occluded(&self, pos: Position) -> bool {
        let (p, m) = (self.player, self.monster);

        if (pos.y < p.y && pos.y > m.y) || (pos.y > p.y && pos.y < m.y) {
            let dpf = p.y - m.y;
            let d = pos.y - m.y;
            let midpoint = m.x + ((p.x - m.x) * d.abs()) / dpf.abs();

            if pos.x < midpoint {
                if !self.passes(pos.offset(1, 0)) {
                    return true;
                }
            } else if pos.x > midpoint {
                if !self.passes(pos.offset(-1, 0)) {
                    return true;
                }
            } else if self.monster_unseen {
                return true;
            }
        }

        if (pos.x < p.x && pos.x > m.x) || (pos.x > p.x && pos.x < m.x) {
            let dpf = p.x - m.x;
            let d = pos.x - m.x;
            let midpoint = m.y + ((p.y - m.y) * d.abs()) / dpf.abs();

            if pos.y < midpoint {
                if !self.passes(pos.offset(0, 1)) {
                    return true;
                }
            } else if pos.y > midpoint {
                if !self.passes(pos.offset(0, -1)) {
                    return true;
                }
            } else if self.monster_unseen {
                return true;
            }
        }

        false
    }

    fn add(&mut self, pos: Position) {
        let info = self.map.info(pos);
        let wanted = if self.dark {
            info & (CellFlags::LITE | CellFlags::MONSTER_LIT | CellFlags::MONSTER_DARK | CellFlags::VIEW)
        } else {
            info & (CellFlags::MONSTER_LIT | CellFlags::VIEW)
        };
        if wanted != CellFlags::VIEW {
            return;
        }
        if !self.passes(pos) && self.occluded(pos) {
            return;
        }

        let Some(tile) = self.map.tile_mut(pos) else {
            return;
        };
        if self.dark {
            tile.info.insert(CellFlags::MONSTER_DARK);
            self.fresh.push(pos);
        } else {
            // A cell darkened earlier this run is already listed
            if !tile.info.contains(CellFlags::MONSTER_DARK) {
                self.fresh.push(pos);
            } else {
                tile.info.remove(CellFlags::MONSTER_DARK);
            }
            tile.info.insert(CellFlags::MONSTER_LIT);
        }
    }

    /// Stamp the aura template for a radius of 1 to 3
    fn spread(&mut self, radius: i32) {
        let m = self.monster;
        self.add(m);
        for (dx, dy) in NEIGHBORS {
            self.add(m.offset(dx, dy));
        }

        if radius >= 2 {
            for (dx, dy) in CARDINALS {
                if !self.passes(m.offset(dx, dy)) {
                    continue;
                }
                let (px, py) = (dy.abs(), dx.abs());
                for s in -1..=1 {
                    self.add(m.offset(2 * dx + s * px, 2 * dy + s * py));
                }
                if radius == 3 && self.passes(m.offset(2 * dx, 2 * dy)) {
                    for s in -1..=1 {
                        self.add(m.offset(3 * dx + s * px, 3 * dy + s * py));
                    }
                }
            }
        }

        if radius == 3 {
            for (dx, dy) in DIAGONALS {
                if self.passes(m.offset(dx, dy)) {
                    self.add(m.offset(2 * dx, 2 * dy));
                }
            }
        }
    }
}

/// Recompute monster light and darkness.
///
/// `daytime` only matters in the town: light auras go out by day and dark
/// auras by night, unless they are innate. Updates `player.monster_lit` and
/// returns the shadow cloak message when that state flipped.
pub fn update_mon_lite(
    ctx: &mut VisionContext,
    map: &mut Map,
    world: &World,
    player: &mut PlayerState,
    config: &VisionConfig,
    daytime: bool,
) -> Option<&'static str> {
    let VisionContext {
        mon_lite,
        mon_scratch,
        redraw,
        ..
    } = ctx;

    for &pos in mon_lite.iter() {
        let Some(tile) = map.tile_mut(pos) else {
            continue;
        };
        if tile.info.contains(CellFlags::MONSTER_LIT) {
            mon_scratch.was_lit.insert(pos);
        } else {
            mon_scratch.was_dark.insert(pos);
        }
        tile.info.remove(CellFlags::MONSTER_LIT | CellFlags::MONSTER_DARK);
    }

    let dis_lim = if map.darkness && !player.dark_vision {
        config.max_sight / 2 + 1
    } else {
        config.max_sight + 3
    };
    let town = map.is_town();

    for (_, (&pos, monster)) in world.query::<(&Position, &Monster)>().iter() {
        if distance(player.pos, pos) > dis_lim {
            continue;
        }

        let mut radius = monster.aura.radius();
        let dark = radius < 0;
        if radius > 0 {
            if !monster.aura.self_luminous() && (monster.asleep || (town && daytime)) {
                continue;
            }
            if map.darkness {
                radius = 1;
            }
        } else if radius < 0 {
            if !monster.aura.self_darkening() && (monster.asleep || (town && !daytime)) {
                continue;
            }
            radius = -radius;
        } else {
            continue;
        }

        let monster_unseen = !map.has_info(pos, CellFlags::VIEW);
        let mut pass = AuraPass {
            map: &mut *map,
            fresh: &mut mon_scratch.fresh,
            player: player.pos,
            monster: pos,
            monster_unseen,
            dark,
        };
        pass.spread(radius);
    }

    for &pos in mon_lite.iter() {
        let info = map.info(pos);
        let changed = if mon_scratch.was_lit.contains(pos) {
            info & (CellFlags::VIEW | CellFlags::MONSTER_LIT) == CellFlags::VIEW
        } else {
            info & (CellFlags::VIEW | CellFlags::MONSTER_DARK) == CellFlags::VIEW
        };
        if changed {
            queue_redraw(redraw, map, pos, true);
        }
    }

    for &pos in mon_scratch.fresh.iter() {
        let info = map.info(pos);
        let changed = if info.contains(CellFlags::MONSTER_LIT) {
            info.contains(CellFlags::VIEW) && !mon_scratch.was_lit.contains(pos)
        } else {
            info.contains(CellFlags::VIEW) && !mon_scratch.was_dark.contains(pos)
        };
        if changed {
            queue_redraw(redraw, map, pos, true);
        }
    }

    *mon_lite = std::mem::take(&mut mon_scratch.fresh);
    mon_scratch.was_lit.clear();
    mon_scratch.was_dark.clear();

    let was_lit = player.monster_lit;
    player.monster_lit = map.has_info(player.pos, CellFlags::MONSTER_LIT);

    if player.shadow_cloak && was_lit != player.monster_lit {
        Some(if player.monster_lit { CLOAK_THIN } else { CLOAK_RESTORED })
    } else {
        None
    }
}

/// Drop every monster light and darkness mark without scheduling redraws
pub fn clear_mon_lite(ctx: &mut VisionContext, map: &mut Map) {
    for pos in ctx.mon_lite.drain(..) {
        if let Some(tile) = map.tile_mut(pos) {
            tile.info.remove(CellFlags::MONSTER_LIT | CellFlags::MONSTER_DARK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feat;
    use crate::entities::monsters::{move_monster, spawn_monster};
    use crate::entities::AuraFlags;
    use crate::vision::lite::update_lite;
    use crate::vision::view::update_view;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    struct Scene {
        map: Map,
        world: World,
        ctx: VisionContext,
        player: PlayerState,
        config: VisionConfig,
    }

    impl Scene {
        fn new(map: Map, player_pos: Position) -> Self {
            let mut ctx = VisionContext::new(map.width, map.height);
            let mut map = map;
            let player = PlayerState::new(player_pos);
            let config = VisionConfig::default();
            update_view(&mut ctx, &mut map, &player, &config);
            update_lite(&mut ctx, &mut map, &player);
            Self {
                map,
                world: World::new(),
                ctx,
                player,
                config,
            }
        }

        fn spawn(&mut self, pos: Position, monster: Monster) -> hecs::Entity {
            spawn_monster(&mut self.world, &mut self.map, pos, monster).unwrap()
        }

        fn update(&mut self, daytime: bool) -> Option<&'static str> {
            update_mon_lite(
                &mut self.ctx,
                &mut self.map,
                &self.world,
                &mut self.player,
                &self.config,
                daytime,
            )
        }

        fn count(&self, flag: CellFlags) -> usize {
            self.map.tiles.iter().filter(|t| t.info.contains(flag)).count()
        }
    }

    fn lantern(aura: AuraFlags) -> Monster {
        Monster::new("lantern", aura)
    }

    #[test]
    fn test_light_templates() {
        for (aura, cells) in [
            (AuraFlags::HAS_LITE_1, 9),
            (AuraFlags::HAS_LITE_2, 21),
            (AuraFlags::HAS_LITE_1 | AuraFlags::HAS_LITE_2, 37),
        ] {
            let mut scene = Scene::new(Map::open(21, 21), p(10, 10));
            scene.spawn(p(14, 10), lantern(aura));
            scene.update(false);
            assert_eq!(scene.count(CellFlags::MONSTER_LIT), cells, "{:?}", aura);
            assert_eq!(scene.ctx.mon_lite().len(), cells);
        }
    }

    #[test]
    fn test_sleeping_monsters_need_innate_light() {
        let mut scene = Scene::new(Map::open(21, 21), p(10, 10));
        scene.spawn(p(14, 10), lantern(AuraFlags::HAS_LITE_1).sleeping());
        scene.update(false);
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 0);

        scene.spawn(p(6, 10), lantern(AuraFlags::SELF_LITE_1).sleeping());
        scene.update(false);
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 9);
        assert!(scene.map.has_info(p(6, 10), CellFlags::MONSTER_LIT));
    }

    #[test]
    fn test_town_daylight_outshines_monsters() {
        let mut map = Map::open(21, 21);
        map.depth = 0;
        let mut scene = Scene::new(map, p(10, 10));
        scene.spawn(p(14, 10), lantern(AuraFlags::HAS_LITE_1));
        scene.update(true);
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 0);
        scene.update(false);
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 9);
    }

    #[test]
    fn test_darkness_level_shrinks_light() {
        let mut map = Map::open(21, 21);
        map.darkness = true;
        let mut scene = Scene::new(map, p(10, 10));
        scene.spawn(p(14, 10), lantern(AuraFlags::HAS_LITE_2));
        scene.update(false);
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 9);
    }

    #[test]
    fn test_dark_aura_spares_torch_light() {
        let mut scene = Scene::new(Map::open(21, 21), p(10, 10));
        scene.spawn(p(12, 10), Monster::new("shade", AuraFlags::HAS_DARK_1));
        scene.update(false);

        // The player's torch covers x 9..=11, so column 11 stays lit
        assert!(scene.map.has_info(p(12, 10), CellFlags::MONSTER_DARK));
        assert!(scene.map.has_info(p(13, 11), CellFlags::MONSTER_DARK));
        assert!(!scene.map.has_info(p(11, 10), CellFlags::MONSTER_DARK));
        assert_eq!(scene.count(CellFlags::MONSTER_DARK), 6);
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 0);
    }

    #[test]
    fn test_light_overrides_darkness() {
        let mut scene = Scene::new(Map::open(21, 21), p(10, 10));
        scene.spawn(p(15, 10), Monster::new("shade", AuraFlags::HAS_DARK_1));
        scene.spawn(p(16, 10), lantern(AuraFlags::HAS_LITE_1));
        scene.update(false);

        let shared = p(16, 11);
        let info = scene.map.info(shared);
        assert!(info.contains(CellFlags::MONSTER_LIT) || info.contains(CellFlags::MONSTER_DARK));
        assert!(!info.contains(CellFlags::MONSTER_LIT | CellFlags::MONSTER_DARK));
        // Each cell is listed once whatever order the monsters ran in
        let mut listed = scene.ctx.mon_lite().to_vec();
        listed.sort_by_key(|pos| (pos.y, pos.x));
        listed.dedup();
        assert_eq!(listed.len(), scene.ctx.mon_lite().len());
        assert_eq!(listed.len(), 12);
    }

    #[test]
    fn test_second_update_queues_nothing() {
        let mut scene = Scene::new(Map::open(21, 21), p(10, 10));
        scene.spawn(p(14, 10), lantern(AuraFlags::HAS_LITE_2));
        scene.spawn(p(5, 5), Monster::new("shade", AuraFlags::SELF_DARK_1));
        scene.update(false);
        let queued = scene.ctx.pending_redraws().len();
        let before: Vec<_> = scene.map.tiles.iter().map(|t| t.info).collect();

        scene.update(false);
        let after: Vec<_> = scene.map.tiles.iter().map(|t| t.info).collect();
        assert_eq!(scene.ctx.pending_redraws().len(), queued);
        assert_eq!(before, after);
        assert!(scene.ctx.scratch_is_clear());
    }

    #[test]
    fn test_moving_monster_clears_old_light() {
        let mut scene = Scene::new(Map::open(21, 21), p(10, 10));
        let bearer = scene.spawn(p(14, 10), lantern(AuraFlags::HAS_LITE_1));
        scene.update(false);
        assert!(scene.map.has_info(p(15, 10), CellFlags::MONSTER_LIT));

        assert!(move_monster(&mut scene.world, &mut scene.map, bearer, p(14, 4)));
        scene.update(false);
        assert!(!scene.map.has_info(p(15, 10), CellFlags::MONSTER_LIT));
        assert!(scene.map.has_info(p(15, 4), CellFlags::MONSTER_LIT));
        assert!(scene.ctx.pending_redraws().contains(&p(15, 10)));
        assert!(scene.map.has_info(p(15, 10), CellFlags::NOTE));
    }

    fn walled_hall() -> Map {
        let mut map = Map::open(11, 11);
        for x in 0..11 {
            map.set_tile(p(x, 5), feat::WALL);
        }
        map
    }

    #[test]
    fn test_light_does_not_leak_through_walls() {
        let mut scene = Scene::new(walled_hall(), p(5, 8));
        let radiant = AuraFlags::HAS_LITE_1 | AuraFlags::HAS_LITE_2;
        scene.spawn(p(5, 2), lantern(radiant));
        scene.update(false);

        for x in 4..=6 {
            assert!(scene.map.has_info(p(x, 5), CellFlags::VIEW));
            assert!(!scene.map.has_info(p(x, 5), CellFlags::MONSTER_LIT), "wall ({}, 5) lit from behind", x);
        }
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 0);
    }

    #[test]
    fn test_light_reaches_wall_on_players_side() {
        let mut scene = Scene::new(walled_hall(), p(5, 9));
        scene.spawn(p(5, 6), lantern(AuraFlags::HAS_LITE_1));
        scene.update(false);
        assert!(scene.map.has_info(p(5, 5), CellFlags::MONSTER_LIT));
        assert!(scene.map.has_info(p(4, 5), CellFlags::MONSTER_LIT));
    }

    #[test]
    fn test_far_monsters_are_ignored() {
        let mut scene = Scene::new(Map::open(60, 3), p(1, 1));
        scene.spawn(p(40, 1), lantern(AuraFlags::SELF_LITE_1));
        scene.update(false);
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 0);
    }

    #[test]
    fn test_shadow_cloak_messages() {
        let mut scene = Scene::new(Map::open(21, 21), p(10, 10));
        scene.player.shadow_cloak = true;
        let bearer = scene.spawn(p(11, 10), lantern(AuraFlags::HAS_LITE_1));

        assert_eq!(scene.update(false), Some(CLOAK_THIN));
        assert!(scene.player.monster_lit);
        assert_eq!(scene.update(false), None);

        assert!(move_monster(&mut scene.world, &mut scene.map, bearer, p(18, 18)));
        assert_eq!(scene.update(false), Some(CLOAK_RESTORED));
        assert!(!scene.player.monster_lit);
    }

    #[test]
    fn test_clear_mon_lite() {
        let mut scene = Scene::new(Map::open(21, 21), p(10, 10));
        scene.spawn(p(14, 10), lantern(AuraFlags::HAS_LITE_1));
        scene.update(false);
        clear_mon_lite(&mut scene.ctx, &mut scene.map);
        assert!(scene.ctx.mon_lite().is_empty());
        assert_eq!(scene.count(CellFlags::MONSTER_LIT), 0);
    }
}
