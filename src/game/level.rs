//! Level session
//!
//! A `Level` owns one dungeon level: the grid, the ECS world with its
//! monsters and objects, the player, and the vision bookkeeping. Mutation
//! triggers only raise update flags; `update_stuff` settles them.

use hecs::{Entity, World};

use super::time::DayClock;
use crate::data::{default_terrain_table, DataManager, VisionConfig};
use crate::entities::monsters::{move_monster, remove_monster, spawn_monster};
use crate::entities::objects::{detect_objects, drop_object, pick_up};
use crate::entities::{FloorObject, Monster, PlayerState, MAX_LITE};
use crate::vision::flow::forget_flow;
use crate::vision::lite::forget_lite;
use crate::vision::memory::{discard_redraws, redraw_later};
use crate::vision::mon_lite::clear_mon_lite;
use crate::vision::view::forget_view;
use crate::vision::{
    player_can_see, reveal, update_stuff, FlowReport, Redraw, UpdateFlags, VisionContext,
};
use crate::world::{CellFlags, Map, Position, TerrainFlags, TerrainId};

/// Keep only this many messages
const MESSAGE_LIMIT: usize = 100;

/// One dungeon level and everything the vision engine tracks on it
pub struct Level {
    map: Map,
    /// Monsters and floor objects
    world: World,
    player: PlayerState,
    ctx: VisionContext,
    config: VisionConfig,
    /// Work raised by triggers and not yet dispatched
    pending: UpdateFlags,
    /// Drained cells waiting for the renderer
    redraws: Vec<Redraw>,
    messages: Vec<String>,
    clock: DayClock,
    last_flow: Option<FlowReport>,
}

impl Level {
    /// Wrap a map, with the player on its start position
    pub fn new(map: Map, config: VisionConfig) -> Self {
        let ctx = VisionContext::new(map.width, map.height);
        let player = PlayerState::new(map.start_pos);
        let clock = DayClock::new(config.day_length);
        Self {
            map,
            world: World::new(),
            player,
            ctx,
            config,
            pending: UpdateFlags::empty(),
            redraws: Vec::new(),
            messages: Vec::new(),
            clock,
            last_flow: None,
        }
    }

    /// Wrap a map using loaded engine data. A map built over the built-in
    /// terrain table picks up the loaded one instead.
    pub fn with_data(mut map: Map, data: &DataManager) -> Self {
        if map.terrain == default_terrain_table() {
            map.terrain = data.terrain.clone();
        }
        Self::new(map, data.config.clone())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn context(&self) -> &VisionContext {
        &self.ctx
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    /// Work not yet dispatched
    pub fn pending(&self) -> UpdateFlags {
        self.pending
    }

    /// Result of the last flow update, if it ran
    pub fn last_flow(&self) -> Option<FlowReport> {
        self.last_flow
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    fn add_message(&mut self, text: impl Into<String>) {
        self.messages.push(text.into());
        if self.messages.len() > MESSAGE_LIMIT {
            self.messages.remove(0);
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Run every pending update once
    pub fn update_stuff(&mut self) {
        if self.pending.is_empty() && self.ctx.pending_redraws().is_empty() {
            return;
        }
        let outcome = update_stuff(
            &mut self.pending,
            &mut self.ctx,
            &self.world,
            &mut self.map,
            &mut self.player,
            &self.config,
            self.clock.is_daytime(),
        );
        if outcome.flow.is_some() {
            self.last_flow = outcome.flow;
        }
        if let Some(message) = outcome.message {
            self.add_message(message);
        }
        self.redraws.extend(outcome.redraws);
    }

    /// Hand the renderer every cell that changed since the last call
    pub fn take_redraws(&mut self) -> Vec<Redraw> {
        std::mem::take(&mut self.redraws)
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    /// Arrive on the level: everything is recomputed from scratch
    pub fn enter_level(&mut self) {
        forget_flow(&mut self.ctx, &mut self.map);
        self.pending |= UpdateFlags::UN_VIEW | UpdateFlags::UN_LITE | UpdateFlags::MOVED;
        log::info!(
            "Entered level {} ({}x{}) at {:?}",
            self.map.depth,
            self.map.width,
            self.map.height,
            self.player.pos
        );
    }

    /// Leave the level: the view, light, monster light and flow are dropped
    pub fn leave_level(&mut self) {
        forget_lite(&mut self.ctx, &mut self.map);
        forget_view(&mut self.ctx, &mut self.map);
        clear_mon_lite(&mut self.ctx, &mut self.map);
        forget_flow(&mut self.ctx, &mut self.map);
        discard_redraws(&mut self.ctx, &mut self.map);
        self.pending = UpdateFlags::empty();
        self.redraws.clear();
        log::info!("Left level {}", self.map.depth);
    }

    /// Put the player on `to`. Refuses cells that are off the map or
    /// cannot be walked on.
    pub fn player_moved(&mut self, to: Position) -> bool {
        if !self.map.feat_flags(to).contains(TerrainFlags::MOVE) {
            return false;
        }
        if self.map.tile(to).map_or(true, |t| t.monster.is_some()) {
            return false;
        }
        self.player.pos = to;
        self.pending |= UpdateFlags::MOVED;
        true
    }

    /// End the player's turn: lay scent, advance the clock and settle
    /// every pending update
    pub fn player_turn(&mut self) {
        let day_changed = self.clock.advance(1);
        if day_changed && self.map.is_town() {
            self.pending |= UpdateFlags::MON_LITE | UpdateFlags::DELAY_VIS;
        }
        self.pending |= UpdateFlags::SCENT;
        self.update_stuff();
    }

    pub fn set_torch_radius(&mut self, radius: i32) {
        let radius = radius.clamp(0, MAX_LITE);
        if radius != self.player.cur_lite {
            self.player.cur_lite = radius;
            self.pending |= UpdateFlags::LITE | UpdateFlags::DELAY_VIS;
        }
    }

    pub fn set_blind(&mut self, blind: bool) {
        if blind != self.player.blind {
            self.player.blind = blind;
            self.pending |= UpdateFlags::UN_VIEW | UpdateFlags::SIGHT;
        }
    }

    pub fn set_dark_vision(&mut self, dark_vision: bool) {
        if dark_vision != self.player.dark_vision {
            self.player.dark_vision = dark_vision;
            // Every cell in view has to be noted again
            self.pending |= UpdateFlags::UN_VIEW | UpdateFlags::SIGHT;
        }
    }

    pub fn set_running(&mut self, running: bool) {
        self.player.running = running;
    }

    pub fn set_shadow_cloak(&mut self, cloak: bool) {
        self.player.shadow_cloak = cloak;
    }

    /// Change the terrain of a cell, e.g. open a door or dig a wall
    pub fn set_terrain(&mut self, pos: Position, terrain: TerrainId) {
        let player_pos = self.player.pos;
        let walk = TerrainFlags::MOVE | TerrainFlags::DOOR;
        let old_walk = self.map.feat_flags(pos) & walk;

        if reveal::set_terrain(&mut self.ctx, &mut self.map, player_pos, pos, terrain) {
            self.pending |= UpdateFlags::SIGHT | UpdateFlags::FLOW;
        } else {
            self.pending |= UpdateFlags::DELAY_VIS;
        }
        if self.map.feat_flags(pos) & walk != old_walk {
            self.pending |= UpdateFlags::FLOW;
        }
    }

    /// Light or darken one cell
    pub fn set_glow(&mut self, pos: Position, glow: bool) {
        let player_pos = self.player.pos;
        reveal::set_glow(&mut self.ctx, &mut self.map, &self.config, player_pos, pos, glow);
        self.pending |= UpdateFlags::DELAY_VIS;
    }

    /// Magic mapping around the player
    pub fn map_area(&mut self, range: i32) {
        reveal::map_area(&mut self.ctx, &mut self.map, self.player.pos, range);
        self.pending |= UpdateFlags::DELAY_VIS;
    }

    /// Light and learn the whole level
    pub fn wiz_lite(&mut self) {
        reveal::wiz_lite(&mut self.ctx, &mut self.world, &mut self.map, &self.config);
        self.pending |= UpdateFlags::SIGHT;
    }

    /// Forget the whole level
    pub fn wiz_dark(&mut self) {
        reveal::wiz_dark(&mut self.ctx, &mut self.world, &mut self.map);
        self.pending |= UpdateFlags::UN_VIEW | UpdateFlags::SIGHT;
    }

    pub fn spawn_monster(&mut self, pos: Position, monster: Monster) -> Option<Entity> {
        if pos == self.player.pos {
            return None;
        }
        let entity = spawn_monster(&mut self.world, &mut self.map, pos, monster)?;
        self.pending |= UpdateFlags::MON_LITE | UpdateFlags::DELAY_VIS;
        Some(entity)
    }

    pub fn move_monster(&mut self, entity: Entity, to: Position) -> bool {
        if to == self.player.pos || !move_monster(&mut self.world, &mut self.map, entity, to) {
            return false;
        }
        self.pending |= UpdateFlags::MON_LITE | UpdateFlags::DELAY_VIS;
        true
    }

    pub fn remove_monster(&mut self, entity: Entity) -> Option<Monster> {
        let monster = remove_monster(&mut self.world, &mut self.map, entity)?;
        self.pending |= UpdateFlags::MON_LITE | UpdateFlags::DELAY_VIS;
        Some(monster)
    }

    pub fn drop_object(&mut self, pos: Position, object: FloorObject) -> Option<Entity> {
        let entity = drop_object(&mut self.world, &mut self.map, pos, object)?;
        redraw_later(&mut self.ctx, &mut self.map, pos);
        Some(entity)
    }

    pub fn pick_up(&mut self, entity: Entity) -> Option<FloorObject> {
        let pos = self.world.get::<&Position>(entity).ok().map(|p| *p)?;
        let object = pick_up(&mut self.world, &mut self.map, entity)?;
        redraw_later(&mut self.ctx, &mut self.map, pos);
        Some(object)
    }

    /// Sense objects near the player without memorizing the floor
    pub fn detect_objects(&mut self, radius: i32) -> usize {
        let found = detect_objects(&mut self.world, self.player.pos, radius);
        log::debug!("detected {} objects within {}", found, radius);
        found
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn in_view(&self, pos: Position) -> bool {
        self.map.has_info(pos, CellFlags::VIEW)
    }

    /// Lit by the torch, a monster, or unsmothered ambient glow
    pub fn is_lit(&self, pos: Position) -> bool {
        let info = self.map.info(pos);
        info.is_torch_lit() || info.is_ambient_lit()
    }

    pub fn is_memorized(&self, pos: Position) -> bool {
        self.map.has_info(pos, CellFlags::MARK)
    }

    /// The player perceives the cell in detail right now
    pub fn can_see(&self, pos: Position) -> bool {
        player_can_see(&self.map, &self.player, pos)
    }

    /// Flow `(cost, steps)` to the player, `None` where the flow never got
    pub fn flow_at(&self, pos: Position) -> Option<(u16, u16)> {
        if pos == self.player.pos && self.last_flow.is_some() {
            return Some((0, 0));
        }
        let tile = self.map.tile(pos)?;
        (tile.dist != 0).then_some((tile.cost, tile.dist))
    }

    /// Turns since the player's scent was laid here, if any is left
    pub fn scent_age(&self, pos: Position) -> Option<u16> {
        let when = self.map.tile(pos)?.when;
        (when != 0).then(|| self.ctx.scent_epoch().saturating_sub(when))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feat;
    use crate::entities::AuraFlags;
    use crate::vision::mon_lite::{CLOAK_RESTORED, CLOAK_THIN};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    /// Player at (10, 10), a wall along x = 15 from y = 5 to 15
    fn walled_level() -> Level {
        let mut map = Map::open(30, 20);
        for y in 5..=15 {
            map.set_tile(p(15, y), feat::WALL);
        }
        map.start_pos = p(10, 10);
        let config = VisionConfig {
            max_sight: 20,
            ..Default::default()
        };
        let mut level = Level::new(map, config);
        level.set_torch_radius(2);
        level.enter_level();
        level.update_stuff();
        level
    }

    fn assert_light_in_view(level: &Level) {
        for tile_pos in level.context().lite().iter().chain(level.context().mon_lite()) {
            assert!(level.in_view(*tile_pos), "{:?} lit outside view", tile_pos);
        }
        for (idx, tile) in level.map().tiles.iter().enumerate() {
            if tile
                .info
                .intersects(CellFlags::LITE | CellFlags::MONSTER_LIT | CellFlags::MONSTER_DARK)
            {
                assert!(tile.info.contains(CellFlags::VIEW), "{:?}", level.map().pos_of(idx));
            }
        }
    }

    #[test]
    fn test_wall_scenario() {
        let level = walled_level();
        assert!(!level.in_view(p(20, 10)));
        assert!(level.in_view(p(14, 10)));
        assert!(!level.is_lit(p(14, 10)));
        for pos in [p(11, 10), p(9, 10)] {
            assert!(level.in_view(pos));
            assert!(level.is_lit(pos));
            assert!(level.can_see(pos));
        }
        assert!(level.pending().is_empty());
        assert_light_in_view(&level);
    }

    #[test]
    fn test_redraws_are_handed_out_once() {
        let mut level = walled_level();
        let first = level.take_redraws();
        assert!(first.iter().any(|r| r.pos == p(11, 10)));
        assert!(level.take_redraws().is_empty());

        level.update_stuff();
        assert!(level.take_redraws().is_empty());
    }

    #[test]
    fn test_moving_and_turns() {
        let mut level = walled_level();
        assert!(level.player_moved(p(11, 10)));
        assert!(!level.player_moved(p(15, 10)));
        assert!(!level.player_moved(p(-1, 0)));
        level.player_turn();

        assert_eq!(level.clock().turn(), 1);
        assert_eq!(level.flow_at(p(11, 10)), Some((0, 0)));
        assert_eq!(level.flow_at(p(12, 10)), Some((1, 1)));
        assert_eq!(level.flow_at(p(15, 10)), None);
        assert_eq!(level.scent_age(p(11, 10)), Some(0));
        assert_eq!(level.scent_age(p(25, 2)), None);

        assert!(level.player_moved(p(10, 10)));
        level.player_turn();
        assert!(level.player_moved(p(9, 10)));
        level.player_turn();
        assert_eq!(level.scent_age(p(13, 10)), Some(2));
        assert!(!level.last_flow().unwrap().saturated());
    }

    #[test]
    fn test_opening_a_door_extends_the_view() {
        let mut map = Map::from_ascii(&[
            "#########",
            "#@..+...#",
            "#########",
        ]);
        map.start_pos = p(1, 1);
        let mut level = Level::new(map, VisionConfig::default());
        level.enter_level();
        level.update_stuff();
        assert!(level.in_view(p(4, 1)));
        assert!(!level.in_view(p(6, 1)));

        level.set_terrain(p(4, 1), feat::DOOR_OPEN);
        assert!(level.pending().contains(UpdateFlags::VIEW));
        level.update_stuff();
        assert!(level.in_view(p(6, 1)));
        assert_eq!(level.flow_at(p(6, 1)), Some((5, 5)));
    }

    #[test]
    fn test_blindness_hides_everything() {
        let mut level = walled_level();
        level.set_blind(true);
        level.update_stuff();
        assert!(!level.can_see(p(11, 10)));
        assert!(level.in_view(p(11, 10)));
        level.set_blind(false);
        level.update_stuff();
        assert!(level.can_see(p(11, 10)));
    }

    #[test]
    fn test_dark_vision_remembers_walls_already_in_view() {
        let mut level = walled_level();
        let _ = level.take_redraws();
        let wall = p(15, 10);
        assert!(level.in_view(wall));
        assert!(!level.is_memorized(wall));
        assert!(!level.can_see(wall));

        level.set_dark_vision(true);
        level.update_stuff();
        assert!(level.can_see(wall));
        assert!(level.is_memorized(wall));
        let redraws = level.take_redraws();
        assert!(redraws.iter().any(|r| r.pos == wall && r.noted));
        assert_light_in_view(&level);
    }

    #[test]
    fn test_torch_radius_changes() {
        let mut level = walled_level();
        assert_eq!(level.context().lite().len(), 21);
        level.set_torch_radius(0);
        level.update_stuff();
        assert!(level.context().lite().is_empty());
        assert!(!level.is_lit(p(11, 10)));
        level.set_torch_radius(99);
        level.update_stuff();
        assert_eq!(level.player().cur_lite, MAX_LITE);
    }

    #[test]
    fn test_monster_light_and_cloak() {
        let mut level = walled_level();
        level.set_shadow_cloak(true);
        let wisp = level
            .spawn_monster(p(12, 10), Monster::new("wisp", AuraFlags::SELF_LITE_1))
            .unwrap();
        assert!(level.spawn_monster(p(10, 10), Monster::new("ghost", AuraFlags::empty())).is_none());
        level.update_stuff();
        assert!(level.map().has_info(p(13, 10), CellFlags::MONSTER_LIT));
        assert!(level.messages().is_empty());

        assert!(level.move_monster(wisp, p(11, 10)));
        level.update_stuff();
        assert_eq!(level.messages(), &[CLOAK_THIN.to_string()]);

        assert!(level.remove_monster(wisp).is_some());
        level.update_stuff();
        assert_eq!(level.messages().last().map(String::as_str), Some(CLOAK_RESTORED));
        assert!(level.context().mon_lite().is_empty());
    }

    #[test]
    fn test_objects_and_detection() {
        let mut level = walled_level();
        let coin = level.drop_object(p(20, 3), FloorObject::new("coin")).unwrap();
        assert_eq!(level.detect_objects(3), 0);
        assert_eq!(level.detect_objects(12), 1);
        assert!(level.world().get::<&FloorObject>(coin).unwrap().found);

        let object = level.pick_up(coin).unwrap();
        assert_eq!(object.name, "coin");
        level.update_stuff();
        assert!(!level.is_memorized(p(20, 3)));
    }

    #[test]
    fn test_reveal_triggers() {
        let mut level = Level::new(Map::test_map(4), VisionConfig::default());
        level.enter_level();
        level.update_stuff();

        level.map_area(30);
        level.update_stuff();
        assert!(level.is_memorized(p(20, 8)));

        level.wiz_lite();
        level.update_stuff();
        assert!(level.is_memorized(p(70, 35)));
        assert!(level.is_lit(p(50, 30)));

        level.wiz_dark();
        level.update_stuff();
        assert!(!level.is_memorized(p(70, 35)));
        assert_light_in_view(&level);
    }

    #[test]
    fn test_leave_level_forgets_fields() {
        let mut level = walled_level();
        level.player_turn();
        level.leave_level();
        assert!(level.context().view().is_empty());
        assert!(level.context().lite().is_empty());
        assert!(level.map().tiles.iter().all(|t| t.dist == 0 && t.when == 0));
        assert!(level.take_redraws().is_empty());
        assert!(level.pending().is_empty());
    }

    #[test]
    fn test_leave_level_drops_queued_redraws() {
        let mut level = walled_level();
        level.set_glow(p(3, 3), true);
        level.drop_object(p(4, 4), FloorObject::new("coin"));
        assert!(!level.context().pending_redraws().is_empty());

        level.leave_level();
        assert!(level.context().pending_redraws().is_empty());
        let stale = CellFlags::REDRAW | CellFlags::NOTE;
        assert!(level.map().tiles.iter().all(|t| !t.info.intersects(stale)));

        level.enter_level();
        level.update_stuff();
        let redraws = level.take_redraws();
        // Only the fresh view is handed out, each cell once
        assert!(redraws.iter().all(|r| level.in_view(r.pos)));
        assert_eq!(redraws.len(), level.context().view().len());
    }

    #[test]
    fn test_random_walk_keeps_light_inside_view() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut level = Level::new(Map::test_map(9), VisionConfig::default());
        level.set_torch_radius(3);
        level.enter_level();
        level.update_stuff();

        let auras = [AuraFlags::SELF_LITE_2, AuraFlags::SELF_DARK_1, AuraFlags::HAS_LITE_1];
        for (i, aura) in auras.into_iter().enumerate() {
            level.spawn_monster(p(6 + i as i32 * 4, 6), Monster::new("m", aura));
        }

        for _ in 0..200 {
            let here = level.player().pos;
            let to = here.offset(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
            level.player_moved(to);
            if rng.gen_bool(0.1) {
                level.set_torch_radius(rng.gen_range(0..=5));
            }
            level.player_turn();
            assert_light_in_view(&level);
            assert!(level.context().scratch_is_clear());
        }
    }
}
