//! Map data structure
//!
//! The Grid Store: a 2D array of tiles plus the terrain table they index.
//! Physical queries (sight, projection, movement) read the true terrain;
//! what the player perceives goes through the mimic terrain.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::position::{Position, NEIGHBORS};
use super::terrain::{TerrainFlags, TerrainId, TerrainTable};
use super::tile::{CellFlags, Tile};
use crate::data::terrain::{default_terrain_table, feat};

/// A dungeon level map
#[derive(Debug, Clone)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
    pub terrain: TerrainTable,
    /// Dungeon depth, 0 is the town
    pub depth: u32,
    /// Permanently dark level: no ambient glow from terrain
    pub darkness: bool,
    /// Start position for player
    pub start_pos: Position,
}

impl Map {
    /// Create a new map filled with granite
    pub fn new(width: i32, height: i32, depth: u32) -> Self {
        Self::with_terrain(width, height, depth, default_terrain_table())
    }

    /// Create a new granite-filled map over a custom terrain table
    pub fn with_terrain(width: i32, height: i32, depth: u32, terrain: TerrainTable) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            tiles: vec![Tile::new(feat::WALL); (width * height) as usize],
            terrain,
            depth,
            darkness: false,
            start_pos: Position::new(0, 0),
        }
    }

    /// Create a map of plain floor with no walls at all
    pub fn open(width: i32, height: i32) -> Self {
        let mut map = Map::new(width, height, 1);
        for tile in &mut map.tiles {
            tile.terrain = feat::FLOOR;
        }
        map
    }

    /// Build a map from ASCII rows.
    ///
    /// `#` granite, `%` permanent wall, `.` floor, `g` glowing (lit) floor,
    /// `+` closed door, `'` open door, `S` secret door, `:` rubble,
    /// `*` glowing floor terrain, `~` lava, `T` tree, `@` floor and start
    /// position. Anything else is granite.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut map = Map::new(width, height, 1);

        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                let terrain = match c {
                    '.' | '@' | 'g' => feat::FLOOR,
                    '%' => feat::PERMANENT_WALL,
                    '+' | 'S' => feat::DOOR_CLOSED,
                    '\'' => feat::DOOR_OPEN,
                    ':' => feat::RUBBLE,
                    '*' => feat::GLOWING_FLOOR,
                    '~' => feat::LAVA,
                    'T' => feat::TREE,
                    _ => feat::WALL,
                };
                map.set_tile(pos, terrain);
                if let Some(tile) = map.tile_mut(pos) {
                    match c {
                        'S' => tile.mimic = Some(feat::WALL),
                        'g' => tile.info.insert(CellFlags::GLOW),
                        _ => {}
                    }
                }
                if c == '@' {
                    map.start_pos = pos;
                }
            }
        }

        map.spread_terrain_glow();
        map
    }

    /// Convert a position to a tile index. The position must be in bounds.
    #[inline]
    pub fn idx(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Convert a tile index back to a position
    #[inline]
    pub fn pos_of(&self, idx: usize) -> Position {
        let idx = idx as i32;
        Position::new(idx % self.width, idx / self.width)
    }

    /// Check if a position is within bounds
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_town(&self) -> bool {
        self.depth == 0
    }

    /// Get tile at position
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        if self.in_bounds(pos) {
            Some(&self.tiles[self.idx(pos)])
        } else {
            None
        }
    }

    /// Get mutable tile at position
    pub fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if self.in_bounds(pos) {
            let idx = self.idx(pos);
            Some(&mut self.tiles[idx])
        } else {
            None
        }
    }

    /// Set the true terrain at a position, clearing any mimic.
    ///
    /// This is the raw map-building primitive; gameplay changes go through
    /// `Level::set_terrain` so the vision state follows along.
    pub fn set_tile(&mut self, pos: Position, terrain: TerrainId) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.terrain = terrain;
            tile.mimic = None;
        }
    }

    /// Visibility flags at a position, empty when out of bounds
    #[inline]
    pub fn info(&self, pos: Position) -> CellFlags {
        self.tile(pos).map_or(CellFlags::empty(), |t| t.info)
    }

    #[inline]
    pub fn has_info(&self, pos: Position, flag: CellFlags) -> bool {
        self.info(pos).contains(flag)
    }

    /// Capabilities of the true terrain. Out of bounds is featureless rock.
    #[inline]
    pub fn feat_flags(&self, pos: Position) -> TerrainFlags {
        self.tile(pos)
            .map_or(TerrainFlags::empty(), |t| self.terrain.flags(t.terrain))
    }

    /// Capabilities of the terrain as the player perceives it
    #[inline]
    pub fn mimic_flags(&self, pos: Position) -> TerrainFlags {
        self.tile(pos)
            .map_or(TerrainFlags::empty(), |t| self.terrain.flags(t.feat_mimic()))
    }

    /// Does this cell transmit sight
    #[inline]
    pub fn cave_los(&self, pos: Position) -> bool {
        self.feat_flags(pos).contains(TerrainFlags::LOS)
    }

    /// Do projections pass through this cell
    #[inline]
    pub fn cave_project(&self, pos: Position) -> bool {
        self.feat_flags(pos).contains(TerrainFlags::PROJECT)
    }

    pub fn is_closed_door(&self, pos: Position) -> bool {
        self.feat_flags(pos).contains(TerrainFlags::DOOR)
    }

    /// Walkable or a closed door: cells that carry flow and scent
    pub fn is_passable(&self, pos: Position) -> bool {
        self.feat_flags(pos)
            .intersects(TerrainFlags::MOVE | TerrainFlags::DOOR)
    }

    /// Perceived terrain is plain floor-like (transmits sight)
    pub fn looks_open(&self, pos: Position) -> bool {
        self.mimic_flags(pos).contains(TerrainFlags::LOS)
    }

    /// Light the 3x3 block around every glowing terrain cell. Does nothing
    /// on permanently dark levels.
    pub fn spread_terrain_glow(&mut self) {
        if self.darkness {
            return;
        }
        for idx in 0..self.tiles.len() {
            if !self.terrain.flags(self.tiles[idx].terrain).contains(TerrainFlags::GLOW) {
                continue;
            }
            let pos = self.pos_of(idx);
            self.glow_around(pos);
        }
    }

    /// Set `GLOW` on a cell and its eight neighbours
    pub fn glow_around(&mut self, pos: Position) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.info.insert(CellFlags::GLOW);
        }
        for (dx, dy) in NEIGHBORS {
            if let Some(tile) = self.tile_mut(pos.offset(dx, dy)) {
                tile.info.insert(CellFlags::GLOW);
            }
        }
    }

    /// Carve a room of floor with its walls, optionally lit
    pub fn carve_room(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, lit: bool) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                let pos = Position::new(x, y);
                let edge = x == x0 || x == x1 || y == y0 || y == y1;
                if !edge {
                    self.set_tile(pos, feat::FLOOR);
                }
                if lit {
                    if let Some(tile) = self.tile_mut(pos) {
                        tile.info.insert(CellFlags::GLOW);
                    }
                }
            }
        }
    }

    /// Wrap the map in permanent wall
    pub fn seal_border(&mut self) {
        for x in 0..self.width {
            self.set_tile(Position::new(x, 0), feat::PERMANENT_WALL);
            self.set_tile(Position::new(x, self.height - 1), feat::PERMANENT_WALL);
        }
        for y in 0..self.height {
            self.set_tile(Position::new(0, y), feat::PERMANENT_WALL);
            self.set_tile(Position::new(self.width - 1, y), feat::PERMANENT_WALL);
        }
    }

    /// Create a simple test level for the viewer and benchmarks
    pub fn test_map(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let width = 80;
        let height = 40;
        let mut map = Map::new(width, height, 1);

        // Room 1: dark starting room
        map.carve_room(3, 3, 20, 14, false);

        // Room 2: lit hall with pillars
        map.carve_room(30, 2, 56, 18, true);
        for _ in 0..12 {
            let x = rng.gen_range(33..54);
            let y = rng.gen_range(5..16);
            map.set_tile(Position::new(x, y), feat::WALL);
        }

        // Room 3: dark cave with trees and a lava pool
        map.carve_room(40, 24, 74, 37, false);
        for _ in 0..20 {
            let x = rng.gen_range(42..73);
            let y = rng.gen_range(26..36);
            map.set_tile(Position::new(x, y), feat::TREE);
        }
        for x in 60..64 {
            map.set_tile(Position::new(x, 30), feat::LAVA);
        }

        // Corridors
        for x in 20..31 {
            map.set_tile(Position::new(x, 8), feat::FLOOR);
        }
        for y in 18..25 {
            map.set_tile(Position::new(45, y), feat::FLOOR);
        }
        for x in 8..41 {
            map.set_tile(Position::new(x, 30), feat::FLOOR);
        }
        for y in 14..31 {
            map.set_tile(Position::new(8, y), feat::FLOOR);
        }

        // Doors
        map.set_tile(Position::new(20, 8), feat::DOOR_CLOSED);
        map.set_tile(Position::new(30, 8), feat::DOOR_OPEN);
        map.set_tile(Position::new(45, 18), feat::DOOR_CLOSED);
        map.set_tile(Position::new(8, 14), feat::DOOR_CLOSED);
        if let Some(tile) = map.tile_mut(Position::new(8, 14)) {
            tile.mimic = Some(feat::WALL);
        }
        map.set_tile(Position::new(12, 9), feat::RUBBLE);

        map.seal_border();
        map.spread_terrain_glow();
        map.start_pos = Position::new(10, 8);
        map
    }
}
