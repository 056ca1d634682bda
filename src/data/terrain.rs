//! Built-in terrain table
//!
//! Hardcoded defaults used when `assets/data/terrain.ron` is missing.

use crate::world::terrain::{TerrainDef, TerrainFlags, TerrainId, TerrainTable};

/// Ids of the built-in terrains, in table order
pub mod feat {
    use crate::world::terrain::TerrainId;

    pub const FLOOR: TerrainId = 0;
    pub const WALL: TerrainId = 1;
    pub const PERMANENT_WALL: TerrainId = 2;
    pub const DOOR_CLOSED: TerrainId = 3;
    pub const DOOR_OPEN: TerrainId = 4;
    pub const RUBBLE: TerrainId = 5;
    pub const GLOWING_FLOOR: TerrainId = 6;
    pub const LAVA: TerrainId = 7;
    pub const TREE: TerrainId = 8;
}

/// Create the default terrain table
pub fn default_terrain_table() -> TerrainTable {
    let open = TerrainFlags::LOS | TerrainFlags::PROJECT | TerrainFlags::MOVE;
    let rock = TerrainFlags::WALL | TerrainFlags::REMEMBER;

    let terrains = vec![
        TerrainDef::new("floor", '.', open),
        TerrainDef::new("granite wall", '#', rock),
        TerrainDef::new("permanent wall", '%', rock),
        TerrainDef::new(
            "closed door",
            '+',
            TerrainFlags::DOOR | TerrainFlags::REMEMBER,
        ),
        TerrainDef::new("open door", '\'', open | TerrainFlags::REMEMBER),
        TerrainDef::new("rubble", ':', TerrainFlags::REMEMBER),
        TerrainDef::new("glowing floor", '.', open | TerrainFlags::GLOW),
        TerrainDef::new(
            "lava",
            '~',
            open | TerrainFlags::GLOW | TerrainFlags::REMEMBER,
        ),
        TerrainDef::new(
            "tree",
            'T',
            TerrainFlags::PROJECT | TerrainFlags::MOVE | TerrainFlags::REMEMBER,
        ),
    ];

    debug_assert_eq!(terrains.len() as TerrainId, feat::TREE + 1);
    TerrainTable::new(terrains)
}
