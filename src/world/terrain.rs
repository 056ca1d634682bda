//! Terrain definitions
//!
//! Per-terrain capability flags consumed by the vision algorithms. The
//! table itself is data; see `data::terrain` for the built-in defaults.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Index into the [`TerrainTable`]
pub type TerrainId = u16;

bitflags! {
    /// Capabilities of a terrain type
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TerrainFlags: u16 {
        /// Transmits sight
        const LOS = 1 << 0;
        /// Lets projections (and monster darkness) pass
        const PROJECT = 1 << 1;
        /// Can be walked through
        const MOVE = 1 << 2;
        /// A closed door: blocks movement but monsters path through it
        const DOOR = 1 << 3;
        /// Ambiently lights itself and its neighbours
        const GLOW = 1 << 4;
        /// Interesting enough to memorize whenever noticed
        const REMEMBER = 1 << 5;
        /// Solid rock, granite and the like
        const WALL = 1 << 6;
    }
}

/// A single terrain type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDef {
    pub name: String,
    pub glyph: char,
    pub flags: TerrainFlags,
}

impl TerrainDef {
    pub fn new(name: &str, glyph: char, flags: TerrainFlags) -> Self {
        Self {
            name: name.to_string(),
            glyph,
            flags,
        }
    }

    pub fn has(&self, flag: TerrainFlags) -> bool {
        self.flags.contains(flag)
    }
}

/// Terrain lookup table, indexed by [`TerrainId`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainTable {
    pub terrains: Vec<TerrainDef>,
}

impl TerrainTable {
    pub fn new(terrains: Vec<TerrainDef>) -> Self {
        Self { terrains }
    }

    pub fn get(&self, id: TerrainId) -> Option<&TerrainDef> {
        self.terrains.get(id as usize)
    }

    /// Capability flags of a terrain. Unknown ids behave as featureless rock.
    #[inline]
    pub fn flags(&self, id: TerrainId) -> TerrainFlags {
        self.get(id).map_or(TerrainFlags::empty(), |t| t.flags)
    }

    pub fn glyph(&self, id: TerrainId) -> char {
        self.get(id).map_or(' ', |t| t.glyph)
    }

    /// Find a terrain id by name
    pub fn find(&self, name: &str) -> Option<TerrainId> {
        self.terrains
            .iter()
            .position(|t| t.name == name)
            .map(|idx| idx as TerrainId)
    }

    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }
}
