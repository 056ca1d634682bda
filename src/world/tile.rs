//! Tile definitions
//!
//! The per-cell record of the Grid Store and its visibility flags.

use bitflags::bitflags;
use hecs::Entity;

use super::terrain::TerrainId;

bitflags! {
    /// Visibility, illumination and bookkeeping state of a single cell
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct CellFlags: u16 {
        /// In the player's line-of-sight field
        const VIEW = 1 << 0;
        /// Inside the player's torch radius
        const LITE = 1 << 1;
        /// Lit by a monster aura
        const MONSTER_LIT = 1 << 2;
        /// Darkened by a monster aura
        const MONSTER_DARK = 1 << 3;
        /// Permanently lit
        const GLOW = 1 << 4;
        /// Memorized by the player
        const MARK = 1 << 5;
        /// Terrain examined at least once
        const KNOWN = 1 << 6;
        /// Queued for redraw
        const REDRAW = 1 << 7;
        /// Queued for memorization on redraw
        const NOTE = 1 << 8;
    }
}

impl CellFlags {
    /// Lit by the player's torch or a monster aura
    #[inline]
    pub fn is_torch_lit(self) -> bool {
        self.intersects(CellFlags::LITE | CellFlags::MONSTER_LIT)
    }

    /// Glowing and not smothered by monster darkness
    #[inline]
    pub fn is_ambient_lit(self) -> bool {
        self & (CellFlags::GLOW | CellFlags::MONSTER_DARK) == CellFlags::GLOW
    }
}

/// A single cell in the map
#[derive(Debug, Clone)]
pub struct Tile {
    /// True terrain
    pub terrain: TerrainId,
    /// Terrain shown to the player instead of the true one (secret doors)
    pub mimic: Option<TerrainId>,
    /// Monster standing here; owned by the ECS world
    pub monster: Option<Entity>,
    /// Objects lying here, top first; owned by the ECS world
    pub objects: Vec<Entity>,
    /// Flow field: cheapest traversal cost from the player, 0 if unreached
    pub cost: u16,
    /// Flow field: fewest steps from the player, 0 if unreached
    pub dist: u16,
    /// Scent stamp
    pub when: u16,
    pub info: CellFlags,
}

impl Tile {
    pub fn new(terrain: TerrainId) -> Self {
        Self {
            terrain,
            mimic: None,
            monster: None,
            objects: Vec::new(),
            cost: 0,
            dist: 0,
            when: 0,
            info: CellFlags::empty(),
        }
    }

    /// Terrain as the player perceives it
    #[inline]
    pub fn feat_mimic(&self) -> TerrainId {
        self.mimic.unwrap_or(self.terrain)
    }

    /// Set `flag`, returning whether it was previously clear
    #[inline]
    pub fn set_flag(&mut self, flag: CellFlags) -> bool {
        if self.info.contains(flag) {
            false
        } else {
            self.info.insert(flag);
            true
        }
    }

    pub fn has(&self, flag: CellFlags) -> bool {
        self.info.contains(flag)
    }
}
