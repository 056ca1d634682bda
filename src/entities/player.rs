//! Player state consumed by the vision engine

use crate::world::Position;

/// Brightest torch radius the light field supports
pub const MAX_LITE: i32 = 14;

/// Everything the vision engine needs to know about the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub pos: Position,
    pub blind: bool,
    /// Sees in the dark without any light
    pub dark_vision: bool,
    /// Current torch radius, 0 to [`MAX_LITE`]
    pub cur_lite: i32,
    /// Running (auto-repeat movement)
    pub running: bool,
    /// Shadow cloak active: reports entering and leaving monster light
    pub shadow_cloak: bool,
    /// Standing in a monster-lit cell, as of the last monster light update
    pub monster_lit: bool,
}

impl PlayerState {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            blind: false,
            dark_vision: false,
            cur_lite: 1,
            running: false,
            shadow_cloak: false,
            monster_lit: false,
        }
    }

    pub fn with_lite(mut self, radius: i32) -> Self {
        self.cur_lite = radius.clamp(0, MAX_LITE);
        self
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(Position::default())
    }
}
