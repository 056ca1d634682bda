//! Remembered screen
//!
//! What the player has on screen for every map cell. Cells only change
//! when the level hands them out through its redraw queue, so the screen
//! lags the map exactly the way a real renderer would.

use crate::entities::FloorObject;
use crate::game::Level;
use crate::vision::Redraw;
use crate::world::{CellFlags, Position};

/// How a glyph is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    /// Never seen, or forgotten
    #[default]
    Unknown,
    /// Memorized but not currently seen
    Remembered,
    /// Seen by ambient glow or dark vision
    Ambient,
    /// Seen by the player's torch
    Torch,
    /// Seen by a monster's light
    MonsterLit,
    /// Memorized, in view, smothered by monster darkness
    Shadowed,
}

/// One screen cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub tone: Tone,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph {
        ch: ' ',
        tone: Tone::Unknown,
    };
}

/// Glyph shown for a found object
pub const OBJECT_GLYPH: char = '*';

/// The screen as last drawn
#[derive(Debug, Clone)]
pub struct ScreenMemory {
    width: i32,
    height: i32,
    cells: Vec<Glyph>,
}

impl ScreenMemory {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![Glyph::BLANK; (width.max(0) * height.max(0)) as usize],
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    pub fn glyph(&self, pos: Position) -> Glyph {
        self.index(pos).map_or(Glyph::BLANK, |i| self.cells[i])
    }

    /// Redraw the handed-out cells. Returns how many changed on screen.
    pub fn apply(&mut self, level: &Level, redraws: &[Redraw]) -> usize {
        let mut changed = 0;
        for redraw in redraws {
            let Some(i) = self.index(redraw.pos) else {
                continue;
            };
            let glyph = glyph_for(level, redraw.pos);
            if self.cells[i] != glyph {
                self.cells[i] = glyph;
                changed += 1;
            }
        }
        changed
    }

    /// Repaint every cell, e.g. after object detection
    pub fn refresh_all(&mut self, level: &Level) {
        for i in 0..self.cells.len() {
            let pos = Position::new(i as i32 % self.width, i as i32 / self.width);
            self.cells[i] = glyph_for(level, pos);
        }
    }
}

/// Work out what the player should see at `pos` right now
pub fn glyph_for(level: &Level, pos: Position) -> Glyph {
    let map = level.map();
    let Some(tile) = map.tile(pos) else {
        return Glyph::BLANK;
    };
    let info = tile.info;
    let seen = level.can_see(pos);

    let object_found = tile.objects.first().map_or(false, |&e| {
        level
            .world()
            .get::<&FloorObject>(e)
            .map_or(false, |object| object.found)
    });

    let tone = if seen {
        if info.contains(CellFlags::LITE) {
            Tone::Torch
        } else if info.contains(CellFlags::MONSTER_LIT) {
            Tone::MonsterLit
        } else {
            Tone::Ambient
        }
    } else if info.contains(CellFlags::MARK) {
        if info.contains(CellFlags::VIEW | CellFlags::MONSTER_DARK) {
            Tone::Shadowed
        } else {
            Tone::Remembered
        }
    } else if object_found {
        Tone::Remembered
    } else {
        return Glyph::BLANK;
    };

    let ch = if object_found {
        OBJECT_GLYPH
    } else {
        map.terrain.glyph(tile.feat_mimic())
    };
    Glyph { ch, tone }
}
