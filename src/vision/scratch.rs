//! Per-algorithm scratch sets
//!
//! Each algorithm keeps its own transient marks here instead of borrowing
//! bits from the shared cell flags. A set is empty between runs.

use crate::world::Position;

/// Set of cells with O(1) membership and O(len) clearing
#[derive(Debug, Clone, Default)]
pub struct CellSet {
    width: i32,
    height: i32,
    marks: Vec<bool>,
    cells: Vec<Position>,
}

impl CellSet {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            marks: vec![false; (width.max(0) * height.max(0)) as usize],
            cells: Vec::new(),
        }
    }

    #[inline]
    fn slot(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Add a cell, returning whether it was newly added. Off-grid cells are
    /// ignored.
    pub fn insert(&mut self, pos: Position) -> bool {
        let Some(slot) = self.slot(pos) else {
            return false;
        };
        if self.marks[slot] {
            return false;
        }
        self.marks[slot] = true;
        self.cells.push(pos);
        true
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.slot(pos).map_or(false, |slot| self.marks[slot])
    }

    pub fn clear(&mut self) {
        for pos in self.cells.drain(..) {
            let slot = (pos.y * self.width + pos.x) as usize;
            self.marks[slot] = false;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_clear() {
        let mut set = CellSet::new(4, 4);
        assert!(set.insert(Position::new(1, 2)));
        assert!(!set.insert(Position::new(1, 2)));
        assert!(set.contains(Position::new(1, 2)));
        assert_eq!(set.len(), 1);

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(Position::new(1, 2)));
    }

    #[test]
    fn test_off_grid_ignored() {
        let mut set = CellSet::new(2, 2);
        assert!(!set.insert(Position::new(2, 0)));
        assert!(!set.contains(Position::new(-1, 0)));
        assert!(set.is_empty());
    }
}
