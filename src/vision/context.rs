//! Visibility context
//!
//! Index lists of the current view, torch and monster-light fields, the
//! redraw queue, and the private scratch state of every algorithm. One
//! context belongs to one level; all algorithms take it by `&mut`, so no
//! two of them can run over the same scratch state at once.

use std::collections::VecDeque;

use super::scratch::CellSet;
use crate::world::Position;

/// Scratch state of the view field calculator
#[derive(Debug, Clone, Default)]
pub(crate) struct ViewScratch {
    /// Cells in view before this run
    pub seen: CellSet,
    /// Cells trivially visible this run
    pub easy: CellSet,
}

/// Scratch state of the monster light propagator
#[derive(Debug, Clone, Default)]
pub(crate) struct MonLiteScratch {
    /// Monster-lit before this run
    pub was_lit: CellSet,
    /// Monster-darkened before this run
    pub was_dark: CellSet,
    /// Cells newly lit or darkened this run
    pub fresh: Vec<Position>,
}

/// Persistent state of the flow field
#[derive(Debug, Clone, Default)]
pub(crate) struct FlowState {
    /// Player position at the last full recomputation
    pub waypoint: Option<Position>,
    pub queue: VecDeque<Position>,
}

/// All map-wide vision bookkeeping for one level
#[derive(Debug, Clone, Default)]
pub struct VisionContext {
    pub(crate) view: Vec<Position>,
    pub(crate) lite: Vec<Position>,
    pub(crate) mon_lite: Vec<Position>,
    pub(crate) redraw: Vec<Position>,
    pub(crate) view_scratch: ViewScratch,
    pub(crate) lite_scratch: CellSet,
    pub(crate) mon_scratch: MonLiteScratch,
    pub(crate) flow: FlowState,
    pub(crate) scent_epoch: u16,
}

impl VisionContext {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            view_scratch: ViewScratch {
                seen: CellSet::new(width, height),
                easy: CellSet::new(width, height),
            },
            lite_scratch: CellSet::new(width, height),
            mon_scratch: MonLiteScratch {
                was_lit: CellSet::new(width, height),
                was_dark: CellSet::new(width, height),
                fresh: Vec::new(),
            },
            ..Default::default()
        }
    }

    /// Cells currently in view
    pub fn view(&self) -> &[Position] {
        &self.view
    }

    /// Cells currently torch-lit
    pub fn lite(&self) -> &[Position] {
        &self.lite
    }

    /// Cells currently lit or darkened by monsters
    pub fn mon_lite(&self) -> &[Position] {
        &self.mon_lite
    }

    /// Cells waiting for the next delayed visual update
    pub fn pending_redraws(&self) -> &[Position] {
        &self.redraw
    }

    pub fn scent_epoch(&self) -> u16 {
        self.scent_epoch
    }

    /// True when no algorithm has transient state left over
    pub fn scratch_is_clear(&self) -> bool {
        self.view_scratch.seen.is_empty()
            && self.view_scratch.easy.is_empty()
            && self.lite_scratch.is_empty()
            && self.mon_scratch.was_lit.is_empty()
            && self.mon_scratch.was_dark.is_empty()
            && self.mon_scratch.fresh.is_empty()
            && self.flow.queue.is_empty()
    }
}
