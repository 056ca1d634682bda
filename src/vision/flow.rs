//! Flow field
//!
//! Breadth-first cost and step counts from the player, for monsters that
//! path towards them. Closed doors are passable at a penalty.

use super::context::VisionContext;
use crate::data::VisionConfig;
use crate::entities::PlayerState;
use crate::world::position::NEIGHBORS;
use crate::world::{CellFlags, Map};

/// Extra traversal cost of a closed door
pub const DOOR_COST: u16 = 3;

/// Outcome of one flow update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowReport {
    /// Cells holding a flow value after the run
    pub reached: usize,
    /// Entries dropped because the queue was full
    pub dropped: usize,
    /// Nothing was recomputed: the player is running and the last
    /// waypoint is still in view
    pub skipped: bool,
}

impl FlowReport {
    /// The queue ran out of room and the field stops short
    pub fn saturated(&self) -> bool {
        self.dropped > 0
    }
}

/// Recompute the flow field from the player's position.
///
/// The queue holds at most `config.flow_queue_capacity` pending cells; new
/// entries beyond that are dropped and counted. Cells at `flow_depth`
/// steps are stamped but never expanded.
pub fn update_flow(ctx: &mut VisionContext, map: &mut Map, player: &PlayerState, config: &VisionConfig) -> FlowReport {
    let flow = &mut ctx.flow;
    let mut report = FlowReport::default();

    if player.running {
        if let Some(waypoint) = flow.waypoint {
            if map.has_info(waypoint, CellFlags::VIEW) {
                report.skipped = true;
                return report;
            }
        }
    }

    for tile in &mut map.tiles {
        tile.cost = 0;
        tile.dist = 0;
    }

    let origin = player.pos;
    flow.waypoint = Some(origin);
    if !map.in_bounds(origin) {
        return report;
    }

    flow.queue.clear();
    flow.queue.push_back(origin);

    while let Some(here) = flow.queue.pop_front() {
        let (cost, dist) = map.tile(here).map_or((0, 0), |t| (t.cost, t.dist));

        for (dx, dy) in NEIGHBORS {
            let next = here.offset(dx, dy);
            if next == origin || !map.in_bounds(next) {
                continue;
            }

            let mut m = cost.saturating_add(1);
            let n = dist.saturating_add(1);
            if map.is_closed_door(next) {
                m = m.saturating_add(DOOR_COST);
            }

            let passable = map.is_passable(next);
            let Some(tile) = map.tile_mut(next) else {
                continue;
            };

            // Already stamped at least as well
            if tile.dist != 0 && tile.dist <= n && tile.cost <= m {
                continue;
            }
            if !passable {
                continue;
            }

            if tile.dist == 0 {
                report.reached += 1;
            }
            if tile.cost == 0 || tile.cost > m {
                tile.cost = m;
            }
            if tile.dist == 0 || tile.dist > n {
                tile.dist = n;
            }

            if n >= config.flow_depth {
                continue;
            }

            if flow.queue.len() >= config.flow_queue_capacity {
                report.dropped += 1;
                continue;
            }
            flow.queue.push_back(next);
        }
    }

    if report.saturated() {
        log::warn!(
            "flow queue saturated: {} entries dropped, {} cells reached",
            report.dropped,
            report.reached
        );
    }

    report
}

/// Forget flow and scent everywhere
pub fn forget_flow(ctx: &mut VisionContext, map: &mut Map) {
    for tile in &mut map.tiles {
        tile.cost = 0;
        tile.dist = 0;
        tile.when = 0;
    }
    ctx.flow.waypoint = None;
    ctx.flow.queue.clear();
}
