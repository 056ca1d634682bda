//! Deferred update dispatcher
//!
//! Triggers only raise [`UpdateFlags`]; [`update_stuff`] runs each pending
//! stage once, in a fixed order, and clears the flags.

use bitflags::bitflags;
use hecs::World;

use super::context::VisionContext;
use super::flow::{update_flow, FlowReport};
use super::lite::{forget_lite, update_lite};
use super::memory::{delayed_visual_update, Redraw};
use super::mon_lite::{clear_mon_lite, update_mon_lite};
use super::smell::update_smell;
use super::view::{forget_view, update_view};
use crate::data::VisionConfig;
use crate::entities::PlayerState;
use crate::world::Map;

bitflags! {
    /// Pending vision work
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct UpdateFlags: u16 {
        /// Drop the torch field
        const UN_LITE = 1 << 0;
        /// Drop the view field
        const UN_VIEW = 1 << 1;
        const VIEW = 1 << 2;
        const LITE = 1 << 3;
        const MON_LITE = 1 << 4;
        const FLOW = 1 << 5;
        const SCENT = 1 << 6;
        /// Drain the redraw queue
        const DELAY_VIS = 1 << 7;
    }
}

impl UpdateFlags {
    /// Everything a fresh position needs
    pub const MOVED: UpdateFlags = UpdateFlags::VIEW
        .union(UpdateFlags::LITE)
        .union(UpdateFlags::MON_LITE)
        .union(UpdateFlags::FLOW)
        .union(UpdateFlags::DELAY_VIS);

    /// A sight-relevant change somewhere on the map
    pub const SIGHT: UpdateFlags = UpdateFlags::VIEW
        .union(UpdateFlags::LITE)
        .union(UpdateFlags::MON_LITE)
        .union(UpdateFlags::DELAY_VIS);
}

/// What one dispatch produced
#[derive(Debug, Clone, Default)]
pub struct UpdateOutcome {
    /// Cells the renderer must redraw, in queue order
    pub redraws: Vec<Redraw>,
    /// Set when the flow field ran
    pub flow: Option<FlowReport>,
    /// Shadow cloak message, if the player's light state flipped
    pub message: Option<&'static str>,
}

/// Run every pending stage once and clear `pending`.
///
/// Recomputing the view always recomputes torch and monster light too, so
/// no lit cell is ever left outside the view. Forgetting the view without
/// recomputing it drops both light fields.
pub fn update_stuff(
    pending: &mut UpdateFlags,
    ctx: &mut VisionContext,
    world: &World,
    map: &mut Map,
    player: &mut PlayerState,
    config: &VisionConfig,
    daytime: bool,
) -> UpdateOutcome {
    let mut flags = std::mem::take(pending);
    let mut outcome = UpdateOutcome::default();

    if flags.contains(UpdateFlags::VIEW) {
        flags |= UpdateFlags::LITE | UpdateFlags::MON_LITE;
    }
    if flags.contains(UpdateFlags::UN_VIEW) {
        flags |= UpdateFlags::UN_LITE;
    }

    if flags.contains(UpdateFlags::UN_LITE) {
        forget_lite(ctx, map);
    }
    if flags.contains(UpdateFlags::UN_VIEW) {
        forget_view(ctx, map);
        if !flags.contains(UpdateFlags::VIEW) {
            clear_mon_lite(ctx, map);
            flags.remove(UpdateFlags::MON_LITE);
        }
    }

    if flags.contains(UpdateFlags::VIEW) {
        update_view(ctx, map, player, config);
    }
    if flags.contains(UpdateFlags::LITE) {
        update_lite(ctx, map, player);
    }
    if flags.contains(UpdateFlags::FLOW) {
        outcome.flow = Some(update_flow(ctx, map, player, config));
    }
    if flags.contains(UpdateFlags::SCENT) {
        update_smell(ctx, map, player, config);
    }
    if flags.contains(UpdateFlags::MON_LITE) {
        outcome.message = update_mon_lite(ctx, map, world, player, config, daytime);
    }

    if flags.contains(UpdateFlags::DELAY_VIS) || !ctx.pending_redraws().is_empty() {
        outcome.redraws = delayed_visual_update(ctx, world, map, player, config);
    }

    log::trace!("dispatched {:?}, {} redraws", flags, outcome.redraws.len());
    outcome
}
