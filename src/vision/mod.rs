//! Vision engine
//!
//! Line of sight, the view and light fields, monster auras, the flow and
//! scent fields, memory of seen cells, and the reveal effects that touch
//! them, with the dispatcher that runs them. Every algorithm runs over a
//! level's `Map` and its `VisionContext`.

pub mod context;
pub mod flow;
pub mod illumination;
pub mod lite;
pub mod los;
pub mod memory;
pub mod mon_lite;
pub mod reveal;
mod scratch;
pub mod smell;
pub mod update;
pub mod view;

pub use context::VisionContext;
pub use flow::{forget_flow, update_flow, FlowReport};
pub use illumination::{check_local_illumination, player_can_see, player_has_los, update_local_illumination};
pub use lite::{forget_lite, update_lite};
pub use los::los;
pub use memory::{delayed_visual_update, note_and_redraw_later, note_spot, redraw_later, Redraw};
pub use mon_lite::{clear_mon_lite, update_mon_lite};
pub use reveal::{map_area, set_glow, set_terrain, wiz_dark, wiz_lite};
pub use smell::update_smell;
pub use update::{update_stuff, UpdateFlags, UpdateOutcome};
pub use view::{forget_view, update_view};
