//! UI widgets

pub mod map_view;

pub use map_view::{tone_color, MapWidget};
