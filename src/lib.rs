//! Cavesight - field of view, light and flow for grid dungeons
//!
//! Keeps track of what a player on a tile map can see, what is lit, what
//! they remember, and how monsters can reach and smell them.

pub mod data;
pub mod entities;
pub mod game;
pub mod ui;
pub mod vision;
pub mod world;

// Re-export commonly used types
pub use data::{DataError, DataManager, VisionConfig};
pub use game::Level;
pub use vision::{los, UpdateFlags, VisionContext};
pub use world::{CellFlags, Map, Position};
