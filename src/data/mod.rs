//! Data loading and configuration
//!
//! This module handles loading engine options and terrain definitions from
//! external RON files, allowing levels to be tuned without recompiling.

pub mod config;
pub mod loader;
pub mod terrain;

pub use config::VisionConfig;
pub use loader::{DataError, DataManager};
pub use terrain::{default_terrain_table, feat};
