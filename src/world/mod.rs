//! World module
//!
//! The Grid Store: map, tiles, terrain capabilities and coordinates.

pub mod map;
pub mod position;
pub mod terrain;
pub mod tile;

pub use map::Map;
pub use position::{distance, Position};
pub use terrain::{TerrainDef, TerrainFlags, TerrainId, TerrainTable};
pub use tile::{CellFlags, Tile};
