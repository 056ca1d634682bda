//! Entity definitions
//!
//! The player record plus the monster and object components the vision
//! engine reads from the ECS world.

pub mod monsters;
pub mod objects;
pub mod player;

pub use monsters::{AuraFlags, Monster};
pub use objects::FloorObject;
pub use player::{PlayerState, MAX_LITE};
