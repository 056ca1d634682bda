//! Game module - level sessions and the game clock

mod level;
mod time;

pub use level::Level;
pub use time::DayClock;
