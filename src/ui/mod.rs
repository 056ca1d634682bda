//! User Interface module
//!
//! Terminal viewer for a level, built on ratatui.

pub mod app;
pub mod screen;
pub mod widgets;

pub use app::App;
pub use screen::{Glyph, ScreenMemory, Tone};
