//! Map widget for ratatui
//!
//! Draws the remembered screen around a camera position, with the player
//! and any visible monsters on top.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::entities::Monster;
use crate::game::Level;
use crate::ui::screen::{ScreenMemory, Tone};
use crate::world::Position;

/// Widget for rendering the level map
pub struct MapWidget<'a> {
    level: &'a Level,
    screen: &'a ScreenMemory,
    camera: Position,
    title: String,
}

impl<'a> MapWidget<'a> {
    pub fn new(level: &'a Level, screen: &'a ScreenMemory) -> Self {
        Self {
            level,
            screen,
            camera: level.player().pos,
            title: format!(" Depth {} ", level.map().depth),
        }
    }

    fn put(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_char(ch).set_style(style);
        }
    }
}

impl<'a> Widget for MapWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(100, 100, 120)));

        let inner = block.inner(area);
        block.render(area, buf);

        let cam_x = self.camera.x - inner.width as i32 / 2;
        let cam_y = self.camera.y - inner.height as i32 / 2;
        let to_screen = |pos: Position| -> Option<(u16, u16)> {
            let sx = pos.x - cam_x;
            let sy = pos.y - cam_y;
            if sx < 0 || sy < 0 || sx >= inner.width as i32 || sy >= inner.height as i32 {
                return None;
            }
            Some((inner.x + sx as u16, inner.y + sy as u16))
        };

        for sy in 0..inner.height {
            for sx in 0..inner.width {
                let pos = Position::new(cam_x + sx as i32, cam_y + sy as i32);
                let glyph = self.screen.glyph(pos);
                let style = Style::default().fg(tone_color(glyph.tone));
                Self::put(buf, inner.x + sx, inner.y + sy, glyph.ch, style);
            }
        }

        for (_, (&pos, monster)) in self.level.world().query::<(&Position, &Monster)>().iter() {
            if !self.level.can_see(pos) {
                continue;
            }
            if let Some((x, y)) = to_screen(pos) {
                let ch = monster.name.chars().next().unwrap_or('m');
                let color = if monster.aura.radius() < 0 {
                    Color::Rgb(150, 90, 200)
                } else {
                    Color::Rgb(255, 170, 60)
                };
                Self::put(buf, x, y, ch, Style::default().fg(color).add_modifier(Modifier::BOLD));
            }
        }

        if let Some((x, y)) = to_screen(self.level.player().pos) {
            Self::put(buf, x, y, '@', Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
        }
    }
}

/// Foreground color for a screen tone
pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Unknown => Color::Reset,
        Tone::Remembered => Color::Rgb(70, 70, 90),
        Tone::Ambient => Color::Rgb(200, 200, 210),
        Tone::Torch => Color::Rgb(255, 220, 130),
        Tone::MonsterLit => Color::Rgb(255, 160, 80),
        Tone::Shadowed => Color::Rgb(90, 50, 120),
    }
}
