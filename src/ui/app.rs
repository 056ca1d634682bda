//! Viewer application
//!
//! Turns key presses into level triggers and draws the map and status.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::screen::ScreenMemory;
use super::widgets::MapWidget;
use crate::data::feat;
use crate::game::Level;
use crate::world::position::NEIGHBORS;
use crate::world::Position;

/// Range of the magic mapping key
const MAP_AREA_RANGE: i32 = 30;
/// Range of the object detection key
const DETECT_RANGE: i32 = 20;

/// Main viewer application
pub struct App {
    screen: ScreenMemory,
    /// Cells the last sync changed on screen
    last_changed: usize,
    show_help: bool,
}

impl App {
    pub fn new(level: &Level) -> Self {
        let map = level.map();
        Self {
            screen: ScreenMemory::new(map.width, map.height),
            last_changed: 0,
            show_help: false,
        }
    }

    /// Pull every pending redraw from the level onto the screen
    pub fn sync(&mut self, level: &mut Level) {
        let redraws = level.take_redraws();
        self.last_changed = self.screen.apply(level, &redraws);
    }

    /// Handle keyboard input, returns true if should quit
    pub fn handle_input(&mut self, key: KeyEvent, level: &mut Level) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        let step = match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some((0, -1)),
            KeyCode::Down | KeyCode::Char('j') => Some((0, 1)),
            KeyCode::Left | KeyCode::Char('h') => Some((-1, 0)),
            KeyCode::Right | KeyCode::Char('l') => Some((1, 0)),
            KeyCode::Char('y') => Some((-1, -1)),
            KeyCode::Char('u') => Some((1, -1)),
            KeyCode::Char('b') => Some((-1, 1)),
            KeyCode::Char('n') => Some((1, 1)),
            _ => None,
        };
        if let Some((dx, dy)) = step {
            let to = level.player().pos.offset(dx, dy);
            if level.player_moved(to) {
                level.player_turn();
            }
            self.sync(level);
            return Ok(false);
        }

        let mut full_refresh = false;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let radius = level.player().cur_lite + 1;
                level.set_torch_radius(radius);
            }
            KeyCode::Char('-') => {
                let radius = level.player().cur_lite - 1;
                level.set_torch_radius(radius);
            }
            KeyCode::Char('o') => toggle_doors(level),
            KeyCode::Char('m') => level.map_area(MAP_AREA_RANGE),
            KeyCode::Char('d') => {
                let found = level.detect_objects(DETECT_RANGE);
                log::info!("Sensed {} objects", found);
                full_refresh = true;
            }
            KeyCode::Char('L') => level.wiz_lite(),
            KeyCode::Char('D') => {
                level.wiz_dark();
                full_refresh = true;
            }
            KeyCode::Char('B') => {
                let blind = !level.player().blind;
                level.set_blind(blind);
            }
            KeyCode::Char('V') => {
                let dark_vision = !level.player().dark_vision;
                level.set_dark_vision(dark_vision);
            }
            KeyCode::Char('.') => {}
            _ => return Ok(false),
        }

        level.player_turn();
        if full_refresh {
            let _ = level.take_redraws();
            self.screen.refresh_all(level);
        } else {
            self.sync(level);
        }
        Ok(false)
    }

    pub fn render(&self, frame: &mut Frame, level: &Level) {
        frame.render_widget(Clear, frame.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(4)])
            .split(frame.area());

        frame.render_widget(MapWidget::new(level, &self.screen), chunks[0]);
        frame.render_widget(self.status(level), chunks[1]);

        if self.show_help {
            let area = chunks[0];
            let help = Paragraph::new(HELP.iter().map(|line| Line::from(*line)).collect::<Vec<_>>())
                .block(Block::default().title(" Keys ").borders(Borders::ALL));
            let width = 44.min(area.width);
            let height = (HELP.len() as u16 + 2).min(area.height);
            let popup = ratatui::layout::Rect::new(area.x + 2, area.y + 1, width, height);
            frame.render_widget(Clear, popup);
            frame.render_widget(help, popup);
        }
    }

    fn status(&self, level: &Level) -> Paragraph<'static> {
        let player = level.player();
        let ctx = level.context();
        let label = Style::default().fg(Color::Rgb(120, 120, 140));
        let value = Style::default().fg(Color::White);

        let mut stats = vec![
            Span::styled("Turn ", label),
            Span::styled(level.clock().turn().to_string(), value),
            Span::styled(if level.clock().is_daytime() { " (day)" } else { " (night)" }, label),
            Span::styled("  Torch ", label),
            Span::styled(player.cur_lite.to_string(), value),
            Span::styled("  View ", label),
            Span::styled(ctx.view().len().to_string(), value),
            Span::styled("  Lit ", label),
            Span::styled(ctx.lite().len().to_string(), value),
            Span::styled("  Aura ", label),
            Span::styled(ctx.mon_lite().len().to_string(), value),
            Span::styled("  Redrawn ", label),
            Span::styled(self.last_changed.to_string(), value),
        ];
        if let Some(flow) = level.last_flow() {
            stats.push(Span::styled("  Flow ", label));
            stats.push(Span::styled(flow.reached.to_string(), value));
            if flow.saturated() {
                stats.push(Span::styled(" (saturated)", Style::default().fg(Color::Red)));
            }
        }
        if player.blind {
            stats.push(Span::styled("  Blind", Style::default().fg(Color::Red)));
        }

        let message = level.messages().last().cloned().unwrap_or_default();
        Paragraph::new(vec![
            Line::from(stats),
            Line::from(Span::styled(message, Style::default().fg(Color::Rgb(180, 140, 220)))),
        ])
        .block(Block::default().borders(Borders::TOP).title(" ? for keys "))
    }
}

const HELP: &[&str] = &[
    "arrows/hjkl/yubn  move",
    ".                 wait a turn",
    "+ / -             torch radius",
    "o                 open/close adjacent doors",
    "m                 magic mapping",
    "d                 detect objects",
    "L / D             enlightenment / amnesia",
    "B / V             toggle blindness / dark vision",
    "q                 quit",
];

/// Open every adjacent closed door, or close the open ones if none were
fn toggle_doors(level: &mut Level) {
    let here = level.player().pos;
    let around: Vec<Position> = NEIGHBORS.iter().map(|&(dx, dy)| here.offset(dx, dy)).collect();
    let terrain_at = |level: &Level, pos: Position| level.map().tile(pos).map(|t| t.terrain);

    let closed: Vec<Position> = around
        .iter()
        .copied()
        .filter(|&pos| terrain_at(level, pos) == Some(feat::DOOR_CLOSED))
        .collect();
    if !closed.is_empty() {
        for pos in closed {
            level.set_terrain(pos, feat::DOOR_OPEN);
        }
        return;
    }

    for pos in around {
        let empty = level.map().tile(pos).map_or(false, |t| t.monster.is_none());
        if terrain_at(level, pos) == Some(feat::DOOR_OPEN) && empty {
            level.set_terrain(pos, feat::DOOR_CLOSED);
        }
    }
}
