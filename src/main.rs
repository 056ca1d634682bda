//! Cavesight - level viewer
//!
//! Walks a player around a generated test level and shows what the
//! vision engine lets them see, light and remember.

use std::fs::OpenOptions;
use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use cavesight::data::DataManager;
use cavesight::entities::{AuraFlags, FloorObject, Monster};
use cavesight::game::Level;
use cavesight::ui::App;
use cavesight::world::{Map, Position};

/// How long to wait for a key before redrawing anyway
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    // Log to a file so the terminal UI stays clean
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("cavesight.log")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("Starting Cavesight v{}", env!("CARGO_PKG_VERSION"));

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1);
    let mut level = build_level(seed);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&level);
    app.sync(&mut level);

    let result = run(&mut terminal, &mut app, &mut level);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Viewer exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Cavesight shut down cleanly");
    result
}

/// Test level with a few aura monsters and some loot
fn build_level(seed: u64) -> Level {
    let data = DataManager::new();
    let mut level = Level::with_data(Map::test_map(seed), &data);
    level.set_torch_radius(2);

    let monsters = [
        (Position::new(44, 10), Monster::new("will o' wisp", AuraFlags::SELF_LITE_2)),
        (Position::new(15, 11), Monster::new("shade", AuraFlags::SELF_DARK_1)),
        (Position::new(60, 28), Monster::new("fire imp", AuraFlags::HAS_LITE_1)),
        (Position::new(50, 33), Monster::new("gloom", AuraFlags::HAS_DARK_2).sleeping()),
    ];
    for (pos, monster) in monsters {
        if level.spawn_monster(pos, monster).is_none() {
            log::warn!("Could not place a monster at {:?}", pos);
        }
    }

    for (pos, name) in [(Position::new(6, 12), "rusty key"), (Position::new(52, 16), "lantern")] {
        level.drop_object(pos, FloorObject::new(name));
    }

    level.enter_level();
    level.update_stuff();
    level
}

/// Main loop: one key, one turn
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App, level: &mut Level) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame, level))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            // Only handle key press events, not releases
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_input(key, level) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => log::warn!("Input handling error: {}", e),
            }
        }
    }

    Ok(())
}
