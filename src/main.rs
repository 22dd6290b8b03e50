mod app;
mod basemap;
mod data;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tui_flights::flight::FlightSet;
use tui_flights::overlay::OverlayConfig;

use crate::data::FlightSimulator;

/// Number of simulated flights when no snapshot file is given
const SIMULATED_FLIGHTS: usize = 5000;
const SIMULATOR_SEED: u64 = 0x5eed_f11e;

/// ~60fps frame cadence
const FRAME: Duration = Duration::from_millis(16);

/// Log to a file when `TUI_FLIGHTS_LOG` is set; the terminal itself is busy
fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os("TUI_FLIGHTS_LOG") else {
        return Ok(());
    };
    let file = File::create(&path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|err| anyhow!(err))?;
    Ok(())
}

fn load_config() -> OverlayConfig {
    let Some(path) = std::env::var_os("TUI_FLIGHTS_CONFIG") else {
        return OverlayConfig::terminal();
    };
    match OverlayConfig::from_json_file(Path::new(&path)) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = ?path, error = %err, "bad overlay config, using terminal preset");
            OverlayConfig::terminal()
        }
    }
}

/// Flights from a snapshot file given as the first argument, otherwise a simulator
fn load_flights() -> Result<(FlightSet, Option<FlightSimulator>)> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            let flights = data::load_flight_snapshot(&path)?;
            tracing::info!(count = flights.len(), path = %path.display(), "flight snapshot loaded");
            Ok((flights, None))
        }
        None => {
            let simulator = FlightSimulator::new(SIMULATED_FLIGHTS, SIMULATOR_SEED);
            Ok((simulator.snapshot(), Some(simulator)))
        }
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let config = load_config();
    let (flights, simulator) = load_flights()?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, config, flights, simulator);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_at(mouse.column, mouse.row, true),
        MouseEventKind::ScrollDown => app.zoom_at(mouse.column, mouse.row, false),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-30.0, 0.0),
        MouseEventKind::ScrollRight => app.pan(30.0, 0.0),
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

            KeyCode::Left | KeyCode::Char('h') => app.pan(-20.0, 0.0),
            KeyCode::Right | KeyCode::Char('l') => app.pan(20.0, 0.0),
            KeyCode::Up | KeyCode::Char('k') => app.pan(0.0, -24.0),
            KeyCode::Down | KeyCode::Char('j') => app.pan(0.0, 24.0),

            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

            KeyCode::Char('x') | KeyCode::Char('X') => app.clear_selection(),
            _ => {}
        },
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Resize(width, height) => app.resize(width as usize, height as usize),
        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    config: OverlayConfig,
    flights: FlightSet,
    simulator: Option<FlightSimulator>,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, config, flights, simulator);

    let data_dir = Path::new("data");
    if data_dir.exists() {
        data::load_coastlines(&mut app.basemap, data_dir);
    }
    if !app.basemap.has_data() {
        tracing::warn!(dir = %data_dir.display(), "no coastline data, drawing graticule only");
    }

    while !app.should_quit {
        // Frame callback: the overlay redraws here if anything asked it to
        app.tick();

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Drain every event that arrives before the next frame is due
        let deadline = Instant::now() + FRAME;
        while !app.should_quit {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            handle_event(&mut app, event::read()?);
        }
    }

    Ok(())
}
