use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};
use tui_flights::flight::Flight;
use tui_flights::surface::{BrailleSurface, Surface};

use crate::app::App;

const PANEL_WIDTH: u16 = 34;
const PANEL_HEIGHT: u16 = 12;

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Flights ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Base map is cheap to redraw; the overlay surface is only repainted by
    // its own frame callback
    let mut base = BrailleSurface::default();
    base.resize(app.viewport.width, app.viewport.height);
    app.basemap.render(&mut base, &app.viewport);

    let cursor_pos = app.mouse_pixel_pos().and_then(|p| {
        let cx = (p.x / 2.0) as u16;
        let cy = (p.y / 4.0) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    let map_widget = MapWidget {
        base: &base,
        overlay: app.overlay.surface(),
        cursor_pos,
    };
    frame.render_widget(map_widget, inner);

    if let Some(flight) = app.selected_flight() {
        let panel = Rect {
            x: inner.x + 1,
            y: inner.y + 1,
            width: PANEL_WIDTH.min(inner.width.saturating_sub(2)),
            height: PANEL_HEIGHT.min(inner.height.saturating_sub(2)),
        };
        render_info_panel(frame, flight, panel);
    }
}

/// Braille base map with the flight overlay composited on top
struct MapWidget<'a> {
    base: &'a BrailleSurface,
    overlay: Option<&'a BrailleSurface>,
    cursor_pos: Option<(u16, u16)>,
}

fn paint_cells(surface: &BrailleSurface, area: Rect, buf: &mut Buffer) {
    for (col, row, ch, color) in surface.cells() {
        if col >= area.width || row >= area.height {
            continue;
        }
        buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        paint_cells(self.base, area, buf);

        if let Some(overlay) = self.overlay {
            paint_cells(overlay, area, buf);

            // Cluster counts
            for label in overlay.labels() {
                if label.row >= area.height || label.col >= area.width {
                    continue;
                }
                let style = Style::default().fg(label.color).add_modifier(Modifier::BOLD);
                let max_len = (area.width - label.col) as usize;
                for (i, ch) in label.text.chars().take(max_len).enumerate() {
                    let x = area.x + label.col + i as u16;
                    let cell = &mut buf[(x, area.y + label.row)];
                    // Keep the badge color behind the digits
                    let bg = cell.fg;
                    cell.set_char(ch).set_style(style.bg(bg));
                }
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

fn info_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<10}"), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn render_info_panel(frame: &mut Frame, flight: &Flight, area: Rect) {
    let title = format!(" {} {} ", flight.airline_iata, flight.callsign);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let lines = vec![
        info_line("Route", format!("{} → {}", flight.origin_airport_iata, flight.destination_airport_iata)),
        info_line("Aircraft", format!("{} ({})", flight.aircraft_code, flight.registration)),
        info_line("Altitude", format!("{} ft", flight.altitude)),
        info_line("Speed", format!("{} kt", flight.ground_speed)),
        info_line("Vertical", format!("{:+} ft/min", flight.vertical_speed)),
        info_line("Track", format!("{:.0}°", flight.heading())),
        info_line("Position", format!("{:.3}, {:.3}", flight.latitude, flight.longitude)),
        info_line("Squawk", flight.squawk.clone()),
        info_line("ICAO", flight.icao_24bit.clone()),
        Line::from(Span::styled("x: close", Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (markers, clusters) = app.last_frame.map_or((0, 0), |s| (s.markers, s.clusters));

    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", Style::default().fg(Color::DarkGray)),
        Span::styled(app.lod_level(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{} flights ", app.flights.len()), Style::default().fg(Color::Green)),
        Span::styled(
            format!("[{markers} markers, {clusters} clusters] "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(err) = &app.last_error {
        spans.push(Span::styled(format!(" | {err}"), Style::default().fg(Color::Red)));
    }
    spans.push(Span::styled(
        " | click:select hjkl:pan +/-:zoom x:deselect q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
