use std::time::{Duration, Instant};

use glam::DVec2;
use tui_flights::flight::{Flight, FlightId, FlightSet};
use tui_flights::geo::GeoRect;
use tui_flights::map::{Viewport, ZOOM_STEP};
use tui_flights::overlay::{FlightOverlay, FrameStats, OverlayConfig, OverlayHost, OverlayState, Trigger};
use tui_flights::surface::BrailleSurface;

use crate::basemap::{BaseMap, Lod};
use crate::data::FlightSimulator;

/// Pixel size of one tile at zoom 0, in braille dots
const TILE_SIZE: f64 = 64.0;
/// Wall-clock time between simulated feed refreshes
const REFRESH_INTERVAL: Duration = Duration::from_secs(1);
/// Simulated flying time per refresh; sped up so motion is visible
const SIM_SECONDS_PER_REFRESH: f64 = 60.0;

/// Braille pixel size of the map area for a terminal of `width` x `height` cells.
/// Accounts for the border (2 chars each way) and the status bar (1 row).
fn map_pixels(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    (inner_width * 2, inner_height * 4)
}

/// Terminal cell to braille pixel at the cell's center, inside the map border
fn cell_to_pixel(col: u16, row: u16) -> DVec2 {
    let px = col.saturating_sub(1) as f64 * 2.0 + 1.0;
    let py = row.saturating_sub(1) as f64 * 4.0 + 2.0;
    DVec2::new(px, py)
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub basemap: BaseMap,
    pub overlay: FlightOverlay<BrailleSurface>,
    pub flights: FlightSet,
    pub selected: Option<FlightId>,
    simulator: Option<FlightSimulator>,
    last_refresh: Instant,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Set once the pointer moves with the button held; suppresses the click
    dragged: bool,
    pub mouse_pos: Option<(u16, u16)>,
    pub last_frame: Option<FrameStats>,
    pub last_error: Option<String>,
}

impl App {
    pub fn new(width: usize, height: usize, config: OverlayConfig, flights: FlightSet, simulator: Option<FlightSimulator>) -> Self {
        let (pixel_width, pixel_height) = map_pixels(width, height);
        let mut overlay = FlightOverlay::new(config);
        overlay.attach(BrailleSurface::default());

        Self {
            viewport: Viewport::world(pixel_width, pixel_height, TILE_SIZE),
            basemap: BaseMap::new(),
            overlay,
            flights,
            selected: None,
            simulator,
            last_refresh: Instant::now(),
            should_quit: false,
            last_mouse: None,
            dragged: false,
            mouse_pos: None,
            last_frame: None,
            last_error: None,
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = map_pixels(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
        self.overlay.notify(Trigger::Viewport);
    }

    /// Pan the map by braille pixels
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
        self.overlay.notify(Trigger::Viewport);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.overlay.notify(Trigger::Viewport);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.overlay.notify(Trigger::Viewport);
    }

    /// Zoom towards or away from a screen position (terminal column/row)
    pub fn zoom_at(&mut self, col: u16, row: u16, zoom_in: bool) {
        let delta = if zoom_in { ZOOM_STEP } else { -ZOOM_STEP };
        self.viewport.zoom_at(cell_to_pixel(col, row), delta);
        self.overlay.notify(Trigger::Viewport);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Handle mouse drag
    pub fn drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as f64 - col as f64) * 2.0;
            let dy = (last_y as f64 - row as f64) * 4.0;
            if dx != 0.0 || dy != 0.0 {
                self.dragged = true;
                self.pan(dx, dy);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// Button released: a press without drag is a click on the overlay
    pub fn release(&mut self, col: u16, row: u16) {
        let clicked = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if clicked {
            self.click(col, row);
        }
    }

    pub fn click(&mut self, col: u16, row: u16) {
        let command = self.overlay.handle_click(cell_to_pixel(col, row));
        if let Some(command) = command {
            command.dispatch(self);
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.overlay.notify(Trigger::Selection);
        }
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Replace the whole flight list
    pub fn set_flights(&mut self, flights: FlightSet) {
        self.flights = flights;
        self.overlay.notify(Trigger::Flights);
    }

    /// One pass of the event loop: refresh the feed when due, then run the
    /// overlay's frame callback
    pub fn tick(&mut self) {
        if self.last_refresh.elapsed() >= REFRESH_INTERVAL {
            self.last_refresh = Instant::now();
            if let Some(simulator) = self.simulator.as_mut() {
                let flights = simulator.step(SIM_SECONDS_PER_REFRESH);
                self.set_flights(flights);
            }
        }
        self.frame();
    }

    fn frame(&mut self) {
        let state = OverlayState::new(self.flights.clone(), self.selected.clone());
        match self.overlay.on_frame(&self.viewport, &state) {
            Ok(Some(stats)) => {
                self.last_frame = Some(stats);
                self.last_error = None;
            }
            Ok(None) => {}
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    /// The selected flight as of the current snapshot
    pub fn selected_flight(&self) -> Option<&Flight> {
        let id = self.selected.as_deref()?;
        self.flights.iter().find(|f| f.unique_key == id)
    }

    pub fn zoom_level(&self) -> String {
        format!("z{:.1}", self.viewport.zoom)
    }

    pub fn lod_level(&self) -> &'static str {
        Lod::from_zoom(self.viewport.zoom).label()
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Mouse position in braille pixel coordinates
    pub fn mouse_pixel_pos(&self) -> Option<DVec2> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }
}

impl OverlayHost for App {
    fn select_flight(&mut self, flight: &Flight) {
        tracing::info!(id = %flight.unique_key, callsign = %flight.callsign, "flight selected");
        self.selected = Some(flight.unique_key.clone());
        self.overlay.notify(Trigger::Selection);
    }

    fn fly_to_bounds(&mut self, bounds: GeoRect, padding_px: f64) {
        tracing::info!(?bounds, "zooming to cluster");
        self.viewport.fit_bounds(bounds, padding_px);
        self.overlay.notify(Trigger::Viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_flights::geo::GeoPoint;

    fn flight(id: &str, lat: f64, lon: f64) -> Flight {
        Flight {
            unique_key: id.to_string(),
            latitude: lat,
            longitude: lon,
            track: Some(45.0),
            ..Default::default()
        }
    }

    fn app(flights: Vec<Flight>) -> App {
        let mut app = App::new(100, 43, OverlayConfig::terminal(), flights.into(), None);
        app.tick();
        app
    }

    /// Terminal cell that contains the pixel
    fn pixel_to_cell(p: DVec2) -> (u16, u16) {
        ((p.x / 2.0) as u16 + 1, (p.y / 4.0) as u16 + 1)
    }

    #[test]
    fn test_click_selects_and_redraws() {
        let mut app = app(vec![flight("a", 10.0, 20.0)]);
        assert_eq!(app.overlay.render_count(), 1);

        let (col, row) = pixel_to_cell(app.viewport.project(GeoPoint::new(10.0, 20.0)));
        app.press(col, row);
        app.release(col, row);
        assert_eq!(app.selected.as_deref(), Some("a"));
        assert_eq!(app.selected_flight().map(|f| f.unique_key.as_str()), Some("a"));

        app.tick();
        assert_eq!(app.overlay.render_count(), 2);
        assert!(app.overlay.last_plan().unwrap().markers().all(|m| m.is_selected));
    }

    #[test]
    fn test_drag_pans_without_clicking() {
        let mut app = app(vec![flight("a", 10.0, 20.0)]);
        let (col, row) = pixel_to_cell(app.viewport.project(GeoPoint::new(10.0, 20.0)));
        let before = app.viewport.center_lon;
        app.press(col, row);
        app.drag(col + 5, row);
        app.release(col + 5, row);
        assert!(app.selected.is_none());
        assert!(app.viewport.center_lon < before);
    }

    #[test]
    fn test_input_burst_renders_once() {
        let mut app = app(vec![flight("a", 10.0, 20.0), flight("b", -10.0, -20.0)]);
        let renders = app.overlay.render_count();

        app.press(20, 10);
        for step in 1..=8 {
            app.drag(20 + step, 10);
        }
        app.release(28, 10);
        app.pan(20.0, 0.0);
        app.zoom_in();
        app.tick();
        assert_eq!(app.overlay.render_count(), renders + 1);

        app.tick();
        assert_eq!(app.overlay.render_count(), renders + 1);
    }

    #[test]
    fn test_cluster_click_fits_viewport() {
        let flights: Vec<Flight> = (0..300)
            .map(|i| flight(&format!("f{i}"), 40.0 + (i % 20) as f64 * 0.05, -100.0 + (i / 20) as f64 * 0.05))
            .collect();
        let mut app = app(flights);
        let zoom_before = app.viewport.zoom;
        let cluster = app.overlay.last_plan().unwrap().clusters().next().unwrap().clone();
        let (col, row) = pixel_to_cell(cluster.position);
        app.click(col, row);
        assert!(app.viewport.zoom > zoom_before);
        assert!(app.overlay.is_redraw_pending());
    }

    #[test]
    fn test_clear_selection() {
        let mut app = app(vec![flight("a", 0.0, 0.0)]);
        app.clear_selection();
        assert!(!app.overlay.is_redraw_pending());
        app.selected = Some("a".into());
        app.clear_selection();
        assert!(app.selected.is_none());
        assert!(app.overlay.is_redraw_pending());
    }
}
