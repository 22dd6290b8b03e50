//! Flight overlay: clustering, drawing and hit-testing on top of a host map.
//!
//! Data flow per frame: flight snapshot + selection + viewport go through
//! [`compute_plan`], the resulting [`RenderPlan`] is painted by the
//! [`FrameRenderer`] and kept for [`hit_test`] until the next frame.

mod cluster;
mod config;
mod grid;
mod plan;
mod render;
mod scheduler;

pub use cluster::compute_plan;
pub use config::OverlayConfig;
pub use hit_test::{hit_test, OverlayCommand, OverlayHost};
pub use plan::{ClusterItem, MarkerItem, PlanItem, RenderPlan};
pub use render::{airplane_outline, FrameRenderer, FrameStats};
pub use scheduler::{FrameRequest, RedrawReasons, RenderScheduler, Trigger};

use glam::DVec2;

use crate::error::OverlayError;
use crate::flight::{FlightId, FlightSet};
use crate::map::MapProjection;
use crate::surface::Surface;

/// Immutable inputs for one redraw
#[derive(Clone, Debug)]
pub struct OverlayState {
    pub flights: FlightSet,
    pub selected: Option<FlightId>,
}

impl OverlayState {
    pub fn new(flights: FlightSet, selected: Option<FlightId>) -> Self {
        Self { flights, selected }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

/// The overlay layer a host map composes in.
///
/// The host attaches a surface, reports changes through [`FlightOverlay::notify`],
/// calls [`FlightOverlay::on_frame`] from its frame callback, and feeds clicks to
/// [`FlightOverlay::handle_click`].
pub struct FlightOverlay<S: Surface> {
    config: OverlayConfig,
    surface: Option<S>,
    renderer: FrameRenderer,
    scheduler: RenderScheduler,
    last_plan: Option<RenderPlan>,
    renders: u64,
}

impl<S: Surface> FlightOverlay<S> {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            surface: None,
            renderer: FrameRenderer::new(),
            scheduler: RenderScheduler::new(),
            last_plan: None,
            renders: 0,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Swap tunables; takes effect on the next frame
    pub fn set_config(&mut self, config: OverlayConfig) -> Result<(), OverlayError> {
        config.validate()?;
        self.config = config;
        self.notify(Trigger::Viewport);
        Ok(())
    }

    /// Take ownership of a drawing surface and schedule the first frame
    pub fn attach(&mut self, surface: S) {
        tracing::info!("overlay surface attached");
        self.surface = Some(surface);
        self.renderer.reset();
        self.scheduler.request(Trigger::Viewport);
    }

    /// Give the surface back; pending redraws and the last plan are dropped
    pub fn detach(&mut self) -> Option<S> {
        tracing::info!("overlay surface detached");
        self.scheduler.cancel();
        self.last_plan = None;
        self.surface.take()
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Report a change. Returns `true` if it scheduled a new frame.
    pub fn notify(&mut self, trigger: Trigger) -> bool {
        if self.surface.is_none() {
            return false;
        }
        self.scheduler.request(trigger)
    }

    pub fn is_redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Frame callback. Runs the pending redraw, if any, against the state and
    /// viewport as they are now.
    ///
    /// A failed map query aborts this redraw only: the previous plan and
    /// pixels stay, and the next trigger retries. Without a surface nothing
    /// is taken from the scheduler.
    pub fn on_frame<M: MapProjection + ?Sized>(
        &mut self,
        map: &M,
        state: &OverlayState,
    ) -> Result<Option<FrameStats>, OverlayError> {
        let surface = self.surface.as_mut().ok_or(OverlayError::Detached)?;
        let Some(frame) = self.scheduler.take_frame() else {
            return Ok(None);
        };

        let plan = compute_plan(&state.flights, map, state.selected_id(), &self.config).map_err(|err| {
            tracing::warn!(frame = frame.frame_sequence_id, %err, "redraw aborted");
            err
        })?;

        let stats = self.renderer.render(surface, &plan, state.selected_id(), &self.config);
        tracing::debug!(
            frame = frame.frame_sequence_id,
            triggers = frame.triggers,
            reasons = ?frame.reasons,
            markers = stats.markers,
            clusters = stats.clusters,
            resized = stats.resized,
            "overlay redrawn"
        );

        self.last_plan = Some(plan);
        self.renders += 1;
        Ok(Some(stats))
    }

    /// Resolve a click against the most recently drawn plan
    pub fn handle_click(&self, pointer: DVec2) -> Option<OverlayCommand> {
        let plan = self.last_plan.as_ref()?;
        hit_test(plan, pointer, &self.config)
    }

    pub fn last_plan(&self) -> Option<&RenderPlan> {
        self.last_plan.as_ref()
    }

    /// Completed redraws since creation
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::Flight;
    use crate::geo::{GeoPoint, GeoRect};
    use crate::map::{LinearMap, Viewport};
    use crate::surface::recording::RecordingSurface;

    fn flight(id: &str, lat: f64, lon: f64, track: Option<f64>) -> Flight {
        Flight {
            unique_key: id.to_string(),
            latitude: lat,
            longitude: lon,
            track,
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct Host {
        selected: Option<String>,
        zoomed: Option<GeoRect>,
    }

    impl OverlayHost for Host {
        fn select_flight(&mut self, flight: &Flight) {
            self.selected = Some(flight.unique_key.clone());
        }

        fn fly_to_bounds(&mut self, bounds: GeoRect, _padding_px: f64) {
            self.zoomed = Some(bounds);
        }
    }

    #[test]
    fn click_on_single_flight_selects_it() {
        // Whole world fits a 64px canvas at zoom 5 with 1px tiles
        let viewport = Viewport::new(0.0, 0.0, 5.0, 64, 64, 1.0);
        let state = OverlayState::new(vec![flight("a", 0.0, 0.0, Some(90.0))].into(), None);
        let mut overlay = FlightOverlay::new(OverlayConfig::default());
        overlay.attach(RecordingSurface::default());

        let stats = overlay.on_frame(&viewport, &state).unwrap().unwrap();
        assert_eq!(stats.markers, 1);

        let at = viewport.project(GeoPoint::new(0.0, 0.0));
        let command = overlay.handle_click(at + DVec2::new(3.0, -2.0)).unwrap();
        let mut host = Host::default();
        command.dispatch(&mut host);
        assert_eq!(host.selected.as_deref(), Some("a"));
    }

    #[test]
    fn burst_of_triggers_renders_once_with_latest_state() {
        let map = LinearMap::new(GeoRect::world(), 3.0, 360, 180);
        let mut overlay = FlightOverlay::new(OverlayConfig::default());
        overlay.attach(RecordingSurface::default());
        overlay.on_frame(&map, &OverlayState::new(Vec::new().into(), None)).unwrap();
        assert_eq!(overlay.render_count(), 1);

        let mut state = OverlayState::new(vec![flight("old", 1.0, 1.0, None)].into(), None);
        for round in 0..3 {
            overlay.notify(Trigger::Viewport);
            overlay.notify(Trigger::Selection);
            overlay.notify(Trigger::Flights);
            state = OverlayState::new(
                vec![flight("old", 1.0, 1.0, None), flight(&format!("new{round}"), 2.0, 2.0, None)].into(),
                Some(format!("new{round}")),
            );
        }

        assert!(overlay.on_frame(&map, &state).unwrap().is_some());
        assert!(overlay.on_frame(&map, &state).unwrap().is_none());
        assert_eq!(overlay.render_count(), 2);

        let plan = overlay.last_plan().unwrap();
        let selected: Vec<&str> = plan
            .markers()
            .filter(|m| m.is_selected)
            .filter_map(|m| plan.flight(m))
            .map(|f| f.unique_key.as_str())
            .collect();
        assert_eq!(selected, vec!["new2"]);
        assert_eq!(overlay.surface().unwrap().resizes, 1);
    }

    #[test]
    fn failed_map_query_keeps_previous_plan() {
        let good = LinearMap::new(GeoRect::world(), 3.0, 360, 180);
        let broken = LinearMap::new(GeoRect::world(), 3.0, 0, 0);
        let state = OverlayState::new(vec![flight("a", 0.0, 0.0, None)].into(), None);

        let mut overlay = FlightOverlay::new(OverlayConfig::default());
        overlay.attach(RecordingSurface::default());
        overlay.on_frame(&good, &state).unwrap();

        overlay.notify(Trigger::Viewport);
        assert!(matches!(overlay.on_frame(&broken, &state), Err(OverlayError::Map(_))));
        assert!(!overlay.is_redraw_pending());
        assert_eq!(overlay.last_plan().unwrap().items.len(), 1);

        overlay.notify(Trigger::Viewport);
        assert!(overlay.on_frame(&good, &state).unwrap().is_some());
    }

    #[test]
    fn click_before_any_frame_is_noop() {
        let overlay: FlightOverlay<RecordingSurface> = FlightOverlay::new(OverlayConfig::default());
        assert_eq!(overlay.handle_click(DVec2::new(1.0, 1.0)), None);
    }

    #[test]
    fn detach_cancels_and_returns_surface() {
        let mut overlay = FlightOverlay::new(OverlayConfig::default());
        overlay.attach(RecordingSurface::default());
        assert!(overlay.is_redraw_pending());
        let surface = overlay.detach();
        assert!(surface.is_some());
        assert!(!overlay.is_redraw_pending());
        assert!(!overlay.notify(Trigger::Flights));
    }

    #[test]
    fn detached_frame_leaves_scheduler_alone() {
        let map = LinearMap::new(GeoRect::world(), 3.0, 360, 180);
        let state = OverlayState::new(vec![flight("a", 0.0, 0.0, None)].into(), None);
        let mut overlay: FlightOverlay<RecordingSurface> = FlightOverlay::new(OverlayConfig::default());

        overlay.set_config(OverlayConfig::terminal()).unwrap();
        assert!(!overlay.is_redraw_pending());
        assert!(matches!(overlay.on_frame(&map, &state), Err(OverlayError::Detached)));

        overlay.attach(RecordingSurface::default());
        overlay.set_config(OverlayConfig::default()).unwrap();
        assert!(overlay.is_redraw_pending());
        assert!(overlay.on_frame(&map, &state).unwrap().is_some());
        assert_eq!(overlay.render_count(), 1);
        assert_eq!(overlay.config().click_tolerance_px, OverlayConfig::default().click_tolerance_px);
    }

    #[test]
    fn cluster_click_requests_zoom() {
        let map = LinearMap::new(GeoRect::world(), 2.0, 360, 180);
        let flights: Vec<Flight> = (0..150)
            .map(|i| flight(&format!("f{i}"), 40.0 + (i % 10) as f64 * 0.1, 10.0 + (i / 10) as f64 * 0.1, None))
            .collect();
        let state = OverlayState::new(flights.into(), None);
        let mut overlay = FlightOverlay::new(OverlayConfig::default());
        overlay.attach(RecordingSurface::default());
        overlay.on_frame(&map, &state).unwrap();

        let cluster = overlay.last_plan().unwrap().clusters().next().unwrap().clone();
        let mut host = Host::default();
        overlay.handle_click(cluster.position).unwrap().dispatch(&mut host);
        assert_eq!(host.zoomed, Some(cluster.bounds));
    }
}
