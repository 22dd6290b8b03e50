use glam::DVec2;

use super::config::OverlayConfig;
use super::plan::{ClusterItem, MarkerItem, RenderPlan};
use crate::surface::geometry::{fill_circle, fill_polygon, stroke_circle};
use crate::surface::Surface;

/// Airplane outline in a 24x24 box, nose pointing up (-y)
const AIRPLANE: [(f64, f64); 20] = [
    (21.0, 16.0),
    (21.0, 14.0),
    (13.0, 9.0),
    (13.0, 3.5),
    (12.6, 2.4),
    (11.5, 2.0),
    (10.4, 2.4),
    (10.0, 3.5),
    (10.0, 9.0),
    (2.0, 14.0),
    (2.0, 16.0),
    (10.0, 13.0),
    (10.0, 19.0),
    (8.0, 20.5),
    (8.0, 22.0),
    (11.5, 21.0),
    (15.0, 22.0),
    (15.0, 20.5),
    (13.0, 19.0),
    (13.0, 13.0),
];
const GLYPH_BOX: f64 = 24.0;
const SHADOW_OFFSET: DVec2 = DVec2::new(2.0, 3.0);

/// Airplane outline centered on `center`, rotated clockwise by `heading`
/// degrees and scaled to `size` pixels
pub fn airplane_outline(center: DVec2, heading: f64, size: f64) -> Vec<DVec2> {
    let rotation = DVec2::from_angle(heading.to_radians());
    let scale = size / GLYPH_BOX;
    let origin = DVec2::splat(GLYPH_BOX / 2.0);
    AIRPLANE
        .iter()
        .map(|&(x, y)| center + rotation.rotate((DVec2::new(x, y) - origin) * scale))
        .collect()
}

/// What one frame drew
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub markers: usize,
    pub clusters: usize,
    pub resized: bool,
}

/// Paints rendering plans onto a surface, one full clear-and-redraw per call
#[derive(Debug, Default)]
pub struct FrameRenderer {
    /// Size the attached surface was last allocated for
    sized_for: Option<(usize, usize)>,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the surface size, e.g. after a new surface is attached
    pub fn reset(&mut self) {
        self.sized_for = None;
    }

    pub fn render<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        plan: &RenderPlan,
        selected: Option<&str>,
        config: &OverlayConfig,
    ) -> FrameStats {
        let mut stats = FrameStats::default();

        if self.sized_for != Some(plan.pixel_size) {
            surface.resize(plan.pixel_size.0, plan.pixel_size.1);
            self.sized_for = Some(plan.pixel_size);
            stats.resized = true;
        }
        surface.clear();

        for cluster in plan.clusters() {
            draw_cluster(surface, cluster, config);
            stats.clusters += 1;
        }

        let is_selected = |m: &MarkerItem| {
            selected.is_some_and(|id| plan.flight(m).is_some_and(|f| f.unique_key == id))
        };
        let (chosen, rest): (Vec<&MarkerItem>, Vec<&MarkerItem>) = plan.markers().partition(|m| is_selected(*m));
        for marker in rest {
            draw_marker(surface, marker, plan.zoom, false, config);
            stats.markers += 1;
        }
        for marker in chosen {
            draw_marker(surface, marker, plan.zoom, true, config);
            stats.markers += 1;
        }

        stats
    }
}

fn draw_marker<S: Surface + ?Sized>(
    surface: &mut S,
    marker: &MarkerItem,
    zoom: f64,
    selected: bool,
    config: &OverlayConfig,
) {
    let size = config.marker_size(zoom, selected);

    if config.marker_shadow {
        let shadow = airplane_outline(marker.position + SHADOW_OFFSET, marker.heading, size);
        fill_polygon(surface, &shadow, config.shadow_color());
    }

    let color = config.marker_color(selected);
    fill_polygon(surface, &airplane_outline(marker.position, marker.heading, size), color);

    if selected {
        // Halo so the selection stands out in dense areas
        let halo = (size * 0.5).round() as i32 + 2;
        stroke_circle(
            surface,
            marker.position.x.round() as i32,
            marker.position.y.round() as i32,
            halo,
            color,
        );
    }
}

fn draw_cluster<S: Surface + ?Sized>(surface: &mut S, cluster: &ClusterItem, config: &OverlayConfig) {
    let cx = cluster.position.x.round() as i32;
    let cy = cluster.position.y.round() as i32;
    fill_circle(
        surface,
        cx,
        cy,
        cluster.radius.round() as i32,
        config.cluster_color(cluster.count),
    );
    surface.text(cx, cy, &cluster.count.to_string(), config.cluster_label_color());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::{Flight, FlightSet};
    use crate::geo::{GeoPoint, GeoRect};
    use crate::overlay::plan::PlanItem;
    use crate::surface::recording::RecordingSurface;

    fn config() -> OverlayConfig {
        OverlayConfig {
            marker_shadow: false,
            ..OverlayConfig::default()
        }
    }

    fn flights(ids: &[&str]) -> FlightSet {
        ids.iter()
            .map(|id| Flight {
                unique_key: id.to_string(),
                ..Default::default()
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn marker(index: usize, x: f64, y: f64, heading: f64, is_selected: bool) -> PlanItem {
        PlanItem::Marker(MarkerItem {
            position: DVec2::new(x, y),
            flight_index: index,
            heading,
            is_selected,
        })
    }

    fn plan(items: Vec<PlanItem>, flights: FlightSet) -> RenderPlan {
        RenderPlan {
            items,
            flights,
            zoom: 5.0,
            pixel_size: (200, 100),
            skipped: 0,
        }
    }

    #[test]
    fn test_outline_rotation() {
        let north = airplane_outline(DVec2::ZERO, 0.0, 24.0);
        let east = airplane_outline(DVec2::ZERO, 90.0, 24.0);
        // Nose (11.5, 2) sits above the center at heading 0 and to its right at 90
        let nose_n = north[5];
        let nose_e = east[5];
        assert!(nose_n.y < -9.0 && nose_n.x.abs() < 1.0);
        assert!(nose_e.x > 9.0 && nose_e.y.abs() < 1.0);
    }

    #[test]
    fn test_resize_once_and_clear_every_frame() {
        let mut surface = RecordingSurface::default();
        let mut renderer = FrameRenderer::new();
        let plan = plan(vec![marker(0, 50.0, 50.0, 0.0, false)], flights(&["a"]));

        let first = renderer.render(&mut surface, &plan, None, &config());
        let second = renderer.render(&mut surface, &plan, None, &config());
        assert!(first.resized);
        assert!(!second.resized);
        assert_eq!(surface.resizes, 1);
        assert_eq!(surface.clears, 2);
        assert_eq!((surface.width, surface.height), (200, 100));
    }

    #[test]
    fn test_marker_painted_in_marker_color() {
        let mut surface = RecordingSurface::default();
        let config = config();
        let plan = plan(vec![marker(0, 50.0, 50.0, 0.0, false)], flights(&["a"]));
        let stats = FrameRenderer::new().render(&mut surface, &plan, None, &config);

        assert_eq!(stats.markers, 1);
        assert_eq!(surface.color_at(50, 50), Some(config.marker_color(false)));
        assert!(surface.count_color(config.marker_color(false)) > 20);
        assert_eq!(surface.count_color(config.marker_color(true)), 0);
    }

    #[test]
    fn test_selected_drawn_on_top() {
        let mut surface = RecordingSurface::default();
        let config = config();
        // Selected first in plan order, still painted last
        let items = vec![
            marker(1, 50.0, 50.0, 0.0, true),
            marker(0, 51.0, 50.0, 0.0, false),
        ];
        let plan = plan(items, flights(&["a", "b"]));
        FrameRenderer::new().render(&mut surface, &plan, Some("b"), &config);
        assert_eq!(surface.color_at(50, 50), Some(config.marker_color(true)));
    }

    #[test]
    fn test_cluster_badge_and_label() {
        let mut surface = RecordingSurface::default();
        let config = config();
        let cluster = PlanItem::Cluster(ClusterItem {
            position: DVec2::new(100.0, 50.0),
            centroid: GeoPoint::new(0.0, 0.0),
            count: 42,
            bounds: GeoRect::new(-1.0, -1.0, 1.0, 1.0),
            radius: 10.0,
        });
        let stats = FrameRenderer::new().render(&mut surface, &plan(vec![cluster], flights(&[])), None, &config);

        assert_eq!(stats.clusters, 1);
        assert_eq!(surface.color_at(100, 50), Some(config.cluster_color(42)));
        assert_eq!(surface.color_at(110, 50), Some(config.cluster_color(42)));
        assert_eq!(surface.color_at(112, 50), None);
        assert_eq!(surface.labels, vec![(100, 50, "42".to_string(), config.cluster_label_color())]);
    }

    #[test]
    fn test_empty_plan_draws_nothing() {
        let mut surface = RecordingSurface::default();
        let stats = FrameRenderer::new().render(&mut surface, &plan(Vec::new(), flights(&[])), None, &config());
        assert_eq!(stats, FrameStats { markers: 0, clusters: 0, resized: true });
        assert_eq!(surface.plots, 0);
        assert_eq!(surface.clears, 1);
    }
}
