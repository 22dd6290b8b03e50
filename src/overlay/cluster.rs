use glam::DVec2;

use super::config::OverlayConfig;
use super::grid::ScreenGrid;
use super::plan::{ClusterItem, MarkerItem, PlanItem, RenderPlan};
use crate::error::MapError;
use crate::flight::FlightSet;
use crate::geo::{GeoAccumulator, GeoPoint};
use crate::map::MapProjection;

/// A flight that survived visibility filtering
#[derive(Clone, Copy)]
struct Visible {
    index: usize,
    geo: GeoPoint,
    position: DVec2,
    heading: f64,
}

impl Visible {
    fn marker(self, is_selected: bool) -> PlanItem {
        PlanItem::Marker(MarkerItem {
            position: self.position,
            flight_index: self.index,
            heading: self.heading,
            is_selected,
        })
    }
}

/// Build the rendering plan for one frame.
///
/// Flights outside the visible bounds, or with unusable coordinates, produce
/// nothing. Below `cluster_threshold` visible flights, or at/above the zoom
/// cutoff, every flight is a marker in input order. Otherwise flights are
/// bucketed on a screen grid: single-member cells become markers, the rest
/// become clusters placed at the projected geographic centroid. The selected
/// flight is never bucketed and keeps its input position in the plan.
pub fn compute_plan<M: MapProjection + ?Sized>(
    flights: &FlightSet,
    map: &M,
    selected: Option<&str>,
    config: &OverlayConfig,
) -> Result<RenderPlan, MapError> {
    let bounds = map.visible_bounds()?;
    let zoom = map.zoom_level();
    let mut plan = RenderPlan::empty(flights.clone(), zoom, map.pixel_size());

    let mut visible = Vec::with_capacity(flights.len().min(4096));
    for (index, flight) in flights.iter().enumerate() {
        let geo = flight.position();
        if !geo.is_valid() {
            plan.skipped += 1;
            continue;
        }
        if !bounds.contains(geo) {
            continue;
        }
        let position = map.project(geo)?;
        visible.push(Visible {
            index,
            geo,
            position,
            heading: flight.heading(),
        });
    }

    let is_selected = |v: &Visible| selected.is_some_and(|id| flights[v.index].unique_key == id);

    if visible.len() < config.cluster_threshold || zoom >= config.cluster_zoom_cutoff {
        plan.items = visible.iter().map(|v| v.marker(is_selected(v))).collect();
        tracing::debug!(
            visible = visible.len(),
            skipped = plan.skipped,
            zoom,
            "plan without clustering"
        );
        return Ok(plan);
    }

    let cell_size = config.grid_cell_size(zoom);
    let mut grid = ScreenGrid::with_capacity(cell_size, visible.len() / 4);
    // (bucket count when the selected flight was met, the flight)
    let mut exempt: Vec<(usize, Visible)> = Vec::new();
    for v in &visible {
        if is_selected(v) {
            exempt.push((grid.len(), *v));
        } else {
            grid.insert(v.position, *v);
        }
    }

    let buckets = grid.into_buckets();
    plan.items.reserve(buckets.len() + exempt.len());
    let mut exempt = exempt.into_iter().peekable();

    for (slot, bucket) in buckets.into_iter().enumerate() {
        while let Some((_, v)) = exempt.next_if(|(at, _)| *at <= slot) {
            plan.items.push(v.marker(true));
        }

        let mut members = bucket.members.into_iter();
        let Some(first) = members.next() else {
            continue;
        };
        let mut acc = GeoAccumulator::new(first.geo);
        for member in members {
            acc.push(member.geo);
        }

        if acc.count() == 1 {
            plan.items.push(first.marker(false));
            continue;
        }

        let centroid = acc.centroid();
        plan.items.push(PlanItem::Cluster(ClusterItem {
            position: map.project(centroid)?,
            centroid,
            count: acc.count(),
            bounds: acc.bounds(),
            radius: config.cluster_radius(acc.count()),
        }));
    }
    plan.items.extend(exempt.map(|(_, v)| v.marker(true)));

    tracing::debug!(
        visible = visible.len(),
        skipped = plan.skipped,
        items = plan.items.len(),
        clusters = plan.clusters().count(),
        cell_size,
        zoom,
        "plan with clustering"
    );
    Ok(plan)
}
