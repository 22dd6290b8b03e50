use glam::DVec2;

use crate::flight::{Flight, FlightSet};
use crate::geo::{GeoPoint, GeoRect};

/// One flight drawn on its own
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerItem {
    pub position: DVec2,
    /// Index into the plan's flight snapshot
    pub flight_index: usize,
    pub heading: f64,
    pub is_selected: bool,
}

/// Two or more flights merged into a counted badge
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterItem {
    /// Projection of `centroid`, not the mean of member pixels
    pub position: DVec2,
    pub centroid: GeoPoint,
    pub count: usize,
    pub bounds: GeoRect,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlanItem {
    Marker(MarkerItem),
    Cluster(ClusterItem),
}

impl PlanItem {
    pub fn position(&self) -> DVec2 {
        match self {
            PlanItem::Marker(m) => m.position,
            PlanItem::Cluster(c) => c.position,
        }
    }

    /// Number of flights this item stands for
    pub fn weight(&self) -> usize {
        match self {
            PlanItem::Marker(_) => 1,
            PlanItem::Cluster(c) => c.count,
        }
    }
}

/// Everything one redraw needs, computed from scratch and dropped after the
/// frame it describes
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub items: Vec<PlanItem>,
    pub flights: FlightSet,
    pub zoom: f64,
    /// Surface size the plan was projected for
    pub pixel_size: (usize, usize),
    /// Records dropped for missing or non-finite positions
    pub skipped: usize,
}

impl RenderPlan {
    pub fn empty(flights: FlightSet, zoom: f64, pixel_size: (usize, usize)) -> Self {
        Self {
            items: Vec::new(),
            flights,
            zoom,
            pixel_size,
            skipped: 0,
        }
    }

    pub fn markers(&self) -> impl DoubleEndedIterator<Item = &MarkerItem> + '_ {
        self.items.iter().filter_map(|item| match item {
            PlanItem::Marker(m) => Some(m),
            PlanItem::Cluster(_) => None,
        })
    }

    pub fn clusters(&self) -> impl Iterator<Item = &ClusterItem> + '_ {
        self.items.iter().filter_map(|item| match item {
            PlanItem::Cluster(c) => Some(c),
            PlanItem::Marker(_) => None,
        })
    }

    pub fn flight(&self, marker: &MarkerItem) -> Option<&Flight> {
        self.flights.get(marker.flight_index)
    }

    /// Total flights represented (markers plus cluster members)
    pub fn represented(&self) -> usize {
        self.items.iter().map(PlanItem::weight).sum()
    }

    /// Markers in draw order: unselected in plan order, then the selected one
    pub fn draw_order(&self) -> impl Iterator<Item = &MarkerItem> + '_ {
        self.markers()
            .filter(|m| !m.is_selected)
            .chain(self.markers().filter(|m| m.is_selected))
    }
}
