use glam::DVec2;

use crate::error::MapError;
use crate::geo::{GeoPoint, GeoRect};

/// What the overlay needs from whatever map engine hosts it.
///
/// The engine owns pan/zoom state; the overlay only queries it once per
/// redraw and treats the answers as a frozen snapshot for that frame.
pub trait MapProjection {
    /// Geographic position to viewport pixel coordinates
    fn project(&self, point: GeoPoint) -> Result<DVec2, MapError>;

    /// Currently visible geographic rectangle
    fn visible_bounds(&self) -> Result<GeoRect, MapError>;

    /// Slippy-map zoom level (0 = whole world in one tile)
    fn zoom_level(&self) -> f64;

    /// Viewport size in pixels (width, height)
    fn pixel_size(&self) -> (usize, usize);
}

impl<T: MapProjection + ?Sized> MapProjection for &T {
    fn project(&self, point: GeoPoint) -> Result<DVec2, MapError> {
        (**self).project(point)
    }

    fn visible_bounds(&self) -> Result<GeoRect, MapError> {
        (**self).visible_bounds()
    }

    fn zoom_level(&self) -> f64 {
        (**self).zoom_level()
    }

    fn pixel_size(&self) -> (usize, usize) {
        (**self).pixel_size()
    }
}

/// Plate carrée stand-in for a real engine: lon/lat map linearly onto the
/// pixel rectangle. Used by tests and benches where exact pixel positions
/// matter more than cartographic fidelity.
#[derive(Clone, Debug)]
pub struct LinearMap {
    pub bounds: GeoRect,
    pub zoom: f64,
    pub width: usize,
    pub height: usize,
}

impl LinearMap {
    pub fn new(bounds: GeoRect, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            bounds,
            zoom,
            width,
            height,
        }
    }
}

impl MapProjection for LinearMap {
    fn project(&self, point: GeoPoint) -> Result<DVec2, MapError> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        let span_lon = self.bounds.east - self.bounds.west;
        let span_lat = self.bounds.north - self.bounds.south;
        let x = (point.lon - self.bounds.west) / span_lon * self.width as f64;
        let y = (self.bounds.north - point.lat) / span_lat * self.height as f64;
        let px = DVec2::new(x, y);
        if px.is_finite() {
            Ok(px)
        } else {
            Err(MapError::Projection {
                lat: point.lat,
                lon: point.lon,
            })
        }
    }

    fn visible_bounds(&self) -> Result<GeoRect, MapError> {
        Ok(self.bounds)
    }

    fn zoom_level(&self) -> f64 {
        self.zoom
    }

    fn pixel_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}
