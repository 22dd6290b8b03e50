use std::f64::consts::PI;

use glam::DVec2;

use super::adapter::MapProjection;
use crate::error::MapError;
use crate::geo::{GeoPoint, GeoRect};

/// Web Mercator latitude limit (square world)
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;
/// Zoom levels per wheel/key step
pub const ZOOM_STEP: f64 = 0.5;

/// Longitude to normalized Web Mercator x in [0, 1]
#[inline(always)]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Latitude to normalized Web Mercator y in [0, 1] (0 = north edge)
#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline(always)]
fn inverse_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// Slippy-map viewport: center, fractional zoom and pixel size
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (Mercator-clamped)
    pub center_lat: f64,
    /// Zoom level; the world spans `tile_size * 2^zoom` pixels
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    /// Pixel size of one tile at zoom 0
    pub tile_size: f64,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize, tile_size: f64) -> Self {
        Self {
            center_lon,
            center_lat: center_lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
            tile_size,
        }
    }

    /// Zoom level at which the whole world fits the width
    pub fn world(width: usize, height: usize, tile_size: f64) -> Self {
        let zoom = (width.max(1) as f64 / tile_size).log2().max(MIN_ZOOM);
        Self::new(10.0, 25.0, zoom, width, height, tile_size)
    }

    /// World width in pixels at the current zoom
    #[inline(always)]
    pub fn world_px(&self) -> f64 {
        self.tile_size * self.zoom.exp2()
    }

    fn center_norm(&self) -> DVec2 {
        DVec2::new(mercator_x(self.center_lon), mercator_y(self.center_lat))
    }

    fn half_size(&self) -> DVec2 {
        DVec2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let world = self.world_px();
        let center = self.center_norm() + DVec2::new(dx, dy) / world;

        let lon = center.x * 360.0 - 180.0;
        // Wrap longitude
        self.center_lon = if lon > 180.0 {
            lon - 360.0
        } else if lon < -180.0 {
            lon + 360.0
        } else {
            lon
        };
        self.center_lat = inverse_mercator_y(center.y.clamp(0.0, 1.0)).clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom by `delta` levels keeping the geographic point under `px` fixed
    pub fn zoom_at(&mut self, px: DVec2, delta: f64) {
        let anchor = self.unproject(px);
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        let moved = self.project(anchor);
        self.pan(moved.x - px.x, moved.y - px.y);
    }

    /// Project a geographic coordinate to pixel coordinates
    pub fn project(&self, point: GeoPoint) -> DVec2 {
        let norm = DVec2::new(mercator_x(point.lon), mercator_y(point.lat));
        (norm - self.center_norm()) * self.world_px() + self.half_size()
    }

    /// Unproject pixel coordinates back to a geographic coordinate
    pub fn unproject(&self, px: DVec2) -> GeoPoint {
        let norm = (px - self.half_size()) / self.world_px() + self.center_norm();
        GeoPoint::new(inverse_mercator_y(norm.y), norm.x * 360.0 - 180.0)
    }

    /// Geographic rectangle covered by the canvas, clipped to the world
    pub fn bounds(&self) -> GeoRect {
        let top_left = self.unproject(DVec2::ZERO);
        let bottom_right = self.unproject(DVec2::new(self.width as f64, self.height as f64));
        GeoRect::new(
            bottom_right.lat.max(-90.0),
            top_left.lon.max(-180.0),
            top_left.lat.min(90.0),
            bottom_right.lon.min(180.0),
        )
    }

    /// Center and zoom so `rect` fits inside the canvas minus `padding` pixels per side
    pub fn fit_bounds(&mut self, rect: GeoRect, padding: f64) {
        let span = DVec2::new(
            mercator_x(rect.east) - mercator_x(rect.west),
            mercator_y(rect.south) - mercator_y(rect.north),
        ) * self.tile_size;
        let avail = DVec2::new(
            (self.width as f64 - 2.0 * padding).max(1.0),
            (self.height as f64 - 2.0 * padding).max(1.0),
        );

        let zoom_x = if span.x > 0.0 { (avail.x / span.x).log2() } else { MAX_ZOOM };
        let zoom_y = if span.y > 0.0 { (avail.y / span.y).log2() } else { MAX_ZOOM };
        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);

        let center_y = (mercator_y(rect.north) + mercator_y(rect.south)) / 2.0;
        self.center_lon = (rect.west + rect.east) / 2.0;
        self.center_lat = inverse_mercator_y(center_y).clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: DVec2, p2: DVec2) -> bool {
        let min = p1.min(p2);
        let max = p1.max(p2);
        max.x >= 0.0 && min.x < self.width as f64 && max.y >= 0.0 && min.y < self.height as f64
    }

    fn check_area(&self) -> Result<(), MapError> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl MapProjection for Viewport {
    fn project(&self, point: GeoPoint) -> Result<DVec2, MapError> {
        self.check_area()?;
        let px = Viewport::project(self, point);
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
        self.check_area()?;
        Ok(self.bounds())
    }

    fn zoom_level(&self) -> f64 {
        self.zoom
    }

    fn pixel_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}
