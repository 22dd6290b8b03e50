/// A geographic position in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates are finite and inside the valid degree ranges
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Axis-aligned geographic rectangle (south/west/north/east edges, inclusive)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoRect {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoRect {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// The whole Web Mercator world
    pub fn world() -> Self {
        Self::new(-90.0, -180.0, 90.0, 180.0)
    }

    /// Degenerate rectangle holding a single point
    pub fn from_point(p: GeoPoint) -> Self {
        Self::new(p.lat, p.lon, p.lat, p.lon)
    }

    #[inline(always)]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lon >= self.west && p.lon <= self.east
    }

    /// Grow the rectangle to cover `p`
    pub fn extend(&mut self, p: GeoPoint) {
        self.south = self.south.min(p.lat);
        self.north = self.north.max(p.lat);
        self.west = self.west.min(p.lon);
        self.east = self.east.max(p.lon);
    }

}

/// Running mean of lat/lon plus bounding box, fed one member at a time
#[derive(Clone, Debug)]
pub struct GeoAccumulator {
    sum_lat: f64,
    sum_lon: f64,
    count: usize,
    bounds: GeoRect,
}

impl GeoAccumulator {
    pub fn new(first: GeoPoint) -> Self {
        Self {
            sum_lat: first.lat,
            sum_lon: first.lon,
            count: 1,
            bounds: GeoRect::from_point(first),
        }
    }

    pub fn push(&mut self, p: GeoPoint) {
        self.sum_lat += p.lat;
        self.sum_lon += p.lon;
        self.count += 1;
        self.bounds.extend(p);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean of member coordinates (no antimeridian unwrapping)
    pub fn centroid(&self) -> GeoPoint {
        let n = self.count as f64;
        GeoPoint::new(self.sum_lat / n, self.sum_lon / n)
    }

    pub fn bounds(&self) -> GeoRect {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_edges_inclusive() {
        let rect = GeoRect::new(-10.0, -20.0, 10.0, 20.0);
        assert!(rect.contains(GeoPoint::new(10.0, 20.0)));
        assert!(rect.contains(GeoPoint::new(-10.0, -20.0)));
        assert!(!rect.contains(GeoPoint::new(10.01, 0.0)));
        assert!(!rect.contains(GeoPoint::new(0.0, -20.5)));
    }

    #[test]
    fn test_invalid_points() {
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn test_accumulator_centroid_and_bounds() {
        let mut acc = GeoAccumulator::new(GeoPoint::new(10.0, 10.0));
        acc.push(GeoPoint::new(20.0, 20.0));
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.centroid(), GeoPoint::new(15.0, 15.0));
        assert_eq!(acc.bounds(), GeoRect::new(10.0, 10.0, 20.0, 20.0));
    }
}
