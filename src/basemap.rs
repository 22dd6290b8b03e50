use glam::DVec2;
use ratatui::style::Color;
use tui_flights::geo::GeoPoint;
use tui_flights::map::Viewport;
use tui_flights::surface::geometry::draw_line;
use tui_flights::surface::Surface;

const COASTLINE_COLOR: Color = Color::Cyan;
const GRATICULE_COLOR: Color = Color::DarkGray;

/// Degrees between graticule lines
const GRATICULE_STEP: i32 = 30;
/// Degrees between vertices along a graticule line
const GRATICULE_SEGMENT: i32 = 10;

/// A geographic line as (lon, lat) pairs
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for coastline data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 3.0 {
            Lod::Low
        } else if zoom < 6.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// Coastline base map drawn underneath the flight overlay, over a
/// lat/lon graticule that is always present
pub struct BaseMap {
    graticule: Vec<LineString>,
    low: Vec<LineString>,
    medium: Vec<LineString>,
    high: Vec<LineString>,
}

impl BaseMap {
    pub fn new() -> Self {
        Self {
            graticule: graticule(GRATICULE_STEP, GRATICULE_SEGMENT),
            low: Vec::new(),
            medium: Vec::new(),
            high: Vec::new(),
        }
    }

    /// Coastlines for the LOD, or the nearest resolution that is loaded
    fn coastlines(&self, lod: Lod) -> &[LineString] {
        let preferred = match lod {
            Lod::High => [&self.high, &self.medium, &self.low],
            Lod::Medium => [&self.medium, &self.low, &self.high],
            Lod::Low => [&self.low, &self.medium, &self.high],
        };
        preferred
            .into_iter()
            .find(|lines| !lines.is_empty())
            .map(|lines| lines.as_slice())
            .unwrap_or(&[])
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, viewport: &Viewport) {
        for line in &self.graticule {
            draw_linestring(surface, line, viewport, GRATICULE_COLOR);
        }
        for line in self.coastlines(Lod::from_zoom(viewport.zoom)) {
            draw_linestring(surface, line, viewport, COASTLINE_COLOR);
        }
    }

    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.low.push(line),
            Lod::Medium => self.medium.push(line),
            Lod::High => self.high.push(line),
        }
    }

    /// Whether any coastline file was loaded
    pub fn has_data(&self) -> bool {
        !self.low.is_empty() || !self.medium.is_empty() || !self.high.is_empty()
    }
}

/// Meridians every `step` degrees up to the Mercator-friendly 80th parallels,
/// and parallels every `step` degrees, each with a vertex every `segment`
fn graticule(step: i32, segment: i32) -> Vec<LineString> {
    let meridians = (-180..180).step_by(step as usize).map(|lon| {
        (-80..=80)
            .step_by(segment as usize)
            .map(|lat| (lon as f64, lat as f64))
            .collect()
    });
    let parallels = (-60..=60).step_by(step as usize).map(|lat| {
        (-180..=180)
            .step_by(segment as usize)
            .map(|lon| (lon as f64, lat as f64))
            .collect()
    });
    meridians.chain(parallels).collect()
}

/// Draw a linestring with viewport culling
fn draw_linestring<S: Surface + ?Sized>(surface: &mut S, line: &LineString, viewport: &Viewport, color: Color) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<DVec2> = None;
    for &(lon, lat) in line {
        let p = viewport.project(GeoPoint::new(lat, lon));

        if let Some(q) = prev {
            // Segments spanning most of the canvas are antimeridian wraps
            let jump = (p - q).abs();
            if jump.x + jump.y < viewport.width as f64 && viewport.line_might_be_visible(q, p) {
                draw_line(
                    surface,
                    q.x.round() as i32,
                    q.y.round() as i32,
                    p.x.round() as i32,
                    p.y.round() as i32,
                    color,
                );
            }
        }
        prev = Some(p);
    }
}
