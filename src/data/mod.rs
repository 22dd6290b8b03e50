mod sim;

pub use sim::FlightSimulator;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use tui_flights::flight::{parse_flight_set, FlightSet};

use crate::basemap::{BaseMap, LineString, Lod};

/// Load whichever Natural Earth coastline files exist under `data_dir`.
/// Returns the number of files loaded.
pub fn load_coastlines(map: &mut BaseMap, data_dir: &Path) -> usize {
    let files = [
        ("ne_110m_coastline.json", Lod::Low),
        ("ne_50m_coastline.json", Lod::Medium),
        ("ne_10m_coastline.json", Lod::High),
    ];

    let mut loaded = 0;
    for (filename, lod) in files {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match load_geojson_lines(&path) {
            Ok(lines) => {
                tracing::info!(file = filename, lines = lines.len(), "coastlines loaded");
                for line in lines {
                    map.add_coastline(line, lod);
                }
                loaded += 1;
            }
            Err(err) => tracing::warn!(file = filename, error = %err, "failed to load coastlines"),
        }
    }
    loaded
}

/// Read a JSON array of flight records, e.g. a saved feed response
pub fn load_flight_snapshot(path: &Path) -> Result<FlightSet> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let flights = parse_flight_set(&mut bytes).with_context(|| format!("parsing {}", path.display()))?;
    Ok(flights)
}

fn load_geojson_lines(path: &Path) -> Result<Vec<LineString>> {
    let geojson: GeoJson = fs::read_to_string(path)?.parse()?;
    Ok(lines_from_geojson(&geojson))
}

/// Every line and polygon exterior ring in the document
fn lines_from_geojson(geojson: &GeoJson) -> Vec<LineString> {
    let geometries: Vec<&Geometry> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.iter().filter_map(|f| f.geometry.as_ref()).collect(),
        GeoJson::Feature(f) => f.geometry.iter().collect(),
        GeoJson::Geometry(g) => vec![g],
    };

    let mut lines = Vec::new();
    for geometry in geometries {
        collect_lines(&geometry.value, &mut lines);
    }
    lines
}

fn collect_lines(value: &Value, out: &mut Vec<LineString>) {
    match value {
        Value::LineString(coords) => out.push(to_line(coords)),
        Value::MultiLineString(parts) => out.extend(parts.iter().map(|coords| to_line(coords))),
        // Holes are lakes, not coastline
        Value::Polygon(rings) => out.extend(rings.first().map(|ring| to_line(ring))),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| rings.first()).map(|ring| to_line(ring)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_lines(&g.value, out);
            }
        }
        _ => {}
    }
}

/// Positions as (lon, lat); a position without both coordinates is skipped
fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords
        .iter()
        .filter_map(|c| match c.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        })
        .collect()
}
