use std::sync::Arc;

use serde::Deserialize;

use crate::geo::GeoPoint;

/// Stable identity of a flight across refreshes
pub type FlightId = String;

/// One wholesale refresh of the flight list. Shared, never mutated.
pub type FlightSet = Arc<[Flight]>;

fn missing_coordinate() -> f64 {
    f64::NAN
}

/// A tracked aircraft as supplied by the data feed.
///
/// Only `unique_key`, the position and `track` matter to the overlay; the
/// remaining fields ride along for the host's info panel.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Flight {
    pub unique_key: FlightId,
    #[serde(default = "missing_coordinate")]
    pub latitude: f64,
    #[serde(default = "missing_coordinate")]
    pub longitude: f64,
    /// Track over ground in degrees clockwise from north; `None` when unknown
    pub track: Option<f64>,
    pub callsign: String,
    pub registration: String,
    pub icao_24bit: String,
    pub aircraft_code: String,
    pub airline_iata: String,
    pub airline_icao: String,
    pub origin_airport_iata: String,
    pub destination_airport_iata: String,
    pub squawk: String,
    /// Feet
    pub altitude: i32,
    /// Knots
    pub ground_speed: i32,
    /// Feet per minute
    pub vertical_speed: i32,
    pub on_ground: bool,
}

impl Flight {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Heading used for the glyph; unknown or non-finite tracks point north
    pub fn heading(&self) -> f64 {
        match self.track {
            Some(track) if track.is_finite() => track,
            _ => 0.0,
        }
    }
}

/// Parse a JSON array of flight records into a shared snapshot
pub fn parse_flight_set(bytes: &mut [u8]) -> Result<FlightSet, simd_json::Error> {
    let flights: Vec<Flight> = simd_json::serde::from_slice(bytes)?;
    Ok(flights.into())
}
