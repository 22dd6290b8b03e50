use tui_flights::flight::{Flight, FlightSet};

const AIRCRAFT_CODES: [&str; 7] = ["A320", "B738", "A359", "B77W", "B789", "A388", "E190"];
const AIRLINE_IATAS: [&str; 12] = ["IR", "W5", "EP", "QF", "EK", "LH", "DL", "BA", "AF", "SQ", "QR", "TK"];
const AIRLINE_ICAOS: [&str; 12] = [
    "IRA", "IRM", "MAW", "QFA", "UAE", "DLH", "DAL", "BAW", "AFR", "SIA", "QTR", "THY",
];

/// Flights turn around before leaving the projectable band
const LAT_LIMIT: f64 = 84.0;

/// Deterministic splitmix64 stream
#[derive(Clone, Debug)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut x = self.state;
        x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
        x ^ (x >> 31)
    }

    /// Uniform in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / 9007199254740992.0 // 2^53
    }

    /// Uniform integer in [0, n)
    pub fn below(&mut self, n: u32) -> u32 {
        (self.next_f64() * n as f64) as u32
    }

    fn letter(&mut self) -> char {
        char::from(b'A' + self.below(26) as u8)
    }
}

/// Random traffic standing in for a live feed.
///
/// Each [`FlightSimulator::step`] moves every flight along its track and
/// publishes a brand-new snapshot, like a wholesale refresh from a feed.
pub struct FlightSimulator {
    flights: Vec<Flight>,
    rng: SplitMix64,
}

impl FlightSimulator {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = SplitMix64::new(seed);
        let flights = (0..count).map(|i| random_flight(&mut rng, i)).collect();
        Self { flights, rng }
    }

    pub fn snapshot(&self) -> FlightSet {
        self.flights.clone().into()
    }

    /// Advance every flight by `dt_secs` of flying time, return the new snapshot
    pub fn step(&mut self, dt_secs: f64) -> FlightSet {
        for flight in &mut self.flights {
            advance(flight, dt_secs);
            // Small heading drift so traffic does not fly in straight lines forever
            if self.rng.below(50) == 0 {
                let drift = self.rng.next_f64() * 20.0 - 10.0;
                flight.track = Some((flight.heading() + drift).rem_euclid(360.0));
            }
        }
        self.snapshot()
    }
}

fn random_flight(rng: &mut SplitMix64, index: usize) -> Flight {
    // Uniform on the sphere
    let u = rng.next_f64();
    let v = rng.next_f64();
    let latitude = (2.0 * v - 1.0).acos().to_degrees() - 90.0;
    let longitude = 360.0 * u - 180.0;

    let airline = rng.below(AIRLINE_IATAS.len() as u32) as usize;
    let callsign = format!("{}{}", AIRLINE_ICAOS[airline], 100 + rng.below(900));
    let registration = format!("E{}-{}{}{}", rng.letter(), rng.letter(), rng.letter(), rng.letter());

    Flight {
        unique_key: format!("id_{index}"),
        icao_24bit: format!("{:06X}", rng.below(0xFF_FFFF)),
        latitude: latitude.clamp(-LAT_LIMIT, LAT_LIMIT),
        longitude,
        track: Some(rng.below(360) as f64),
        altitude: rng.below(450) as i32 * 100,
        ground_speed: rng.below(400) as i32 + 150,
        vertical_speed: rng.below(4000) as i32 - 2000,
        squawk: format!("{:04}", rng.below(8000)),
        aircraft_code: AIRCRAFT_CODES[rng.below(AIRCRAFT_CODES.len() as u32) as usize].to_string(),
        registration,
        origin_airport_iata: "N/A".to_string(),
        destination_airport_iata: "N/A".to_string(),
        airline_iata: AIRLINE_IATAS[airline].to_string(),
        airline_icao: AIRLINE_ICAOS[airline].to_string(),
        callsign,
        on_ground: false,
    }
}

/// Dead-reckon along the track; one knot is one arc-minute of latitude per hour
fn advance(flight: &mut Flight, dt_secs: f64) {
    let heading = flight.heading().to_radians();
    let arc_deg = flight.ground_speed as f64 * dt_secs / 3600.0 / 60.0;
    let cos_lat = flight.latitude.to_radians().cos().max(0.05);

    let lat = flight.latitude + arc_deg * heading.cos();
    let lon = flight.longitude + arc_deg * heading.sin() / cos_lat;

    if lat.abs() > LAT_LIMIT {
        flight.track = Some((flight.heading() + 180.0).rem_euclid(360.0));
    } else {
        flight.latitude = lat;
    }
    flight.longitude = (lon + 180.0).rem_euclid(360.0) - 180.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = FlightSimulator::new(50, 7).snapshot();
        let b = FlightSimulator::new(50, 7).snapshot();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert_eq!(a[3].unique_key, "id_3");
        assert!(a.iter().all(|f| f.position().is_valid()));
        assert!(a.iter().all(|f| f.callsign.len() == 6));
    }

    #[test]
    fn test_step_publishes_new_snapshot() {
        let mut sim = FlightSimulator::new(10, 1);
        let before = sim.snapshot();
        let after = sim.step(60.0);
        assert_eq!(after.len(), before.len());
        assert!(before.iter().zip(after.iter()).any(|(a, b)| a.latitude != b.latitude || a.longitude != b.longitude));
        // Published snapshots are never mutated
        assert_eq!(before, FlightSimulator::new(10, 1).snapshot());
    }

    #[test]
    fn test_advance_east_and_wrap() {
        let mut flight = Flight {
            unique_key: "a".into(),
            latitude: 0.0,
            longitude: 179.9,
            track: Some(90.0),
            ground_speed: 600,
            ..Default::default()
        };
        // 600 kt for one hour = 10 degrees at the equator
        advance(&mut flight, 3600.0);
        assert!(flight.latitude.abs() < 1e-9);
        assert!((flight.longitude - (-170.1)).abs() < 1e-6);
    }

    #[test]
    fn test_turns_back_near_pole() {
        let mut flight = Flight {
            unique_key: "a".into(),
            latitude: 83.9,
            longitude: 0.0,
            track: Some(0.0),
            ground_speed: 600,
            ..Default::default()
        };
        advance(&mut flight, 3600.0);
        assert_eq!(flight.latitude, 83.9);
        assert_eq!(flight.track, Some(180.0));
    }
}
