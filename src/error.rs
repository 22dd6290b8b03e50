use thiserror::Error;

/// Failures reported by the map engine's viewport queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("viewport has no pixel area ({width}x{height})")]
    EmptyViewport { width: usize, height: usize },

    #[error("projection of ({lat}, {lon}) is not finite")]
    Projection { lat: f64, lon: f64 },
}

/// Errors surfaced by the flight overlay
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("map query failed: {0}")]
    Map(#[from] MapError),

    #[error("no drawing surface attached")]
    Detached,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] simd_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
