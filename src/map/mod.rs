mod adapter;
mod projection;

pub use adapter::{LinearMap, MapProjection};
pub use projection::{Viewport, MAX_MERCATOR_LAT, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
