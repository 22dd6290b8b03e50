//! Real-time flight overlay for slippy maps.
//!
//! The [`overlay`] module turns a snapshot of flights into a rendering plan
//! (individual airplane markers or count clusters), paints it onto a
//! [`surface::Surface`] and resolves clicks back to flights or clusters.
//! The host map is reached only through [`map::MapProjection`].

pub mod error;
pub mod flight;
pub mod geo;
pub mod map;
pub mod overlay;
pub mod surface;
