//! Terrain generation utilities.
//!
//! Altitude for generated samples comes from Perlin noise so that tracks get
//! plausible elevation gain and loss.

mod elevation;

pub use elevation::{ElevationGenerator, add_elevation_jitter};
