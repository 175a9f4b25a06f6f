//! Sources of sample geometry.
//!
//! - [`ProceduralGenerator`]: synthesize samples leg by leg from mode profiles
//! - [`GpxLoader`]: load or write GPX tracks

mod gpx_files;
mod procedural;

pub use gpx_files::{GpxError, GpxLoader};
pub use procedural::{Cursor, ProceduralGenerator};
