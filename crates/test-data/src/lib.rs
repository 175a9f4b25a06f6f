//! Test data generation for tracks.
//!
//! This crate generates realistic location histories for exercising track
//! segmentation and mode detection: multi-leg journeys with per-mode speeds,
//! GPS noise, terrain altitude and provider motion annotations, plus GPX fixtures.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let journey = JourneyBuilder::commute()
//!     .annotated(AnnotationStyle::Google)
//!     .with_seed(7)
//!     .build();
//! let run = processor.process(user_id, &journey.samples(), true);
//! ```

pub mod builders;
pub mod config;
pub mod gpx;
pub mod profiles;
pub mod sources;
pub mod terrain;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{Journey, JourneyBuilder, LegSummary, motion_payload};
    pub use crate::config::{AnnotationStyle, BoundingBox, Region, SamplingConfig};
    pub use crate::gpx::{build_gpx, generate_gpx};
    pub use crate::profiles::{ModeProfile, sample_variance, speed_at_grade};
    pub use crate::sources::{Cursor, GpxError, GpxLoader, ProceduralGenerator};
    pub use crate::terrain::ElevationGenerator;
    pub use tracks::{CanonicalMode, Sample};
}
