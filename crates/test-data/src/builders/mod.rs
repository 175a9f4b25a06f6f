//! Fluent builder APIs for test journeys.
//!
//! The [`JourneyBuilder`] strings mode legs together into one location history,
//! optionally annotated the way a given provider would annotate it.

mod annotations;
mod journey;

pub use annotations::motion_payload;
pub use journey::{Journey, JourneyBuilder, LegSummary};
