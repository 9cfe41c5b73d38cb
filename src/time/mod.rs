//! Time bucketing: granularities, intervals, and interval slicing.

pub mod granularity;
pub mod interval;
pub mod slicer;

pub use granularity::Granularity;
pub use interval::Interval;
pub use slicer::{simplify, GrainSlicer, IntervalSlicer};
