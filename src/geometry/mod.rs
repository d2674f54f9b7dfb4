pub mod curve;
pub mod occlusion;
pub mod point;

pub use curve::{CurveDomain, FittedCurve, MIN_FIT_POINTS};
pub use occlusion::OcclusionInterval;
pub use point::Point3;
