pub mod polygon_2d;
pub mod spline;

pub use spline::{Spline, SplineKind};

/// 2D point type in image coordinates (x right, y down).
pub type Point2 = nalgebra::Point2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
