pub mod annotation;
pub mod error;
pub mod geometry;
pub mod math;
pub mod persistence;
pub mod raster;
pub mod taxonomy;

pub use error::{Result, RoadLaneError};
