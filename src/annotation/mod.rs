pub mod line;
pub mod polygon;
pub mod set;

pub use line::{BoundaryLine, LaneLine, TracedLine};
pub use polygon::RoadMarkingPolygon;
pub use set::AnnotationSet;
