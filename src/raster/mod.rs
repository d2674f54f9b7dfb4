//! Rasterization of an annotation set into a channel-coded label mask.

pub mod classes;
pub mod config;
pub mod descriptor;
pub mod mask;
pub mod ordering;
mod paint;
pub mod render;

pub use classes::{BoundaryClasses, LaneClasses};
pub use config::{MaskLayout, RasterConfig};
pub use descriptor::{BoundaryTypeRecord, LaneTypeRecord, TypeDescriptor, DESCRIPTOR_ROOT};
pub use mask::LabelMask;
pub use ordering::{assign_lane_ids, compare_lane_type, select_boundaries, LabeledBoundary, LabeledLane};
pub use render::{RenderMask, RenderOutput};
