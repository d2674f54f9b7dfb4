use tracing::{debug, info};

use crate::annotation::{AnnotationSet, LaneLine};
use crate::error::Result;
use crate::taxonomy::Multiplicity;

use super::classes::{BoundaryClasses, LaneClasses};
use super::config::{MaskLayout, RasterConfig};
use super::descriptor::{BoundaryTypeRecord, LaneTypeRecord, TypeDescriptor};
use super::mask::LabelMask;
use super::ordering::{assign_lane_ids, is_rasterizable, select_boundaries};
use super::paint::{
    fill_marking, paint_boundary, paint_lane_id, paint_lane_typed, paint_road_marking_line,
    paint_vanishing_point, sweep,
};

/// A rendered label mask and the descriptor of the lines painted into it.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub mask: LabelMask,
    pub descriptor: TypeDescriptor,
}

/// Rasterizes an annotation set into a label mask.
pub struct RenderMask<'a> {
    set: &'a AnnotationSet,
    config: RasterConfig,
    size: Option<(u32, u32)>,
}

impl<'a> RenderMask<'a> {
    /// Creates a render of `set` at its own image size with default settings.
    #[must_use]
    pub fn new(set: &'a AnnotationSet) -> Self {
        Self {
            set,
            config: RasterConfig::default(),
            size: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RasterConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the mask size, e.g. with the size of the source image.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Paints markings, the vanishing point, lanes and (in the lane-boundary
    /// layout) boundaries, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::RasterError::InvalidDimensions`] if the mask
    /// size is zero.
    pub fn execute(&self) -> Result<RenderOutput> {
        let set = self.set;
        let (width, height) = self
            .size
            .unwrap_or((set.image_width(), set.image_height()));
        let mut mask = LabelMask::new(width, height)?;
        let mut descriptor = TypeDescriptor::new(width, height);

        for marker in set.markers() {
            fill_marking(&mut mask, marker);
        }
        paint_vanishing_point(&mut mask, set.vanishing_point_ratios(), set.is_portrait());

        let mut lanes: Vec<&LaneLine> = set.lanes().iter().collect();
        lanes.sort_by(|a, b| a.length().total_cmp(&b.length()));

        if self.config.accessory_as_marker {
            let (accessories, rest): (Vec<&LaneLine>, Vec<&LaneLine>) = lanes
                .into_iter()
                .partition(|lane| lane.info().multiplicity == Multiplicity::Accessory);
            for lane in accessories {
                let Some(curve) = lane.curve() else { continue };
                if !is_rasterizable(lane.info()) {
                    continue;
                }
                let spans = sweep(curve, lane.occlusions(), width, height, false, None);
                paint_road_marking_line(&mut mask, &spans);
            }
            lanes = rest;
        }

        for labeled in assign_lane_ids(lanes) {
            let lane = labeled.lane;
            let Some(curve) = lane.curve() else { continue };
            let classes = LaneClasses::of(lane.info());
            let spans = sweep(
                curve,
                lane.occlusions(),
                width,
                height,
                classes.extends_to_bottom(),
                None,
            );
            match self.config.layout {
                MaskLayout::Typed => paint_lane_typed(&mut mask, &spans, labeled.id, &classes),
                MaskLayout::LaneBoundary => paint_lane_id(&mut mask, &spans, labeled.id),
            }
            debug!(id = labeled.id, info = %lane.info(), rows = spans.len(), "lane painted");
            descriptor.lanes.push(LaneTypeRecord {
                id: labeled.id,
                classes,
            });
        }

        if self.config.layout == MaskLayout::LaneBoundary {
            let max_level = self.config.boundary_max_level;
            let half_width = self.config.boundary_half_width(width);
            for labeled in select_boundaries(set.boundaries(), max_level) {
                let boundary = labeled.boundary;
                let Some(curve) = boundary.curve() else { continue };
                let spans = sweep(
                    curve,
                    boundary.occlusions(),
                    width,
                    height,
                    false,
                    Some(half_width),
                );
                paint_boundary(&mut mask, &spans, labeled.id);
                debug!(id = labeled.id, info = %boundary.info(), "boundary painted");
                descriptor.boundaries.push(BoundaryTypeRecord {
                    id: labeled.id,
                    classes: BoundaryClasses::of(boundary.info(), max_level),
                });
            }
        }

        descriptor.sort_by_id();
        info!(
            width,
            height,
            lanes = descriptor.lanes.len(),
            boundaries = descriptor.boundaries.len(),
            markers = set.markers().len(),
            "mask rendered"
        );
        Ok(RenderOutput { mask, descriptor })
    }
}
