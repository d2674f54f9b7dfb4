use super::line::{BoundaryLine, LaneLine};
use super::polygon::RoadMarkingPolygon;

/// Tool version written into new annotation files.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default vanishing-point ratio on both axes.
pub const DEFAULT_VP_RATIO: f64 = 0.5;

/// Height/width ratio above which an image counts as portrait.
pub const PORTRAIT_ASPECT: f64 = 0.7;

/// All annotations of one image.
///
/// Entities are addressed by index. Add, replace and remove with an
/// out-of-range index are silent no-ops, matching interactive editing where
/// a stale selection must never fault.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSet {
    image_width: u32,
    image_height: u32,
    vp_x_ratio: f64,
    vp_y_ratio: f64,
    has_vp: bool,
    tool_version: String,
    lanes: Vec<LaneLine>,
    boundaries: Vec<BoundaryLine>,
    markers: Vec<RoadMarkingPolygon>,
}

impl Default for AnnotationSet {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl AnnotationSet {
    /// Creates an empty set for an image of the given size.
    #[must_use]
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            vp_x_ratio: DEFAULT_VP_RATIO,
            vp_y_ratio: DEFAULT_VP_RATIO,
            has_vp: false,
            tool_version: TOOL_VERSION.to_owned(),
            lanes: Vec::new(),
            boundaries: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Drops every entity and the vanishing point, and sets a new image size.
    /// The horizontal VP ratio and the tool version are kept.
    pub fn reset(&mut self, image_width: u32, image_height: u32) {
        let tool_version = std::mem::take(&mut self.tool_version);
        let vp_x_ratio = self.vp_x_ratio;
        *self = Self::new(image_width, image_height);
        self.vp_x_ratio = vp_x_ratio;
        self.tool_version = tool_version;
    }

    #[must_use]
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    #[must_use]
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_width = width;
        self.image_height = height;
    }

    /// Returns whether the image is taller than [`PORTRAIT_ASPECT`] times its width.
    #[must_use]
    pub fn is_portrait(&self) -> bool {
        if self.image_width == 0 {
            return false;
        }
        f64::from(self.image_height) / f64::from(self.image_width) > PORTRAIT_ASPECT
    }

    #[must_use]
    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    pub fn set_tool_version(&mut self, version: impl Into<String>) {
        self.tool_version = version.into();
    }

    // --- Vanishing point ---

    #[must_use]
    pub fn has_vp(&self) -> bool {
        self.has_vp
    }

    pub fn set_has_vp(&mut self, has_vp: bool) {
        self.has_vp = has_vp;
    }

    #[must_use]
    pub fn vp_x_ratio(&self) -> f64 {
        self.vp_x_ratio
    }

    #[must_use]
    pub fn vp_y_ratio(&self) -> f64 {
        self.vp_y_ratio
    }

    pub fn set_vp_x_ratio(&mut self, ratio: f64) {
        self.vp_x_ratio = ratio;
    }

    /// Sets the vertical ratio and marks the vanishing point as present.
    pub fn set_vp_y_ratio(&mut self, ratio: f64) {
        self.vp_y_ratio = ratio;
        self.has_vp = true;
    }

    /// Vanishing point as `(x_ratio, y_ratio)`, when present.
    #[must_use]
    pub fn vanishing_point_ratios(&self) -> Option<(f64, f64)> {
        self.has_vp.then_some((self.vp_x_ratio, self.vp_y_ratio))
    }

    /// Vanishing point in pixels, when present.
    #[must_use]
    pub fn vanishing_point(&self) -> Option<(f64, f64)> {
        self.has_vp.then(|| {
            (
                self.vp_x_ratio * f64::from(self.image_width),
                self.vp_y_ratio * f64::from(self.image_height),
            )
        })
    }

    // --- Lanes ---

    #[must_use]
    pub fn lanes(&self) -> &[LaneLine] {
        &self.lanes
    }

    #[must_use]
    pub fn lane(&self, index: usize) -> Option<&LaneLine> {
        self.lanes.get(index)
    }

    pub fn lane_mut(&mut self, index: usize) -> Option<&mut LaneLine> {
        self.lanes.get_mut(index)
    }

    /// Appends a lane and returns its index.
    pub fn add_lane(&mut self, lane: LaneLine) -> usize {
        self.lanes.push(lane);
        self.lanes.len() - 1
    }

    pub fn replace_lane(&mut self, index: usize, lane: LaneLine) {
        replace_at(&mut self.lanes, index, lane);
    }

    pub fn remove_lane(&mut self, index: usize) {
        remove_at(&mut self.lanes, index);
    }

    /// Stable ascending sort of the lanes by fitted vertical length.
    pub fn sort_lanes_by_length(&mut self) {
        self.lanes.sort_by(|a, b| a.length().total_cmp(&b.length()));
    }

    // --- Boundaries ---

    #[must_use]
    pub fn boundaries(&self) -> &[BoundaryLine] {
        &self.boundaries
    }

    #[must_use]
    pub fn boundary(&self, index: usize) -> Option<&BoundaryLine> {
        self.boundaries.get(index)
    }

    pub fn boundary_mut(&mut self, index: usize) -> Option<&mut BoundaryLine> {
        self.boundaries.get_mut(index)
    }

    /// Appends a boundary and returns its index.
    pub fn add_boundary(&mut self, boundary: BoundaryLine) -> usize {
        self.boundaries.push(boundary);
        self.boundaries.len() - 1
    }

    pub fn replace_boundary(&mut self, index: usize, boundary: BoundaryLine) {
        replace_at(&mut self.boundaries, index, boundary);
    }

    pub fn remove_boundary(&mut self, index: usize) {
        remove_at(&mut self.boundaries, index);
    }

    // --- Road markings ---

    #[must_use]
    pub fn markers(&self) -> &[RoadMarkingPolygon] {
        &self.markers
    }

    #[must_use]
    pub fn marker(&self, index: usize) -> Option<&RoadMarkingPolygon> {
        self.markers.get(index)
    }

    pub fn marker_mut(&mut self, index: usize) -> Option<&mut RoadMarkingPolygon> {
        self.markers.get_mut(index)
    }

    /// Appends a road marking and returns its index.
    pub fn add_marker(&mut self, marker: RoadMarkingPolygon) -> usize {
        self.markers.push(marker);
        self.markers.len() - 1
    }

    pub fn replace_marker(&mut self, index: usize, marker: RoadMarkingPolygon) {
        replace_at(&mut self.markers, index, marker);
    }

    pub fn remove_marker(&mut self, index: usize) {
        remove_at(&mut self.markers, index);
    }
}

fn replace_at<T>(items: &mut [T], index: usize, item: T) {
    if let Some(slot) = items.get_mut(index) {
        *slot = item;
    }
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) {
    if index < items.len() {
        items.remove(index);
    }
}
