use tracing::debug;

use crate::error::Result;
use crate::geometry::occlusion::is_occluded;
use crate::geometry::{FittedCurve, OcclusionInterval, Point3};
use crate::taxonomy::{BoundaryInfo, BoundarySide, LaneInfo, UNKNOWN_BOUNDARY_SLOT};

/// Half-width reported for an empty, unfitted line.
pub const DEFAULT_LINE_RADIUS: f64 = 10.0;

/// Half-width given to boundary points placed without an explicit width.
pub const DEFAULT_BOUNDARY_RADIUS: f64 = 5.0;

/// A hand-traced line over the image: points, fitted curve, classification
/// and occlusion intervals.
///
/// Points keep their insertion order. Every point mutation refits the curve
/// immediately; when fewer than three distinct `y` values remain the line is
/// left unfitted.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedLine<I> {
    points: Vec<Point3>,
    curve: Option<FittedCurve>,
    info: I,
    occlusions: Vec<OcclusionInterval>,
}

/// A traced lane line.
pub type LaneLine = TracedLine<LaneInfo>;

/// A traced road boundary.
pub type BoundaryLine = TracedLine<BoundaryInfo>;

impl<I: Default> Default for TracedLine<I> {
    fn default() -> Self {
        Self::new(I::default())
    }
}

impl<I> TracedLine<I> {
    /// Creates an empty, unfitted line.
    #[must_use]
    pub fn new(info: I) -> Self {
        Self {
            points: Vec::new(),
            curve: None,
            info,
            occlusions: Vec::new(),
        }
    }

    /// Creates a line from points and fits it.
    #[must_use]
    pub fn from_points(points: Vec<Point3>, info: I) -> Self {
        let mut line = Self {
            points,
            curve: None,
            info,
            occlusions: Vec::new(),
        };
        line.refit_quietly();
        line
    }

    /// Replaces the occlusion list.
    #[must_use]
    pub fn with_occlusions(mut self, occlusions: Vec<OcclusionInterval>) -> Self {
        self.occlusions = occlusions;
        self
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn point(&self, index: usize) -> Option<&Point3> {
        self.points.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn info(&self) -> &I {
        &self.info
    }

    pub fn set_info(&mut self, info: I) {
        self.info = info;
    }

    #[must_use]
    pub fn curve(&self) -> Option<&FittedCurve> {
        self.curve.as_ref()
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.curve.is_some()
    }

    /// Top of the fitted domain, `0` when unfitted.
    #[must_use]
    pub fn top_y(&self) -> f64 {
        self.curve.as_ref().map_or(0.0, FittedCurve::top_y)
    }

    /// Bottom of the fitted domain, `0` when unfitted.
    #[must_use]
    pub fn bottom_y(&self) -> f64 {
        self.curve.as_ref().map_or(0.0, FittedCurve::bottom_y)
    }

    /// Vertical extent of the fitted domain.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.bottom_y() - self.top_y()
    }

    pub fn push_point(&mut self, point: Point3) {
        self.points.push(point);
        self.refit_quietly();
    }

    /// Inserts a point before `index`. Does nothing if `index > len`.
    pub fn insert_point(&mut self, index: usize, point: Point3) {
        if index > self.points.len() {
            return;
        }
        self.points.insert(index, point);
        self.refit_quietly();
    }

    /// Moves the point at `index`. Does nothing if out of range.
    pub fn set_point(&mut self, index: usize, point: Point3) {
        let Some(slot) = self.points.get_mut(index) else {
            return;
        };
        *slot = point;
        self.refit_quietly();
    }

    /// Removes the point at `index`. Does nothing if out of range.
    pub fn remove_point(&mut self, index: usize) {
        if index >= self.points.len() {
            return;
        }
        self.points.remove(index);
        self.refit_quietly();
    }

    pub fn pop_point(&mut self) -> Option<Point3> {
        let point = self.points.pop();
        if point.is_some() {
            self.refit_quietly();
        }
        point
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
        self.curve = None;
    }

    #[must_use]
    pub fn occlusions(&self) -> &[OcclusionInterval] {
        &self.occlusions
    }

    pub fn add_occlusion(&mut self, interval: OcclusionInterval) {
        self.occlusions.push(interval);
    }

    /// Removes the occlusion at `index`. Does nothing if out of range.
    pub fn remove_occlusion(&mut self, index: usize) {
        if index < self.occlusions.len() {
            self.occlusions.remove(index);
        }
    }

    pub fn clear_occlusions(&mut self) {
        self.occlusions.clear();
    }

    /// Returns whether scanline `y` lies inside any occlusion interval.
    #[must_use]
    pub fn is_occluded_at(&self, y: f64) -> bool {
        is_occluded(&self.occlusions, y)
    }

    /// Refits the curve from the current points.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::InsufficientPoints`] when fewer
    /// than three distinct `y` values exist. The line is left unfitted.
    pub fn refit(&mut self) -> Result<()> {
        match FittedCurve::fit(&self.points) {
            Ok(curve) => {
                self.curve = Some(curve);
                Ok(())
            }
            Err(err) => {
                self.curve = None;
                Err(err)
            }
        }
    }

    fn refit_quietly(&mut self) {
        if let Err(err) = self.refit() {
            debug!(points = self.points.len(), %err, "line left unfitted");
        }
    }

    /// Evaluates the curve at `y`, or `None` when unfitted.
    #[must_use]
    pub fn evaluate(&self, y: f64) -> Option<Point3> {
        self.curve.as_ref().map(|c| c.evaluate(y))
    }

    /// Half-width at `y`.
    ///
    /// Unfitted lines report the last point's radius, or
    /// [`DEFAULT_LINE_RADIUS`] when there are no points.
    #[must_use]
    pub fn radius_at(&self, y: f64) -> f64 {
        match &self.curve {
            Some(curve) => curve.r_at(y),
            None => self.points.last().map_or(DEFAULT_LINE_RADIUS, |p| p.r),
        }
    }
}

impl BoundaryLine {
    /// Appends a point with [`DEFAULT_BOUNDARY_RADIUS`].
    pub fn push_xy(&mut self, x: f64, y: f64) {
        self.push_point(Point3::new(x, y, DEFAULT_BOUNDARY_RADIUS));
    }

    /// Infers a side for a boundary that carries none.
    ///
    /// The side is left when the mean of the first and last point's `x` is
    /// left of the image's horizontal midpoint, else right. The slot becomes
    /// [`UNKNOWN_BOUNDARY_SLOT`]. Returns whether the side was changed.
    pub fn backfill_side(&mut self, image_width: u32) -> bool {
        if self.info.has_known_side() {
            return false;
        }
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return false;
        };

        let mean_x = (first.x + last.x) / 2.0;
        let side = if mean_x < f64::from(image_width) / 2.0 {
            BoundarySide::Left
        } else {
            BoundarySide::Right
        };
        self.info.side = side;
        self.info.slot = UNKNOWN_BOUNDARY_SLOT;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertical_lane() -> LaneLine {
        LaneLine::from_points(
            vec![
                Point3::new(100.0, 0.0, 5.0),
                Point3::new(100.0, 50.0, 5.0),
                Point3::new(100.0, 99.0, 5.0),
            ],
            LaneInfo::default(),
        )
    }

    #[test]
    fn fitted_from_three_points() {
        let lane = vertical_lane();
        assert!(lane.is_fitted());
        assert_relative_eq!(lane.top_y(), 0.0);
        assert_relative_eq!(lane.bottom_y(), 99.0);
        assert_relative_eq!(lane.evaluate(25.0).unwrap().x, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn unfitted_bounds_collapse() {
        let mut lane = LaneLine::default();
        lane.push_point(Point3::new(1.0, 1.0, 3.0));
        lane.push_point(Point3::new(1.0, 2.0, 4.0));
        assert!(!lane.is_fitted());
        assert_relative_eq!(lane.top_y(), 0.0);
        assert_relative_eq!(lane.bottom_y(), 0.0);
        assert!(lane.evaluate(1.5).is_none());
        assert!(lane.refit().is_err());
    }

    #[test]
    fn radius_fallback_when_unfitted() {
        let mut lane = LaneLine::default();
        assert_relative_eq!(lane.radius_at(0.0), DEFAULT_LINE_RADIUS);
        lane.push_point(Point3::new(0.0, 0.0, 3.5));
        assert_relative_eq!(lane.radius_at(0.0), 3.5);
    }

    #[test]
    fn mutations_refit() {
        let mut lane = vertical_lane();
        lane.remove_point(1);
        assert!(!lane.is_fitted());
        lane.insert_point(1, Point3::new(100.0, 120.0, 5.0));
        assert!(lane.is_fitted());
        assert_relative_eq!(lane.bottom_y(), 120.0);
        lane.set_point(0, Point3::new(90.0, -10.0, 5.0));
        assert_relative_eq!(lane.top_y(), -10.0);
        lane.pop_point();
        assert!(!lane.is_fitted());
    }

    #[test]
    fn out_of_range_is_a_no_op() {
        let mut lane = vertical_lane();
        let before = lane.clone();
        lane.remove_point(7);
        lane.set_point(3, Point3::new(0.0, 0.0, 0.0));
        lane.insert_point(9, Point3::new(0.0, 0.0, 0.0));
        lane.remove_occlusion(0);
        assert_eq!(lane, before);
    }

    #[test]
    fn occlusion_lookup() {
        let mut lane = vertical_lane();
        lane.add_occlusion(OcclusionInterval::new(50.0, 30.0));
        assert!(lane.is_occluded_at(40.0));
        assert!(!lane.is_occluded_at(60.0));
    }

    #[test]
    fn backfill_left_and_right() {
        let mut boundary = BoundaryLine::default();
        boundary.push_xy(10.0, 0.0);
        boundary.push_xy(14.0, 10.0);
        boundary.push_xy(20.0, 20.0);
        assert!(boundary.backfill_side(200));
        assert_eq!(boundary.info().side, BoundarySide::Left);
        assert_eq!(boundary.info().slot, UNKNOWN_BOUNDARY_SLOT);
        assert!(!boundary.backfill_side(200));

        let mut boundary = BoundaryLine::default();
        boundary.push_xy(150.0, 0.0);
        boundary.push_xy(190.0, 20.0);
        assert!(boundary.backfill_side(200));
        assert_eq!(boundary.info().side, BoundarySide::Right);
    }

    #[test]
    fn boundary_points_get_default_radius() {
        let mut boundary = BoundaryLine::default();
        boundary.push_xy(1.0, 2.0);
        assert_relative_eq!(boundary.point(0).unwrap().r, DEFAULT_BOUNDARY_RADIUS);
    }
}
