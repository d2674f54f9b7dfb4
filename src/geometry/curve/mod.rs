use crate::error::{GeometryError, Result};
use crate::math::{Spline, SplineKind};

use super::Point3;

/// Minimum number of distinct-`y` samples needed for a fit.
pub const MIN_FIT_POINTS: usize = 3;

/// Vertical extent of a fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurveDomain {
    /// Smallest knot `y`.
    pub top_y: f64,
    /// Largest knot `y`.
    pub bottom_y: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(top_y: f64, bottom_y: f64) -> Self {
        Self { top_y, bottom_y }
    }

    /// Vertical length of the domain.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.bottom_y - self.top_y
    }
}

/// The curve model of a lane or boundary line.
///
/// Holds two interpolants indexed by the vertical image coordinate: the
/// lateral position `x(y)` (natural cubic) and the half-width `r(y)`
/// (piecewise linear).
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    domain: CurveDomain,
    x_of_y: Spline,
    r_of_y: Spline,
}

impl FittedCurve {
    /// Fits a curve through scattered samples.
    ///
    /// Samples are sorted by `y` and samples repeating the previous `y` are
    /// discarded, keeping the first one seen after the sort. Which of several
    /// samples sharing a `y` survives is not part of the contract.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InsufficientPoints`] when fewer than
    /// [`MIN_FIT_POINTS`] distinct `y` values remain.
    pub fn fit(points: &[Point3]) -> Result<Self> {
        if points.len() < MIN_FIT_POINTS {
            return Err(insufficient(points.len()));
        }

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
        #[allow(clippy::float_cmp)]
        sorted.dedup_by(|later, earlier| later.y == earlier.y);
        if sorted.len() < MIN_FIT_POINTS {
            return Err(insufficient(sorted.len()));
        }

        let ys: Vec<f64> = sorted.iter().map(|p| p.y).collect();
        let xs: Vec<f64> = sorted.iter().map(|p| p.x).collect();
        let rs: Vec<f64> = sorted.iter().map(|p| p.r).collect();

        let x_of_y = Spline::new(&ys, &xs, SplineKind::NaturalCubic)
            .ok_or_else(|| GeometryError::Degenerate("non-finite sample y".to_owned()))?;
        let r_of_y = Spline::new(&ys, &rs, SplineKind::Linear)
            .ok_or_else(|| GeometryError::Degenerate("non-finite sample y".to_owned()))?;

        Ok(Self {
            domain: CurveDomain::new(ys[0], ys[ys.len() - 1]),
            x_of_y,
            r_of_y,
        })
    }

    /// Returns the vertical domain of the fitted samples.
    #[must_use]
    pub fn domain(&self) -> CurveDomain {
        self.domain
    }

    #[must_use]
    pub fn top_y(&self) -> f64 {
        self.domain.top_y
    }

    #[must_use]
    pub fn bottom_y(&self) -> f64 {
        self.domain.bottom_y
    }

    /// Lateral position at `y`. Extrapolates linearly outside the domain.
    #[must_use]
    pub fn x_at(&self, y: f64) -> f64 {
        self.x_of_y.eval(y)
    }

    /// Half-width at `y`. Extrapolates linearly outside the domain.
    #[must_use]
    pub fn r_at(&self, y: f64) -> f64 {
        self.r_of_y.eval(y)
    }

    /// Evaluates both interpolants at `y`.
    #[must_use]
    pub fn evaluate(&self, y: f64) -> Point3 {
        Point3::new(self.x_at(y), y, self.r_at(y))
    }
}

fn insufficient(found: usize) -> crate::error::RoadLaneError {
    GeometryError::InsufficientPoints {
        required: MIN_FIT_POINTS,
        found,
    }
    .into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoadLaneError;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, r: f64) -> Point3 {
        Point3::new(x, y, r)
    }

    #[test]
    fn nan_sample_fails_the_fit() {
        let err = FittedCurve::fit(&[p(10.0, 0.0, 2.0), p(11.0, f64::NAN, 2.0), p(12.0, 50.0, 2.0)])
            .unwrap_err();
        assert!(matches!(err, RoadLaneError::Geometry(GeometryError::Degenerate(_))));
    }

    #[test]
    fn fit_sets_bounds_to_min_max_y() {
        let curve = FittedCurve::fit(&[p(10.0, 80.0, 2.0), p(12.0, 5.0, 1.0), p(11.0, 40.0, 1.5)])
            .unwrap();
        assert_relative_eq!(curve.top_y(), 5.0);
        assert_relative_eq!(curve.bottom_y(), 80.0);
        assert!(curve.top_y() <= curve.bottom_y());
    }

    #[test]
    fn fit_passes_through_samples() {
        let pts = [p(100.0, 0.0, 5.0), p(110.0, 50.0, 7.0), p(140.0, 99.0, 9.0)];
        let curve = FittedCurve::fit(&pts).unwrap();
        for s in &pts {
            let e = curve.evaluate(s.y);
            assert_relative_eq!(e.x, s.x, epsilon = 1e-9);
            assert_relative_eq!(e.r, s.r, epsilon = 1e-9);
        }
    }

    #[test]
    fn radius_is_linear_between_knots() {
        let curve =
            FittedCurve::fit(&[p(0.0, 0.0, 2.0), p(0.0, 10.0, 4.0), p(0.0, 20.0, 4.0)]).unwrap();
        assert_relative_eq!(curve.r_at(5.0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(curve.r_at(15.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn too_few_points_fails() {
        let err = FittedCurve::fit(&[p(0.0, 0.0, 1.0), p(1.0, 1.0, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            RoadLaneError::Geometry(GeometryError::InsufficientPoints { found: 2, .. })
        ));
    }

    #[test]
    fn duplicate_y_collapses_below_minimum() {
        let pts = [p(0.0, 0.0, 1.0), p(5.0, 0.0, 1.0), p(1.0, 9.0, 1.0), p(2.0, 9.0, 1.0)];
        let err = FittedCurve::fit(&pts).unwrap_err();
        assert!(matches!(
            err,
            RoadLaneError::Geometry(GeometryError::InsufficientPoints { found: 2, .. })
        ));
    }

    #[test]
    fn duplicate_y_keeps_one_sample() {
        let pts = [p(0.0, 0.0, 1.0), p(5.0, 10.0, 1.0), p(6.0, 10.0, 1.0), p(9.0, 20.0, 1.0)];
        let curve = FittedCurve::fit(&pts).unwrap();
        let x = curve.x_at(10.0);
        assert!((x - 5.0).abs() < 1e-9 || (x - 6.0).abs() < 1e-9);
    }

    #[test]
    fn domain_length() {
        let curve =
            FittedCurve::fit(&[p(0.0, 3.0, 1.0), p(0.0, 7.0, 1.0), p(0.0, 13.0, 1.0)]).unwrap();
        assert_relative_eq!(curve.domain().length(), 10.0);
    }
}
