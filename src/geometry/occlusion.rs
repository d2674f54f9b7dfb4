/// A closed vertical range `[top_y, bottom_y]` over which a line is hidden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionInterval {
    top_y: f32,
    bottom_y: f32,
}

impl OcclusionInterval {
    /// Creates an interval; the endpoints are ordered so `top_y <= bottom_y`.
    #[must_use]
    pub fn new(a: f32, b: f32) -> Self {
        if b < a {
            Self { top_y: b, bottom_y: a }
        } else {
            Self { top_y: a, bottom_y: b }
        }
    }

    #[must_use]
    pub fn top_y(&self) -> f32 {
        self.top_y
    }

    #[must_use]
    pub fn bottom_y(&self) -> f32 {
        self.bottom_y
    }

    /// Returns whether `y` lies inside the closed interval.
    #[must_use]
    pub fn contains(&self, y: f64) -> bool {
        f64::from(self.top_y) <= y && y <= f64::from(self.bottom_y)
    }
}

/// Returns whether any interval in `intervals` contains `y`.
#[must_use]
pub fn is_occluded(intervals: &[OcclusionInterval], y: f64) -> bool {
    intervals.iter().any(|occ| occ.contains(y))
}
