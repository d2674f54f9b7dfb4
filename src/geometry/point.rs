/// An annotated line sample: lateral position `x`, vertical position `y`
/// and half-width `r`, all in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Point3 {
    /// Creates a new sample.
    #[must_use]
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }
}
