use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{bounding_box_2d, contains_point, signed_area_2d};
use crate::math::Point2;
use crate::taxonomy::RoadMarkerKind;

/// Minimum number of vertices of a road-marking polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// A road-marking region. Vertex order is the winding order.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMarkingPolygon {
    vertices: Vec<Point2>,
    kind: RoadMarkerKind,
}

impl RoadMarkingPolygon {
    /// Creates a polygon.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InsufficientPoints`] if fewer than
    /// [`MIN_POLYGON_VERTICES`] vertices are given.
    pub fn new(vertices: Vec<Point2>, kind: RoadMarkerKind) -> Result<Self> {
        if vertices.len() < MIN_POLYGON_VERTICES {
            return Err(GeometryError::InsufficientPoints {
                required: MIN_POLYGON_VERTICES,
                found: vertices.len(),
            }
            .into());
        }
        Ok(Self { vertices, kind })
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    #[must_use]
    pub fn kind(&self) -> RoadMarkerKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: RoadMarkerKind) {
        self.kind = kind;
    }

    pub fn push_vertex(&mut self, vertex: Point2) {
        self.vertices.push(vertex);
    }

    /// Moves the vertex at `index`. Does nothing if out of range.
    pub fn set_vertex(&mut self, index: usize, vertex: Point2) {
        if let Some(v) = self.vertices.get_mut(index) {
            *v = vertex;
        }
    }

    /// Even-odd containment test.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        contains_point(&self.vertices, p)
    }

    /// Axis-aligned bounds `(min, max)`.
    #[must_use]
    pub fn bounding_box(&self) -> (Point2, Point2) {
        bounding_box_2d(&self.vertices).unwrap_or((self.vertices[0], self.vertices[0]))
    }

    /// Signed area; positive for counter-clockwise winding in a y-up frame.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.vertices)
    }
}
