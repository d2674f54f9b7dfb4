//! Mapping between [`AnnotationSet`] and the `RoadLane` document.
//!
//! ```text
//! <RoadLane toolVersion imageWidth imageHeight>
//!   <VP hasVP y_ratio x_ratio/>
//!   <Splines splineNum>
//!     <Spline type1..type6 pointNum occNum>
//!       <Point x y r/>*  <Occlusion top bottom/>*
//!   <Polygons polygonNum>
//!     <Polygon pointNum type>  <Point x y/>*
//!   <Boundarys boundaryNum>
//!     <Boundary type3 boundary pointNum occNum>
//!       <Point x y r/>*  <Occlusion top bottom/>*
//! ```

use tracing::{debug, warn};

use crate::annotation::line::DEFAULT_BOUNDARY_RADIUS;
use crate::annotation::set::DEFAULT_VP_RATIO;
use crate::annotation::{AnnotationSet, BoundaryLine, LaneLine, RoadMarkingPolygon};
use crate::error::{PersistenceError, Result};
use crate::geometry::{OcclusionInterval, Point3};
use crate::math::Point2;
use crate::taxonomy::{BoundaryInfo, LaneInfo, RoadMarkerKind};

use super::xml::{self, Element};

/// Root element name of an annotation document.
pub const ANNOTATION_ROOT: &str = "RoadLane";

/// Builds the document tree for `set`.
#[must_use]
pub fn encode(set: &AnnotationSet) -> Element {
    let vp = Element::new("VP")
        .with_attr("hasVP", set.has_vp())
        .with_attr("y_ratio", set.vp_y_ratio())
        .with_attr("x_ratio", set.vp_x_ratio());

    let mut splines = Element::new("Splines").with_attr("splineNum", set.lanes().len());
    for lane in set.lanes() {
        let [t1, t2, t3, t4, t5, t6] = lane.info().to_codes();
        let spline = Element::new("Spline")
            .with_attr("type1", t1)
            .with_attr("type2", t2)
            .with_attr("type3", t3)
            .with_attr("type4", t4)
            .with_attr("type5", t5)
            .with_attr("type6", t6);
        splines.push_child(encode_line_body(spline, lane.points(), lane.occlusions()));
    }

    let mut polygons = Element::new("Polygons").with_attr("polygonNum", set.markers().len());
    for marker in set.markers() {
        let mut polygon = Element::new("Polygon")
            .with_attr("pointNum", marker.vertices().len())
            .with_attr("type", marker.kind().code());
        for v in marker.vertices() {
            polygon.push_child(Element::new("Point").with_attr("x", v.x).with_attr("y", v.y));
        }
        polygons.push_child(polygon);
    }

    let mut boundarys = Element::new("Boundarys").with_attr("boundaryNum", set.boundaries().len());
    for boundary in set.boundaries() {
        let (side_slot, surface) = boundary.info().to_codes();
        let element = Element::new("Boundary")
            .with_attr("type3", side_slot)
            .with_attr("boundary", surface);
        boundarys.push_child(encode_line_body(
            element,
            boundary.points(),
            boundary.occlusions(),
        ));
    }

    Element::new(ANNOTATION_ROOT)
        .with_attr("toolVersion", set.tool_version())
        .with_attr("imageWidth", set.image_width())
        .with_attr("imageHeight", set.image_height())
        .with_child(vp)
        .with_child(splines)
        .with_child(polygons)
        .with_child(boundarys)
}

fn encode_line_body(
    mut element: Element,
    points: &[Point3],
    occlusions: &[OcclusionInterval],
) -> Element {
    element.set_attr("pointNum", points.len());
    element.set_attr("occNum", occlusions.len());
    for p in points {
        element.push_child(
            Element::new("Point")
                .with_attr("x", p.x)
                .with_attr("y", p.y)
                .with_attr("r", p.r),
        );
    }
    for occ in occlusions {
        element.push_child(
            Element::new("Occlusion")
                .with_attr("top", occ.top_y())
                .with_attr("bottom", occ.bottom_y()),
        );
    }
    element
}

/// Rebuilds an [`AnnotationSet`] from a document tree.
///
/// Every line is refit as it is added. Boundaries without a left/right side
/// get one inferred from their position in the image.
///
/// # Errors
///
/// Returns [`PersistenceError::MalformedInput`] when a required element or
/// attribute is missing, an attribute does not parse, or a collection has
/// fewer children than it declares.
pub fn decode(root: &Element) -> Result<AnnotationSet> {
    if root.name() != ANNOTATION_ROOT {
        return Err(PersistenceError::malformed(format!(
            "expected root <{ANNOTATION_ROOT}>, found <{}>",
            root.name()
        ))
        .into());
    }

    let width: u32 = root.require_attr("imageWidth")?;
    let height: u32 = root.require_attr("imageHeight")?;
    let mut set = AnnotationSet::new(width, height);
    match root.attr("toolVersion") {
        Some(version) => set.set_tool_version(version),
        None => debug!("annotation has no toolVersion"),
    }

    let vp = required_child(root, "VP")?;
    set.set_vp_x_ratio(vp.parse_attr("x_ratio")?.unwrap_or(DEFAULT_VP_RATIO));
    set.set_vp_y_ratio(vp.parse_attr("y_ratio")?.unwrap_or(DEFAULT_VP_RATIO));
    set.set_has_vp(vp.parse_bool_attr("hasVP")?.unwrap_or(false));

    let splines = required_child(root, "Splines")?;
    for element in declared_children(splines, "splineNum", "Spline")? {
        set.add_lane(decode_lane(element)?);
    }

    let polygons = required_child(root, "Polygons")?;
    for element in declared_children(polygons, "polygonNum", "Polygon")? {
        if let Some(marker) = decode_polygon(element)? {
            set.add_marker(marker);
        }
    }

    let boundarys = required_child(root, "Boundarys")?;
    for element in declared_children(boundarys, "boundaryNum", "Boundary")? {
        let mut boundary = decode_boundary(element)?;
        if boundary.backfill_side(width) {
            debug!(info = %boundary.info(), "inferred boundary side");
        }
        set.add_boundary(boundary);
    }

    Ok(set)
}

/// Serializes `set` to document text.
///
/// # Errors
///
/// Returns [`PersistenceError::Xml`] if the writer fails.
pub fn to_xml_string(set: &AnnotationSet) -> Result<String> {
    xml::write(&encode(set))
}

/// Parses document text into an [`AnnotationSet`].
///
/// # Errors
///
/// See [`decode`]; syntax errors surface as [`PersistenceError::Xml`].
pub fn from_xml_str(text: &str) -> Result<AnnotationSet> {
    decode(&xml::parse(text)?)
}

fn decode_lane(element: &Element) -> Result<LaneLine> {
    let codes = [
        element.require_attr("type1")?,
        element.require_attr("type2")?,
        element.require_attr("type3")?,
        element.require_attr("type4")?,
        element.parse_attr("type5")?.unwrap_or(0),
        element.parse_attr("type6")?.unwrap_or(0),
    ];
    let points = decode_points(element, None)?;
    let occlusions = decode_occlusions(element)?;
    Ok(LaneLine::from_points(points, LaneInfo::from_codes(codes)).with_occlusions(occlusions))
}

fn decode_boundary(element: &Element) -> Result<BoundaryLine> {
    let side_slot = element.parse_attr("type3")?.unwrap_or(0);
    let surface = element.require_attr("boundary")?;
    let points = decode_points(element, Some(DEFAULT_BOUNDARY_RADIUS))?;
    let occlusions = decode_occlusions(element)?;
    let info = BoundaryInfo::from_codes(side_slot, surface);
    Ok(BoundaryLine::from_points(points, info).with_occlusions(occlusions))
}

fn decode_polygon(element: &Element) -> Result<Option<RoadMarkingPolygon>> {
    let kind = RoadMarkerKind::from_code(element.require_attr("type")?);
    let mut vertices = Vec::new();
    for point in declared_children(element, "pointNum", "Point")? {
        vertices.push(Point2::new(
            point.require_attr("x")?,
            point.require_attr("y")?,
        ));
    }

    match RoadMarkingPolygon::new(vertices, kind) {
        Ok(polygon) => Ok(Some(polygon)),
        Err(err) => {
            warn!(%kind, %err, "skipping degenerate road marking");
            Ok(None)
        }
    }
}

/// Reads `pointNum` points. Points without `r` get `default_r` when given.
fn decode_points(element: &Element, default_r: Option<f64>) -> Result<Vec<Point3>> {
    let mut points = Vec::new();
    for point in declared_children(element, "pointNum", "Point")? {
        let r = match default_r {
            Some(fallback) => point.parse_attr("r")?.unwrap_or(fallback),
            None => point.require_attr("r")?,
        };
        points.push(Point3::new(
            point.require_attr("x")?,
            point.require_attr("y")?,
            r,
        ));
    }
    Ok(points)
}

fn decode_occlusions(element: &Element) -> Result<Vec<OcclusionInterval>> {
    let mut occlusions = Vec::new();
    for occ in declared_children(element, "occNum", "Occlusion")? {
        occlusions.push(OcclusionInterval::new(
            occ.require_attr("top")?,
            occ.require_attr("bottom")?,
        ));
    }
    Ok(occlusions)
}

fn required_child<'a>(parent: &'a Element, name: &str) -> Result<&'a Element> {
    parent.child(name).ok_or_else(|| {
        PersistenceError::malformed(format!("<{}> has no <{name}> element", parent.name())).into()
    })
}

/// Returns the first `count` children named `child`, where `count` is read
/// from the parent's `count_attr`.
fn declared_children<'a>(
    parent: &'a Element,
    count_attr: &str,
    child: &'a str,
) -> Result<Vec<&'a Element>> {
    let count: usize = parent.require_attr(count_attr)?;
    let items: Vec<&Element> = parent.children_named(child).take(count).collect();
    if items.len() < count {
        return Err(PersistenceError::malformed(format!(
            "<{}> declares {count} <{child}> but has {}",
            parent.name(),
            items.len()
        ))
        .into());
    }
    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoadLaneError;
    use crate::taxonomy::{
        BicycleLane, BoundarySide, BoundarySurface, Continuation, LaneSide, LineColor,
        LinePattern, Multiplicity, UNKNOWN_BOUNDARY_SLOT,
    };

    fn sample_set() -> AnnotationSet {
        let mut set = AnnotationSet::new(1280, 720);
        set.set_vp_x_ratio(0.4817);
        set.set_vp_y_ratio(0.1 + 0.2);

        let info = LaneInfo::new()
            .with_pattern(LinePattern::Dashed)
            .with_multiplicity(Multiplicity::Single)
            .with_side(LaneSide::Right, 1)
            .with_continuation(Continuation::Branch)
            .with_color(LineColor::Yellow)
            .with_bicycle(BicycleLane::Bicycle);
        let lane = LaneLine::from_points(
            vec![
                Point3::new(700.123_456_789, 300.0, 2.5),
                Point3::new(820.0, 500.25, 1.0 / 3.0),
                Point3::new(900.5, 719.0, 6.0),
                Point3::new(650.0, 280.0, 2.0),
            ],
            info,
        )
        .with_occlusions(vec![OcclusionInterval::new(350.5, 400.0)]);
        set.add_lane(lane);

        let unfitted = LaneLine::from_points(vec![Point3::new(1.0, 2.0, 3.0)], LaneInfo::new());
        set.add_lane(unfitted);

        set.add_marker(
            RoadMarkingPolygon::new(
                vec![
                    Point2::new(10.0, 600.0),
                    Point2::new(200.75, 600.0),
                    Point2::new(200.75, 650.1),
                    Point2::new(10.0, 650.1),
                ],
                RoadMarkerKind::Crosswalk,
            )
            .unwrap(),
        );

        let boundary = BoundaryLine::from_points(
            vec![
                Point3::new(100.0, 400.0, 5.0),
                Point3::new(50.0, 550.0, 7.5),
                Point3::new(0.0, 700.0, 5.0),
            ],
            BoundaryInfo::new()
                .with_side(BoundarySide::Left, 0)
                .with_surface(BoundarySurface::Guardrail),
        );
        set.add_boundary(boundary);
        set
    }

    #[test]
    fn round_trip_is_exact() {
        let set = sample_set();
        let back = from_xml_str(&to_xml_string(&set).unwrap()).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn encoded_layout() {
        let root = encode(&sample_set());
        assert_eq!(root.name(), ANNOTATION_ROOT);
        assert_eq!(root.attr("imageWidth"), Some("1280"));
        assert_eq!(root.child("VP").unwrap().attr("hasVP"), Some("true"));
        let splines = root.child("Splines").unwrap();
        assert_eq!(splines.attr("splineNum"), Some("2"));
        let spline = splines.child("Spline").unwrap();
        assert_eq!(spline.attr("type3"), Some("258"));
        assert_eq!(spline.attr("pointNum"), Some("4"));
        assert_eq!(spline.attr("occNum"), Some("1"));
        let boundary = root.child("Boundarys").unwrap().child("Boundary").unwrap();
        assert_eq!(boundary.attr("type3"), Some("1"));
        assert_eq!(boundary.attr("boundary"), Some("3"));
    }

    #[test]
    fn loaded_lines_are_refit() {
        let set = from_xml_str(&to_xml_string(&sample_set()).unwrap()).unwrap();
        assert!(set.lane(0).unwrap().is_fitted());
        assert!(!set.lane(1).unwrap().is_fitted());
        assert!(set.boundary(0).unwrap().is_fitted());
    }

    #[test]
    fn legacy_boundary_side_is_inferred() {
        let text = r#"<RoadLane imageWidth="200" imageHeight="100">
            <VP hasVP="0" y_ratio="0.5" x_ratio="0.5"/>
            <Splines splineNum="0"/>
            <Polygons polygonNum="0"/>
            <Boundarys boundaryNum="1">
                <Boundary boundary="5" pointNum="3" occNum="0">
                    <Point x="10" y="0" r="5"/>
                    <Point x="12" y="50" r="5"/>
                    <Point x="20" y="99" r="5"/>
                </Boundary>
            </Boundarys>
        </RoadLane>"#;
        let set = from_xml_str(text).unwrap();
        let info = set.boundary(0).unwrap().info();
        assert_eq!(info.side, BoundarySide::Left);
        assert_eq!(info.slot, UNKNOWN_BOUNDARY_SLOT);
        assert_eq!(info.surface, BoundarySurface::Curb);
        assert!(!set.has_vp());
    }

    #[test]
    fn legacy_lane_without_color_axes() {
        let text = r#"<RoadLane toolVersion="0.9" imageWidth="200" imageHeight="100">
            <VP hasVP="true" y_ratio="0.25" x_ratio="0.5"/>
            <Splines splineNum="1">
                <Spline type1="1" type2="1" type3="1" type4="0" pointNum="3" occNum="0">
                    <Point x="100" y="0" r="5"/>
                    <Point x="100" y="50" r="5"/>
                    <Point x="100" y="99" r="5"/>
                </Spline>
            </Splines>
            <Polygons polygonNum="1">
                <Polygon pointNum="2" type="1"><Point x="0" y="0"/><Point x="1" y="1"/></Polygon>
            </Polygons>
            <Boundarys boundaryNum="0"/>
        </RoadLane>"#;
        let set = from_xml_str(text).unwrap();
        assert_eq!(set.tool_version(), "0.9");
        let info = set.lane(0).unwrap().info();
        assert_eq!(info.color, LineColor::None);
        assert_eq!(info.bicycle, BicycleLane::None);
        assert!(set.markers().is_empty());
    }

    #[test]
    fn missing_sections_are_malformed() {
        let text = r#"<RoadLane imageWidth="200" imageHeight="100">
            <VP hasVP="0" y_ratio="0.5" x_ratio="0.5"/>
            <Splines splineNum="0"/>
        </RoadLane>"#;
        assert!(matches!(
            from_xml_str(text).unwrap_err(),
            RoadLaneError::Persistence(PersistenceError::MalformedInput(_))
        ));
    }

    #[test]
    fn short_collections_are_malformed() {
        let text = r#"<RoadLane imageWidth="200" imageHeight="100">
            <VP hasVP="0" y_ratio="0.5" x_ratio="0.5"/>
            <Splines splineNum="2">
                <Spline type1="1" type2="1" type3="1" type4="0" pointNum="0" occNum="0"/>
            </Splines>
            <Polygons polygonNum="0"/>
            <Boundarys boundaryNum="0"/>
        </RoadLane>"#;
        assert!(matches!(
            from_xml_str(text).unwrap_err(),
            RoadLaneError::Persistence(PersistenceError::MalformedInput(_))
        ));
    }

    #[test]
    fn bad_attribute_is_malformed() {
        let text = r#"<RoadLane imageWidth="wide" imageHeight="100"/>"#;
        assert!(matches!(
            from_xml_str(text).unwrap_err(),
            RoadLaneError::Persistence(PersistenceError::MalformedInput(_))
        ));
    }

    #[test]
    fn wrong_root_is_malformed() {
        assert!(from_xml_str("<LaneBoundaryTypes/>").is_err());
    }
}
