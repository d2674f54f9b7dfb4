//! Scanline painting primitives shared by both mask layouts.

use image::Rgb;

use crate::annotation::RoadMarkingPolygon;
use crate::geometry::occlusion::is_occluded;
use crate::geometry::{FittedCurve, OcclusionInterval};
use crate::math::Point2;

use super::classes::LaneClasses;
use super::mask::{
    LabelMask, CHANNEL_B, CHANNEL_G, CHANNEL_R, FLAG_BOUNDARY_OCCLUDED, FLAG_EXTENDED,
    FLAG_OCCLUDED, ROAD_MARKING_BIT, VP_ABSENT, VP_INSIDE,
};

/// Green value written over a road-marking polygon's interior.
const MARKING_FILL: [u8; 3] = [0, ROAD_MARKING_BIT, 0];

/// A clipped horizontal run of pixels on one scanline, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub y: u32,
    pub x0: u32,
    pub x1: u32,
    pub occluded: bool,
    pub extended: bool,
}

#[allow(clippy::cast_possible_truncation)]
fn round_px(value: f64) -> i64 {
    value.round() as i64
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Walks a fitted curve row by row and returns the spans to paint.
///
/// Rows run from the rounded top of the curve to its rounded bottom, or to
/// the last image row when `extend_to_bottom` is set. Each row covers
/// `[round(x - r), round(x + r)]`, where `r` is the curve's half-width
/// unless `half_width` overrides it. A row whose span does not overlap the
/// previous row's span is widened to the hull of both. Rows below the
/// rounded bottom are flagged as extended.
pub(crate) fn sweep(
    curve: &FittedCurve,
    occlusions: &[OcclusionInterval],
    width: u32,
    height: u32,
    extend_to_bottom: bool,
    half_width: Option<f64>,
) -> Vec<Span> {
    let last_row = i64::from(height) - 1;
    let last_col = i64::from(width) - 1;
    let top = round_px(curve.top_y()).max(0);
    let bottom_row = round_px(curve.bottom_y()).min(last_row);
    let bottom = if extend_to_bottom { last_row } else { bottom_row };
    if top > bottom {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut previous: Option<(i64, i64)> = None;
    for y in clamp_u32(top)..=clamp_u32(bottom) {
        let fy = f64::from(y);
        let x = curve.x_at(fy);
        let r = half_width.unwrap_or_else(|| curve.r_at(fy));
        let current = (round_px(x - r), round_px(x + r));

        let (mut left, mut right) = current;
        if let Some((prev_left, prev_right)) = previous {
            if prev_right.min(right) - prev_left.max(left) <= 0 {
                left = left.min(prev_left);
                right = right.max(prev_right);
            }
        }
        previous = Some(current);

        let left = left.max(0);
        let right = right.min(last_col);
        if left > right {
            continue;
        }
        spans.push(Span {
            y,
            x0: clamp_u32(left),
            x1: clamp_u32(right),
            occluded: is_occluded(occlusions, fy),
            extended: i64::from(y) > bottom_row,
        });
    }
    spans
}

fn paint_spans(mask: &mut LabelMask, spans: &[Span], mut paint: impl FnMut(&mut Rgb<u8>, &Span)) {
    for span in spans {
        for x in span.x0..=span.x1 {
            if let Some(px) = mask.pixel_mut(x, span.y) {
                paint(px, span);
            }
        }
    }
}

fn lane_id_byte(id: u8, span: &Span) -> u8 {
    let mut byte = id;
    if span.occluded {
        byte |= FLAG_OCCLUDED;
    }
    if span.extended {
        byte |= FLAG_EXTENDED;
    }
    byte
}

/// Paints a lane in the typed layout: id in red, classes in green, colour
/// in blue, each layered over what is already there.
pub(crate) fn paint_lane_typed(mask: &mut LabelMask, spans: &[Span], id: u8, classes: &LaneClasses) {
    let green = classes.green();
    let blue = classes.blue();
    paint_spans(mask, spans, |px, span| {
        px[CHANNEL_R] = lane_id_byte(id, span);

        let g = px[CHANNEL_G];
        px[CHANNEL_G] = if g >= ROAD_MARKING_BIT {
            green + ROAD_MARKING_BIT
        } else {
            green
        };

        let b = px[CHANNEL_B];
        px[CHANNEL_B] = if b >= VP_INSIDE {
            blue + VP_INSIDE
        } else if b >= VP_ABSENT {
            blue + VP_ABSENT
        } else {
            blue
        };
    });
}

/// Paints a lane's id byte into red only.
pub(crate) fn paint_lane_id(mask: &mut LabelMask, spans: &[Span], id: u8) {
    paint_spans(mask, spans, |px, span| {
        px[CHANNEL_R] = lane_id_byte(id, span);
    });
}

/// Paints a boundary's id byte into green, keeping the road-marking bit.
pub(crate) fn paint_boundary(mask: &mut LabelMask, spans: &[Span], id: u8) {
    paint_spans(mask, spans, |px, span| {
        let mut byte = id;
        if span.occluded {
            byte |= FLAG_BOUNDARY_OCCLUDED;
        }
        if px[CHANNEL_G] >= ROAD_MARKING_BIT {
            byte += ROAD_MARKING_BIT;
        }
        px[CHANNEL_G] = byte;
    });
}

/// Raises green into the road-marking range along the spans.
pub(crate) fn paint_road_marking_line(mask: &mut LabelMask, spans: &[Span]) {
    paint_spans(mask, spans, |px, _| {
        if px[CHANNEL_G] < ROAD_MARKING_BIT {
            px[CHANNEL_G] += ROAD_MARKING_BIT;
        }
    });
}

/// Fills a road-marking polygon. Integer pixel positions inside the polygon
/// are set to the road-marking colour.
pub(crate) fn fill_marking(mask: &mut LabelMask, polygon: &RoadMarkingPolygon) {
    let (min, max) = polygon.bounding_box();
    let x0 = clamp_u32(round_px(min.x.floor()));
    let y0 = clamp_u32(round_px(min.y.floor()));
    let x1 = clamp_u32(round_px(max.x.ceil()).min(i64::from(mask.width()) - 1));
    let y1 = clamp_u32(round_px(max.y.ceil()).min(i64::from(mask.height()) - 1));
    if max.x < 0.0 || max.y < 0.0 {
        return;
    }

    for y in y0..=y1 {
        for x in x0..=x1 {
            if !polygon.contains(&Point2::new(f64::from(x), f64::from(y))) {
                continue;
            }
            if let Some(px) = mask.pixel_mut(x, y) {
                px.0 = MARKING_FILL;
            }
        }
    }
}

/// Writes the vanishing-point sentinels into blue.
///
/// Without a vanishing point every pixel gets [`VP_ABSENT`]. Otherwise a box
/// of `w/5 × h/8` (`w/8 × h/24` for portrait images) centred on the point
/// gets [`VP_INSIDE`] and the rest is left untouched.
pub(crate) fn paint_vanishing_point(mask: &mut LabelMask, ratios: Option<(f64, f64)>, portrait: bool) {
    let Some((x_ratio, y_ratio)) = ratios else {
        for px in mask.pixels_mut() {
            px[CHANNEL_B] = VP_ABSENT;
        }
        return;
    };

    let (w, h) = (mask.width(), mask.height());
    let (box_w, box_h) = if portrait { (w / 8, h / 24) } else { (w / 5, h / 8) };
    let left = round_px(x_ratio * f64::from(w)) - i64::from(box_w / 2);
    let top = round_px(y_ratio * f64::from(h)) - i64::from(box_h / 2);
    let right = (left + i64::from(box_w)).min(i64::from(w));
    let bottom = (top + i64::from(box_h)).min(i64::from(h));
    if right <= 0 || bottom <= 0 {
        return;
    }

    for y in clamp_u32(top)..clamp_u32(bottom) {
        for x in clamp_u32(left)..clamp_u32(right) {
            if let Some(px) = mask.pixel_mut(x, y) {
                px[CHANNEL_B] = VP_INSIDE;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Point3;
    use crate::taxonomy::RoadMarkerKind;

    fn curve(points: &[(f64, f64, f64)]) -> FittedCurve {
        let points: Vec<Point3> = points.iter().map(|&(x, y, r)| Point3::new(x, y, r)).collect();
        FittedCurve::fit(&points).unwrap()
    }

    #[test]
    fn vertical_line_spans() {
        let c = curve(&[(100.0, 0.0, 5.0), (100.0, 50.0, 5.0), (100.0, 99.0, 5.0)]);
        let spans = sweep(&c, &[], 200, 100, false, None);
        assert_eq!(spans.len(), 100);
        assert!(spans.iter().all(|s| s.x0 == 95 && s.x1 == 105));
        assert!(spans.iter().all(|s| !s.occluded && !s.extended));
    }

    #[test]
    fn occlusion_marks_rows() {
        let c = curve(&[(100.0, 0.0, 5.0), (100.0, 50.0, 5.0), (100.0, 99.0, 5.0)]);
        let occ = [OcclusionInterval::new(30.0, 50.0)];
        let spans = sweep(&c, &occ, 200, 100, false, None);
        assert!(spans[40].occluded);
        assert!(spans[30].occluded);
        assert!(!spans[60].occluded);
    }

    #[test]
    fn extension_runs_to_last_row() {
        let c = curve(&[(10.0, 0.0, 1.0), (10.0, 25.0, 1.0), (10.0, 50.0, 1.0)]);
        let spans = sweep(&c, &[], 20, 100, true, None);
        assert_eq!(spans.last().unwrap().y, 99);
        assert!(!spans[50].extended);
        assert!(spans[51].extended);
        assert_eq!(sweep(&c, &[], 20, 100, false, None).len(), 51);
    }

    #[test]
    fn fractional_bottom_is_rounded_before_flagging() {
        let c = curve(&[(10.0, 0.0, 1.0), (10.0, 25.0, 1.0), (10.0, 50.6, 1.0)]);
        let spans = sweep(&c, &[], 20, 100, false, None);
        assert_eq!(spans.last().unwrap().y, 51);
        assert!(spans.iter().all(|s| !s.extended));

        let spans = sweep(&c, &[], 20, 100, true, None);
        assert!(!spans[51].extended);
        assert!(spans[52].extended);

        let c = curve(&[(10.0, 0.4, 1.0), (10.0, 25.0, 1.0), (10.0, 50.4, 1.0)]);
        let spans = sweep(&c, &[], 20, 100, true, None);
        assert_eq!(spans.first().unwrap().y, 0);
        assert!(!spans[50].extended);
        assert!(spans[51].extended);
    }

    #[test]
    fn steep_rows_are_bridged() {
        let c = curve(&[(10.0, 0.0, 1.0), (30.0, 1.0, 1.0), (50.0, 2.0, 1.0)]);
        let spans = sweep(&c, &[], 100, 3, false, None);
        let ranges: Vec<(u32, u32)> = spans.iter().map(|s| (s.x0, s.x1)).collect();
        assert_eq!(ranges, vec![(9, 11), (9, 31), (29, 51)]);
    }

    #[test]
    fn spans_are_clipped() {
        let c = curve(&[(2.0, -5.0, 4.0), (2.0, 5.0, 4.0), (2.0, 20.0, 4.0)]);
        let spans = sweep(&c, &[], 5, 10, false, None);
        assert_eq!(spans.first().unwrap().y, 0);
        assert_eq!(spans.last().unwrap().y, 9);
        assert!(spans.iter().all(|s| s.x0 == 0 && s.x1 == 4));
    }

    #[test]
    fn fixed_half_width_overrides_radius() {
        let c = curve(&[(50.0, 0.0, 20.0), (50.0, 5.0, 20.0), (50.0, 9.0, 20.0)]);
        let spans = sweep(&c, &[], 100, 10, false, Some(2.0));
        assert!(spans.iter().all(|s| s.x0 == 48 && s.x1 == 52));
    }

    #[test]
    fn typed_lane_layers_flags() {
        let mut mask = LabelMask::new(3, 1).unwrap();
        *mask.pixel_mut(0, 0).unwrap() = Rgb([0, 128, 64]);
        *mask.pixel_mut(1, 0).unwrap() = Rgb([0, 0, 128]);
        let classes = LaneClasses {
            shape: 1,
            sd: 0,
            position: 6,
            color: 1,
            bicycle: -1,
        };
        let span = Span { y: 0, x0: 0, x1: 2, occluded: true, extended: false };
        paint_lane_typed(&mut mask, &[span], 3, &classes);
        assert_eq!(mask.pixel(0, 0), Some([131, 128 + 38, 65]));
        assert_eq!(mask.pixel(1, 0), Some([131, 38, 129]));
        assert_eq!(mask.pixel(2, 0), Some([131, 38, 1]));
    }

    #[test]
    fn boundary_keeps_marking_bit() {
        let mut mask = LabelMask::new(2, 1).unwrap();
        *mask.pixel_mut(0, 0).unwrap() = Rgb([0, 128, 0]);
        let span = Span { y: 0, x0: 0, x1: 1, occluded: true, extended: false };
        paint_boundary(&mut mask, &[span], 2);
        assert_eq!(mask.pixel(0, 0), Some([0, 128 + 64 + 2, 0]));
        assert_eq!(mask.pixel(1, 0), Some([0, 64 + 2, 0]));
    }

    #[test]
    fn marking_line_sets_bit_once() {
        let mut mask = LabelMask::new(2, 1).unwrap();
        *mask.pixel_mut(0, 0).unwrap() = Rgb([0, 130, 0]);
        *mask.pixel_mut(1, 0).unwrap() = Rgb([5, 3, 0]);
        let span = Span { y: 0, x0: 0, x1: 1, occluded: false, extended: false };
        paint_road_marking_line(&mut mask, &[span]);
        assert_eq!(mask.pixel(0, 0), Some([0, 130, 0]));
        assert_eq!(mask.pixel(1, 0), Some([5, 131, 0]));
    }

    #[test]
    fn polygon_fill() {
        let mut mask = LabelMask::new(10, 10).unwrap();
        let square = RoadMarkingPolygon::new(
            vec![
                Point2::new(2.5, 2.5),
                Point2::new(6.5, 2.5),
                Point2::new(6.5, 6.5),
                Point2::new(2.5, 6.5),
            ],
            RoadMarkerKind::Crosswalk,
        )
        .unwrap();
        fill_marking(&mut mask, &square);
        assert_eq!(mask.pixel(3, 3), Some([0, 128, 0]));
        assert_eq!(mask.pixel(6, 6), Some([0, 128, 0]));
        assert_eq!(mask.pixel(2, 3), Some([0, 0, 0]));
        assert_eq!(mask.pixel(7, 6), Some([0, 0, 0]));
    }

    #[test]
    fn vanishing_point_box() {
        let mut mask = LabelMask::new(100, 80).unwrap();
        paint_vanishing_point(&mut mask, Some((0.5, 0.5)), false);
        // 20 x 10 box from (40, 35).
        assert_eq!(mask.pixel(40, 35).unwrap()[CHANNEL_B], VP_INSIDE);
        assert_eq!(mask.pixel(59, 44).unwrap()[CHANNEL_B], VP_INSIDE);
        assert_eq!(mask.pixel(60, 44).unwrap()[CHANNEL_B], 0);
        assert_eq!(mask.pixel(40, 45).unwrap()[CHANNEL_B], 0);

        let mut portrait = LabelMask::new(80, 240).unwrap();
        paint_vanishing_point(&mut portrait, Some((0.5, 0.5)), true);
        // 10 x 10 box from (35, 115).
        assert_eq!(portrait.pixel(35, 115).unwrap()[CHANNEL_B], VP_INSIDE);
        assert_eq!(portrait.pixel(44, 124).unwrap()[CHANNEL_B], VP_INSIDE);
        assert_eq!(portrait.pixel(45, 124).unwrap()[CHANNEL_B], 0);
    }

    #[test]
    fn missing_vanishing_point_marks_everything() {
        let mut mask = LabelMask::new(4, 4).unwrap();
        paint_vanishing_point(&mut mask, None, false);
        assert!(mask.as_image().pixels().all(|p| p[CHANNEL_B] == VP_ABSENT));
    }
}
