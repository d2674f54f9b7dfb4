//! Which lines are rasterized, in which order, and under which id.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::annotation::{BoundaryLine, LaneLine};
use crate::taxonomy::{BoundarySide, Continuation, LaneInfo, LaneSide, LineColor, LinePattern, Multiplicity};

/// Largest id that fits below the flag bits of a mask byte.
pub const MAX_LINE_ID: u8 = 63;

/// A lane selected for rasterization.
#[derive(Debug, Clone, Copy)]
pub struct LabeledLane<'a> {
    pub id: u8,
    pub lane: &'a LaneLine,
}

/// A boundary selected for rasterization.
#[derive(Debug, Clone, Copy)]
pub struct LabeledBoundary<'a> {
    pub id: u8,
    pub boundary: &'a BoundaryLine,
}

/// Returns whether a lane's classification is complete enough to rasterize.
///
/// Pattern, multiplicity, side, continuation and colour must all be set,
/// and the continuation must not be [`Continuation::Unable`].
#[must_use]
pub fn is_rasterizable(info: &LaneInfo) -> bool {
    info.pattern != LinePattern::None
        && info.multiplicity != Multiplicity::None
        && info.side != LaneSide::None
        && info.color != LineColor::None
        && info.continuation != Continuation::Unable
}

/// Pairwise draw preference of two lanes; `Less` means `a` is drawn first
/// and receives the smaller id of its parity.
///
/// Uncertain-side lanes come first, then opposite-side lanes, then branch or
/// merged lanes, then everything else. Within a bucket lanes are grouped by
/// side, slot and continuation, and a double line precedes a single or
/// accessory line at the same position.
#[must_use]
pub fn compare_lane_type(a: &LaneInfo, b: &LaneInfo) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn sort_key(info: &LaneInfo) -> (u8, i32, u8, i32, u8) {
    let bucket = if info.side == LaneSide::Uncertain {
        0
    } else {
        match info.continuation {
            Continuation::OppositeSide => 1,
            Continuation::Branch | Continuation::Merged => 2,
            _ => 3,
        }
    };
    let multiplicity = match info.multiplicity {
        Multiplicity::Double => 0,
        Multiplicity::Single => 1,
        Multiplicity::Accessory => 2,
        Multiplicity::None => 3,
    };
    (
        bucket,
        info.side.code(),
        info.slot,
        info.continuation.code(),
        multiplicity,
    )
}

/// Orders rasterizable, fitted lanes and numbers them.
///
/// Single lines get odd ids `1, 3, 5, …` and all others even ids
/// `2, 4, 6, …`, each counted in draw order. The sort is stable, so lanes
/// that compare equal keep their input order. Lanes whose id would exceed
/// [`MAX_LINE_ID`] are dropped.
pub fn assign_lane_ids<'a, L>(lanes: L) -> Vec<LabeledLane<'a>>
where
    L: IntoIterator<Item = &'a LaneLine>,
{
    let mut selected: Vec<&LaneLine> = lanes
        .into_iter()
        .filter(|lane| {
            let keep = lane.is_fitted() && is_rasterizable(lane.info());
            if !keep {
                debug!(info = %lane.info(), fitted = lane.is_fitted(), "lane not rasterized");
            }
            keep
        })
        .collect();
    selected.sort_by(|a, b| compare_lane_type(a.info(), b.info()));

    let mut singles: u16 = 0;
    let mut others: u16 = 0;
    let mut labeled = Vec::with_capacity(selected.len());
    for lane in selected {
        let raw = if lane.info().multiplicity == Multiplicity::Single {
            singles += 1;
            2 * singles - 1
        } else {
            others += 1;
            2 * others
        };
        match u8::try_from(raw).ok().filter(|id| *id <= MAX_LINE_ID) {
            Some(id) => labeled.push(LabeledLane { id, lane }),
            None => warn!(id = raw, info = %lane.info(), "lane id out of range, dropped"),
        }
    }
    labeled
}

/// Picks the boundaries to rasterize and numbers them.
///
/// Only drawable surfaces take part. On each side only the innermost slot
/// not above `max_level` is kept. Left boundaries get odd ids and right
/// boundaries even ids, in set order.
#[must_use]
pub fn select_boundaries(boundaries: &[BoundaryLine], max_level: u8) -> Vec<LabeledBoundary<'_>> {
    let candidates: Vec<&BoundaryLine> = boundaries
        .iter()
        .filter(|b| b.is_fitted() && b.info().surface.is_drawable())
        .collect();

    let innermost = |side: BoundarySide| {
        candidates
            .iter()
            .filter(|b| b.info().side == side && b.info().slot <= max_level)
            .map(|b| b.info().slot)
            .min()
    };
    let left_slot = innermost(BoundarySide::Left);
    let right_slot = innermost(BoundarySide::Right);

    let mut lefts: u16 = 0;
    let mut rights: u16 = 0;
    let mut labeled = Vec::new();
    for boundary in candidates {
        let info = boundary.info();
        let raw = match info.side {
            BoundarySide::Left if Some(info.slot) == left_slot => {
                lefts += 1;
                2 * lefts - 1
            }
            BoundarySide::Right if Some(info.slot) == right_slot => {
                rights += 1;
                2 * rights
            }
            _ => continue,
        };
        match u8::try_from(raw).ok().filter(|id| *id <= MAX_LINE_ID) {
            Some(id) => labeled.push(LabeledBoundary { id, boundary }),
            None => warn!(id = raw, info = %info, "boundary id out of range, dropped"),
        }
    }
    labeled
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Point3;
    use crate::taxonomy::{BoundaryInfo, BoundarySurface};

    fn info(mult: Multiplicity, side: LaneSide, slot: u8, cont: Continuation) -> LaneInfo {
        LaneInfo::new()
            .with_pattern(LinePattern::Solid)
            .with_multiplicity(mult)
            .with_side(side, slot)
            .with_continuation(cont)
            .with_color(LineColor::White)
    }

    fn lane(info: LaneInfo) -> LaneLine {
        LaneLine::from_points(
            vec![
                Point3::new(10.0, 0.0, 2.0),
                Point3::new(10.0, 5.0, 2.0),
                Point3::new(10.0, 9.0, 2.0),
            ],
            info,
        )
    }

    fn boundary(side: BoundarySide, slot: u8, surface: BoundarySurface) -> BoundaryLine {
        let mut b = BoundaryLine::new(BoundaryInfo::new().with_side(side, slot).with_surface(surface));
        b.push_xy(1.0, 0.0);
        b.push_xy(1.0, 5.0);
        b.push_xy(1.0, 9.0);
        b
    }

    #[test]
    fn rasterizable_filter() {
        use Continuation as C;
        use LaneSide as S;
        use Multiplicity as M;
        assert!(is_rasterizable(&info(M::Single, S::Left, 0, C::None)));
        assert!(!is_rasterizable(&info(M::Single, S::Left, 0, C::Unable)));
        assert!(!is_rasterizable(&info(M::None, S::Left, 0, C::None)));
        assert!(!is_rasterizable(&info(M::Single, S::None, 0, C::None)));
        assert!(!is_rasterizable(
            &info(M::Single, S::Left, 0, C::None).with_color(LineColor::None)
        ));
    }

    #[test]
    fn preference_order() {
        use Continuation as C;
        use LaneSide as S;
        use Multiplicity as M;
        let uncertain = info(M::Single, S::Uncertain, 0, C::None);
        let opposite = info(M::Single, S::Right, 0, C::OppositeSide);
        let branch = info(M::Single, S::Right, 0, C::Branch);
        let plain = info(M::Single, S::Left, 0, C::None);
        assert_eq!(compare_lane_type(&uncertain, &opposite), Ordering::Less);
        assert_eq!(compare_lane_type(&opposite, &branch), Ordering::Less);
        assert_eq!(compare_lane_type(&branch, &plain), Ordering::Less);
        assert_eq!(compare_lane_type(&plain, &uncertain), Ordering::Greater);

        let double = info(M::Double, S::Left, 0, C::None);
        assert_eq!(compare_lane_type(&double, &plain), Ordering::Less);
        assert_eq!(compare_lane_type(&plain, &plain), Ordering::Equal);
    }

    #[test]
    fn parity_follows_multiplicity() {
        use Continuation as C;
        use LaneSide as S;
        use Multiplicity as M;
        let lanes = vec![
            lane(info(M::Single, S::Left, 0, C::None)),
            lane(info(M::Double, S::Right, 0, C::None)),
            lane(info(M::Single, S::Right, 1, C::None)),
            lane(info(M::Accessory, S::Uncertain, 0, C::None)),
        ];
        let ids: Vec<(u8, Multiplicity)> = assign_lane_ids(&lanes)
            .iter()
            .map(|l| (l.id, l.lane.info().multiplicity))
            .collect();
        assert_eq!(
            ids,
            vec![
                (2, M::Accessory),
                (1, M::Single),
                (4, M::Double),
                (3, M::Single),
            ]
        );
    }

    #[test]
    fn ids_do_not_depend_on_input_order() {
        use Continuation as C;
        use LaneSide as S;
        use Multiplicity as M;
        let mut lanes = vec![
            lane(info(M::Single, S::Left, 1, C::None)),
            lane(info(M::Double, S::Left, 0, C::None)),
            lane(info(M::Single, S::Left, 0, C::None)),
            lane(info(M::Single, S::Right, 0, C::Merged)),
            lane(info(M::Double, S::Uncertain, 0, C::None)),
        ];
        let key = |lanes: &[LaneLine]| -> Vec<(u8, LaneInfo)> {
            assign_lane_ids(lanes)
                .iter()
                .map(|l| (l.id, *l.lane.info()))
                .collect()
        };
        let expected = key(&lanes);
        lanes.reverse();
        assert_eq!(key(&lanes), expected);
        lanes.rotate_left(2);
        assert_eq!(key(&lanes), expected);
    }

    #[test]
    fn unfitted_and_unable_lanes_are_skipped() {
        let mut unfitted = lane(info(Multiplicity::Single, LaneSide::Left, 0, Continuation::None));
        unfitted.pop_point();
        let unable = lane(info(Multiplicity::Single, LaneSide::Left, 0, Continuation::Unable));
        assert!(assign_lane_ids([&unfitted, &unable]).is_empty());
    }

    #[test]
    fn ids_above_limit_are_dropped() {
        let lanes: Vec<LaneLine> = (0..40)
            .map(|_| lane(info(Multiplicity::Single, LaneSide::Left, 0, Continuation::None)))
            .collect();
        let labeled = assign_lane_ids(&lanes);
        assert_eq!(labeled.len(), 32);
        assert_eq!(labeled.last().unwrap().id, 63);
    }

    #[test]
    fn boundaries_keep_innermost_slot_per_side() {
        let boundaries = vec![
            boundary(BoundarySide::Left, 1, BoundarySurface::Wall),
            boundary(BoundarySide::Right, 1, BoundarySurface::Curb),
            boundary(BoundarySide::Left, 0, BoundarySurface::Guardrail),
            boundary(BoundarySide::Right, 2, BoundarySurface::Curb),
            boundary(BoundarySide::Left, 0, BoundarySurface::IndoorParking),
            boundary(BoundarySide::Left, 0, BoundarySurface::RoadEdge),
        ];
        let selected: Vec<(u8, BoundarySurface)> = select_boundaries(&boundaries, 1)
            .iter()
            .map(|b| (b.id, b.boundary.info().surface))
            .collect();
        assert_eq!(
            selected,
            vec![
                (2, BoundarySurface::Curb),
                (1, BoundarySurface::Guardrail),
                (3, BoundarySurface::RoadEdge),
            ]
        );
    }

    #[test]
    fn boundaries_above_max_level_are_ignored() {
        let boundaries = vec![boundary(BoundarySide::Left, 2, BoundarySurface::Wall)];
        assert!(select_boundaries(&boundaries, 1).is_empty());
        assert_eq!(select_boundaries(&boundaries, 2).len(), 1);
    }
}
