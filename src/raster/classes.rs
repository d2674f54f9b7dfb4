//! Class indices written to the label mask and the type-descriptor file.

use crate::taxonomy::{BoundaryInfo, BoundarySide, BoundarySurface, Continuation, LaneInfo, LaneSide};

/// Lane position class of the uncertain/other bucket.
pub const LANE_POSITION_OTHER: u8 = 12;

/// Class indices of a lane line.
///
/// `shape`, `sd`, `color` and `bicycle` are the axis code minus one, so an
/// unset axis reads `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneClasses {
    pub shape: i32,
    pub sd: i32,
    pub position: u8,
    pub color: i32,
    pub bicycle: i32,
}

impl LaneClasses {
    #[must_use]
    pub fn of(info: &LaneInfo) -> Self {
        Self {
            shape: info.pattern.code() - 1,
            sd: info.multiplicity.code() - 1,
            position: lane_position_class(info),
            color: info.color.code() - 1,
            bicycle: info.bicycle.code() - 1,
        }
    }

    /// Green byte of the typed layout: `(shape << 5) + position`.
    #[must_use]
    pub fn green(&self) -> u8 {
        u8::try_from((self.shape.max(0) << 5) + i32::from(self.position)).unwrap_or(0) & 0x7F
    }

    /// Colour part of the blue byte of the typed layout.
    #[must_use]
    pub fn blue(&self) -> u8 {
        u8::try_from(self.color.clamp(0, 63)).unwrap_or(0)
    }

    /// Whether the lane keeps being drawn down to the image's bottom edge.
    #[must_use]
    pub fn extends_to_bottom(&self) -> bool {
        (4..=7).contains(&self.position)
    }
}

/// Position class of a lane, `0..=12`.
///
/// | class | lane |
/// |---|---|
/// | 0 | opposite side, left |
/// | 1 | branch |
/// | 2..=5 | left slot 3, 2, 1, 0 |
/// | 6..=9 | right slot 0, 1, 2, 3 |
/// | 10 | merged |
/// | 11 | opposite side, right |
/// | 12 | anything else |
#[must_use]
pub fn lane_position_class(info: &LaneInfo) -> u8 {
    match (info.continuation, info.side, info.slot) {
        (Continuation::OppositeSide, LaneSide::Left, _) => 0,
        (Continuation::Branch, _, _) => 1,
        (Continuation::None, LaneSide::Left, slot @ 0..=3) => 5 - slot,
        (Continuation::None, LaneSide::Right, slot @ 0..=3) => 6 + slot,
        (Continuation::Merged, _, _) => 10,
        (Continuation::OppositeSide, LaneSide::Right, _) => 11,
        _ => LANE_POSITION_OTHER,
    }
}

/// Class indices of a road boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryClasses {
    pub shape: u8,
    pub position: u8,
}

impl BoundaryClasses {
    #[must_use]
    pub fn of(info: &BoundaryInfo, max_level: u8) -> Self {
        Self {
            shape: boundary_shape_class(info.surface),
            position: boundary_position_class(info, max_level),
        }
    }
}

/// Shape class of a boundary surface, `0..=7`.
#[must_use]
pub fn boundary_shape_class(surface: BoundarySurface) -> u8 {
    match surface {
        BoundarySurface::Wall => 0,
        BoundarySurface::ParkedVehicle => 1,
        BoundarySurface::Guardrail => 2,
        BoundarySurface::Curb => 3,
        BoundarySurface::StaticSeparator | BoundarySurface::TemporarySeparator => 4,
        BoundarySurface::PlasticWall
        | BoundarySurface::Drum
        | BoundarySurface::Beacon
        | BoundarySurface::Cone => 5,
        BoundarySurface::RoadEdge => 6,
        _ => 7,
    }
}

/// Position class of a boundary.
///
/// Slots run outside-in on the left and inside-out on the right, so with
/// `max_level = 1` the classes are L2, L1, R1, R2, other. From `max_level`
/// 3 upwards the outermost class on each side collects every slot above 2.
#[must_use]
pub fn boundary_position_class(info: &BoundaryInfo, max_level: u8) -> u8 {
    let side = info.side;
    let slot = info.slot;
    match max_level {
        0..=2 => match side {
            BoundarySide::Left if slot <= max_level => max_level - slot,
            BoundarySide::Right if slot <= max_level => max_level + 1 + slot,
            _ => 2 * max_level + 2,
        },
        _ => match side {
            BoundarySide::Left => 3 - slot.min(3),
            BoundarySide::Right => 4 + slot.min(3),
            BoundarySide::None => 8,
        },
    }
}
