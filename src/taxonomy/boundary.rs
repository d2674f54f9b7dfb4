use std::fmt;

use super::packing::{pack_side_slot, unpack_side_slot};

/// Slot assigned to boundaries whose side had to be inferred on load.
pub const UNKNOWN_BOUNDARY_SLOT: u8 = 8;

coded_enum! {
    /// Which side of the ego road the boundary is on.
    pub enum BoundarySide {
        None = 0,
        Left = 1,
        Right = 2,
    }
    default = None;
}

coded_enum! {
    /// Physical kind of a road boundary.
    pub enum BoundarySurface {
        None = 0,
        Wall = 1,
        ParkedVehicle = 2,
        Guardrail = 3,
        StaticSeparator = 4,
        Curb = 5,
        TemporarySeparator = 6,
        PlasticWall = 7,
        Drum = 8,
        Beacon = 9,
        Cone = 10,
        RoadEdge = 11,
        IndoorParking = 12,
        Unexplainable = 13,
        StructureOther = 14,
        Other = 15,
    }
    default = None;
}

impl BoundarySurface {
    /// Surfaces that are drawn into the label mask.
    #[must_use]
    pub fn is_drawable(self) -> bool {
        let code = self.code();
        (Self::Wall.code()..=Self::RoadEdge.code()).contains(&code)
            || (Self::StructureOther.code()..=Self::Other.code()).contains(&code)
    }
}

/// Classification of a road boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryInfo {
    pub side: BoundarySide,
    pub slot: u8,
    pub surface: BoundarySurface,
}

impl BoundaryInfo {
    /// Creates an empty classification.
    #[must_use]
    pub fn new() -> Self {
        Self {
            side: BoundarySide::None,
            slot: 0,
            surface: BoundarySurface::None,
        }
    }

    #[must_use]
    pub fn with_side(mut self, side: BoundarySide, slot: u8) -> Self {
        self.side = side;
        self.slot = slot;
        self
    }

    #[must_use]
    pub fn with_surface(mut self, surface: BoundarySurface) -> Self {
        self.surface = surface;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.side_slot_code() == 0 && self.surface == BoundarySurface::None
    }

    /// Returns whether the side is a definite left or right.
    #[must_use]
    pub fn has_known_side(&self) -> bool {
        matches!(self.side, BoundarySide::Left | BoundarySide::Right)
    }

    /// Packed side+slot field as persisted (`type3`).
    #[must_use]
    pub fn side_slot_code(&self) -> i32 {
        pack_side_slot(self.side.code(), self.slot)
    }

    /// Persisted `(type3, boundary)` codes.
    #[must_use]
    pub fn to_codes(&self) -> (i32, i32) {
        (self.side_slot_code(), self.surface.code())
    }

    /// Decodes persisted `(type3, boundary)` codes. Never fails.
    #[must_use]
    pub fn from_codes(side_slot: i32, surface: i32) -> Self {
        let (side_code, slot) = unpack_side_slot(side_slot);
        Self {
            side: BoundarySide::from_code(side_code),
            slot,
            surface: BoundarySurface::from_code(surface),
        }
    }
}

impl Default for BoundaryInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoundaryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }

        let ordinal = u16::from(self.slot) + 1;
        match self.side {
            BoundarySide::None => f.write_str("?")?,
            BoundarySide::Left if ordinal >= 5 => f.write_str("L?")?,
            BoundarySide::Right if ordinal >= 5 => f.write_str("R?")?,
            BoundarySide::Left => write!(f, "L{ordinal}")?,
            BoundarySide::Right => write!(f, "R{ordinal}")?,
        }
        f.write_str(match self.surface {
            BoundarySurface::None => "",
            BoundarySurface::Wall => "_wall",
            BoundarySurface::ParkedVehicle => "_parked_vehicle",
            BoundarySurface::Guardrail => "_guardrail",
            BoundarySurface::StaticSeparator => "_static_separator",
            BoundarySurface::Curb => "_curb",
            BoundarySurface::TemporarySeparator => "_temporary_separator",
            BoundarySurface::PlasticWall => "_plastic_wall",
            BoundarySurface::Drum => "_drum",
            BoundarySurface::Beacon => "_beacon",
            BoundarySurface::Cone => "_cone",
            BoundarySurface::RoadEdge => "_road_edge",
            BoundarySurface::IndoorParking => "_indoor_parking",
            BoundarySurface::Unexplainable => "_unexplainable",
            BoundarySurface::StructureOther => "_structure_other",
            BoundarySurface::Other => "_other",
        })
    }
}
