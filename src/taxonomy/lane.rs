use std::fmt;

use super::packing::{pack_side_slot, unpack_side_slot};

coded_enum! {
    /// Painted pattern of a lane line.
    pub enum LinePattern {
        None = 0,
        Solid = 1,
        Dashed = 2,
        CatsEye = 3,
    }
    default = None;
}

coded_enum! {
    /// Number of parallel painted lines.
    pub enum Multiplicity {
        None = 0,
        Single = 1,
        Double = 2,
        Accessory = 3,
    }
    default = None;
}

coded_enum! {
    /// Which side of the ego vehicle the line is on.
    pub enum LaneSide {
        None = 0,
        Left = 1,
        Right = 2,
        Uncertain = 3,
    }
    default = None;
}

coded_enum! {
    /// How the line continues relative to the ego road.
    pub enum Continuation {
        None = 0,
        Branch = 1,
        Merged = 2,
        Unable = 3,
        OppositeSide = 4,
    }
    default = None;
}

coded_enum! {
    /// Paint colour.
    pub enum LineColor {
        None = 0,
        White = 1,
        Yellow = 2,
        Blue = 3,
        Etc = 4,
    }
    default = None;
}

coded_enum! {
    /// Bicycle-lane marker flag.
    pub enum BicycleLane {
        None = 0,
        Bicycle = 1,
    }
    default = None;
}

/// Classification of a lane line.
///
/// `slot` counts lanes outwards from the ego lane (0 = adjacent) and is
/// only meaningful for [`LaneSide::Left`] and [`LaneSide::Right`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LaneInfo {
    pub pattern: LinePattern,
    pub multiplicity: Multiplicity,
    pub side: LaneSide,
    pub slot: u8,
    pub continuation: Continuation,
    pub color: LineColor,
    pub bicycle: BicycleLane,
}

impl LaneInfo {
    /// Creates an empty classification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the side and slot.
    #[must_use]
    pub fn with_side(mut self, side: LaneSide, slot: u8) -> Self {
        self.side = side;
        self.slot = slot;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: LinePattern) -> Self {
        self.pattern = pattern;
        self
    }

    #[must_use]
    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    #[must_use]
    pub fn with_continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = continuation;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: LineColor) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_bicycle(mut self, bicycle: BicycleLane) -> Self {
        self.bicycle = bicycle;
        self
    }

    /// Returns whether nothing has been classified yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern == LinePattern::None
            && self.multiplicity == Multiplicity::None
            && self.side_slot_code() == 0
    }

    /// Packed side+slot field as persisted (`type3`).
    #[must_use]
    pub fn side_slot_code(&self) -> i32 {
        pack_side_slot(self.side.code(), self.slot)
    }

    /// Persisted codes `type1..=type6`.
    #[must_use]
    pub fn to_codes(&self) -> [i32; 6] {
        [
            self.pattern.code(),
            self.multiplicity.code(),
            self.side_slot_code(),
            self.continuation.code(),
            self.color.code(),
            self.bicycle.code(),
        ]
    }

    /// Decodes persisted codes `type1..=type6`. Never fails.
    #[must_use]
    pub fn from_codes(codes: [i32; 6]) -> Self {
        let (side_code, slot) = unpack_side_slot(codes[2]);
        Self {
            pattern: LinePattern::from_code(codes[0]),
            multiplicity: Multiplicity::from_code(codes[1]),
            side: LaneSide::from_code(side_code),
            slot,
            continuation: Continuation::from_code(codes[3]),
            color: LineColor::from_code(codes[4]),
            bicycle: BicycleLane::from_code(codes[5]),
        }
    }
}

impl fmt::Display for LaneInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }

        f.write_str(match self.pattern {
            LinePattern::Solid => "solid_",
            LinePattern::Dashed => "dashed_",
            LinePattern::CatsEye => "catseye_",
            LinePattern::None => "",
        })?;
        f.write_str(match self.multiplicity {
            Multiplicity::Single => "single_",
            Multiplicity::Double => "double_",
            Multiplicity::Accessory => "accessory_",
            Multiplicity::None => "",
        })?;
        match self.side {
            LaneSide::None => f.write_str("?")?,
            LaneSide::Left => write!(f, "L{}", u16::from(self.slot) + 1)?,
            LaneSide::Right => write!(f, "R{}", u16::from(self.slot) + 1)?,
            LaneSide::Uncertain => f.write_str("uncertain")?,
        }
        f.write_str(match self.continuation {
            Continuation::None => "",
            Continuation::Branch => "_branch",
            Continuation::Merged => "_merged",
            Continuation::Unable => "_unable",
            Continuation::OppositeSide => "_opposite",
        })?;
        f.write_str(match self.color {
            LineColor::None => "_nocolor",
            LineColor::White => "_white",
            LineColor::Yellow => "_yellow",
            LineColor::Blue => "_blue",
            LineColor::Etc => "_etc",
        })?;
        if self.bicycle == BicycleLane::Bicycle {
            f.write_str("_bicycle")?;
        }
        Ok(())
    }
}
