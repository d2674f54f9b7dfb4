use std::fmt;

coded_enum! {
    /// Kind of a road-marking polygon.
    ///
    /// `HardNegative` marks regions that must be learned as background.
    pub enum RoadMarkerKind {
        HardNegative = 0,
        StopLine = 1,
        Crosswalk = 2,
        Arrow = 3,
        SpeedBump = 4,
    }
    default = HardNegative;
}

impl fmt::Display for RoadMarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HardNegative => "hard_negative",
            Self::StopLine => "stop_line",
            Self::Crosswalk => "crosswalk",
            Self::Arrow => "arrow",
            Self::SpeedBump => "speed_bump",
        })
    }
}
