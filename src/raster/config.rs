/// Channel layout of the label mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskLayout {
    /// R: lane id and flags. G: road-marking bit, shape and position class.
    /// B: colour and vanishing point. Boundaries are not drawn.
    Typed,
    /// R: lane id and flags. G: road-marking bit and boundary id.
    /// B: vanishing point.
    #[default]
    LaneBoundary,
}

/// Rasterization settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Channel layout to produce.
    pub layout: MaskLayout,
    /// Paint accessory lines into the road-marking bit instead of giving
    /// them a lane id.
    pub accessory_as_marker: bool,
    /// Highest boundary slot that may be drawn.
    pub boundary_max_level: u8,
    /// Boundary lines are `image_width / boundary_width_ratio` pixels wide.
    pub boundary_width_ratio: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            layout: MaskLayout::LaneBoundary,
            accessory_as_marker: false,
            boundary_max_level: 1,
            boundary_width_ratio: 128.0,
        }
    }
}

impl RasterConfig {
    #[must_use]
    pub fn with_layout(mut self, layout: MaskLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_accessory_as_marker(mut self, enabled: bool) -> Self {
        self.accessory_as_marker = enabled;
        self
    }

    #[must_use]
    pub fn with_boundary_max_level(mut self, level: u8) -> Self {
        self.boundary_max_level = level;
        self
    }

    /// Half-width in pixels of a rasterized boundary for an image `width` wide.
    #[must_use]
    pub fn boundary_half_width(&self, width: u32) -> f64 {
        f64::from(width) / self.boundary_width_ratio / 2.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: RasterConfig =
            serde_json::from_str(r#"{"layout": "lane_boundary", "boundary_max_level": 2}"#)
                .unwrap();
        assert_eq!(cfg.layout, MaskLayout::LaneBoundary);
        assert_eq!(cfg.boundary_max_level, 2);
        assert!(!cfg.accessory_as_marker);
        assert_relative_eq!(cfg.boundary_width_ratio, 128.0);
    }

    #[test]
    fn empty_json_exports_lanes_and_boundaries() {
        let cfg: RasterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RasterConfig::default());
        assert_eq!(cfg.layout, MaskLayout::LaneBoundary);
        let cfg: RasterConfig = serde_json::from_str(r#"{"layout": "typed"}"#).unwrap();
        assert_eq!(cfg.layout, MaskLayout::Typed);
    }

    #[test]
    fn json_round_trip() {
        let cfg = RasterConfig::default().with_accessory_as_marker(true);
        let text = serde_json::to_string(&cfg).unwrap();
        assert_eq!(serde_json::from_str::<RasterConfig>(&text).unwrap(), cfg);
    }

    #[test]
    fn boundary_width() {
        assert_relative_eq!(RasterConfig::default().boundary_half_width(1280), 5.0);
    }
}
