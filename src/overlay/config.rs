use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::Deserialize;

use crate::error::OverlayError;

/// Tunables for clustering, drawing and hit-testing.
///
/// Pixel quantities are in surface pixels. The defaults match a canvas at
/// screen resolution; [`OverlayConfig::terminal`] rescales them for braille
/// dots.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Visible flight count at which clustering may start
    pub cluster_threshold: usize,
    /// Clustering only happens below this zoom level
    pub cluster_zoom_cutoff: f64,
    /// Grid cell edge at the cutoff zoom
    pub grid_cell_px: f64,
    /// Relative cell growth per zoom level below the cutoff
    pub grid_zoom_scale: f64,
    pub cluster_radius_base: f64,
    /// Radius added per natural-log unit of member count
    pub cluster_radius_growth: f64,
    pub cluster_radius_max: f64,
    /// Member counts below this use the low band color
    pub cluster_band_medium: usize,
    /// Member counts at or above this use the high band color
    pub cluster_band_high: usize,
    /// Maximum pointer distance from a marker that still selects it
    pub click_tolerance_px: f64,
    /// Padding kept around a cluster's bounds when zooming to it
    pub zoom_padding_px: f64,
    /// Glyph edge for unselected markers at the reference zoom
    pub marker_size_px: f64,
    pub selected_marker_size_px: f64,
    /// Glyph scale change per zoom level away from `glyph_zoom_reference`
    pub glyph_zoom_gain: f64,
    pub glyph_zoom_reference: f64,
    pub glyph_scale_min: f64,
    pub glyph_scale_max: f64,
    pub marker_shadow: bool,
    pub marker_color: [u8; 3],
    pub selected_color: [u8; 3],
    pub shadow_color: [u8; 3],
    pub cluster_low_color: [u8; 3],
    pub cluster_medium_color: [u8; 3],
    pub cluster_high_color: [u8; 3],
    pub cluster_label_color: [u8; 3],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            cluster_threshold: 100,
            cluster_zoom_cutoff: 7.0,
            grid_cell_px: 60.0,
            grid_zoom_scale: 0.35,
            cluster_radius_base: 12.0,
            cluster_radius_growth: 5.0,
            cluster_radius_max: 40.0,
            cluster_band_medium: 10,
            cluster_band_high: 100,
            click_tolerance_px: 20.0,
            zoom_padding_px: 40.0,
            marker_size_px: 22.0,
            selected_marker_size_px: 26.0,
            glyph_zoom_gain: 0.08,
            glyph_zoom_reference: 5.0,
            glyph_scale_min: 0.7,
            glyph_scale_max: 1.4,
            marker_shadow: true,
            marker_color: [0xfa, 0xcc, 0x15],
            selected_color: [0xdc, 0x26, 0x26],
            shadow_color: [0x11, 0x11, 0x11],
            cluster_low_color: [0x22, 0xc5, 0x5e],
            cluster_medium_color: [0xea, 0xb3, 0x08],
            cluster_high_color: [0xef, 0x44, 0x44],
            cluster_label_color: [0x0b, 0x0b, 0x0b],
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

impl OverlayConfig {
    /// Preset for braille surfaces, where one terminal cell is 2x4 dots
    pub fn terminal() -> Self {
        Self {
            cluster_zoom_cutoff: 5.0,
            grid_cell_px: 16.0,
            cluster_radius_base: 3.0,
            cluster_radius_growth: 1.2,
            cluster_radius_max: 9.0,
            click_tolerance_px: 6.0,
            zoom_padding_px: 8.0,
            marker_size_px: 7.0,
            selected_marker_size_px: 9.0,
            glyph_zoom_reference: 3.0,
            marker_shadow: false,
            ..Self::default()
        }
    }

    /// Load from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, OverlayError> {
        let mut bytes = fs::read(path)?;
        Self::from_json_slice(&mut bytes)
    }

    pub fn from_json_slice(bytes: &mut [u8]) -> Result<Self, OverlayError> {
        let config: Self = simd_json::serde::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the grid, radii or tolerance meaningless
    pub fn validate(&self) -> Result<(), OverlayError> {
        let positive = [
            ("grid_cell_px", self.grid_cell_px),
            ("cluster_radius_max", self.cluster_radius_max),
            ("marker_size_px", self.marker_size_px),
            ("selected_marker_size_px", self.selected_marker_size_px),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(OverlayError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("grid_zoom_scale", self.grid_zoom_scale),
            ("cluster_radius_base", self.cluster_radius_base),
            ("cluster_radius_growth", self.cluster_radius_growth),
            ("click_tolerance_px", self.click_tolerance_px),
            ("zoom_padding_px", self.zoom_padding_px),
            ("glyph_zoom_gain", self.glyph_zoom_gain),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(OverlayError::InvalidConfig(format!("{name} must be >= 0, got {value}")));
            }
        }

        if self.cluster_threshold == 0 {
            return Err(OverlayError::InvalidConfig("cluster_threshold must be at least 1".into()));
        }
        if !self.cluster_zoom_cutoff.is_finite() {
            return Err(OverlayError::InvalidConfig("cluster_zoom_cutoff must be finite".into()));
        }
        if self.cluster_band_medium > self.cluster_band_high {
            return Err(OverlayError::InvalidConfig(format!(
                "cluster_band_medium ({}) exceeds cluster_band_high ({})",
                self.cluster_band_medium, self.cluster_band_high
            )));
        }
        if !(self.glyph_scale_min > 0.0 && self.glyph_scale_min <= self.glyph_scale_max) {
            return Err(OverlayError::InvalidConfig(format!(
                "glyph scale range [{}, {}] is empty",
                self.glyph_scale_min, self.glyph_scale_max
            )));
        }
        Ok(())
    }

    /// Grid cell edge for a zoom level; cells coarsen as zoom drops below the cutoff
    pub fn grid_cell_size(&self, zoom: f64) -> f64 {
        let levels_below = (self.cluster_zoom_cutoff - zoom).max(0.0);
        self.grid_cell_px * (1.0 + self.grid_zoom_scale * levels_below)
    }

    /// Badge radius: logarithmic in member count, capped
    pub fn cluster_radius(&self, count: usize) -> f64 {
        let grown = self.cluster_radius_base + self.cluster_radius_growth * (count.max(1) as f64).ln();
        grown.min(self.cluster_radius_max)
    }

    /// Fill color banded by member count
    pub fn cluster_color(&self, count: usize) -> Color {
        if count >= self.cluster_band_high {
            rgb(self.cluster_high_color)
        } else if count >= self.cluster_band_medium {
            rgb(self.cluster_medium_color)
        } else {
            rgb(self.cluster_low_color)
        }
    }

    /// Glyph edge in pixels for a marker at `zoom`
    pub fn marker_size(&self, zoom: f64, selected: bool) -> f64 {
        let base = if selected {
            self.selected_marker_size_px
        } else {
            self.marker_size_px
        };
        let scale = (1.0 + self.glyph_zoom_gain * (zoom - self.glyph_zoom_reference))
            .clamp(self.glyph_scale_min, self.glyph_scale_max);
        base * scale
    }

    pub fn marker_color(&self, selected: bool) -> Color {
        if selected {
            rgb(self.selected_color)
        } else {
            rgb(self.marker_color)
        }
    }

    pub fn shadow_color(&self) -> Color {
        rgb(self.shadow_color)
    }

    pub fn cluster_label_color(&self) -> Color {
        rgb(self.cluster_label_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(OverlayConfig::default().validate().is_ok());
        assert!(OverlayConfig::terminal().validate().is_ok());
    }

    #[test]
    fn test_cells_coarsen_below_cutoff() {
        let config = OverlayConfig::default();
        assert_eq!(config.grid_cell_size(7.0), 60.0);
        assert_eq!(config.grid_cell_size(9.0), 60.0);
        assert!(config.grid_cell_size(3.0) > config.grid_cell_size(5.0));
    }

    #[test]
    fn test_cluster_radius_monotonic_and_capped() {
        let config = OverlayConfig::default();
        let mut last = 0.0;
        for count in [2, 5, 20, 100, 1000] {
            let r = config.cluster_radius(count);
            assert!(r >= last);
            last = r;
        }
        assert_eq!(config.cluster_radius(1_000_000), config.cluster_radius_max);
    }

    #[test]
    fn test_cluster_color_bands() {
        let config = OverlayConfig::default();
        assert_eq!(config.cluster_color(2), rgb(config.cluster_low_color));
        assert_eq!(config.cluster_color(10), rgb(config.cluster_medium_color));
        assert_eq!(config.cluster_color(99), rgb(config.cluster_medium_color));
        assert_eq!(config.cluster_color(100), rgb(config.cluster_high_color));
    }

    #[test]
    fn test_marker_size_varies_gently() {
        let config = OverlayConfig::default();
        assert_eq!(config.marker_size(5.0, false), 22.0);
        assert_eq!(config.marker_size(5.0, true), 26.0);
        assert!(config.marker_size(2.0, false) < 22.0);
        assert_eq!(config.marker_size(50.0, false), 22.0 * config.glyph_scale_max);
    }

    #[test]
    fn test_json_partial_override() {
        let mut json = br#"{"cluster_threshold": 250, "click_tolerance_px": 12.5}"#.to_vec();
        let config = OverlayConfig::from_json_slice(&mut json).unwrap();
        assert_eq!(config.cluster_threshold, 250);
        assert_eq!(config.click_tolerance_px, 12.5);
        assert_eq!(config.grid_cell_px, 60.0);
    }

    #[test]
    fn test_json_rejects_invalid() {
        let mut json = br#"{"grid_cell_px": 0}"#.to_vec();
        assert!(matches!(
            OverlayConfig::from_json_slice(&mut json),
            Err(OverlayError::InvalidConfig(_))
        ));
        let mut garbage = b"{not json".to_vec();
        assert!(matches!(
            OverlayConfig::from_json_slice(&mut garbage),
            Err(OverlayError::Parse(_))
        ));
    }
}
