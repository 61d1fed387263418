//! Shared chart dimensions and font sizes.

use crate::PlotError;

const BASE_HEIGHT: u32 = 1800;

/// Size and typography shared by every chart.
///
/// Font and marker sizes are given for an 1800 px tall canvas and scale
/// with the configured height.
///
/// # Defaults
///
/// | Parameter      | Default |
/// |----------------|---------|
/// | `width`        | 2400    |
/// | `height`       | 1800    |
/// | `caption_size` | 64      |
/// | `label_size`   | 36      |
/// | `point_size`   | 9       |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartStyle {
    width: u32,
    height: u32,
    caption_size: u32,
    label_size: u32,
    point_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 2400,
            height: BASE_HEIGHT,
            caption_size: 64,
            label_size: 36,
            point_size: 9,
        }
    }
}

impl ChartStyle {
    /// Create a style for a `width x height` pixel canvas.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, PlotError> {
        if width == 0 || height == 0 {
            return Err(PlotError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_caption_size(mut self, size: u32) -> Self {
        self.caption_size = size;
        self
    }

    #[must_use]
    pub fn with_label_size(mut self, size: u32) -> Self {
        self.label_size = size;
        self
    }

    #[must_use]
    pub fn with_point_size(mut self, size: u32) -> Self {
        self.point_size = size;
        self
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Caption font size at the configured height.
    #[must_use]
    pub fn caption_size(&self) -> f64 {
        f64::from(self.scaled(self.caption_size))
    }

    /// Axis label font size at the configured height.
    #[must_use]
    pub fn label_size(&self) -> f64 {
        f64::from(self.scaled(self.label_size))
    }

    /// Scatter marker radius at the configured height.
    #[must_use]
    pub fn point_size(&self) -> u32 {
        self.scaled(self.point_size)
    }

    /// Stroke width for reference and trend lines.
    pub(crate) fn line_width(&self) -> u32 {
        self.scaled(4)
    }

    /// Pixel margin around the plotting area.
    pub(crate) fn margin(&self) -> u32 {
        self.scaled(40)
    }

    /// Pixel room reserved for axis tick labels.
    pub(crate) fn label_area(&self) -> u32 {
        self.scaled(140)
    }

    /// Pixel room reserved for category names (heatmap and bar chart).
    pub(crate) fn category_area(&self) -> u32 {
        self.scaled(480)
    }

    fn scaled(&self, size: u32) -> u32 {
        (u64::from(size) * u64::from(self.height) / u64::from(BASE_HEIGHT)).max(1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_eight_by_six_inches_at_300_dpi() {
        let style = ChartStyle::default();
        assert_eq!(style.dimensions(), (2400, 1800));
        assert_eq!(style.caption_size(), 64.0);
        assert_eq!(style.point_size(), 9);
    }

    #[test]
    fn sizes_scale_with_height() {
        let style = ChartStyle::new(800, 600).unwrap();
        assert_eq!(style.dimensions(), (800, 600));
        assert_eq!(style.label_size(), 12.0);
        assert_eq!(style.point_size(), 3);
        assert_eq!(style.margin(), 13);
    }

    #[test]
    fn tiny_canvas_keeps_sizes_positive() {
        let style = ChartStyle::new(10, 10).unwrap().with_point_size(1);
        assert_eq!(style.point_size(), 1);
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(matches!(
            ChartStyle::new(0, 100),
            Err(PlotError::InvalidDimensions { width: 0, height: 100 })
        ));
    }
}
