//! Output directory handling and the shared render path.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::error::BackendError;
use crate::{ChartStyle, PlotError};

/// Correlation heatmap of every column.
pub const CORRELATION_FILE: &str = "correlation_matrix.png";
/// Histogram of the target column.
pub const DISTRIBUTION_FILE: &str = "home_value_distribution.png";
/// Actual against predicted scatter.
pub const ACTUAL_VS_PREDICTED_FILE: &str = "actual_vs_predicted.png";
/// Residuals against predicted scatter.
pub const RESIDUALS_FILE: &str = "residual_analysis.png";
/// Permutation importance bar chart.
pub const FEATURE_IMPORTANCE_FILE: &str = "feature_importance.png";

pub(crate) type DrawResult = Result<(), BackendError>;
pub(crate) type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Renders charts as PNG files into one output directory.
///
/// Creates the output directory on construction if it does not exist.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
    style: ChartStyle,
}

impl ChartRenderer {
    /// Create a renderer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::OutputDirCreate`] if the directory cannot be created.
    pub fn new(output_dir: &Path, style: ChartStyle) -> Result<Self, PlotError> {
        fs::create_dir_all(output_dir).map_err(|e| PlotError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            style,
        })
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    /// Draw onto a fresh white canvas and write it to `file`.
    pub(crate) fn render<F>(&self, file: &str, draw: F) -> Result<PathBuf, PlotError>
    where
        F: FnOnce(&Canvas<'_>) -> DrawResult,
    {
        let path = self.output_dir.join(file);
        draw_to(&path, self.style.dimensions(), draw).map_err(|source| PlotError::Render {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "chart written");
        Ok(path)
    }
}

fn draw_to<F>(path: &Path, size: (u32, u32), draw: F) -> DrawResult
where
    F: FnOnce(&Canvas<'_>) -> DrawResult,
{
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    draw(&root)?;
    root.present()?;
    debug!(width = size.0, height = size.1, "canvas presented");
    Ok(())
}

/// Padded `[lo, hi]` covering every finite value in `series`.
pub(crate) fn padded_range<'a, I>(series: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let (lo, hi) = series
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    Some((lo - pad, hi + pad))
}
