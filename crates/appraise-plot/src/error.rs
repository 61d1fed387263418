//! Error types for appraise-plot.

use std::path::PathBuf;

/// Boxed error raised by the drawing backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from chart configuration and rendering.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// Returned when a chart dimension is zero.
    #[error("invalid chart dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Returned when the output directory cannot be created.
    #[error("failed to create output directory: {path}")]
    OutputDirCreate {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a chart has nothing to draw.
    #[error("no data to draw for {chart}")]
    EmptySeries {
        /// Chart file name.
        chart: &'static str,
    },

    /// Returned when paired series differ in length.
    #[error("series length mismatch for {chart}: {left} vs {right}")]
    LengthMismatch {
        /// Chart file name.
        chart: &'static str,
        /// Length of the first series.
        left: usize,
        /// Length of the second series.
        right: usize,
    },

    /// Returned when the drawing backend fails, including file writes.
    #[error("failed to render {path}")]
    Render {
        /// Target image path.
        path: PathBuf,
        /// Backend error.
        source: BackendError,
    },
}
