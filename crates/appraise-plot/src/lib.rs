//! Static PNG charts for exploratory analysis and model evaluation.
//!
//! All charts are written by a [`ChartRenderer`] into one output directory
//! using a shared [`ChartStyle`].

mod error;
mod evaluation;
mod exploratory;
mod palette;
mod renderer;
mod style;

pub use error::PlotError;
pub use renderer::{
    ACTUAL_VS_PREDICTED_FILE, CORRELATION_FILE, ChartRenderer, DISTRIBUTION_FILE,
    FEATURE_IMPORTANCE_FILE, RESIDUALS_FILE,
};
pub use style::ChartStyle;
