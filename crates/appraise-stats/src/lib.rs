//! Descriptive statistics used by the exploratory half of the appraise pipeline.
//!
//! - [`CorrelationMatrix`]: pairwise-complete Pearson correlation over named columns
//! - [`Histogram`]: equal-width binning over the observed range
//! - [`TrendLine`]: ordinary least-squares line fit
//! - [`Summary`]: five-number style column summary

mod correlation;
mod descriptive;
mod error;
mod histogram;
mod trend;

pub use correlation::{CorrelationMatrix, pearson};
pub use descriptive::Summary;
pub use error::StatsError;
pub use histogram::{Histogram, HistogramBin};
pub use trend::TrendLine;
