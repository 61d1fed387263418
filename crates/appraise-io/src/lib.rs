//! Dataset loading, validation, splitting, and report writing for the appraise pipeline.

mod dataset;
mod error;
mod reader;
mod split;
mod writer;

pub use dataset::{COLUMN_LABELS, HousingDataset, N_FEATURES, TARGET_COLUMN, label_for};
pub use error::IoError;
pub use reader::DatasetReader;
pub use split::{StratifiedSplit, TrainTestSplit};
pub use writer::{EVALUATION_FILE, ResultWriter};
