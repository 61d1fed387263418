//! Random Forest regression: train, evaluate, predict.
//!
//! Provides a hand-rolled Random Forest regressor with CART decision trees
//! split on squared-error reduction, parallel training via rayon, out-of-bag
//! evaluation, impurity and permutation feature importance, and hold-out
//! regression metrics (RMSE, MAE, R²).

mod config;
mod error;
mod forest;
mod importance;
mod metrics;
mod node;
mod oob;
mod perm_importance;
mod predict;
mod result;
mod split;
mod tree;

pub use config::{MaxFeatures, OobMode, RandomForestConfig};
pub use error::RfError;
pub use forest::RandomForest;
pub use importance::RankedFeature;
pub use metrics::RegressionMetrics;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use oob::OobScore;
pub use perm_importance::PermutationImportance;
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::SplitMethod;
pub use tree::{DecisionTree, DecisionTreeConfig};
