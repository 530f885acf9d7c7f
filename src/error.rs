//! Error types in heartrisk
//!

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("mismatched shapes: {0} samples in predictions, {1} in ground truth")]
    MismatchedShapes(usize, usize),
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
    #[error("feature index {0} out of range for {1} features")]
    FeatureOutOfRange(usize, usize),
    #[error("ROC curve needs both positive and negative samples")]
    SingleClass,
}
