//! Error definitions for preprocessing
use thiserror::Error;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    BaseCrate(#[from] heartrisk::Error),
    #[error("column `{0}` is configured more than once")]
    DuplicateColumn(String),
    #[error("constant fill value for column `{0}` must be finite")]
    InvalidFillValue(String),
    #[error("column `{0}` has no observed values to impute from")]
    NoObservedValues(String),
    #[error("not enough samples")]
    NotEnoughSamples,
}
