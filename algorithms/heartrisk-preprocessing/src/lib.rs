//! # Preprocessing
//!
//! `heartrisk-preprocessing` prepares tabular records for model fitting. Currently it provides
//! [imputation](imputation/index.html) of missing values, encoded as NaN, with a per column
//! strategy learned from the observed values of a dataset.

pub mod error;
pub mod imputation;

pub use imputation::{ColumnFill, FittedImputer, ImputeStrategy, Imputer, ImputerValidParams};
