use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("invalid value `{value}` in column `{column}` on line {line}")]
    InvalidValue {
        value: String,
        column: String,
        line: u64,
    },
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("column `{0}` appears more than once")]
    DuplicateColumn(String),
    #[error("expected column `{0}` is missing from the table")]
    MissingColumn(String),
    #[error("got {0} column names for {1} columns")]
    ColumnCount(usize, usize),
    #[error("target column has a missing value on row {0}")]
    MissingTarget(usize),
    #[error("target value {value} on row {row} is not a class label")]
    InvalidTarget { row: usize, value: f64 },
    #[error(transparent)]
    NdShape(#[from] ndarray::ShapeError),
}
