//! `heartrisk-datasets` loads tabular study data from CSV files and summarises it.
//!
//! ## The Big Picture
//!
//! The analysis works on a single numeric table. This crate reads it from a plain or gzipped CSV
//! file into a [`Table`], where missing cells are NaN, offers the column operations needed for
//! cleaning and descriptive statistics in the style of a data frame `describe()`, and finally
//! turns the table into a [`heartrisk::Dataset`] with named features.
//!
//! ## Using a dataset
//!
//! ```ignore
//! let table = heartrisk_datasets::framingham("framingham.csv")?
//!     .drop_columns(&["education"])?;
//! println!("{}", table.describe());
//!
//! let dataset = table.into_dataset("TenYearCHD")?;
//! ```

mod error;
mod summary;
mod table;

use std::path::Path;

pub use error::{Error, Result};
pub use summary::{describe_records, missing_counts, value_counts, ColumnSummary, Description};
pub use table::Table;

/// Name of the class label column of the Framingham study
pub const FRAMINGHAM_TARGET: &str = "TenYearCHD";

/// Columns of the Framingham heart study table
pub const FRAMINGHAM_COLUMNS: [&str; 16] = [
    "male",
    "age",
    "education",
    "currentSmoker",
    "cigsPerDay",
    "BPMeds",
    "prevalentStroke",
    "prevalentHyp",
    "diabetes",
    "totChol",
    "sysBP",
    "diaBP",
    "BMI",
    "heartRate",
    "glucose",
    FRAMINGHAM_TARGET,
];

/// Read in the Framingham heart study table from a CSV file
///
/// Fails if one of the [`FRAMINGHAM_COLUMNS`] is absent. Additional columns are kept.
pub fn framingham<P: AsRef<Path>>(path: P) -> Result<Table> {
    let table = Table::from_path(path)?;

    for name in FRAMINGHAM_COLUMNS.iter() {
        if table.column_index(name).is_err() {
            return Err(Error::MissingColumn(name.to_string()));
        }
    }
    log::info!(
        "loaded Framingham table with {} rows and {} columns",
        table.nrows(),
        table.ncols()
    );

    Ok(table)
}
