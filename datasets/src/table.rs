use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use flate2::read::GzDecoder;
use heartrisk::Dataset;
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{Error, Result};
use crate::summary::{self, ColumnSummary, Description};

/// Rows printed from each end of a table before eliding the middle
const DISPLAY_EDGE: usize = 5;

/// A numeric table with named columns
///
/// Cells are stored row major in an `Array2<f64>`. Missing cells are represented as NaN, so the
/// table can be handed to imputation and summaries without another encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    values: Array2<f64>,
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("na")
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
}

impl Table {
    /// Create a table from column names and values
    ///
    /// Column names must be unique and match the number of columns.
    pub fn new<I: Into<String>>(columns: Vec<I>, values: Array2<f64>) -> Result<Table> {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<String>>();
        if columns.len() != values.ncols() {
            return Err(Error::ColumnCount(columns.len(), values.ncols()));
        }

        let mut seen = HashSet::new();
        if let Some(name) = columns.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(Error::DuplicateColumn(name.clone()));
        }

        Ok(Table { columns, values })
    }

    /// Parse a comma separated table with a header row
    ///
    /// Empty cells and `NA`, `NaN` or `null` (in any case) are read as missing values.
    pub fn from_csv<R: Read>(reader: R) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .trim(Trim::All)
            .from_reader(reader);

        let columns = reader
            .headers()?
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>();

        let mut cells = Vec::new();
        let mut nrows = 0;
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            for (cell, column) in record.iter().zip(columns.iter()) {
                let value = if is_missing(cell) {
                    f64::NAN
                } else {
                    cell.parse::<f64>().map_err(|_| Error::InvalidValue {
                        value: cell.to_string(),
                        column: column.clone(),
                        line,
                    })?
                };
                cells.push(value);
            }
            nrows += 1;
        }

        let values = Array2::from_shape_vec((nrows, columns.len()), cells)?;
        log::debug!("parsed table with {} rows and {} columns", nrows, columns.len());

        Table::new(columns, values)
    }

    /// Read a table from a CSV file, decompressing it first if the name ends with `.gz`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Table> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().map_or(false, |ext| ext == "gz") {
            Table::from_csv(GzDecoder::new(file))
        } else {
            Table::from_csv(file)
        }
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Number of rows and columns
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|x| x == name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    /// Returns a view of the values in a named column
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self.column_index(name)?;

        Ok(self.values.column(idx))
    }

    /// Returns a table with the first `n` rows
    pub fn head(&self, n: usize) -> Table {
        let n = n.min(self.nrows());

        Table {
            columns: self.columns.clone(),
            values: self.values.slice(ndarray::s![..n, ..]).to_owned(),
        }
    }

    /// Returns a table with the named columns, in the order given
    pub fn select_columns(&self, names: &[&str]) -> Result<Table> {
        let indices = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<_>>>()?;

        Table::new(
            names.to_vec(),
            self.values.select(Axis(1), &indices),
        )
    }

    /// Remove the named columns
    pub fn drop_columns(self, names: &[&str]) -> Result<Table> {
        let dropped = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<HashSet<_>>>()?;

        let kept = (0..self.ncols())
            .filter(|idx| !dropped.contains(idx))
            .collect::<Vec<_>>();

        Ok(Table {
            columns: kept.iter().map(|idx| self.columns[*idx].clone()).collect(),
            values: self.values.select(Axis(1), &kept),
        })
    }

    /// Rename a column in place
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let idx = self.column_index(from)?;
        if from != to && self.columns.iter().any(|x| x == to) {
            return Err(Error::DuplicateColumn(to.to_string()));
        }
        self.columns[idx] = to.to_string();

        Ok(())
    }

    /// Number of missing values per column
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .cloned()
            .zip(summary::missing_counts(&self.values))
            .collect()
    }

    /// Number of rows with at least one missing value
    pub fn rows_with_missing(&self) -> usize {
        self.values
            .rows()
            .into_iter()
            .filter(|row| row.iter().any(|x| x.is_nan()))
            .count()
    }

    /// Percentage of rows with at least one missing value
    pub fn missing_proportion(&self) -> f64 {
        if self.nrows() == 0 {
            return 0.0;
        }

        100.0 * self.rows_with_missing() as f64 / self.nrows() as f64
    }

    pub fn describe(&self) -> Description {
        summary::describe_records(&self.columns, &self.values)
    }

    pub fn column_summary(&self, name: &str) -> Result<ColumnSummary> {
        let column = self.column(name)?;

        Ok(ColumnSummary::from_values(name, column.iter()))
    }

    /// Occurrences of every observed value of a column
    pub fn value_counts(&self, name: &str) -> Result<Vec<(f64, usize)>> {
        let column = self.column(name)?;

        Ok(summary::value_counts(column.iter()))
    }

    /// Split off `target` as class labels and keep the other columns as named records
    pub fn into_dataset(self, target: &str) -> Result<Dataset<f64, usize>> {
        let target_idx = self.column_index(target)?;

        let targets = self
            .values
            .column(target_idx)
            .iter()
            .enumerate()
            .map(|(row, value)| {
                if value.is_nan() {
                    Err(Error::MissingTarget(row))
                } else if *value < 0.0 || value.fract() != 0.0 {
                    Err(Error::InvalidTarget { row, value: *value })
                } else {
                    Ok(*value as usize)
                }
            })
            .collect::<Result<Array1<usize>>>()?;

        let kept = (0..self.ncols())
            .filter(|idx| *idx != target_idx)
            .collect::<Vec<_>>();
        let records = self.values.select(Axis(1), &kept);
        let feature_names = kept
            .iter()
            .map(|idx| self.columns[*idx].clone())
            .collect::<Vec<_>>();

        Ok(Dataset::new(records, targets).with_feature_names(feature_names))
    }

    fn fmt_row(&self, f: &mut fmt::Formatter<'_>, idx: usize, widths: &[usize]) -> fmt::Result {
        write!(f, "\n{:<6}", idx)?;
        for (value, width) in self.values.row(idx).iter().zip(widths) {
            write!(f, " {:>width$}", value, width = width)?;
        }

        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self
            .columns
            .iter()
            .map(|name| name.len().max(8))
            .collect::<Vec<_>>();

        write!(f, "{:<6}", "")?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, " {:>width$}", name, width = width)?;
        }

        let nrows = self.nrows();
        if nrows <= 2 * DISPLAY_EDGE {
            for idx in 0..nrows {
                self.fmt_row(f, idx, &widths)?;
            }
        } else {
            for idx in 0..DISPLAY_EDGE {
                self.fmt_row(f, idx, &widths)?;
            }
            write!(f, "\n{:<6}", "...")?;
            for idx in nrows - DISPLAY_EDGE..nrows {
                self.fmt_row(f, idx, &widths)?;
            }
        }

        write!(f, "\n\n[{} rows x {} columns]", nrows, self.ncols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    const CSV: &str = "male,age,glucose,TenYearCHD\n\
                       1,39,77,0\n\
                       0,46,NA,0\n\
                       1,48,,1\n\
                       0,61,103,1\n";

    #[test]
    fn parses_missing_cells_as_nan() {
        let table = Table::from_csv(CSV.as_bytes()).unwrap();

        assert_eq!(table.shape(), (4, 4));
        assert_eq!(table.column_names(), &["male", "age", "glucose", "TenYearCHD"]);
        assert!(table.values()[(1, 2)].is_nan());
        assert!(table.values()[(2, 2)].is_nan());
        assert_abs_diff_eq!(table.values()[(3, 2)], 103.);

        assert_eq!(table.rows_with_missing(), 2);
        assert_abs_diff_eq!(table.missing_proportion(), 50.);
        assert_eq!(
            table.null_counts(),
            vec![
                ("male".to_string(), 0),
                ("age".to_string(), 0),
                ("glucose".to_string(), 2),
                ("TenYearCHD".to_string(), 0)
            ]
        );
    }

    #[test]
    fn rejects_non_numeric_cells() {
        let csv = "age,glucose\n39,77\n46,high\n";
        match Table::from_csv(csv.as_bytes()) {
            Err(Error::InvalidValue {
                value,
                column,
                line,
            }) => {
                assert_eq!(value, "high");
                assert_eq!(column, "glucose");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejects_ragged_rows() {
        let csv = "age,glucose\n39,77\n46\n";
        assert!(matches!(Table::from_csv(csv.as_bytes()), Err(Error::Csv(_))));
    }

    #[test]
    fn column_operations() {
        let mut table = Table::from_csv(CSV.as_bytes()).unwrap();
        table.rename_column("male", "Male(Y/N)").unwrap();
        assert!(table.rename_column("education", "x").is_err());
        assert!(matches!(
            table.rename_column("age", "glucose"),
            Err(Error::DuplicateColumn(_))
        ));

        let table = table.drop_columns(&["glucose"]).unwrap();
        assert_eq!(table.column_names(), &["Male(Y/N)", "age", "TenYearCHD"]);
        assert_eq!(table.column("age").unwrap().to_vec(), vec![39., 46., 48., 61.]);

        let selected = table.select_columns(&["TenYearCHD", "age"]).unwrap();
        assert_eq!(selected.column_names(), &["TenYearCHD", "age"]);
        assert!(matches!(
            table.select_columns(&["BMI"]),
            Err(Error::UnknownColumn(name)) if name == "BMI"
        ));

        assert_eq!(table.head(2).nrows(), 2);
        assert_eq!(table.head(10).nrows(), 4);
        assert_eq!(
            table.value_counts("TenYearCHD").unwrap(),
            vec![(0., 2), (1., 2)]
        );
    }

    #[test]
    fn into_dataset_splits_target() {
        let table = Table::from_csv(CSV.as_bytes()).unwrap();
        let dataset = table.into_dataset("TenYearCHD").unwrap();

        assert_eq!(dataset.feature_names(), vec!["male", "age", "glucose"]);
        assert_eq!(dataset.targets().to_vec(), vec![0, 0, 1, 1]);
        assert_eq!(dataset.records().dim(), (4, 3));

        let broken = Table::from_csv("age,TenYearCHD\n39,0\n46,NA\n".as_bytes()).unwrap();
        assert!(matches!(
            broken.into_dataset("TenYearCHD"),
            Err(Error::MissingTarget(1))
        ));

        let broken = Table::from_csv("age,TenYearCHD\n39,0.5\n".as_bytes()).unwrap();
        assert!(matches!(
            broken.into_dataset("TenYearCHD"),
            Err(Error::InvalidTarget { row: 0, .. })
        ));
    }

    #[test]
    fn display_elides_long_tables() {
        let values = Array2::from_shape_fn((12, 2), |(i, j)| (i * 10 + j) as f64);
        let table = Table::new(vec!["a", "b"], values).unwrap();
        let rendered = table.to_string();

        assert!(rendered.contains("..."));
        assert!(rendered.ends_with("[12 rows x 2 columns]"));
        // header, ten rows, ellipsis, blank line and shape
        assert_eq!(rendered.lines().count(), 14);

        assert!(matches!(
            Table::new(vec!["a", "a"], Array2::zeros((1, 2))),
            Err(Error::DuplicateColumn(_))
        ));
        assert!(matches!(
            Table::new(vec!["a"], Array2::zeros((1, 2))),
            Err(Error::ColumnCount(1, 2))
        ));
    }

    #[test]
    fn reads_plain_and_gzipped_files() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("framingham.csv");
        std::fs::write(&plain, CSV).unwrap();
        let table = Table::from_path(&plain).unwrap();
        assert_eq!(table.shape(), (4, 4));

        let gzipped = dir.path().join("framingham.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&gzipped).unwrap(), Compression::default());
        encoder.write_all(CSV.as_bytes()).unwrap();
        encoder.finish().unwrap();
        let unzipped = Table::from_path(&gzipped).unwrap();
        assert_eq!(unzipped.column_names(), table.column_names());
        assert_eq!(unzipped.null_counts(), table.null_counts());
        assert_eq!(unzipped.column("age").unwrap(), table.column("age").unwrap());

        let missing = dir.path().join("missing.csv");
        assert!(matches!(Table::from_path(&missing), Err(Error::Io { .. })));
    }
}
