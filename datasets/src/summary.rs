//! Descriptive statistics of record matrices
//!
//! Missing values are encoded as NaN and skipped by every summary, the way a data frame
//! `describe()` would treat them.
use ndarray::{Array1, ArrayBase, Axis, Data, Ix2};
use std::fmt;

/// Summary statistics of the observed values of a single column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (one delta degree of freedom)
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarise the values of a column, skipping NaN
    ///
    /// Statistics of a column without observed values are NaN, the standard deviation of a single
    /// observation as well.
    pub fn from_values<'a, I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let mut observed = values
            .into_iter()
            .copied()
            .filter(|x| !x.is_nan())
            .collect::<Vec<_>>();
        observed.sort_by(|a, b| a.total_cmp(b));

        let count = observed.len();
        let name = name.into();
        if count == 0 {
            return ColumnSummary {
                name,
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mean = observed.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ssd = observed.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
            (ssd / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        ColumnSummary {
            name,
            count,
            mean,
            std,
            min: observed[0],
            q25: quantile(&observed, 0.25),
            median: quantile(&observed, 0.5),
            q75: quantile(&observed, 0.75),
            max: observed[count - 1],
        }
    }

    fn stats(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.stats().iter() {
            writeln!(f, "{:<8}{:>16.6}", label, value)?;
        }
        write!(f, "Name: {}", self.name)
    }
}

/// Linear interpolation between the closest ranks of a sorted slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);

    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Summaries of all columns of a table
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    columns: Vec<ColumnSummary>,
}

impl Description {
    pub fn columns(&self) -> &[ColumnSummary] {
        &self.columns
    }

    /// Look up the summary of a column by name
    pub fn get(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|x| x.name == name)
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .columns
            .iter()
            .map(|x| x.name.len())
            .max()
            .unwrap_or(0);

        write!(f, "{:width$}", "", width = width)?;
        for label in &["count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
            write!(f, "{:>14}", label)?;
        }

        for summary in &self.columns {
            write!(f, "\n{:width$}", summary.name, width = width)?;
            for (_, value) in summary.stats().iter() {
                write!(f, "{:>14.4}", value)?;
            }
        }

        Ok(())
    }
}

/// Summarise every column of a record matrix
///
/// `names` labels the columns in order and must have one entry per column.
pub fn describe_records<S: AsRef<str>, D: Data<Elem = f64>>(
    names: &[S],
    records: &ArrayBase<D, Ix2>,
) -> Description {
    debug_assert_eq!(names.len(), records.ncols());

    let columns = names
        .iter()
        .zip(records.axis_iter(Axis(1)))
        .map(|(name, column)| ColumnSummary::from_values(name.as_ref(), column.iter()))
        .collect();

    Description { columns }
}

/// Count the missing (NaN) entries of every column
pub fn missing_counts<D: Data<Elem = f64>>(records: &ArrayBase<D, Ix2>) -> Array1<usize> {
    records
        .axis_iter(Axis(1))
        .map(|column| column.iter().filter(|x| x.is_nan()).count())
        .collect()
}

/// Count the occurrences of every observed value
///
/// Sorted by descending count, ties by ascending value. Missing values are not counted.
pub fn value_counts<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> Vec<(f64, usize)> {
    let mut observed = values
        .into_iter()
        .copied()
        .filter(|x| !x.is_nan())
        .collect::<Vec<_>>();
    observed.sort_by(|a, b| a.total_cmp(b));

    let mut counts: Vec<(f64, usize)> = Vec::new();
    for value in observed {
        match counts.last_mut() {
            Some((last, n)) if *last == value => *n += 1,
            _ => counts.push((value, 1)),
        }
    }
    // stable sort keeps ascending values among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn summary_skips_missing_values() {
        let values = [1., f64::NAN, 2., 3., 4., f64::NAN];
        let summary = ColumnSummary::from_values("glucose", values.iter());

        assert_eq!(summary.count, 4);
        assert_abs_diff_eq!(summary.mean, 2.5);
        // sample standard deviation of 1..4
        assert_abs_diff_eq!(summary.std, 1.2909944487358056, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.min, 1.);
        assert_abs_diff_eq!(summary.q25, 1.75);
        assert_abs_diff_eq!(summary.median, 2.5);
        assert_abs_diff_eq!(summary.q75, 3.25);
        assert_abs_diff_eq!(summary.max, 4.);
    }

    #[test]
    fn summary_of_empty_column_is_nan() {
        let values = [f64::NAN, f64::NAN];
        let summary = ColumnSummary::from_values("BMI", values.iter());

        assert_eq!(summary.count, 0);
        assert!(summary.mean.is_nan());
        assert!(summary.max.is_nan());

        let single = ColumnSummary::from_values("BMI", [26.97].iter());
        assert_abs_diff_eq!(single.median, 26.97);
        assert!(single.std.is_nan());
    }

    #[test]
    fn describe_and_missing_counts() {
        let records = array![[1., f64::NAN], [2., 5.], [3., f64::NAN]];
        let description = describe_records(&["age", "glucose"], &records);

        assert_eq!(description.columns().len(), 2);
        assert_eq!(description.get("glucose").unwrap().count, 1);
        assert_abs_diff_eq!(description.get("age").unwrap().mean, 2.);
        assert!(description.get("sysBP").is_none());

        assert_eq!(missing_counts(&records), array![0, 2]);

        let rendered = description.to_string();
        assert!(rendered.lines().next().unwrap().contains("count"));
        assert!(rendered.contains("glucose"));
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn value_counts_sorted_by_count_then_value() {
        let values = [1., 0., 0., f64::NAN, 2., 1., 0., 2.];
        assert_eq!(
            value_counts(values.iter()),
            vec![(0., 3), (1., 2), (2., 2)]
        );
    }
}
