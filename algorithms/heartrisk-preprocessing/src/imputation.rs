//! Missing value imputation
//!
//! Missing values are NaN entries of the record matrix. An [`Imputer`] learns one fill value per
//! configured column from the observed entries of a dataset and the fitted imputer replaces the
//! missing entries of these columns. Columns which are not configured are left untouched, so
//! missing values in them survive the transformation.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use heartrisk::dataset::DatasetBase;
use heartrisk::traits::{Fit, Transformer};
use heartrisk::{Float, ParamGuard};
use ndarray::{Array2, ArrayBase, Data, Ix2};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
/// Possible imputation strategies for a column
///
/// * Mean: arithmetic mean of the observed values
/// * Median: median of the observed values, averaging the middle pair for an even count
/// * Mode: most frequent observed value, the smallest one if several are equally frequent
/// * Constant: a fixed value, independent of the data
pub enum ImputeStrategy<F> {
    Mean,
    Median,
    Mode,
    Constant(F),
}

impl<F: fmt::Display> fmt::Display for ImputeStrategy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputeStrategy::Mean => write!(f, "mean"),
            ImputeStrategy::Median => write!(f, "median"),
            ImputeStrategy::Mode => write!(f, "mode"),
            ImputeStrategy::Constant(value) => write!(f, "constant ({})", value),
        }
    }
}

/// Checked imputation parameters: an ordered list of columns and their strategy
#[derive(Clone, Debug, PartialEq)]
pub struct ImputerValidParams<F> {
    columns: Vec<(String, ImputeStrategy<F>)>,
}

impl<F> ImputerValidParams<F> {
    pub fn columns(&self) -> &[(String, ImputeStrategy<F>)] {
        &self.columns
    }
}

/// Imputer: learns fill values for named columns from a dataset, producing a
/// [fitted imputer](struct.FittedImputer.html) which replaces missing values in records with the
/// same layout.
///
/// ### Example
///
/// ```ignore
/// use heartrisk::traits::{Fit, Transformer};
/// use heartrisk_preprocessing::Imputer;
///
/// let imputer = Imputer::params()
///     .mean("glucose")
///     .mode("BPMeds")
///     .fit(&dataset)?;
/// let dataset = imputer.transform(dataset);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Imputer<F>(ImputerValidParams<F>);

impl<F> Default for Imputer<F> {
    fn default() -> Self {
        Self::params()
    }
}

impl<F> Imputer<F> {
    /// Create an imputer without any configured column
    pub fn params() -> Self {
        Imputer(ImputerValidParams {
            columns: Vec::new(),
        })
    }

    /// Impute the column `name` with `strategy`
    pub fn column<S: Into<String>>(mut self, name: S, strategy: ImputeStrategy<F>) -> Self {
        self.0.columns.push((name.into(), strategy));
        self
    }

    /// Impute the column `name` with the mean of its observed values
    pub fn mean<S: Into<String>>(self, name: S) -> Self {
        self.column(name, ImputeStrategy::Mean)
    }

    /// Impute the column `name` with the most frequent of its observed values
    pub fn mode<S: Into<String>>(self, name: S) -> Self {
        self.column(name, ImputeStrategy::Mode)
    }
}

impl<F: Float> ParamGuard for Imputer<F> {
    type Checked = ImputerValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let mut seen = HashSet::new();
        for (name, strategy) in &self.0.columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateColumn(name.clone()));
            }
            if let ImputeStrategy::Constant(value) = strategy {
                if !value.is_finite() {
                    return Err(Error::InvalidFillValue(name.clone()));
                }
            }
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Fill value learned for a single column
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnFill<F> {
    pub name: String,
    pub index: usize,
    pub strategy: ImputeStrategy<F>,
    pub value: F,
}

impl<F: Float, D: Data<Elem = F>, T> Fit<ArrayBase<D, Ix2>, T, Error> for ImputerValidParams<F> {
    type Object = FittedImputer<F>;

    /// Resolves the configured columns against the feature names of the dataset and computes a
    /// fill value from the observed values of each of them. Will return an error if a column is
    /// unknown or, unless filled with a constant, has no observed value.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<FittedImputer<F>> {
        if dataset.nsamples() == 0 {
            return Err(Error::NotEnoughSamples);
        }

        let mut fills = Vec::with_capacity(self.columns.len());
        for (name, strategy) in &self.columns {
            let index = dataset.feature_index(name)?;
            let mut observed = dataset
                .records()
                .column(index)
                .iter()
                .copied()
                .filter(|x| !x.is_nan())
                .collect::<Vec<_>>();

            let value = match strategy {
                ImputeStrategy::Constant(value) => *value,
                _ if observed.is_empty() => return Err(Error::NoObservedValues(name.clone())),
                ImputeStrategy::Mean => mean(&observed),
                ImputeStrategy::Median => median(&mut observed),
                ImputeStrategy::Mode => mode(&mut observed),
            };

            log::debug!(
                "fill value of `{}` ({}, {} observed) is {}",
                name,
                strategy,
                observed.len(),
                value
            );

            fills.push(ColumnFill {
                name: name.clone(),
                index,
                strategy: strategy.clone(),
                value,
            });
        }

        Ok(FittedImputer { fills })
    }
}

fn mean<F: Float>(observed: &[F]) -> F {
    observed.iter().copied().sum::<F>() / F::cast(observed.len())
}

fn sort<F: Float>(observed: &mut [F]) {
    observed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

fn median<F: Float>(observed: &mut [F]) -> F {
    sort(observed);
    let mid = observed.len() / 2;

    if observed.len() % 2 == 0 {
        (observed[mid - 1] + observed[mid]) / F::cast(2.0)
    } else {
        observed[mid]
    }
}

fn mode<F: Float>(observed: &mut [F]) -> F {
    sort(observed);

    let (mut best, mut best_count) = (observed[0], 0);
    let mut start = 0;
    while start < observed.len() {
        let value = observed[start];
        let end = observed[start..]
            .iter()
            .position(|x| *x != value)
            .map_or(observed.len(), |len| start + len);

        // strict comparison keeps the smallest value among equally frequent ones
        if end - start > best_count {
            best = value;
            best_count = end - start;
        }
        start = end;
    }

    best
}

/// The result of fitting an [imputer](struct.Imputer.html).
/// Replaces missing values with the fill values learned during fitting.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedImputer<F> {
    fills: Vec<ColumnFill<F>>,
}

impl<F: Float> FittedImputer<F> {
    /// Learned fill values, in the order the columns were configured
    pub fn fill_values(&self) -> &[ColumnFill<F>] {
        &self.fills
    }

    /// Fill value of a named column, if it was configured
    pub fn fill_value(&self, name: &str) -> Option<F> {
        self.fills.iter().find(|x| x.name == name).map(|x| x.value)
    }
}

impl<F: Float> Transformer<Array2<F>, Array2<F>> for FittedImputer<F> {
    /// Replaces the missing values of the configured columns.
    /// Panics if the records have fewer columns than the dataset used for fitting.
    fn transform(&self, x: Array2<F>) -> Array2<F> {
        let mut x = x;
        for fill in &self.fills {
            x.column_mut(fill.index)
                .mapv_inplace(|el| if el.is_nan() { fill.value } else { el });
        }

        x
    }
}

impl<F: Float, D: Data<Elem = F>, T>
    Transformer<DatasetBase<ArrayBase<D, Ix2>, T>, DatasetBase<Array2<F>, T>> for FittedImputer<F>
{
    /// Substitutes the records of the dataset with their imputed version, keeping feature names.
    fn transform(&self, x: DatasetBase<ArrayBase<D, Ix2>, T>) -> DatasetBase<Array2<F>, T> {
        let imputed = self.transform(x.records.to_owned());
        x.with_records(imputed)
    }
}
