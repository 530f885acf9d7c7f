use super::{AsTargets, Dataset, DatasetBase, DatasetView, Float, Records};
use crate::error::{Error, Result};
use crate::traits::{Predict, PredictInplace};
use ndarray::{concatenate, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use rand::{seq::SliceRandom, Rng};

/// Implementation without constraints on records and targets
///
/// This implementation block provides methods for the creation and mutation of datasets. This
/// includes swapping the targets, return the records etc.
impl<R: Records, T> DatasetBase<R, T> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = Dataset::new(records, targets);
    /// ```
    pub fn new(records: R, targets: T) -> DatasetBase<R, T> {
        DatasetBase {
            records,
            targets,
            feature_names: Vec::new(),
        }
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &T {
        &self.targets
    }

    /// Returns reference to records
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Updates the records of a dataset
    ///
    /// This function overwrites the records in a dataset. Feature names are dropped when the
    /// number of features changes.
    pub fn with_records<T2: Records>(self, records: T2) -> DatasetBase<T2, T> {
        let feature_names = if records.nfeatures() == self.records.nfeatures() {
            self.feature_names
        } else {
            Vec::new()
        };

        DatasetBase {
            records,
            targets: self.targets,
            feature_names,
        }
    }

    /// Updates the feature names of a dataset
    pub fn with_feature_names<I: Into<String>>(mut self, names: Vec<I>) -> DatasetBase<R, T> {
        let feature_names = names.into_iter().map(|x| x.into()).collect();

        self.feature_names = feature_names;

        self
    }

    /// Returns feature names
    ///
    /// A feature name gives a human-readable string describing the purpose of a single feature.
    /// This allow the reader to understand its purpose while analysing results, for example
    /// coefficient tables and odds ratios. If no names were set, `feature-<i>` is returned for
    /// every column.
    pub fn feature_names(&self) -> Vec<String> {
        if !self.feature_names.is_empty() {
            self.feature_names.clone()
        } else {
            (0..self.records.nfeatures())
                .map(|idx| format!("feature-{}", idx))
                .collect()
        }
    }

    /// Return the position of a named feature
    pub fn feature_index(&self, name: &str) -> Result<usize> {
        self.feature_names()
            .iter()
            .position(|x| x == name)
            .ok_or_else(|| Error::UnknownFeature(name.to_string()))
    }

    /// Return the number of samples in the dataset
    pub fn nsamples(&self) -> usize {
        self.records.nsamples()
    }

    /// Return the number of features in the dataset
    pub fn nfeatures(&self) -> usize {
        self.records.nfeatures()
    }
}

impl<F, L, D, S> DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>
where
    D: Data<Elem = F>,
    S: Data<Elem = L>,
{
    /// Creates a view of a dataset
    pub fn view(&self) -> DatasetView<'_, F, L> {
        DatasetBase {
            records: self.records.view(),
            targets: self.targets.view(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Map targets with a function `f`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = framingham.map_targets(|x| *x == 1);
    /// // dataset has now boolean targets
    /// ```
    pub fn map_targets<T, G: FnMut(&L) -> T>(
        self,
        fnc: G,
    ) -> DatasetBase<ArrayBase<D, Ix2>, Array1<T>> {
        let DatasetBase {
            records,
            targets,
            feature_names,
        } = self;

        DatasetBase {
            records,
            targets: targets.map(fnc),
            feature_names,
        }
    }
}

impl<F: Clone, L: Clone, D, S> DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>
where
    D: Data<Elem = F>,
    S: Data<Elem = L>,
{
    /// Apply a random permutation to the samples of the dataset
    ///
    /// The permutation is fully determined by the state of `rng`, so a seeded generator produces
    /// the same split every time.
    pub fn shuffle<R: Rng>(&self, rng: &mut R) -> Dataset<F, L> {
        let mut indices = (0..self.nsamples()).collect::<Vec<_>>();
        indices.shuffle(rng);

        let records = self.records.select(Axis(0), &indices);
        let targets = self.targets.select(Axis(0), &indices);

        DatasetBase::new(records, targets).with_feature_names(self.feature_names.clone())
    }

    /// Select a subset of features by their position
    pub fn select_features(&self, indices: &[usize]) -> Result<Dataset<F, L>> {
        let nfeatures = self.nfeatures();
        if let Some(idx) = indices.iter().find(|idx| **idx >= nfeatures) {
            return Err(Error::FeatureOutOfRange(*idx, nfeatures));
        }

        let names = self.feature_names();
        let records = self.records.select(Axis(1), indices);
        let feature_names = indices.iter().map(|idx| names[*idx].clone()).collect();

        Ok(DatasetBase::new(records, self.targets.to_owned()).with_feature_names(feature_names))
    }

    /// Select a subset of features by their name, in the order given
    pub fn select_features_by_name(&self, names: &[&str]) -> Result<Dataset<F, L>> {
        let indices = names
            .iter()
            .map(|name| self.feature_index(name))
            .collect::<Result<Vec<_>>>()?;

        self.select_features(&indices)
    }
}

impl<F: Float, L: Clone, D, S> DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>
where
    D: Data<Elem = F>,
    S: Data<Elem = L>,
{
    /// Prepend a column of ones called `const`
    ///
    /// Models without an implicit intercept, like an unpenalized `Logit`, estimate the intercept
    /// as the coefficient of this column.
    pub fn with_constant(&self) -> Dataset<F, L> {
        let ones = Array2::ones((self.nsamples(), 1));
        let records = concatenate(Axis(1), &[ones.view(), self.records.view()])
            .expect("constant column has the same number of rows");

        let mut feature_names = vec!["const".to_string()];
        feature_names.extend(self.feature_names());

        DatasetBase::new(records, self.targets.to_owned()).with_feature_names(feature_names)
    }
}

impl<F: Clone, L: Clone> Dataset<F, L> {
    /// Split dataset into two disjoint chunks
    ///
    /// This function splits the observations in a dataset into two disjoint chunks. The splitting
    /// threshold is calculated with the `ratio`. For example a ratio of `0.8` produces a training
    /// set holding 80% of the observations and a validation set with the rest. Shuffle the dataset
    /// first to get a random split.
    pub fn split_with_ratio(self, ratio: f32) -> (Self, Self) {
        let n = (self.nsamples() as f32 * ratio).ceil() as usize;
        let (first, second) = {
            let view = self.view();
            view.split_with_ratio(ratio)
        };
        debug_assert_eq!(first.nsamples(), n);

        (first.to_owned(), second.to_owned())
    }

    /// Split off the last `ceil(n * test_size)` samples as test set
    ///
    /// Rounding up the test share keeps at least one test sample for any positive `test_size`.
    /// Returns `(train, test)`.
    pub fn train_test_split(self, test_size: f32) -> (Self, Self) {
        let n_test = ((self.nsamples() as f32 * test_size).ceil() as usize).min(self.nsamples());
        let (train, test) = self.view().split_at_sample(self.nsamples() - n_test);

        (train.to_owned(), test.to_owned())
    }
}

impl<'a, F: Clone, L: Clone> DatasetView<'a, F, L> {
    /// Split dataset view into two disjoint views
    pub fn split_with_ratio(self, ratio: f32) -> (Self, Self) {
        let n = (self.nsamples() as f32 * ratio).ceil() as usize;
        self.split_at_sample(n)
    }

    /// The first `n` samples and the rest
    fn split_at_sample(self, n: usize) -> (Self, Self) {
        let (records_first, records_second) = self.records.split_at(Axis(0), n);
        let (targets_first, targets_second) = self.targets.split_at(Axis(0), n);

        let first = DatasetBase::new(records_first, targets_first)
            .with_feature_names(self.feature_names.clone());
        let second = DatasetBase::new(records_second, targets_second)
            .with_feature_names(self.feature_names);

        (first, second)
    }

    /// Copy the records and targets of the view into an owned dataset
    pub fn to_owned(&self) -> Dataset<F, L> {
        DatasetBase::new(self.records.to_owned(), self.targets.to_owned())
            .with_feature_names(self.feature_names.clone())
    }
}

impl<L, R: Records, T: AsTargets<Elem = L>> AsTargets for DatasetBase<R, T> {
    type Elem = L;

    fn as_targets(&self) -> ndarray::ArrayView1<'_, Self::Elem> {
        self.targets.as_targets()
    }
}

/// Predict with a model on a borrowed record matrix
impl<'a, F, D, T, O> Predict<&'a ArrayBase<D, Ix2>, T> for O
where
    D: Data<Elem = F>,
    O: PredictInplace<ArrayBase<D, Ix2>, T>,
{
    fn predict(&self, records: &'a ArrayBase<D, Ix2>) -> T {
        let mut targets = self.default_target(records);
        self.predict_inplace(records, &mut targets);
        targets
    }
}

/// Predict with a model on the records of a borrowed dataset
impl<'a, R: Records, T, S, O> Predict<&'a DatasetBase<R, T>, S> for O
where
    O: PredictInplace<R, S>,
{
    fn predict(&self, ds: &'a DatasetBase<R, T>) -> S {
        let mut targets = self.default_target(&ds.records);
        self.predict_inplace(&ds.records, &mut targets);
        targets
    }
}
