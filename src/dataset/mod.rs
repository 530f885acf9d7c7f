//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality.
use ndarray::{ArrayBase, ArrayView, ArrayView1, Ix1, Ix2, NdFloat, OwnedRepr};

use num_traits::{FromPrimitive, NumCast};

use std::hash::Hash;
use std::iter::Sum;

mod impl_dataset;
mod impl_records;
mod impl_targets;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in records of a dataset and in
/// the probabilities produced by classifiers.
pub trait Float:
    NdFloat + FromPrimitive + Default + Sum + approx::AbsDiffEq<Epsilon = Self>
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}

/// Discrete labels
///
/// Labels are countable, comparable and hashable. Boolean (binary task), integer and string
/// labels are supported.
pub trait Label: PartialEq + Eq + Hash + Clone {}

impl Label for bool {}
impl Label for usize {}
impl Label for u8 {}
impl Label for i32 {}
impl Label for String {}
impl Label for &str {}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and a single target per record, together with optional feature names. In order to keep the
/// type complexity low the dataset base is only generic over the records and targets and
/// introduces a trait bound on the records. `feature_names` are always owned and copied when views
/// are created.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, nfeatures)
/// * `targets`: a one-dimensional array with dimensionality (nsamples)
/// * `feature_names`: optional descriptive feature names with dimensionality (nfeatures)
///
/// # Trait bounds
///
/// * `R: Records`: generic over feature matrices
/// * `T`: generic over any `ndarray` array which can be used as targets. The `AsTargets` trait
/// bound is omitted here to avoid some repetition in implementation `src/dataset/impl_dataset.rs`
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBase<R, T>
where
    R: Records,
{
    pub records: R,
    pub targets: T,

    feature_names: Vec<String>,
}

/// Dataset
///
/// The most commonly used typed of dataset. It contains a number of records stored as an
/// `Array2` and each record corresponds to a single target stored in an `Array1`.
pub type Dataset<D, T> = DatasetBase<ArrayBase<OwnedRepr<D>, Ix2>, ArrayBase<OwnedRepr<T>, Ix1>>;

/// DatasetView
///
/// A read only view of a Dataset
pub type DatasetView<'a, D, T> = DatasetBase<ArrayView<'a, D, Ix2>, ArrayView<'a, T, Ix1>>;

/// Record trait
pub trait Records: Sized {
    type Elem;

    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}

/// Return a reference to the single target variable
pub trait AsTargets {
    type Elem;

    /// Returns a view on the targets
    fn as_targets(&self) -> ArrayView1<'_, Self::Elem>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2};
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn dataset_implements_required_methods() {
        let linspace: Array1<f64> = Array1::linspace(0.0, 0.8, 100);
        let records = Array2::from_shape_vec((50, 2), linspace.to_vec()).unwrap();
        let targets: Array1<usize> = (0..50).map(|i| i % 2).collect();
        let dataset = Dataset::new(records, targets);

        assert_eq!(dataset.nsamples(), 50);
        assert_eq!(dataset.nfeatures(), 2);
        assert_eq!(dataset.feature_names(), vec!["feature-0", "feature-1"]);

        // Split with ratio view
        let dataset_view = dataset.view();
        let (train, val) = dataset_view.split_with_ratio(0.5);
        assert_eq!(train.nsamples(), 25);
        assert_eq!(val.nsamples(), 25);

        // Split with ratio
        let (train, val) = dataset.split_with_ratio(0.25);
        assert_eq!(train.targets().dim(), 13);
        assert_eq!(val.targets().dim(), 37);
        assert_eq!(train.records().dim().0, 13);
        assert_eq!(val.records().dim().0, 37);
        assert_eq!(train.feature_names(), val.feature_names());
    }

    #[test]
    fn train_test_split_rounds_the_test_share_up() {
        let dataset = Dataset::new(
            Array2::from_shape_fn((11, 1), |(i, _)| i as f64),
            Array1::from((0..11).collect::<Vec<usize>>()),
        );

        let (train, test) = dataset.clone().train_test_split(0.2);
        assert_eq!((train.nsamples(), test.nsamples()), (8, 3));
        assert_eq!(test.targets(), &array![8usize, 9, 10]);

        let (train, test) = dataset.train_test_split(0.5);
        assert_eq!((train.nsamples(), test.nsamples()), (5, 6));

        let dataset = Dataset::new(Array2::<f64>::zeros((4238, 1)), Array1::<usize>::zeros(4238));
        let (train, test) = dataset.train_test_split(0.2);
        assert_eq!((train.nsamples(), test.nsamples()), (3390, 848));
    }

    #[test]
    fn shuffle_is_reproducible_and_keeps_pairs() {
        let records = array![[0., 10.], [1., 11.], [2., 12.], [3., 13.], [4., 14.]];
        let targets = array![0usize, 1, 2, 3, 4];
        let dataset = Dataset::new(records, targets);

        let a = dataset.shuffle(&mut SmallRng::seed_from_u64(5));
        let b = dataset.shuffle(&mut SmallRng::seed_from_u64(5));
        assert_eq!(a, b);

        // every record still belongs to its target
        for (row, target) in a.records().rows().into_iter().zip(a.targets().iter()) {
            assert_abs_diff_eq!(row[0], *target as f64);
            assert_abs_diff_eq!(row[1], *target as f64 + 10.);
        }

        let mut seen = a.targets().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn select_features_by_name() {
        let dataset = Dataset::new(array![[1., 2., 3.], [4., 5., 6.]], array![0usize, 1])
            .with_feature_names(vec!["age", "sysBP", "glucose"]);

        let selected = dataset
            .select_features_by_name(&["glucose", "age"])
            .unwrap();
        assert_eq!(selected.feature_names(), vec!["glucose", "age"]);
        assert_eq!(selected.records(), &array![[3., 1.], [6., 4.]]);

        match dataset.select_features_by_name(&["education"]) {
            Err(Error::UnknownFeature(name)) => assert_eq!(name, "education"),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(dataset.select_features(&[3]).is_err());
    }

    #[test]
    fn with_constant_prepends_ones() {
        let dataset = Dataset::new(array![[1., 2.], [4., 5.]], array![0usize, 1])
            .with_feature_names(vec!["age", "sysBP"]);

        let with_const = dataset.with_constant();
        assert_eq!(with_const.feature_names(), vec!["const", "age", "sysBP"]);
        assert_eq!(with_const.records(), &array![[1., 1., 2.], [1., 4., 5.]]);
        assert_eq!(with_const.targets(), dataset.targets());
    }

    #[test]
    fn map_targets_keeps_names() {
        let dataset = Dataset::new(array![[1.], [2.]], array![0usize, 1])
            .with_feature_names(vec!["age"]);
        let mapped = dataset.map_targets(|x| *x == 1);

        assert_eq!(mapped.targets(), &array![false, true]);
        assert_eq!(mapped.feature_names(), vec!["age"]);
    }
}
