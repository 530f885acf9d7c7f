//! `heartrisk` is the core of a small toolkit for classical risk modelling on tabular
//! medical data, kin in spirit to Python's `scikit-learn` and `statsmodels`.
//!
//! The crate provides the pieces shared by every algorithm in the workspace:
//!
//! * a [`Dataset`](dataset/type.Dataset.html) container with named features and single targets,
//! * the [`Fit`](traits/trait.Fit.html), [`Predict`](traits/trait.Predict.html) and
//!   [`Transformer`](traits/trait.Transformer.html) traits,
//! * checked hyperparameters through [`ParamGuard`](param_guard/trait.ParamGuard.html),
//! * classification [metrics](metrics/index.html): confusion matrix, classification report and
//!   ROC curves.
//!
//! Algorithms live in their own crates (`heartrisk-logistic`, `heartrisk-preprocessing`) and the
//! analysis report is driven by the `heartrisk` binary in `heartrisk-cli`.

pub mod dataset;
pub mod error;
mod metrics_classification;
pub mod param_guard;
pub mod prelude;
pub mod traits;

pub use dataset::{Dataset, DatasetBase, DatasetView, Float, Label};
pub use error::Error;
pub use param_guard::ParamGuard;

/// Common metrics functions for classification
pub mod metrics {
    pub use crate::metrics_classification::{
        BinaryClassification, ClassificationReport, ConfusionMatrix,
        ReceiverOperatingCharacteristic, ToConfusionMatrix,
    };
}
