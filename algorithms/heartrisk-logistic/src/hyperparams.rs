use crate::{error::Error, Float};
use heartrisk::ParamGuard;
use ndarray::Array1;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// A two-class logistic regression model.
///
/// Logistic regression combines linear models with
/// the sigmoid function `sigm(x) = 1/(1+exp(-x))`
/// to learn a family of functions that map the feature space to `[0,1]`.
///
/// Logistic regression is used in binary classification
/// by interpreting the predicted value as the probability that the sample
/// has the larger of the two labels. A threshold can be set in the
/// [fitted model](struct.FittedLogisticRegression.html) to decide the minimum
/// probability needed to classify a sample as the larger label, which defaults to `0.5`.
///
/// In this implementation any binary set of labels can be used, not necessarily `0` and `1`.
///
/// l2 regularization is used by this algorithm and is weighted by parameter `alpha`. The
/// intercept is not penalised. The default `alpha = 1` corresponds to an inverse regularization
/// strength of `C = 1`. Setting `alpha` close to zero removes regularization and the problem
/// solved minimizes only the empirical risk.
///
/// ## Examples
///
/// ```ignore
/// use heartrisk::traits::{Fit, Predict};
/// use heartrisk_logistic::LogisticRegression;
///
/// let model = LogisticRegression::default().fit(&train)?;
/// let prediction = model.predict(&test);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegressionValidParams<F: Float> {
    pub(crate) alpha: F,
    pub(crate) fit_intercept: bool,
    pub(crate) max_iterations: u64,
    pub(crate) gradient_tolerance: F,
    pub(crate) initial_params: Option<(Array1<F>, F)>,
}

impl<F: Float> LogisticRegressionValidParams<F> {
    pub fn alpha(&self) -> F {
        self.alpha
    }

    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    pub fn gradient_tolerance(&self) -> F {
        self.gradient_tolerance
    }

    pub fn initial_params(&self) -> &Option<(Array1<F>, F)> {
        &self.initial_params
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegressionParams<F: Float>(LogisticRegressionValidParams<F>);

/// The unchecked logistic regression parameters are the entry point of the model
pub type LogisticRegression<F> = LogisticRegressionParams<F>;

impl<F: Float> Default for LogisticRegressionParams<F> {
    fn default() -> LogisticRegressionParams<F> {
        LogisticRegressionParams::new()
    }
}

impl<F: Float> LogisticRegressionParams<F> {
    /// Creates a new LogisticRegression with default configuration.
    pub fn new() -> LogisticRegressionParams<F> {
        Self(LogisticRegressionValidParams {
            alpha: F::cast(1.0),
            fit_intercept: true,
            max_iterations: 100,
            gradient_tolerance: F::cast(1e-4),
            initial_params: None,
        })
    }

    pub fn params() -> LogisticRegressionParams<F> {
        Self::new()
    }

    /// Set the normalization parameter `alpha` used for L2 normalization,
    /// defaults to `1.0`.
    pub fn alpha(mut self, alpha: F) -> Self {
        self.0.alpha = alpha;
        self
    }

    /// Configure if an intercept should be fitted, defaults to `true`.
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.0.fit_intercept = fit_intercept;
        self
    }

    /// Configure the maximum number of iterations that the solver should perform,
    /// defaults to `100`.
    pub fn max_iterations(mut self, max_iterations: u64) -> Self {
        self.0.max_iterations = max_iterations;
        self
    }

    /// Configure the euclidean norm of the gradient at which the solver stops,
    /// defaults to `1e-4`.
    pub fn gradient_tolerance(mut self, gradient_tolerance: F) -> Self {
        self.0.gradient_tolerance = gradient_tolerance;
        self
    }

    /// Configure the initial parameters from where the optimization starts.
    /// The `params` array must have the same size as the number of columns of
    /// the feature matrix `x` passed to the `fit` method. The intercept is ignored
    /// when no intercept is fitted.
    pub fn initial_params(mut self, params: Array1<F>, intercept: F) -> Self {
        self.0.initial_params = Some((params, intercept));
        self
    }
}

impl<F: Float> ParamGuard for LogisticRegressionParams<F> {
    type Checked = LogisticRegressionValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if !self.0.alpha.is_finite() {
            return Err(Error::InvalidValues);
        }
        if self.0.alpha < F::zero() {
            return Err(Error::InvalidAlpha);
        }
        if !self.0.gradient_tolerance.is_finite() || self.0.gradient_tolerance <= F::zero() {
            return Err(Error::InvalidGradientTolerance);
        }
        if self.0.max_iterations == 0 {
            return Err(Error::InvalidMaxIterations);
        }
        if let Some((params, intercept)) = self.0.initial_params.as_ref() {
            if params.iter().any(|p| !p.is_finite()) || !intercept.is_finite() {
                return Err(Error::InvalidInitialParametersGuess);
            }
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// An unpenalised binary logit model fitted by maximum likelihood.
///
/// Contrary to [`LogisticRegression`] no intercept is added: the model is fitted on exactly the
/// columns of the records. Prepend a constant column with
/// [`with_constant`](heartrisk::DatasetBase::with_constant) to estimate one. The fitted
/// [`LogitResults`](crate::LogitResults) carry standard errors, Wald p-values and likelihood
/// statistics.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LogitValidParams<F: Float> {
    pub(crate) max_iterations: u64,
    pub(crate) tolerance: F,
}

impl<F: Float> LogitValidParams<F> {
    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    pub fn tolerance(&self) -> F {
        self.tolerance
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LogitParams<F: Float>(LogitValidParams<F>);

pub type Logit<F> = LogitParams<F>;

impl<F: Float> Default for LogitParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> LogitParams<F> {
    pub fn new() -> Self {
        Self(LogitValidParams {
            max_iterations: 35,
            tolerance: F::cast(1e-8),
        })
    }

    pub fn params() -> Self {
        Self::new()
    }

    /// Maximum number of Newton iterations, defaults to `35`.
    pub fn max_iterations(mut self, max_iterations: u64) -> Self {
        self.0.max_iterations = max_iterations;
        self
    }

    /// Largest absolute parameter change between iterations at which the fit counts as
    /// converged, defaults to `1e-8`.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }
}

fn check_logit<F: Float>(params: &LogitValidParams<F>) -> Result<(), Error> {
    if params.max_iterations == 0 {
        return Err(Error::InvalidMaxIterations);
    }
    if !params.tolerance.is_finite() || params.tolerance <= F::zero() {
        return Err(Error::InvalidTolerance);
    }
    Ok(())
}

impl<F: Float> ParamGuard for LogitParams<F> {
    type Checked = LogitValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        check_logit(&self.0)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Greedy backward elimination of features by their Wald p-value.
///
/// Starting from all columns of the records, a [`Logit`] is fitted repeatedly. While the largest
/// p-value exceeds `threshold` the corresponding column is removed and the model refitted. The
/// procedure never re-adds a removed column.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct BackwardEliminationValidParams<F: Float> {
    pub(crate) threshold: F,
    pub(crate) logit: LogitValidParams<F>,
}

impl<F: Float> BackwardEliminationValidParams<F> {
    pub fn threshold(&self) -> F {
        self.threshold
    }

    pub fn logit(&self) -> &LogitValidParams<F> {
        &self.logit
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct BackwardEliminationParams<F: Float>(BackwardEliminationValidParams<F>);

pub type BackwardElimination<F> = BackwardEliminationParams<F>;

impl<F: Float> Default for BackwardEliminationParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> BackwardEliminationParams<F> {
    pub fn new() -> Self {
        Self(BackwardEliminationValidParams {
            threshold: F::cast(0.05),
            logit: LogitParams::new().0,
        })
    }

    pub fn params() -> Self {
        Self::new()
    }

    /// Significance level a p-value has to exceed for its column to be removed,
    /// defaults to `0.05`.
    pub fn threshold(mut self, threshold: F) -> Self {
        self.0.threshold = threshold;
        self
    }

    /// Maximum number of Newton iterations of every refit, defaults to `35`.
    pub fn max_iterations(mut self, max_iterations: u64) -> Self {
        self.0.logit.max_iterations = max_iterations;
        self
    }

    /// Convergence tolerance of every refit, defaults to `1e-8`.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.logit.tolerance = tolerance;
        self
    }
}

impl<F: Float> ParamGuard for BackwardEliminationParams<F> {
    type Checked = BackwardEliminationValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let threshold = self.0.threshold;
        if !(threshold > F::zero() && threshold < F::one()) {
            return Err(Error::InvalidThreshold(
                num_traits::ToPrimitive::to_f64(&threshold).unwrap_or(f64::NAN),
            ));
        }
        check_logit(&self.0.logit)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
