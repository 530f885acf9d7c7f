//! # Logistic Regression
//!
//! ## The Big Picture
//!
//! `heartrisk-logistic` fits binary logistic regression models on a [`heartrisk::Dataset`], in
//! the two flavours a risk analysis needs:
//!
//! * [`LogisticRegression`], an l2 penalised classifier in the style of `scikit-learn` with an
//!   unpenalised intercept, used for prediction and scoring,
//! * [`Logit`], an unpenalised maximum likelihood fit in the style of `statsmodels`, which
//!   reports standard errors, Wald p-values, confidence intervals, odds ratios and likelihood
//!   statistics,
//!
//! together with [`BackwardElimination`], which repeatedly refits a `Logit` and removes the least
//! significant feature until all remaining p-values are below a significance level.
//!
//! `LogisticRegression` minimises the penalised log loss with the L-BFGS solver of `argmin`.
//! `Logit` minimises the negative log-likelihood with Newton-Raphson steps, halving a step while
//! it does not decrease the objective, and keeps the Hessian at the optimum for its covariance.
//!
//! ## Example
//!
//! ```ignore
//! use heartrisk::traits::Fit;
//! use heartrisk_logistic::{BackwardElimination, Logit};
//!
//! let results = Logit::params().fit(&dataset.with_constant())?;
//! println!("{}", results.summary());
//!
//! let elimination = BackwardElimination::params().fit(&dataset.with_constant())?;
//! println!("{}", elimination.results().odds_ratio_table(0.05));
//! ```

pub mod error;

mod elimination;
mod float;
mod hyperparams;
mod logit;
mod newton;

use crate::error::{Error, Result};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use argmin_math::{
    ArgminAdd, ArgminDot, ArgminL1Norm, ArgminL2Norm, ArgminMinMax, ArgminMul, ArgminSignum,
    ArgminSub, ArgminZero,
};
use heartrisk::dataset::{AsTargets, DatasetBase};
use heartrisk::traits::{Fit, PredictInplace};
use ndarray::{s, Array, Array1, Array2, ArrayBase, Axis, Data, Ix2, Zip};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use newton::LogisticProblem;

pub use elimination::EliminationResult;
pub use float::Float;
pub use hyperparams::{
    BackwardElimination, BackwardEliminationParams, BackwardEliminationValidParams, Logit,
    LogitParams, LogitValidParams, LogisticRegression, LogisticRegressionParams,
    LogisticRegressionValidParams,
};
pub use logit::{LogitResults, LogitSummary, OddsRatioRow, OddsRatioTable};

impl<F: Float> LogisticRegressionValidParams<F> {
    /// Create the initial parameters, either from a user supplied guess
    /// or a 1-d array of `0`s.
    fn setup_init_params(&self, n_features: usize) -> Array1<F> {
        let n = n_features + self.fit_intercept as usize;
        match self.initial_params.as_ref() {
            Some((params, intercept)) => {
                let mut init = Array1::zeros(n);
                init.slice_mut(s![..n_features]).assign(params);
                if self.fit_intercept {
                    init[n_features] = *intercept;
                }
                init
            }
            None => Array1::zeros(n),
        }
    }

    /// Ensure that `x` and `y` have the right shape and that all data is finite.
    fn validate_data<A: Data<Elem = F>>(
        &self,
        x: &ArrayBase<A, Ix2>,
        y: &Array1<F>,
    ) -> Result<()> {
        validate_records(x, y)?;
        if let Some((params, _)) = self.initial_params.as_ref() {
            if params.len() != x.ncols() {
                return Err(Error::InvalidInitialParametersGuessSize);
            }
        }
        Ok(())
    }
}

impl<C: Ord + Clone, F: Float, D: Data<Elem = F>, T: AsTargets<Elem = C>>
    Fit<ArrayBase<D, Ix2>, T, Error> for LogisticRegressionValidParams<F>
where
    Array1<F>: ArgminAdd<Array1<F>, Array1<F>>
        + ArgminSub<Array1<F>, Array1<F>>
        + ArgminSub<F, Array1<F>>
        + ArgminAdd<F, Array1<F>>
        + ArgminMul<F, Array1<F>>
        + ArgminMul<Array1<F>, Array1<F>>
        + ArgminDot<Array1<F>, F>
        + ArgminL2Norm<F>
        + ArgminL1Norm<F>
        + ArgminSignum
        + ArgminMinMax,
    F: ArgminMul<Array1<F>, Array1<F>> + ArgminZero,
{
    type Object = FittedLogisticRegression<F, C>;

    /// Given a 2-dimensional feature matrix array `x` with shape
    /// (n_samples, n_features) and an array of target classes to predict,
    /// create a `FittedLogisticRegression` object which allows making
    /// predictions.
    ///
    /// The array of target classes `y` must have exactly two distinct
    /// values, (e.g. 0 and 1, "cat" and "dog", ...), which
    /// represent the two different classes the model is supposed to predict.
    ///
    /// The array `y` must also have exactly `n_samples` items, i.e.
    /// exactly as many items as there are rows in the feature matrix `x`.
    ///
    /// This method returns an error if any of the preconditions are violated,
    /// i.e. any values are `Inf` or `NaN`, `y` doesn't have as many items as
    /// `x` has rows, or the Hessian of the objective cannot be inverted.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let (x, y) = (dataset.records(), dataset.targets());
        let (labels, target) = label_classes(y)?;
        self.validate_data(x, &target)?;

        let problem = LogisticProblem {
            x,
            target: &target,
            alpha: self.alpha,
        };
        let init_params = self.setup_init_params(x.ncols());
        let linesearch = MoreThuenteLineSearch::new();
        let solver = LBFGS::new(linesearch, 10).with_tolerance_grad(self.gradient_tolerance)?;

        let mut result = Executor::new(problem, solver)
            .configure(|state| state.param(init_params).max_iters(self.max_iterations))
            .run()?;
        let iterations = result.state.get_iter();
        let params = result
            .state
            .take_best_param()
            .ok_or(Error::MissingSolution)?;

        let grad = logistic_grad(x, &target, self.alpha, &params);
        if grad.dot(&grad).sqrt() > self.gradient_tolerance {
            log::debug!(
                "logistic regression stopped after {} iterations without reaching the gradient tolerance",
                iterations
            );
        }

        let (w, intercept) = convert_params(x.ncols(), &params);
        Ok(FittedLogisticRegression::new(intercept, w, labels))
    }
}

/// Check that the number of samples agree and every record is finite
fn validate_records<F: Float, A: Data<Elem = F>>(
    x: &ArrayBase<A, Ix2>,
    y: &Array1<F>,
) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(Error::MismatchedShapes(x.nrows(), y.len()));
    }
    if x.iter().any(|x| !x.is_finite()) {
        return Err(Error::InvalidValues);
    }
    Ok(())
}

/// Identify the distinct values of the classes `y` and associate
/// the target labels `-1.0` and `1.0` to it. -1.0 always labels the
/// smaller class (by Ord) and 1.0 always labels the larger
/// class.
///
/// It is an error to have more or less than two classes.
fn label_classes<F, T, C>(y: &T) -> Result<(ClassLabels<F, C>, Array1<F>)>
where
    F: Float,
    T: AsTargets<Elem = C>,
    C: Ord + Clone,
{
    let y = y.as_targets();
    let mut classes = y.iter().collect::<Vec<_>>();
    classes.sort();
    classes.dedup();

    if classes.len() != 2 {
        return Err(Error::WrongNumberOfClasses);
    }

    let target = y.map(|item| {
        if item == classes[0] {
            F::NEGATIVE_LABEL
        } else {
            F::POSITIVE_LABEL
        }
    });

    Ok((
        vec![
            ClassLabel {
                class: classes[0].clone(),
                label: F::NEGATIVE_LABEL,
            },
            ClassLabel {
                class: classes[1].clone(),
                label: F::POSITIVE_LABEL,
            },
        ],
        target,
    ))
}

/// Conditionally split the feature vector `w` into parameter vector and
/// intercept parameter.
fn convert_params<F: Float>(n_features: usize, w: &Array1<F>) -> (Array1<F>, F) {
    let nrows = w.len();
    if n_features == nrows {
        (w.to_owned(), F::zero())
    } else if n_features + 1 == nrows {
        (w.slice(s![..n_features]).to_owned(), w[n_features])
    } else {
        panic!(
            "Unexpected length of parameter vector `w`, exected {} or {}, found {}",
            n_features,
            n_features + 1,
            nrows
        );
    }
}

/// The logistic function
fn logistic<F: heartrisk::Float>(x: F) -> F {
    F::one() / (F::one() + (-x).exp())
}

/// A numerically stable version of the log of the logistic function.
///
/// Taken from scikit-learn
/// https://github.com/scikit-learn/scikit-learn/blob/0.23.1/sklearn/utils/_logistic_sigmoid.pyx
///
/// See the blog post describing this implementation:
/// http://fa.bianp.net/blog/2013/numerical-optimizers-for-logistic-regression/
fn log_logistic<F: heartrisk::Float>(x: F) -> F {
    if x > F::zero() {
        -(F::one() + (-x).exp()).ln()
    } else {
        x - (F::one() + x.exp()).ln()
    }
}

/// Computes the logistic loss assuming the training labels $y \in {-1, 1}$
///
/// Because the logistic function fullfills $\sigma(-z) = 1 - \sigma(z)$
/// we can write $P(y=1|z) = \sigma(z) = \sigma(yz)$ and
/// $P(y=-1|z) = 1 - P(y=1|z) = 1 - \sigma(z) = \sigma(-z) = \sigma(yz)$, so
/// $P(y|z) = \sigma(yz)$ for both $y=1$ and $y=-1$.
///
/// Thus, the log loss can be written as
/// $$-\sum_{i=1}^{N} \log(\sigma(y_i z_i)) + \frac{\alpha}{2}\text{params}^T\text{params}$$
fn logistic_loss<F: Float, A: Data<Elem = F>>(
    x: &ArrayBase<A, Ix2>,
    y: &Array1<F>,
    alpha: F,
    w: &Array1<F>,
) -> F {
    let n_features = x.shape()[1];
    let (params, intercept) = convert_params(n_features, w);
    let mut yz = (x.dot(&params) + intercept) * y;
    yz.mapv_inplace(log_logistic);
    -yz.sum() + F::cast(0.5) * alpha * params.dot(&params)
}

/// Computes the gradient of the logistic loss function
fn logistic_grad<F: Float, A: Data<Elem = F>>(
    x: &ArrayBase<A, Ix2>,
    y: &Array1<F>,
    alpha: F,
    w: &Array1<F>,
) -> Array1<F> {
    let n_features = x.shape()[1];
    let (params, intercept) = convert_params(n_features, w);
    let mut yz = (x.dot(&params) + intercept) * y;
    yz.mapv_inplace(logistic);
    yz -= F::one();
    yz *= y;
    if w.len() == n_features + 1 {
        let mut grad = Array::zeros(w.len());
        grad.slice_mut(s![..n_features])
            .assign(&(x.t().dot(&yz) + &(params * alpha)));
        grad[n_features] = yz.sum();
        grad
    } else {
        x.t().dot(&yz) + &(params * alpha)
    }
}

/// Computes the Hessian of the logistic loss function
///
/// With $p_i = \sigma(z_i)$ this is $X^T \text{diag}(p_i (1 - p_i)) X + \alpha I$, where the
/// intercept row and column are not penalised. The labels drop out since
/// $\sigma(yz)(1 - \sigma(yz)) = \sigma(z)(1 - \sigma(z))$ for $y \in {-1, 1}$.
fn logistic_hessian<F: Float, A: Data<Elem = F>>(
    x: &ArrayBase<A, Ix2>,
    alpha: F,
    w: &Array1<F>,
) -> Array2<F> {
    let n_features = x.shape()[1];
    let (params, intercept) = convert_params(n_features, w);
    let mut weights = x.dot(&params) + intercept;
    weights.mapv_inplace(|z| {
        let p = logistic(z);
        p * (F::one() - p)
    });
    let weighted = x * &weights.view().insert_axis(Axis(1));

    let mut hessian = Array2::zeros((w.len(), w.len()));
    hessian
        .slice_mut(s![..n_features, ..n_features])
        .assign(&x.t().dot(&weighted));
    for i in 0..n_features {
        hessian[(i, i)] += alpha;
    }
    if w.len() == n_features + 1 {
        let cross = weighted.sum_axis(Axis(0));
        hessian.slice_mut(s![..n_features, n_features]).assign(&cross);
        hessian.slice_mut(s![n_features, ..n_features]).assign(&cross);
        hessian[(n_features, n_features)] = weights.sum();
    }
    hessian
}

impl<'a, F: Float, A: Data<Elem = F>> CostFunction for LogisticProblem<'a, F, A> {
    type Param = Array1<F>;
    type Output = F;

    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok(logistic_loss(self.x, self.target, self.alpha, p))
    }
}

impl<'a, F: Float, A: Data<Elem = F>> Gradient for LogisticProblem<'a, F, A> {
    type Param = Array1<F>;
    type Gradient = Array1<F>;

    fn gradient(&self, p: &Self::Param) -> std::result::Result<Self::Gradient, argmin::core::Error> {
        Ok(logistic_grad(self.x, self.target, self.alpha, p))
    }
}

/// A fitted logistic regression which can make predictions
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(PartialEq, Debug, Clone)]
pub struct FittedLogisticRegression<F: Float, C: PartialOrd + Clone> {
    threshold: F,
    intercept: F,
    params: Array1<F>,
    labels: ClassLabels<F, C>,
}

impl<F: Float, C: PartialOrd + Clone> FittedLogisticRegression<F, C> {
    fn new(
        intercept: F,
        params: Array1<F>,
        labels: ClassLabels<F, C>,
    ) -> FittedLogisticRegression<F, C> {
        FittedLogisticRegression {
            threshold: F::cast(0.5),
            intercept,
            params,
            labels,
        }
    }

    /// Set the probability threshold for which the 'positive' class will be
    /// predicted. Defaults to 0.5.
    pub fn set_threshold(mut self, threshold: F) -> FittedLogisticRegression<F, C> {
        if threshold < F::zero() || threshold > F::one() {
            panic!("FittedLogisticRegression::set_threshold: threshold needs to be between 0.0 and 1.0");
        }
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> F {
        self.threshold
    }

    pub fn intercept(&self) -> F {
        self.intercept
    }

    pub fn params(&self) -> &Array1<F> {
        &self.params
    }

    /// The two classes, smaller one first
    pub fn classes(&self) -> Vec<C> {
        self.labels.iter().map(|cl| cl.class.clone()).collect()
    }

    /// Given a feature matrix, predict the probabilities that a sample
    /// should be classified as the larger of the two classes learned when the
    /// model was fitted.
    pub fn predict_probabilities<A: Data<Elem = F>>(&self, x: &ArrayBase<A, Ix2>) -> Array1<F> {
        let mut probs = x.dot(&self.params) + self.intercept;
        probs.mapv_inplace(logistic);
        probs
    }

    /// Probabilities of both classes, one row per sample. The first column belongs to the
    /// smaller class, the second column to the larger class.
    pub fn predict_proba<A: Data<Elem = F>>(&self, x: &ArrayBase<A, Ix2>) -> Array2<F> {
        let larger = self.predict_probabilities(x);
        let mut probs = Array2::zeros((larger.len(), 2));
        Zip::from(probs.rows_mut())
            .and(&larger)
            .for_each(|mut row, p| {
                row[0] = F::one() - *p;
                row[1] = *p;
            });
        probs
    }
}

impl<C: PartialOrd + Clone + Default, F: Float, D: Data<Elem = F>>
    PredictInplace<ArrayBase<D, Ix2>, Array1<C>> for FittedLogisticRegression<F, C>
{
    /// Given a feature matrix, predict the classes learned when the model was
    /// fitted.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<C>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.params.len(),
            "Number of data features must match the number of features the model was trained with."
        );

        let pos_class = class_from_label(&self.labels, F::POSITIVE_LABEL);
        let neg_class = class_from_label(&self.labels, F::NEGATIVE_LABEL);
        Zip::from(&self.predict_probabilities(x))
            .and(y)
            .for_each(|prob, out| {
                *out = if *prob >= self.threshold {
                    pos_class.clone()
                } else {
                    neg_class.clone()
                }
            });
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<C> {
        Array1::default(x.nrows())
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(PartialEq, Debug, Clone)]
struct ClassLabel<F, C> {
    class: C,
    label: F,
}

type ClassLabels<F, C> = Vec<ClassLabel<F, C>>;

fn class_from_label<F: Float, C: Clone>(labels: &[ClassLabel<F, C>], label: F) -> C {
    labels
        .iter()
        .find(|cl| cl.label == label)
        .map(|cl| cl.class.clone())
        .expect("both labels are assigned when fitting")
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::{assert_abs_diff_eq, AbsDiffEq};
    use heartrisk::metrics::ToConfusionMatrix;
    use heartrisk::traits::Predict;
    use heartrisk::Dataset;
    use ndarray::{array, Array2};
    use ndarray_rand::{rand::SeedableRng, rand_distr::Uniform, RandomExt};
    use rand::rngs::SmallRng;

    /// Loss and gradient of a one feature problem with intercept, reference values from
    /// sklearn's `_logistic_loss_and_grad`
    #[test]
    fn loss_and_gradient_match_reference() {
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];

        let cases = [
            (array![0.0, 0.0], 0.0, 6.931471805599453, array![-19.5, -3.]),
            (
                array![1.0, 0.0],
                1.0,
                3.3012999588008323,
                array![0.86958446, -0.02852148],
            ),
            (
                array![0.0, -1.0],
                10.0,
                10.652158847349117,
                array![-28.51128457, -4.38635147],
            ),
            (
                array![-1.0, -1.0],
                10.0,
                52.78319542978224,
                array![-48.95165599, -5.98941933],
            ),
        ];

        for (w, alpha, loss, grad) in &cases {
            assert_abs_diff_eq!(logistic_loss(&x, &y, *alpha, w), *loss, epsilon = 1e-10);
            assert!(logistic_grad(&x, &y, *alpha, w).abs_diff_eq(grad, 1e-8));
        }
    }

    /// The Hessian agrees with central differences of the gradient
    #[test]
    fn test_logistic_hessian() {
        let x = array![[0.5, -1.0], [1.5, 0.3], [-0.2, 2.0], [1.0, 1.0], [-1.3, 0.1]];
        let y = array![-1.0, 1.0, 1.0, -1.0, 1.0];
        let w = array![0.3, -0.7, 0.2];
        let alpha = 2.0;
        let h = 1e-6;

        let hessian = logistic_hessian(&x, alpha, &w);
        for j in 0..w.len() {
            let mut up = w.clone();
            let mut down = w.clone();
            up[j] += h;
            down[j] -= h;
            let column =
                (logistic_grad(&x, &y, alpha, &up) - logistic_grad(&x, &y, alpha, &down)) / (2. * h);
            assert!(hessian.column(j).abs_diff_eq(&column, 1e-6));
        }
        assert_abs_diff_eq!(hessian, hessian.t(), epsilon = 1e-12);
    }

    #[test]
    fn simple_example_1() {
        let log_reg = LogisticRegression::default();
        let x = array![[-1.0], [-0.01], [0.01], [1.0]];
        let y = array![0, 0, 1, 1];
        let dataset = Dataset::new(x, y);
        let res = log_reg.fit(&dataset).unwrap();
        assert_abs_diff_eq!(res.intercept(), 0.0, epsilon = 1e-6);
        assert!(res.params().abs_diff_eq(&array![0.682], 1e-3));
        assert_eq!(&res.predict(dataset.records()), dataset.targets());
        assert_eq!(res.classes(), vec![0, 1]);
    }

    #[test]
    fn simple_example_1_cats_dogs() {
        let log_reg = LogisticRegression::default();
        let x = array![[0.01], [1.0], [-1.0], [-0.01]];
        let y = array!["dog", "dog", "cat", "cat"];
        let dataset = Dataset::new(x, y);
        let res = log_reg.fit(&dataset).unwrap();
        assert_abs_diff_eq!(res.intercept(), 0.0, epsilon = 1e-6);
        assert!(res.params().abs_diff_eq(&array![0.682], 1e-3));
        assert!(res
            .predict_probabilities(dataset.records())
            .abs_diff_eq(&array![0.5017, 0.6641, 0.3359, 0.4983], 1e-3));
        assert_eq!(&res.predict(dataset.records()), dataset.targets());
    }

    /// One feature counting from zero to nine, the upper six samples are positive
    fn ten_samples() -> Dataset<f64, usize> {
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        Dataset::new(x, array![0, 0, 0, 0, 1, 1, 1, 1, 1, 1])
    }

    #[test]
    fn simple_example_2() {
        let log_reg = LogisticRegression::default().alpha(1.0);
        let dataset = ten_samples();
        let res = log_reg.fit(&dataset).unwrap();
        assert!(res.intercept().abs_diff_eq(&-4.126, 1e-3));
        assert!(res.params().abs_diff_eq(&array![1.181], 1e-3));
        assert_eq!(&res.predict(&dataset), dataset.targets());

        let proba = res.predict_proba(dataset.records());
        assert_eq!(proba.dim(), (10, 2));
        assert_abs_diff_eq!(proba.sum_axis(Axis(1)), Array1::ones(10), epsilon = 1e-12);
        assert_abs_diff_eq!(
            proba.column(1),
            res.predict_probabilities(dataset.records())
        );
    }

    /// The quasi-Newton fit lands on the optimum of the Newton iterations used by `Logit`
    #[test]
    fn agrees_with_newton_iterations() {
        let dataset = ten_samples();
        let model = LogisticRegression::default()
            .gradient_tolerance(1e-8)
            .fit(&dataset)
            .unwrap();

        let target = dataset.targets().mapv(|t| if t == 1 { 1.0 } else { -1.0 });
        let problem = LogisticProblem {
            x: dataset.records(),
            target: &target,
            alpha: 1.0,
        };
        let newton = problem.minimize(Array1::zeros(2), 100, 1e-10).unwrap();

        assert!(newton.converged);
        assert_abs_diff_eq!(model.params()[0], newton.params[0], epsilon = 1e-5);
        assert_abs_diff_eq!(model.intercept(), newton.params[1], epsilon = 1e-5);
    }

    #[test]
    fn threshold_moves_decision() {
        let x = array![[-1.0], [-0.01], [0.01], [1.0]];
        let dataset = Dataset::new(x, array![0, 0, 1, 1]);
        let res = LogisticRegression::default()
            .fit(&dataset)
            .unwrap()
            .set_threshold(0.6);

        assert_abs_diff_eq!(res.threshold(), 0.6);
        assert_eq!(res.predict(dataset.records()), array![0, 0, 0, 1]);
    }

    #[test]
    fn rejects_single_class() {
        let log_reg = LogisticRegression::default();
        let x = array![[0.01], [1.0], [-1.0], [-0.01]];
        let y = array![1, 1, 1, 1];
        let res = log_reg.fit(&Dataset::new(x, y));
        assert_eq!(
            res.unwrap_err().to_string(),
            "Expected exactly two classes for logistic regression".to_string()
        );
    }

    #[test]
    fn rejects_mismatching_x_y() {
        let log_reg = LogisticRegression::default();
        let x = array![[-1.0], [-0.01], [0.01]];
        let y = array![0, 0, 1, 1];
        let res = log_reg.fit(&Dataset::new(x, y));
        assert_eq!(
            res.unwrap_err().to_string(),
            "Expected `x` and `y` to have same number of rows, got 3 != 4".to_string()
        );
    }

    #[test]
    fn rejects_inf_values() {
        let infs = vec![std::f64::INFINITY, std::f64::NEG_INFINITY, std::f64::NAN];
        let inf_xs: Vec<_> = infs.iter().map(|&inf| array![[1.0], [inf]]).collect();
        let log_reg = LogisticRegression::default();
        let normal_x = array![[-1.0], [1.0]];
        let y = array![0, 1];
        let expected = "Values must be finite and not `Inf`, `-Inf` or `NaN`".to_string();
        for inf_x in &inf_xs {
            let res = log_reg.fit(&Dataset::new(inf_x.to_owned(), y.to_owned()));
            assert_eq!(res.unwrap_err().to_string(), expected);
        }
        for inf in &infs {
            let log_reg = LogisticRegression::default().alpha(*inf);
            let res = log_reg.fit(&Dataset::new(normal_x.to_owned(), y.to_owned()));
            assert_eq!(res.unwrap_err().to_string(), expected);
        }
        let mut non_positives = infs;
        non_positives.push(-1.0);
        non_positives.push(0.0);
        for inf in &non_positives {
            let log_reg = LogisticRegression::default().gradient_tolerance(*inf);
            let res = log_reg.fit(&Dataset::new(normal_x.to_owned(), y.to_owned()));
            assert_eq!(
                res.unwrap_err().to_string(),
                "gradient_tolerance must be a positive, finite number"
            );
        }
        let res = LogisticRegression::default()
            .alpha(-1.0)
            .fit(&Dataset::new(normal_x, y));
        assert!(matches!(res, Err(Error::InvalidAlpha)));
    }

    #[test]
    fn rejects_zero_iterations() {
        let res = LogisticRegression::default()
            .max_iterations(0)
            .fit(&ten_samples());
        assert!(matches!(res, Err(Error::InvalidMaxIterations)));
    }

    #[test]
    fn validates_initial_params() {
        let infs = vec![std::f64::INFINITY, std::f64::NEG_INFINITY, std::f64::NAN];
        let normal_x = array![[-1.0], [1.0]];
        let normal_y = array![0, 1];
        let dataset = Dataset::new(normal_x, normal_y);
        let expected = "Initial parameter guess must be finite".to_string();
        for inf in &infs {
            let log_reg = LogisticRegression::default().initial_params(array![*inf], 0.0);
            let res = log_reg.fit(&dataset);
            assert_eq!(res.unwrap_err().to_string(), expected);
        }
        {
            let log_reg = LogisticRegression::default().initial_params(array![0.0, 0.0], 0.0);
            let res = log_reg.fit(&dataset);
            assert_eq!(res.unwrap_err().to_string(), "Size of initial parameter guess must be the same as the number of columns in the feature matrix `x`".to_string());
        }
    }

    #[test]
    fn uses_initial_params() {
        let log_reg = LogisticRegression::default()
            .initial_params(array![1.2], -4.12)
            .max_iterations(5);
        let dataset = ten_samples();
        let res = log_reg.fit(&dataset).unwrap();
        assert!(res.intercept().abs_diff_eq(&-4.126, 1e-3));
        assert!(res.params().abs_diff_eq(&array![1.181], 1e-3));
        assert_eq!(&res.predict(dataset.records()), dataset.targets());
    }

    #[test]
    fn without_intercept() {
        let x = array![[-2.0], [-1.0], [-0.5], [0.5], [1.0], [2.0]];
        let y = array![0, 0, 1, 0, 1, 1];
        let res = LogisticRegression::default()
            .with_intercept(false)
            .fit(&Dataset::new(x, y))
            .unwrap();

        assert_abs_diff_eq!(res.intercept(), 0.0);
        assert!(res.params()[0] > 0.0);
    }

    #[test]
    fn separates_random_data() {
        let mut rng = SmallRng::seed_from_u64(42);
        let x = Array2::random_using((200, 2), Uniform::new(-1., 1.), &mut rng);
        let y = x.map_axis(Axis(1), |row| (row[0] + 0.5 * row[1] > 0.1) as usize);
        let dataset = Dataset::new(x, y);

        let model = LogisticRegression::default().fit(&dataset).unwrap();
        let cm = model
            .predict(dataset.records())
            .confusion_matrix(dataset.targets())
            .unwrap();

        assert!(cm.accuracy() > 0.9);
        assert!(model.params()[0] > model.params()[1]);
    }

    #[test]
    fn works_with_f32() {
        let log_reg = LogisticRegression::default();
        let x: Array2<f32> = array![[-1.0], [-0.01], [0.01], [1.0]];
        let y = array![0, 0, 1, 1];
        let dataset = Dataset::new(x, y);
        let res = log_reg.fit(&dataset).unwrap();
        assert_abs_diff_eq!(res.intercept(), 0.0_f32, epsilon = 1e-4);
        assert!(res.params().abs_diff_eq(&array![0.682_f32], 1e-3));
        assert_eq!(&res.predict(dataset.records()), dataset.targets());
    }
}
