//! Newton-Raphson minimisation of the logistic loss
//!
//! The `Logit` fit needs the Hessian at the optimum for its Wald statistics and stops once a
//! Newton step changes no parameter by more than the tolerance, so it iterates here instead of
//! through the quasi-Newton solver of `LogisticRegression`.
use linfa_linalg::{cholesky::InverseC, LinalgError};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

use crate::error::{Error, Result};
use crate::{logistic_grad, logistic_hessian, logistic_loss, Float};

/// Number of times a Newton step is halved before giving up on a descent
const MAX_HALVINGS: usize = 40;

pub(crate) struct Solution<F> {
    pub params: Array1<F>,
    /// Objective at `params`
    pub loss: F,
    /// Hessian of the objective at `params`
    pub hessian: Array2<F>,
    pub iterations: u64,
    pub converged: bool,
}

/// Records and `{-1, 1}` encoded targets of a binary problem
pub(crate) struct LogisticProblem<'a, F: Float, A: Data<Elem = F>> {
    pub x: &'a ArrayBase<A, Ix2>,
    pub target: &'a Array1<F>,
    pub alpha: F,
}

fn max_abs<F: Float>(v: &Array1<F>) -> F {
    v.iter().fold(F::zero(), |acc, x| acc.max(x.abs()))
}

/// Invert a symmetric positive definite matrix
pub(crate) fn invert<F: Float>(matrix: &Array2<F>) -> Result<Array2<F>> {
    matrix.invc().map_err(|err| match err {
        LinalgError::NotPositiveDefinite => Error::SingularHessian,
        err => Error::LinalgError(err),
    })
}

impl<'a, F: Float, A: Data<Elem = F>> LogisticProblem<'a, F, A> {
    pub fn loss(&self, w: &Array1<F>) -> F {
        logistic_loss(self.x, self.target, self.alpha, w)
    }

    pub fn gradient(&self, w: &Array1<F>) -> Array1<F> {
        logistic_grad(self.x, self.target, self.alpha, w)
    }

    pub fn hessian(&self, w: &Array1<F>) -> Array2<F> {
        logistic_hessian(self.x, self.alpha, w)
    }

    /// Run Newton iterations from `init` until no parameter changes by more than `tolerance`
    /// or `max_iterations` steps were taken
    ///
    /// A step which does not decrease the loss is halved until it does. If no descent is found
    /// the solver stops at the current iterate without reporting convergence.
    pub fn minimize(
        &self,
        init: Array1<F>,
        max_iterations: u64,
        tolerance: F,
    ) -> Result<Solution<F>> {
        let mut w = init;
        let mut loss = self.loss(&w);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < max_iterations {
            let step = invert(&self.hessian(&w))?.dot(&self.gradient(&w));
            iterations += 1;

            // the full step is below the tolerance, so the loss may no longer resolve it
            if max_abs(&step) <= tolerance {
                w = &w - &step;
                loss = self.loss(&w);
                converged = true;
                break;
            }

            let mut scale = F::one();
            let mut candidate = &w - &step;
            let mut candidate_loss = self.loss(&candidate);
            let mut halvings = 0;
            while !(candidate_loss <= loss) && halvings < MAX_HALVINGS {
                scale *= F::cast(0.5);
                candidate = &w - &(&step * scale);
                candidate_loss = self.loss(&candidate);
                halvings += 1;
            }
            if !(candidate_loss <= loss) {
                log::debug!(
                    "no descent along the Newton direction in iteration {}",
                    iterations
                );
                break;
            }

            let change = max_abs(&(&candidate - &w));
            log::trace!(
                "iteration {}: loss {} -> {}, step scale {}",
                iterations,
                loss,
                candidate_loss,
                scale
            );
            w = candidate;
            loss = candidate_loss;

            if change <= tolerance {
                converged = true;
                break;
            }
        }

        Ok(Solution {
            hessian: self.hessian(&w),
            params: w,
            loss,
            iterations,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn converges_on_small_steps() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0], [9.0]];
        let y = array![-1., -1., -1., -1., 1., 1., 1., 1., 1., 1.];
        let problem = LogisticProblem {
            x: &x,
            target: &y,
            alpha: 1.0,
        };

        let solution = problem.minimize(Array1::zeros(2), 100, 1e-10).unwrap();

        assert!(solution.converged);
        assert!(solution.iterations < 20);
        assert_abs_diff_eq!(solution.params, array![1.181, -4.126], epsilon = 1e-3);
        assert!(problem.gradient(&solution.params).iter().all(|g: &f64| g.abs() < 1e-8));
        assert_abs_diff_eq!(solution.loss, problem.loss(&solution.params), epsilon = 1e-12);
        assert_abs_diff_eq!(solution.hessian, problem.hessian(&solution.params));
    }

    #[test]
    fn reports_missing_convergence() {
        let x = array![[-1.0], [-0.5], [0.5], [1.0]];
        let y = array![-1., 1., -1., 1.];
        let problem = LogisticProblem {
            x: &x,
            target: &y,
            alpha: 0.0,
        };

        let solution = problem
            .minimize(array![5.0], 1, 1e-12)
            .unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn singular_hessian_is_an_error() {
        // a column of zeros carries no information without penalty
        let x = array![[0.0, 1.0], [0.0, 2.0], [0.0, 3.0], [0.0, 4.0]];
        let y = array![-1., 1., -1., 1.];
        let problem = LogisticProblem {
            x: &x,
            target: &y,
            alpha: 0.0,
        };

        let res = problem.minimize(Array1::zeros(2), 10, 1e-8);
        assert!(matches!(res, Err(Error::SingularHessian)));
    }
}
