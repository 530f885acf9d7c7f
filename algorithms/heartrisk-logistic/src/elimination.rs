//! Greedy backward elimination of features by their Wald p-value
use heartrisk::dataset::{AsTargets, DatasetBase};
use heartrisk::traits::Fit;
use ndarray::{ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hyperparams::BackwardEliminationValidParams;
use crate::logit::{to_f64, LogitResults};
use crate::Float;

/// Outcome of a [`BackwardElimination`](crate::BackwardElimination)
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationResult<F: Float> {
    results: LogitResults<F>,
    eliminated: Vec<(String, F)>,
    refits: usize,
}

impl<F: Float> EliminationResult<F> {
    /// Logit fitted on the surviving features
    pub fn results(&self) -> &LogitResults<F> {
        &self.results
    }

    pub fn into_results(self) -> LogitResults<F> {
        self.results
    }

    /// Removed features in the order of removal, with the p-value that removed them
    pub fn eliminated(&self) -> &[(String, F)] {
        &self.eliminated
    }

    /// Number of logits fitted, including the final one
    pub fn refits(&self) -> usize {
        self.refits
    }

    pub fn kept_features(&self) -> &[String] {
        self.results.feature_names()
    }
}

/// Position and value of the largest p-value, a NaN ranks above every number and the first
/// of equal values wins
fn largest_pvalue<F: Float>(results: &LogitResults<F>) -> Option<(usize, F)> {
    results
        .pvalues()
        .iter()
        .map(|&p| if p.is_nan() { F::infinity() } else { p })
        .enumerate()
        .fold(None, |largest, (idx, p)| match largest {
            Some((_, max)) if !(p > max) => largest,
            _ => Some((idx, p)),
        })
}

impl<C, F, D, T> Fit<ArrayBase<D, Ix2>, T, Error> for BackwardEliminationValidParams<F>
where
    C: Ord + Clone,
    F: Float,
    D: Data<Elem = F>,
    T: AsTargets<Elem = C>,
{
    type Object = EliminationResult<F>;

    /// Refit a logit while the largest p-value exceeds the threshold, dropping that column
    /// each round
    ///
    /// Fails with [`Error::EliminationExhausted`] when every column was removed.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let records = dataset.records();
        let targets = dataset.targets().as_targets();
        let names = dataset.feature_names();

        let mut kept = (0..records.ncols()).collect::<Vec<_>>();
        let mut eliminated = Vec::new();
        let mut refits = 0;

        while !kept.is_empty() {
            let subset = DatasetBase::new(records.select(Axis(1), &kept), targets.view())
                .with_feature_names(kept.iter().map(|&idx| names[idx].clone()).collect());
            let results = self.logit.fit(&subset)?;
            refits += 1;

            match largest_pvalue(&results) {
                Some((idx, pvalue)) if pvalue > self.threshold => {
                    let name = results.feature_names()[idx].clone();
                    log::debug!(
                        "eliminating `{}` with p-value {:.4}, {} features left",
                        name,
                        pvalue,
                        kept.len() - 1
                    );
                    eliminated.push((name, results.pvalues()[idx]));
                    kept.remove(idx);
                }
                _ => {
                    log::debug!(
                        "backward elimination kept {} features after {} fits",
                        kept.len(),
                        refits
                    );
                    return Ok(EliminationResult {
                        results,
                        eliminated,
                        refits,
                    });
                }
            }
        }

        Err(Error::EliminationExhausted(to_f64(self.threshold)))
    }
}
