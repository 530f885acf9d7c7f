//! Unpenalised logit with Wald inference
use std::fmt;

use heartrisk::dataset::{AsTargets, DatasetBase};
use heartrisk::traits::Fit;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Ix2, Zip};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use statrs::function::{erf, gamma};

use crate::error::{Error, Result};
use crate::hyperparams::LogitValidParams;
use crate::newton::{invert, LogisticProblem};
use crate::{label_classes, logistic, validate_records, Float};

pub(crate) fn to_f64<F: Float>(x: F) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// Two sided p-value of a standard normal test statistic
fn normal_pvalue(z: f64) -> f64 {
    erf::erfc(z.abs() / std::f64::consts::SQRT_2)
}

/// Quantile of the standard normal distribution at `1 - alpha / 2`
fn normal_quantile(alpha: f64) -> f64 {
    std::f64::consts::SQRT_2 * erf::erf_inv(1.0 - alpha)
}

/// Survival function of the chi-squared distribution with `df` degrees of freedom
fn chi2_sf(x: f64, df: usize) -> f64 {
    if df == 0 || x.is_nan() {
        f64::NAN
    } else if x <= 0.0 {
        1.0
    } else {
        gamma::gamma_ur(df as f64 / 2.0, x / 2.0)
    }
}

/// A column of identical, non-zero values acts as intercept
fn is_constant<F: Float>(column: ArrayView1<F>) -> bool {
    match column.iter().next() {
        Some(first) if !first.is_zero() => column.iter().all(|x| x == first),
        _ => false,
    }
}

/// Log-likelihood of the model which only estimates the share of positive samples
fn null_log_likelihood<F: Float>(positives: usize, nobs: usize) -> F {
    let (n1, n) = (F::cast(positives), F::cast(nobs));
    let p = n1 / n;
    n1 * p.ln() + (n - n1) * (F::one() - p).ln()
}

impl<C, F, D, T> Fit<ArrayBase<D, Ix2>, T, Error> for LogitValidParams<F>
where
    C: Ord + Clone,
    F: Float,
    D: Data<Elem = F>,
    T: AsTargets<Elem = C>,
{
    type Object = LogitResults<F>;

    /// Fit the logit by maximum likelihood on exactly the columns of the records
    ///
    /// The larger of the two classes is the event being modelled. Non-finite records, a number
    /// of classes other than two or a design without full column rank are errors. Running out of
    /// iterations is not: the results are returned with `converged() == false`.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let x = dataset.records();
        let (_, target) = label_classes::<F, _, _>(dataset.targets())?;
        validate_records(x, &target)?;
        if x.ncols() == 0 {
            return Err(Error::NoFeatures);
        }

        let problem = LogisticProblem {
            x,
            target: &target,
            alpha: F::zero(),
        };
        let solution =
            problem.minimize(Array1::zeros(x.ncols()), self.max_iterations, self.tolerance)?;
        if !solution.converged {
            log::warn!(
                "maximum likelihood optimization failed to converge after {} iterations",
                solution.iterations
            );
        }

        let cov_params = invert(&solution.hessian)?;
        let nobs = x.nrows();
        let k_constant = x.columns().into_iter().any(is_constant) as usize;
        let positives = target
            .iter()
            .filter(|t| **t == F::POSITIVE_LABEL)
            .count();

        Ok(LogitResults::new(
            dataset.feature_names(),
            solution.params,
            cov_params,
            nobs,
            x.ncols() - k_constant,
            -solution.loss,
            null_log_likelihood(positives, nobs),
            solution.iterations,
            solution.converged,
        ))
    }
}

/// Estimates and inference of a fitted [`Logit`](crate::Logit)
///
/// Standard errors come from the inverse of the observed information matrix, p-values and
/// confidence intervals from the normal approximation of the Wald statistic.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LogitResults<F: Float> {
    feature_names: Vec<String>,
    params: Array1<F>,
    cov_params: Array2<F>,
    bse: Array1<F>,
    zvalues: Array1<F>,
    pvalues: Array1<F>,
    nobs: usize,
    df_model: usize,
    llf: F,
    llnull: F,
    iterations: u64,
    converged: bool,
}

impl<F: Float> LogitResults<F> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        feature_names: Vec<String>,
        params: Array1<F>,
        cov_params: Array2<F>,
        nobs: usize,
        df_model: usize,
        llf: F,
        llnull: F,
        iterations: u64,
        converged: bool,
    ) -> Self {
        let bse = cov_params.diag().mapv(|v| v.sqrt());
        let zvalues = &params / &bse;
        let pvalues = zvalues.mapv(|z| F::cast(normal_pvalue(to_f64(z))));

        LogitResults {
            feature_names,
            params,
            cov_params,
            bse,
            zvalues,
            pvalues,
            nobs,
            df_model,
            llf,
            llnull,
            iterations,
            converged,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Estimated coefficients, one per column of the records
    pub fn params(&self) -> &Array1<F> {
        &self.params
    }

    /// Coefficient of a named feature
    pub fn param(&self, name: &str) -> Option<F> {
        self.position(name).map(|idx| self.params[idx])
    }

    /// Covariance matrix of the estimates
    pub fn cov_params(&self) -> &Array2<F> {
        &self.cov_params
    }

    /// Standard errors of the estimates
    pub fn bse(&self) -> &Array1<F> {
        &self.bse
    }

    pub fn zvalues(&self) -> &Array1<F> {
        &self.zvalues
    }

    /// Two sided p-values of the Wald statistics
    pub fn pvalues(&self) -> &Array1<F> {
        &self.pvalues
    }

    pub fn pvalue(&self, name: &str) -> Option<F> {
        self.position(name).map(|idx| self.pvalues[idx])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|x| x == name)
    }

    /// Number of observations
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// Number of estimated coefficients, not counting a constant column
    pub fn df_model(&self) -> usize {
        self.df_model
    }

    pub fn df_resid(&self) -> usize {
        self.nobs.saturating_sub(self.params.len())
    }

    /// Log-likelihood at the estimates
    pub fn llf(&self) -> F {
        self.llf
    }

    /// Log-likelihood of the intercept only model
    pub fn llnull(&self) -> F {
        self.llnull
    }

    /// Likelihood ratio statistic against the intercept only model
    pub fn llr(&self) -> F {
        F::cast(2.0) * (self.llf - self.llnull)
    }

    /// Chi-squared p-value of the likelihood ratio with `df_model` degrees of freedom
    pub fn llr_pvalue(&self) -> F {
        F::cast(chi2_sf(to_f64(self.llr()), self.df_model))
    }

    /// McFadden's pseudo R-squared
    pub fn prsquared(&self) -> F {
        F::one() - self.llf / self.llnull
    }

    /// Akaike information criterion
    pub fn aic(&self) -> F {
        let k = F::cast(self.params.len());
        F::cast(-2.0) * self.llf + F::cast(2.0) * k
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> F {
        let k = F::cast(self.params.len());
        F::cast(-2.0) * self.llf + k * F::cast(self.nobs).ln()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Confidence intervals at level `1 - alpha`
    ///
    /// Returns one row per coefficient holding the lower and upper bound.
    pub fn conf_int(&self, alpha: F) -> Array2<F> {
        let q = F::cast(normal_quantile(to_f64(alpha)));
        let mut bounds = Array2::zeros((self.params.len(), 2));
        Zip::from(bounds.rows_mut())
            .and(&self.params)
            .and(&self.bse)
            .for_each(|mut row, &param, &bse| {
                row[0] = param - q * bse;
                row[1] = param + q * bse;
            });
        bounds
    }

    /// Exponentiated coefficients
    pub fn odds_ratios(&self) -> Array1<F> {
        self.params.mapv(|p| p.exp())
    }

    /// Odds ratios with their confidence bounds at level `1 - alpha` and p-values rounded to
    /// three decimals
    pub fn odds_ratio_table(&self, alpha: F) -> OddsRatioTable<F> {
        let bounds = self.conf_int(alpha).mapv(|b| b.exp());
        let thousand = F::cast(1000.0);
        let rows = self
            .feature_names
            .iter()
            .zip(bounds.rows())
            .zip(self.odds_ratios().iter().zip(self.pvalues.iter()))
            .map(|((feature, bounds), (&odds_ratio, &pvalue))| OddsRatioRow {
                feature: feature.clone(),
                lower: bounds[0],
                upper: bounds[1],
                odds_ratio,
                pvalue: (pvalue * thousand).round() / thousand,
            })
            .collect();

        OddsRatioTable { alpha, rows }
    }

    /// Probability of the larger class for every row of `x`
    pub fn predict_probabilities<A: Data<Elem = F>>(&self, x: &ArrayBase<A, Ix2>) -> Array1<F> {
        x.dot(&self.params).mapv(logistic)
    }

    /// Printable summary with 95% confidence intervals
    pub fn summary(&self) -> LogitSummary<'_, F> {
        LogitSummary {
            results: self,
            alpha: 0.05,
        }
    }
}

/// Tabular summary of [`LogitResults`], rendered through `Display`
pub struct LogitSummary<'a, F: Float> {
    results: &'a LogitResults<F>,
    alpha: f64,
}

impl<'a, F: Float> LogitSummary<'a, F> {
    /// Change the level of the confidence intervals to `1 - alpha`
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

fn info_row(
    f: &mut fmt::Formatter<'_>,
    width: usize,
    left: (&str, String),
    right: (&str, String),
) -> fmt::Result {
    let half = width / 2;
    writeln!(
        f,
        "{:<22}{:>lw$}   {:<22}{:>rw$}",
        left.0,
        left.1,
        right.0,
        right.1,
        lw = half - 25,
        rw = width - half - 22
    )
}

impl<'a, F: Float> fmt::Display for LogitSummary<'a, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.results;
        let name_width = r
            .feature_names
            .iter()
            .map(|name| name.len() + 1)
            .max()
            .unwrap_or(0)
            .max(11);
        let width = name_width + 67;
        let double = "=".repeat(width);

        writeln!(f, "{:^width$}", "Logit Regression Results", width = width)?;
        writeln!(f, "{}", double)?;
        info_row(
            f,
            width,
            ("No. Observations:", r.nobs.to_string()),
            ("Df Residuals:", r.df_resid().to_string()),
        )?;
        info_row(
            f,
            width,
            ("Method:", "MLE".into()),
            ("Df Model:", r.df_model.to_string()),
        )?;
        info_row(
            f,
            width,
            ("Converged:", if r.converged { "True" } else { "False" }.into()),
            ("Pseudo R-squ.:", format!("{:.4}", to_f64(r.prsquared()))),
        )?;
        info_row(
            f,
            width,
            ("Iterations:", r.iterations.to_string()),
            ("Log-Likelihood:", format!("{:.2}", to_f64(r.llf))),
        )?;
        info_row(
            f,
            width,
            ("AIC:", format!("{:.2}", to_f64(r.aic()))),
            ("LL-Null:", format!("{:.2}", to_f64(r.llnull))),
        )?;
        info_row(
            f,
            width,
            ("BIC:", format!("{:.2}", to_f64(r.bic()))),
            ("LLR p-value:", format!("{:.4e}", to_f64(r.llr_pvalue()))),
        )?;
        writeln!(f, "{}", double)?;

        writeln!(
            f,
            "{:<nw$}{:>10}{:>11}{:>11}{:>11}{:>12}{:>12}",
            "",
            "coef",
            "std err",
            "z",
            "P>|z|",
            format!("[{:.3}", self.alpha / 2.0),
            format!("{:.3}]", 1.0 - self.alpha / 2.0),
            nw = name_width
        )?;
        writeln!(f, "{}", "-".repeat(width))?;
        let bounds = r.conf_int(F::cast(self.alpha));
        for (idx, name) in r.feature_names.iter().enumerate() {
            writeln!(
                f,
                "{:<nw$}{:>10.4}{:>11.3}{:>11.3}{:>11.3}{:>12.3}{:>12.3}",
                name,
                to_f64(r.params[idx]),
                to_f64(r.bse[idx]),
                to_f64(r.zvalues[idx]),
                to_f64(r.pvalues[idx]),
                to_f64(bounds[(idx, 0)]),
                to_f64(bounds[(idx, 1)]),
                nw = name_width
            )?;
        }
        write!(f, "{}", double)?;
        if !r.converged {
            write!(
                f,
                "\nWarning: maximum number of iterations reached before convergence"
            )?;
        }
        Ok(())
    }
}

/// A row of an [`OddsRatioTable`]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct OddsRatioRow<F> {
    pub feature: String,
    pub lower: F,
    pub upper: F,
    pub odds_ratio: F,
    /// Rounded to three decimals
    pub pvalue: F,
}

/// Odds ratios of a fitted logit with confidence bounds and p-values
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct OddsRatioTable<F> {
    alpha: F,
    rows: Vec<OddsRatioRow<F>>,
}

/// Render a fraction as percentage with at most two decimals, `0.025` becomes `2.5`
fn percent(fraction: f64) -> String {
    format!("{}", (fraction * 1e4).round() / 100.0)
}

impl<F: Float> OddsRatioTable<F> {
    pub fn alpha(&self) -> F {
        self.alpha
    }

    pub fn rows(&self) -> &[OddsRatioRow<F>] {
        &self.rows
    }

    pub fn get(&self, feature: &str) -> Option<&OddsRatioRow<F>> {
        self.rows.iter().find(|row| row.feature == feature)
    }

    /// Column headers, e.g. `CI 95%(2.5%)`, `CI 95%(97.5%)`, `Odds Ratio`, `pvalue`
    pub fn headers(&self) -> [String; 4] {
        let alpha = to_f64(self.alpha);
        let level = percent(1.0 - alpha);
        [
            format!("CI {}%({}%)", level, percent(alpha / 2.0)),
            format!("CI {}%({}%)", level, percent(1.0 - alpha / 2.0)),
            "Odds Ratio".to_string(),
            "pvalue".to_string(),
        ]
    }
}

impl<F: Float> fmt::Display for OddsRatioTable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers = self.headers();
        let name_width = self
            .rows
            .iter()
            .map(|row| row.feature.len())
            .max()
            .unwrap_or(0);
        let widths = headers.iter().map(|h| h.len().max(10)).collect::<Vec<_>>();

        write!(f, "{:<nw$}", "", nw = name_width)?;
        for (header, width) in headers.iter().zip(&widths) {
            write!(f, "  {:>w$}", header, w = width)?;
        }
        for row in &self.rows {
            write!(f, "\n{:<nw$}", row.feature, nw = name_width)?;
            for (value, width) in [row.lower, row.upper, row.odds_ratio].iter().zip(&widths) {
                write!(f, "  {:>w$.6}", to_f64(*value), w = width)?;
            }
            write!(f, "  {:>w$.3}", to_f64(row.pvalue), w = widths[3])?;
        }
        Ok(())
    }
}
