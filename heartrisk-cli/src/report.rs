//! The analysis report, printed step by step
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use heartrisk::metrics::{BinaryClassification, ToConfusionMatrix};
use heartrisk::traits::{Fit, Predict, Transformer};
use heartrisk::{Dataset, DatasetBase};
use heartrisk_datasets::Table;
use heartrisk_logistic::{BackwardElimination, EliminationResult, Logit, LogisticRegression};
use heartrisk_preprocessing::{ImputeStrategy, Imputer};
use plotly::Plot;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::ReportConfig;
use crate::plots;

/// Level of the confidence intervals of the odds ratios
const ODDS_RATIO_ALPHA: f64 = 0.05;

/// Scores of a classifier fitted on the training split
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScores {
    pub train_accuracy: f32,
    pub test_accuracy: f32,
    pub misclassification: f32,
    /// Undefined when the test split holds a single class
    pub roc_auc: Option<f64>,
}

/// What a report run produced besides its text
#[derive(Debug, Clone)]
pub struct Outcome {
    pub full: ModelScores,
    pub significant: ModelScores,
    pub significant_features: Vec<String>,
    pub eliminated: Vec<String>,
    pub plots: Vec<PathBuf>,
}

struct Report<'a, W> {
    config: &'a ReportConfig,
    out: &'a mut W,
    plots: Vec<PathBuf>,
}

/// Run the whole analysis and write the report to `out`
pub fn run<W: Write>(config: &ReportConfig, out: &mut W) -> Result<Outcome> {
    config.validate()?;
    let mut report = Report {
        config,
        out,
        plots: Vec::new(),
    };

    let table = report.load()?;
    let table = report.impute(table)?;
    report.explore(&table)?;

    let dataset = table
        .into_dataset(&config.target)
        .with_context(|| format!("failed to use `{}` as class labels", config.target))?;

    writeln!(report.out, "== Logistic regression on all features ==\n")?;
    let full = report.evaluate("full", &dataset)?;

    let with_constant = dataset.with_constant();
    report.logit(&with_constant)?;
    let elimination = report.eliminate(&with_constant)?;

    let significant_features = match &config.significant_features {
        Some(features) => features.clone(),
        None => elimination
            .kept_features()
            .iter()
            .filter(|name| *name != "const")
            .cloned()
            .collect(),
    };
    if significant_features.is_empty() {
        bail!(
            "no feature is significant at level {}",
            config.significance
        );
    }
    let names = significant_features
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>();
    let reduced = dataset.select_features_by_name(&names)?;

    writeln!(
        report.out,
        "== Logistic regression on the significant features: {} ==\n",
        names.join(", ")
    )?;
    let significant = report.evaluate("significant", &reduced)?;

    report.odds_ratios(&elimination)?;

    Ok(Outcome {
        full,
        significant,
        significant_features,
        eliminated: elimination
            .eliminated()
            .iter()
            .map(|(name, _)| name.clone())
            .collect(),
        plots: report.plots,
    })
}

impl<'a, W: Write> Report<'a, W> {
    fn save(&mut self, plot: Plot, name: &str) -> Result<()> {
        if self.config.plots {
            let path = plots::save(&plot, &self.config.output_dir, name)?;
            self.plots.push(path);
        }
        Ok(())
    }

    fn null_counts(&mut self, table: &Table) -> Result<()> {
        for (name, count) in table.null_counts() {
            writeln!(self.out, "{:<18}{:>6}", name, count)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Read the table, drop and rename columns
    fn load(&mut self) -> Result<Table> {
        let config = self.config;
        let table = heartrisk_datasets::framingham(&config.data)
            .with_context(|| format!("failed to load {}", config.data.display()))?;
        writeln!(
            self.out,
            "Initial data has {} rows and {} columns:\n{}\n",
            table.nrows(),
            table.ncols(),
            table.head(config.head)
        )?;

        let dropped = config
            .drop_columns
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        let mut table = table.drop_columns(&dropped)?;
        if !dropped.is_empty() {
            writeln!(
                self.out,
                "Data after dropping {}:\n{}\n",
                dropped.join(", "),
                table.head(config.head)
            )?;
        }

        for (from, to) in &config.rename {
            table.rename_column(from, to)?;
            writeln!(self.out, "Renamed column {} to {}", from, to)?;
        }
        if !config.rename.is_empty() {
            writeln!(self.out, "{}\n", table.head(config.head))?;
        }

        Ok(table)
    }

    /// Summarize missing values and fill them
    fn impute(&mut self, table: Table) -> Result<Table> {
        writeln!(self.out, "Missing values per column:")?;
        self.null_counts(&table)?;
        writeln!(
            self.out,
            "{} of {} rows have a missing value, a proportion of {:.2}%\n",
            table.rows_with_missing(),
            table.nrows(),
            table.missing_proportion()
        )?;
        writeln!(self.out, "Summary of the whole table:\n{}\n", table.describe())?;

        let mut params = Imputer::params();
        for name in &self.config.mean_fill {
            params = params.mean(name.as_str());
        }
        for name in &self.config.mode_fill {
            params = params.mode(name.as_str());
        }
        let records = DatasetBase::new(table.values().view(), ())
            .with_feature_names(table.column_names().to_vec());
        let imputer = params
            .fit(&records)
            .context("failed to learn the fill values")?;

        for fill in imputer.fill_values() {
            writeln!(
                self.out,
                "Summary of {} before imputation:\n{}\n",
                fill.name,
                table.column_summary(&fill.name)?
            )?;
            if fill.strategy == ImputeStrategy::Mode {
                for (value, count) in table.value_counts(&fill.name)? {
                    writeln!(self.out, "{:<8}{:>6}", value, count)?;
                }
                writeln!(self.out)?;
            }
        }

        let values = imputer.transform(table.values().to_owned());
        let table = Table::new(table.column_names().to_vec(), values)?;

        for fill in imputer.fill_values() {
            writeln!(
                self.out,
                "Missing values of {} are filled with the {} {:.4}, new summary:\n{}\n",
                fill.name,
                fill.strategy,
                fill.value,
                table.column_summary(&fill.name)?
            )?;
        }

        writeln!(self.out, "Missing values per column after imputation:")?;
        self.null_counts(&table)?;

        Ok(table)
    }

    /// Histograms of all columns and class counts of the target
    fn explore(&mut self, table: &Table) -> Result<()> {
        let config = self.config;
        let target = config.target.as_str();

        writeln!(self.out, "Number of patients per class of {}:", target)?;
        for (value, count) in table.value_counts(target)? {
            writeln!(self.out, "{:<8}{:>6}", value, count)?;
        }
        writeln!(self.out)?;

        let classes = table
            .column(target)?
            .iter()
            .filter(|x| !x.is_nan())
            .map(|x| *x as usize)
            .collect::<Vec<_>>();
        self.save(plots::histograms(table, config.histogram_bins), "histograms")?;
        self.save(plots::target_histogram(&classes, target), "target_histogram")
    }

    /// Fit a penalised logistic regression on a seeded training split and score it on the rest
    fn evaluate(&mut self, name: &str, dataset: &Dataset<f64, usize>) -> Result<ModelScores> {
        let config = self.config;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let (train, test) = dataset
            .shuffle(&mut rng)
            .train_test_split(config.test_size);
        if test.nsamples() == 0 {
            bail!(
                "a test size of {} leaves no test samples out of {}",
                config.test_size,
                dataset.nsamples()
            );
        }
        log::info!(
            "{} model: {} training and {} test samples",
            name,
            train.nsamples(),
            test.nsamples()
        );

        let model = LogisticRegression::params()
            .alpha(config.alpha)
            .fit(&train)
            .with_context(|| format!("failed to fit the {} model", name))?;

        writeln!(self.out, "Coefficients of the model:")?;
        for (feature, coef) in train.feature_names().iter().zip(model.params()) {
            writeln!(self.out, "  {:<18}{:>12.6}", feature, coef)?;
        }
        writeln!(self.out, "Intercept of the model: {:.6}\n", model.intercept())?;

        let train_accuracy = model
            .predict(train.records())
            .confusion_matrix(train.targets())?
            .accuracy();
        let cm = model
            .predict(test.records())
            .confusion_matrix(test.targets())?;
        writeln!(
            self.out,
            "Accuracy on the training data: {:.4}\nAccuracy on the test data: {:.4}\n",
            train_accuracy,
            cm.accuracy()
        )?;

        let proba = model.predict_proba(test.records());
        writeln!(
            self.out,
            "Probabilities of the first {} test samples:\n{:<6}{:>30}{:>28}",
            config.head.min(test.nsamples()),
            "",
            "Prob of no heart disease (0)",
            "Prob of Heart Disease (1)"
        )?;
        for (idx, row) in proba.outer_iter().take(config.head).enumerate() {
            writeln!(self.out, "{:<6}{:>30.6}{:>28.6}", idx, row[0], row[1])?;
        }
        writeln!(self.out)?;

        let (tn, fp) = (cm.get(&0, &0), cm.get(&0, &1));
        let (fn_, tp) = (cm.get(&1, &0), cm.get(&1, &1));
        writeln!(
            self.out,
            "Confusion matrix:\n{:<10}{:>13}{:>13}\n{:<10}{:>13}{:>13}\n{:<10}{:>13}{:>13}\n",
            "",
            "Predicted:0",
            "Predicted:1",
            "Actual:0",
            tn,
            fp,
            "Actual:1",
            fn_,
            tp
        )?;
        let accuracy = (tp + tn) as f32 / (tp + tn + fp + fn_) as f32;
        writeln!(
            self.out,
            "The accuracy of the model is {:.4} and the misclassification is {:.4}\n",
            accuracy,
            1.0 - accuracy
        )?;
        writeln!(self.out, "{}\n", cm.classification_report())?;
        self.save(
            plots::confusion_heatmap(&cm, &format!("Confusion matrix of the {} model", name)),
            &format!("confusion_{}", name),
        )?;

        let truth = test.targets().iter().map(|t| *t == 1).collect::<Vec<_>>();
        let roc_auc = match model.predict_probabilities(test.records()).roc(&truth) {
            Ok(roc) => {
                writeln!(self.out, "ROC AUC score: {:.4}\n", roc.area_under_curve())?;
                self.save(plots::roc_curve(&roc), &format!("roc_{}", name))?;
                Some(roc.area_under_curve())
            }
            Err(heartrisk::Error::SingleClass) => {
                log::warn!(
                    "the test split of the {} model holds a single class, ROC is undefined",
                    name
                );
                None
            }
            Err(err) => return Err(err.into()),
        };

        Ok(ModelScores {
            train_accuracy,
            test_accuracy: cm.accuracy(),
            misclassification: cm.misclassification_rate(),
            roc_auc,
        })
    }

    /// Unpenalised logit on all features
    fn logit(&mut self, dataset: &Dataset<f64, usize>) -> Result<()> {
        let results = Logit::params()
            .fit(dataset)
            .context("failed to fit the logit on all features")?;
        writeln!(
            self.out,
            "== Logit on all features with a constant column ==\n\n{}\n",
            results.summary()
        )?;
        Ok(())
    }

    fn eliminate(&mut self, dataset: &Dataset<f64, usize>) -> Result<EliminationResult<f64>> {
        let elimination = BackwardElimination::params()
            .threshold(self.config.significance)
            .fit(dataset)
            .context("backward elimination failed")?;

        writeln!(
            self.out,
            "== Backward elimination at level {} ==\n\n{}\n",
            self.config.significance,
            elimination.results().summary()
        )?;
        writeln!(
            self.out,
            "Eliminated {} features in {} fits:",
            elimination.eliminated().len(),
            elimination.refits()
        )?;
        for (name, pvalue) in elimination.eliminated() {
            writeln!(self.out, "  {:<18} p-value {:.4}", name, pvalue)?;
        }
        writeln!(self.out)?;

        Ok(elimination)
    }

    fn odds_ratios(&mut self, elimination: &EliminationResult<f64>) -> Result<()> {
        writeln!(
            self.out,
            "== Odds ratios ==\n\n{}",
            elimination.results().odds_ratio_table(ODDS_RATIO_ALPHA)
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heartrisk_datasets::FRAMINGHAM_COLUMNS;
    use ndarray::{array, Array2};
    use rand::Rng;
    use std::fs;
    use std::path::Path;

    /// Patients whose risk grows with age, sex and systolic blood pressure, with a few missing
    /// cells in the imputed columns
    fn write_synthetic(path: &Path) {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut csv = FRAMINGHAM_COLUMNS.join(",");

        for i in 0..400usize {
            let male = rng.gen_bool(0.45) as u8;
            let age = rng.gen_range(32..70);
            let education = rng.gen_range(1..5);
            let smoker = rng.gen_bool(0.5);
            let cigs = if smoker { rng.gen_range(1..40) } else { 0 };
            let sys_bp = rng.gen_range(100.0..200.0);
            let eta = -9.0 + 0.08 * age as f64 + 0.7 * male as f64 + 0.025 * sys_bp;
            let chd = (rng.gen::<f64>() < 1.0 / (1.0 + (-eta).exp())) as u8;

            let cell = |every: usize, value: String| {
                if i % every == 3 {
                    "NA".to_string()
                } else {
                    value
                }
            };
            let row = [
                male.to_string(),
                age.to_string(),
                cell(37, education.to_string()),
                (smoker as u8).to_string(),
                cell(53, cigs.to_string()),
                cell(71, (rng.gen_bool(0.1) as u8).to_string()),
                (rng.gen_bool(0.1) as u8).to_string(),
                (rng.gen_bool(0.3) as u8).to_string(),
                (rng.gen_bool(0.1) as u8).to_string(),
                cell(29, format!("{:.0}", rng.gen_range(150.0..350.0))),
                format!("{:.1}", sys_bp),
                format!("{:.1}", rng.gen_range(60.0..120.0)),
                cell(61, format!("{:.2}", rng.gen_range(18.0..40.0))),
                cell(97, rng.gen_range(50..110).to_string()),
                cell(19, rng.gen_range(60..140).to_string()),
                chd.to_string(),
            ];
            csv.push('\n');
            csv.push_str(&row.join(","));
        }

        fs::write(path, csv).unwrap();
    }

    fn config(dir: &Path) -> ReportConfig {
        let data = dir.join("framingham.csv");
        write_synthetic(&data);

        ReportConfig {
            data,
            output_dir: dir.join("report"),
            ..Default::default()
        }
    }

    #[test]
    fn runs_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut out = Vec::new();

        let outcome = run(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Initial data has 400 rows and 16 columns"));
        assert!(text.contains("Renamed column male to Male(Y/N)"));
        assert!(text.contains("Missing values of BPMeds are filled with the mode"));
        assert_eq!(text.matches("Logit Regression Results").count(), 2);
        assert!(text.contains("CI 95%(2.5%)"));
        assert!(text.contains("Prob of Heart Disease (1)"));

        assert!(outcome
            .significant_features
            .iter()
            .any(|name| name == "age"));
        assert!(outcome
            .significant_features
            .iter()
            .any(|name| name == "sysBP"));
        assert!(!outcome.significant_features.iter().any(|n| n == "const"));
        assert!(outcome.full.test_accuracy > 0.5);
        assert!(outcome.significant.roc_auc.unwrap() > 0.5);
        assert!(
            (outcome.full.test_accuracy + outcome.full.misclassification - 1.0).abs() < 1e-6
        );

        assert_eq!(outcome.plots.len(), 6);
        assert!(outcome.plots.iter().all(|path| path.exists()));
        assert!(dir.path().join("report/roc_significant.html").exists());
    }

    #[test]
    fn bundled_sample_runs_to_the_odds_ratios() {
        let dir = tempfile::tempdir().unwrap();
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../datasets/data");
        let config = ReportConfig {
            data: data.join("framingham_sample.csv"),
            output_dir: dir.path().join("report"),
            ..Default::default()
        };
        let mut out = Vec::new();

        let outcome = run(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Initial data has 300 rows and 16 columns"));
        assert_eq!(outcome.eliminated.len(), 13);
        assert_eq!(outcome.eliminated[0], "BPMeds");
        assert_eq!(outcome.significant_features, vec!["age"]);

        let odds = text.split("== Odds ratios ==").nth(1).unwrap();
        assert!(odds.contains("Odds Ratio"));
        assert!(odds.contains("CI 95%(97.5%)"));
        assert!(odds.contains("age"));
        assert!(!odds.contains("sysBP"));
    }

    #[test]
    fn configured_features_skip_the_elimination_result() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            significant_features: Some(vec!["age".to_string(), "Male(Y/N)".to_string()]),
            plots: false,
            ..config(dir.path())
        };

        let outcome = run(&config, &mut Vec::new()).unwrap();
        assert_eq!(outcome.significant_features, vec!["age", "Male(Y/N)"]);
        assert!(outcome.plots.is_empty());
        assert!(!dir.path().join("report").exists());
    }

    #[test]
    fn single_class_test_split_skips_roc() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            output_dir: dir.path().join("report"),
            test_size: 0.125,
            ..Default::default()
        };
        let dataset = Dataset::new(
            Array2::from_shape_fn((8, 1), |(i, _)| i as f64),
            array![0, 1, 0, 1, 1, 0, 1, 0],
        )
        .with_feature_names(vec!["age"]);

        let mut out = Vec::new();
        let mut report = Report {
            config: &config,
            out: &mut out,
            plots: Vec::new(),
        };
        let scores = report.evaluate("tiny", &dataset).unwrap();
        let plots = report.plots;

        assert_eq!(scores.roc_auc, None);
        assert_eq!(plots, vec![dir.path().join("report/confusion_tiny.html")]);
        assert!(!String::from_utf8(out).unwrap().contains("ROC AUC score"));
    }

    #[test]
    fn missing_data_file_names_the_path() {
        let config = ReportConfig {
            data: PathBuf::from("no/such/framingham.csv"),
            ..Default::default()
        };

        let err = run(&config, &mut Vec::new()).unwrap_err();
        assert!(format!("{:#}", err).contains("no/such/framingham.csv"));
    }
}
