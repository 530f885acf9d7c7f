use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Settings of the analysis report
///
/// Every field has a default, so a TOML file only needs to name the settings it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// CSV file with the Framingham table, plain or gzip compressed
    pub data: PathBuf,
    /// Directory receiving the HTML plots
    pub output_dir: PathBuf,
    pub target: String,
    /// Columns removed before the analysis
    pub drop_columns: Vec<String>,
    /// Column renames, applied after dropping
    pub rename: BTreeMap<String, String>,
    /// Columns whose missing values are replaced by the mean
    pub mean_fill: Vec<String>,
    /// Columns whose missing values are replaced by the most frequent value
    pub mode_fill: Vec<String>,
    /// Share of the samples held out for testing
    pub test_size: f32,
    pub seed: u64,
    /// Significance level of the backward elimination
    pub significance: f64,
    /// Features of the reduced model, the elimination result is used when unset
    pub significant_features: Option<Vec<String>>,
    /// L2 penalty of the classifiers
    pub alpha: f64,
    pub histogram_bins: usize,
    /// Rows shown of tables and probabilities
    pub head: usize,
    pub plots: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let mut rename = BTreeMap::new();
        rename.insert("male".to_string(), "Male(Y/N)".to_string());

        ReportConfig {
            data: PathBuf::from("framingham.csv"),
            output_dir: PathBuf::from("report"),
            target: heartrisk_datasets::FRAMINGHAM_TARGET.to_string(),
            drop_columns: vec!["education".to_string()],
            rename,
            mean_fill: ["cigsPerDay", "totChol", "BMI", "heartRate", "glucose"]
                .iter()
                .map(|x| x.to_string())
                .collect(),
            mode_fill: vec!["BPMeds".to_string()],
            test_size: 0.2,
            seed: 5,
            significance: 0.05,
            significant_features: None,
            alpha: 1.0,
            histogram_bins: 20,
            head: 5,
            plots: true,
        }
    }
}

impl ReportConfig {
    /// Read settings from a TOML file, missing keys keep their default
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            bail!("test size must lie in (0, 1), got {}", self.test_size);
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            bail!(
                "significance level must lie in (0, 1), got {}",
                self.significance
            );
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            bail!("alpha must be a non-negative number, got {}", self.alpha);
        }
        if self.histogram_bins == 0 {
            bail!("histograms need at least one bin");
        }
        if let Some(features) = &self.significant_features {
            if features.is_empty() {
                bail!("the list of significant features is empty");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_follow_the_analysis() {
        let config = ReportConfig::default();

        assert_eq!(config.target, "TenYearCHD");
        assert_eq!(config.drop_columns, vec!["education"]);
        assert_eq!(config.rename["male"], "Male(Y/N)");
        assert_eq!(config.mean_fill.len(), 5);
        assert_eq!(config.mode_fill, vec!["BPMeds"]);
        assert_eq!((config.test_size, config.seed), (0.2, 5));
        assert_eq!(config.significance, 0.05);
        assert_eq!(config.histogram_bins, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data = "data/framingham.csv.gz"
seed = 42
significant_features = ["age", "sysBP"]

[rename]
male = "sex"
"#
        )
        .unwrap();

        let config = ReportConfig::from_path(file.path()).unwrap();
        assert_eq!(config.data, PathBuf::from("data/framingham.csv.gz"));
        assert_eq!(config.seed, 42);
        assert_eq!(config.rename["male"], "sex");
        assert_eq!(
            config.significant_features,
            Some(vec!["age".to_string(), "sysBP".to_string()])
        );
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn rejects_unknown_keys_and_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sede = 3").unwrap();
        assert!(ReportConfig::from_path(file.path()).is_err());

        let err = ReportConfig::from_path("does/not/exist.toml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn validates_ranges() {
        let config = ReportConfig {
            test_size: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            significance: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            significant_features: Some(vec![]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
