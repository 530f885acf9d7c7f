//! Command line front end of the heart disease risk analysis
//!
//! ```text
//! heartrisk --data framingham.csv --output-dir report -v
//! ```
//!
//! Settings are read from an optional TOML file first, flags given on the command line take
//! precedence. The log level follows `HEARTRISK_LOG`, raised by every `-v`.
mod config;
mod plots;
mod report;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::LevelFilter;

use crate::config::ReportConfig;

#[derive(Parser, Debug)]
#[command(
    name = "heartrisk",
    version,
    about = "Logistic regression analysis of the Framingham heart study"
)]
struct Cli {
    /// CSV file with the Framingham table, plain or gzip compressed
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// TOML file with report settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the HTML plots
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Seed of the train/test shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Share of the samples held out for testing
    #[arg(long)]
    test_size: Option<f32>,

    /// Significance level of the backward elimination
    #[arg(long)]
    significance: Option<f64>,

    /// Skip writing the HTML plots
    #[arg(long)]
    no_plots: bool,

    /// Rows shown of tables and probabilities
    #[arg(long)]
    head: Option<usize>,

    /// More logging, repeat for trace output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let env = Env::default().filter_or("HEARTRISK_LOG", "heartrisk=info");
    let mut builder = env_logger::Builder::from_env(env);
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.format_timestamp(None).init();
}

/// Settings of the config file, or the defaults, overridden by the flags
fn load_config(cli: &Cli) -> Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_path(path)?,
        None => ReportConfig::default(),
    };

    if let Some(data) = &cli.data {
        config.data = data.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(test_size) = cli.test_size {
        config.test_size = test_size;
    }
    if let Some(significance) = cli.significance {
        config.significance = significance;
    }
    if let Some(head) = cli.head {
        config.head = head;
    }
    if cli.no_plots {
        config.plots = false;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = load_config(&cli)?;
    log::debug!("{:?}", config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = report::run(&config, &mut out)?;
    out.flush()?;

    log::info!(
        "significant features: {}; test accuracy {:.4} on all features, {:.4} on the significant ones",
        outcome.significant_features.join(", "),
        outcome.full.test_accuracy,
        outcome.significant.test_accuracy
    );
    for path in &outcome.plots {
        log::debug!("plot: {}", path.display());
    }
    if !outcome.eliminated.is_empty() {
        log::debug!("eliminated features: {}", outcome.eliminated.join(", "));
    }

    Ok(())
}
