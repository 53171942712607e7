//! Command line argument parsing for the Mailroom CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_INPUT_PATH, DEFAULT_MAX_FEATURES, DEFAULT_MAX_ITER, DEFAULT_OUTPUT_PATH,
    DEFAULT_REGULARIZATION, DEFAULT_SEED, DEFAULT_TEST_FRACTION, PipelineConfig,
};

/// Mailroom - support email triage
#[derive(Parser, Debug, Clone)]
#[command(name = "mailroom")]
#[command(about = "Label support emails with keyword rules and train a TF-IDF classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct MailroomArgs {
    /// Verbosity level (-vv for progress, -vvv for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl MailroomArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Label, train, evaluate and write predictions
    Run(RunArgs),

    /// Label texts with the keyword rules only
    Categorize(CategorizeArgs),
}

/// Arguments for a full pipeline run
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Input CSV with subject and body columns
    #[arg(short, long, env = "MAILROOM_INPUT", default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,

    /// Output CSV with category and predicted_category columns
    #[arg(short, long, env = "MAILROOM_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Random seed for the split
    #[arg(long, env = "MAILROOM_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Share of each class held out for evaluation
    #[arg(long, env = "MAILROOM_TEST_FRACTION", default_value_t = DEFAULT_TEST_FRACTION)]
    pub test_fraction: f64,

    /// Vocabulary cap
    #[arg(long, env = "MAILROOM_MAX_FEATURES", default_value_t = DEFAULT_MAX_FEATURES)]
    pub max_features: usize,

    /// Optimizer iteration cap
    #[arg(long, env = "MAILROOM_MAX_ITER", default_value_t = DEFAULT_MAX_ITER)]
    pub max_iter: usize,

    /// Inverse regularization strength
    #[arg(short = 'c', long = "regularization", env = "MAILROOM_C", default_value_t = DEFAULT_REGULARIZATION)]
    pub regularization: f64,
}

impl RunArgs {
    /// Convert to a pipeline configuration.
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig::new(&self.input, &self.output)
            .with_seed(self.seed)
            .with_test_fraction(self.test_fraction)
            .with_max_features(self.max_features)
            .with_max_iter(self.max_iter)
            .with_regularization(self.regularization)
    }
}

/// Arguments for keyword categorization
#[derive(Parser, Debug, Clone)]
pub struct CategorizeArgs {
    /// Texts to categorize
    #[arg(value_name = "TEXT", required = true)]
    pub texts: Vec<String>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let args = MailroomArgs::try_parse_from(["mailroom", "run"]).unwrap();

        if let Command::Run(run_args) = args.command {
            let config = run_args.to_config();
            assert_eq!(config, PipelineConfig::default());
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_run_overrides() {
        let args = MailroomArgs::try_parse_from([
            "mailroom",
            "run",
            "--input",
            "in.csv",
            "-o",
            "out.csv",
            "--seed",
            "7",
            "--test-fraction",
            "0.25",
            "--max-features",
            "100",
            "--max-iter",
            "50",
            "-c",
            "0.5",
        ])
        .unwrap();

        if let Command::Run(run_args) = args.command {
            assert_eq!(run_args.input, PathBuf::from("in.csv"));
            assert_eq!(run_args.output, PathBuf::from("out.csv"));
            assert_eq!(run_args.seed, 7);
            assert_eq!(run_args.test_fraction, 0.25);
            assert_eq!(run_args.max_features, 100);
            assert_eq!(run_args.max_iter, 50);
            assert_eq!(run_args.regularization, 0.5);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_categorize_command() {
        let args =
            MailroomArgs::try_parse_from(["mailroom", "categorize", "invoice late", "hello"])
                .unwrap();

        if let Command::Categorize(categorize_args) = args.command {
            assert_eq!(categorize_args.texts, vec!["invoice late", "hello"]);
        } else {
            panic!("Expected Categorize command");
        }

        assert!(MailroomArgs::try_parse_from(["mailroom", "categorize"]).is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let args = MailroomArgs::try_parse_from(["mailroom", "run"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = MailroomArgs::try_parse_from(["mailroom", "-vv", "run"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = MailroomArgs::try_parse_from(["mailroom", "run", "-vvv"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = MailroomArgs::try_parse_from(["mailroom", "-vv", "--quiet", "run"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args = MailroomArgs::try_parse_from(["mailroom", "--format", "json", "run"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);

        assert!(MailroomArgs::try_parse_from(["mailroom", "--format", "yaml", "run"]).is_err());
    }
}
