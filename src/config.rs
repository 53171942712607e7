//! Pipeline configuration.
//!
//! Every stage receives its settings from a [`PipelineConfig`] value rather
//! than from process-wide constants, so tests can point a run at a temporary
//! directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MailroomError, Result};

pub const DEFAULT_INPUT_PATH: &str = "data/Sample_Support_Emails_Dataset.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "data/predicted_support_emails.csv";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TEST_FRACTION: f64 = 0.30;
pub const DEFAULT_MAX_FEATURES: usize = 500;
pub const DEFAULT_MAX_ITER: usize = 200;
pub const DEFAULT_REGULARIZATION: f64 = 1.0;

/// Configuration of one classification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// CSV with `subject` and `body` columns.
    pub input_path: PathBuf,
    /// Destination of the enriched CSV.
    pub output_path: PathBuf,
    /// Seed shared by the splitter and the trainer.
    pub seed: u64,
    /// Share of each class held out for evaluation.
    pub test_fraction: f64,
    /// Vocabulary cap of the TF-IDF vectorizer.
    pub max_features: usize,
    /// Iteration cap of the optimizer.
    pub max_iter: usize,
    /// Inverse L2 regularisation strength `C`.
    pub regularization: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
            max_features: DEFAULT_MAX_FEATURES,
            max_iter: DEFAULT_MAX_ITER,
            regularization: DEFAULT_REGULARIZATION,
        }
    }
}

impl PipelineConfig {
    /// Defaults with explicit input and output paths.
    pub fn new<I: AsRef<Path>, O: AsRef<Path>>(input_path: I, output_path: O) -> Self {
        Self {
            input_path: input_path.as_ref().to_path_buf(),
            output_path: output_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Check every value against its domain.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(MailroomError::invalid_config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.max_features == 0 {
            return Err(MailroomError::invalid_config(
                "max_features must be at least 1",
            ));
        }
        if self.max_iter == 0 {
            return Err(MailroomError::invalid_config("max_iter must be at least 1"));
        }
        if !(self.regularization.is_finite() && self.regularization > 0.0) {
            return Err(MailroomError::invalid_config(format!(
                "regularization must be a positive number, got {}",
                self.regularization
            )));
        }
        Ok(())
    }
}
