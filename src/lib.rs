//! # Mailroom
//!
//! Support email triage: keyword rules label each email, a TF-IDF +
//! multinomial logistic regression classifier learns to reproduce the labels,
//! and the predictions are written back next to the original columns.
//!
//! ## Features
//!
//! - Ordered, whole-word keyword categorizer
//! - Regex tokenizer, lowercase and English stop-word analysis pipeline
//! - TF-IDF vectorizer with a capped vocabulary
//! - Seeded stratified train/test split
//! - L-BFGS trained softmax regression with a classification report
//! - Atomic CSV output
//!
//! ```no_run
//! use mailroom::config::PipelineConfig;
//! use mailroom::pipeline::{self, NoopObserver};
//!
//! let config = PipelineConfig::new("emails.csv", "predicted.csv");
//! let summary = pipeline::run(&config, &mut NoopObserver).unwrap();
//! println!("{}", summary.report);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ml;
pub mod pipeline;

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{MailroomError, Result};
    pub use crate::ml::{Category, TextClassifier, categorize};
    pub use crate::pipeline::{RunObserver, RunSummary};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
