//! Error types for the Mailroom library.
//!
//! All fatal failures of the classification pipeline are represented by the
//! [`MailroomError`] enum. Non-fatal conditions (an optimizer that stops at its
//! iteration cap) are not errors; see
//! [`ConvergenceWarning`](crate::ml::logistic::ConvergenceWarning).
//!
//! # Examples
//!
//! ```
//! use mailroom::error::{MailroomError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(MailroomError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for Mailroom operations.
#[derive(Error, Debug)]
pub enum MailroomError {
    /// Required columns are missing from the input header.
    #[error("Schema error: CSV must include columns: {required:?}. Found: {found:?}")]
    Schema {
        /// Required (normalized) column names, sorted.
        required: Vec<String>,
        /// Header names as they appear in the file.
        found: Vec<String>,
    },

    /// A label class is too small to stratify, or there is nothing to train on.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// File system failure on a known path.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed delimited input or output serialization failure.
    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// I/O errors without path context.
    #[error("I/O error: {0}")]
    RawIo(#[from] io::Error),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration value outside its domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid argument passed to a library call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Feature vector with the wrong dimensionality.
    #[error("Invalid feature vector: {0}")]
    InvalidFeatureVector(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with MailroomError.
pub type Result<T> = std::result::Result<T, MailroomError>;

impl MailroomError {
    /// Create a new schema error.
    ///
    /// `required` is sorted so the message is stable regardless of the
    /// order the caller declared the names in.
    pub fn schema<R, F>(required: R, found: F) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let mut required: Vec<String> = required.into_iter().map(Into::into).collect();
        required.sort();
        MailroomError::Schema {
            required,
            found: found.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a new insufficient data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        MailroomError::InsufficientData(msg.into())
    }

    /// Attach a path to an I/O error.
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        MailroomError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a path to a CSV error.
    pub fn csv<P: Into<PathBuf>>(path: P, source: csv::Error) -> Self {
        MailroomError::Csv {
            path: path.into(),
            source,
        }
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        MailroomError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        MailroomError::InvalidConfig(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        MailroomError::InvalidArgument(msg.into())
    }

    /// Create a new invalid feature vector error.
    pub fn invalid_feature_vector<S: Into<String>>(msg: S) -> Self {
        MailroomError::InvalidFeatureVector(msg.into())
    }
}
