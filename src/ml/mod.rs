//! Email categorization and classification.
//!
//! Keyword rules produce the labels, a TF-IDF vectorizer turns text into
//! features, and a multinomial logistic regression learns to reproduce the
//! labels. Splitting and evaluation live here as well.

pub mod category;
pub mod classifier;
pub mod keyword_classifier;
pub mod logistic;
pub mod metrics;
pub mod split;
pub mod tfidf;
pub mod tfidf_classifier;

pub use category::Category;
pub use classifier::TextClassifier;
pub use keyword_classifier::{KeywordCategorizer, KeywordRule, categorize};
pub use logistic::{ConvergenceWarning, LogisticModel, LogisticRegression, TrainingStats};
pub use metrics::{ClassMetrics, ClassificationReport, LabelMetrics};
pub use split::{SplitIndices, StratifiedSplit};
pub use tfidf::TfIdfVectorizer;
pub use tfidf_classifier::TfIdfClassifier;
