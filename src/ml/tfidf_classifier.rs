//! TF-IDF + logistic regression text classifier.

use super::category::Category;
use super::classifier::TextClassifier;
use super::logistic::LogisticModel;
use super::tfidf::TfIdfVectorizer;
use crate::error::Result;

/// A fitted vectorizer and the model trained on its output.
#[derive(Debug)]
pub struct TfIdfClassifier {
    vectorizer: TfIdfVectorizer,
    model: LogisticModel,
}

impl TfIdfClassifier {
    /// Pair a fitted vectorizer with a model trained on its features.
    pub fn new(vectorizer: TfIdfVectorizer, model: LogisticModel) -> Self {
        Self { vectorizer, model }
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &LogisticModel {
        &self.model
    }

    /// Class probabilities for raw text, in [`LogisticModel::classes`] order.
    pub fn predict_proba(&self, text: &str) -> Result<Vec<f64>> {
        let features = self.vectorizer.transform(text)?;
        self.model.predict_proba(&features)
    }
}

impl TextClassifier for TfIdfClassifier {
    fn predict(&self, text: &str) -> Result<Category> {
        let features = self.vectorizer.transform(text)?;
        self.model.predict(&features)
    }

    fn name(&self) -> &str {
        "tfidf_logistic"
    }
}
