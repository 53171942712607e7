//! TF-IDF vectorizer for email text.
//!
//! Terms come from an [`Analyzer`]. The vocabulary keeps the `max_features`
//! most frequent terms of the fitted corpus and is laid out alphabetically.
//! Weights are raw term counts scaled by the smoothed inverse document
//! frequency `ln((1 + n) / (1 + df)) + 1`, and each row is L2-normalised.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use crate::analysis::analyzer::Analyzer;
use crate::error::{MailroomError, Result};

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 500;

/// TF-IDF vectorizer for text feature extraction.
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> column index, columns in alphabetical term order.
    vocabulary: HashMap<String, usize>,
    /// Terms by column index.
    terms: Vec<String>,
    /// Inverse document frequency for each column.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
    /// Upper bound on the vocabulary size.
    max_features: usize,
    /// Analyzer for tokenization.
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("max_features", &self.max_features)
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create a new, unfitted vectorizer.
    pub fn new(analyzer: Arc<dyn Analyzer>, max_features: usize) -> Self {
        Self {
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Vec::new(),
            n_documents: 0,
            max_features,
            analyzer,
        }
    }

    /// Fit the vocabulary and idf weights on `documents`.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if self.max_features == 0 {
            return Err(MailroomError::invalid_config(
                "max_features must be at least 1",
            ));
        }

        let mut term_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = self.analyzer.terms(doc.as_ref())?;
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_counts.entry(term).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(MailroomError::insufficient_data(
                "empty vocabulary; documents contain only stop words or no terms",
            ));
        }

        // BTreeMap iteration is alphabetical, and the sort is stable, so ties
        // on count keep alphabetical order.
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f64;
        let idf = terms
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        self.vocabulary = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        self.terms = terms;
        self.idf = idf;
        self.n_documents = documents.len();

        debug!(
            "Fitted TF-IDF vocabulary of {} terms on {} documents",
            self.terms.len(),
            self.n_documents
        );

        Ok(())
    }

    /// Transform a document into an L2-normalised TF-IDF vector.
    ///
    /// Terms outside the vocabulary are ignored; a document with no known
    /// terms maps to the zero vector.
    pub fn transform(&self, document: &str) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(MailroomError::invalid_argument(
                "TF-IDF vectorizer has not been fitted",
            ));
        }

        let mut row = vec![0.0; self.terms.len()];
        for term in self.analyzer.terms(document)? {
            if let Some(&idx) = self.vocabulary.get(&term) {
                row[idx] += 1.0;
            }
        }

        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut row {
                *value /= norm;
            }
        }

        Ok(row)
    }

    /// Transform many documents into a row-per-document matrix.
    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<Vec<f64>>> {
        documents
            .iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Fit on `documents` and transform them.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<Vec<f64>>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    /// Whether `fit` has run.
    pub fn is_fitted(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Vocabulary terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Column index of a term.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Idf weights in column order.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }
}
