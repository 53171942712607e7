//! End-to-end classification run.
//!
//! The stages run strictly in sequence: load, label with the keyword rules,
//! vectorize, split, train, evaluate, and write predictions for every row.
//!
//! The TF-IDF vocabulary and idf weights are fitted on all rows before the
//! split, so the vectorizer has seen the test texts. Reported scores are
//! therefore optimistic; fitting on the training rows only would remove the
//! leak but changes the feature space the predictions are made in.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::analysis::analyzer::StandardAnalyzer;
use crate::config::PipelineConfig;
use crate::dataset::{load_csv, write_predictions};
use crate::error::Result;
use crate::ml::{
    Category, ClassificationReport, ConvergenceWarning, LogisticRegression, StratifiedSplit,
    TfIdfVectorizer, TrainingStats, categorize,
};

/// Hooks called as a run progresses.
pub trait RunObserver {
    /// Called with the keyword label counts before training.
    fn on_distribution(&mut self, _distribution: &[CategoryCount]) {}

    /// Called with the held-out evaluation.
    fn on_report(&mut self, _report: &ClassificationReport) {}

    /// Called once the predictions file is in place.
    fn on_saved(&mut self, _path: &Path, _rows: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Number of rows carrying a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Everything a finished run reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub distribution: Vec<CategoryCount>,
    pub report: ClassificationReport,
    pub training: TrainingStats,
    pub warning: Option<ConvergenceWarning>,
    pub vocabulary_size: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub rows_written: usize,
    pub output_path: PathBuf,
}

/// Count labels, most frequent first; equal counts keep first-seen order.
pub fn category_distribution(labels: &[Category]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|c| c.category == *label) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: *label,
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Run the whole pipeline described by `config`.
pub fn run(config: &PipelineConfig, observer: &mut dyn RunObserver) -> Result<RunSummary> {
    config.validate()?;

    let dataset = load_csv(&config.input_path)?;
    let texts = dataset.texts();

    let categories: Vec<Category> = texts.iter().map(|text| categorize(text)).collect();
    let distribution = category_distribution(&categories);
    observer.on_distribution(&distribution);

    let analyzer = Arc::new(StandardAnalyzer::new()?);
    let mut vectorizer = TfIdfVectorizer::new(analyzer, config.max_features);
    let features = vectorizer.fit_transform(&texts)?;
    info!(
        "Vectorized {} emails into {} features",
        features.len(),
        vectorizer.vocabulary_size()
    );

    let split = StratifiedSplit::new(config.test_fraction, config.seed)?.split(&categories)?;
    info!(
        "Split into {} training and {} test rows",
        split.train_len(),
        split.test_len()
    );

    let (x_train, y_train) = select(&features, &categories, &split.train);
    let (x_test, y_test) = select(&features, &categories, &split.test);

    let trainer = LogisticRegression::new(config.max_iter, config.regularization, config.seed);
    let model = trainer.fit(&x_train, &y_train)?;
    info!(
        "Trained logistic regression in {} iterations (loss {:.4})",
        model.stats().iterations,
        model.stats().final_loss
    );

    let y_pred = model.predict_batch(&x_test)?;
    let report = ClassificationReport::from_predictions(&y_test, &y_pred)?;
    observer.on_report(&report);

    let predictions = model.predict_batch(&features)?;
    let rows_written =
        write_predictions(&config.output_path, &dataset, &categories, &predictions)?;
    observer.on_saved(&config.output_path, rows_written);

    let training = model.stats().clone();
    Ok(RunSummary {
        distribution,
        report,
        warning: training.warning.clone(),
        training,
        vocabulary_size: vectorizer.vocabulary_size(),
        train_size: split.train_len(),
        test_size: split.test_len(),
        rows_written,
        output_path: config.output_path.clone(),
    })
}

fn select(
    features: &[Vec<f64>],
    labels: &[Category],
    indices: &[usize],
) -> (Vec<Vec<f64>>, Vec<Category>) {
    indices
        .iter()
        .map(|&idx| (features[idx].clone(), labels[idx]))
        .unzip()
}
