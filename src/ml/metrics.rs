//! Per-class precision, recall and F1.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::error::{MailroomError, Result};

/// Scores for a single label, or for an average row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Metrics row for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub label: Category,
    #[serde(flatten)]
    pub metrics: ClassMetrics,
}

/// Classification report over a set of true and predicted labels.
///
/// Labels are the sorted union of both sides, so a label that is only ever
/// predicted still gets a row (with support 0). Any 0/0 ratio is 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub labels: Vec<LabelMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build a report from aligned true and predicted labels.
    pub fn from_predictions(y_true: &[Category], y_pred: &[Category]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(MailroomError::invalid_argument(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(MailroomError::insufficient_data(
                "no predictions to evaluate",
            ));
        }

        let label_set: BTreeSet<Category> = y_true.iter().chain(y_pred).copied().collect();
        let total = y_true.len();

        let labels: Vec<LabelMetrics> = label_set
            .into_iter()
            .map(|label| {
                let mut true_positive = 0usize;
                let mut predicted = 0usize;
                let mut support = 0usize;
                for (t, p) in y_true.iter().zip(y_pred) {
                    if *t == label {
                        support += 1;
                    }
                    if *p == label {
                        predicted += 1;
                        if *t == label {
                            true_positive += 1;
                        }
                    }
                }

                let precision = ratio(true_positive, predicted);
                let recall = ratio(true_positive, support);
                LabelMetrics {
                    label,
                    metrics: ClassMetrics {
                        precision,
                        recall,
                        f1: f1(precision, recall),
                        support,
                    },
                }
            })
            .collect();

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        let n_labels = labels.len() as f64;

        let mut macro_avg = ClassMetrics {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
            support: total,
        };
        let mut weighted_avg = macro_avg;
        for row in &labels {
            let m = &row.metrics;
            let weight = m.support as f64 / total as f64;
            macro_avg.precision += m.precision / n_labels;
            macro_avg.recall += m.recall / n_labels;
            macro_avg.f1 += m.f1 / n_labels;
            weighted_avg.precision += m.precision * weight;
            weighted_avg.recall += m.recall * weight;
            weighted_avg.f1 += m.f1 * weight;
        }

        Ok(Self {
            labels,
            accuracy: correct as f64 / total as f64,
            macro_avg,
            weighted_avg,
        })
    }

    /// Metrics for one label, if it appears in the report.
    pub fn label(&self, label: Category) -> Option<&ClassMetrics> {
        self.labels
            .iter()
            .find(|row| row.label == label)
            .map(|row| &row.metrics)
    }

    /// Number of evaluated samples.
    pub fn support(&self) -> usize {
        self.macro_avg.support
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|row| row.label.as_str().len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or_default();

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{name:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.precision, m.recall, m.f1, m.support
            )
        };

        for label in &self.labels {
            row(f, label.label.as_str(), &label.metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.support()
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}
