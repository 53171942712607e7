//! Multinomial logistic regression trained with L-BFGS.
//!
//! The objective is the mean cross-entropy of a softmax model with one
//! intercept per class plus an L2 penalty on the weights (not the
//! intercepts):
//!
//! ```text
//! f(W, b) = (1/n) Σ_i −log p(y_i | x_i) + 1/(2·C·n) Σ_k ‖w_k‖²
//! ```
//!
//! Optimisation starts from zero and is fully deterministic. Hitting the
//! iteration cap is not an error: the model is returned together with a
//! [`ConvergenceWarning`].

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::error::{MailroomError, Result};

/// Number of correction pairs kept by L-BFGS.
const HISTORY_SIZE: usize = 10;
/// Armijo sufficient-decrease constant.
const ARMIJO_C1: f64 = 1e-4;
const MAX_LINE_SEARCH_STEPS: usize = 40;

/// Trainer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Iteration cap for the optimizer.
    pub max_iter: usize,
    /// Inverse L2 regularisation strength.
    pub c: f64,
    /// Stop when the largest gradient component is at or below this.
    pub tol: f64,
    /// Recorded in the training stats; the optimizer does not draw from it.
    pub seed: u64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            max_iter: 200,
            c: 1.0,
            tol: 1e-4,
            seed: 42,
        }
    }
}

/// Emitted when the optimizer stops at its iteration cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    pub iterations: usize,
    pub gradient_norm: f64,
    pub tolerance: f64,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lbfgs failed to converge after {} iterations (max |gradient| {:.3e} > {:.1e}); \
             increase max_iter",
            self.iterations, self.gradient_norm, self.tolerance
        )
    }
}

/// Training statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Objective value after each accepted step.
    pub training_losses: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
    /// Largest absolute gradient component at the returned solution.
    pub gradient_norm: f64,
    pub training_time_ms: u64,
    pub n_samples: usize,
    pub n_features: usize,
    pub seed: u64,
    pub warning: Option<ConvergenceWarning>,
}

/// A fitted multinomial logistic regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    classes: Vec<Category>,
    /// One weight row of length `n_features` per class.
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    n_features: usize,
    stats: TrainingStats,
}

impl LogisticRegression {
    pub fn new(max_iter: usize, c: f64, seed: u64) -> Self {
        Self {
            max_iter,
            c,
            seed,
            ..Self::default()
        }
    }

    /// Fit a model on dense feature rows `x` with labels `y`.
    pub fn fit(&self, x: &[Vec<f64>], y: &[Category]) -> Result<LogisticModel> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(MailroomError::invalid_config(format!(
                "regularization C must be positive, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(MailroomError::invalid_config("max_iter must be at least 1"));
        }
        if x.len() != y.len() {
            return Err(MailroomError::invalid_argument(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(MailroomError::insufficient_data("no training rows"));
        }

        let n_features = x[0].len();
        if let Some(row) = x.iter().find(|row| row.len() != n_features) {
            return Err(MailroomError::invalid_feature_vector(format!(
                "expected {n_features} features, got {}",
                row.len()
            )));
        }

        let mut classes: Vec<Category> = y.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(MailroomError::insufficient_data(format!(
                "training data needs at least 2 classes, found {}",
                classes.len()
            )));
        }

        let targets: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let problem = Objective {
            x,
            targets: &targets,
            n_classes: classes.len(),
            n_features,
            penalty: 1.0 / (self.c * x.len() as f64),
        };

        let start_time = Instant::now();
        let outcome = minimize_lbfgs(
            problem.dimension(),
            |theta| problem.evaluate(theta),
            self.max_iter,
            self.tol,
        );
        let training_time = start_time.elapsed();

        let warning = (!outcome.converged).then(|| ConvergenceWarning {
            iterations: outcome.iterations,
            gradient_norm: outcome.gradient_norm,
            tolerance: self.tol,
        });
        if let Some(warning) = &warning {
            warn!("{warning}");
        }
        debug!(
            "L-BFGS finished after {} iterations, loss {:.6}",
            outcome.iterations, outcome.loss
        );

        let (weights, intercepts) = problem.unpack(&outcome.theta);

        Ok(LogisticModel {
            classes,
            weights,
            intercepts,
            n_features,
            stats: TrainingStats {
                training_losses: outcome.losses,
                iterations: outcome.iterations,
                converged: outcome.converged,
                final_loss: outcome.loss,
                gradient_norm: outcome.gradient_norm,
                training_time_ms: training_time.as_millis() as u64,
                n_samples: x.len(),
                n_features,
                seed: self.seed,
                warning,
            },
        })
    }
}

impl LogisticModel {
    /// Classes in score order.
    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn intercepts(&self) -> &[f64] {
        &self.intercepts
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Raw linear scores, one per class.
    pub fn decision_function(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.n_features {
            return Err(MailroomError::invalid_feature_vector(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        Ok(self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| dot(w, features) + b)
            .collect())
    }

    /// Class probabilities in [`classes`](Self::classes) order.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        let mut scores = self.decision_function(features)?;
        softmax_in_place(&mut scores);
        Ok(scores)
    }

    /// Most probable class; ties go to the class that sorts first.
    pub fn predict(&self, features: &[f64]) -> Result<Category> {
        let scores = self.decision_function(features)?;
        let mut best = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = idx;
            }
        }
        Ok(self.classes[best])
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<Category>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }
}

/// Regularised softmax cross-entropy over a flat parameter vector laid out
/// as `[w_0 .. w_{k-1}, b_0 .. b_{k-1}]`.
struct Objective<'a> {
    x: &'a [Vec<f64>],
    targets: &'a [usize],
    n_classes: usize,
    n_features: usize,
    /// `1 / (C·n)`.
    penalty: f64,
}

impl Objective<'_> {
    fn dimension(&self) -> usize {
        self.n_classes * (self.n_features + 1)
    }

    fn weight_row<'t>(&self, theta: &'t [f64], k: usize) -> &'t [f64] {
        &theta[k * self.n_features..(k + 1) * self.n_features]
    }

    fn intercept_offset(&self) -> usize {
        self.n_classes * self.n_features
    }

    /// Objective value and gradient at `theta`.
    fn evaluate(&self, theta: &[f64]) -> (f64, Vec<f64>) {
        let n = self.x.len() as f64;
        let bias = self.intercept_offset();
        let mut grad = vec![0.0; theta.len()];
        let mut loss = 0.0;
        let mut scores = vec![0.0; self.n_classes];

        for (row, &target) in self.x.iter().zip(self.targets) {
            for (k, score) in scores.iter_mut().enumerate() {
                *score = dot(self.weight_row(theta, k), row) + theta[bias + k];
            }
            loss += log_sum_exp(&scores) - scores[target];
            softmax_in_place(&mut scores);

            for (k, p) in scores.iter().enumerate() {
                let residual = p - if k == target { 1.0 } else { 0.0 };
                if residual == 0.0 {
                    continue;
                }
                let offset = k * self.n_features;
                for (g, v) in grad[offset..offset + self.n_features].iter_mut().zip(row) {
                    *g += residual * v;
                }
                grad[bias + k] += residual;
            }
        }

        loss /= n;
        for g in &mut grad {
            *g /= n;
        }

        let weights = &theta[..bias];
        loss += 0.5 * self.penalty * dot(weights, weights);
        for (g, w) in grad[..bias].iter_mut().zip(weights) {
            *g += self.penalty * w;
        }

        (loss, grad)
    }

    fn unpack(&self, theta: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
        let weights = (0..self.n_classes)
            .map(|k| self.weight_row(theta, k).to_vec())
            .collect();
        let intercepts = theta[self.intercept_offset()..].to_vec();
        (weights, intercepts)
    }
}

struct Outcome {
    theta: Vec<f64>,
    loss: f64,
    losses: Vec<f64>,
    gradient_norm: f64,
    iterations: usize,
    converged: bool,
}

/// Minimise `evaluate` (returning loss and gradient) from the origin.
fn minimize_lbfgs<F>(dimension: usize, evaluate: F, max_iter: usize, tol: f64) -> Outcome
where
    F: Fn(&[f64]) -> (f64, Vec<f64>),
{
    let ftol = 64.0 * f64::EPSILON;
    let mut theta = vec![0.0; dimension];
    let (mut loss, mut grad) = evaluate(&theta);
    let mut history: VecDeque<(Vec<f64>, Vec<f64>, f64)> = VecDeque::with_capacity(HISTORY_SIZE);
    let mut losses = Vec::new();
    let mut iterations = 0;
    let mut converged = max_abs(&grad) <= tol;

    while !converged && iterations < max_iter {
        let mut direction = two_loop_direction(&grad, &history);
        let mut slope = dot(&grad, &direction);
        if slope >= 0.0 {
            history.clear();
            direction = grad.iter().map(|g| -g).collect();
            slope = -dot(&grad, &grad);
        }

        let mut step = if history.is_empty() {
            1.0_f64.min(1.0 / max_abs(&grad).max(f64::MIN_POSITIVE))
        } else {
            1.0
        };

        let mut accepted = None;
        for _ in 0..MAX_LINE_SEARCH_STEPS {
            let candidate: Vec<f64> = theta
                .iter()
                .zip(&direction)
                .map(|(t, d)| t + step * d)
                .collect();
            let (candidate_loss, candidate_grad) = evaluate(&candidate);
            if candidate_loss <= loss + ARMIJO_C1 * step * slope {
                accepted = Some((candidate, candidate_loss, candidate_grad));
                break;
            }
            step *= 0.5;
        }

        // No sufficient decrease along a descent direction. Only the
        // gradient test decides whether the current iterate counts.
        let Some((next_theta, next_loss, next_grad)) = accepted else {
            converged = max_abs(&grad) <= tol;
            break;
        };
        iterations += 1;

        let s: Vec<f64> = next_theta.iter().zip(&theta).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = next_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
        let sy = dot(&s, &y);
        if sy > 1e-10 {
            if history.len() == HISTORY_SIZE {
                history.pop_front();
            }
            history.push_back((s, y, 1.0 / sy));
        }

        let decrease = (loss - next_loss) / loss.abs().max(next_loss.abs()).max(1.0);
        theta = next_theta;
        loss = next_loss;
        grad = next_grad;
        losses.push(loss);

        converged = max_abs(&grad) <= tol || decrease <= ftol;
    }

    Outcome {
        theta,
        loss,
        losses,
        gradient_norm: max_abs(&grad),
        iterations,
        converged,
    }
}

/// `-H·g` for the inverse Hessian approximation held in `history`.
fn two_loop_direction(grad: &[f64], history: &VecDeque<(Vec<f64>, Vec<f64>, f64)>) -> Vec<f64> {
    let mut q = grad.to_vec();
    let mut alphas = Vec::with_capacity(history.len());

    for (s, y, rho) in history.iter().rev() {
        let alpha = rho * dot(s, &q);
        for (qi, yi) in q.iter_mut().zip(y) {
            *qi -= alpha * yi;
        }
        alphas.push(alpha);
    }

    if let Some((s, y, _)) = history.back() {
        let gamma = dot(s, y) / dot(y, y);
        for qi in &mut q {
            *qi *= gamma;
        }
    }

    for ((s, y, rho), alpha) in history.iter().zip(alphas.iter().rev()) {
        let beta = rho * dot(y, &q);
        for (qi, si) in q.iter_mut().zip(s) {
            *qi += (alpha - beta) * si;
        }
    }

    q.iter().map(|v| -v).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

fn log_sum_exp(scores: &[f64]) -> f64 {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    max + scores.iter().map(|s| (s - max).exp()).sum::<f64>().ln()
}

fn softmax_in_place(scores: &mut [f64]) {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        total += *s;
    }
    for s in scores.iter_mut() {
        *s /= total;
    }
}
