//! Text classifier trait definition.

use crate::error::Result;
use crate::ml::category::Category;

/// Text classifier trait.
///
/// Implemented by the keyword rules that produce ground-truth labels and by
/// the trained TF-IDF model that learns to reproduce them.
pub trait TextClassifier: Send + Sync {
    /// Predict the category for a piece of email text.
    fn predict(&self, text: &str) -> Result<Category>;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}
