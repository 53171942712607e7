//! Support email datasets: loading from and writing back to CSV.

pub mod loader;
pub mod record;
pub mod writer;

pub use loader::{BODY_COLUMN, SUBJECT_COLUMN, load_csv};
pub use record::{Dataset, EmailRecord};
pub use writer::{CATEGORY_COLUMN, PREDICTED_CATEGORY_COLUMN, write_predictions};
