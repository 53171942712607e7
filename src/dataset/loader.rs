//! CSV loader.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use log::info;

use super::record::{Dataset, EmailRecord};
use crate::error::{MailroomError, Result};

/// Normalized name of the required subject column.
pub const SUBJECT_COLUMN: &str = "subject";
/// Normalized name of the required body column.
pub const BODY_COLUMN: &str = "body";

/// Load a support email CSV.
///
/// The header must contain columns named `subject` and `body`, compared
/// case-insensitively; when several headers normalize to the same name the
/// last one is used. Every other column is carried through untouched. Rows
/// shorter than the header are padded with empty cells.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MailroomError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| MailroomError::csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let normalized: HashMap<String, usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.to_lowercase(), idx))
        .collect();

    let (Some(&subject_column), Some(&body_column)) =
        (normalized.get(SUBJECT_COLUMN), normalized.get(BODY_COLUMN))
    else {
        return Err(MailroomError::schema(
            [SUBJECT_COLUMN, BODY_COLUMN],
            columns,
        ));
    };

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| MailroomError::csv(path, e))?;
        if record.len() > columns.len() {
            return Err(MailroomError::invalid_argument(format!(
                "{}: row {} has {} fields but the header has {}",
                path.display(),
                row + 1,
                record.len(),
                columns.len()
            )));
        }

        let mut values: Vec<String> = record.iter().map(str::to_string).collect();
        values.resize(columns.len(), String::new());
        records.push(EmailRecord::new(values, subject_column, body_column));
    }

    info!("Loaded {} emails from {}", records.len(), path.display());

    Ok(Dataset::new(columns, subject_column, body_column, records))
}
