//! Prediction writer.
//!
//! The output is the input table with two extra columns, `category` (the
//! keyword label) and `predicted_category` (the model output). The file is
//! first written to a temporary file in the destination directory and then
//! renamed over the destination, so a failed run never leaves a partial file
//! behind. The renamed file keeps the destination's permissions, or gets the
//! usual mode for a newly created file.

use std::io::{self, Write};
use std::path::Path;

use csv::WriterBuilder;
use log::info;
use tempfile::NamedTempFile;

use super::record::Dataset;
use crate::error::{MailroomError, Result};
use crate::ml::Category;

/// Column holding the rule-derived label.
pub const CATEGORY_COLUMN: &str = "category";
/// Column holding the model prediction.
pub const PREDICTED_CATEGORY_COLUMN: &str = "predicted_category";

/// Write `dataset` with its labels and predictions to `path`.
///
/// Existing `category` / `predicted_category` columns are overwritten in
/// place; otherwise the columns are appended in that order. The parent
/// directory must exist. Returns the number of data rows written.
pub fn write_predictions<P: AsRef<Path>>(
    path: P,
    dataset: &Dataset,
    categories: &[Category],
    predictions: &[Category],
) -> Result<usize> {
    let path = path.as_ref();
    if categories.len() != dataset.len() || predictions.len() != dataset.len() {
        return Err(MailroomError::invalid_argument(format!(
            "{} records but {} categories and {} predictions",
            dataset.len(),
            categories.len(),
            predictions.len()
        )));
    }

    let mut header: Vec<&str> = dataset.columns().iter().map(String::as_str).collect();
    let category_idx = column_index(&mut header, CATEGORY_COLUMN);
    let predicted_idx = column_index(&mut header, PREDICTED_CATEGORY_COLUMN);

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = temp_file_for(parent, path).map_err(|e| MailroomError::io(path, e))?;

    let mut writer = WriterBuilder::new().from_writer(temp);
    writer
        .write_record(&header)
        .map_err(|e| MailroomError::csv(path, e))?;

    let mut row: Vec<&str> = Vec::with_capacity(header.len());
    for ((record, category), predicted) in dataset.records().iter().zip(categories).zip(predictions)
    {
        row.clear();
        row.extend(record.values.iter().map(String::as_str));
        row.resize(header.len(), "");
        row[category_idx] = category.as_str();
        row[predicted_idx] = predicted.as_str();
        writer
            .write_record(&row)
            .map_err(|e| MailroomError::csv(path, e))?;
    }

    let mut temp = writer
        .into_inner()
        .map_err(|e| MailroomError::io(path, e.into_error()))?;
    temp.flush().map_err(|e| MailroomError::io(path, e))?;
    temp.persist(path)
        .map_err(|e| MailroomError::io(path, e.error))?;

    info!("Wrote {} predictions to {}", dataset.len(), path.display());

    Ok(dataset.len())
}

/// Temp file in `parent` carrying the permissions `path` should end up with.
///
/// An existing destination keeps its mode. A new one gets `0o666` less the
/// process umask, as a plain `File::create` would, instead of the `0o600`
/// temp files are created with.
#[cfg(unix)]
fn temp_file_for(parent: &Path, path: &Path) -> io::Result<NamedTempFile> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());
    let mode = existing
        .clone()
        .unwrap_or_else(|| fs::Permissions::from_mode(0o666));
    let temp = tempfile::Builder::new()
        .permissions(mode)
        .tempfile_in(parent)?;
    // The creation mode is masked by the umask; restore the exact mode.
    if let Some(permissions) = existing {
        temp.as_file().set_permissions(permissions)?;
    }
    Ok(temp)
}

#[cfg(not(unix))]
fn temp_file_for(parent: &Path, _path: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(parent)
}

/// Position of `name` in `header`, appending it when absent.
fn column_index<'a>(header: &mut Vec<&'a str>, name: &'a str) -> usize {
    match header.iter().position(|column| *column == name) {
        Some(idx) => idx,
        None => {
            header.push(name);
            header.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::dataset::record::EmailRecord;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let records = rows
            .iter()
            .map(|row| EmailRecord::new(row.iter().map(|v| v.to_string()).collect(), 0, 1))
            .collect();
        Dataset::new(columns, 0, 1, records)
    }

    #[test]
    fn test_appends_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let data = dataset(&["subject", "body"], &[&["Invoice", "late, again"]]);

        let written = write_predictions(
            &path,
            &data,
            &[Category::BillingIssue],
            &[Category::LoginIssue],
        )
        .unwrap();

        assert_eq!(written, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "subject,body,category,predicted_category\n\
             Invoice,\"late, again\",Billing Issue,Login Issue\n"
        );
    }

    #[test]
    fn test_replaces_existing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let data = dataset(
            &["subject", "body", "predicted_category", "category"],
            &[&["a", "b", "old", "older"]],
        );

        write_predictions(
            &path,
            &data,
            &[Category::GeneralQuery],
            &[Category::IntegrationQuery],
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "subject,body,predicted_category,category\n\
             a,b,Integration Query,General Query\n"
        );
    }

    #[test]
    fn test_overwrites_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale").unwrap();
        let data = dataset(&["subject", "body"], &[&["x", "y"]]);

        write_predictions(&path, &data, &[Category::GeneralQuery], &[Category::GeneralQuery])
            .unwrap();

        assert!(fs::read_to_string(&path).unwrap().starts_with("subject,body"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_gets_default_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.csv");
        fs::File::create(&reference).unwrap();
        let path = dir.path().join("out.csv");
        let data = dataset(&["subject", "body"], &[&["x", "y"]]);

        write_predictions(&path, &data, &[Category::GeneralQuery], &[Category::GeneralQuery])
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let expected = fs::metadata(&reference).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        let data = dataset(&["subject", "body"], &[&["x", "y"]]);

        write_predictions(&path, &data, &[Category::BillingIssue], &[Category::BillingIssue])
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert!(fs::read_to_string(&path).unwrap().starts_with("subject,body"));
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let data = dataset(&["subject", "body"], &[&["x", "y"]]);

        let err = write_predictions(
            &path,
            &data,
            &[Category::GeneralQuery],
            &[Category::GeneralQuery],
        )
        .unwrap_err();

        assert!(matches!(err, MailroomError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let data = dataset(&["subject", "body"], &[&["x", "y"]]);
        let result = write_predictions(dir.path().join("out.csv"), &data, &[], &[]);
        assert!(matches!(result, Err(MailroomError::InvalidArgument(_))));
    }
}
