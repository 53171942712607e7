//! In-memory representation of a loaded support email CSV.

use serde::Serialize;

/// One input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRecord {
    /// Cell values in header order.
    pub values: Vec<String>,
    /// `subject + " " + body`, computed once at load time.
    pub text: String,
}

impl EmailRecord {
    /// Build a record, deriving `text` from the subject and body cells.
    ///
    /// Missing cells count as empty strings.
    pub fn new(values: Vec<String>, subject_column: usize, body_column: usize) -> Self {
        let cell = |idx: usize| values.get(idx).map(String::as_str).unwrap_or_default();
        let text = format!("{} {}", cell(subject_column), cell(body_column));
        Self { values, text }
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// An ordered collection of email records with their header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    subject_column: usize,
    body_column: usize,
    records: Vec<EmailRecord>,
}

impl Dataset {
    pub fn new(
        columns: Vec<String>,
        subject_column: usize,
        body_column: usize,
        records: Vec<EmailRecord>,
    ) -> Self {
        Self {
            columns,
            subject_column,
            body_column,
            records,
        }
    }

    /// Header names as they appear in the source file.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Actual header name of the subject column.
    pub fn subject_column(&self) -> &str {
        &self.columns[self.subject_column]
    }

    /// Actual header name of the body column.
    pub fn body_column(&self) -> &str {
        &self.columns[self.body_column]
    }

    pub fn records(&self) -> &[EmailRecord] {
        &self.records
    }

    /// The derived `text` of every record, in row order.
    pub fn texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
