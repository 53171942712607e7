//! End-to-end tests for the classification pipeline.

use std::fs;
use std::path::Path;

use mailroom::config::PipelineConfig;
use mailroom::dataset::load_csv;
use mailroom::error::MailroomError;
use mailroom::ml::{Category, ClassificationReport};
use mailroom::pipeline::{self, CategoryCount, NoopObserver, RunObserver};
use tempfile::TempDir;

const TEN_EMAILS: &str = "\
id,Subject,Body
1,Invoice question,The invoice for March shows the wrong amount
2,Missing invoice,Could you resend my invoice for last quarter
3,Invoice format,Our finance team needs the invoice as a PDF
4,Cannot login,I cannot login since the update this morning
5,Login loop,The login page keeps redirecting me back
6,Login error,Login fails with an unknown error message
7,API limits,What are the API rate limits for bulk export
8,API keys,How do I rotate API keys for our workspace
9,Thanks,Thanks for the quick help yesterday
10,Feature idea,It would be great to have dark mode in the app
";

fn write_input(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("emails.csv");
    fs::write(&path, contents).unwrap();
    path
}

#[derive(Default)]
struct Recorder {
    events: Vec<&'static str>,
    distribution: Vec<CategoryCount>,
    report: Option<ClassificationReport>,
    saved_rows: usize,
}

impl RunObserver for Recorder {
    fn on_distribution(&mut self, distribution: &[CategoryCount]) {
        self.events.push("distribution");
        self.distribution = distribution.to_vec();
    }

    fn on_report(&mut self, report: &ClassificationReport) {
        self.events.push("report");
        self.report = Some(report.clone());
    }

    fn on_saved(&mut self, _path: &Path, rows: usize) {
        self.events.push("saved");
        self.saved_rows = rows;
    }
}

#[test]
fn test_ten_email_run() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TEN_EMAILS);
    let output = dir.path().join("predicted.csv");
    let config = PipelineConfig::new(&input, &output);

    let mut recorder = Recorder::default();
    let summary = pipeline::run(&config, &mut recorder).unwrap();

    assert_eq!(recorder.events, vec!["distribution", "report", "saved"]);

    let distribution: Vec<(Category, usize)> = summary
        .distribution
        .iter()
        .map(|c| (c.category, c.count))
        .collect();
    assert_eq!(
        distribution,
        vec![
            (Category::BillingIssue, 3),
            (Category::LoginIssue, 3),
            (Category::IntegrationQuery, 2),
            (Category::GeneralQuery, 2),
        ]
    );
    assert_eq!(recorder.distribution, summary.distribution);

    assert_eq!(summary.test_size, 4);
    assert_eq!(summary.train_size, 6);
    assert_eq!(summary.rows_written, 10);
    assert_eq!(recorder.saved_rows, 10);

    let report = recorder.report.unwrap();
    assert_eq!(report.support(), 4);
    for row in &report.labels {
        assert!((0.0..=1.0).contains(&row.metrics.precision));
        assert!((0.0..=1.0).contains(&row.metrics.recall));
        assert!((0.0..=1.0).contains(&row.metrics.f1));
    }

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        header,
        vec!["id", "Subject", "Body", "category", "predicted_category"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 10);
    for row in &rows {
        let category: Category = row[3].parse().unwrap();
        let predicted: Category = row[4].parse().unwrap();
        assert!(Category::ALL.contains(&category));
        assert!(Category::ALL.contains(&predicted));
    }
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][3], "Billing Issue");
    assert_eq!(&rows[9][3], "General Query");
}

#[test]
fn test_run_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TEN_EMAILS);
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    let a = pipeline::run(&PipelineConfig::new(&input, &first), &mut NoopObserver).unwrap();
    let b = pipeline::run(&PipelineConfig::new(&input, &second), &mut NoopObserver).unwrap();

    assert_eq!(a.report, b.report);
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn test_loaded_text_categorizes_like_manual_concatenation() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TEN_EMAILS);
    let dataset = load_csv(&input).unwrap();

    for record in dataset.records() {
        let manual = format!("{} {}", record.values[1], record.values[2]);
        assert_eq!(
            mailroom::ml::categorize(&record.text),
            mailroom::ml::categorize(&manual)
        );
    }
}

#[test]
fn test_schema_failure() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "Title,Content\nInvoice,late\n");
    let output = dir.path().join("out.csv");

    let err = pipeline::run(&PipelineConfig::new(&input, &output), &mut NoopObserver).unwrap_err();

    match &err {
        MailroomError::Schema { required, found } => {
            assert_eq!(required, &vec!["body".to_string(), "subject".to_string()]);
            assert_eq!(found, &vec!["Title".to_string(), "Content".to_string()]);
        }
        other => panic!("Expected Schema error, got {other:?}"),
    }
    assert!(err.to_string().contains(r#"["body", "subject"]"#));
    assert!(err.to_string().contains(r#"["Title", "Content"]"#));
    assert!(!output.exists());
}

#[test]
fn test_singleton_class_is_insufficient() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "subject,body\ninvoice,a\ninvoice,b\nlogin,c\nlogin,d\napi,e\n",
    );
    let output = dir.path().join("out.csv");

    let err = pipeline::run(&PipelineConfig::new(&input, &output), &mut NoopObserver).unwrap_err();

    assert!(matches!(err, MailroomError::InsufficientData(_)));
    assert!(err.to_string().contains("Integration Query"));
    assert!(!output.exists());
}

#[test]
fn test_missing_output_directory() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TEN_EMAILS);
    let output = dir.path().join("no_such_dir").join("out.csv");

    let err = pipeline::run(&PipelineConfig::new(&input, &output), &mut NoopObserver).unwrap_err();

    match err {
        MailroomError::Io { path, .. } => assert_eq!(path, output),
        other => panic!("Expected Io error, got {other:?}"),
    }
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.csv");
    let output = dir.path().join("out.csv");

    let err = pipeline::run(&PipelineConfig::new(&input, &output), &mut NoopObserver).unwrap_err();

    assert!(matches!(err, MailroomError::Io { .. }));
    assert!(err.to_string().contains("missing.csv"));
}
