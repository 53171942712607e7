//! TF-IDF Classification Example
//!
//! Labels a handful of emails with the keyword rules, trains a TF-IDF +
//! logistic regression classifier on them, and classifies unseen text.

use std::sync::Arc;

use anyhow::Result;

use mailroom::analysis::analyzer::StandardAnalyzer;
use mailroom::ml::{
    Category, ClassificationReport, LogisticRegression, TextClassifier, TfIdfClassifier,
    TfIdfVectorizer, categorize,
};

fn main() -> Result<()> {
    println!("=== TF-IDF Classification Example ===\n");

    let emails = [
        "Please resend the invoice for March",
        "The pricing page lists the wrong amount",
        "Invoice number is missing",
        "Cannot login after the update",
        "Password reset email never arrives",
        "Locked out of my account",
        "API returns 500 on export",
        "CRM sync stopped yesterday",
        "Integration with Slack fails",
        "Thanks for the quick help",
        "Do you offer on-site training?",
        "Great product, keep it up",
    ];
    let labels: Vec<Category> = emails.iter().map(|e| categorize(e)).collect();

    let mut vectorizer = TfIdfVectorizer::new(Arc::new(StandardAnalyzer::new()?), 500);
    let features = vectorizer.fit_transform(&emails)?;
    println!("Vocabulary size: {}", vectorizer.vocabulary_size());

    let model = LogisticRegression::default().fit(&features, &labels)?;
    println!(
        "Trained in {} iterations (converged: {})\n",
        model.stats().iterations,
        model.stats().converged
    );

    let predictions = model.predict_batch(&features)?;
    println!("{}", ClassificationReport::from_predictions(&labels, &predictions)?);

    let classifier = TfIdfClassifier::new(vectorizer, model);
    for text in [
        "wrong amount on my invoice",
        "password expired",
        "export through the API",
        "training options",
    ] {
        let probabilities = classifier.predict_proba(text)?;
        let best = probabilities.iter().cloned().fold(0.0, f64::max);
        println!(
            "{:<18} ({best:.2}) <- {text}",
            classifier.predict(text)?.as_str()
        );
    }

    Ok(())
}
