//! Keyword Categorization Example
//!
//! Shows the default keyword rules, their priority order, and how to build a
//! categorizer with custom rules.

use anyhow::Result;

use mailroom::ml::{Category, KeywordCategorizer, TextClassifier, categorize};

fn main() -> Result<()> {
    println!("=== Keyword Categorization Example ===\n");

    let emails = [
        "Question about the March invoice",
        "I forgot my password again",
        "Does your API support webhooks?",
        "Billing page shows an error after login",
        "Our crmware vendor asked about you",
        "Thanks for the great support!",
    ];

    println!("Default rules:");
    let categorizer = KeywordCategorizer::default();
    for rule in categorizer.rules() {
        println!("  {:<18} {}", rule.category(), rule.keywords().join(", "));
    }
    println!("  {:<18} (fallback)\n", categorizer.fallback());

    for email in emails {
        println!("{:<18} <- {email}", categorize(email).as_str());
    }

    println!("\nCustom rules:");
    let custom = KeywordCategorizer::from_rules(
        &[
            (Category::LoginIssue, &["sso", "saml", "2fa"]),
            (Category::BillingIssue, &["refund", "charge"]),
        ],
        Category::GeneralQuery,
    )?;
    for email in ["SAML login broken", "Refund for double charge", "Hello"] {
        println!("{:<18} <- {email}", custom.predict(email)?.as_str());
    }

    Ok(())
}
