//! Keyword-based categorizer.
//!
//! Rules are an ordered list of `(category, keywords)` pairs. The first rule
//! with a whole-word keyword hit wins, so the order of the list is part of
//! the behaviour: an email mentioning both "billing" and "login" is a
//! billing issue.

use std::sync::LazyLock;

use regex::Regex;

use super::category::Category;
use super::classifier::TextClassifier;
use crate::error::{MailroomError, Result};

/// Default rules in priority order.
pub const DEFAULT_RULES: &[(Category, &[&str])] = &[
    (Category::BillingIssue, &["billing", "pricing", "invoice"]),
    (
        Category::LoginIssue,
        &["login", "password", "account", "access"],
    ),
    (Category::IntegrationQuery, &["integration", "api", "crm"]),
];

static DEFAULT_CATEGORIZER: LazyLock<KeywordCategorizer> = LazyLock::new(|| {
    KeywordCategorizer::from_rules(DEFAULT_RULES, Category::GeneralQuery)
        .expect("Default keyword rules should compile")
});

/// Categorize email text with the default rules.
///
/// Total and deterministic: every input maps to exactly one category.
///
/// ```
/// use mailroom::ml::{categorize, Category};
///
/// assert_eq!(categorize("Invoice and login problems"), Category::BillingIssue);
/// assert_eq!(categorize("Need API docs"), Category::IntegrationQuery);
/// assert_eq!(categorize("crmware question"), Category::GeneralQuery);
/// ```
pub fn categorize(text: &str) -> Category {
    DEFAULT_CATEGORIZER.categorize(text)
}

/// A single rule: a category and the whole-word pattern that selects it.
#[derive(Clone, Debug)]
pub struct KeywordRule {
    category: Category,
    keywords: Vec<String>,
    pattern: Regex,
}

impl KeywordRule {
    /// Compile a rule matching any of `keywords` as a whole word.
    ///
    /// Keywords are lowercased and regex-escaped.
    pub fn new<I, S>(category: Category, keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(MailroomError::invalid_argument(format!(
                "rule for '{category}' has no keywords"
            )));
        }

        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\b(?:{alternation})\b"))
            .map_err(|e| MailroomError::invalid_argument(format!("Invalid keyword rule: {e}")))?;

        Ok(Self {
            category,
            keywords,
            pattern,
        })
    }

    /// The category this rule assigns.
    pub fn category(&self) -> Category {
        self.category
    }

    /// The normalized keywords of this rule.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Check the rule against already-lowercased text.
    pub fn matches(&self, lowered: &str) -> bool {
        self.pattern.is_match(lowered)
    }
}

/// Keyword-based categorizer.
///
/// Evaluates its rules in order against the lowercased text and falls back
/// to a default category when none match.
#[derive(Clone, Debug)]
pub struct KeywordCategorizer {
    rules: Vec<KeywordRule>,
    fallback: Category,
}

impl KeywordCategorizer {
    /// Create a categorizer from compiled rules.
    pub fn new(rules: Vec<KeywordRule>, fallback: Category) -> Self {
        Self { rules, fallback }
    }

    /// Compile a categorizer from `(category, keywords)` pairs.
    pub fn from_rules(rules: &[(Category, &[&str])], fallback: Category) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|(category, keywords)| KeywordRule::new(*category, keywords.iter()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules, fallback))
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// The category used when no rule matches.
    pub fn fallback(&self) -> Category {
        self.fallback
    }

    /// Assign a category to `text`.
    pub fn categorize(&self, text: &str) -> Category {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(KeywordRule::category)
            .unwrap_or(self.fallback)
    }
}

impl Default for KeywordCategorizer {
    fn default() -> Self {
        DEFAULT_CATEGORIZER.clone()
    }
}

impl TextClassifier for KeywordCategorizer {
    fn predict(&self, text: &str) -> Result<Category> {
        Ok(self.categorize(text))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_tier() {
        assert_eq!(categorize("Question about Pricing"), Category::BillingIssue);
        assert_eq!(categorize("billing cycle"), Category::BillingIssue);
        assert_eq!(categorize("Forgot PASSWORD"), Category::LoginIssue);
        assert_eq!(categorize("no access to dashboard"), Category::LoginIssue);
        assert_eq!(categorize("CRM sync failing"), Category::IntegrationQuery);
        assert_eq!(categorize("Integration with Slack"), Category::IntegrationQuery);
        assert_eq!(categorize("Thanks for the help"), Category::GeneralQuery);
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(categorize("billing and login"), Category::BillingIssue);
        assert_eq!(categorize("login via the api"), Category::LoginIssue);
        assert_eq!(categorize("api invoice"), Category::BillingIssue);
    }

    #[test]
    fn test_whole_word_only() {
        assert_eq!(categorize("crmware rollout"), Category::GeneralQuery);
        assert_eq!(categorize("accessibility audit"), Category::GeneralQuery);
        assert_eq!(categorize("invoices overdue"), Category::GeneralQuery);
        assert_eq!(categorize("the (api) broke"), Category::IntegrationQuery);
        assert_eq!(categorize("api_key rotation"), Category::GeneralQuery);
    }

    #[test]
    fn test_empty_text_is_general() {
        assert_eq!(categorize(""), Category::GeneralQuery);
        assert_eq!(categorize(" "), Category::GeneralQuery);
    }

    #[test]
    fn test_custom_rules() {
        let categorizer = KeywordCategorizer::from_rules(
            &[(Category::LoginIssue, &["SSO"])],
            Category::GeneralQuery,
        )
        .unwrap();

        assert_eq!(categorizer.categorize("SSO is down"), Category::LoginIssue);
        assert_eq!(categorizer.categorize("password"), Category::GeneralQuery);
        assert_eq!(categorizer.rules()[0].keywords(), &["sso".to_string()]);
    }

    #[test]
    fn test_empty_rule_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(KeywordRule::new(Category::BillingIssue, empty).is_err());
    }

    #[test]
    fn test_keywords_are_escaped() {
        let rule = KeywordRule::new(Category::IntegrationQuery, ["c++"]).unwrap();
        assert!(!rule.matches("cxx"));
    }

    #[test]
    fn test_text_classifier_impl() {
        let categorizer = KeywordCategorizer::default();
        assert_eq!(
            categorizer.predict("invoice missing").unwrap(),
            Category::BillingIssue
        );
        assert_eq!(categorizer.name(), "keyword");
    }
}
