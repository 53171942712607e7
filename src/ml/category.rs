//! Support email categories.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MailroomError, Result};

/// Support email category.
///
/// The set is closed; every email gets exactly one of these. Ordering is the
/// lexicographic order of the labels, which fixes class order in the
/// classifier and in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Billing, pricing or invoice questions.
    #[serde(rename = "Billing Issue")]
    BillingIssue,
    /// Login, password, account or access problems.
    #[serde(rename = "Login Issue")]
    LoginIssue,
    /// Integration, API or CRM questions.
    #[serde(rename = "Integration Query")]
    IntegrationQuery,
    /// Anything else.
    #[serde(rename = "General Query")]
    GeneralQuery,
}

impl Category {
    /// All categories in rule priority order.
    pub const ALL: [Category; 4] = [
        Category::BillingIssue,
        Category::LoginIssue,
        Category::IntegrationQuery,
        Category::GeneralQuery,
    ];

    /// Human-readable label, as written to the output file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BillingIssue => "Billing Issue",
            Category::LoginIssue => "Login Issue",
            Category::IntegrationQuery => "Integration Query",
            Category::GeneralQuery => "General Query",
        }
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = MailroomError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MailroomError::invalid_argument(format!("unknown category '{s}'")))
    }
}
