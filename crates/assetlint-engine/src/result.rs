//! Check results and their aggregation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::action::Category;

/// Outcome of one check step. Empty `errors` means pass; warnings never
/// affect the verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckResult {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Append another result's entries after this one's.
    pub fn merge(&mut self, other: CheckResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_pass(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One aggregated entry, traceable to its action and step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub action: String,
    pub step: String,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} / {}] {}", self.action, self.step, self.message)
    }
}

/// Flattened errors and warnings of every step of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub category: Category,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl AggregateResult {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Append a step's result, tagging every entry with its origin.
    pub fn absorb(&mut self, action: &str, step: &str, result: CheckResult) {
        let tag = |message: String| Finding {
            action: action.to_string(),
            step: step.to_string(),
            message,
        };
        self.errors.extend(result.errors.into_iter().map(tag));
        self.warnings.extend(result.warnings.into_iter().map(tag));
    }

    pub fn is_pass(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// SHA-256 of the serialized aggregate, for run-to-run comparison.
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}
