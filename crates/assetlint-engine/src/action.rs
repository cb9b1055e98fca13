//! Action plugins: a named bundle of checks, fixes and an update.

use serde::{Deserialize, Serialize};

use crate::step::{CheckStep, Operation};

/// Check category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Structural and format correctness of existing data.
    Sanity,
    /// Cross-referential correctness.
    Consistency,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sanity => "sanity",
            Category::Consistency => "consistency",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sanity" => Ok(Category::Sanity),
            "consistency" => Ok(Category::Consistency),
            other => Err(format!("unknown check category: {other}")),
        }
    }
}

/// Registered plugin. Absent operations are `None`.
#[derive(Debug, Clone)]
pub struct Action {
    name: String,
    sanity_checks: Vec<CheckStep>,
    consistency_checks: Vec<CheckStep>,
    sanity_fix: Option<Operation>,
    consistency_fix: Option<Operation>,
    update: Option<Operation>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sanity_checks: Vec::new(),
            consistency_checks: Vec::new(),
            sanity_fix: None,
            consistency_fix: None,
            update: None,
        }
    }

    pub fn with_sanity_check(mut self, step: CheckStep) -> Self {
        self.sanity_checks.push(step);
        self
    }

    pub fn with_consistency_check(mut self, step: CheckStep) -> Self {
        self.consistency_checks.push(step);
        self
    }

    pub fn with_sanity_fix(mut self, fix: Operation) -> Self {
        self.sanity_fix = Some(fix);
        self
    }

    pub fn with_consistency_fix(mut self, fix: Operation) -> Self {
        self.consistency_fix = Some(fix);
        self
    }

    pub fn with_update(mut self, update: Operation) -> Self {
        self.update = Some(update);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn checks(&self, category: Category) -> &[CheckStep] {
        match category {
            Category::Sanity => &self.sanity_checks,
            Category::Consistency => &self.consistency_checks,
        }
    }

    pub fn fix(&self, category: Category) -> Option<&Operation> {
        match category {
            Category::Sanity => self.sanity_fix.as_ref(),
            Category::Consistency => self.consistency_fix.as_ref(),
        }
    }

    pub fn update(&self) -> Option<&Operation> {
        self.update.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            sanity_checks: self.sanity_checks.len(),
            consistency_checks: self.consistency_checks.len(),
            sanity_fix: self.sanity_fix.is_some(),
            consistency_fix: self.consistency_fix.is_some(),
            update: self.update.is_some(),
        }
    }
}

/// What an action can do, without running anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub sanity_checks: usize,
    pub consistency_checks: usize,
    pub sanity_fix: bool,
    pub consistency_fix: bool,
    pub update: bool,
}

impl Capabilities {
    pub fn has_checks(&self, category: Category) -> bool {
        match category {
            Category::Sanity => self.sanity_checks > 0,
            Category::Consistency => self.consistency_checks > 0,
        }
    }

    pub fn has_fix(&self, category: Category) -> bool {
        match category {
            Category::Sanity => self.sanity_fix,
            Category::Consistency => self.consistency_fix,
        }
    }
}
