//! Check steps and fix/update operations.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::error::StepError;
use crate::result::CheckResult;

type CheckFn = dyn Fn() -> BoxFuture<'static, Result<CheckResult, StepError>> + Send + Sync;
type OperationFn = dyn Fn() -> BoxFuture<'static, Result<FixReport, StepError>> + Send + Sync;

/// A named, side-effect free check over the dataset.
#[derive(Clone)]
pub struct CheckStep {
    name: String,
    check: Arc<CheckFn>,
}

impl CheckStep {
    pub fn new<F, Fut>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CheckResult, StepError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(move || check().boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start the check. The returned future owns everything it needs.
    pub fn run(&self) -> BoxFuture<'static, Result<CheckResult, StepError>> {
        (self.check)()
    }
}

impl std::fmt::Debug for CheckStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckStep").field("name", &self.name).finish()
    }
}

/// One item an operation could not repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixFailure {
    pub item: String,
    pub message: String,
}

/// What a fix or update operation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixReport {
    pub fixed: Vec<String>,
    pub failed: Vec<FixFailure>,
}

impl FixReport {
    pub fn fixed(&mut self, item: impl Into<String>) {
        self.fixed.push(item.into());
    }

    pub fn failed(&mut self, item: impl Into<String>, message: impl std::fmt::Display) {
        self.failed.push(FixFailure {
            item: item.into(),
            message: message.to_string(),
        });
    }

    pub fn merge(&mut self, other: FixReport) {
        self.fixed.extend(other.fixed);
        self.failed.extend(other.failed);
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// An idempotent fix or an update.
///
/// Per-item failures go into the returned [`FixReport`]; an `Err` means the
/// operation could not run at all.
#[derive(Clone)]
pub struct Operation {
    run: Arc<OperationFn>,
}

impl Operation {
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FixReport, StepError>> + Send + 'static,
    {
        Self {
            run: Arc::new(move || run().boxed()),
        }
    }

    pub fn run(&self) -> BoxFuture<'static, Result<FixReport, StepError>> {
        (self.run)()
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Operation")
    }
}
