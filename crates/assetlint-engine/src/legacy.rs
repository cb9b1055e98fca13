//! Adapter for checks that report in the single-string form.
//!
//! A legacy check returns zero or more `\n`-terminated error lines; the empty
//! string is a pass. Nothing outside this module knows the form exists.

use std::future::Future;

use crate::error::StepError;
use crate::result::CheckResult;
use crate::step::CheckStep;

impl CheckResult {
    /// Lift a legacy error string. Blank lines are dropped.
    pub fn from_legacy(output: &str) -> Self {
        let errors = output
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        CheckResult {
            errors,
            warnings: Vec::new(),
        }
    }
}

impl CheckStep {
    /// Wrap a check that reports a legacy error string.
    pub fn legacy<F, Fut>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, StepError>> + Send + 'static,
    {
        CheckStep::new(name, move || {
            let fut = check();
            async move { fut.await.map(|output| CheckResult::from_legacy(&output)) }
        })
    }
}
