//! Pass/fail verdicts and process exit codes.
//!
//! The verdict is solely a function of the error count. Exit codes above
//! [`MAX_ERROR_EXIT_CODE`] are clamped so that a failing run can never be
//! mistaken for a fatal abort.

use serde::{Deserialize, Serialize};

use crate::engine::FixSummary;
use crate::result::AggregateResult;

/// Exit code of a run aborted by a fatal error.
pub const FATAL_EXIT_CODE: i32 = 255;

/// Largest exit code a failing (non-fatal) run reports.
pub const MAX_ERROR_EXIT_CODE: i32 = 254;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub errors: usize,
    pub warnings: usize,
    pub message: String,
}

impl Verdict {
    pub fn exit_code(&self) -> i32 {
        clamp_exit_code(self.errors)
    }
}

/// Decide the verdict for an aggregate.
pub fn evaluate(aggregate: &AggregateResult) -> Verdict {
    let errors = aggregate.error_count();
    let warnings = aggregate.warning_count();
    let passed = errors == 0;
    let message = if passed {
        format!("All {} checks passed ({} warning(s))", aggregate.category, warnings)
    } else {
        format!(
            "{} check failed with {} error(s), {} warning(s)",
            aggregate.category, errors, warnings
        )
    };
    Verdict {
        passed,
        errors,
        warnings,
        message,
    }
}

/// Exit code for a fix or update run: the number of failed items.
pub fn fix_exit_code(summary: &FixSummary) -> i32 {
    clamp_exit_code(summary.failed_count())
}

fn clamp_exit_code(count: usize) -> i32 {
    i32::try_from(count)
        .unwrap_or(MAX_ERROR_EXIT_CODE)
        .min(MAX_ERROR_EXIT_CODE)
}
