//! Structured lifecycle events for engine runs.
//!
//! Every event carries an `event` field (`run.started`, `run.phase`,
//! `step.finished`, `step.fault`, `fix.item_failed`, `run.finished`) so that
//! JSON log output can be filtered without parsing messages.

use tracing::{info, warn, Span};

/// Run-scoped span; attach it with `tracing::Instrument::instrument`.
///
/// ```ignore
/// engine_run.instrument(run_span(&run_id, "check", "sanity")).await
/// ```
pub fn run_span(run_id: &str, mode: &str, category: &str) -> Span {
    tracing::info_span!(
        "assetlint.run",
        run_id = %run_id,
        mode = %mode,
        category = %category
    )
}

pub fn emit_run_started(run_id: &str, mode: &str, category: &str, actions: usize) {
    info!(
        event = "run.started",
        run_id = %run_id,
        mode = %mode,
        category = %category,
        actions = actions,
    );
}

pub fn emit_run_phase(run_id: &str, phase: &str) {
    info!(event = "run.phase", run_id = %run_id, phase = %phase);
}

pub fn emit_step_finished(action: &str, step: &str, errors: usize, warnings: usize) {
    info!(
        event = "step.finished",
        action = %action,
        step = %step,
        errors = errors,
        warnings = warnings,
    );
}

/// A step fault that was folded into the aggregate as an error entry.
pub fn emit_step_fault(action: &str, step: &str, error: &dyn std::fmt::Display) {
    warn!(event = "step.fault", action = %action, step = %step, error = %error);
}

pub fn emit_fix_item_failed(action: &str, item: &str, error: &dyn std::fmt::Display) {
    warn!(event = "fix.item_failed", action = %action, item = %item, error = %error);
}

pub fn emit_run_finished(run_id: &str, duration_ms: u64, errors: usize, passed: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        errors = errors,
        passed = passed,
    );
}
