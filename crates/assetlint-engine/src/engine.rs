//! Execution and aggregation of checks, fixes and updates.
//!
//! Every action's steps are spawned up front so that actions run
//! concurrently; a per-action semaphore bounds how many of one action's
//! steps are in flight. Results are collected by awaiting the tasks in
//! registration order, which keeps the aggregate deterministic no matter
//! which step finishes first.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, Instrument};
use uuid::Uuid;

use assetlint_core::{obs, METRICS};

use crate::action::{Action, Category};
use crate::error::{EngineError, EngineResult, StepError};
use crate::result::{AggregateResult, CheckResult};
use crate::step::{FixReport, Operation};

/// Concurrency limits for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Check steps of one action in flight at once.
    pub max_concurrent_checks: usize,
    /// Fix or update operations in flight at once, across actions.
    pub max_concurrent_fixes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_checks: 4,
            max_concurrent_fixes: 1,
        }
    }
}

impl EngineConfig {
    /// Defaults, with `ASSETLINT_MAX_CONCURRENCY` overriding the check limit.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(limit) = std::env::var("ASSETLINT_MAX_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
        {
            config.max_concurrent_checks = limit;
        }
        config
    }
}

/// Lifecycle of one run. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Idle,
    Scheduling,
    Running,
    Aggregating,
    Reported,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Scheduling => "scheduling",
            RunPhase::Running => "running",
            RunPhase::Aggregating => "aggregating",
            RunPhase::Reported => "reported",
        }
    }
}

struct RunState {
    id: String,
    phase: RunPhase,
    started: Instant,
}

impl RunState {
    fn new(id: String) -> Self {
        Self {
            id,
            phase: RunPhase::Idle,
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: RunPhase) {
        debug_assert!(next > self.phase, "run phase moved backwards");
        self.phase = next;
        obs::emit_run_phase(&self.id, next.as_str());
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

struct Scheduled<T> {
    action: String,
    step: String,
    handle: JoinHandle<Result<T, StepError>>,
}

/// Operation outcome for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    pub action: String,
    #[serde(flatten)]
    pub report: FixReport,
}

/// Result of a fix or update run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSummary {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub actions: Vec<ActionReport>,
}

impl FixSummary {
    pub fn fixed_count(&self) -> usize {
        self.actions.iter().map(|a| a.report.fixed.len()).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.actions.iter().map(|a| a.report.failed.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Runs the registered actions.
pub struct Engine {
    actions: Vec<Action>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(actions: Vec<Action>, config: EngineConfig) -> Self {
        Self { actions, config }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every check of `category` and aggregate the results.
    pub async fn check(&self, category: Category) -> EngineResult<AggregateResult> {
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id, "check", category.as_str());
        self.run_checks(run_id, category).instrument(span).await
    }

    /// Invoke every fix defined for `category`.
    pub async fn fix(&self, category: Category) -> EngineResult<FixSummary> {
        let operations = self
            .actions
            .iter()
            .filter_map(|a| a.fix(category).map(|op| (a.name().to_string(), op.clone())))
            .collect();
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id, "fix", category.as_str());
        self.run_operations(run_id, "fix", Some(category), operations)
            .instrument(span)
            .await
    }

    /// Fix, then re-run the checks and report what is left.
    pub async fn fix_and_check(
        &self,
        category: Category,
    ) -> EngineResult<(FixSummary, AggregateResult)> {
        let summary = self.fix(category).await?;
        let residual = self.check(category).await?;
        Ok((summary, residual))
    }

    /// Invoke every update operation.
    pub async fn update(&self) -> EngineResult<FixSummary> {
        let operations = self
            .actions
            .iter()
            .filter_map(|a| a.update().map(|op| (a.name().to_string(), op.clone())))
            .collect();
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id, "update", "all");
        self.run_operations(run_id, "update", None, operations)
            .instrument(span)
            .await
    }

    async fn run_checks(&self, run_id: String, category: Category) -> EngineResult<AggregateResult> {
        let mut run = RunState::new(run_id);
        obs::emit_run_started(&run.id, "check", category.as_str(), self.actions.len());

        run.advance(RunPhase::Scheduling);
        let mut scheduled = Vec::new();
        for action in &self.actions {
            let steps = action.checks(category);
            if steps.is_empty() {
                debug!(action = %action.name(), category = %category, "no checks");
                continue;
            }
            let limit = Arc::new(Semaphore::new(self.config.max_concurrent_checks.max(1)));
            for step in steps {
                let limit = Arc::clone(&limit);
                let task_step = step.clone();
                let handle = tokio::spawn(async move {
                    let _permit = limit.acquire_owned().await.ok();
                    task_step.run().await
                });
                scheduled.push(Scheduled {
                    action: action.name().to_string(),
                    step: step.name().to_string(),
                    handle,
                });
            }
        }

        run.advance(RunPhase::Running);
        let mut finished = Vec::with_capacity(scheduled.len());
        let mut pending = scheduled.into_iter();
        while let Some(task) = pending.next() {
            let outcome = task.handle.await;
            METRICS.inc_steps_executed();
            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(StepError::Fatal(message))) => {
                    pending.by_ref().for_each(|rest| rest.handle.abort());
                    obs::emit_run_finished(&run.id, run.elapsed_ms(), 0, false);
                    return Err(EngineError::Fatal {
                        action: task.action,
                        step: task.step,
                        message,
                    });
                }
                Ok(Err(fault)) => {
                    obs::emit_step_fault(&task.action, &task.step, &fault);
                    CheckResult::with_error(fault.to_string())
                }
                Err(join) => {
                    let message = join_failure(join);
                    obs::emit_step_fault(&task.action, &task.step, &message);
                    CheckResult::with_error(message)
                }
            };
            obs::emit_step_finished(
                &task.action,
                &task.step,
                result.errors.len(),
                result.warnings.len(),
            );
            finished.push((task.action, task.step, result));
        }

        run.advance(RunPhase::Aggregating);
        let mut aggregate = AggregateResult::new(category);
        for (action, step, result) in finished {
            aggregate.absorb(&action, &step, result);
        }

        run.advance(RunPhase::Reported);
        obs::emit_run_finished(
            &run.id,
            run.elapsed_ms(),
            aggregate.error_count(),
            aggregate.is_pass(),
        );
        Ok(aggregate)
    }

    async fn run_operations(
        &self,
        run_id: String,
        mode: &str,
        category: Option<Category>,
        operations: Vec<(String, Operation)>,
    ) -> EngineResult<FixSummary> {
        let mut run = RunState::new(run_id);
        let label = category.map_or("all", |c| c.as_str());
        obs::emit_run_started(&run.id, mode, label, operations.len());

        run.advance(RunPhase::Scheduling);
        let limit = Arc::new(Semaphore::new(self.config.max_concurrent_fixes.max(1)));
        let scheduled: Vec<Scheduled<FixReport>> = operations
            .into_iter()
            .map(|(action, operation)| {
                let limit = Arc::clone(&limit);
                let handle = tokio::spawn(async move {
                    let _permit = limit.acquire_owned().await.ok();
                    operation.run().await
                });
                Scheduled {
                    action,
                    step: mode.to_string(),
                    handle,
                }
            })
            .collect();

        run.advance(RunPhase::Running);
        let mut finished = Vec::with_capacity(scheduled.len());
        let mut pending = scheduled.into_iter();
        while let Some(task) = pending.next() {
            let report = match task.handle.await {
                Ok(Ok(report)) => report,
                Ok(Err(StepError::Fatal(message))) => {
                    pending.by_ref().for_each(|rest| rest.handle.abort());
                    obs::emit_run_finished(&run.id, run.elapsed_ms(), 0, false);
                    return Err(EngineError::Fatal {
                        action: task.action,
                        step: task.step,
                        message,
                    });
                }
                Ok(Err(fault)) => {
                    let mut report = FixReport::default();
                    report.failed(task.action.clone(), fault);
                    report
                }
                Err(join) => {
                    let mut report = FixReport::default();
                    report.failed(task.action.clone(), join_failure(join));
                    report
                }
            };
            for failure in &report.failed {
                obs::emit_fix_item_failed(&task.action, &failure.item, &failure.message);
            }
            METRICS.add_fixes_applied(report.fixed.len() as u64);
            METRICS.add_fix_failures(report.failed.len() as u64);
            finished.push(ActionReport {
                action: task.action,
                report,
            });
        }

        run.advance(RunPhase::Aggregating);
        let summary = FixSummary {
            mode: mode.to_string(),
            category,
            actions: finished,
        };

        run.advance(RunPhase::Reported);
        obs::emit_run_finished(
            &run.id,
            run.elapsed_ms(),
            summary.failed_count(),
            summary.is_clean(),
        );
        Ok(summary)
    }
}

fn join_failure(err: JoinError) -> String {
    if !err.is_panic() {
        return format!("task cancelled: {err}");
    }
    let payload = err.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("panicked: {detail}")
}
