//! assetlint engine
//!
//! The plugin contract ([`Action`], [`CheckStep`], [`Operation`]) and the
//! engine that runs a check category, aggregates the results into a single
//! verdict, and applies fixes and updates.

pub mod action;
pub mod engine;
pub mod error;
pub mod gate;
pub mod legacy;
pub mod result;
pub mod step;

pub use action::{Action, Capabilities, Category};
pub use engine::{ActionReport, Engine, EngineConfig, FixSummary, RunPhase};
pub use error::{EngineError, EngineResult, StepError};
pub use gate::{evaluate, fix_exit_code, Verdict, FATAL_EXIT_CODE, MAX_ERROR_EXIT_CODE};
pub use result::{AggregateResult, CheckResult, Finding};
pub use step::{CheckStep, FixFailure, FixReport, Operation};
