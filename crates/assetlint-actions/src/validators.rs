//! Validator lists of every staking chain.

use std::sync::Arc;

use serde_json::Value;

use assetlint_core::repo;
use assetlint_core::validators::{missing_validator_keys, validator_id};
use assetlint_core::{check_logo, Chain};
use assetlint_engine::{Action, CheckResult, CheckStep, FixReport, Operation, StepError};

use crate::context::ActionContext;

pub const NAME: &str = "Validators";

pub fn action(ctx: Arc<ActionContext>) -> Action {
    let mut action = Action::new(NAME);
    for chain in ctx.registry.staking_chains() {
        let ctx = Arc::clone(&ctx);
        let chain = chain.clone();
        action = action.with_sanity_check(CheckStep::new(
            format!("Make sure chain {chain} has valid list file, has logo"),
            move || check_chain(Arc::clone(&ctx), chain.clone()),
        ));
    }
    action.with_sanity_fix(Operation::new(move || format_lists(Arc::clone(&ctx))))
}

async fn check_chain(ctx: Arc<ActionContext>, chain: Chain) -> Result<CheckResult, StepError> {
    let list_path = ctx.repo.chain_validators_list_path(&chain);
    let entries = match repo::read_json::<Value>(&list_path).await {
        Ok(Value::Array(entries)) => entries,
        _ => {
            return Ok(CheckResult::with_error(format!(
                "Not valid Json file at path {}",
                list_path.display()
            )))
        }
    };
    let logo_dirs = ctx.repo.chain_validator_assets(&chain).await?;

    let mut result = CheckResult::pass();
    for entry in &entries {
        if !missing_validator_keys(entry).is_empty() {
            result.error(format!("Some key and/or type missing for validator {entry}"));
        }
        let Some(id) = validator_id(entry) else {
            continue;
        };
        if !logo_dirs.iter().any(|d| d == id) {
            result.error(format!("Expecting image asset for validator {id} on chain {chain}"));
            continue;
        }
        let logo_path = ctx.repo.chain_validator_logo_path(&chain, id);
        if !repo::path_exists(&logo_path).await {
            result.error(format!(
                "Chain {chain} asset {id} logo must be present at path {}",
                logo_path.display()
            ));
            continue;
        }
        let findings = check_logo(&logo_path).await;
        result.merge(CheckResult {
            errors: findings.errors,
            warnings: findings.warnings,
        });
    }

    for dir in &logo_dirs {
        let count = entries
            .iter()
            .filter(|e| validator_id(e) == Some(dir.as_str()))
            .count();
        if count != 1 {
            result.error(format!(
                "Expect validator logo {dir} to have exactly one info entry, found {count}"
            ));
        }
    }
    Ok(result)
}

async fn format_lists(ctx: Arc<ActionContext>) -> Result<FixReport, StepError> {
    let mut report = FixReport::default();
    for chain in ctx.registry.staking_chains() {
        let path = ctx.repo.chain_validators_list_path(chain);
        if !repo::path_exists(&path).await {
            continue;
        }
        match repo::format_json_file(&path).await {
            Ok(true) => report.fixed(path.display().to_string()),
            Ok(false) => {}
            Err(err) => report.failed(path.display().to_string(), err),
        }
    }
    Ok(report)
}
