//! Tron: asset directories are TRC10 ids or TRC20 addresses.

use std::sync::Arc;

use assetlint_core::chain::TRON;
use assetlint_core::repo;
use assetlint_core::{classify_tron, is_trc20, Chain};
use assetlint_engine::{Action, CheckResult, CheckStep, StepError};

use crate::context::ActionContext;

pub const NAME: &str = "Tron chain";

pub fn action(ctx: Arc<ActionContext>) -> Action {
    let assets_ctx = Arc::clone(&ctx);
    let validators_ctx = ctx;
    Action::new(NAME)
        .with_sanity_check(CheckStep::new(
            "Tron assets should be TRC10 or TRC20, and have a logo",
            move || check_assets(Arc::clone(&assets_ctx)),
        ))
        .with_sanity_check(CheckStep::new(
            "Tron validator assets must have correct format",
            move || check_validator_assets(Arc::clone(&validators_ctx)),
        ))
}

async fn check_assets(ctx: Arc<ActionContext>) -> Result<CheckResult, StepError> {
    let chain = Chain::from(TRON);
    let assets_path = ctx.repo.chain_assets_path(&chain);
    let assets = ctx.repo.chain_assets(&chain).await?;

    let results = ctx
        .fan_out(assets, |asset| {
            let logo_path = ctx.repo.chain_asset_logo_path(&chain, &asset);
            let assets_path = assets_path.clone();
            async move {
                let mut result = CheckResult::pass();
                if classify_tron(&asset).is_none() {
                    result.error(format!(
                        "Asset {asset} at path '{}' is not TRC10 nor TRC20",
                        assets_path.display()
                    ));
                }
                if !repo::path_exists(&logo_path).await {
                    result.error(format!("Missing file at path '{}'", logo_path.display()));
                }
                Ok(result)
            }
        })
        .await?;

    let mut result = CheckResult::pass();
    for r in results {
        result.merge(r);
    }
    Ok(result)
}

async fn check_validator_assets(ctx: Arc<ActionContext>) -> Result<CheckResult, StepError> {
    let chain = Chain::from(TRON);
    let mut result = CheckResult::pass();
    for id in ctx.repo.chain_validator_assets(&chain).await? {
        if !is_trc20(&id) {
            result.error(format!("Address {id} should be TRC20 address"));
        }
    }
    Ok(result)
}
