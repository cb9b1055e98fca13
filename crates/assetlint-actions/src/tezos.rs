//! Tezos: validator ids must be valid addresses; the validator list is
//! refreshed from the Baking Bad bakers API.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use assetlint_core::chain::TEZOS;
use assetlint_core::repo;
use assetlint_core::{is_tezos_address, BakingBadBaker, Chain, ValidatorModel, ValidatorStatus};
use assetlint_engine::{Action, CheckStep, FixReport, Operation, StepError};

use crate::context::ActionContext;

pub const NAME: &str = "Tezos";

const ACTIVE_SERVICE: &str = "active";

pub fn action(ctx: Arc<ActionContext>) -> Action {
    let check_ctx = Arc::clone(&ctx);
    let update_ctx = ctx;
    Action::new(NAME)
        .with_sanity_check(CheckStep::legacy(
            "Tezos validator assets must have correct format",
            move || check_validator_assets(Arc::clone(&check_ctx)),
        ))
        .with_update(Operation::new(move || {
            update_validators(Arc::clone(&update_ctx))
        }))
}

/// Reports in the single-string form, one line per bad id.
async fn check_validator_assets(ctx: Arc<ActionContext>) -> Result<String, StepError> {
    let chain = Chain::from(TEZOS);
    let mut output = String::new();
    for id in ctx.repo.chain_validator_assets(&chain).await? {
        if !is_tezos_address(&id) {
            output.push_str(&format!("Address {id} must be valid Tezos address\n"));
        }
    }
    Ok(output)
}

async fn update_validators(ctx: Arc<ActionContext>) -> Result<FixReport, StepError> {
    let bakers = ctx.remote.tezos_bakers.fetch().await?;
    let list_path = ctx.repo.chain_validators_list_path(&Chain::from(TEZOS));
    let validators: Vec<ValidatorModel> = repo::read_json(&list_path).await?;

    let (updated, report) = apply_bakers(validators, &bakers);
    repo::write_json(&list_path, &updated).await?;
    info!(validators = updated.len(), "updated tezos validators");
    Ok(report)
}

/// Refresh validator entries from the bakers list.
///
/// Validators unknown to the API are dropped from the list.
pub fn apply_bakers(
    validators: Vec<ValidatorModel>,
    bakers: &[BakingBadBaker],
) -> (Vec<ValidatorModel>, FixReport) {
    let by_address: HashMap<&str, &BakingBadBaker> =
        bakers.iter().map(|b| (b.address.as_str(), b)).collect();

    let mut report = FixReport::default();
    let mut updated = Vec::with_capacity(validators.len());
    for mut validator in validators {
        let Some(baker) = by_address.get(validator.id.as_str()) else {
            info!(id = %validator.id, "baker not listed by Baking Bad, dropping");
            report.fixed(format!("dropped {}", validator.id));
            continue;
        };

        let payout = validator.payout.get_or_insert_with(Default::default);
        payout.commission = (baker.fee * 100.0 * 100.0).round() / 100.0;
        payout.payout_delay = baker.payout_delay;
        payout.payout_period = baker.payout_period;
        validator
            .staking
            .get_or_insert_with(Default::default)
            .min_delegation = baker.min_delegation;

        let free_space = baker.free_space.round() as i64;
        if free_space <= 0 {
            validator.status = Some(ValidatorStatus {
                disabled: true,
                note: format!("No more capacity: {free_space}"),
            });
        } else {
            validator.status = None;
        }

        if baker.service_health != ACTIVE_SERVICE {
            validator.status = Some(ValidatorStatus {
                disabled: true,
                note: format!(
                    "According to Baking Bad API, baker is not active, current status {}, see: https://api.baking-bad.org/v2/bakers/{}",
                    baker.service_health, baker.address
                ),
            });
        }

        report.fixed(validator.id.clone());
        updated.push(validator);
    }
    (updated, report)
}
