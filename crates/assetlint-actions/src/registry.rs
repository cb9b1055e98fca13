//! The static action set, in execution and report order.

use std::sync::Arc;

use assetlint_engine::Action;

use crate::context::ActionContext;
use crate::{binance, eth_forks, lists, tezos, tron, validators};

pub fn all_actions(ctx: Arc<ActionContext>) -> Vec<Action> {
    vec![
        eth_forks::action(Arc::clone(&ctx)),
        tron::action(Arc::clone(&ctx)),
        tezos::action(Arc::clone(&ctx)),
        binance::action(Arc::clone(&ctx)),
        validators::action(Arc::clone(&ctx)),
        lists::action(ctx),
    ]
}
