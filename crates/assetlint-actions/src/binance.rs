//! Binance chain: asset directories must name tokens that exist on chain;
//! update downloads missing BEP2 logos.
//!
//! The token list endpoint is rate limited, so every step of this action
//! reads it through one [`CachedSource`] owned by the action.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use assetlint_core::chain::BINANCE;
use assetlint_core::repo;
use assetlint_core::{BinanceAssetInfo, BinanceToken, CachedSource, Chain};
use assetlint_engine::{Action, CheckResult, CheckStep, FixReport, Operation, StepError};

use crate::context::ActionContext;

pub const NAME: &str = "Binance chain";

pub fn action(ctx: Arc<ActionContext>) -> Action {
    let tokens = Arc::new(CachedSource::new(Arc::clone(&ctx.remote.binance_tokens)));

    let assets_step = {
        let ctx = Arc::clone(&ctx);
        let tokens = Arc::clone(&tokens);
        CheckStep::new("Binance chain; assets must exist on chain", move || {
            check_assets_on_chain(Arc::clone(&ctx), Arc::clone(&tokens))
        })
    };
    let whitelist_step = {
        let ctx = Arc::clone(&ctx);
        let tokens = Arc::clone(&tokens);
        CheckStep::new(
            "Binance chain; whitelisted tokens should exist on chain",
            move || check_whitelist_on_chain(Arc::clone(&ctx), Arc::clone(&tokens)),
        )
    };

    Action::new(NAME)
        .with_sanity_check(assets_step)
        .with_sanity_check(whitelist_step)
        .with_update(Operation::new(move || fetch_missing_logos(Arc::clone(&ctx))))
}

async fn token_symbols(
    tokens: &CachedSource<BinanceToken>,
) -> Result<HashSet<String>, StepError> {
    let tokens = tokens.get().await?;
    info!(tokens = tokens.len(), "using binance token list");
    Ok(tokens.iter().map(|t| t.symbol.clone()).collect())
}

async fn check_assets_on_chain(
    ctx: Arc<ActionContext>,
    tokens: Arc<CachedSource<BinanceToken>>,
) -> Result<CheckResult, StepError> {
    let symbols = token_symbols(&tokens).await?;
    let assets = ctx.repo.chain_assets(&Chain::from(BINANCE)).await?;

    let mut result = CheckResult::pass();
    for asset in &assets {
        if !symbols.contains(asset) {
            result.error(format!("Asset {asset} missing on chain"));
        }
    }
    info!(assets = assets.len(), "binance assets checked");
    Ok(result)
}

async fn check_whitelist_on_chain(
    ctx: Arc<ActionContext>,
    tokens: Arc<CachedSource<BinanceToken>>,
) -> Result<CheckResult, StepError> {
    let path = ctx.repo.chain_whitelist_path(&Chain::from(BINANCE));
    if !repo::path_exists(&path).await {
        return Ok(CheckResult::pass());
    }
    let whitelist: Vec<String> = repo::read_json(&path).await?;
    let symbols = token_symbols(&tokens).await?;

    let mut result = CheckResult::pass();
    for symbol in whitelist.iter().filter(|s| !symbols.contains(*s)) {
        result.warning(format!("Whitelisted token {symbol} not found on chain"));
    }
    Ok(result)
}

/// BEP2 assets with an image URL, not blacklisted, and no logo on disk yet.
///
/// Names that are not a plain path segment are kept so the caller reports them.
pub async fn images_to_fetch(
    ctx: &ActionContext,
    infos: Vec<BinanceAssetInfo>,
) -> Result<Vec<(String, String)>, StepError> {
    let chain = Chain::from(BINANCE);
    let blacklist_path = ctx.repo.chain_blacklist_path(&chain);
    let blacklist: HashSet<String> = if repo::path_exists(&blacklist_path).await {
        repo::read_json::<Vec<String>>(&blacklist_path)
            .await?
            .into_iter()
            .collect()
    } else {
        HashSet::new()
    };

    let mut to_fetch = Vec::new();
    for entry in infos {
        let Some(url) = entry.asset_img.filter(|u| !u.is_empty()) else {
            continue;
        };
        if blacklist.contains(&entry.asset) {
            info!(asset = %entry.asset, "blacklisted, skipping logo");
            continue;
        }
        if !repo::is_plain_name(&entry.asset)
            || !repo::path_exists(&ctx.repo.chain_asset_logo_path(&chain, &entry.asset)).await
        {
            to_fetch.push((entry.asset, url));
        }
    }
    Ok(to_fetch)
}

async fn fetch_missing_logos(ctx: Arc<ActionContext>) -> Result<FixReport, StepError> {
    let infos = ctx.remote.binance_asset_infos.fetch().await?;
    let to_fetch = images_to_fetch(&ctx, infos).await?;
    info!(count = to_fetch.len(), "asset image(s) to be fetched");

    let chain = Chain::from(BINANCE);
    let mut report = FixReport::default();
    for (asset, url) in to_fetch {
        if !repo::is_plain_name(&asset) {
            warn!(asset = %asset, "refusing asset name that is not a plain path segment");
            report.failed(asset, "invalid asset name");
            continue;
        }
        let logo_path = ctx.repo.chain_asset_logo_path(&chain, &asset);
        let fetched = match ctx.remote.images.fetch_image(&url).await {
            Ok(bytes) => repo::write_bytes(&logo_path, &bytes)
                .await
                .map_err(|e| e.to_string()),
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => Err(err.to_string()),
        };
        match fetched {
            Ok(()) => {
                info!(asset = %asset, url = %url, "fetched logo");
                report.fixed(asset);
            }
            Err(message) => {
                warn!(asset = %asset, url = %url, error = %message, "logo fetch failed");
                report.failed(asset, message);
            }
        }
    }
    Ok(report)
}
