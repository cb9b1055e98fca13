//! Per-chain whitelist and blacklist consistency.
//!
//! Lists are kept unique and sorted in descending order. Every asset
//! directory must appear in exactly one of them.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use assetlint_core::repo::{self, Repo};
use assetlint_core::{Chain, RepoError};
use assetlint_engine::{Action, CheckResult, CheckStep, FixReport, Operation, StepError};

use crate::context::ActionContext;

pub const NAME: &str = "Whitelist and blacklist";

pub fn action(ctx: Arc<ActionContext>) -> Action {
    let check_ctx = Arc::clone(&ctx);
    Action::new(NAME)
        .with_consistency_check(CheckStep::new(
            "Assets must be listed in whitelist or blacklist, lists sorted and disjoint",
            move || check_all(Arc::clone(&check_ctx)),
        ))
        .with_consistency_fix(Operation::new(move || regenerate_all(Arc::clone(&ctx))))
}

/// Unique entries, sorted descending.
pub fn normalize_list<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let unique: BTreeSet<String> = items.into_iter().collect();
    unique.into_iter().rev().collect()
}

/// Regenerated `(whitelist, blacklist)`.
///
/// The whitelist gains every asset directory; blacklisted entries win over
/// whitelisted ones. An entry on both lists stays blacklisted and leaves the
/// whitelist rather than being dropped from both, so the lists are disjoint
/// after one pass and a blacklisted asset directory is never re-whitelisted.
pub fn plan_lists(
    assets: &[String],
    whitelist: &[String],
    blacklist: &[String],
) -> (Vec<String>, Vec<String>) {
    let black: BTreeSet<&String> = blacklist.iter().collect();
    let white = normalize_list(
        assets
            .iter()
            .chain(whitelist)
            .filter(|a| !black.contains(a))
            .cloned(),
    );
    (white, normalize_list(blacklist.iter().cloned()))
}

async fn chains_with_assets(repo: &Repo) -> Result<Vec<String>, StepError> {
    let mut chains = Vec::new();
    for chain in repo.list_chains().await? {
        if repo::is_dir(&repo.chain_assets_path(&chain)).await {
            chains.push(chain.as_str().to_string());
        }
    }
    Ok(chains)
}

async fn read_list(path: &Path) -> Result<Option<Vec<String>>, RepoError> {
    if !repo::path_exists(path).await {
        return Ok(None);
    }
    repo::read_json(path).await.map(Some)
}

async fn check_all(ctx: Arc<ActionContext>) -> Result<CheckResult, StepError> {
    let chains = chains_with_assets(&ctx.repo).await?;
    let results = ctx
        .fan_out(chains, |chain| check_chain(ctx.repo.clone(), Chain::new(chain)))
        .await?;

    let mut result = CheckResult::pass();
    for r in results {
        result.merge(r);
    }
    Ok(result)
}

async fn check_chain(repo: Repo, chain: Chain) -> Result<CheckResult, StepError> {
    let mut result = CheckResult::pass();
    let assets = repo.chain_assets(&chain).await?;

    let mut lists = Vec::with_capacity(2);
    for (kind, path) in [
        ("whitelist", repo.chain_whitelist_path(&chain)),
        ("blacklist", repo.chain_blacklist_path(&chain)),
    ] {
        match read_list(&path).await {
            Ok(Some(list)) => {
                if list != normalize_list(list.iter().cloned()) {
                    result.error(format!(
                        "The {kind} for chain {chain} must be unique and sorted in descending order"
                    ));
                }
                lists.push(list);
            }
            Ok(None) => {
                result.error(format!("Missing {kind} at path {}", path.display()));
                lists.push(Vec::new());
            }
            Err(err) => {
                result.error(err.to_string());
                lists.push(Vec::new());
            }
        }
    }
    let white: BTreeSet<&String> = lists[0].iter().collect();
    let black: BTreeSet<&String> = lists[1].iter().collect();

    for both in white.intersection(&black) {
        result.error(format!(
            "Asset {both} on chain {chain} is in both whitelist and blacklist"
        ));
    }
    for asset in &assets {
        if !white.contains(asset) && !black.contains(asset) {
            result.error(format!(
                "Asset {asset} on chain {chain} is neither whitelisted nor blacklisted"
            ));
        }
    }
    Ok(result)
}

async fn regenerate_all(ctx: Arc<ActionContext>) -> Result<FixReport, StepError> {
    let mut report = FixReport::default();
    for chain in chains_with_assets(&ctx.repo).await? {
        let chain = Chain::new(chain);
        match regenerate_chain(&ctx.repo, &chain).await {
            Ok(fixed) => {
                for path in fixed {
                    report.fixed(path);
                }
            }
            Err(err) => report.failed(chain.to_string(), err),
        }
    }
    Ok(report)
}

/// Rewrite both lists of `chain`; returns the paths that changed.
async fn regenerate_chain(repo: &Repo, chain: &Chain) -> Result<Vec<String>, RepoError> {
    let assets = repo.chain_assets(chain).await?;
    let white_path = repo.chain_whitelist_path(chain);
    let black_path = repo.chain_blacklist_path(chain);
    let current_white = read_list(&white_path).await?;
    let current_black = read_list(&black_path).await?;

    let (white, black) = plan_lists(
        &assets,
        current_white.as_deref().unwrap_or_default(),
        current_black.as_deref().unwrap_or_default(),
    );

    let mut changed = Vec::new();
    for (path, current, next) in [
        (white_path, current_white, white),
        (black_path, current_black, black),
    ] {
        if current.as_ref() != Some(&next) {
            repo::write_json(&path, &next).await?;
            changed.push(path.display().to_string());
        }
    }
    info!(chain = %chain, changed = changed.len(), "regenerated lists");
    Ok(changed)
}
