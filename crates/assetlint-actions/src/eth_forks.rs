//! Ethereum-style chains: folder structure, checksummed directory names,
//! logos and asset info files.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use assetlint_core::repo::{self, Repo, LOGO_EXTENSION, LOGO_FULL_NAME, LOGO_NAME};
use assetlint_core::{is_checksum, to_checksum, Chain, ChecksumScheme};
use assetlint_engine::{Action, CheckResult, CheckStep, FixReport, Operation, StepError};

use crate::context::ActionContext;

pub const NAME: &str = "Ethereum forks";

/// Keys an `info.json` must carry as strings.
pub const INFO_REQUIRED_KEYS: [&str; 4] = ["name", "website", "short_description", "explorer"];

pub fn action(ctx: Arc<ActionContext>) -> Action {
    let mut action = Action::new(NAME);
    for fork in ctx.registry.eth_forks() {
        let ctx = Arc::clone(&ctx);
        let chain = fork.chain.clone();
        let scheme = fork.scheme;
        action = action.with_sanity_check(CheckStep::new(
            format!("Folder structure for chain {chain} (ethereum fork)"),
            move || check_chain(Arc::clone(&ctx), chain.clone(), scheme),
        ));
    }
    let fix_ctx = Arc::clone(&ctx);
    action.with_sanity_fix(Operation::new(move || fix_all(Arc::clone(&fix_ctx))))
}

async fn check_chain(
    ctx: Arc<ActionContext>,
    chain: Chain,
    scheme: ChecksumScheme,
) -> Result<CheckResult, StepError> {
    let assets = ctx.repo.chain_assets(&chain).await?;
    info!(chain = %chain, assets = assets.len(), "checking ethereum fork assets");

    let results = ctx
        .fan_out(assets, |address| {
            check_asset(ctx.repo.clone(), chain.clone(), scheme, address)
        })
        .await?;

    let mut result = CheckResult::pass();
    for r in results {
        result.merge(r);
    }
    Ok(result)
}

async fn check_asset(
    repo: Repo,
    chain: Chain,
    scheme: ChecksumScheme,
    address: String,
) -> Result<CheckResult, StepError> {
    let mut result = CheckResult::pass();
    let asset_path = repo.chain_asset_path(&chain, &address);

    if !repo::is_dir(&asset_path).await {
        result.error(format!("Expect directory at path: {}", asset_path.display()));
    }
    if !is_checksum(&address, scheme) {
        result.error(format!(
            "Expect asset at path {} in checksum",
            asset_path.display()
        ));
    }
    let logo_path = repo.chain_asset_logo_path(&chain, &address);
    if !repo::path_exists(&logo_path).await {
        result.error(format!("Missing file at path '{}'", logo_path.display()));
    }
    result.merge(check_asset_info(&repo.chain_asset_info_path(&chain, &address)).await);
    Ok(result)
}

/// A missing info file is a warning; an unreadable or incomplete one an error.
pub async fn check_asset_info(path: &Path) -> CheckResult {
    let mut result = CheckResult::pass();
    if !repo::path_exists(path).await {
        result.warning(format!("Missing info file at path '{}'", path.display()));
        return result;
    }
    let value: Value = match repo::read_json(path).await {
        Ok(value) => value,
        Err(err) => {
            result.error(err.to_string());
            return result;
        }
    };
    let missing: Vec<&str> = INFO_REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !value.get(*key).is_some_and(Value::is_string))
        .collect();
    if !missing.is_empty() {
        result.error(format!(
            "Info at path '{}' is missing or has invalid keys: {}",
            path.display(),
            missing.join(", ")
        ));
    }
    result
}

async fn fix_all(ctx: Arc<ActionContext>) -> Result<FixReport, StepError> {
    let mut report = FixReport::default();
    for fork in ctx.registry.eth_forks() {
        let assets = match ctx.repo.chain_assets(&fork.chain).await {
            Ok(assets) => assets,
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                warn!(chain = %fork.chain, error = %err, "cannot list fork assets");
                report.failed(fork.chain.to_string(), err);
                continue;
            }
        };
        for address in assets {
            report.merge(fix_asset(&ctx.repo, &fork.chain, fork.scheme, &address).await);
        }
        info!(chain = %fork.chain, "fixed ethereum fork assets");
    }
    Ok(report)
}

/// Logo extension, info formatting, then the directory name. The directory
/// is renamed last so the earlier steps use the current path.
async fn fix_asset(repo: &Repo, chain: &Chain, scheme: ChecksumScheme, address: &str) -> FixReport {
    let mut report = FixReport::default();
    let asset_path = repo.chain_asset_path(chain, address);

    match repo.chain_asset_files(chain, address).await {
        Ok(files) => {
            for file in files {
                let path = asset_path.join(&file);
                let stem = path.file_stem().and_then(|s| s.to_str());
                let ext = path.extension().and_then(|s| s.to_str());
                if stem == Some(LOGO_NAME) && ext != Some(LOGO_EXTENSION) {
                    let target = asset_path.join(LOGO_FULL_NAME);
                    match repo::move_path(&path, &target).await {
                        Ok(()) => report.fixed(format!("{} -> {}", path.display(), LOGO_FULL_NAME)),
                        Err(err) => report.failed(path.display().to_string(), err),
                    }
                }
            }
        }
        Err(err) => report.failed(asset_path.display().to_string(), err),
    }

    let info_path = repo.chain_asset_info_path(chain, address);
    if repo::path_exists(&info_path).await {
        match repo::format_json_file(&info_path).await {
            Ok(true) => report.fixed(info_path.display().to_string()),
            Ok(false) => {}
            Err(err) => report.failed(info_path.display().to_string(), err),
        }
    }

    if !is_checksum(address, scheme) {
        match to_checksum(address, scheme) {
            Ok(canonical) => {
                let target = repo.chain_asset_path(chain, &canonical);
                match repo::move_path(&asset_path, &target).await {
                    Ok(()) => {
                        info!(chain = %chain, from = %address, to = %canonical, "renamed to checksum format");
                        report.fixed(format!("{chain}/{address} -> {canonical}"));
                    }
                    Err(err) => report.failed(asset_path.display().to_string(), err),
                }
            }
            Err(err) => report.failed(asset_path.display().to_string(), err),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_info_missing_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_asset_info(&dir.path().join("info.json")).await;
        assert!(result.is_pass());
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_info_missing_keys_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");
        repo::write_json(&path, &json!({"name": "Token", "website": 1}))
            .await
            .unwrap();
        let result = check_asset_info(&path).await;
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("website, short_description, explorer"));
    }

    #[tokio::test]
    async fn test_info_complete_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");
        let info = json!({
            "name": "Token",
            "website": "https://token.io",
            "short_description": "A token",
            "explorer": "https://etherscan.io/token/0x0"
        });
        repo::write_json(&path, &info).await.unwrap();
        let result = check_asset_info(&path).await;
        assert!(result.is_pass());
        assert!(result.warnings.is_empty());
    }
}
