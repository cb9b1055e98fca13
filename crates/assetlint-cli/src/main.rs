//! assetlint - validation and repair for a file-based asset dataset
//!
//! ## Commands
//!
//! - `check <sanity|consistency>`: run every check of a category
//! - `fix <sanity|consistency>`: apply the fixes of a category
//! - `update`: refresh data from external sources
//! - `list`: show registered actions and what they can do
//!
//! `check` exits with the number of errors found (0 = pass, clamped to 254).
//! `fix` and `update` exit with the number of items that failed. A fatal
//! error (dataset root unreadable, remote host unreachable) exits with 255.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{error, Level};

use assetlint_actions::{all_actions, ActionContext, RemoteSources};
use assetlint_core::{init_tracing, ChainRegistry, RemoteConfig, Repo, METRICS};
use assetlint_engine::{
    evaluate, fix_exit_code, AggregateResult, Capabilities, Category, Engine, EngineConfig,
    FixSummary, Verdict, FATAL_EXIT_CODE,
};

#[derive(Parser)]
#[command(name = "assetlint")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate and repair a blockchain asset dataset", long_about = None)]
struct Cli {
    /// Dataset root (the directory containing `chains/`)
    #[arg(long, global = true, env = "ASSETLINT_REPO", default_value = ".")]
    repo: PathBuf,

    /// Maximum number of check steps of one action running at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Print the report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every check of a category
    Check {
        #[arg(value_enum)]
        category: CategoryArg,
    },

    /// Apply the fixes of a category
    Fix {
        #[arg(value_enum)]
        category: CategoryArg,

        /// Re-run the checks afterwards and report what is left
        #[arg(long)]
        verify: bool,
    },

    /// Refresh data from external sources
    Update,

    /// List registered actions and their capabilities
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CategoryArg {
    Sanity,
    Consistency,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Sanity => Category::Sanity,
            CategoryArg::Consistency => Category::Consistency,
        }
    }
}

#[derive(Serialize)]
struct CheckReport<'a> {
    generated_at: DateTime<Utc>,
    digest: String,
    verdict: &'a Verdict,
    #[serde(flatten)]
    aggregate: &'a AggregateResult,
}

impl<'a> CheckReport<'a> {
    fn new(aggregate: &'a AggregateResult, verdict: &'a Verdict) -> Self {
        Self {
            generated_at: Utc::now(),
            digest: aggregate.digest(),
            verdict,
            aggregate,
        }
    }
}

#[derive(Serialize)]
struct FixOutput<'a> {
    generated_at: DateTime<Utc>,
    fixed: usize,
    failed: usize,
    #[serde(flatten)]
    summary: &'a FixSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    residual: Option<CheckReport<'a>>,
}

#[derive(Serialize)]
struct ActionListing<'a> {
    name: &'a str,
    capabilities: Capabilities,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.log_json, level);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %format!("{err:#}"), "assetlint aborted");
            eprintln!("fatal: {err:#}");
            FATAL_EXIT_CODE
        }
    };
    METRICS.flush();
    ExitCode::from(to_exit_byte(code))
}

fn to_exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(u8::MAX)
}

fn build_engine(cli: &Cli) -> Result<Engine> {
    let mut config = EngineConfig::from_env();
    if let Some(limit) = cli.concurrency {
        config.max_concurrent_checks = limit.max(1);
    }
    let remote = RemoteSources::http(&RemoteConfig::from_env())
        .context("Failed to set up HTTP client")?;
    let ctx = ActionContext::new(Repo::new(&cli.repo), ChainRegistry::default(), remote)
        .with_fan_out(config.max_concurrent_checks);
    Ok(Engine::new(all_actions(Arc::new(ctx)), config))
}

async fn run(cli: Cli) -> Result<i32> {
    let engine = build_engine(&cli)?;
    if let Commands::List = cli.command {
        return cmd_list(&engine, cli.json);
    }

    Repo::new(&cli.repo)
        .verify_root()
        .await
        .context("Dataset root is not usable")?;

    match cli.command {
        Commands::Check { category } => cmd_check(&engine, category.into(), cli.json).await,
        Commands::Fix { category, verify } => {
            cmd_fix(&engine, category.into(), verify, cli.json).await
        }
        Commands::Update => cmd_update(&engine, cli.json).await,
        Commands::List => cmd_list(&engine, cli.json),
    }
}

async fn cmd_check(engine: &Engine, category: Category, json: bool) -> Result<i32> {
    let aggregate = engine
        .check(category)
        .await
        .context("Check run aborted")?;
    let verdict = evaluate(&aggregate);

    if json {
        let report = CheckReport::new(&aggregate, &verdict);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_aggregate(&aggregate, &verdict);
    }
    Ok(verdict.exit_code())
}

async fn cmd_fix(engine: &Engine, category: Category, verify: bool, json: bool) -> Result<i32> {
    let (summary, residual) = if verify {
        let (summary, residual) = engine
            .fix_and_check(category)
            .await
            .context("Fix run aborted")?;
        (summary, Some(residual))
    } else {
        let summary = engine.fix(category).await.context("Fix run aborted")?;
        (summary, None)
    };
    let verdict = residual.as_ref().map(evaluate);

    if json {
        let output = FixOutput {
            generated_at: Utc::now(),
            fixed: summary.fixed_count(),
            failed: summary.failed_count(),
            summary: &summary,
            residual: residual
                .as_ref()
                .zip(verdict.as_ref())
                .map(|(aggregate, verdict)| CheckReport::new(aggregate, verdict)),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&summary);
        if let (Some(aggregate), Some(verdict)) = (&residual, &verdict) {
            println!();
            print_aggregate(aggregate, verdict);
        }
    }

    let residual_code = verdict.map(|v| v.exit_code()).unwrap_or(0);
    Ok(fix_exit_code(&summary).max(residual_code))
}

async fn cmd_update(engine: &Engine, json: bool) -> Result<i32> {
    let summary = engine.update().await.context("Update run aborted")?;
    if json {
        let output = FixOutput {
            generated_at: Utc::now(),
            fixed: summary.fixed_count(),
            failed: summary.failed_count(),
            summary: &summary,
            residual: None,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&summary);
    }
    Ok(fix_exit_code(&summary))
}

fn cmd_list(engine: &Engine, json: bool) -> Result<i32> {
    let listing: Vec<ActionListing<'_>> = engine
        .actions()
        .iter()
        .map(|a| ActionListing {
            name: a.name(),
            capabilities: a.capabilities(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(0);
    }
    for entry in &listing {
        let caps = &entry.capabilities;
        let flag = |on: bool| if on { "yes" } else { "-" };
        println!("{}", entry.name);
        println!(
            "  sanity checks: {:<3} consistency checks: {:<3} sanity fix: {:<4} consistency fix: {:<4} update: {}",
            caps.sanity_checks,
            caps.consistency_checks,
            flag(caps.sanity_fix),
            flag(caps.consistency_fix),
            flag(caps.update)
        );
    }
    Ok(0)
}

fn print_aggregate(aggregate: &AggregateResult, verdict: &Verdict) {
    for finding in &aggregate.errors {
        println!("  ✗ {}", finding);
    }
    for finding in &aggregate.warnings {
        println!("  ! {}", finding);
    }
    let status = if verdict.passed { "✓" } else { "✗" };
    println!("{} {}", status, verdict.message);
}

fn print_summary(summary: &FixSummary) {
    for action in &summary.actions {
        println!(
            "{}: {} fixed, {} failed",
            action.action,
            action.report.fixed.len(),
            action.report.failed.len()
        );
        for item in &action.report.fixed {
            println!("  ✓ {}", item);
        }
        for failure in &action.report.failed {
            println!("  ✗ {}: {}", failure.item, failure.message);
        }
    }
    println!(
        "Summary: {} fixed, {} failed",
        summary.fixed_count(),
        summary.failed_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("assetlint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_check_category() {
        let parsed = cli(&["check", "consistency", "--json"]);
        assert!(parsed.json);
        assert!(matches!(
            parsed.command,
            Commands::Check {
                category: CategoryArg::Consistency
            }
        ));
        assert!(Cli::try_parse_from(["assetlint", "check", "everything"]).is_err());
    }

    #[test]
    fn test_parse_fix_verify_and_globals() {
        let parsed = cli(&["--repo", "/data", "fix", "sanity", "--verify", "--concurrency", "2"]);
        assert_eq!(parsed.repo, PathBuf::from("/data"));
        assert_eq!(parsed.concurrency, Some(2));
        assert!(matches!(
            parsed.command,
            Commands::Fix {
                category: CategoryArg::Sanity,
                verify: true
            }
        ));
    }

    #[test]
    fn test_exit_byte_saturates() {
        assert_eq!(to_exit_byte(0), 0);
        assert_eq!(to_exit_byte(254), 254);
        assert_eq!(to_exit_byte(FATAL_EXIT_CODE), 255);
        assert_eq!(to_exit_byte(-1), 255);
    }

    #[tokio::test]
    async fn test_check_on_empty_dataset_passes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("chains")).unwrap();
        let root = dir.path().to_str().unwrap();

        let code = run(cli(&["--repo", root, "check", "consistency"]))
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_consistency_fix_verify_converges() {
        let dir = tempfile::tempdir().unwrap();
        let asset = dir.path().join("chains/tron/assets/1002000");
        std::fs::create_dir_all(&asset).unwrap();
        let root = dir.path().to_str().unwrap();

        let code = run(cli(&["--repo", root, "check", "consistency"]))
            .await
            .unwrap();
        assert_eq!(code, 3);

        let code = run(cli(&["--repo", root, "fix", "consistency", "--verify"]))
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert!(dir.path().join("chains/tron/whitelist.json").exists());
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("absent");
        let result = run(cli(&["--repo", root.to_str().unwrap(), "check", "sanity"])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_needs_no_dataset() {
        let code = run(cli(&["--repo", "/nonexistent", "list", "--json"]))
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
