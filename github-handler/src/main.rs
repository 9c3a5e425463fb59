use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use entity::repository;
use github_handler::config::CollectContext;
use github_handler::pipeline::{derive_records, log_preview};
use github_handler::{Collector, GithubGraphQlClient};
use std::path::PathBuf;
use storage::RepositoryTable;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Collect the most-starred repositories and persist their derived metrics.
#[derive(Parser, Debug)]
#[command(name = "collect", version)]
struct Args {
    /// Config file, without the `.toml` extension
    #[arg(long, default_value = "github-handler/config")]
    config: String,

    /// Number of repositories to collect
    #[arg(long)]
    target: Option<usize>,

    /// Destination of the repository snapshot
    #[arg(long)]
    output: Option<PathBuf>,
}

fn init_logger() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(false)
                .with_timer(log_timer()),
        )
        .init();
}

fn log_timer() -> ChronoUtc {
    ChronoUtc::rfc_3339()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logger();
    let args = Args::parse();

    // 加载配置
    let mut ctx = CollectContext::load_config(&args.config)?;
    if let Some(target) = args.target {
        ctx.collector.target_count = target;
    }
    if let Some(output) = args.output {
        ctx.output.records = output;
    }
    ctx.validate()?;

    let token = std::env::var(&ctx.github.token_env)
        .with_context(|| format!("environment variable {} is not set", ctx.github.token_env))?;
    let client = GithubGraphQlClient::new(&ctx.github.endpoint, token, ctx.request_timeout())?;
    let collector = Collector::new(
        client,
        ctx.collector.page_size,
        ctx.politeness_delay(),
        ctx.retry.policy(),
    );

    // One reference time for the whole run
    let now = Utc::now();
    info!(
        "Collecting up to {} repositories from {} (page size {})",
        ctx.collector.target_count, ctx.github.endpoint, ctx.collector.page_size
    );
    let raw = collector
        .collect(ctx.collector.target_count)
        .await
        .context("Collection aborted, nothing was written")?;
    info!("Collected {} repositories", raw.len());

    let records = derive_records(&raw, now);
    if let Some(path) = &ctx.output.raw_json {
        storage::write_json(path, &raw)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Raw records written to {}", path.display());
    }

    let rows: Vec<repository::Model> = records.iter().map(repository::Model::from).collect();
    let table = RepositoryTable::new(&ctx.output.records);
    table
        .persist(&rows)
        .with_context(|| format!("Failed to write {}", table.path().display()))?;
    info!("{} repositories written to {}", rows.len(), table.path().display());

    log_preview(&records, ctx.collector.preview_count);
    Ok(())
}
