mod chart;
mod config;
mod language;
mod manager;
mod pass;
mod statistics;

use anyhow::Result;
use clap::Parser;
use config::EvaluationContext;
use manager::EvaluationManager;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Aggregates a repository snapshot into summary tables and charts.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file, without the `.toml` extension.
    #[arg(long, default_value = "evaluate/config")]
    config: String,

    /// Snapshot produced by `collect`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Number of languages in the per-language table.
    #[arg(long)]
    top: Option<usize>,

    #[arg(long)]
    no_charts: bool,
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

fn main() -> Result<()> {
    // 初始化日志记录器
    init_logger();
    let args = Args::parse();

    // 加载配置
    let mut ctx = EvaluationContext::load_config(&args.config)?;
    if let Some(input) = args.input {
        ctx.input.records = input;
    }
    if let Some(top) = args.top {
        ctx.report.top_languages = top;
    }
    if args.no_charts {
        ctx.charts.enabled = false;
    }
    ctx.validate()?;

    let mut manager = EvaluationManager::new();
    manager.add_default_passes();

    manager
        .run(&ctx)
        .inspect_err(|e| error!("Evaluation failed: {e:#}"))
}
