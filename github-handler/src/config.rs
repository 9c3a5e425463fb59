use anyhow::{ensure, Context};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::RetryPolicy;

/// GitHub 接口配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GithubConfig {
    pub endpoint: String,
    /// Name of the environment variable holding the bearer token.
    pub token_env: String,
    pub request_timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.github.com/graphql".to_owned(),
            token_env: "GITHUB_TOKEN".to_owned(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CollectorConfig {
    pub target_count: usize,
    pub page_size: usize,
    pub politeness_delay_ms: u64,
    pub preview_count: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            target_count: 1000,
            page_size: 20,
            politeness_delay_ms: 1000,
            preview_count: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            multiplier: policy.multiplier,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            multiplier: self.multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub records: PathBuf,
    /// Optional dump of the raw API records as JSON.
    pub raw_json: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records: PathBuf::from("repositorios_1000.csv"),
            raw_json: None,
        }
    }
}

/// 采集上下文结构体
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CollectContext {
    pub github: GithubConfig,
    pub collector: CollectorConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
}

impl CollectContext {
    /// Loads `<config_path>.toml` when present, then applies
    /// `REPOMETRICS_COLLECT_<SECTION>__<KEY>` environment overrides.
    pub fn load_config(config_path: &str) -> anyhow::Result<Self> {
        Config::builder()
            .add_source(
                File::with_name(config_path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("REPOMETRICS_COLLECT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| anyhow::anyhow!("Failed to load config"))?
            .try_deserialize()
            .with_context(|| anyhow::anyhow!("Failed to deserialize config"))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.collector.page_size > 0, "collector.page_size must be positive");
        ensure!(
            self.collector.page_size <= 100,
            "collector.page_size must not exceed 100 (GitHub search limit)"
        );
        ensure!(
            self.retry.multiplier.is_finite() && self.retry.multiplier >= 1.0,
            "retry.multiplier must be at least 1.0"
        );
        ensure!(
            self.retry.max_delay_ms >= self.retry.initial_delay_ms,
            "retry.max_delay_ms must not be below retry.initial_delay_ms"
        );
        ensure!(self.retry.max_attempts > 0, "retry.max_attempts must be positive");
        Ok(())
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.collector.politeness_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.github.request_timeout_secs)
    }
}
