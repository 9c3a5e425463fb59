use anyhow::{ensure, Context};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub records: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            records: PathBuf::from("repositorios_1000.csv"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub summary: PathBuf,
    pub languages: PathBuf,
    /// Frequency table of every known language, skipped when unset.
    pub language_counts: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary: PathBuf::from("sumario_metricas.csv"),
            languages: PathBuf::from("rq07_por_linguagem.csv"),
            language_counts: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    pub top_languages: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_languages: 10 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
    pub top_languages: usize,
    pub bins: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("."),
            top_languages: 5,
            bins: 20,
        }
    }
}

/// 评价上下文结构体
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EvaluationContext {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub report: ReportConfig,
    pub charts: ChartConfig,
}

impl EvaluationContext {
    /// Loads `<config_path>.toml` when present, then applies
    /// `REPOMETRICS_EVALUATE_<SECTION>__<KEY>` environment overrides.
    pub fn load_config(config_path: &str) -> anyhow::Result<Self> {
        Config::builder()
            .add_source(
                File::with_name(config_path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("REPOMETRICS_EVALUATE")
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
        ensure!(self.charts.bins > 0, "charts.bins must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let ctx = EvaluationContext::load_config(missing.to_str().unwrap()).unwrap();
        assert_eq!(ctx.input.records, PathBuf::from("repositorios_1000.csv"));
        assert_eq!(ctx.output.summary, PathBuf::from("sumario_metricas.csv"));
        assert_eq!(ctx.report.top_languages, 10);
        assert_eq!(ctx.charts.top_languages, 5);
        assert_eq!(ctx.charts.bins, 20);
        assert!(ctx.charts.enabled);
        assert!(ctx.output.language_counts.is_none());
        ctx.validate().unwrap();
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("config");
        std::fs::write(
            dir.path().join("config.toml"),
            "[report]\ntop_languages = 3\n\n[charts]\nenabled = false\n\n\
             [output]\nlanguage_counts = \"rq05_linguagens.csv\"\n",
        )
        .unwrap();

        let ctx = EvaluationContext::load_config(base.to_str().unwrap()).unwrap();
        assert_eq!(ctx.report.top_languages, 3);
        assert!(!ctx.charts.enabled);
        assert_eq!(ctx.charts.bins, 20);
        assert_eq!(
            ctx.output.language_counts,
            Some(PathBuf::from("rq05_linguagens.csv"))
        );
    }

    #[test]
    fn test_zero_bins_rejected() {
        let mut ctx = EvaluationContext::default();
        ctx.charts.bins = 0;
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("REPOMETRICS_EVALUATE_CHARTS__OUTPUT_DIR", "graficos");
        let dir = tempfile::tempdir().unwrap();
        let ctx = EvaluationContext::load_config(dir.path().join("absent").to_str().unwrap());
        std::env::remove_var("REPOMETRICS_EVALUATE_CHARTS__OUTPUT_DIR");

        assert_eq!(ctx.unwrap().charts.output_dir, PathBuf::from("graficos"));
    }
}
