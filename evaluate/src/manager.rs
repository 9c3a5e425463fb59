use crate::chart::ChartRenderer;
use crate::config::EvaluationContext;
use crate::language::{count_languages, rank_languages, summarize_languages};
use crate::pass::activity::{PullRequestVelocity, ReleaseVelocity};
use crate::pass::issues::IssueClosure;
use crate::pass::maintainability::Maintainability;
use crate::pass::maturity::Maturity;
use crate::pass::EvaluationPass;
use crate::statistics::median;
use anyhow::Context;
use entity::repository::Model as RepositoryRow;
use entity::summary;
use std::sync::Arc;
use storage::report_table::{write_language_counts, write_language_table, write_summary};
use storage::RepositoryTable;
use tracing::{info, warn};

pub struct EvaluationManager {
    passes: Vec<Arc<dyn EvaluationPass>>,
}

impl EvaluationManager {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add_default_passes(&mut self) {
        self.add_pass(Arc::new(Maturity));
        self.add_pass(Arc::new(PullRequestVelocity));
        self.add_pass(Arc::new(ReleaseVelocity));
        self.add_pass(Arc::new(Maintainability));
        self.add_pass(Arc::new(IssueClosure));
    }

    pub fn add_pass(&mut self, pass: Arc<dyn EvaluationPass>) {
        self.passes.push(pass);
    }

    /// Median of every pass over all rows, unknown languages included.
    pub fn summarize(&self, rows: &[RepositoryRow]) -> Vec<summary::Model> {
        self.passes
            .iter()
            .map(|pass| {
                let value = median(rows.iter().map(|row| pass.apply(row)));
                if value.is_none() {
                    warn!("No valid values for {}, median reported as N/A", pass.name());
                }
                summary::Model {
                    label: pass.name().to_owned(),
                    median: value,
                }
            })
            .collect()
    }

    /// Loads the snapshot and writes every report. Nothing is written when
    /// the snapshot cannot be read.
    pub fn run(&self, ctx: &EvaluationContext) -> anyhow::Result<()> {
        let table = RepositoryTable::new(&ctx.input.records);
        let rows = table
            .load()
            .with_context(|| format!("Failed to load {}", table.path().display()))?;
        info!("Loaded {} repositories from {}", rows.len(), table.path().display());

        let summary = self.summarize(&rows);
        for stat in &summary {
            match stat.median {
                Some(value) => info!("{}: {:.2}", stat.label, value),
                None => info!("{}: N/A", stat.label),
            }
        }
        write_summary(&ctx.output.summary, &summary)?;
        info!("Summary saved: {}", ctx.output.summary.display());

        let ranked = rank_languages(&rows, ctx.report.top_languages);
        if ranked.is_empty() {
            warn!("No repository has a known primary language");
        }
        let languages = summarize_languages(&rows, &ranked);
        write_language_table(&ctx.output.languages, &languages)?;
        info!(
            "Top {} languages saved: {}",
            languages.len(),
            ctx.output.languages.display()
        );

        if let Some(path) = &ctx.output.language_counts {
            write_language_counts(path, &count_languages(&rows))?;
            info!("Language counts saved: {}", path.display());
        }

        if ctx.charts.enabled {
            let written = ChartRenderer::new(&ctx.charts).render_all(&rows)?;
            info!(
                "{} charts saved to {}",
                written.len(),
                ctx.charts.output_dir.display()
            );
        }
        Ok(())
    }
}
