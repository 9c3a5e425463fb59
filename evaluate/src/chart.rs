use anyhow::{bail, Context, Result};
use entity::language;
use entity::repository::{Column, Model as RepositoryRow};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ChartConfig;
use crate::language::{language_means, rank_languages};

const SIZE: (u32, u32) = (800, 500);
const WIDE: (u32, u32) = (1000, 600);
const REPOS_AXIS: &str = "Quantidade de repositórios";

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);

struct Histogram {
    column: Column,
    title: &'static str,
    x_desc: &'static str,
    file: &'static str,
    color: RGBColor,
}

const HISTOGRAMS: [Histogram; 5] = [
    Histogram {
        column: Column::AgeMonths,
        title: "RQ01: Idade dos repositórios (meses)",
        x_desc: "Meses",
        file: "rq01_idade_hist.svg",
        color: SKY_BLUE,
    },
    Histogram {
        column: Column::PrsPerMonth,
        title: "RQ02: Pull Requests aceitas por mês",
        x_desc: "PRs/mês",
        file: "rq02_prs_mes_hist.svg",
        color: DARK_GREEN,
    },
    Histogram {
        column: Column::ReleasesPerMonth,
        title: "RQ03: Releases por mês",
        x_desc: "Releases/mês",
        file: "rq03_releases_mes_hist.svg",
        color: ORANGE,
    },
    Histogram {
        column: Column::DaysSinceUpdate,
        title: "RQ04: Dias desde a última atualização",
        x_desc: "Dias",
        file: "rq04_dias_desde_update_hist.svg",
        color: PURPLE,
    },
    Histogram {
        column: Column::PercentClosed,
        title: "RQ06: Percentual de issues fechadas",
        x_desc: "% de issues fechadas",
        file: "rq06_pct_issues_fechadas_hist.svg",
        color: RED,
    },
];

/// One histogram bucket, `[start, end)` except the last which also holds `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Splits `values` into `bins` equal-width buckets spanning min..max.
pub fn bin_values(values: &[f64], bins: usize) -> Vec<Bin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![Bin {
            start: min - 0.5,
            end: max + 0.5,
            count: values.len(),
        }];
    }
    let width = (max - min) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

struct BarSeries<'a> {
    name: &'a str,
    values: Vec<f64>,
    color: RGBColor,
}

pub struct ChartRenderer {
    output_dir: PathBuf,
    bins: usize,
    top_languages: usize,
}

impl ChartRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            bins: config.bins.max(1),
            top_languages: config.top_languages,
        }
    }

    /// Renders every chart that has data and returns the files written.
    /// Charts without data are skipped with a warning.
    pub fn render_all(&self, rows: &[RepositoryRow]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        for hist in &HISTOGRAMS {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.value(hist.column))
                .filter(|v| v.is_finite())
                .collect();
            if values.is_empty() {
                warn!("No data for \"{}\", chart skipped", hist.title);
                continue;
            }
            let path = self.output_dir.join(hist.file);
            self.histogram(&path, hist, &values)?;
            written.push(path);
        }

        let top = rank_languages(rows, self.top_languages);
        if top.is_empty() {
            warn!("No language data, language charts skipped");
        } else {
            written.extend(self.language_charts(rows, &top)?);
        }

        for path in &written {
            info!("Chart saved: {}", path.display());
        }
        Ok(written)
    }

    fn language_charts(
        &self,
        rows: &[RepositoryRow],
        top: &[language::Count],
    ) -> Result<Vec<PathBuf>> {
        let frequency = self.output_dir.join("rq05_top_linguagens.svg");
        let labels: Vec<String> = top.iter().map(|c| c.language.clone()).collect();
        bar_chart(
            &frequency,
            SIZE,
            &format!("RQ05: Top {} linguagens mais usadas", top.len()),
            "Linguagens",
            REPOS_AXIS,
            &labels,
            &[BarSeries {
                name: "Repositórios",
                values: top.iter().map(|c| c.repos as f64).collect(),
                color: BLUE,
            }],
        )?;

        let means = language_means(rows, top);
        let labels: Vec<String> = means.iter().map(|m| m.language.clone()).collect();
        let velocity = self.output_dir.join("rq07_prs_releases.svg");
        bar_chart(
            &velocity,
            WIDE,
            &format!("RQ07: PRs e Releases por linguagem (Top {})", means.len()),
            "Linguagens",
            "Valores médios",
            &labels,
            &[
                BarSeries {
                    name: "PRs/mês",
                    values: means.iter().map(|m| m.prs_per_month).collect(),
                    color: DARK_GREEN,
                },
                BarSeries {
                    name: "Releases/mês",
                    values: means.iter().map(|m| m.releases_per_month).collect(),
                    color: ORANGE,
                },
            ],
        )?;

        let recency = self.output_dir.join("rq07_dias_desde_update.svg");
        bar_chart(
            &recency,
            SIZE,
            "RQ07: Dias desde última atualização (média por linguagem)",
            "Linguagens",
            "Dias (média)",
            &labels,
            &[BarSeries {
                name: "Dias",
                values: means.iter().map(|m| m.days_since_update).collect(),
                color: PURPLE,
            }],
        )?;

        Ok(vec![frequency, velocity, recency])
    }

    fn histogram(&self, path: &Path, hist: &Histogram, values: &[f64]) -> Result<()> {
        let mut svg = String::new();
        self.draw_histogram(&mut svg, hist, values)?;
        save(path, &svg)
    }

    fn draw_histogram(&self, svg: &mut String, hist: &Histogram, values: &[f64]) -> Result<()> {
        let bins = bin_values(values, self.bins);
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            bail!("\"{}\" has no finite values to plot", hist.title);
        };
        let (x_start, x_end) = (first.start, last.end);
        let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64 * 1.1 + 1.0;

        let root = SVGBackend::with_string(svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(hist.title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_start..x_end, 0f64..y_max)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(hist.x_desc)
            .y_desc(REPOS_AXIS)
            .draw()?;

        let color = hist.color;
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], color.filled())
        }))?;
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLACK.stroke_width(1))
        }))?;
        root.present()?;
        Ok(())
    }
}

/// Replaces `path` with a fully rendered document in one step.
fn save(path: &Path, svg: &str) -> Result<()> {
    storage::write_atomically(path, svg.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn bar_chart(
    path: &Path,
    size: (u32, u32),
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    series: &[BarSeries<'_>],
) -> Result<()> {
    let mut svg = String::new();
    draw_bars(&mut svg, size, title, x_desc, y_desc, labels, series)?;
    save(path, &svg)
}

/// Bars grouped per label, one bar per series inside each group.
fn draw_bars(
    svg: &mut String,
    size: (u32, u32),
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    series: &[BarSeries<'_>],
) -> Result<()> {
    let groups = labels.len();
    let y_max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.15 } else { 1.0 };

    let root = SVGBackend::with_string(svg, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(groups as f64 - 0.5), 0f64..y_max)?;

    let label_at = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 {
            labels.get(idx as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups)
        .x_label_formatter(&label_at)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    let group_width = 0.8;
    let bar_width = group_width / series.len().max(1) as f64;
    for (idx, s) in series.iter().enumerate() {
        let color = s.color;
        let offset = -group_width / 2.0 + idx as f64 * bar_width;
        let anno = chart.draw_series(s.values.iter().enumerate().map(move |(i, v)| {
            let x0 = i as f64 + offset;
            Rectangle::new([(x0, 0.0), (x0 + bar_width, *v)], color.filled())
        }))?;
        if series.len() > 1 {
            anno.label(s.name).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
        }
    }
    if series.len() > 1 {
        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .draw()?;
    }
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_values() {
        let bins = bin_values(&[0.0, 1.0, 2.0, 3.0, 4.0, 10.0], 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[4].end, 10.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 2, 1, 0, 1]);
    }

    #[test]
    fn test_bin_values_degenerate() {
        assert!(bin_values(&[], 20).is_empty());
        let single = bin_values(&[3.0, 3.0], 20);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 2);
        assert!(single[0].start < 3.0 && single[0].end > 3.0);
    }

    fn row(lang: &str, prs: Option<f64>) -> RepositoryRow {
        RepositoryRow {
            owner: "o".to_owned(),
            name: "n".to_owned(),
            stars: Some(10.0),
            age_months: Some(24.0),
            prs_per_month: prs,
            releases_per_month: Some(0.5),
            days_since_update: Some(3.0),
            primary_language: lang.to_owned(),
            total_issues: Some(10.0),
            closed_issues: Some(5.0),
            percent_closed: None,
        }
    }

    #[test]
    fn test_render_all_skips_empty_charts() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(&ChartConfig {
            enabled: true,
            output_dir: dir.path().join("charts"),
            top_languages: 5,
            bins: 20,
        });
        let rows = vec![
            row("Rust", Some(2.0)),
            row("Go", Some(1.0)),
            row("Rust", Some(4.0)),
        ];
        let written = renderer.render_all(&rows).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // percent closed has no values anywhere
        assert!(!names.contains(&"rq06_pct_issues_fechadas_hist.svg".to_owned()));
        assert!(names.contains(&"rq01_idade_hist.svg".to_owned()));
        assert!(names.contains(&"rq05_top_linguagens.svg".to_owned()));
        assert!(names.contains(&"rq07_prs_releases.svg".to_owned()));
        assert_eq!(names.len(), 7);
        for path in &written {
            let svg = std::fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"), "{} is not an svg", path.display());
        }
    }

    #[test]
    fn test_render_all_without_languages() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(&ChartConfig {
            enabled: true,
            output_dir: dir.path().to_path_buf(),
            top_languages: 5,
            bins: 10,
        });
        let written = renderer.render_all(&[row("N/A", None)]).unwrap();
        assert!(written
            .iter()
            .all(|p| p.to_string_lossy().ends_with("_hist.svg")));
        assert!(!dir.path().join("rq05_top_linguagens.svg").exists());
    }

    #[test]
    fn test_non_finite_column_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(&ChartConfig {
            enabled: true,
            output_dir: dir.path().to_path_buf(),
            top_languages: 5,
            bins: 10,
        });
        let mut rows = vec![row("Rust", Some(1.0)), row("Go", Some(2.0))];
        for r in &mut rows {
            r.percent_closed = Some(f64::INFINITY);
        }
        let written = renderer.render_all(&rows).unwrap();
        let closed = dir.path().join("rq06_pct_issues_fechadas_hist.svg");
        assert!(!written.contains(&closed));
        assert!(!closed.exists());
        assert!(written.contains(&dir.path().join("rq02_prs_mes_hist.svg")));
    }

    #[test]
    fn test_failed_render_keeps_previous_chart() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(&ChartConfig {
            enabled: true,
            output_dir: dir.path().to_path_buf(),
            top_languages: 5,
            bins: 10,
        });
        let path = dir.path().join("rq01_idade_hist.svg");
        std::fs::write(&path, "previous").unwrap();

        assert!(renderer.histogram(&path, &HISTOGRAMS[0], &[]).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");

        renderer.histogram(&path, &HISTOGRAMS[0], &[1.0, 2.0]).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg") && svg.trim_end().ends_with("</svg>"));
        // only the chart itself, no leftover temporary files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
