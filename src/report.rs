//! Credit score distribution report.
//!
//! Scores are counted into fixed-width, left-inclusive buckets built from
//! the edges `0, w, 2w, ..., upper_edge`. Scores at or above the last edge
//! (a perfect 1000 with the defaults) are clamped into the last bucket so
//! every scored wallet is counted exactly once.

use crate::config::ReportConfig;
use crate::error::{Result, ScoringError};
use crate::types::score::ScoreTable;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

/// Family name every chart text style refers to
const CHART_FONT: &str = "sans-serif";
static CHART_FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Register the bundled font with plotters once per process.
///
/// Text is laid out from this font for both backends; no system fonts are
/// consulted.
fn ensure_chart_font() -> std::result::Result<(), String> {
    static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(CHART_FONT, FontStyle::Normal, CHART_FONT_DATA)
                .map_err(|_| "bundled chart font could not be parsed".to_string())
        })
        .clone()
}

/// Wallet count for one `[lower, upper)` score range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBucket {
    pub lower: u32,
    pub upper: u32,
    pub count: u64,
}

impl ScoreBucket {
    /// Inclusive label such as `"300-399"`
    pub fn label(&self) -> String {
        format!("{}-{}", self.lower, self.upper - 1)
    }
}

/// Bucketed score counts, ordered by ascending lower bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreDistribution {
    buckets: Vec<ScoreBucket>,
}

impl ScoreDistribution {
    /// Bucket edges from 0 to `upper_edge` in steps of `bucket_width`.
    ///
    /// `upper_edge` is always the final edge even when it is not a multiple
    /// of the width.
    pub fn edges(bucket_width: u32, upper_edge: u32) -> Vec<u32> {
        let step = bucket_width.max(1) as usize;
        let mut edges: Vec<u32> = (0..=upper_edge).step_by(step).collect();
        if edges.last() != Some(&upper_edge) {
            edges.push(upper_edge);
        }
        edges
    }

    pub fn from_scores<I>(scores: I, bucket_width: u32, upper_edge: u32) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let edges = Self::edges(bucket_width, upper_edge.max(1));
        let mut buckets: Vec<ScoreBucket> = edges
            .windows(2)
            .map(|w| ScoreBucket {
                lower: w[0],
                upper: w[1],
                count: 0,
            })
            .collect();

        let last = buckets.len() - 1;
        for score in scores {
            let index = buckets
                .iter()
                .position(|b| score < b.upper)
                .unwrap_or(last);
            buckets[index].count += 1;
        }

        Self { buckets }
    }

    /// Ten buckets of width 100 covering 0 to 1000
    pub fn standard<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self::from_scores(scores, 100, 1000)
    }

    pub fn buckets(&self) -> &[ScoreBucket] {
        &self.buckets
    }

    pub fn labels(&self) -> Vec<String> {
        self.buckets.iter().map(ScoreBucket::label).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.buckets.iter().map(|b| b.count).collect()
    }

    /// Total wallets counted; equals the number of scores bucketed
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Count for the bucket with the given label
    pub fn count_for(&self, label: &str) -> Option<u64> {
        self.buckets
            .iter()
            .find(|b| b.label() == label)
            .map(|b| b.count)
    }

    /// Log a text rendering of the distribution with proportional bars
    pub fn log_summary(&self) {
        let total = self.total();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              CREDIT SCORE DISTRIBUTION SUMMARY               ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Wallets Scored: {:>8}                                     ║", total);
        info!("╠══════════════════════════════════════════════════════════════╣");
        for bucket in &self.buckets {
            let pct = if total > 0 {
                (bucket.count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:>9}: {:>6} ({:>5.1}%) {}",
                bucket.label(),
                bucket.count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

/// Builds the distribution for a score table and renders its chart
pub struct DistributionReporter {
    config: ReportConfig,
}

impl DistributionReporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Bucket the scores, log the summary and, when enabled, write the chart
    pub fn report(&self, table: &ScoreTable) -> Result<ScoreDistribution> {
        let distribution = ScoreDistribution::from_scores(
            table.credit_scores(),
            self.config.bucket_width,
            self.config.upper_edge,
        );
        distribution.log_summary();

        if self.config.enabled {
            render_chart(
                &distribution,
                &self.config.chart_path,
                (self.config.width, self.config.height),
            )?;
        }

        Ok(distribution)
    }
}

/// Render the distribution as a bar chart.
///
/// A path ending in `.svg` produces an SVG document, anything else a PNG.
pub fn render_chart(distribution: &ScoreDistribution, path: &Path, size: (u32, u32)) -> Result<()> {
    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    let drawn = ensure_chart_font().and_then(|()| {
        if is_svg {
            draw_bars(SVGBackend::new(path, size).into_drawing_area(), distribution)
        } else {
            draw_bars(BitMapBackend::new(path, size).into_drawing_area(), distribution)
        }
    });

    drawn.map_err(|reason| ScoringError::Chart {
        path: path.to_path_buf(),
        reason,
    })?;

    info!(path = %path.display(), "Saved score distribution chart");
    Ok(())
}

fn draw_bars<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    distribution: &ScoreDistribution,
) -> std::result::Result<(), String> {
    let labels = distribution.labels();
    let y_max = distribution.max_count() + distribution.max_count() / 10 + 1;

    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Credit Score Distribution", (CHART_FONT, 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0..labels.len()).into_segmented(), 0u64..y_max)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .label_style((CHART_FONT, 14))
        .x_desc("Credit Score Range")
        .y_desc("Number of Wallets")
        .x_labels(labels.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(SKY_BLUE.filled())
                .margin(10)
                .data(distribution.counts().into_iter().enumerate()),
        )
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())?;
    Ok(())
}
