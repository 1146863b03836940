//! Analysis pipeline.
//!
//! ORDER (fixed): load → join → funnel → cohort → AARRR → A/B test
//! → result tables → charts. Inputs are never modified.

use crate::{
    aarrr_analysis::{self, AarrrRow},
    ab_test::{self, AbTestResult},
    charts,
    cohort_analysis::{self, RetentionTable},
    config::AnalyzerConfig,
    error::FunnelResult,
    funnel_analysis::{self, FunnelReport},
    generator::Dataset,
    journey,
    store,
};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub funnel: FunnelReport,
    pub retention: RetentionTable,
    pub aarrr: Vec<AarrrRow>,
    pub ab_test: AbTestResult,
}

impl AnalysisReport {
    pub fn key_findings(&self) -> KeyFindings {
        KeyFindings {
            signup_to_workout_pct: self.funnel.stages.get(1).map_or(0.0, |s| s.conversion_rate_pct),
            overall_conversion_pct: self.funnel.overall_conversion_pct(),
            month_one_retention_pct: self.retention.mean_retention_at(1),
            total_acquisition: aarrr_analysis::total_acquisition(&self.aarrr),
            mean_arpu: aarrr_analysis::mean_arpu(&self.aarrr),
            reward_lift_pp: self.ab_test.difference_pp(),
            reward_significant: self.ab_test.is_significant(),
        }
    }
}

/// Headline numbers printed at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFindings {
    pub signup_to_workout_pct: f64,
    pub overall_conversion_pct: f64,
    /// Mean retention at cohort age 1 across cohorts that have one.
    pub month_one_retention_pct: Option<f64>,
    pub total_acquisition: usize,
    pub mean_arpu: f64,
    pub reward_lift_pp: f64,
    pub reward_significant: bool,
}

/// Pure part of the pipeline: every derived table from one dataset.
pub fn analyze(data: &Dataset, config: &AnalyzerConfig) -> AnalysisReport {
    let journeys = journey::build_journeys(data);

    let funnel = funnel_analysis::analyze_funnel(&journeys);
    let retention = cohort_analysis::retention_table(&cohort_analysis::cohort_counts(&journeys));
    let aarrr = aarrr_analysis::analyze_aarrr(&journeys);
    let ab_test = ab_test::reward_ab_test(&journeys, config.significance_level);

    log::info!(
        "analysis complete: {} stages, {} cohorts, {} months",
        funnel.stages.len(),
        retention.rows.len(),
        aarrr.len()
    );
    AnalysisReport { funnel, retention, aarrr, ab_test }
}

#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    /// Every file written, tables first, then charts.
    pub written: Vec<PathBuf>,
}

/// Read inputs from `config.data_dir`, analyze, and write results.
pub fn run(config: &AnalyzerConfig) -> FunnelResult<AnalysisRun> {
    let data = store::read_dataset(&config.data_dir)?;
    let report = analyze(&data, config);

    store::prepare_results_dir(&config.results_dir)?;
    let dir = &config.results_dir;
    let mut written = Vec::new();

    let retention_path = dir.join(store::RETENTION_FILE);
    store::write_retention_table(&retention_path, &report.retention)?;
    written.push(retention_path);

    let aarrr_path = dir.join(store::AARRR_FILE);
    store::write_aarrr_table(&aarrr_path, &report.aarrr)?;
    written.push(aarrr_path);

    if config.render_charts {
        written.extend(render_charts(&report, config)?);
    } else {
        log::info!("chart rendering disabled");
    }

    for path in &written {
        log::info!("saved {}", path.display());
    }
    Ok(AnalysisRun { report, written })
}

fn render_charts(report: &AnalysisReport, config: &AnalyzerConfig) -> FunnelResult<Vec<PathBuf>> {
    let dir = &config.results_dir;
    let mut written = Vec::with_capacity(4);

    let path = dir.join(charts::FUNNEL_CHART);
    charts::render_funnel(&path, &report.funnel)?;
    written.push(path);

    let heatmap = report.retention.truncated(config.heatmap_max_age);
    if heatmap.rows.is_empty() || heatmap.ages.is_empty() {
        log::warn!("no cohort data; skipping {}", charts::COHORT_HEATMAP);
    } else {
        let path = dir.join(charts::COHORT_HEATMAP);
        charts::render_cohort_heatmap(&path, &heatmap)?;
        written.push(path);
    }

    if report.aarrr.is_empty() {
        log::warn!("no signup months; skipping {}", charts::AARRR_CHART);
    } else {
        let path = dir.join(charts::AARRR_CHART);
        charts::render_aarrr(&path, &report.aarrr)?;
        written.push(path);
    }

    let path = dir.join(charts::AB_TEST_CHART);
    charts::render_ab_test(&path, &report.ab_test)?;
    written.push(path);

    Ok(written)
}
