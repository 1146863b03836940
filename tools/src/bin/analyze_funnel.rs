//! analyze-funnel: funnel, cohort, AARRR and reward A/B analysis over the
//! generated tables.
//!
//! Usage:
//!   analyze-funnel
//!   analyze-funnel --data-dir ./data --results-dir ./results --no-charts

use anyhow::{Context, Result};
use funnel_core::{
    aarrr_analysis::AarrrRow,
    ab_test::{AbTestResult, GROUP_A_LABEL, GROUP_B_LABEL},
    analyzer::{self, AnalysisReport},
    cohort_analysis::RetentionTable,
    config::AnalyzerConfig,
    funnel_analysis::FunnelReport,
};
use funnel_tools::{arg_value, has_flag, parse_arg};
use std::{env, path::PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let defaults = AnalyzerConfig::default();
    let config = AnalyzerConfig {
        data_dir: arg_value(&args, "--data-dir").map_or(defaults.data_dir, PathBuf::from),
        results_dir: arg_value(&args, "--results-dir").map_or(defaults.results_dir, PathBuf::from),
        significance_level: parse_arg(&args, "--alpha", defaults.significance_level),
        heatmap_max_age: parse_arg(&args, "--heatmap-ages", defaults.heatmap_max_age),
        render_charts: !has_flag(&args, "--no-charts"),
    };

    let run = analyzer::run(&config)
        .with_context(|| format!("analysis of {} failed", config.data_dir.display()))?;
    let report = &run.report;

    print_funnel(&report.funnel);
    print_retention(&report.retention);
    print_aarrr(&report.aarrr);
    print_ab_test(&report.ab_test);

    section("Generated files");
    for path in &run.written {
        println!("  {}", path.display());
    }

    print_findings(report);
    Ok(())
}

fn section(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

fn print_funnel(funnel: &FunnelReport) {
    section("FUNNEL ANALYSIS");
    println!("  {:<18} {:>8} {:>12} {:>12}", "Stage", "Users", "Conv (%)", "Step (%)");
    for s in &funnel.stages {
        println!(
            "  {:<18} {:>8} {:>12.2} {:>12.2}",
            s.stage, s.users, s.conversion_rate_pct, s.stage_conversion_pct
        );
    }
    println!("  overall: {:.1}%", funnel.overall_conversion_pct());
}

fn print_retention(table: &RetentionTable) {
    section("COHORT RETENTION (%)");
    print!("  {:<8}", "cohort");
    for age in &table.ages {
        print!(" {age:>7}");
    }
    println!();
    for row in &table.rows {
        print!("  {:<8}", row.cohort.to_string());
        for cell in &row.retention {
            match cell {
                Some(v) => print!(" {v:>7.1}"),
                None => print!(" {:>7}", "-"),
            }
        }
        println!();
    }
}

fn print_aarrr(rows: &[AarrrRow]) {
    section("AARRR ANALYSIS (monthly)");
    println!(
        "  {:<8} {:>11} {:>10} {:>9} {:>12} {:>8}",
        "Month", "Acquisition", "Activation", "Retention", "Revenue", "Referral"
    );
    for r in rows {
        println!(
            "  {:<8} {:>11} {:>10} {:>9} {:>12} {:>8}",
            r.month, r.acquisition, r.activation, r.retention, r.revenue, r.referral
        );
    }
}

fn print_ab_test(ab: &AbTestResult) {
    section("A/B TEST: REWARD EFFECT");
    println!(
        "  {GROUP_A_LABEL}: {} users, repeat rate {:.2}%",
        ab.group_a.users, ab.group_a.repeat_rate_pct
    );
    println!(
        "  {GROUP_B_LABEL}: {} users, repeat rate {:.2}%",
        ab.group_b.users, ab.group_b.repeat_rate_pct
    );
    println!("  difference: {:.2}pp", ab.difference_pp());
    println!(
        "  chi2={:.3} dof={} p-value={:.6}",
        ab.chi_square.statistic, ab.chi_square.dof, ab.chi_square.p_value
    );
    if ab.is_significant() {
        println!("  significant (p < {})", ab.significance_level);
    } else {
        println!("  not significant (p >= {})", ab.significance_level);
    }
}

fn print_findings(report: &AnalysisReport) {
    let k = report.key_findings();
    section("KEY FINDINGS");
    println!("  1. Funnel: signup -> first workout {:.1}%", k.signup_to_workout_pct);
    println!("     overall conversion {:.1}%", k.overall_conversion_pct);
    match k.month_one_retention_pct {
        Some(v) => println!("  2. Cohort: avg month-1 retention {v:.1}%"),
        None => println!("  2. Cohort: no month-1 retention data"),
    }
    println!("  3. AARRR: total acquisition {} users", k.total_acquisition);
    println!("     avg revenue per user {:.0} KRW", k.mean_arpu);
    if k.reward_significant {
        println!("  4. Reward lifts repeat visits by {:.2}pp (significant)", k.reward_lift_pp);
    } else {
        println!("  4. No significant reward effect on repeat visits");
    }
}
