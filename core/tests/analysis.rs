//! End-to-end analysis over generated tables.

use chrono::NaiveDate;
use funnel_core::{
    analyzer, charts,
    config::{AnalyzerConfig, GeneratorConfig},
    error::FunnelError,
    generator, store,
};
use std::path::Path;

fn analyzer_config(data_dir: &Path, results_dir: &Path) -> AnalyzerConfig {
    AnalyzerConfig {
        data_dir: data_dir.to_path_buf(),
        results_dir: results_dir.to_path_buf(),
        render_charts: false,
        ..AnalyzerConfig::default()
    }
}

fn generated_run(n_users: usize) -> (tempfile::TempDir, analyzer::AnalysisRun) {
    let root = tempfile::tempdir().unwrap();
    let data_dir = root.path().join("data");
    let results_dir = root.path().join("results");

    let data = generator::generate(&GeneratorConfig { n_users, ..GeneratorConfig::default() }).unwrap();
    store::write_dataset(&data_dir, &data).unwrap();

    let run = analyzer::run(&analyzer_config(&data_dir, &results_dir)).expect("analysis run");
    (root, run)
}

#[test]
fn funnel_counts_never_increase() {
    let (_dir, run) = generated_run(20_000);
    let users: Vec<_> = run.report.funnel.stages.iter().map(|s| s.users).collect();
    assert_eq!(users.len(), 4);
    assert_eq!(users[0], 20_000);
    assert!(users.windows(2).all(|w| w[0] >= w[1]), "{users:?}");
}

#[test]
fn cohort_age_zero_is_always_full_retention() {
    let (_dir, run) = generated_run(20_000);
    let table = &run.report.retention;
    assert_eq!(table.ages.first(), Some(&0));
    assert_eq!(table.rows.len(), 12);
    for row in &table.rows {
        assert_eq!(row.retention[0], Some(100.0), "cohort {}", row.cohort);
    }
    // Workouts land 1-7 days after signup, so nothing is older than age 1.
    assert!(table.ages.iter().all(|&a| a <= 1));
}

#[test]
fn aarrr_metrics_are_nested() {
    let (_dir, run) = generated_run(20_000);
    assert_eq!(run.report.aarrr.len(), 12);
    let mut total = 0;
    for row in &run.report.aarrr {
        assert!(row.activation <= row.acquisition, "{}", row.month);
        assert!(row.retention <= row.activation, "{}", row.month);
        assert_eq!(row.referral, row.acquisition / 10);
        assert_eq!(row.revenue % 100, 0);
        assert!(row.activation_rate_pct >= row.retention_rate_pct);
        total += row.acquisition;
    }
    assert_eq!(total, 20_000);
}

#[test]
fn contingency_margins_match_groups() {
    let (_dir, run) = generated_run(20_000);
    let ab = &run.report.ab_test;
    let table = &ab.table;

    assert_eq!(table.row_totals(), [ab.group_a.users as u64, ab.group_b.users as u64]);
    let repeat = run.report.funnel.stages[3].users as u64;
    assert_eq!(table.col_totals(), [20_000 - repeat, repeat]);
    assert_eq!(table.total(), 20_000);

    // Repeat visits are gated on a reward, so the unrewarded group never returns.
    assert_eq!(ab.group_b.repeat_visitors, 0);
    assert!(ab.is_significant());
    assert!(ab.chi_square.p_value < 1e-6);
}

#[test]
fn result_tables_are_written() {
    let (dir, run) = generated_run(2_000);
    let results = dir.path().join("results");
    assert_eq!(
        run.written,
        vec![results.join(store::RETENTION_FILE), results.join(store::AARRR_FILE)]
    );

    let retention = std::fs::read_to_string(results.join(store::RETENTION_FILE)).unwrap();
    let mut lines = retention.lines();
    assert_eq!(lines.next(), Some("cohort_month,0,1"));
    assert!(lines.next().unwrap().starts_with("2024-01,100,"));

    let aarrr = std::fs::read_to_string(results.join(store::AARRR_FILE)).unwrap();
    assert_eq!(
        aarrr.lines().next(),
        Some("Month,Acquisition,Activation,Retention,Revenue,Referral,Activation Rate (%),Retention Rate (%),Avg Revenue Per User")
    );
    assert_eq!(aarrr.lines().count(), 13);
}

#[test]
fn tables_survive_a_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let data = generator::generate(&GeneratorConfig::default_test()).unwrap();
    store::write_dataset(dir.path(), &data).unwrap();
    let loaded = store::read_dataset(dir.path()).unwrap();
    assert_eq!(loaded, data);
}

#[test]
fn missing_input_table_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let data = generator::generate(&GeneratorConfig::default_test()).unwrap();
    store::write_dataset(dir.path(), &data).unwrap();
    std::fs::remove_file(dir.path().join(store::REWARDS_FILE)).unwrap();

    let err = analyzer::run(&analyzer_config(dir.path(), &dir.path().join("out"))).unwrap_err();
    assert!(matches!(err, FunnelError::MissingInput { .. }), "{err}");
}

#[test]
fn malformed_date_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let data = generator::generate(&GeneratorConfig::default_test()).unwrap();
    store::write_dataset(dir.path(), &data).unwrap();
    std::fs::write(
        dir.path().join(store::USERS_FILE),
        "user_id,signup_date,age,gender,region\n1,2024-13-45,30,F,Seoul\n",
    )
    .unwrap();

    let err = store::read_dataset(dir.path()).unwrap_err();
    assert!(matches!(err, FunnelError::Read { .. }), "{err}");
}

#[test]
fn generated_files_use_expected_columns() {
    let dir = tempfile::tempdir().unwrap();
    let data = generator::generate(&GeneratorConfig::default_test()).unwrap();
    store::write_dataset(dir.path(), &data).unwrap();

    let header = |file: &str| {
        std::fs::read_to_string(dir.path().join(file))
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string()
    };
    assert_eq!(header(store::USERS_FILE), "user_id,signup_date,age,gender,region");
    assert_eq!(header(store::EVENTS_FILE), "user_id,event_type,event_date,event_time");
    assert_eq!(header(store::REWARDS_FILE), "user_id,reward_date,reward_amount");

    let events = std::fs::read_to_string(dir.path().join(store::EVENTS_FILE)).unwrap();
    let first = events.lines().nth(1).unwrap();
    let fields: Vec<_> = first.split(',').collect();
    assert_eq!(fields[1], "first_workout");
    assert_eq!(fields[3].len(), "2024-01-01 00:00:00".len());
}

fn charted_run(config: &GeneratorConfig, heatmap_max_age: usize) -> (tempfile::TempDir, analyzer::AnalysisRun) {
    let root = tempfile::tempdir().unwrap();
    let data_dir = root.path().join("data");
    let results_dir = root.path().join("results");

    let data = generator::generate(config).unwrap();
    store::write_dataset(&data_dir, &data).unwrap();

    let run = analyzer::run(&AnalyzerConfig {
        render_charts: true,
        heatmap_max_age,
        ..analyzer_config(&data_dir, &results_dir)
    })
    .expect("analysis run with charts");
    (root, run)
}

fn assert_non_empty_files(run: &analyzer::AnalysisRun) {
    for path in &run.written {
        let len = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        assert!(len > 0, "{} is missing or empty", path.display());
    }
}

#[test]
fn charts_are_rendered_alongside_tables() {
    let (root, run) = charted_run(&GeneratorConfig { n_users: 5_000, ..GeneratorConfig::default() }, 6);
    let results = root.path().join("results");

    assert_eq!(run.written.len(), 6);
    assert_eq!(
        run.written[2..],
        [
            results.join(charts::FUNNEL_CHART),
            results.join(charts::COHORT_HEATMAP),
            results.join(charts::AARRR_CHART),
            results.join(charts::AB_TEST_CHART),
        ]
    );
    assert_non_empty_files(&run);
}

#[test]
fn single_month_range_still_renders_every_chart() {
    let config = GeneratorConfig {
        n_users: 300,
        start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        ..GeneratorConfig::default()
    };
    let (_root, run) = charted_run(&config, 1);

    assert_eq!(run.report.aarrr.len(), 1);
    assert_eq!(run.report.retention.rows.len(), 1);
    assert_eq!(run.written.len(), 6);
    assert_non_empty_files(&run);
}
