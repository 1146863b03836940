//! PNG charts for the analysis report, drawn with plotters.
//!
//! Categorical axes use segmented integer coordinates: category `i` spans
//! `Exact(i)..Exact(i + 1)`, and the last category ends at `Last`.

use crate::{
    aarrr_analysis::AarrrRow,
    ab_test::{AbTestResult, GROUP_A_LABEL, GROUP_B_LABEL},
    cohort_analysis::RetentionTable,
    error::{FunnelError, FunnelResult},
    funnel_analysis::FunnelReport,
};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

pub const FUNNEL_CHART: &str = "funnel_chart.png";
pub const COHORT_HEATMAP: &str = "cohort_heatmap.png";
pub const AARRR_CHART: &str = "aarrr_chart.png";
pub const AB_TEST_CHART: &str = "ab_test_chart.png";

const FUNNEL_COLORS: [RGBColor; 4] = [
    RGBColor(0xFF, 0x6B, 0x6B),
    RGBColor(0xFF, 0xA5, 0x00),
    RGBColor(0x4E, 0xCD, 0xC4),
    RGBColor(0x45, 0xB7, 0xD1),
];
const TEAL: RGBColor = RGBColor(0x4E, 0xCD, 0xC4);
const CORAL: RGBColor = RGBColor(0xFF, 0x6B, 0x6B);
const LINE_COLORS: [RGBColor; 3] = [
    RGBColor(0x1F, 0x77, 0xB4),
    RGBColor(0xFF, 0x7F, 0x0E),
    RGBColor(0x2C, 0xA0, 0x2C),
];
const MISSING_CELL: RGBColor = RGBColor(0xEE, 0xEE, 0xEE);

type ChartResult = anyhow::Result<()>;

fn chart_error(name: &'static str) -> impl FnOnce(anyhow::Error) -> FunnelError {
    move |e| FunnelError::Chart { name, message: format!("{e:#}") }
}

/// Last index of a categorical axis holding `n` categories. A one-value
/// integer range collapses to a point, so the axis always spans two slots.
fn axis_last(n: usize) -> u32 {
    (n as u32).saturating_sub(1).max(1)
}

/// Upper bound of category `i` on a segmented axis built over `0..=last`.
fn segment_end(i: u32, last: u32) -> SegmentValue<u32> {
    if i >= last {
        SegmentValue::Last
    } else {
        SegmentValue::Exact(i + 1)
    }
}

fn category_label(labels: &[String], value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn anchored(size: u32, h: HPos, v: VPos) -> TextStyle<'static> {
    TextStyle::from(("sans-serif", size).into_font()).pos(Pos::new(h, v))
}

// ── Funnel ─────────────────────────────────────────────────────

/// Horizontal bars, stage 1 on top, labelled `count (pct%)`.
pub fn render_funnel(path: &Path, funnel: &FunnelReport) -> FunnelResult<()> {
    draw_funnel(path, funnel).map_err(chart_error(FUNNEL_CHART))
}

fn draw_funnel(path: &Path, funnel: &FunnelReport) -> ChartResult {
    let n = funnel.stages.len() as u32;
    anyhow::ensure!(n > 0, "funnel has no stages");
    let last = axis_last(funnel.stages.len());
    let x_max = funnel.signups().max(1) as f64 * 1.3;

    // Segment 0 is the bottom row, so stage i sits in segment last - i.
    let labels: Vec<String> = funnel.stages.iter().rev().map(|s| s.stage.to_string()).collect();

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Funnel Analysis: User Journey", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(170)
        .build_cartesian_2d(0f64..x_max, (0u32..last).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n as usize)
        .y_label_formatter(&|v| category_label(&labels, v))
        .x_desc("Number of Users")
        .draw()?;

    chart.draw_series(funnel.stages.iter().enumerate().map(|(i, stage)| {
        let seg = last - i as u32;
        let color = FUNNEL_COLORS[i % FUNNEL_COLORS.len()];
        let mut bar = Rectangle::new(
            [(0.0, SegmentValue::Exact(seg)), (stage.users as f64, segment_end(seg, last))],
            color.filled(),
        );
        bar.set_margin(8, 8, 0, 0);
        bar
    }))?;

    chart.draw_series(funnel.stages.iter().enumerate().map(|(i, stage)| {
        Text::new(
            format!(" {} ({:.1}%)", stage.users, stage.conversion_rate_pct),
            (stage.users as f64, SegmentValue::CenterOf(last - i as u32)),
            anchored(18, HPos::Left, VPos::Center),
        )
    }))?;

    root.present()?;
    Ok(())
}

// ── Cohort heatmap ─────────────────────────────────────────────

/// Retention grid, first cohort on top, annotated with whole percents.
pub fn render_cohort_heatmap(path: &Path, table: &RetentionTable) -> FunnelResult<()> {
    draw_cohort_heatmap(path, table).map_err(chart_error(COHORT_HEATMAP))
}

fn draw_cohort_heatmap(path: &Path, table: &RetentionTable) -> ChartResult {
    anyhow::ensure!(
        !table.rows.is_empty() && !table.ages.is_empty(),
        "retention table is empty"
    );
    let last_age = axis_last(table.ages.len());
    let last_row = axis_last(table.rows.len());
    let age_labels: Vec<String> = table.ages.iter().map(|a| a.to_string()).collect();
    // Segment 0 is the bottom row; a lone cohort sits in the top slot.
    let cohort_labels: Vec<String> = (0..=last_row)
        .map(|seg| {
            table
                .rows
                .get((last_row - seg) as usize)
                .map(|r| r.cohort.to_string())
                .unwrap_or_default()
        })
        .collect();

    let root = BitMapBackend::new(path, (1400, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Cohort Analysis: Monthly User Retention (%)", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(
            (0u32..last_age).into_segmented(),
            (0u32..last_row).into_segmented(),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(age_labels.len())
        .y_labels(cohort_labels.len())
        .x_label_formatter(&|v| category_label(&age_labels, v))
        .y_label_formatter(&|v| category_label(&cohort_labels, v))
        .x_desc("Cohort Age (Months)")
        .y_desc("Cohort Month")
        .draw()?;

    let cells: Vec<(u32, u32, Option<f64>)> = table
        .rows
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            let y = last_row - r as u32;
            row.retention
                .iter()
                .enumerate()
                .map(move |(c, v)| (c as u32, y, *v))
        })
        .collect();

    chart.draw_series(cells.iter().map(|&(x, y, v)| {
        let fill = v.map_or(MISSING_CELL, retention_color);
        let mut cell = Rectangle::new(
            [
                (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                (segment_end(x, last_age), segment_end(y, last_row)),
            ],
            fill.filled(),
        );
        cell.set_margin(1, 1, 1, 1);
        cell
    }))?;

    chart.draw_series(cells.iter().filter_map(|&(x, y, v)| {
        v.map(|v| {
            Text::new(
                format!("{v:.0}"),
                (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                anchored(16, HPos::Center, VPos::Center),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

/// Red → yellow → green over 0..=100 percent.
pub fn retention_color(pct: f64) -> RGBColor {
    const RED: (f64, f64, f64) = (215.0, 48.0, 39.0);
    const YELLOW: (f64, f64, f64) = (255.0, 255.0, 191.0);
    const GREEN: (f64, f64, f64) = (26.0, 152.0, 80.0);

    let t = (pct / 100.0).clamp(0.0, 1.0);
    let (from, to, u) = if t < 0.5 { (RED, YELLOW, t * 2.0) } else { (YELLOW, GREEN, (t - 0.5) * 2.0) };
    let lerp = |a: f64, b: f64| (a + (b - a) * u).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

// ── AARRR ──────────────────────────────────────────────────────

/// Left: user metrics by month. Right: revenue by month.
pub fn render_aarrr(path: &Path, rows: &[AarrrRow]) -> FunnelResult<()> {
    draw_aarrr(path, rows).map_err(chart_error(AARRR_CHART))
}

fn draw_aarrr(path: &Path, rows: &[AarrrRow]) -> ChartResult {
    anyhow::ensure!(!rows.is_empty(), "no AARRR months");
    let last = axis_last(rows.len());
    let months: Vec<String> = rows.iter().map(|r| r.month.clone()).collect();

    let root = BitMapBackend::new(path, (1400, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let user_max = rows.iter().map(|r| r.acquisition).max().unwrap_or(0).max(1) as f64 * 1.1;
    let mut users = ChartBuilder::on(&panels[0])
        .caption("AARRR: Monthly User Metrics", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..last).into_segmented(), 0f64..user_max)?;
    users
        .configure_mesh()
        .x_labels(months.len())
        .x_label_formatter(&|v| category_label(&months, v))
        .x_label_style(("sans-serif", 11))
        .x_desc("Month")
        .y_desc("Number of Users")
        .draw()?;

    let series: [(&str, fn(&AarrrRow) -> usize); 3] = [
        ("Acquisition", |r| r.acquisition),
        ("Activation", |r| r.activation),
        ("Retention", |r| r.retention),
    ];
    for ((label, metric), color) in series.into_iter().zip(LINE_COLORS) {
        let points: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (SegmentValue::CenterOf(i as u32), metric(r) as f64))
            .collect();
        users
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        users.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;
    }
    users
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    let revenue_max = rows.iter().map(|r| r.revenue).max().unwrap_or(0).max(1) as f64 * 1.1;
    let mut revenue = ChartBuilder::on(&panels[1])
        .caption("AARRR: Monthly Revenue", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(90)
        .build_cartesian_2d((0u32..last).into_segmented(), 0f64..revenue_max)?;
    revenue
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(months.len())
        .x_label_formatter(&|v| category_label(&months, v))
        .x_label_style(("sans-serif", 11))
        .x_desc("Month")
        .y_desc("Revenue (KRW)")
        .draw()?;
    revenue.draw_series(rows.iter().enumerate().map(|(i, r)| {
        let i = i as u32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (segment_end(i, last), r.revenue as f64)],
            TEAL.filled(),
        );
        bar.set_margin(0, 0, 4, 4);
        bar
    }))?;

    root.present()?;
    Ok(())
}

// ── A/B test ───────────────────────────────────────────────────

/// Repeat-visit rate per group; p-value in the title.
pub fn render_ab_test(path: &Path, ab: &AbTestResult) -> FunnelResult<()> {
    draw_ab_test(path, ab).map_err(chart_error(AB_TEST_CHART))
}

fn draw_ab_test(path: &Path, ab: &AbTestResult) -> ChartResult {
    let groups = [
        (GROUP_A_LABEL, ab.group_a.repeat_rate_pct, TEAL),
        (GROUP_B_LABEL, ab.group_b.repeat_rate_pct, CORAL),
    ];
    let labels: Vec<String> = groups.iter().map(|g| g.0.to_string()).collect();
    let y_max = groups.iter().map(|g| g.1).fold(0.0, f64::max).max(1.0) * 1.2;
    let title = format!(
        "A/B Test: Reward Effect Analysis (p-value: {:.6})",
        ab.chi_square.p_value
    );

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..1u32).into_segmented(), 0f64..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2)
        .x_label_formatter(&|v| category_label(&labels, v))
        .y_desc("Repeat Visit Rate (%)")
        .draw()?;

    chart.draw_series(groups.iter().enumerate().map(|(i, &(_, rate, color))| {
        let i = i as u32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (segment_end(i, 1), rate)],
            color.mix(0.8).filled(),
        );
        bar.set_margin(0, 0, 40, 40);
        bar
    }))?;
    chart.draw_series(groups.iter().enumerate().map(|(i, &(_, rate, _))| {
        Text::new(
            format!("{rate:.2}%"),
            (SegmentValue::CenterOf(i as u32), rate),
            anchored(18, HPos::Center, VPos::Bottom),
        )
    }))?;

    root.present()?;
    Ok(())
}
