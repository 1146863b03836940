//! Monthly cohort retention.
//!
//! Cohort = signup month. Cohort age = whole months from the signup month
//! to the month of the user's first workout. Users who never worked out
//! have no age and are left out of the table.

use crate::{
    journey::UserJourney,
    types::{EventType, YearMonth},
};
use std::collections::{BTreeMap, BTreeSet};

/// User counts keyed by cohort month, then cohort age.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortCounts {
    pub cells: BTreeMap<YearMonth, BTreeMap<i64, usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetentionRow {
    pub cohort: YearMonth,
    /// One cell per entry of `RetentionTable::ages`; `None` where the
    /// cohort had no users at that age or no age-0 base.
    pub retention: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetentionTable {
    /// Union of observed ages, ascending.
    pub ages: Vec<i64>,
    pub rows: Vec<RetentionRow>,
}

impl RetentionTable {
    pub fn cell(&self, cohort: YearMonth, age: i64) -> Option<f64> {
        let col = self.ages.iter().position(|&a| a == age)?;
        let row = self.rows.iter().find(|r| r.cohort == cohort)?;
        row.retention[col]
    }

    /// Mean over cohorts that have a value at `age`.
    pub fn mean_retention_at(&self, age: i64) -> Option<f64> {
        let col = self.ages.iter().position(|&a| a == age)?;
        let values: Vec<f64> = self.rows.iter().filter_map(|r| r.retention[col]).collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Copy restricted to ages in `[0, max_age)`, for the heatmap.
    pub fn truncated(&self, max_age: usize) -> RetentionTable {
        let keep: Vec<usize> = self
            .ages
            .iter()
            .enumerate()
            .filter(|(_, age)| (0..max_age as i64).contains(*age))
            .map(|(i, _)| i)
            .collect();
        RetentionTable {
            ages: keep.iter().map(|&i| self.ages[i]).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| RetentionRow {
                    cohort: r.cohort,
                    retention: keep.iter().map(|&i| r.retention[i]).collect(),
                })
                .collect(),
        }
    }
}

pub fn cohort_counts(journeys: &[UserJourney]) -> CohortCounts {
    let mut counts = CohortCounts::default();
    for journey in journeys {
        let Some(workout) = journey.reached(EventType::FirstWorkout) else {
            continue;
        };
        let cohort = journey.signup_month();
        let age = cohort.months_until(YearMonth::of(workout.date()));
        *counts
            .cells
            .entry(cohort)
            .or_default()
            .entry(age)
            .or_default() += 1;
    }
    counts
}

/// Divide each cohort row by its own age-0 count, in percent.
pub fn retention_table(counts: &CohortCounts) -> RetentionTable {
    let ages: Vec<i64> = counts
        .cells
        .values()
        .flat_map(|row| row.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = counts
        .cells
        .iter()
        .map(|(&cohort, row)| {
            let base = row.get(&0).copied().filter(|&n| n > 0);
            if base.is_none() {
                log::warn!("cohort {cohort} has no age-0 users; retention left empty");
            }
            RetentionRow {
                cohort,
                retention: ages
                    .iter()
                    .map(|age| {
                        let n = row.get(age)?;
                        base.map(|b| *n as f64 / b as f64 * 100.0)
                    })
                    .collect(),
            }
        })
        .collect();

    RetentionTable { ages, rows }
}
