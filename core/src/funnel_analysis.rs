//! Funnel drop-off: users present at each stage and conversion between
//! stages.

use crate::{
    journey::UserJourney,
    types::{round_to, EventType},
};
use serde::Serialize;

pub const STAGE_LABELS: [&str; 4] = ["1. Signup", "2. First Workout", "3. First Reward", "4. Repeat Visit"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStageRow {
    pub stage: &'static str,
    pub users: usize,
    /// Percent of stage 1, two decimals.
    pub conversion_rate_pct: f64,
    /// Percent of the previous stage, two decimals; 0 for stage 1.
    pub stage_conversion_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelReport {
    pub stages: Vec<FunnelStageRow>,
}

impl FunnelReport {
    pub fn signups(&self) -> usize {
        self.stages.first().map_or(0, |s| s.users)
    }

    /// Last stage over first stage, in percent.
    pub fn overall_conversion_pct(&self) -> f64 {
        let last = self.stages.last().map_or(0, |s| s.users);
        percent(last, self.signups())
    }
}

pub fn analyze_funnel(journeys: &[UserJourney]) -> FunnelReport {
    let mut counts = vec![journeys.len()];
    counts.extend(
        EventType::ALL
            .iter()
            .map(|&t| journeys.iter().filter(|j| j.has(t)).count()),
    );

    let base = counts[0];
    let stages = counts
        .iter()
        .enumerate()
        .map(|(i, &users)| FunnelStageRow {
            stage: STAGE_LABELS[i],
            users,
            conversion_rate_pct: round_to(percent(users, base), 2),
            stage_conversion_pct: match i {
                0 => 0.0,
                _ => round_to(percent(users, counts[i - 1]), 2),
            },
        })
        .collect();

    FunnelReport { stages }
}

/// `part / whole` in percent, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
