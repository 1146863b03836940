//! Reward effect on repeat visits: rewarded (A) vs not rewarded (B).

use crate::{
    funnel_analysis::percent,
    journey::UserJourney,
    stats::{chi_square_independence, ChiSquareResult, ContingencyTable},
    types::EventType,
};
use serde::Serialize;

pub const GROUP_A_LABEL: &str = "With Reward (Group A)";
pub const GROUP_B_LABEL: &str = "Without Reward (Group B)";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    pub users: usize,
    pub repeat_visitors: usize,
    pub repeat_rate_pct: f64,
}

impl GroupStats {
    fn of<'a>(members: impl Iterator<Item = &'a UserJourney>) -> Self {
        let (users, repeat_visitors) = members.fold((0, 0), |(n, r), j| {
            (n + 1, r + j.has(EventType::RepeatVisit) as usize)
        });
        Self {
            users,
            repeat_visitors,
            repeat_rate_pct: percent(repeat_visitors, users),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbTestResult {
    pub group_a: GroupStats,
    pub group_b: GroupStats,
    /// Rows: A, B. Columns: no repeat visit, repeat visit.
    pub table: ContingencyTable,
    pub chi_square: ChiSquareResult,
    pub significance_level: f64,
}

impl AbTestResult {
    /// Rate A minus rate B, in percentage points.
    pub fn difference_pp(&self) -> f64 {
        self.group_a.repeat_rate_pct - self.group_b.repeat_rate_pct
    }

    pub fn is_significant(&self) -> bool {
        self.chi_square.p_value < self.significance_level
    }
}

pub fn reward_ab_test(journeys: &[UserJourney], significance_level: f64) -> AbTestResult {
    let group_a = GroupStats::of(journeys.iter().filter(|j| j.is_rewarded()));
    let group_b = GroupStats::of(journeys.iter().filter(|j| !j.is_rewarded()));

    let row = |g: &GroupStats| {
        [(g.users - g.repeat_visitors) as u64, g.repeat_visitors as u64]
    };
    let table = ContingencyTable { cells: [row(&group_a), row(&group_b)] };
    let chi_square = chi_square_independence(&table);

    log::info!(
        "A/B: A={} users ({:.2}%), B={} users ({:.2}%), chi2={:.3}, p={:.6}",
        group_a.users,
        group_a.repeat_rate_pct,
        group_b.users,
        group_b.repeat_rate_pct,
        chi_square.statistic,
        chi_square.p_value
    );

    AbTestResult { group_a, group_b, table, chi_square, significance_level }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn journey(rewarded: bool, repeat: bool) -> UserJourney {
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let t = Some(d.and_time(NaiveTime::MIN));
        UserJourney {
            user_id: 0,
            signup_date: d,
            first_seen: [t, rewarded.then_some(d.and_time(NaiveTime::MIN)), if repeat { t } else { None }],
            reward_date: rewarded.then_some(d),
            reward_amount: rewarded.then_some(1_000),
        }
    }

    #[test]
    fn table_margins_match_group_sizes() {
        let mut journeys = Vec::new();
        journeys.extend((0..40).map(|i| journey(true, i < 24)));
        journeys.extend((0..60).map(|i| journey(false, i < 3)));
        let result = reward_ab_test(&journeys, 0.05);

        assert_eq!(result.table.row_totals(), [40, 60]);
        assert_eq!(result.table.col_totals(), [73, 27]);
        assert_eq!(result.table.total(), 100);
        assert_eq!(result.group_a.repeat_rate_pct, 60.0);
        assert_eq!(result.group_b.repeat_rate_pct, 5.0);
        assert_eq!(result.difference_pp(), 55.0);
        assert!(result.is_significant());
    }

    #[test]
    fn no_rewarded_users_is_not_significant() {
        let journeys: Vec<_> = (0..10).map(|i| journey(false, i % 2 == 0)).collect();
        let result = reward_ab_test(&journeys, 0.05);
        assert_eq!(result.group_a.users, 0);
        assert_eq!(result.group_a.repeat_rate_pct, 0.0);
        assert_eq!(result.chi_square.p_value, 1.0);
        assert!(!result.is_significant());
    }
}
