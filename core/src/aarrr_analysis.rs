//! AARRR metrics per signup month.
//!
//! Referral has no tracked event behind it; it is a fixed proxy of one
//! referral per ten acquisitions.

use crate::{
    funnel_analysis::percent,
    journey::UserJourney,
    types::{round_to, EventType, YearMonth},
};
use serde::Serialize;
use std::collections::BTreeMap;

pub const REFERRAL_PROXY_DIVISOR: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AarrrRow {
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Acquisition")]
    pub acquisition: usize,
    #[serde(rename = "Activation")]
    pub activation: usize,
    #[serde(rename = "Retention")]
    pub retention: usize,
    #[serde(rename = "Revenue")]
    pub revenue: u64,
    #[serde(rename = "Referral")]
    pub referral: usize,
    #[serde(rename = "Activation Rate (%)")]
    pub activation_rate_pct: f64,
    #[serde(rename = "Retention Rate (%)")]
    pub retention_rate_pct: f64,
    #[serde(rename = "Avg Revenue Per User")]
    pub avg_revenue_per_user: f64,
}

/// One row per signup month, ascending.
pub fn analyze_aarrr(journeys: &[UserJourney]) -> Vec<AarrrRow> {
    let mut by_month: BTreeMap<YearMonth, Vec<&UserJourney>> = BTreeMap::new();
    for journey in journeys {
        by_month.entry(journey.signup_month()).or_default().push(journey);
    }

    by_month
        .into_iter()
        .map(|(month, users)| {
            let acquisition = users.len();
            let activation = users.iter().filter(|j| j.has(EventType::FirstWorkout)).count();
            let retention = users.iter().filter(|j| j.has(EventType::RepeatVisit)).count();
            let revenue: u64 = users.iter().filter_map(|j| j.reward_amount).sum();

            AarrrRow {
                month: month.to_string(),
                acquisition,
                activation,
                retention,
                revenue,
                referral: acquisition / REFERRAL_PROXY_DIVISOR,
                activation_rate_pct: round_to(percent(activation, acquisition), 2),
                retention_rate_pct: round_to(percent(retention, acquisition), 2),
                avg_revenue_per_user: round_to(revenue as f64 / acquisition.max(1) as f64, 0),
            }
        })
        .collect()
}

pub fn total_acquisition(rows: &[AarrrRow]) -> usize {
    rows.iter().map(|r| r.acquisition).sum()
}

/// Mean of the monthly ARPU values (not revenue over all users).
pub fn mean_arpu(rows: &[AarrrRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|r| r.avg_revenue_per_user).sum::<f64>() / rows.len() as f64
}
