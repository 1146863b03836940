//! Reward payouts, derived 1:1 from `first_reward` events.

use crate::{
    config::GeneratorConfig,
    event::EventRecord,
    rng::StreamRng,
    types::{EventType, UserId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub user_id: UserId,
    pub reward_date: NaiveDate,
    pub reward_amount: u64,
}

/// One reward per `first_reward` event, in event order.
pub fn derive_rewards(
    config: &GeneratorConfig,
    events: &[EventRecord],
    rng: &mut StreamRng,
) -> Vec<RewardRecord> {
    events
        .iter()
        .filter(|e| e.event_type == EventType::FirstReward)
        .map(|e| RewardRecord {
            user_id: e.user_id,
            reward_date: e.event_date,
            reward_amount: config.reward_unit
                * rng.range_inclusive(config.min_reward_units, config.max_reward_units),
        })
        .collect()
}

/// Payout totals printed after generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSummary {
    pub count: usize,
    pub total: u64,
    pub mean: f64,
    pub min: u64,
    pub max: u64,
}

impl RewardSummary {
    pub fn of(rewards: &[RewardRecord]) -> Option<Self> {
        let amounts = rewards.iter().map(|r| r.reward_amount);
        let total: u64 = amounts.clone().sum();
        Some(Self {
            count: rewards.len(),
            total,
            mean: total as f64 / rewards.len() as f64,
            min: amounts.clone().min()?,
            max: amounts.max()?,
        })
    }
}
