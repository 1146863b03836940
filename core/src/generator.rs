//! Synthetic dataset generation.
//!
//! ORDER (fixed): signups → profiles → funnel stages → reward amounts.
//! Each step draws from its own stream in the RngBank, so the
//! output for a given config is byte-for-byte reproducible.

use crate::{
    config::GeneratorConfig,
    error::FunnelResult,
    event::EventRecord,
    funnel_stage,
    population::{self, UserRecord},
    reward::{self, RewardRecord},
    rng::{RngBank, StreamSlot},
    types::{EventType, UserId},
};
use std::collections::HashSet;

/// The three generated tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub users: Vec<UserRecord>,
    /// Sorted by user, then funnel stage.
    pub events: Vec<EventRecord>,
    pub rewards: Vec<RewardRecord>,
}

pub fn generate(config: &GeneratorConfig) -> FunnelResult<Dataset> {
    config.validate()?;
    let bank = RngBank::new(config.seed);

    let users = population::generate_users(
        config,
        &mut bank.for_stream(StreamSlot::Signup),
        &mut bank.for_stream(StreamSlot::Profile),
    );
    log::info!("generated {} users (seed={})", users.len(), config.seed);

    let mut events: Vec<EventRecord> = funnel_stage::run_funnel(&config.stages, &users, &bank)
        .into_iter()
        .flat_map(|outcome| outcome.events)
        .collect();
    events.sort_by_key(|e| (e.user_id, e.event_type));
    log::info!("generated {} funnel events", events.len());

    let rewards = reward::derive_rewards(
        config,
        &events,
        &mut bank.for_stream(StreamSlot::RewardAmount),
    );
    log::info!("generated {} rewards", rewards.len());

    Ok(Dataset { users, events, rewards })
}

/// Users reaching each funnel step, counted after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionTracking {
    pub signup: usize,
    pub first_workout: usize,
    pub first_reward: usize,
    pub repeat_visit: usize,
}

impl ConversionTracking {
    pub fn of(data: &Dataset) -> Self {
        let reached = |t: EventType| {
            data.events
                .iter()
                .filter(|e| e.event_type == t)
                .map(|e| e.user_id)
                .collect::<HashSet<_>>()
                .len()
        };
        Self {
            signup: data.users.len(),
            first_workout: reached(EventType::FirstWorkout),
            first_reward: reached(EventType::FirstReward),
            repeat_visit: reached(EventType::RepeatVisit),
        }
    }

    /// (label, users, percent of the previous step). Signup is 100%.
    pub fn steps(&self) -> [(&'static str, usize, f64); 4] {
        let pct = |n: usize, base: usize| {
            if base == 0 { 0.0 } else { n as f64 / base as f64 * 100.0 }
        };
        [
            ("Signup", self.signup, 100.0),
            ("First Workout", self.first_workout, pct(self.first_workout, self.signup)),
            ("First Reward", self.first_reward, pct(self.first_reward, self.first_workout)),
            ("Repeat Visit", self.repeat_visit, pct(self.repeat_visit, self.first_reward)),
        ]
    }
}

/// Post-generation sanity checks. Reported, never enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub duplicate_user_ids: usize,
    pub missing_user_fields: usize,
    /// Rewards with no matching first_reward event.
    pub orphan_rewards: usize,
    /// first_reward events with no reward row.
    pub unpaid_first_rewards: usize,
}

impl QualityReport {
    pub fn check(data: &Dataset) -> Self {
        let mut seen = HashSet::with_capacity(data.users.len());
        let duplicate_user_ids = data.users.iter().filter(|u| !seen.insert(u.user_id)).count();

        let missing_user_fields = data
            .users
            .iter()
            .map(|u| u.gender.is_empty() as usize + u.region.is_empty() as usize)
            .sum();

        let reward_events: HashSet<UserId> = data
            .events
            .iter()
            .filter(|e| e.event_type == EventType::FirstReward)
            .map(|e| e.user_id)
            .collect();
        let rewarded: HashSet<UserId> = data.rewards.iter().map(|r| r.user_id).collect();

        let report = Self {
            duplicate_user_ids,
            missing_user_fields,
            orphan_rewards: rewarded.difference(&reward_events).count(),
            unpaid_first_rewards: reward_events.difference(&rewarded).count(),
        };

        if report.is_clean() {
            log::info!("quality check passed: no duplicates, no missing fields");
        } else {
            log::warn!("quality check found problems: {report:?}");
        }
        report
    }

    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_generates_clean_data() {
        let data = generate(&GeneratorConfig::default_test()).unwrap();
        assert_eq!(data.users.len(), 500);
        assert!(QualityReport::check(&data).is_clean());
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let mut data = generate(&GeneratorConfig::default_test()).unwrap();
        let copy = data.users[0].clone();
        data.users.push(copy);
        let report = QualityReport::check(&data);
        assert_eq!(report.duplicate_user_ids, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn tracking_is_non_increasing() {
        let data = generate(&GeneratorConfig::default_test()).unwrap();
        let t = ConversionTracking::of(&data);
        assert!(t.signup >= t.first_workout);
        assert!(t.first_workout >= t.first_reward);
        assert!(t.first_reward >= t.repeat_visit);
    }

    #[test]
    fn invalid_config_is_rejected_before_drawing() {
        let config = GeneratorConfig { reward_unit: 0, ..GeneratorConfig::default_test() };
        assert!(generate(&config).is_err());
    }
}
