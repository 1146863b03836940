//! Per-user journey: the user row joined with the earliest event of each
//! funnel stage and the user's reward, if any.

use crate::{
    generator::Dataset,
    types::{EventType, UserId, YearMonth},
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct UserJourney {
    pub user_id: UserId,
    pub signup_date: NaiveDate,
    /// Earliest event time per stage, indexed by `EventType::index()`.
    pub first_seen: [Option<NaiveDateTime>; 3],
    pub reward_date: Option<NaiveDate>,
    pub reward_amount: Option<u64>,
}

impl UserJourney {
    pub fn reached(&self, stage: EventType) -> Option<NaiveDateTime> {
        self.first_seen[stage.index()]
    }

    pub fn has(&self, stage: EventType) -> bool {
        self.reached(stage).is_some()
    }

    pub fn is_rewarded(&self) -> bool {
        self.reward_date.is_some()
    }

    pub fn signup_month(&self) -> YearMonth {
        YearMonth::of(self.signup_date)
    }
}

/// Left-join events and rewards onto users, preserving user order.
///
/// Events or rewards for unknown users are dropped. A user with more than
/// one reward keeps the first one.
pub fn build_journeys(data: &Dataset) -> Vec<UserJourney> {
    let mut journeys: Vec<UserJourney> = data
        .users
        .iter()
        .map(|u| UserJourney {
            user_id: u.user_id,
            signup_date: u.signup_date,
            first_seen: [None; 3],
            reward_date: None,
            reward_amount: None,
        })
        .collect();

    let index: HashMap<UserId, usize> = journeys
        .iter()
        .enumerate()
        .map(|(i, j)| (j.user_id, i))
        .collect();

    let mut unmatched = 0usize;
    for event in &data.events {
        let Some(&i) = index.get(&event.user_id) else {
            unmatched += 1;
            continue;
        };
        let slot = &mut journeys[i].first_seen[event.event_type.index()];
        if slot.map_or(true, |t| event.event_time < t) {
            *slot = Some(event.event_time);
        }
    }

    let mut extra_rewards = 0usize;
    for reward in &data.rewards {
        let Some(&i) = index.get(&reward.user_id) else {
            unmatched += 1;
            continue;
        };
        let journey = &mut journeys[i];
        if journey.reward_date.is_some() {
            extra_rewards += 1;
            continue;
        }
        journey.reward_date = Some(reward.reward_date);
        journey.reward_amount = Some(reward.reward_amount);
    }

    if unmatched > 0 {
        log::warn!("{unmatched} event/reward rows reference unknown users and were ignored");
    }
    if extra_rewards > 0 {
        log::warn!("{extra_rewards} users had more than one reward; kept the first");
    }
    log::info!("joined {} user journeys", journeys.len());
    journeys
}
