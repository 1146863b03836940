//! The funnel as an ordered pipeline of stage functions.
//!
//! Each stage takes the previous stage's participants and returns the
//! subset that converted, with one event each. A stage never sees users
//! who dropped out earlier, so stages cannot be skipped.

use crate::{
    config::FunnelStageConfig,
    event::EventRecord,
    population::UserRecord,
    rng::{RngBank, StreamRng, StreamSlot},
    types::{EventType, UserId},
};
use chrono::{Duration, NaiveDate, NaiveTime};

/// A user who reached a stage, with the date later stages are offset from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub anchor: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct StageOutcome {
    pub participants: Vec<Participant>,
    pub events: Vec<EventRecord>,
}

/// Participants entering the funnel: every user, anchored at signup.
pub fn signups(users: &[UserRecord]) -> Vec<Participant> {
    users
        .iter()
        .map(|u| Participant { user_id: u.user_id, anchor: u.signup_date })
        .collect()
}

/// Run a single stage over its entrants.
///
/// Per entrant, in order: one conversion roll; on success one delay roll
/// and one hour roll.
pub fn run_stage(
    stage: &FunnelStageConfig,
    entrants: &[Participant],
    rng: &mut StreamRng,
) -> StageOutcome {
    let mut outcome = StageOutcome::default();

    for entrant in entrants {
        if !rng.chance(stage.probability) {
            continue;
        }
        let delay = rng.range_inclusive(stage.min_delay_days, stage.max_delay_days) as i64;
        let event_date = entrant.anchor + Duration::days(delay);
        let hour = rng.next_u64_below(24) as i64;
        let event_time = event_date.and_time(NaiveTime::MIN) + Duration::hours(hour);

        outcome.participants.push(Participant { user_id: entrant.user_id, anchor: event_date });
        outcome.events.push(EventRecord {
            user_id: entrant.user_id,
            event_type: stage.event_type,
            event_date,
            event_time,
        });
    }

    log::debug!(
        "stage {}: {} of {} converted",
        stage.event_type,
        outcome.participants.len(),
        entrants.len()
    );
    outcome
}

/// Stream slot each stage draws from.
pub fn stream_for(event_type: EventType) -> StreamSlot {
    match event_type {
        EventType::FirstWorkout => StreamSlot::Workout,
        EventType::FirstReward  => StreamSlot::Reward,
        EventType::RepeatVisit  => StreamSlot::Repeat,
    }
}

/// Run every stage in order, feeding each stage the previous survivors.
/// Returns one outcome per stage, in the order given.
pub fn run_funnel(
    stages: &[FunnelStageConfig],
    users: &[UserRecord],
    bank: &RngBank,
) -> Vec<StageOutcome> {
    let mut entrants = signups(users);
    let mut outcomes = Vec::with_capacity(stages.len());

    for stage in stages {
        let mut rng = bank.for_stream(stream_for(stage.event_type));
        let outcome = run_stage(stage, &entrants, &mut rng);
        entrants = outcome.participants.clone();
        outcomes.push(outcome);
    }
    outcomes
}
