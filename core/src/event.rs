//! Funnel event rows.
//!
//! RULE: events for a user appear in funnel order, and each stage's
//! date is strictly after the previous stage's date.

use crate::types::{timestamp_format, EventType, UserId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub user_id: UserId,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    /// `event_date` plus a whole number of hours in [0, 23].
    #[serde(with = "timestamp_format")]
    pub event_time: NaiveDateTime,
}

/// Count events per type, in funnel order.
pub fn counts_by_type(events: &[EventRecord]) -> [(EventType, usize); 3] {
    EventType::ALL.map(|t| (t, events.iter().filter(|e| e.event_type == t).count()))
}
