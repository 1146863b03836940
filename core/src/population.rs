//! User population: one row per synthetic user.

use crate::{
    config::GeneratorConfig,
    rng::StreamRng,
    types::UserId,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub signup_date: NaiveDate,
    pub age: u32,
    pub gender: String,
    pub region: String,
}

/// Generate `config.n_users` users with sequential ids.
///
/// Signup dates come from the `signup` stream and profile attributes from
/// the `profile` stream, so changing the profile categories never moves a
/// signup date.
pub fn generate_users(
    config: &GeneratorConfig,
    signup_rng: &mut StreamRng,
    profile_rng: &mut StreamRng,
) -> Vec<UserRecord> {
    let span = config.signup_span_days().max(1) as u64;

    (0..config.n_users)
        .map(|i| {
            let offset = signup_rng.next_u64_below(span) as i64;
            let signup_date = config.start_date + Duration::days(offset);
            let age = profile_rng.range_inclusive(config.min_age as u64, config.max_age as u64) as u32;
            let gender = profile_rng.pick(&config.genders).clone();
            let region = profile_rng.pick(&config.regions).clone();

            UserRecord {
                user_id: i as UserId + 1,
                signup_date,
                age,
                gender,
                region,
            }
        })
        .collect()
}
