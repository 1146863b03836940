use crate::{
    error::{FunnelError, FunnelResult},
    types::EventType,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conversion parameters for one funnel stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunnelStageConfig {
    pub event_type: EventType,
    /// Probability of converting, given the previous stage happened.
    pub probability: f64,
    /// Delay after the previous stage's date, inclusive range.
    pub min_delay_days: u64,
    pub max_delay_days: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub n_users: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_age: u32,
    pub max_age: u32,
    pub genders: Vec<String>,
    pub regions: Vec<String>,
    /// Stages in funnel order; each is gated on the one before it.
    pub stages: Vec<FunnelStageConfig>,
    /// Reward amount = reward_unit × U[min_reward_units, max_reward_units].
    pub reward_unit: u64,
    pub min_reward_units: u64,
    pub max_reward_units: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_users: 50_000,
            start_date: ymd(2024, 1, 1),
            end_date: ymd(2024, 12, 31),
            min_age: 18,
            max_age: 64,
            genders: vec!["M".into(), "F".into()],
            regions: ["Seoul", "Busan", "Incheon", "Daegu", "Daejeon"]
                .into_iter()
                .map(String::from)
                .collect(),
            stages: vec![
                FunnelStageConfig {
                    event_type: EventType::FirstWorkout,
                    probability: 0.80,
                    min_delay_days: 1,
                    max_delay_days: 7,
                },
                FunnelStageConfig {
                    event_type: EventType::FirstReward,
                    probability: 0.75,
                    min_delay_days: 1,
                    max_delay_days: 2,
                },
                FunnelStageConfig {
                    event_type: EventType::RepeatVisit,
                    probability: 0.60,
                    min_delay_days: 1,
                    max_delay_days: 7,
                },
            ],
            reward_unit: 100,
            min_reward_units: 10,
            max_reward_units: 99,
        }
    }
}

impl GeneratorConfig {
    /// Load overrides from a JSON file. Keys not present keep their defaults.
    pub fn load(path: &Path) -> FunnelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FunnelError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: GeneratorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Small population for unit tests.
    pub fn default_test() -> Self {
        Self {
            n_users: 500,
            ..Self::default()
        }
    }

    /// Number of whole days signups are spread over.
    pub fn signup_span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn stage(&self, event_type: EventType) -> Option<&FunnelStageConfig> {
        self.stages.iter().find(|s| s.event_type == event_type)
    }

    pub fn validate(&self) -> FunnelResult<()> {
        let invalid = |msg: String| Err(FunnelError::InvalidConfig(msg));

        if self.end_date <= self.start_date {
            return invalid(format!(
                "end_date {} must be after start_date {}",
                self.end_date, self.start_date
            ));
        }
        if self.min_age > self.max_age {
            return invalid(format!("age range {}..={} is empty", self.min_age, self.max_age));
        }
        if self.genders.is_empty() || self.regions.is_empty() {
            return invalid("genders and regions must be non-empty".into());
        }
        if self.genders.iter().chain(&self.regions).any(|v| v.is_empty()) {
            return invalid("category values must be non-empty strings".into());
        }
        if self.stages.iter().map(|s| s.event_type).ne(EventType::ALL) {
            return invalid(format!(
                "stages must be listed once each in funnel order: {:?}",
                EventType::ALL.map(|e| e.as_str())
            ));
        }
        for stage in &self.stages {
            if !(0.0..=1.0).contains(&stage.probability) {
                return invalid(format!(
                    "{} probability {} outside [0, 1]",
                    stage.event_type, stage.probability
                ));
            }
            if stage.min_delay_days > stage.max_delay_days {
                return invalid(format!(
                    "{} delay range {}..={} is empty",
                    stage.event_type, stage.min_delay_days, stage.max_delay_days
                ));
            }
        }
        if self.reward_unit == 0 {
            return invalid("reward_unit must be > 0".into());
        }
        if self.min_reward_units > self.max_reward_units {
            return invalid(format!(
                "reward unit range {}..={} is empty",
                self.min_reward_units, self.max_reward_units
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    /// p-value below which the A/B difference is reported significant.
    pub significance_level: f64,
    /// Cohort ages shown on the heatmap.
    pub heatmap_max_age: usize,
    pub render_charts: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("results"),
            significance_level: 0.05,
            heatmap_max_age: 6,
            render_charts: true,
        }
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GeneratorConfig::default().validate().unwrap();
        assert_eq!(GeneratorConfig::default().signup_span_days(), 365);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "seed": 7, "n_users": 10 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_users, 10);
        assert_eq!(config.stages.len(), 3);
        assert_eq!(config.reward_unit, 100);
    }

    #[test]
    fn unknown_keys_rejected() {
        let parsed: Result<GeneratorConfig, _> = serde_json::from_str(r#"{ "sead": 7 }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn out_of_range_probability_rejected() {
        let mut config = GeneratorConfig::default();
        config.stages[1].probability = 1.5;
        assert!(matches!(config.validate(), Err(FunnelError::InvalidConfig(_))));
    }

    #[test]
    fn reordered_stages_rejected() {
        let mut config = GeneratorConfig::default();
        config.stages.swap(0, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_date_range_rejected() {
        let config = GeneratorConfig {
            end_date: ymd(2023, 12, 31),
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
