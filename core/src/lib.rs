//! Synthetic fitness-reward funnel data and product-analytics metrics.
//!
//! Two batch stages share this crate:
//!   1. `generator` builds users, funnel events and rewards from a seed.
//!   2. `analyzer` joins those tables and derives funnel, cohort, AARRR
//!      and reward A/B results.
//! Table files are read and written only through `store`.

pub mod aarrr_analysis;
pub mod ab_test;
pub mod analyzer;
pub mod charts;
pub mod cohort_analysis;
pub mod config;
pub mod error;
pub mod event;
pub mod funnel_analysis;
pub mod funnel_stage;
pub mod generator;
pub mod journey;
pub mod population;
pub mod reward;
pub mod rng;
pub mod stats;
pub mod store;
pub mod types;
