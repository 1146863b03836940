//! generate-data: write the synthetic users/events/rewards tables.
//!
//! Usage:
//!   generate-data
//!   generate-data --seed 7 --users 1000 --data-dir ./data
//!   generate-data --config generator.json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use funnel_core::{
    config::GeneratorConfig,
    event,
    generator::{self, ConversionTracking, QualityReport},
    reward::RewardSummary,
    store,
};
use funnel_tools::{arg_value, parse_arg};
use std::{env, path::Path};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match arg_value(&args, "--config") {
        Some(path) => GeneratorConfig::load(Path::new(path))?,
        None => GeneratorConfig::default(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.n_users = parse_arg(&args, "--users", config.n_users);
    config.start_date = parse_arg::<NaiveDate>(&args, "--start", config.start_date);
    config.end_date = parse_arg::<NaiveDate>(&args, "--end", config.end_date);
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("data");

    println!("{}", "=".repeat(50));
    println!("Synthetic data generation");
    println!("{}", "=".repeat(50));
    println!("  seed:      {}", config.seed);
    println!("  users:     {}", config.n_users);
    println!("  period:    {} ~ {}", config.start_date, config.end_date);
    println!("  data_dir:  {data_dir}");
    println!();

    let data = generator::generate(&config).context("generation failed")?;

    println!("[Events by type]");
    for (event_type, count) in event::counts_by_type(&data.events) {
        println!("  {event_type:<14} {count}");
    }
    println!("  total          {}", data.events.len());
    println!();

    println!("[Conversion tracking]");
    for (label, users, pct) in ConversionTracking::of(&data).steps() {
        println!("  {label:<14} {users:>7} ({pct:.1}%)");
    }
    println!();

    println!("[Rewards]");
    match RewardSummary::of(&data.rewards) {
        Some(s) => {
            println!("  paid:     {}", s.count);
            println!("  total:    {} KRW", s.total);
            println!("  mean:     {:.0} KRW", s.mean);
            println!("  min/max:  {} / {} KRW", s.min, s.max);
        }
        None => println!("  (no rewards paid)"),
    }
    println!();

    let paths = store::write_dataset(Path::new(data_dir), &data)
        .with_context(|| format!("cannot write tables to {data_dir}"))?;
    println!("[Saved]");
    for path in &paths {
        println!("  {}", path.display());
    }
    println!();

    let quality = QualityReport::check(&data);
    println!("[Quality check]");
    println!("  duplicate user ids:    {}", quality.duplicate_user_ids);
    println!("  missing user fields:   {}", quality.missing_user_fields);
    println!("  orphan rewards:        {}", quality.orphan_rewards);
    println!("  unpaid first rewards:  {}", quality.unpaid_first_rewards);
    println!("  status:                {}", if quality.is_clean() { "OK" } else { "PROBLEMS FOUND" });

    Ok(())
}
