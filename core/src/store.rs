//! Flat-file persistence layer.
//!
//! RULE: Only store.rs touches table files.
//! Generator and analyzer modules work on in-memory rows and
//! call store functions to load or dump them.

use crate::{
    aarrr_analysis::AarrrRow,
    cohort_analysis::RetentionTable,
    error::{FunnelError, FunnelResult},
    generator::Dataset,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

pub const USERS_FILE: &str = "users.csv";
pub const EVENTS_FILE: &str = "events.csv";
pub const REWARDS_FILE: &str = "rewards.csv";
pub const RETENTION_FILE: &str = "cohort_retention.csv";
pub const AARRR_FILE: &str = "aarrr_analysis.csv";

// ── Generated tables ───────────────────────────────────────────

/// Write users, events and rewards into `dir`, creating it if absent.
/// Returns the written paths in that order.
pub fn write_dataset(dir: &Path, data: &Dataset) -> FunnelResult<[PathBuf; 3]> {
    std::fs::create_dir_all(dir)?;
    let paths = [dir.join(USERS_FILE), dir.join(EVENTS_FILE), dir.join(REWARDS_FILE)];

    write_rows(&paths[0], &data.users)?;
    write_rows(&paths[1], &data.events)?;
    write_rows(&paths[2], &data.rewards)?;

    for (path, rows) in paths
        .iter()
        .zip([data.users.len(), data.events.len(), data.rewards.len()])
    {
        log::info!("wrote {} ({rows} rows)", path.display());
    }
    Ok(paths)
}

/// Read the three tables from `dir`. Any missing or malformed table is fatal.
pub fn read_dataset(dir: &Path) -> FunnelResult<Dataset> {
    let data = Dataset {
        users: read_rows(&dir.join(USERS_FILE))?,
        events: read_rows(&dir.join(EVENTS_FILE))?,
        rewards: read_rows(&dir.join(REWARDS_FILE))?,
    };
    log::info!(
        "loaded {} users, {} events, {} rewards from {}",
        data.users.len(),
        data.events.len(),
        data.rewards.len(),
        dir.display()
    );
    Ok(data)
}

// ── Result tables ──────────────────────────────────────────────

/// Create the results directory so tables and charts can be written into it.
pub fn prepare_results_dir(dir: &Path) -> FunnelResult<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Cohort retention, one row per cohort month, one column per cohort age.
/// Cells with no value are left empty.
pub fn write_retention_table(path: &Path, table: &RetentionTable) -> FunnelResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["cohort_month".to_string()];
    header.extend(table.ages.iter().map(|a| a.to_string()));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.cohort.to_string()];
        record.extend(
            row.retention
                .iter()
                .map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_aarrr_table(path: &Path, rows: &[AarrrRow]) -> FunnelResult<()> {
    ensure_parent(path)?;
    write_rows(path, rows)
}

// ── Helpers ────────────────────────────────────────────────────

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> FunnelResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> FunnelResult<Vec<T>> {
    if !path.is_file() {
        return Err(FunnelError::MissingInput { path: path.to_path_buf() });
    }
    let read_err = |source| FunnelError::Read { path: path.to_path_buf(), source };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(read_err)
}

fn ensure_parent(path: &Path) -> FunnelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
